
use log::{info, warn};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Sidecar extensions checked, in order, for an expected MD5
const SIDECAR_EXTENSIONS: [&str; 2] = ["md5sum", "md5"];

#[derive(thiserror::Error, Debug)]
pub enum VerifyError {
    #[error("checksum mismatch for {filename:?}: expected {expected}, observed {observed}")]
    Mismatch {
        filename: PathBuf,
        expected: String,
        observed: String
    },
    #[error("checksum sidecar {sidecar:?} is empty")]
    EmptySidecar { sidecar: PathBuf },
    #[error("error while reading {filename:?}: {source}")]
    Io {
        filename: PathBuf,
        #[source]
        source: std::io::Error
    },
}

/// Computes the hex MD5 digest of a file, streaming it in blocks
pub fn md5_hex(filename: &Path) -> Result<String, VerifyError> {
    let io_error = |source| VerifyError::Io { filename: filename.to_path_buf(), source };
    let mut file = File::open(filename).map_err(io_error)?;
    let mut context = md5::Context::new();
    let mut buffer = vec![0; 1 << 16];
    loop {
        let count = file.read(&mut buffer).map_err(io_error)?;
        if count == 0 {
            break;
        }
        context.consume(&buffer[..count]);
    }
    Ok(format!("{:x}", context.compute()))
}

/// Returns the first existing `<file>.md5sum` / `<file>.md5` sidecar
pub fn find_sidecar(filename: &Path) -> Option<PathBuf> {
    SIDECAR_EXTENSIONS.iter()
        .map(|ext| {
            let mut sidecar = filename.to_owned().into_os_string();
            sidecar.push(format!(".{ext}"));
            PathBuf::from(sidecar)
        })
        .find(|p| p.is_file())
}

/// Verifies a file against its checksum sidecar, if one is present.
/// The sidecar holds either the bare digest or `md5sum` output (`<digest>  <name>`).
/// # Returns
/// * `Ok(true)` if the digest matched, `Ok(false)` if there was no sidecar to check
/// # Errors
/// * if the digests differ or either file cannot be read
pub fn verify_md5_sidecar(filename: &Path) -> Result<bool, VerifyError> {
    let Some(sidecar) = find_sidecar(filename) else {
        warn!("No checksum sidecar found for {filename:?}, skipping verification");
        return Ok(false);
    };

    let text = std::fs::read_to_string(&sidecar)
        .map_err(|source| VerifyError::Io { filename: sidecar.clone(), source })?;
    let expected = text.split_whitespace()
        .next()
        .ok_or(VerifyError::EmptySidecar { sidecar: sidecar.clone() })?
        .to_ascii_lowercase();

    let observed = md5_hex(filename)?;
    if observed != expected {
        return Err(VerifyError::Mismatch {
            filename: filename.to_path_buf(),
            expected,
            observed
        });
    }
    info!("Checksum verified for {filename:?}");
    Ok(true)
}
