
use anyhow::Context;
use glob::Pattern;
use std::path::{Path, PathBuf};

/// Lists the files directly inside `dir` whose names end with `suffix`, sorted by path.
/// A missing folder yields an empty list.
/// # Arguments
/// * `dir` - folder to search, not recursive
/// * `suffix` - literal name suffix such as ".vcf.gz"
/// # Errors
/// * if the folder path is not valid UTF-8 or the glob cannot be read
pub fn find_with_suffix(dir: &Path, suffix: &str) -> anyhow::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(vec![]);
    }

    let dir_str = dir.to_str()
        .with_context(|| format!("Non UTF-8 folder path: {dir:?}"))?;
    let pattern = format!("{}/*{}", Pattern::escape(dir_str), Pattern::escape(suffix));
    let mut found = vec![];
    for entry in glob::glob(&pattern).with_context(|| format!("Invalid search pattern {pattern:?}"))? {
        let path = entry.with_context(|| format!("Error while searching {dir:?}:"))?;
        if path.is_file() {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

/// Same as `find_with_suffix`, but skips any file `exclude` returns true for
pub fn find_with_suffix_excluding(dir: &Path, suffix: &str, exclude: impl Fn(&Path) -> bool) -> anyhow::Result<Vec<PathBuf>> {
    Ok(find_with_suffix(dir, suffix)?
        .into_iter()
        .filter(|p| !exclude(p))
        .collect())
}
