
use anyhow::anyhow;
use derive_builder::Builder;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// Default GRCh38 reference FASTA name, the FAI is this plus ".fai"
pub const DEFAULT_GENOME_FASTA: &str = "GCA_000001405.15_GRCh38_no_alt_analysis_set.fasta";
/// Default SDF folder name built by `rtg format`
pub const DEFAULT_GENOME_SDF: &str = "GRCh38.sdf";
/// Default container mount point of the project root
pub const DEFAULT_CONTAINER_ROOT: &str = "/wgs";

/// All the filesystem conventions of a project tree.
/// Every path is derived from `project_root` so a layout is cheap to build in tests.
#[derive(Builder, Clone, Debug, Serialize)]
#[builder(default, setter(into))]
pub struct ProjectLayout {
    /// Root folder that contains `data/`, `pipeline/`, and `script/`
    project_root: PathBuf,
    /// File name of the genome FASTA inside the reference folder
    genome_fasta_name: String,
    /// Folder name of the SDF inside the reference folder
    genome_sdf_name: String,
    /// Sub-folder of a sample reference folder holding the SV truth set
    sv_subdir: String,
    /// Location of the stratification TSV, relative to the sample reference folder
    stratification_tsv: PathBuf,
    /// Mount point of `project_root` inside the benchmarking containers
    container_root: String,
    /// Reference fetch script, relative to `project_root`
    setup_script: PathBuf,
    /// hap.py wrapper script, relative to `project_root`
    happy_script: PathBuf,
    /// truvari wrapper script, relative to `project_root`
    truvari_script: PathBuf,
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            genome_fasta_name: DEFAULT_GENOME_FASTA.to_string(),
            genome_sdf_name: DEFAULT_GENOME_SDF.to_string(),
            sv_subdir: "stvar".to_string(),
            stratification_tsv: PathBuf::from("GRCh38_strat/GRCh38-all-stratifications.tsv"),
            container_root: DEFAULT_CONTAINER_ROOT.to_string(),
            setup_script: PathBuf::from("script/setup_reference.sh"),
            happy_script: PathBuf::from("pipeline/happy.sh"),
            truvari_script: PathBuf::from("pipeline/truvari.sh"),
        }
    }
}

impl ProjectLayout {
    /// Default conventions rooted at `project_root`
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            ..Default::default()
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn data_dir(&self) -> PathBuf {
        self.project_root.join("data")
    }

    /// Raw uploaded runs, one folder per `{sample}_{run}`
    pub fn lab_run_dir(&self) -> PathBuf {
        self.data_dir().join("lab_runs")
    }

    /// Processed outputs, one folder per run
    pub fn processed_dir(&self) -> PathBuf {
        self.data_dir().join("processed")
    }

    /// Shared genome files plus one folder per base sample
    pub fn reference_dir(&self) -> PathBuf {
        self.data_dir().join("reference")
    }

    pub fn genome_fasta(&self) -> PathBuf {
        self.reference_dir().join(&self.genome_fasta_name)
    }

    pub fn genome_fasta_index(&self) -> PathBuf {
        self.reference_dir().join(format!("{}.fai", self.genome_fasta_name))
    }

    pub fn genome_sdf(&self) -> PathBuf {
        self.reference_dir().join(&self.genome_sdf_name)
    }

    pub fn sample_reference_dir(&self, base_sample: &str) -> PathBuf {
        self.reference_dir().join(base_sample)
    }

    pub fn sv_reference_dir(&self, base_sample: &str) -> PathBuf {
        self.sample_reference_dir(base_sample).join(&self.sv_subdir)
    }

    pub fn stratification_tsv(&self, base_sample: &str) -> PathBuf {
        self.sample_reference_dir(base_sample).join(&self.stratification_tsv)
    }

    /// The token that names everything belonging to one run
    pub fn run_token(sample: &str, run: &str) -> String {
        format!("{sample}_{run}")
    }

    pub fn run_input_dir(&self, sample: &str, run: &str) -> PathBuf {
        self.lab_run_dir().join(Self::run_token(sample, run))
    }

    /// Lease file guarding concurrent processing of the same run
    pub fn run_lock_file(&self, sample: &str, run: &str) -> PathBuf {
        self.lab_run_dir().join(format!("{}.lock", Self::run_token(sample, run)))
    }

    pub fn setup_script(&self) -> PathBuf {
        self.project_root.join(&self.setup_script)
    }

    pub fn happy_script(&self) -> PathBuf {
        self.project_root.join(&self.happy_script)
    }

    pub fn truvari_script(&self) -> PathBuf {
        self.project_root.join(&self.truvari_script)
    }

    /// Rebinds a host path under `project_root` onto the container mount point.
    /// The translation is lexical, so the target does not need to exist yet.
    /// # Arguments
    /// * `host_path` - absolute path, or a path relative to `project_root`
    /// # Errors
    /// * if the path is not located under `project_root`
    pub fn to_container(&self, host_path: &Path) -> anyhow::Result<String> {
        let full_path = if host_path.is_absolute() {
            normalize(host_path)
        } else {
            normalize(&self.project_root.join(host_path))
        };
        let root = normalize(&self.project_root);
        let relative = full_path.strip_prefix(&root)
            .map_err(|_e| anyhow!("{host_path:?} is not located under the project root {:?}", self.project_root))?;

        let components: Vec<String> = relative.components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let container_root = self.container_root.trim_end_matches('/');
        Ok(format!("{container_root}/{}", components.join("/")))
    }
}

/// Removes `.` components and folds `..` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                normalized.pop();
            },
            other => normalized.push(other.as_os_str())
        }
    }
    normalized
}
