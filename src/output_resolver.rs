
use anyhow::Context;
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::data_types::layout::ProjectLayout;
use crate::parsing::gvcf_header::extract_creation_date;
use crate::toolkit::variant_tools::VariantToolkit;

/// Picks or creates the processed output folder of a run
pub struct OutputResolver<'a> {
    layout: &'a ProjectLayout
}

impl<'a> OutputResolver<'a> {
    pub fn new(layout: &'a ProjectLayout) -> Self {
        Self { layout }
    }

    /// Returns the first processed folder (by name) containing `run_token`, creating
    /// `data/processed/<run_token>` if there is none.
    /// Matching is by substring, so date-prefixed folders are found.
    /// # Errors
    /// * if the processed folder cannot be listed or created
    pub fn resolve_output_dir(&self, run_token: &str) -> anyhow::Result<PathBuf> {
        let processed_dir = self.layout.processed_dir();
        std::fs::create_dir_all(&processed_dir)
            .with_context(|| format!("Error while creating {processed_dir:?}:"))?;

        let mut matches = vec![];
        let entries = std::fs::read_dir(&processed_dir)
            .with_context(|| format!("Error while listing {processed_dir:?}:"))?;
        for entry in entries {
            let entry = entry.with_context(|| format!("Error while listing {processed_dir:?}:"))?;
            let path = entry.path();
            if path.is_dir() && entry.file_name().to_string_lossy().contains(run_token) {
                matches.push(path);
            }
        }
        matches.sort();

        if let Some(existing) = matches.first() {
            if matches.len() > 1 {
                warn!("Multiple processed folders match {run_token:?}, using {existing:?}");
            }
            return Ok(existing.clone());
        }

        let fallback = processed_dir.join(run_token);
        info!("No processed folder found for {run_token:?}, creating {fallback:?}");
        create_folder(&fallback)?;
        Ok(fallback)
    }

    /// Creates `data/processed/{date}_{sample}_{run}` from the GVCF provenance date.
    /// There is no fallback to file timestamps.
    /// # Errors
    /// * if the header dump fails
    /// * if the header has no dated DRAGEN command line
    pub fn dated_output_dir(&self, sample: &str, run: &str, gvcf: &Path, toolkit: &VariantToolkit) -> anyhow::Result<PathBuf> {
        let header = toolkit.header_text(gvcf)
            .with_context(|| format!("Error while reading the header of {gvcf:?}:"))?;
        let date = extract_creation_date(&header)
            .with_context(|| format!("Error while dating {gvcf:?}:"))?;

        let output_dir = self.layout.processed_dir()
            .join(format!("{date}_{}", ProjectLayout::run_token(sample, run)));
        create_folder(&output_dir)?;
        Ok(output_dir)
    }
}

fn create_folder(path: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("Error while creating {path:?}:"))
}
