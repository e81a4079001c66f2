
use std::path::{Path, PathBuf};

use crate::toolkit::runner::{ToolError, ToolInvocation, ToolRunner};

pub const BCFTOOLS: &str = "bcftools";
pub const TABIX: &str = "tabix";

/// Returns the tabix index path that sits next to a bgzipped file
pub fn tabix_index_path(data_fn: &Path) -> PathBuf {
    let mut tbi_fn = data_fn.to_owned().into_os_string();
    tbi_fn.push(".tbi");
    PathBuf::from(tbi_fn)
}

/// Command line contracts for the bcftools/tabix operations the pipeline uses
#[derive(Clone, Copy)]
pub struct VariantToolkit<'a> {
    runner: &'a dyn ToolRunner
}

impl<'a> VariantToolkit<'a> {
    pub fn new(runner: &'a dyn ToolRunner) -> Self {
        Self { runner }
    }

    /// Restricts a VCF to the given contigs, writing bgzipped output
    /// # Arguments
    /// * `input` - source VCF/GVCF
    /// * `output` - destination, `.gz`
    /// * `regions` - contig names to keep
    pub fn view_regions(&self, input: &Path, output: &Path, regions: &[String]) -> Result<(), ToolError> {
        let invocation = ToolInvocation::new(BCFTOOLS)
            .arg("view")
            .arg("--regions")
            .arg(regions.join(","))
            .arg("-O").arg("z")
            .arg("-o").path_arg(output)
            .path_arg(input);
        self.runner.run_checked(&invocation)?;
        Ok(())
    }

    /// Drops every record matching `expression`, writing bgzipped output
    pub fn view_exclude(&self, input: &Path, output: &Path, expression: &str) -> Result<(), ToolError> {
        let invocation = ToolInvocation::new(BCFTOOLS)
            .arg("view")
            .arg("-e").arg(expression)
            .arg("-O").arg("z")
            .arg("-o").path_arg(output)
            .path_arg(input);
        self.runner.run_checked(&invocation)?;
        Ok(())
    }

    /// Renames contigs using a two-column `old new` map file
    pub fn rename_chromosomes(&self, input: &Path, output: &Path, map_fn: &Path) -> Result<(), ToolError> {
        let invocation = ToolInvocation::new(BCFTOOLS)
            .arg("annotate")
            .arg("--rename-chrs").path_arg(map_fn)
            .arg("-O").arg("z")
            .arg("-o").path_arg(output)
            .path_arg(input);
        self.runner.run_checked(&invocation)?;
        Ok(())
    }

    /// Builds `<data_fn>.tbi`, replacing any existing index
    pub fn index_vcf(&self, data_fn: &Path) -> Result<PathBuf, ToolError> {
        let invocation = ToolInvocation::new(TABIX)
            .arg("-f")
            .arg("-p").arg("vcf")
            .path_arg(data_fn);
        self.runner.run_checked(&invocation)?;
        Ok(tabix_index_path(data_fn))
    }

    /// Dumps the full VCF header as text
    pub fn header_text(&self, vcf_fn: &Path) -> Result<String, ToolError> {
        let invocation = ToolInvocation::new(BCFTOOLS)
            .arg("view")
            .arg("-h")
            .path_arg(vcf_fn);
        Ok(self.runner.run_checked(&invocation)?.stdout)
    }

    /// Lists the sample names of a VCF, one per line of `bcftools query -l`
    pub fn sample_names(&self, vcf_fn: &Path) -> Result<Vec<String>, ToolError> {
        let invocation = ToolInvocation::new(BCFTOOLS)
            .arg("query")
            .arg("-l")
            .path_arg(vcf_fn);
        let output = self.runner.run_checked(&invocation)?;
        Ok(output.stdout.lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }
}
