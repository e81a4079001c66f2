/// Command line interface functionality
pub mod cli;
/// Contains various shared data types
pub mod data_types;
/// Child process seam and the bcftools / tabix wrappers
pub mod toolkit;
/// Reference availability checks and provisioning
pub mod reference;
/// Tooling for parsing input files into meaningful structs / data
pub mod parsing;
/// Various utility functions that tend to be very generic
pub mod util;
/// All output writers
pub mod writers;
/// Locates the input files of a sequencing run
pub mod run_files;
/// Produces the filtered / renamed / normalized benchmark inputs
pub mod preparer;
/// Launches the hap.py and truvari wrapper scripts
pub mod benchmark_invoker;
/// Picks the processed output folder of a run
pub mod output_resolver;
/// Stage orchestration for one sample and run
pub mod pipeline;
