/// Artifact kinds and existence-check results
pub mod artifacts;
/// Benchmark tool enums, invocation paths, and invocation records
pub mod benchmark;
/// Sample alias catalog and base-sample resolution
pub mod catalog;
/// Filesystem conventions of a project tree
pub mod layout;
/// Pipeline request and per-stage outcome reporting
pub mod pipeline_report;
/// Discovered run inputs and prepared benchmark inputs
pub mod run_location;
/// Contains tracker for TP, FP, FN and derived metrics
pub mod summary_metrics;
