/// MD5 verification against checksum sidecar files
pub mod checksum;
/// Suffix-based file discovery inside a folder
pub mod file_search;
/// Helper functions for read/writing JSON via serde
pub mod json_io;
/// Shared progress/spinner styling
pub mod progress_bar;
/// Exclusive per-run lease file
pub mod run_lock;
