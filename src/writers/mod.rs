/*!
# Writers module
Contains the logic for writing the reformatted metric files and the benchmark summary.
*/
/// Rewrites raw metric CSVs with a registered column layout
pub mod csv_reformat;
/// Generates the benchmark summary file
pub mod summary;
