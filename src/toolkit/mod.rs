/*!
# Toolkit module
Everything that launches child processes goes through the `ToolRunner` trait so the pipeline logic can be exercised without the real tools installed.
*/
/// Recording runner used by the unit tests
#[cfg(test)]
pub mod mock;
/// The `ToolRunner` seam and the real process runner
pub mod runner;
/// bcftools / tabix command construction
pub mod variant_tools;
