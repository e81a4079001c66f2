/*!
# Parsing module
Contains the logic for parsing tool inputs and outputs into meaningful structs / data.
*/
/// Layout table for reformatting raw metric CSVs
pub mod csv_layouts;
/// Contig list from a FASTA index
pub mod fasta_index;
/// Provenance date from a GVCF header dump
pub mod gvcf_header;
/// hap.py summary CSV
pub mod happy_summary;
/// truvari summary JSON
pub mod truvari_summary;
