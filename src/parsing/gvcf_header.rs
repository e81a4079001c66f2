
use chrono::{NaiveDateTime, Weekday};
use lazy_static::lazy_static;
use regex::Regex;

/// Header line written by the DRAGEN caller that records the run provenance
pub const DRAGEN_COMMAND_LINE: &str = "##DRAGENCommandLine=";

lazy_static! {
    static ref DATE_TOKEN: Regex = Regex::new(r#"Date="([^"]+)""#).unwrap();
}

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum HeaderDateError {
    #[error("missing date from gvcf: no {DRAGEN_COMMAND_LINE} line with a Date=\"...\" token")]
    MissingDate,
    #[error("failed to parse gvcf date {value:?}: {reason}")]
    Unparseable { value: String, reason: String },
}

/// Finds the provenance date in a VCF header dump and returns it as `YYYYMMDD`.
/// The first command-line header carrying a date wins.
/// # Arguments
/// * `header_text` - full `bcftools view -h` output
/// # Errors
/// * if no provenance line carries a date
/// * if the date is not in `Mon Jan 02 15:04:05 UTC 2023` form
pub fn extract_creation_date(header_text: &str) -> Result<String, HeaderDateError> {
    let raw_date = header_text.lines()
        .filter(|l| l.contains(DRAGEN_COMMAND_LINE))
        .find_map(|l| DATE_TOKEN.captures(l))
        .and_then(|c| c.get(1))
        .ok_or(HeaderDateError::MissingDate)?;
    parse_dragen_date(raw_date.as_str())
}

/// Converts a DRAGEN `%a %b %d %H:%M:%S %Z %Y` timestamp to `YYYYMMDD`.
/// The zone name is ignored and the date is taken as written.
/// The weekday must be a weekday name but is not checked against the date.
pub fn parse_dragen_date(value: &str) -> Result<String, HeaderDateError> {
    let unparseable = |reason: String| HeaderDateError::Unparseable {
        value: value.to_string(),
        reason
    };

    let mut tokens: Vec<&str> = value.split_whitespace().collect();
    if tokens.len() == 6 {
        // drop the zone name, chrono cannot resolve abbreviations like "PDT"
        tokens.remove(4);
    }
    if tokens.len() != 5 {
        return Err(unparseable(format!("expected 5 or 6 fields, found {}", tokens.len())));
    }

    let weekday = tokens.remove(0);
    weekday.parse::<Weekday>()
        .map_err(|_e| unparseable(format!("unknown weekday {weekday:?}")))?;
    let datetime = NaiveDateTime::parse_from_str(&tokens.join(" "), "%b %d %H:%M:%S %Y")
        .map_err(|e| unparseable(e.to_string()))?;
    Ok(datetime.format("%Y%m%d").to_string())
}
