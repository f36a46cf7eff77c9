//! Fiscal year labels on the April-to-March accounting cycle.
//!
//! A fiscal year that begins in April of year Y runs through March of Y+1 and
//! is printed as two two-digit fragments: 2025 → `"25-26"`, 1999 → `"99-00"`.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::errors::GenerationError;

/// Month in which a new fiscal year begins.
const FISCAL_YEAR_START_MONTH: u32 = 4;

/// Override options span this many years on either side of the current year.
const OVERRIDE_WINDOW_YEARS: i32 = 20;

/// Overrides carry only two-digit years; they always land in this century.
const OVERRIDE_CENTURY: i32 = 2000;

/// Formats the fiscal year beginning in `reference_year`.
pub fn fiscal_year(reference_year: i32) -> String {
    let start = reference_year.rem_euclid(100);
    let end = (reference_year + 1).rem_euclid(100);
    format!("{start:02}-{end:02}")
}

/// Resolves the fiscal year covering `today`.
pub fn current_fiscal_year(today: NaiveDate) -> String {
    fiscal_year(fiscal_start_year(today))
}

fn fiscal_start_year(today: NaiveDate) -> i32 {
    if today.month() >= FISCAL_YEAR_START_MONTH {
        today.year()
    } else {
        today.year() - 1
    }
}

/// Parses an override label such as `"24-25"` and returns its canonical form.
///
/// Only the start fragment is significant: the label is re-derived from it, so
/// `"24-99"` normalizes to `"24-25"`.
pub fn parse_fiscal_year(label: &str) -> Result<String, GenerationError> {
    let invalid = || {
        GenerationError::InvalidInput(format!(
            "Fiscal year override '{label}' must look like YY-YY"
        ))
    };

    let (start, end) = label.trim().split_once('-').ok_or_else(invalid)?;
    let is_fragment = |s: &str| s.len() == 2 && s.chars().all(|c| c.is_ascii_digit());
    if !is_fragment(start) || !is_fragment(end) {
        return Err(invalid());
    }

    let yy: i32 = start.parse().map_err(|_| invalid())?;
    Ok(fiscal_year(OVERRIDE_CENTURY + yy))
}

/// Picks the override when present, otherwise the fiscal year covering `today`.
pub fn resolve_fiscal_year(
    override_label: Option<&str>,
    today: NaiveDate,
) -> Result<String, GenerationError> {
    match override_label {
        Some(label) => parse_fiscal_year(label),
        None => Ok(current_fiscal_year(today)),
    }
}

/// Selectable override labels plus the default selection.
#[derive(Debug, Clone, Serialize)]
pub struct FiscalYearOptions {
    pub current: String,
    pub options: Vec<String>,
}

/// Lists the fiscal years starting 20 years before through 20 years after
/// today's calendar year, ascending.
pub fn fiscal_year_options(today: NaiveDate) -> FiscalYearOptions {
    let year = today.year();
    let options = (year - OVERRIDE_WINDOW_YEARS..=year + OVERRIDE_WINDOW_YEARS)
        .map(fiscal_year)
        .collect();

    FiscalYearOptions {
        current: current_fiscal_year(today),
        options,
    }
}
