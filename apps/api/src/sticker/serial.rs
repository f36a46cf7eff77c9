//! Serial number text printed under the product line of every sticker.
//!
//! The format is fixed by downstream label expectations:
//! `(SL. NO. : LL/<FY>/<JOB>-OP<OP>/<SUFFIX>)`. Inputs are substituted verbatim;
//! validation happens before sequencing, never here.

/// Synthetic unit appended to multi-unit UPS sets.
pub const BYPASS_UNIT: &str = "BYPASS";

/// Serial suffix printed for the bypass unit.
pub const BYPASS_SUFFIX: &str = "BYP";

const CHARGER_PREFIX: &str = "BCH";

pub fn format_serial(
    fiscal_year: &str,
    job_number: &str,
    op_number: &str,
    unit_suffix: &str,
) -> String {
    format!("(SL. NO. : LL/{fiscal_year}/{job_number}-OP{op_number}/{unit_suffix})")
}

/// Name of the n-th UPS in a set, 1-indexed.
pub fn ups_unit_name(n: u32) -> String {
    format!("UPS{n}")
}

/// Suffix for a UPS-family unit: the bypass abbreviates, everything else prints as-is.
pub fn ups_suffix(unit: &str) -> &str {
    if unit == BYPASS_UNIT {
        BYPASS_SUFFIX
    } else {
        unit
    }
}

/// Charger index label: blank for index 0, the decimal index otherwise.
pub fn charger_index_label(i: u32) -> String {
    if i == 0 {
        String::new()
    } else {
        i.to_string()
    }
}

pub fn charger_suffix(index_label: &str) -> String {
    format!("{CHARGER_PREFIX}{index_label}")
}
