//! Order validation, run once before any page is emitted.
//!
//! The first failing check is reported; every failure is `InvalidInput`.

use std::ops::RangeInclusive;

use crate::errors::GenerationError;
use crate::sticker::fiscal_year::parse_fiscal_year;
use crate::sticker::order::{ChargerConfig, ProductConfig, ProductOrder, UpsConfig};

const JOB_OP_RANGE: RangeInclusive<u32> = 0..=999_999;
const KVA_RANGE: RangeInclusive<u32> = 0..=99_999;
const UPS_SETS_RANGE: RangeInclusive<u32> = 1..=20;
const UPS_PER_SET_RANGE: RangeInclusive<u32> = 1..=20;
const CHARGERS_RANGE: RangeInclusive<u32> = 1..=20;
const VOLTAGE_RANGE: RangeInclusive<u32> = 1..=1000;
const CURRENT_RANGE: RangeInclusive<u32> = 1..=500;
const CAPACITY_AH_RANGE: RangeInclusive<u32> = 1..=5000;

fn invalid(msg: impl Into<String>) -> GenerationError {
    GenerationError::InvalidInput(msg.into())
}

pub fn validate_order(order: &ProductOrder) -> Result<(), GenerationError> {
    if order.customer_name.trim().is_empty() {
        return Err(invalid("Customer name is required"));
    }
    validate_number("Job number", &order.job_number)?;
    validate_number("OP number", &order.op_number)?;

    if let Some(path) = &order.sticker_image_ref {
        if !path.is_file() {
            return Err(invalid(format!(
                "Sticker image not found: {}",
                path.display()
            )));
        }
    }

    if let Some(label) = &order.fiscal_year_override {
        parse_fiscal_year(label)?;
    }

    match &order.product {
        ProductConfig::Ups(ups) => validate_ups(ups),
        ProductConfig::BatteryCharger(charger) => validate_charger(charger),
    }
}

/// Job and OP numbers are printed verbatim into serials and file names, so they
/// must be bare ASCII digits: no sign, no surrounding whitespace.
fn validate_number(field: &str, value: &str) -> Result<(), GenerationError> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{field} is required")));
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(format!("{field} must contain only digits, got '{value}'")));
    }
    let parsed: u32 = value
        .parse()
        .map_err(|_| invalid(format!("{field} is too large, got '{value}'")))?;
    check_range(field, parsed, &JOB_OP_RANGE)
}

fn check_range(field: &str, value: u32, range: &RangeInclusive<u32>) -> Result<(), GenerationError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(invalid(format!(
            "{field} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        )))
    }
}

fn validate_ups(ups: &UpsConfig) -> Result<(), GenerationError> {
    check_range("kVA rating", ups.kva_rating, &KVA_RANGE)?;
    check_range("Number of sets", ups.num_sets, &UPS_SETS_RANGE)?;
    check_range("UPS per set", ups.units_per_set, &UPS_PER_SET_RANGE)
}

fn validate_charger(charger: &ChargerConfig) -> Result<(), GenerationError> {
    check_range("Number of chargers", charger.num_chargers, &CHARGERS_RANGE)?;

    if let Some(start) = charger.numbering_start {
        if start > 1 {
            return Err(invalid(format!("Numbering start must be 0 or 1, got {start}")));
        }
    }

    if !charger.shows_details() {
        return Ok(());
    }

    let details = [
        ("Voltage", charger.voltage, &VOLTAGE_RANGE),
        ("Current", charger.current, &CURRENT_RANGE),
        ("Battery Capacity", charger.battery_capacity_ah, &CAPACITY_AH_RANGE),
    ];

    let missing: Vec<&str> = details
        .iter()
        .filter(|(_, value, _)| value.is_none())
        .map(|(name, _, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(invalid(format!("Please fill in: {}", missing.join(", "))));
    }

    for (name, value, range) in details {
        if let Some(v) = value {
            check_range(name, v, range)?;
        }
    }
    Ok(())
}
