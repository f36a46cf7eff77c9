//! Order parameters a sticker run is generated from.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Product family, derived from the order's configuration variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductKind {
    Ups,
    BatteryCharger,
}

impl ProductKind {
    /// Upper-case name used in artifact file names.
    pub fn label(&self) -> &'static str {
        match self {
            ProductKind::Ups => "UPS",
            ProductKind::BatteryCharger => "BATTERY CHARGER",
        }
    }
}

/// Charger operating mode printed on the product line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargerType {
    #[serde(rename = "FC")]
    Fc,
    #[serde(rename = "FC & FCB")]
    FcAndFcb,
    #[serde(rename = "FCBC")]
    Fcbc,
    #[serde(rename = "DFCBC")]
    Dfcbc,
}

impl fmt::Display for ChargerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChargerType::Fc => "FC",
            ChargerType::FcAndFcb => "FC & FCB",
            ChargerType::Fcbc => "FCBC",
            ChargerType::Dfcbc => "DFCBC",
        })
    }
}

/// Battery chemistry the charger is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatteryType {
    #[serde(rename = "VRLA")]
    Vrla,
    #[serde(rename = "NICAD")]
    Nicad,
    #[serde(rename = "Planté")]
    Plante,
    #[serde(rename = "Tubular")]
    Tubular,
    #[serde(rename = "Li-Ion")]
    LiIon,
    #[serde(rename = "Li-Po")]
    LiPo,
}

impl fmt::Display for BatteryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BatteryType::Vrla => "VRLA",
            BatteryType::Nicad => "NICAD",
            BatteryType::Plante => "Planté",
            BatteryType::Tubular => "Tubular",
            BatteryType::LiIon => "Li-Ion",
            BatteryType::LiPo => "Li-Po",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsConfig {
    pub kva_rating: u32,
    pub num_sets: u32,
    pub units_per_set: u32,
}

/// Battery charger run.
///
/// The electrical details are only printed (and only required) when
/// `show_product_details` is on. `numbering_start` and `show_product_details`
/// may be left unset for the host to fill from its settings; unset values
/// fall back to numbering from 1 with details shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargerConfig {
    #[serde(default)]
    pub voltage: Option<u32>,
    #[serde(default)]
    pub current: Option<u32>,
    #[serde(default)]
    pub battery_capacity_ah: Option<u32>,
    pub charger_type: ChargerType,
    pub battery_type: BatteryType,
    pub num_chargers: u32,
    #[serde(default)]
    pub numbering_start: Option<u32>,
    #[serde(default)]
    pub show_product_details: Option<bool>,
}

impl ChargerConfig {
    /// First charger index: 0 only when explicitly requested.
    pub fn first_index(&self) -> u32 {
        match self.numbering_start {
            Some(0) => 0,
            _ => 1,
        }
    }

    pub fn shows_details(&self) -> bool {
        self.show_product_details.unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProductConfig {
    Ups(UpsConfig),
    BatteryCharger(ChargerConfig),
}

/// Everything needed to generate one sticker document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOrder {
    pub customer_name: String,
    pub job_number: String,
    pub op_number: String,
    /// Image placed on every page. Pages render a placeholder when absent.
    #[serde(default)]
    pub sticker_image_ref: Option<PathBuf>,
    /// Explicit `"YY-YY"` fiscal year; the current one is used when absent.
    #[serde(default)]
    pub fiscal_year_override: Option<String>,
    pub product: ProductConfig,
}

impl ProductOrder {
    pub fn product_kind(&self) -> ProductKind {
        match self.product {
            ProductConfig::Ups(_) => ProductKind::Ups,
            ProductConfig::BatteryCharger(_) => ProductKind::BatteryCharger,
        }
    }

    /// Customer name as printed: trimmed and upper-cased.
    pub fn customer_display(&self) -> String {
        self.customer_name.trim().to_uppercase()
    }
}
