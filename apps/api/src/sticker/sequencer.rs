//! Page sequencing: turns an order into the ordered list of sticker pages.
//!
//! # Numbering rules
//! - UPS: every set lists `UPS1..=UPS{units_per_set}`; sets with more than one
//!   unit also get a synthetic `BYPASS` unit (serial suffix `BYP`).
//! - Chargers: indices run from `first_index()` for `num_chargers` units; index 0
//!   prints a blank label (`BCH`), every other index prints its number.
//!
//! Each unit yields a FRONT page immediately followed by its BACK page. The
//! sequence is lazy and borrows the order, so calling `pages()` again replays
//! the identical sequence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::sticker::order::{ChargerConfig, ProductConfig, ProductOrder, UpsConfig};
use crate::sticker::serial::{
    charger_index_label, charger_suffix, format_serial, ups_suffix, ups_unit_name, BYPASS_UNIT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Front,
    Back,
}

impl Side {
    /// Heading printed at the top of the page.
    pub fn heading(&self) -> &'static str {
        match self {
            Side::Front => "FRONT SIDE",
            Side::Back => "BACK SIDE",
        }
    }
}

const SIDES: [Side; 2] = [Side::Front, Side::Back];

/// One page to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSpec {
    pub side: Side,
    pub product_label: String,
    pub customer_name: String,
    pub serial_number: String,
    pub image_ref: Option<PathBuf>,
    pub show_customer_in_parens: bool,
}

impl PageSpec {
    /// Product line as printed, with the customer in parentheses when enabled.
    pub fn product_line(&self) -> String {
        if self.show_customer_in_parens {
            format!("{} ({})", self.product_label, self.customer_name)
        } else {
            self.product_label.clone()
        }
    }

    pub fn image_path(&self) -> Option<&Path> {
        self.image_ref.as_deref()
    }
}

/// Per-unit text shared by the unit's two sides.
#[derive(Debug, Clone)]
struct UnitLabel {
    product_label: String,
    serial_suffix: String,
    show_customer_in_parens: bool,
}

pub struct PageSequencer<'a> {
    order: &'a ProductOrder,
    fiscal_year: &'a str,
    customer_name: String,
}

impl<'a> PageSequencer<'a> {
    pub fn new(order: &'a ProductOrder, fiscal_year: &'a str) -> Self {
        Self {
            order,
            fiscal_year,
            customer_name: order.customer_display(),
        }
    }

    /// Number of pages `pages()` yields. Saturates for orders that never passed
    /// validation.
    pub fn total_pages(&self) -> usize {
        let units = match &self.order.product {
            ProductConfig::Ups(ups) => {
                let bypass = usize::from(ups.units_per_set > 1);
                (ups.num_sets as usize).saturating_mul(ups.units_per_set as usize + bypass)
            }
            ProductConfig::BatteryCharger(charger) => charger.num_chargers as usize,
        };
        units.saturating_mul(SIDES.len())
    }

    pub fn pages(&self) -> impl Iterator<Item = PageSpec> + '_ {
        let units: Box<dyn Iterator<Item = UnitLabel> + '_> = match &self.order.product {
            ProductConfig::Ups(ups) => Box::new(ups_units(ups)),
            ProductConfig::BatteryCharger(charger) => {
                Box::new(charger_units(charger, &self.customer_name))
            }
        };

        units.flat_map(move |unit| {
            SIDES.into_iter().map(move |side| PageSpec {
                side,
                product_label: unit.product_label.clone(),
                customer_name: self.customer_name.clone(),
                serial_number: format_serial(
                    self.fiscal_year,
                    &self.order.job_number,
                    &self.order.op_number,
                    &unit.serial_suffix,
                ),
                image_ref: self.order.sticker_image_ref.clone(),
                show_customer_in_parens: unit.show_customer_in_parens,
            })
        })
    }
}

fn ups_units(ups: &UpsConfig) -> impl Iterator<Item = UnitLabel> + '_ {
    (1..=ups.num_sets).flat_map(move |_set| {
        let bypass = (ups.units_per_set > 1).then(|| BYPASS_UNIT.to_string());
        (1..=ups.units_per_set)
            .map(ups_unit_name)
            .chain(bypass)
            .map(move |unit| UnitLabel {
                product_label: format!("{}kVA {unit}", ups.kva_rating),
                serial_suffix: ups_suffix(&unit).to_string(),
                show_customer_in_parens: true,
            })
    })
}

fn charger_units<'a>(
    charger: &'a ChargerConfig,
    customer_name: &'a str,
) -> impl Iterator<Item = UnitLabel> + 'a {
    let start = charger.first_index();
    let show_details = charger.shows_details();
    let details_label = show_details.then(|| charger_details_label(charger));

    (0..charger.num_chargers).map(move |offset| {
        let serial_suffix = charger_suffix(&charger_index_label(start.saturating_add(offset)));
        match &details_label {
            Some(label) => UnitLabel {
                product_label: label.clone(),
                serial_suffix,
                show_customer_in_parens: true,
            },
            None => UnitLabel {
                product_label: customer_name.to_string(),
                serial_suffix,
                show_customer_in_parens: false,
            },
        }
    })
}

/// `"{V}V/{A}A {type} for {Ah}Ah {battery} battery"`; unset values print empty.
fn charger_details_label(charger: &ChargerConfig) -> String {
    let text = |v: Option<u32>| v.map(|n| n.to_string()).unwrap_or_default();
    format!(
        "{}V/{}A {} for {}Ah {} battery",
        text(charger.voltage),
        text(charger.current),
        charger.charger_type,
        text(charger.battery_capacity_ah),
        charger.battery_type,
    )
}
