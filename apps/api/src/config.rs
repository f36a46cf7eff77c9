use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::sticker::order::{ProductConfig, ProductOrder};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Directory generated sticker artifacts are written to.
    pub output_dir: PathBuf,
    pub settings: HostSettings,
}

/// Host preferences applied to incoming orders before they reach the engine.
#[derive(Debug, Clone)]
pub struct HostSettings {
    /// Image used when an order does not name one.
    pub default_sticker_path: PathBuf,
    /// Number chargers from 0 (first charger unnumbered) instead of 1.
    pub start_from_zero: bool,
    /// Print voltage/current/battery details on charger stickers.
    pub show_product_label: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            output_dir: env_path("OUTPUT_DIR", "output"),
            settings: HostSettings {
                default_sticker_path: env_path("DEFAULT_STICKER_PATH", "sticker.png"),
                start_from_zero: env_flag("START_FROM_ZERO", false)?,
                show_product_label: env_flag("SHOW_PRODUCT_LABEL", true)?,
            },
        })
    }
}

impl HostSettings {
    /// Fills the fields the order left to the host.
    pub fn apply_to(&self, order: &mut ProductOrder) {
        if order.sticker_image_ref.is_none() && self.default_sticker_path.is_file() {
            order.sticker_image_ref = Some(self.default_sticker_path.clone());
        }

        if let ProductConfig::BatteryCharger(charger) = &mut order.product {
            if charger.numbering_start.is_none() {
                charger.numbering_start = Some(u32::from(!self.start_from_zero));
            }
            if charger.show_product_details.is_none() {
                charger.show_product_details = Some(self.show_product_label);
            }
        }
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

fn env_flag(key: &str, default: bool) -> Result<bool> {
    match std::env::var(key) {
        Ok(raw) => parse_flag(&raw).with_context(|| format!("{key} must be true or false, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
