use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Result, SeatingError};
use crate::seating::{SeatingLayout, ShiftLayout};

/// Upper bound on the tables of a single series
pub const MAX_TABLES_PER_SERIES: u32 = 1000;

/// Runtime settings, read from the environment (and `.env` if present)
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub admin_password: String,
    pub roster_path: PathBuf,
    pub assignments_path: PathBuf,
    pub export_dir: PathBuf,
    pub layout: SeatingLayout,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SeatingLayout::default();
        let layout = SeatingLayout {
            morning: ShiftLayout::new(
                table_count(&lookup, "MORNING_FIRST_SERIES", defaults.morning.first_series)?,
                table_count(&lookup, "MORNING_SECOND_SERIES", defaults.morning.second_series)?,
            ),
            evening: ShiftLayout::new(
                table_count(&lookup, "EVENING_FIRST_SERIES", defaults.evening.first_series)?,
                table_count(&lookup, "EVENING_SECOND_SERIES", defaults.evening.second_series)?,
            ),
        };

        Ok(Self {
            port: parse_or(&lookup, "PORT", 8080)?,
            admin_password: lookup("ADMIN_PASSWORD").unwrap_or_else(|| "admin123".to_string()),
            roster_path: lookup("ROSTER_CSV")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/roster.csv")),
            assignments_path: lookup("ASSIGNMENTS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("assignments.json")),
            export_dir: lookup("EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            layout,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => {
            value.trim().parse().map_err(|_| SeatingError::Config {
                key: key.to_string(),
                value,
            })
        }
        _ => Ok(default),
    }
}

fn table_count<F>(lookup: &F, key: &str, default: u32) -> Result<u32>
where
    F: Fn(&str) -> Option<String>,
{
    let count = parse_or(lookup, key, default)?;
    if count > MAX_TABLES_PER_SERIES {
        return Err(SeatingError::Config {
            key: key.to_string(),
            value: count.to_string(),
        });
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.admin_password, "admin123");
        assert_eq!(config.layout, SeatingLayout::default());
    }

    #[test]
    fn layout_overrides() {
        let config = config_from(&[("EVENING_SECOND_SERIES", "10"), ("PORT", "9000")]).unwrap();
        assert_eq!(config.layout.evening, ShiftLayout::new(28, 10));
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn rejects_oversized_table_count() {
        let err = config_from(&[("EVENING_FIRST_SERIES", "4294967295")]).unwrap_err();
        assert!(matches!(err, SeatingError::Config { ref key, .. } if key == "EVENING_FIRST_SERIES"));
        assert!(config_from(&[("EVENING_FIRST_SERIES", "1000")]).is_ok());
    }

    #[test]
    fn rejects_non_numeric_table_count() {
        let err = config_from(&[("MORNING_FIRST_SERIES", "many")]).unwrap_err();
        assert!(matches!(err, SeatingError::Config { ref key, .. } if key == "MORNING_FIRST_SERIES"));
    }
}
