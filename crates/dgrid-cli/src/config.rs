//! Grid configuration from an optional JSON file plus the environment.
//!
//! Environment variables override the file:
//! `DGRID_LOOK_AHEAD`, `DGRID_LOOK_BEHIND`, `DGRID_FIELD_WEIGHT` and
//! `DGRID_SPREAD` (`isotropic8` or `bearing_gated5`).

use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use dgrid_core::{GridConfig, SpreadPolicy};

pub fn load(path: Option<&Path>) -> Result<GridConfig> {
    let mut config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => GridConfig::default(),
    };
    apply_overrides(&mut config, |key| env::var(key).ok());
    config.validate()?;
    Ok(config)
}

/// Apply overrides from `lookup`. Unparseable values are ignored.
pub fn apply_overrides(config: &mut GridConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(look_ahead) = lookup("DGRID_LOOK_AHEAD").and_then(|s| s.parse().ok()) {
        config.look_ahead = look_ahead;
    }
    if let Some(look_behind) = lookup("DGRID_LOOK_BEHIND").and_then(|s| s.parse().ok()) {
        config.look_behind = look_behind;
    }
    if let Some(field_weight) = lookup("DGRID_FIELD_WEIGHT").and_then(|s| s.parse().ok()) {
        config.field_weight = field_weight;
    }
    if let Some(policy) = lookup("DGRID_SPREAD").and_then(|s| parse_spread(&s)) {
        config.spread_policy = policy;
    }
}

fn parse_spread(value: &str) -> Option<SpreadPolicy> {
    match value.trim().to_ascii_lowercase().as_str() {
        "isotropic8" | "isotropic" => Some(SpreadPolicy::Isotropic8),
        "bearing_gated5" | "bearing_gated" | "gated" => Some(SpreadPolicy::BearingGated5),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = GridConfig {
            look_ahead: 10,
            ..GridConfig::default()
        };
        apply_overrides(
            &mut config,
            lookup(&[
                ("DGRID_LOOK_AHEAD", "30"),
                ("DGRID_FIELD_WEIGHT", "0.5"),
                ("DGRID_SPREAD", "bearing_gated5"),
            ]),
        );
        assert_eq!(config.look_ahead, 30);
        assert_eq!(config.look_behind, 2);
        assert_eq!(config.field_weight, 0.5);
        assert_eq!(config.spread_policy, SpreadPolicy::BearingGated5);
    }

    #[test]
    fn garbage_values_are_ignored() {
        let mut config = GridConfig::default();
        apply_overrides(
            &mut config,
            lookup(&[("DGRID_LOOK_BEHIND", "lots"), ("DGRID_SPREAD", "sideways")]),
        );
        assert_eq!(config, GridConfig::default());
    }

    #[test]
    fn loads_partial_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.json");
        fs::write(&path, r#"{"look_ahead": 12, "field_weight": 0.5}"#).unwrap();
        let mut config: GridConfig =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        apply_overrides(&mut config, lookup(&[]));
        assert_eq!(config.look_ahead, 12);
        assert_eq!(config.field_weight, 0.5);
        assert_eq!(config.danger_ceiling, 0.4);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(load(Some(&path)).is_err());
        assert!(load(Some(&dir.path().join("missing.json"))).is_err());
    }
}
