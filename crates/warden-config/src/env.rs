//! Environment variable overrides.
//!
//! Unlike file layers, environment variables win over everything else. Only
//! the variables in [`OVERRIDES`] are consulted.

use std::collections::HashMap;

/// `(variable, section, key)` for every supported override.
pub const OVERRIDES: &[(&str, &str, &str)] = &[
    ("WARDEN_ROOT", "session", "root"),
    ("WARDEN_LOG_LEVEL", "logging", "level"),
    ("WARDEN_LOG_FORMAT", "logging", "format"),
];

/// Snapshot the `WARDEN_*` variables from the process environment.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with("WARDEN_"))
        .collect()
}

/// Write every set override into `merged`. Returns how many were applied.
///
/// Empty values are ignored so that `WARDEN_ROOT=` does not blank the root.
pub fn apply_env_overrides(merged: &mut toml::Value, env: &HashMap<String, String>) -> usize {
    let Some(root) = merged.as_table_mut() else {
        return 0;
    };

    let mut applied = 0usize;
    for (var, section, key) in OVERRIDES {
        let Some(value) = env.get(*var).filter(|v| !v.is_empty()) else {
            continue;
        };
        let table = root
            .entry((*section).to_owned())
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        if let Some(table) = table.as_table_mut() {
            table.insert((*key).to_owned(), toml::Value::String(value.clone()));
            applied = applied.saturating_add(1);
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_overrides_applied() {
        let mut merged: toml::Value = toml::from_str("[session]\nroot = \"/a\"\n").unwrap();
        let count = apply_env_overrides(
            &mut merged,
            &env(&[("WARDEN_ROOT", "/b"), ("WARDEN_LOG_FORMAT", "json")]),
        );

        assert_eq!(count, 2);
        assert_eq!(merged["session"]["root"].as_str(), Some("/b"));
        assert_eq!(merged["logging"]["format"].as_str(), Some("json"));
    }

    #[test]
    fn test_empty_and_unrelated_ignored() {
        let mut merged: toml::Value = toml::from_str("[session]\nroot = \"/a\"\n").unwrap();
        let count = apply_env_overrides(
            &mut merged,
            &env(&[("WARDEN_ROOT", ""), ("HOME", "/home/x")]),
        );

        assert_eq!(count, 0);
        assert_eq!(merged["session"]["root"].as_str(), Some("/a"));
    }
}
