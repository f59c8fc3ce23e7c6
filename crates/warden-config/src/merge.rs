//! Layer merging.

/// Recursively deep-merge `overlay` into `base`.
///
/// - Tables merge recursively per-field.
/// - Scalars and arrays from the overlay **replace** the base value.
pub fn deep_merge(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                if let Some(base_val) = base_table.get_mut(key) {
                    deep_merge(base_val, overlay_val);
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> toml::Value {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn test_tables_merge_per_field() {
        let mut base = parse("[session]\nroot = \"/a\"\nmax_open_handles = 64\n");
        let overlay = parse("[session]\nroot = \"/b\"\n");
        deep_merge(&mut base, &overlay);

        assert_eq!(base["session"]["root"].as_str(), Some("/b"));
        assert_eq!(base["session"]["max_open_handles"].as_integer(), Some(64));
    }

    #[test]
    fn test_arrays_replace() {
        let mut base = parse("[logging]\ndirectives = [\"a=debug\", \"b=warn\"]\n");
        let overlay = parse("[logging]\ndirectives = [\"c=trace\"]\n");
        deep_merge(&mut base, &overlay);

        let directives = base["logging"]["directives"].as_array().unwrap();
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].as_str(), Some("c=trace"));
    }

    #[test]
    fn test_new_sections_inserted() {
        let mut base = parse("[session]\nroot = \"/a\"\n");
        let overlay = parse("[logging]\nlevel = \"debug\"\n");
        deep_merge(&mut base, &overlay);

        assert_eq!(base["session"]["root"].as_str(), Some("/a"));
        assert_eq!(base["logging"]["level"].as_str(), Some("debug"));
    }
}
