use std::collections::HashMap;

/// Normalize a raw header for comparison.
///
/// Lower-cases, collapses every run of whitespace or punctuation into a single
/// `_`, and trims leading and trailing separators: `"AMCAS ID"`, `"Amcas_ID"`
/// and `" amcas-id "` all become `amcas_id`.
pub fn normalize_header(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    let mut pending_separator = false;
    for ch in raw.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !normalized.is_empty() {
                normalized.push('_');
            }
            pending_separator = false;
            normalized.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
    }
    normalized
}

/// Lookup from normalized header to the raw header it came from.
///
/// When two raw headers normalize to the same key, the first one wins.
#[derive(Debug, Clone, Default)]
pub struct HeaderLookup {
    map: HashMap<String, String>,
}

impl HeaderLookup {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = HashMap::new();
        for header in headers {
            let header = header.as_ref();
            map.entry(normalize_header(header))
                .or_insert_with(|| header.to_string());
        }
        Self { map }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(&normalize_header(name)).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(&normalize_header(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_spacing_and_punctuation() {
        assert_eq!(normalize_header("AMCAS ID"), "amcas_id");
        assert_eq!(normalize_header("Amcas_ID"), "amcas_id");
        assert_eq!(normalize_header("  amcas--id. "), "amcas_id");
        assert_eq!(normalize_header("1 - Personal Attributes"), "1_personal_attributes");
        assert_eq!(normalize_header("___"), "");
    }

    #[test]
    fn lookup_keeps_first_raw_header() {
        let lookup = HeaderLookup::new(["Exp Type", "exp_type"]);
        assert_eq!(lookup.get("EXP-TYPE"), Some("Exp Type"));
        assert!(lookup.contains("exp type"));
        assert!(!lookup.contains("exp_name"));
    }
}
