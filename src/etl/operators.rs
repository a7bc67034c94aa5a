//! Operator name canonicalisation.
//!
//! The public dataset spells the same company many ways ("YPF S.A.",
//! "Ypf Sa", "PAN AMERICAN ENERGY SL"...). Loads fold them into one name.

/// (substring, canonical name). First match wins.
const CANONICAL_OPERATORS: &[(&str, &str)] = &[
    ("YPF", "YPF"),
    ("VISTA", "VISTA ENERGY"),
    ("PAN AMERICAN", "PAE"),
    ("PAE", "PAE"),
    ("SHELL", "SHELL"),
    ("TECPETROL", "TECPETROL"),
    ("PLUSPETROL", "PLUSPETROL"),
    ("TOTAL", "TOTAL ENERGIES"),
];

/// Canonical operator name: a known group name when the raw name contains
/// one of the group keys (case-insensitive), otherwise the trimmed,
/// upper-cased raw name.
pub fn canonical_operator(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    CANONICAL_OPERATORS
        .iter()
        .find(|(needle, _)| upper.contains(needle))
        .map(|(_, name)| name.to_string())
        .unwrap_or(upper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_groups_are_folded() {
        assert_eq!(canonical_operator("YPF S.A."), "YPF");
        assert_eq!(canonical_operator("Vista Oil & Gas Argentina SAU"), "VISTA ENERGY");
        assert_eq!(canonical_operator("Pan American Energy SL"), "PAE");
        assert_eq!(canonical_operator("Shell Argentina S.A."), "SHELL");
        assert_eq!(canonical_operator("Total Austral S.A."), "TOTAL ENERGIES");
        assert_eq!(canonical_operator("  tecpetrol s.a. "), "TECPETROL");
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(canonical_operator("ypf total joint venture"), "YPF");
    }

    #[test]
    fn test_unknown_names_are_upper_cased() {
        assert_eq!(canonical_operator(" Chevron Argentina srl "), "CHEVRON ARGENTINA SRL");
    }
}
