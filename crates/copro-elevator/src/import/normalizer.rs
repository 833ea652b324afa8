/// Removes byte-order marks and zero-width spaces left by spreadsheet exports.
pub(crate) fn strip_invisible(value: &str) -> String {
    value.replace(['\u{feff}', '\u{200b}'], "")
}

/// Splits a `;`-separated owner cell into trimmed, single-spaced names.
pub(crate) fn split_owners(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(|owner| owner.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|owner| !owner.is_empty())
        .collect()
}

pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "non" => Some(false),
        "1" | "true" | "yes" | "oui" => Some(true),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invisible_characters_are_removed() {
        assert_eq!(strip_invisible("\u{feff}id,build\u{200b}ing"), "id,building");
    }

    #[test]
    fn owners_are_split_and_collapsed() {
        assert_eq!(
            split_owners(" Petit  Anne ; ;Petit Marc"),
            vec!["Petit Anne".to_string(), "Petit Marc".to_string()]
        );
        assert!(split_owners("").is_empty());
    }

    #[test]
    fn flags_accept_english_and_french() {
        assert_eq!(parse_flag("Oui"), Some(true));
        assert_eq!(parse_flag("non"), Some(false));
        assert_eq!(parse_flag(""), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
