/// Joins the given fields with a single space and case-folds the result.
///
/// Every classifier matches keywords against text built this way, so the
/// field order only matters for readability of debug output.
pub fn fold_fields(fields: &[&str]) -> String {
    let cleaned = fields
        .iter()
        .map(|field| field.replace(['\u{feff}', '\u{200b}'], ""))
        .collect::<Vec<_>>()
        .join(" ");
    cleaned.to_lowercase()
}

pub fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|keyword| haystack.contains(keyword.as_str()))
}

/// Counts how many distinct keywords occur in the text (each keyword counts once).
pub fn count_hits(haystack: &str, keywords: &[String]) -> usize {
    keywords
        .iter()
        .filter(|keyword| haystack.contains(keyword.as_str()))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folding_lowercases_accented_letters() {
        let folded = fold_fields(&["APARTADÓ, Antioquia", "Cajero"]);
        assert_eq!(folded, "apartadó, antioquia cajero");
    }

    #[test]
    fn folding_strips_zero_width_characters() {
        let folded = fold_fields(&["\u{feff}Turbo\u{200b}"]);
        assert_eq!(folded, "turbo");
    }

    #[test]
    fn hits_count_each_keyword_once() {
        let keywords = vec!["turbo".to_string(), "carepa".to_string(), "necocli".to_string()];
        assert_eq!(count_hits("turbo turbo carepa", &keywords), 2);
        assert!(contains_any("sede carepa", &keywords));
        assert!(!contains_any("", &keywords));
    }
}
