#[cfg(test)]
mod tests {
    use fieldbook::libs::normalize::normalize_text;

    #[test]
    fn test_lowercases_and_trims() {
        assert_eq!(normalize_text("  Cinta Americana  "), "cinta americana");
    }

    #[test]
    fn test_strips_diacritics() {
        assert_eq!(normalize_text("Ñandú"), "nandu");
        assert_eq!(normalize_text("Tornillería Épica"), "tornilleria epica");
        assert_eq!(normalize_text("Cafe\u{0301}"), "cafe");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize_text("tornillos \t 4x40\n  largos"), "tornillos 4x40 largos");
    }

    #[test]
    fn test_equivalent_names_share_a_key() {
        let key = normalize_text("Pegamento épico");
        for name in ["pegamento epico", "PEGAMENTO ÉPICO", " pegamento   Épico "] {
            assert_eq!(normalize_text(name), key);
        }
    }

    #[test]
    fn test_blank_and_mark_only_inputs_are_empty() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text("   "), "");
        assert_eq!(normalize_text("\u{0301}\u{0308}"), "");
    }

    #[test]
    fn test_other_scripts_pass_through() {
        assert_eq!(normalize_text("Гвозди"), "гвозди");
        assert_eq!(normalize_text("ß"), "ß");
    }
}
