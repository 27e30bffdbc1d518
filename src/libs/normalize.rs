use unicode_normalization::UnicodeNormalization;

/// Builds the dedup key for a display name.
///
/// Trims, lower-cases, strips combining diacritics (U+0300..=U+036F after
/// NFD decomposition) and collapses internal whitespace runs to one space.
/// `"  Tornillos  Ñandú "` and `"tornillos nandu"` share a key.
pub fn normalize_text(input: &str) -> String {
    let stripped: String = input
        .trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
