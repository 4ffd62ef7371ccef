/// Canonicalizes a food name into the key used for cache comparisons.
///
/// Lower-cases the input and keeps ASCII letters only, so minor formatting
/// differences ("Fried  Rice!" vs "friedrice") land on the same key.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
