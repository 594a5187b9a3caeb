// src/utils/slug.rs

//! ASCII-only slugs for file names and URLs.

use unicode_normalization::UnicodeNormalization;

/// Characters that separate words.
const SEPARATORS: &str = "\t !\"#$%&'()*-/<=>?@[\\]^_`{|},.:";

/// Generate an ASCII slug, words joined by `delim`.
///
/// Accented letters are decomposed and reduced to their ASCII base;
/// anything else outside `[a-z0-9]` is dropped.
///
/// # Examples
/// ```
/// use pretalx_sync::utils::slug::slugify;
///
/// assert_eq!(slugify("Café: Über Rust!", "-"), "cafe-uber-rust");
/// ```
pub fn slugify(text: &str, delim: &str) -> String {
    text.to_lowercase()
        .split(|c: char| SEPARATORS.contains(c))
        .map(|word| {
            word.nfkd()
                .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(delim)
}
