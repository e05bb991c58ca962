//! Filesystem-safe names from free text.

use crate::consts::UNSAFE_CHARS_REGEX;
use unicode_normalization::UnicodeNormalization;

/// Default maximum length (in characters) of a single sanitized path segment.
pub const DEFAULT_MAX_LEN: usize = 30;
/// Returned whenever sanitizing leaves nothing behind.
pub const FALLBACK_NAME: &str = "unnamed";

const NOISE: [char; 3] = ['.', '_', '-'];

/// Returns `raw` normalised for safe use as a single path segment.
///
/// 1. Compatibility-decompose (NFKD) and drop everything outside ASCII, so
///    accented letters lose their diacritics and symbols without an ASCII
///    counterpart disappear.
/// 2. Replace every run of characters outside `[A-Za-z0-9._-]` with `_`.
/// 3. Trim leading/trailing `.`, `_` and `-`.
/// 4. Truncate to `max_len` characters and trim trailing noise again.
/// 5. Fall back to [`FALLBACK_NAME`] if nothing is left.
///
/// ```
/// use undump_extract::slugify;
/// assert_eq!(slugify("Règlement (UE) 2016/679", 30), "Reglement_UE_2016_679");
/// assert_eq!(slugify("...", 30), "unnamed");
/// assert_eq!(slugify("Example Title", 8), "Example");
/// ```
pub fn slugify(raw: impl AsRef<str>, max_len: usize) -> String {
    let ascii: String = raw.as_ref().nfkd().filter(char::is_ascii).collect();
    let safe = UNSAFE_CHARS_REGEX.replace_all(&ascii, "_");
    let safe = safe.trim_matches(NOISE);
    // Everything left is ASCII: byte offsets are character offsets.
    let truncated = safe[..safe.len().min(max_len)].trim_end_matches(NOISE);
    match truncated.is_empty() {
        true => FALLBACK_NAME.to_string(),
        false => truncated.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Example Title", "Example_Title")]
    #[case("  spaced   out  ", "spaced_out")]
    #[case("Crème brûlée", "Creme_brulee")]
    #[case("ﬁne ①", "fine_1")]
    #[case("__--..hidden..--__", "hidden")]
    #[case("a/b\\c:d*e?f", "a_b_c_d_e_f")]
    #[case("keep.dots-and_underscores", "keep.dots-and_underscores")]
    #[case("日本語", "unnamed")]
    #[case("", "unnamed")]
    #[case("!!!", "unnamed")]
    fn test_slugify(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(slugify(raw, DEFAULT_MAX_LEN), expected);
    }

    #[test]
    fn test_truncation_retrims_noise() {
        // Cut lands right after the underscore between the words.
        assert_eq!(slugify("abcdefghi jklmnop", 10), "abcdefghi");
        assert_eq!(slugify("Regulation on the protection of natural persons", 30), "Regulation_on_the_protection_o");
        assert!(slugify(&"x".repeat(100), DEFAULT_MAX_LEN).len() <= DEFAULT_MAX_LEN);
    }

    #[rstest]
    #[case("Example Title")]
    #[case("Règlement (UE) 2016/679 du Parlement européen et du Conseil")]
    #[case("...leading and trailing...")]
    #[case("a  -  b  -  c")]
    #[case("日本語 mixed ascii")]
    #[case("")]
    #[case("x_y_z_.-_.-_.-_.-_.-_.-_.-_.-_.-_.-_.-tail")]
    fn test_idempotent(#[case] raw: &str, #[values(7, 10, 30, 200)] max_len: usize) {
        let once = slugify(raw, max_len);
        assert_eq!(slugify(&once, max_len), once);
    }

    #[rstest]
    #[case("Überschrift / Sous-titre — ½")]
    #[case("-_.")]
    #[case("tab\tnewline\ncarriage\r")]
    #[case("emoji 🎉 party")]
    fn test_output_is_safe(#[case] raw: &str) {
        let slug = slugify(raw, DEFAULT_MAX_LEN);
        assert!(!slug.is_empty());
        assert!(slug.chars().all(|c| c.is_ascii_alphanumeric() || NOISE.contains(&c)));
        assert!(!slug.starts_with(NOISE));
        assert!(!slug.ends_with(NOISE));
    }
}
