//! Name derivation
//!
//! Topic file names come from titles: every run of whitespace or non-word
//! characters becomes one `_`, edges are trimmed and a stray one-character
//! leading token (`A_…`) is dropped. Image names keep word characters only.

use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\W]+").expect("separator pattern is valid"));
static UNDERSCORES: Lazy<Regex> = Lazy::new(|| Regex::new(r"_+").expect("underscore pattern is valid"));
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("non-word pattern is valid"));

/// Base file stem for a title, without type prefix.
///
/// `None` when nothing usable is left.
#[must_use]
pub fn base_name(title: &str) -> Option<String> {
    let name = SEPARATORS.replace_all(title, "_");
    let name = UNDERSCORES.replace_all(&name, "_");
    let name = drop_stray_token(name.trim_matches('_'));
    (!name.is_empty()).then(|| name.to_string())
}

fn drop_stray_token(name: &str) -> &str {
    let mut chars = name.char_indices();
    match (chars.next(), chars.next()) {
        (Some(_), Some((at, '_'))) => &name[at + 1..],
        _ => name,
    }
}

/// Marker carried by every renamed image
#[must_use]
pub fn image_marker(prefix: &str) -> String {
    format!("img_{prefix}_")
}

/// Image stem for a (disambiguated) title: spaces become `_`, other
/// non-word characters are dropped
#[must_use]
pub fn image_stem(prefix: &str, title: &str) -> String {
    let words = title.trim().replace(' ', "_");
    format!("{}{}", image_marker(prefix), NON_WORD.replace_all(&words, ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_become_stems() {
        assert_eq!(base_name("Clean the Rollers").as_deref(), Some("Clean_the_Rollers"));
        assert_eq!(base_name("  Safety: read first!  ").as_deref(), Some("Safety_read_first"));
        assert_eq!(base_name("A guide to pumps").as_deref(), Some("guide_to_pumps"));
        assert_eq!(base_name("snake__case").as_deref(), Some("snake_case"));
        assert_eq!(base_name("Ölwechsel – Übersicht").as_deref(), Some("Ölwechsel_Übersicht"));
        assert_eq!(base_name(" -- "), None);
    }

    #[test]
    fn image_stems() {
        assert_eq!(image_stem("x", "Roller Assembly"), "img_x_Roller_Assembly");
        assert_eq!(image_stem("x", "Roller Assembly 2"), "img_x_Roller_Assembly_2");
        assert_eq!(image_stem("p", "Fig. 3 (left)"), "img_p_Fig_3_left");
    }
}
