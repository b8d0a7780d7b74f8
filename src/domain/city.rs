//! City-name normalisation for zone lookups.
//!
//! Zone names are matched after stripping diacritics and normalising case,
//! so `"cancún"`, `"CANCUN"` and `"Cancun"` all address the same zone.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercase joining words kept lowercase inside multi-word city names.
const PARTICLES: [&str; 7] = ["de", "del", "la", "las", "los", "el", "y"];

/// Strip diacritics, collapse whitespace and capitalise each word.
///
/// The first word is always capitalised; later Spanish particles stay
/// lowercase so `"ciudad de méxico"` becomes `"Ciudad de Mexico"`.
#[must_use]
pub fn normalize_city_name(input: &str) -> String {
    let stripped: String = input.nfd().filter(|c| !is_combining_mark(*c)).collect();

    stripped
        .split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if i > 0 && PARTICLES.contains(&lower.as_str()) {
                lower
            } else {
                capitalize(&lower)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_accents_and_capitalises() {
        assert_eq!(normalize_city_name("Cancún"), "Cancun");
        assert_eq!(normalize_city_name("cancun"), "Cancun");
        assert_eq!(normalize_city_name("CANCÚN"), "Cancun");
    }

    #[test]
    fn keeps_particles_lowercase() {
        assert_eq!(normalize_city_name("ciudad de méxico"), "Ciudad de Mexico");
        assert_eq!(normalize_city_name("Ciudad De Mexico"), "Ciudad de Mexico");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize_city_name("  san   josé "), "San Jose");
    }

    #[test]
    fn leading_particle_is_capitalised() {
        assert_eq!(normalize_city_name("la paz"), "La Paz");
    }
}
