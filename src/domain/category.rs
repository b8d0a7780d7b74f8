//! Restaurant cuisine categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The fixed set of cuisine categories a restaurant can carry.
///
/// The canonical spelling is the lowercase Spanish name used by the input
/// files and persisted verbatim by every store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sushi,
    Italiana,
    Francesa,
    Mexicana,
    China,
}

impl Category {
    pub const ALL: [Self; 5] = [
        Self::Sushi,
        Self::Italiana,
        Self::Francesa,
        Self::Mexicana,
        Self::China,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sushi => "sushi",
            Self::Italiana => "italiana",
            Self::Francesa => "francesa",
            Self::Mexicana => "mexicana",
            Self::China => "china",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("SUSHI".parse::<Category>(), Ok(Category::Sushi));
        assert_eq!(" Mexicana ".parse::<Category>(), Ok(Category::Mexicana));
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("thai".parse::<Category>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for category in Category::ALL {
            assert_eq!(category.to_string().parse::<Category>(), Ok(category));
        }
    }
}
