//! Calendar months and the vocabulary accepted for them.
//!
//! The canonical identifier of a month is its English name (`"January"`),
//! which is also the partition value written to the wide-column tables.
//! Lookups accept Spanish or English names and the numerals `1`-`12`.

use std::fmt;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

const SPANISH: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

impl Month {
    /// All months in calendar order.
    pub const ALL: [Self; 12] = [
        Self::January,
        Self::February,
        Self::March,
        Self::April,
        Self::May,
        Self::June,
        Self::July,
        Self::August,
        Self::September,
        Self::October,
        Self::November,
        Self::December,
    ];

    /// Month from its 1-based calendar number.
    #[must_use]
    pub fn from_number(n: u32) -> Option<Self> {
        let index = usize::try_from(n).ok()?.checked_sub(1)?;
        Self::ALL.get(index).copied()
    }

    /// Month at a 0-based position in a twelve-entry sales sequence.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// 1-based calendar number.
    #[must_use]
    pub const fn number(self) -> u32 {
        self as u32 + 1
    }

    /// Canonical English name, e.g. `"March"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::January => "January",
            Self::February => "February",
            Self::March => "March",
            Self::April => "April",
            Self::May => "May",
            Self::June => "June",
            Self::July => "July",
            Self::August => "August",
            Self::September => "September",
            Self::October => "October",
            Self::November => "November",
            Self::December => "December",
        }
    }

    #[must_use]
    pub const fn spanish(self) -> &'static str {
        SPANISH[self as usize]
    }

    /// Resolve user input to a month.
    ///
    /// Accepts English or Spanish names in any case, or a numeral between 1
    /// and 12. Anything else yields `None`.
    #[must_use]
    pub fn resolve(input: &str) -> Option<Self> {
        let needle = input.trim();
        if let Ok(n) = needle.parse::<u32>() {
            return Self::from_number(n);
        }
        Self::ALL.into_iter().find(|m| {
            m.as_str().eq_ignore_ascii_case(needle) || m.spanish().eq_ignore_ascii_case(needle)
        })
    }

    /// Month of the given date.
    #[must_use]
    pub fn of<D: Datelike>(date: &D) -> Self {
        // month() is always 1..=12
        Self::from_number(date.month()).unwrap_or(Self::January)
    }

    /// Month of the local wall clock.
    #[must_use]
    pub fn current() -> Self {
        Self::of(&chrono::Local::now())
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn spanish_english_and_numeral_resolve_identically() {
        assert_eq!(Month::resolve("enero"), Some(Month::January));
        assert_eq!(Month::resolve("january"), Some(Month::January));
        assert_eq!(Month::resolve("1"), Some(Month::January));
        assert_eq!(Month::resolve("Diciembre"), Some(Month::December));
        assert_eq!(Month::resolve(" 12 "), Some(Month::December));
    }

    #[test]
    fn out_of_range_numerals_do_not_resolve() {
        assert_eq!(Month::resolve("0"), None);
        assert_eq!(Month::resolve("13"), None);
        assert_eq!(Month::resolve("-1"), None);
    }

    #[test]
    fn unknown_names_do_not_resolve() {
        assert_eq!(Month::resolve("brumaire"), None);
        assert_eq!(Month::resolve(""), None);
    }

    #[test]
    fn number_and_index_agree() {
        for (i, month) in Month::ALL.into_iter().enumerate() {
            assert_eq!(Month::from_index(i), Some(month));
            assert_eq!(Month::from_number(month.number()), Some(month));
        }
        assert_eq!(Month::from_index(12), None);
    }

    #[test]
    fn month_of_date() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 15).expect("valid date");
        assert_eq!(Month::of(&date), Month::July);
    }
}
