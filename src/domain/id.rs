//! Domain identifier types.
//!
//! Identifiers come from the tabular input and are assigned once; nothing in
//! the crate mints or rewrites them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// User identifier - newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(u64);

impl UserId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Restaurant identifier - newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RestaurantId(u64);

impl RestaurantId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RestaurantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RestaurantId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Zone identifier - newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneId(u64);

impl ZoneId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ZoneId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_their_number() {
        assert_eq!(UserId::new(7).to_string(), "7");
        assert_eq!(RestaurantId::from(12).to_string(), "12");
        assert_eq!(ZoneId::new(3).get(), 3);
    }

    #[test]
    fn ids_order_numerically() {
        let mut ids = vec![RestaurantId::new(10), RestaurantId::new(2), RestaurantId::new(5)];
        ids.sort();
        assert_eq!(ids, vec![RestaurantId::new(2), RestaurantId::new(5), RestaurantId::new(10)]);
    }
}
