//! Command and query-intent enumeration.
//!
//! Every user-facing operation is a value of [`Command`]; the application
//! layer dispatches it to the lifecycle manager or to the query adapter of
//! the store that can answer it.

use std::fmt;

use serde::Serialize;

use crate::domain::StoreKind;

/// Ranking direction for follower counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowerOrder {
    /// Fewest followers first.
    Ascending,
    /// Most followers first.
    #[default]
    Descending,
}

/// Which zones a per-zone ranking covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", content = "value", rename_all = "snake_case")]
pub enum ZoneScope {
    All,
    /// The first `n` zones by id.
    First(usize),
    Named(String),
}

impl Default for ZoneScope {
    fn default() -> Self {
        Self::First(5)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "sales", rename_all = "snake_case")]
pub enum SalesQuery {
    CurrentMonth,
    CurrentMonthTop,
    All,
    ByMonth { month: String },
    ByRestaurant { restaurant: String },
    ByRestaurantAndMonth { restaurant: String, month: String },
    /// Inclusive at both ends, across all months.
    InRange { min: i64, max: i64 },
}

/// A read-only report request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    TopByFollowers { order: FollowerOrder },
    RestaurantsInCity { city: String },
    TopByZone { scope: ZoneScope },
    TopByCategory { category: String },
    Sales { query: SalesQuery },
}

impl Intent {
    /// The only store able to answer this intent.
    #[must_use]
    pub const fn store(&self) -> StoreKind {
        match self {
            Self::TopByFollowers { .. } | Self::RestaurantsInCity { .. } => StoreKind::Graph,
            Self::TopByZone { .. } | Self::TopByCategory { .. } => StoreKind::Document,
            Self::Sales { .. } => StoreKind::Column,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopByFollowers { order } => write!(f, "top-followers ({order:?})"),
            Self::RestaurantsInCity { city } => write!(f, "restaurants-in-city '{city}'"),
            Self::TopByZone { scope } => write!(f, "top-by-zone {scope:?}"),
            Self::TopByCategory { category } => write!(f, "top-by-category '{category}'"),
            Self::Sales { query } => write!(f, "sales {query:?}"),
        }
    }
}

/// Anything the system can be asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateSchemas,
    LoadAll,
    DropAll,
    Query(Intent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intents_route_to_their_store() {
        assert_eq!(
            Intent::TopByFollowers {
                order: FollowerOrder::Ascending
            }
            .store(),
            StoreKind::Graph
        );
        assert_eq!(
            Intent::TopByCategory {
                category: "sushi".into()
            }
            .store(),
            StoreKind::Document
        );
        assert_eq!(
            Intent::Sales {
                query: SalesQuery::All
            }
            .store(),
            StoreKind::Column
        );
    }

    #[test]
    fn default_zone_scope_is_first_five() {
        assert_eq!(ZoneScope::default(), ZoneScope::First(5));
    }
}
