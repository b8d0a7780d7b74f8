//! Follower rankings and city listings, answered by the graph store.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::domain::{normalize_city_name, Measure, QueryNotFound, QueryOutcome, Report, ReportRow};
use crate::error::StoreError;
use crate::port::inbound::FollowerOrder;
use crate::port::outbound::graph::GraphQuery;
use crate::port::outbound::GraphStore;

/// Rows per ranking.
const TOP: usize = 3;

pub struct GraphQueries {
    store: Arc<dyn GraphStore>,
}

struct Count {
    name: String,
    followers: u64,
}

fn counts(rows: &Value) -> Vec<Count> {
    rows.as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(|row| {
                    Some(Count {
                        name: row["restaurant_name"].as_str()?.to_string(),
                        followers: row["followers_count"].as_u64().unwrap_or(0),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

impl GraphQueries {
    #[must_use]
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Top three restaurants by follower count.
    ///
    /// Ties keep the store's uid order, which follows input order.
    pub async fn top_by_followers(
        &self,
        order: FollowerOrder,
    ) -> Result<QueryOutcome, StoreError> {
        let response = self.store.query(&GraphQuery::FollowerCounts).await?;
        let mut ranked = counts(&response["all"]);
        match order {
            FollowerOrder::Descending => ranked.sort_by(|a, b| b.followers.cmp(&a.followers)),
            FollowerOrder::Ascending => ranked.sort_by(|a, b| a.followers.cmp(&b.followers)),
        }
        let rows = ranked
            .into_iter()
            .take(TOP)
            .map(|c| ReportRow::new(c.name, Measure::Followers(c.followers)))
            .collect();
        let direction = match order {
            FollowerOrder::Descending => "most",
            FollowerOrder::Ascending => "fewest",
        };
        let title = format!("Top {TOP} restaurants with the {direction} followers");
        Ok(Report::new(title, rows).into())
    }

    /// Restaurants located in a city, with their follower counts.
    ///
    /// The name is matched without accents or case. A city that does not
    /// exist is reported as not found; a city without restaurants gives an
    /// empty report.
    pub async fn restaurants_in_city(&self, city: &str) -> Result<QueryOutcome, StoreError> {
        let normalized = normalize_city_name(city);
        debug!(input = city, normalized = %normalized, "City lookup");
        if normalized.is_empty() {
            return Ok(QueryNotFound::City(city.to_string()).into());
        }

        let response = self
            .store
            .query(&GraphQuery::RestaurantsInCity {
                city: normalized.clone(),
            })
            .await?;
        let Some(cities) = response["city"].as_array().filter(|c| !c.is_empty()) else {
            return Ok(QueryNotFound::City(city.to_string()).into());
        };

        let mut rows = Vec::new();
        for entry in cities {
            let city_name = entry["city_name"].as_str().unwrap_or(&normalized);
            for count in counts(&entry["~located_in"]) {
                rows.push(
                    ReportRow::new(count.name, Measure::Followers(count.followers))
                        .with_secondary(Measure::Zone(city_name.to_string())),
                );
            }
        }
        Ok(Report::new(format!("Restaurants in {normalized}"), rows).into())
    }
}
