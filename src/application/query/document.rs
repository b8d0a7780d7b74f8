//! Rating rankings answered by the document store.

use std::sync::Arc;

use serde_json::Value;

use crate::application::projection::document::{zone_name_key, RESTAURANTS, ZONES};
use crate::domain::{Category, Measure, QueryNotFound, QueryOutcome, Report, ReportRow};
use crate::error::StoreError;
use crate::port::inbound::ZoneScope;
use crate::port::outbound::document::{
    Document, Filter, FindOptions, Pipeline, SortKey, Stage,
};
use crate::port::outbound::DocumentStore;

const TOP: usize = 3;

/// Rating descending, then id so equal ratings rank in input order.
fn by_rating() -> Vec<SortKey> {
    vec![SortKey::desc("rating"), SortKey::asc("id")]
}

fn rating_row(doc: &Document) -> Option<ReportRow> {
    let name = doc.get("name")?.as_str()?;
    let rating = doc.get("rating").and_then(Value::as_f64).unwrap_or(0.0);
    Some(ReportRow::new(name, Measure::Rating(rating)))
}

pub struct DocumentQueries {
    store: Arc<dyn DocumentStore>,
}

impl DocumentQueries {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Top three restaurants by rating inside each zone in scope.
    ///
    /// Zones are visited in id order. Restaurants are joined in with a
    /// lookup stage because zone documents do not list them.
    pub async fn top_by_zone(&self, scope: &ZoneScope) -> Result<QueryOutcome, StoreError> {
        let mut stages = Vec::new();
        if let ZoneScope::Named(name) = scope {
            stages.push(Stage::Match(Filter::eq("name_key", zone_name_key(name))));
        }
        stages.push(Stage::Sort(vec![SortKey::asc("id")]));
        if let ZoneScope::First(n) = scope {
            stages.push(Stage::Limit(*n));
        }
        stages.push(Stage::Lookup {
            from: RESTAURANTS.into(),
            local_field: "id".into(),
            foreign_field: "zone_id".into(),
            pipeline: vec![Stage::Sort(by_rating()), Stage::Limit(TOP)],
            as_field: "top".into(),
        });

        let zones = self.store.aggregate(ZONES, &Pipeline(stages)).await?;
        if let ZoneScope::Named(name) = scope {
            if zones.is_empty() {
                return Ok(QueryNotFound::Zone(name.clone()).into());
            }
        }

        let mut rows = Vec::new();
        for zone in &zones {
            let zone_name = zone.get("name").and_then(Value::as_str).unwrap_or_default();
            let joined = zone.get("top").and_then(Value::as_array);
            for restaurant in joined.into_iter().flatten() {
                if let Some(row) = restaurant.as_object().and_then(rating_row) {
                    rows.push(row.with_secondary(Measure::Zone(zone_name.to_string())));
                }
            }
        }

        let title = match scope {
            ZoneScope::All => format!("Top {TOP} restaurants in every zone"),
            ZoneScope::First(n) => format!("Top {TOP} restaurants in the first {n} zones"),
            ZoneScope::Named(name) => format!("Top {TOP} restaurants in {name}"),
        };
        Ok(Report::new(title, rows).into())
    }

    /// Top three restaurants of one category by rating.
    ///
    /// The category is matched without case. A name outside the category
    /// vocabulary is not found; a known category with no restaurants gives an
    /// empty report.
    pub async fn top_by_category(&self, category: &str) -> Result<QueryOutcome, StoreError> {
        let Ok(parsed) = category.parse::<Category>() else {
            return Ok(QueryNotFound::Category(category.to_string()).into());
        };
        let options = FindOptions {
            sort: by_rating(),
            limit: Some(TOP),
        };
        let docs = self
            .store
            .find(
                RESTAURANTS,
                &Filter::eq_ignore_case("category", parsed.as_str()),
                &options,
            )
            .await?;
        let rows = docs.iter().filter_map(rating_row).collect();
        Ok(Report::new(format!("Top {TOP} {parsed} restaurants"), rows).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Restaurant;
    use crate::testkit::stores::loaded;

    fn expected_top(restaurants: &[&Restaurant]) -> Vec<String> {
        let mut sorted = restaurants.to_vec();
        sorted.sort_by(|a, b| b.rating.total_cmp(&a.rating).then(a.id.cmp(&b.id)));
        sorted.into_iter().take(3).map(|r| r.name.clone()).collect()
    }

    #[tokio::test]
    async fn category_match_ignores_case() {
        let loaded = loaded(6).await;
        let queries = DocumentQueries::new(loaded.stores.document.clone());
        let outcome = queries.top_by_category("SUSHI").await.unwrap();
        let names: Vec<_> = outcome.report().unwrap().names().map(String::from).collect();

        let sushi: Vec<_> = loaded
            .model
            .restaurants()
            .iter()
            .filter(|r| r.category == Category::Sushi)
            .collect();
        assert_eq!(names, expected_top(&sushi));
    }

    #[tokio::test]
    async fn unknown_category_is_not_found_but_empty_category_is_empty() {
        let loaded = loaded(6).await;
        let queries = DocumentQueries::new(loaded.stores.document.clone());
        let unknown = queries.top_by_category("vegana").await.unwrap();
        assert_eq!(
            unknown,
            QueryOutcome::NotFound(QueryNotFound::Category("vegana".into()))
        );
        let empty = queries.top_by_category("francesa").await.unwrap();
        assert!(empty.report().unwrap().is_empty());
    }

    #[tokio::test]
    async fn named_zone_ranks_its_own_restaurants() {
        let loaded = loaded(6).await;
        let queries = DocumentQueries::new(loaded.stores.document.clone());
        let outcome = queries
            .top_by_zone(&ZoneScope::Named("cancun".into()))
            .await
            .unwrap();
        let names: Vec<_> = outcome.report().unwrap().names().map(String::from).collect();

        let zone = loaded
            .model
            .zones()
            .iter()
            .find(|z| z.name == "Cancún")
            .unwrap();
        let members: Vec<_> = loaded
            .model
            .restaurants()
            .iter()
            .filter(|r| r.zone == Some(zone.id))
            .collect();
        assert_eq!(names, expected_top(&members));
    }

    #[tokio::test]
    async fn scopes_limit_zones() {
        let loaded = loaded(6).await;
        let queries = DocumentQueries::new(loaded.stores.document.clone());
        let all = queries.top_by_zone(&ZoneScope::All).await.unwrap();
        let first = queries.top_by_zone(&ZoneScope::First(1)).await.unwrap();
        let zones_in = |outcome: &QueryOutcome| {
            let mut zones: Vec<String> = outcome
                .report()
                .unwrap()
                .rows
                .iter()
                .filter_map(|r| r.secondary_metric.as_ref().map(ToString::to_string))
                .collect();
            zones.dedup();
            zones
        };
        assert!(zones_in(&first).len() <= 1);
        assert!(zones_in(&all).len() >= zones_in(&first).len());
        for zone in zones_in(&all) {
            let count = all
                .report()
                .unwrap()
                .rows
                .iter()
                .filter(|r| r.secondary_metric == Some(Measure::Zone(zone.clone())))
                .count();
            assert!(count <= 3);
        }
    }

    #[tokio::test]
    async fn unknown_zone_is_not_found() {
        let loaded = loaded(6).await;
        let queries = DocumentQueries::new(loaded.stores.document.clone());
        let outcome = queries
            .top_by_zone(&ZoneScope::Named("Atlantis".into()))
            .await
            .unwrap();
        assert!(outcome.is_not_found());
    }
}
