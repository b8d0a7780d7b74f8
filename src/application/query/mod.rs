//! Query adapters and intent dispatch.
//!
//! Every [`Intent`] is answered by exactly one store. Named lookups that
//! match nothing come back as [`QueryOutcome::NotFound`]; only store
//! failures are errors.

pub mod column;
pub mod document;
pub mod graph;

use std::sync::Arc;

use tracing::info;

use self::column::{Clock, ColumnQueries};
use self::document::DocumentQueries;
use self::graph::GraphQueries;
use super::lifecycle::Stores;
use crate::domain::QueryOutcome;
use crate::error::StoreError;
use crate::port::inbound::Intent;

/// Routes intents to the adapter of the store that owns them.
pub struct QueryService {
    graph: GraphQueries,
    document: DocumentQueries,
    column: ColumnQueries,
}

impl QueryService {
    #[must_use]
    pub fn new(stores: &Stores, clock: Arc<dyn Clock>) -> Self {
        Self {
            graph: GraphQueries::new(Arc::clone(&stores.graph)),
            document: DocumentQueries::new(Arc::clone(&stores.document)),
            column: ColumnQueries::new(Arc::clone(&stores.column), clock),
        }
    }

    pub async fn run(&self, intent: &Intent) -> Result<QueryOutcome, StoreError> {
        let outcome = match intent {
            Intent::TopByFollowers { order } => self.graph.top_by_followers(*order).await,
            Intent::RestaurantsInCity { city } => self.graph.restaurants_in_city(city).await,
            Intent::TopByZone { scope } => self.document.top_by_zone(scope).await,
            Intent::TopByCategory { category } => self.document.top_by_category(category).await,
            Intent::Sales { query } => self.column.run(query).await,
        }?;
        info!(
            %intent,
            store = %intent.store(),
            rows = outcome.report().map_or(0, |r| r.rows.len()),
            not_found = outcome.is_not_found(),
            "Query answered"
        );
        Ok(outcome)
    }
}
