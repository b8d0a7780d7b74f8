//! Store lifecycle management.
//!
//! Creates schemas, loads a linked model, and drops data on each of the
//! three stores. Every operation is addressed to one store; the `*_everywhere`
//! helpers fan out to all three and report per store, never collapsing the
//! results into a single error.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use super::projection;
use crate::domain::{LinkedModel, StoreKind};
use crate::error::{Result, StoreError};
use crate::port::outbound::column::{KeyspaceDef, Statement};
use crate::port::outbound::document::Filter;
use crate::port::outbound::graph::GraphQuery;
use crate::port::outbound::{ColumnStore, DocumentStore, GraphStore};

/// What `load_all` does when the target store already holds data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    /// Write regardless. Graph and document loads then hold duplicates.
    Append,
    /// Refuse with [`StoreError::NonEmpty`].
    #[default]
    RejectIfNonEmpty,
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Append => "append",
            Self::RejectIfNonEmpty => "reject_if_non_empty",
        })
    }
}

/// The three injected store clients.
#[derive(Clone)]
pub struct Stores {
    pub graph: Arc<dyn GraphStore>,
    pub document: Arc<dyn DocumentStore>,
    pub column: Arc<dyn ColumnStore>,
}

impl fmt::Debug for Stores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}

/// Result of one operation against one store.
#[derive(Debug)]
pub struct StoreOutcome {
    pub store: StoreKind,
    /// Records written on success.
    pub result: Result<usize>,
}

impl StoreOutcome {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-store results of a fan-out operation, in graph, document, column order.
#[derive(Debug)]
pub struct LoadSummary {
    pub outcomes: Vec<StoreOutcome>,
}

impl LoadSummary {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(StoreOutcome::is_ok)
    }

    pub fn failures(&self) -> impl Iterator<Item = &StoreOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    #[must_use]
    pub fn outcome(&self, store: StoreKind) -> Option<&StoreOutcome> {
        self.outcomes.iter().find(|o| o.store == store)
    }
}

/// Create, load and drop on each store.
#[derive(Debug, Clone)]
pub struct StoreLifecycle {
    stores: Stores,
    keyspace: KeyspaceDef,
    mode: LoadMode,
}

impl StoreLifecycle {
    #[must_use]
    pub fn new(stores: Stores, keyspace: KeyspaceDef, mode: LoadMode) -> Self {
        Self {
            stores,
            keyspace,
            mode,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> LoadMode {
        self.mode
    }

    /// Create every type, collection index, keyspace and table if absent.
    #[instrument(skip(self))]
    pub async fn create_schema(&self, store: StoreKind) -> std::result::Result<(), StoreError> {
        match store {
            StoreKind::Graph => {
                let schema = projection::graph::schema();
                self.stores.graph.define_schema(&schema).await?;
                info!(predicates = schema.predicates.len(), "Graph schema defined");
            }
            StoreKind::Document => {
                for (collection, index) in projection::document::indexes() {
                    let name = self.stores.document.create_index(collection, &index).await?;
                    info!(collection, index = %name, "Index ensured");
                }
            }
            StoreKind::Column => {
                self.stores.column.create_keyspace(&self.keyspace).await?;
                for table in projection::column::tables() {
                    self.stores.column.create_table(&table).await?;
                    info!(table = table.name, "Table ensured");
                }
            }
        }
        Ok(())
    }

    /// Project the model and write it to one store.
    ///
    /// Returns the number of records written: nodes, documents, or sales
    /// facts (each fact being three rows).
    #[instrument(skip(self, model))]
    pub async fn load_all(&self, model: &LinkedModel, store: StoreKind) -> Result<usize> {
        if self.mode == LoadMode::RejectIfNonEmpty && self.holds_data(store).await? {
            warn!("Store already holds data, refusing to load");
            return Err(StoreError::NonEmpty { store }.into());
        }

        let written = match store {
            StoreKind::Graph => {
                let batch = projection::graph::project(model);
                let receipt = self.stores.graph.mutate(&batch).await?;
                receipt.uids.len()
            }
            StoreKind::Document => {
                let batch = projection::document::project(model)?;
                let zones = self
                    .stores
                    .document
                    .insert_many(projection::document::ZONES, &batch.zones)
                    .await?;
                let restaurants = self
                    .stores
                    .document
                    .insert_many(projection::document::RESTAURANTS, &batch.restaurants)
                    .await?;
                usize::try_from(zones + restaurants).unwrap_or(usize::MAX)
            }
            StoreKind::Column => {
                let facts = projection::column::project(model);
                for fact in &facts {
                    self.stores.column.batch(fact).await?;
                }
                facts.len()
            }
        };

        info!(written, mode = %self.mode, "Store loaded");
        Ok(written)
    }

    /// Remove all persisted facts and leave an empty schema behind.
    ///
    /// Succeeds on a store that never had a schema.
    #[instrument(skip(self))]
    pub async fn drop_all(&self, store: StoreKind) -> std::result::Result<(), StoreError> {
        match store {
            StoreKind::Graph => {
                self.stores.graph.drop_all().await?;
            }
            StoreKind::Document => {
                for collection in [
                    projection::document::ZONES,
                    projection::document::RESTAURANTS,
                ] {
                    let removed = self
                        .stores
                        .document
                        .delete_many(collection, &Filter::All)
                        .await?;
                    info!(collection, removed, "Collection cleared");
                }
            }
            StoreKind::Column => {
                for table in projection::column::tables() {
                    self.stores.column.drop_table(table.name).await?;
                }
            }
        }
        self.create_schema(store).await?;
        info!("Store dropped");
        Ok(())
    }

    async fn holds_data(&self, store: StoreKind) -> std::result::Result<bool, StoreError> {
        match store {
            StoreKind::Graph => {
                let response = self.stores.graph.query(&GraphQuery::NodeCount).await?;
                let total = response["nodes"][0]["total"].as_u64().unwrap_or(0);
                Ok(total > 0)
            }
            StoreKind::Document => {
                let zones = self
                    .stores
                    .document
                    .count(projection::document::ZONES, &Filter::All)
                    .await?;
                let restaurants = self
                    .stores
                    .document
                    .count(projection::document::RESTAURANTS, &Filter::All)
                    .await?;
                Ok(zones + restaurants > 0)
            }
            StoreKind::Column => {
                let any_row = Statement::Select {
                    table: projection::column::SALES_BY_RESTAURANT,
                    columns: vec![],
                    restrictions: vec![],
                    limit: Some(1),
                };
                Ok(!self.stores.column.execute(&any_row, &[]).await?.is_empty())
            }
        }
    }

    /// Create schemas on all three stores.
    pub async fn create_schemas(&self) -> LoadSummary {
        let (graph, document, column) = tokio::join!(
            self.create_schema(StoreKind::Graph),
            self.create_schema(StoreKind::Document),
            self.create_schema(StoreKind::Column),
        );
        summarize([
            (StoreKind::Graph, graph.map(|()| 0).map_err(Into::into)),
            (StoreKind::Document, document.map(|()| 0).map_err(Into::into)),
            (StoreKind::Column, column.map(|()| 0).map_err(Into::into)),
        ])
    }

    /// Ensure schemas and load all three stores concurrently.
    ///
    /// A failure on one store does not stop the other two.
    pub async fn load_everywhere(&self, model: &LinkedModel) -> LoadSummary {
        let (graph, document, column) = tokio::join!(
            self.ensure_and_load(model, StoreKind::Graph),
            self.ensure_and_load(model, StoreKind::Document),
            self.ensure_and_load(model, StoreKind::Column),
        );
        summarize([
            (StoreKind::Graph, graph),
            (StoreKind::Document, document),
            (StoreKind::Column, column),
        ])
    }

    /// Drop data on all three stores.
    pub async fn drop_everywhere(&self) -> LoadSummary {
        let (graph, document, column) = tokio::join!(
            self.drop_all(StoreKind::Graph),
            self.drop_all(StoreKind::Document),
            self.drop_all(StoreKind::Column),
        );
        summarize([
            (StoreKind::Graph, graph.map(|()| 0).map_err(Into::into)),
            (StoreKind::Document, document.map(|()| 0).map_err(Into::into)),
            (StoreKind::Column, column.map(|()| 0).map_err(Into::into)),
        ])
    }

    async fn ensure_and_load(&self, model: &LinkedModel, store: StoreKind) -> Result<usize> {
        self.create_schema(store).await?;
        self.load_all(model, store).await
    }
}

fn summarize(results: [(StoreKind, Result<usize>); 3]) -> LoadSummary {
    let outcomes = results
        .into_iter()
        .map(|(store, result)| {
            if let Err(e) = &result {
                error!(store = %store, error = %e, "Store operation failed");
            }
            StoreOutcome { store, result }
        })
        .collect();
    LoadSummary { outcomes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        CanonicalModel, Category, MonthlySales, Restaurant, RestaurantId,
    };
    use crate::error::Error;
    use crate::testkit::{fixtures, stores::MemoryStores};

    fn lifecycle(stores: &MemoryStores, mode: LoadMode) -> StoreLifecycle {
        StoreLifecycle::new(
            stores.handles(),
            projection::column::keyspace("polystore", 1),
            mode,
        )
    }

    #[tokio::test]
    async fn load_writes_every_projection() {
        let stores = MemoryStores::new();
        let lifecycle = lifecycle(&stores, LoadMode::RejectIfNonEmpty);
        let model = fixtures::linked_model(2);
        let summary = lifecycle.load_everywhere(&model).await;
        assert!(summary.is_success());

        let facts = model.restaurants().len() * 12;
        assert_eq!(
            stores.column.row_count(projection::column::SALES_BY_TOTAL),
            Some(facts)
        );
        let column = summary.outcome(StoreKind::Column).unwrap();
        assert_eq!(*column.result.as_ref().unwrap(), facts);
        assert!(stores.column.has_keyspace("polystore"));
    }

    #[tokio::test]
    async fn reject_mode_refuses_second_load() {
        let stores = MemoryStores::new();
        let lifecycle = lifecycle(&stores, LoadMode::RejectIfNonEmpty);
        let model = fixtures::linked_model(2);
        assert!(lifecycle.load_everywhere(&model).await.is_success());

        let second = lifecycle.load_everywhere(&model).await;
        assert_eq!(second.failures().count(), 3);
        for outcome in &second.outcomes {
            assert!(matches!(
                outcome.result,
                Err(Error::Store(StoreError::NonEmpty { store })) if store == outcome.store
            ));
        }
    }

    #[tokio::test]
    async fn append_mode_duplicates_graph_nodes() {
        let stores = MemoryStores::new();
        let lifecycle = lifecycle(&stores, LoadMode::Append);
        let model = fixtures::linked_model(2);
        lifecycle.load_everywhere(&model).await;
        let once = stores.graph.node_count();
        lifecycle.load_everywhere(&model).await;
        assert_eq!(stores.graph.node_count(), once * 2);
    }

    #[tokio::test]
    async fn drop_leaves_empty_schema_ready_for_reload() {
        let stores = MemoryStores::new();
        let lifecycle = lifecycle(&stores, LoadMode::RejectIfNonEmpty);
        let model = fixtures::linked_model(2);
        lifecycle.load_everywhere(&model).await;

        assert!(lifecycle.drop_everywhere().await.is_success());
        assert_eq!(stores.graph.node_count(), 0);
        assert!(stores.graph.schema().is_some());
        assert_eq!(
            stores.column.row_count(projection::column::SALES_BY_MONTH),
            Some(0)
        );
        assert!(lifecycle.load_everywhere(&model).await.is_success());
    }

    #[tokio::test]
    async fn drop_on_fresh_stores_is_a_no_op() {
        let stores = MemoryStores::new();
        let lifecycle = lifecycle(&stores, LoadMode::RejectIfNonEmpty);
        assert!(lifecycle.drop_everywhere().await.is_success());
    }

    #[tokio::test]
    async fn one_store_failing_does_not_block_the_others() {
        let stores = MemoryStores::new();
        stores.document.set_available(false);
        let lifecycle = lifecycle(&stores, LoadMode::RejectIfNonEmpty);
        let summary = lifecycle.load_everywhere(&fixtures::linked_model(2)).await;

        let failed: Vec<_> = summary.failures().map(|o| o.store).collect();
        assert_eq!(failed, vec![StoreKind::Document]);
        assert!(stores.graph.node_count() > 0);
        assert!(stores.column.row_count(projection::column::SALES_BY_MONTH) > Some(0));
    }

    #[tokio::test]
    async fn namesake_restaurants_keep_separate_facts_in_every_table() {
        let restaurants = [(1, 10), (2, 20)]
            .into_iter()
            .map(|(id, amount)| Restaurant {
                id: RestaurantId::new(id),
                name: "Casa".to_string(),
                category: Category::Mexicana,
                rating: 4.0,
                zone: None,
                followers: Vec::new(),
                sales: MonthlySales::new(&[amount; 12]).unwrap(),
            })
            .collect();
        let model = LinkedModel::new(CanonicalModel::new(Vec::new(), restaurants, Vec::new()));

        let stores = MemoryStores::new();
        let lifecycle = lifecycle(&stores, LoadMode::RejectIfNonEmpty);
        lifecycle.create_schema(StoreKind::Column).await.unwrap();
        let written = lifecycle.load_all(&model, StoreKind::Column).await.unwrap();

        assert_eq!(written, 24);
        for table in projection::column::tables() {
            assert_eq!(stores.column.row_count(table.name), Some(24), "{}", table.name);
        }
    }

    #[tokio::test]
    async fn partial_table_write_is_surfaced() {
        let stores = MemoryStores::new();
        let lifecycle = lifecycle(&stores, LoadMode::RejectIfNonEmpty);
        lifecycle.create_schema(StoreKind::Column).await.unwrap();
        stores
            .column
            .reject_writes_to(projection::column::SALES_BY_TOTAL, true);

        let err = lifecycle
            .load_all(&fixtures::linked_model(2), StoreKind::Column)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Store(StoreError::PartialWrite { ref table, .. }) if table == "sales_by_total"
        ));
        // The batch is all-or-nothing, so the sibling tables stay empty too.
        assert_eq!(
            stores.column.row_count(projection::column::SALES_BY_RESTAURANT),
            Some(0)
        );
    }
}
