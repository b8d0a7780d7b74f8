//! In-memory wide-column store.
//!
//! Rows live in partitions keyed by the partition-key values; inside a
//! partition they are kept sorted by the table's clustering columns, so reads
//! come back in clustering order without a sort at query time. Inserts are
//! upserts on the full primary key.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::Availability;
use crate::domain::StoreKind;
use crate::error::StoreError;
use crate::port::outbound::column::{
    BoundStatement, ColumnStore, CqlValue, KeyspaceDef, Relation, Row, Statement, TableDef,
};

#[derive(Debug)]
struct Table {
    def: TableDef,
    partitions: BTreeMap<Vec<CqlValue>, Vec<Row>>,
}

impl Table {
    fn clustering_cmp(&self, a: &Row, b: &Row) -> Ordering {
        self.def
            .clustering
            .iter()
            .map(|(column, order)| order.apply(a.get(*column).cmp(&b.get(*column))))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }

    fn upsert(&mut self, partition: Vec<CqlValue>, row: Row) {
        let mut rows = self.partitions.remove(&partition).unwrap_or_default();
        match rows.binary_search_by(|existing| self.clustering_cmp(existing, &row)) {
            Ok(i) => rows[i] = row,
            Err(i) => rows.insert(i, row),
        }
        self.partitions.insert(partition, rows);
    }
}

/// A validated insert waiting to be applied.
struct PendingInsert {
    table: &'static str,
    partition: Vec<CqlValue>,
    row: Row,
}

#[derive(Debug, Default)]
struct ColumnState {
    keyspaces: BTreeSet<String>,
    tables: BTreeMap<String, Table>,
    rejected_tables: HashSet<String>,
}

impl ColumnState {
    fn table(&self, name: &str) -> Result<&Table, StoreError> {
        self.tables
            .get(name)
            .ok_or_else(|| {
                StoreError::unavailable(StoreKind::Column, format!("unconfigured table {name}"))
            })
    }

    fn prepare_insert(
        &self,
        statement: &Statement,
        values: &[CqlValue],
    ) -> Result<PendingInsert, StoreError> {
        let Statement::Insert { table, columns } = statement else {
            return Err(StoreError::unavailable(
                StoreKind::Column,
                "only INSERT statements may be batched",
            ));
        };
        check_arity(statement, values)?;
        let target = self.table(table)?;
        if self.rejected_tables.contains(*table) {
            return Err(StoreError::PartialWrite {
                store: StoreKind::Column,
                table: (*table).to_string(),
                reason: "write timeout".into(),
            });
        }

        let mut row = Row::new();
        for (column, value) in columns.iter().zip(values) {
            match target.def.column_type(column) {
                Some(ty) if ty == value.type_of() => {
                    row.insert((*column).to_string(), value.clone());
                }
                Some(ty) => {
                    return Err(StoreError::unavailable(
                        StoreKind::Column,
                        format!("column {column} expects {ty:?}, got {value}"),
                    ))
                }
                None => {
                    return Err(StoreError::unavailable(
                        StoreKind::Column,
                        format!("unknown column {column} in {table}"),
                    ))
                }
            }
        }

        let mut partition = Vec::with_capacity(target.def.partition_key.len());
        for column in &target.def.partition_key {
            let value = row.get(*column).cloned().ok_or_else(|| {
                StoreError::unavailable(
                    StoreKind::Column,
                    format!("missing partition key column {column}"),
                )
            })?;
            partition.push(value);
        }
        for (column, _) in &target.def.clustering {
            if !row.contains_key(*column) {
                return Err(StoreError::unavailable(
                    StoreKind::Column,
                    format!("missing clustering column {column}"),
                ));
            }
        }

        Ok(PendingInsert {
            table: *table,
            partition,
            row,
        })
    }

    fn apply(&mut self, pending: PendingInsert) {
        if let Some(table) = self.tables.get_mut(pending.table) {
            table.upsert(pending.partition, pending.row);
        }
    }

    fn select(
        &self,
        table: &str,
        columns: &[&'static str],
        restrictions: &[(&'static str, Relation)],
        limit: Option<usize>,
        values: &[CqlValue],
    ) -> Result<Vec<Row>, StoreError> {
        let target = self.table(table)?;
        let bound: Vec<(&str, Relation, &CqlValue)> = restrictions
            .iter()
            .zip(values)
            .map(|((c, r), v)| (*c, *r, v))
            .collect();

        let partition_eq: Vec<Option<&CqlValue>> = target
            .def
            .partition_key
            .iter()
            .map(|pk| {
                bound
                    .iter()
                    .find(|(c, r, _)| c == pk && *r == Relation::Eq)
                    .map(|(_, _, v)| *v)
            })
            .collect();

        let candidates: Vec<&Row> = if partition_eq.iter().all(Option::is_some) {
            let key: Vec<CqlValue> = partition_eq.into_iter().flatten().cloned().collect();
            target.partitions.get(&key).map(|rows| rows.iter().collect()).unwrap_or_default()
        } else if bound.is_empty() {
            target.partitions.values().flatten().collect()
        } else {
            return Err(StoreError::unavailable(
                StoreKind::Column,
                format!("restrictions on {table} must bind the whole partition key"),
            ));
        };

        let mut out = Vec::new();
        for row in candidates {
            let keep = bound
                .iter()
                .all(|(c, r, v)| row.get(*c).is_some_and(|actual| r.holds(actual, v)));
            if !keep {
                continue;
            }
            out.push(if columns.is_empty() {
                row.clone()
            } else {
                row.iter()
                    .filter(|(name, _)| columns.iter().any(|c| *c == name.as_str()))
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect()
            });
            if limit.is_some_and(|n| out.len() >= n) {
                break;
            }
        }
        Ok(out)
    }
}

fn check_arity(statement: &Statement, values: &[CqlValue]) -> Result<(), StoreError> {
    if statement.arity() == values.len() {
        Ok(())
    } else {
        Err(StoreError::unavailable(
            StoreKind::Column,
            format!(
                "statement expects {} bound values, got {}",
                statement.arity(),
                values.len()
            ),
        ))
    }
}

/// Wide-column store held in process memory.
#[derive(Debug)]
pub struct InMemoryColumnStore {
    state: Mutex<ColumnState>,
    availability: Availability,
}

impl Default for InMemoryColumnStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryColumnStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ColumnState::default()),
            availability: Availability::new(StoreKind::Column),
        }
    }

    /// Simulate the store becoming reachable or unreachable.
    pub fn set_available(&self, up: bool) {
        self.availability.set(up);
    }

    /// Make every write to `table` fail until cleared.
    pub fn reject_writes_to(&self, table: &str, reject: bool) {
        let mut state = self.state.lock();
        if reject {
            state.rejected_tables.insert(table.to_string());
        } else {
            state.rejected_tables.remove(table);
        }
    }

    #[must_use]
    pub fn has_keyspace(&self, name: &str) -> bool {
        self.state.lock().keyspaces.contains(name)
    }

    #[must_use]
    pub fn table_names(&self) -> Vec<String> {
        self.state.lock().tables.keys().cloned().collect()
    }

    /// Number of rows in a table, or `None` if it does not exist.
    #[must_use]
    pub fn row_count(&self, table: &str) -> Option<usize> {
        self.state
            .lock()
            .tables
            .get(table)
            .map(|t| t.partitions.values().map(Vec::len).sum())
    }
}

#[async_trait]
impl ColumnStore for InMemoryColumnStore {
    async fn create_keyspace(&self, keyspace: &KeyspaceDef) -> Result<(), StoreError> {
        self.availability.check()?;
        self.state.lock().keyspaces.insert(keyspace.name.clone());
        Ok(())
    }

    async fn create_table(&self, table: &TableDef) -> Result<(), StoreError> {
        self.availability.check()?;
        self.state
            .lock()
            .tables
            .entry(table.name.to_string())
            .or_insert_with(|| Table {
                def: table.clone(),
                partitions: BTreeMap::new(),
            });
        Ok(())
    }

    async fn drop_table(&self, name: &str) -> Result<(), StoreError> {
        self.availability.check()?;
        self.state.lock().tables.remove(name);
        Ok(())
    }

    async fn execute(
        &self,
        statement: &Statement,
        values: &[CqlValue],
    ) -> Result<Vec<Row>, StoreError> {
        self.availability.check()?;
        check_arity(statement, values)?;
        let mut state = self.state.lock();
        match statement {
            Statement::Insert { .. } => {
                let pending = state.prepare_insert(statement, values)?;
                state.apply(pending);
                Ok(Vec::new())
            }
            Statement::Select {
                table,
                columns,
                restrictions,
                limit,
            } => state.select(table, columns, restrictions, *limit, values),
        }
    }

    async fn batch(&self, statements: &[BoundStatement]) -> Result<(), StoreError> {
        self.availability.check()?;
        let mut state = self.state.lock();
        let pending = statements
            .iter()
            .map(|s| state.prepare_insert(&s.statement, &s.values))
            .collect::<Result<Vec<_>, _>>()?;
        for insert in pending {
            state.apply(insert);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::outbound::column::{ClusteringOrder, CqlType};

    fn by_total() -> TableDef {
        TableDef {
            name: "by_total",
            columns: vec![
                ("month", CqlType::Text),
                ("total_sales", CqlType::BigInt),
                ("restaurant", CqlType::Text),
            ],
            partition_key: vec!["month"],
            clustering: vec![
                ("total_sales", ClusteringOrder::Desc),
                ("restaurant", ClusteringOrder::Asc),
            ],
        }
    }

    fn insert() -> Statement {
        Statement::Insert {
            table: "by_total",
            columns: vec!["month", "total_sales", "restaurant"],
        }
    }

    async fn seeded() -> InMemoryColumnStore {
        let store = InMemoryColumnStore::new();
        store.create_table(&by_total()).await.unwrap();
        for (amount, name) in [(300, "B"), (100, "A"), (300, "A"), (200, "C")] {
            store
                .execute(&insert(), &["May".into(), CqlValue::BigInt(amount), name.into()])
                .await
                .unwrap();
        }
        store
    }

    fn restaurants(rows: &[Row]) -> Vec<&str> {
        rows.iter()
            .map(|r| r["restaurant"].as_text().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn rows_come_back_in_clustering_order() {
        let store = seeded().await;
        let select = Statement::Select {
            table: "by_total",
            columns: vec![],
            restrictions: vec![("month", Relation::Eq)],
            limit: Some(3),
        };
        let rows = store.execute(&select, &["May".into()]).await.unwrap();
        assert_eq!(restaurants(&rows), vec!["A", "B", "C"]);
        assert_eq!(rows[0]["total_sales"], CqlValue::BigInt(300));
    }

    #[tokio::test]
    async fn range_restrictions_are_inclusive() {
        let store = seeded().await;
        let select = Statement::Select {
            table: "by_total",
            columns: vec!["restaurant"],
            restrictions: vec![
                ("month", Relation::Eq),
                ("total_sales", Relation::Gte),
                ("total_sales", Relation::Lte),
            ],
            limit: None,
        };
        let rows = store
            .execute(&select, &["May".into(), CqlValue::BigInt(100), CqlValue::BigInt(200)])
            .await
            .unwrap();
        assert_eq!(restaurants(&rows), vec!["C", "A"]);
        assert!(!rows[0].contains_key("total_sales"));
    }

    #[tokio::test]
    async fn insert_is_an_upsert_on_primary_key() {
        let store = seeded().await;
        store
            .execute(&insert(), &["May".into(), CqlValue::BigInt(300), "B".into()])
            .await
            .unwrap();
        assert_eq!(store.row_count("by_total"), Some(4));
    }

    #[tokio::test]
    async fn partial_partition_key_is_rejected() {
        let store = seeded().await;
        let select = Statement::Select {
            table: "by_total",
            columns: vec![],
            restrictions: vec![("total_sales", Relation::Gte)],
            limit: None,
        };
        assert!(store.execute(&select, &[CqlValue::BigInt(1)]).await.is_err());
    }

    #[tokio::test]
    async fn batch_is_all_or_nothing() {
        let store = InMemoryColumnStore::new();
        store.create_table(&by_total()).await.unwrap();
        let good = BoundStatement::new(insert(), vec!["May".into(), CqlValue::BigInt(1), "A".into()]);
        let bad = BoundStatement::new(
            Statement::Insert {
                table: "missing",
                columns: vec!["month"],
            },
            vec!["May".into()],
        );
        assert!(store.batch(&[good, bad]).await.is_err());
        assert_eq!(store.row_count("by_total"), Some(0));
    }

    #[tokio::test]
    async fn rejected_table_surfaces_partial_write() {
        let store = InMemoryColumnStore::new();
        store.create_table(&by_total()).await.unwrap();
        store.reject_writes_to("by_total", true);
        let err = store
            .batch(&[BoundStatement::new(
                insert(),
                vec!["May".into(), CqlValue::BigInt(1), "A".into()],
            )])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::PartialWrite { ref table, .. } if table == "by_total"));
    }

    #[tokio::test]
    async fn drop_table_if_exists_is_a_no_op_when_missing() {
        let store = InMemoryColumnStore::new();
        store.drop_table("nothing").await.unwrap();
        assert!(store.table_names().is_empty());
    }
}
