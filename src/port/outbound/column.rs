//! Wide-column store port.
//!
//! Tables are declared with an explicit partition key and ordered clustering
//! columns. Statements are prepared once and executed with positional bound
//! values, mirroring how CQL drivers are used.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;

use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CqlType {
    Text,
    BigInt,
}

impl CqlType {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::BigInt => "BIGINT",
        }
    }
}

/// A bound or returned column value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CqlValue {
    BigInt(i64),
    Text(String),
}

impl CqlValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::BigInt(_) => None,
        }
    }

    #[must_use]
    pub fn as_bigint(&self) -> Option<i64> {
        match self {
            Self::BigInt(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    #[must_use]
    pub const fn type_of(&self) -> CqlType {
        match self {
            Self::BigInt(_) => CqlType::BigInt,
            Self::Text(_) => CqlType::Text,
        }
    }
}

impl fmt::Display for CqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BigInt(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

impl From<&str> for CqlValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CqlValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for CqlValue {
    fn from(n: i64) -> Self {
        Self::BigInt(n)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusteringOrder {
    Asc,
    Desc,
}

impl ClusteringOrder {
    /// Apply this order to a natural-order comparison.
    #[must_use]
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyspaceDef {
    pub name: String,
    pub replication_factor: u32,
}

impl KeyspaceDef {
    #[must_use]
    pub fn ddl(&self) -> String {
        format!(
            "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {{ 'class': 'SimpleStrategy', 'replication_factor': {} }}",
            self.name, self.replication_factor
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: Vec<(&'static str, CqlType)>,
    pub partition_key: Vec<&'static str>,
    pub clustering: Vec<(&'static str, ClusteringOrder)>,
}

impl TableDef {
    #[must_use]
    pub fn column_type(&self, column: &str) -> Option<CqlType> {
        self.columns
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, ty)| *ty)
    }

    #[must_use]
    pub fn ddl(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|(name, ty)| format!("{name} {}", ty.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        let clustering_names: Vec<&str> = self.clustering.iter().map(|(c, _)| *c).collect();
        let mut primary = format!("({})", self.partition_key.join(", "));
        if !clustering_names.is_empty() {
            primary.push_str(", ");
            primary.push_str(&clustering_names.join(", "));
        }
        let mut ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} ({columns}, PRIMARY KEY ({primary}))",
            self.name
        );
        if !self.clustering.is_empty() {
            let order = self
                .clustering
                .iter()
                .map(|(c, o)| match o {
                    ClusteringOrder::Asc => format!("{c} ASC"),
                    ClusteringOrder::Desc => format!("{c} DESC"),
                })
                .collect::<Vec<_>>()
                .join(", ");
            ddl.push_str(&format!(" WITH CLUSTERING ORDER BY ({order})"));
        }
        ddl
    }
}

/// Comparison used in a `WHERE` restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Gte,
    Lte,
}

impl Relation {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gte => ">=",
            Self::Lte => "<=",
        }
    }

    #[must_use]
    pub fn holds(self, left: &CqlValue, right: &CqlValue) -> bool {
        match self {
            Self::Eq => left == right,
            Self::Gte => left >= right,
            Self::Lte => left <= right,
        }
    }
}

/// A prepared statement. Bound values fill the `?` markers in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Insert {
        table: &'static str,
        columns: Vec<&'static str>,
    },
    Select {
        table: &'static str,
        /// Empty means `*`.
        columns: Vec<&'static str>,
        restrictions: Vec<(&'static str, Relation)>,
        limit: Option<usize>,
    },
}

impl Statement {
    #[must_use]
    pub fn table(&self) -> &'static str {
        match self {
            Self::Insert { table, .. } | Self::Select { table, .. } => table,
        }
    }

    /// Number of `?` markers.
    #[must_use]
    pub fn arity(&self) -> usize {
        match self {
            Self::Insert { columns, .. } => columns.len(),
            Self::Select { restrictions, .. } => restrictions.len(),
        }
    }

    /// Native CQL text.
    #[must_use]
    pub fn cql(&self) -> String {
        match self {
            Self::Insert { table, columns } => {
                let markers = vec!["?"; columns.len()].join(", ");
                format!(
                    "INSERT INTO {table} ({}) VALUES ({markers})",
                    columns.join(", ")
                )
            }
            Self::Select {
                table,
                columns,
                restrictions,
                limit,
            } => {
                let projection = if columns.is_empty() {
                    "*".to_string()
                } else {
                    columns.join(", ")
                };
                let mut cql = format!("SELECT {projection} FROM {table}");
                if !restrictions.is_empty() {
                    let clauses = restrictions
                        .iter()
                        .map(|(c, r)| format!("{c} {} ?", r.as_str()))
                        .collect::<Vec<_>>()
                        .join(" AND ");
                    cql.push_str(&format!(" WHERE {clauses}"));
                }
                if let Some(n) = limit {
                    cql.push_str(&format!(" LIMIT {n}"));
                }
                cql
            }
        }
    }
}

/// A prepared statement together with its values, for batching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundStatement {
    pub statement: Statement,
    pub values: Vec<CqlValue>,
}

impl BoundStatement {
    #[must_use]
    pub fn new(statement: Statement, values: Vec<CqlValue>) -> Self {
        Self { statement, values }
    }
}

/// A result row keyed by column name.
pub type Row = BTreeMap<String, CqlValue>;

/// Client for a wide-column store session bound to one keyspace.
#[async_trait]
pub trait ColumnStore: Send + Sync {
    async fn create_keyspace(&self, keyspace: &KeyspaceDef) -> Result<(), StoreError>;

    /// `CREATE TABLE IF NOT EXISTS`.
    async fn create_table(&self, table: &TableDef) -> Result<(), StoreError>;

    /// `DROP TABLE IF EXISTS`.
    async fn drop_table(&self, name: &str) -> Result<(), StoreError>;

    async fn execute(
        &self,
        statement: &Statement,
        values: &[CqlValue],
    ) -> Result<Vec<Row>, StoreError>;

    /// Apply every statement or none of them.
    async fn batch(&self, statements: &[BoundStatement]) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_ddl_includes_clustering_order() {
        let table = TableDef {
            name: "sales_by_total",
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
        };
        assert_eq!(
            table.ddl(),
            "CREATE TABLE IF NOT EXISTS sales_by_total (month TEXT, total_sales BIGINT, restaurant TEXT, \
             PRIMARY KEY ((month), total_sales, restaurant)) \
             WITH CLUSTERING ORDER BY (total_sales DESC, restaurant ASC)"
        );
    }

    #[test]
    fn select_renders_restrictions_and_limit() {
        let select = Statement::Select {
            table: "sales_by_total",
            columns: vec![],
            restrictions: vec![
                ("month", Relation::Eq),
                ("total_sales", Relation::Gte),
                ("total_sales", Relation::Lte),
            ],
            limit: Some(3),
        };
        assert_eq!(
            select.cql(),
            "SELECT * FROM sales_by_total WHERE month = ? AND total_sales >= ? AND total_sales <= ? LIMIT 3"
        );
        assert_eq!(select.arity(), 3);
    }

    #[test]
    fn relations_are_inclusive() {
        let five = CqlValue::BigInt(5);
        assert!(Relation::Gte.holds(&five, &CqlValue::BigInt(5)));
        assert!(Relation::Lte.holds(&five, &CqlValue::BigInt(5)));
        assert!(!Relation::Gte.holds(&five, &CqlValue::BigInt(6)));
    }
}
