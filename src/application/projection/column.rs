//! Wide-column projection.
//!
//! Every (restaurant, month, amount) fact is written to three tables, one
//! per access pattern:
//!
//! | table                 | partition    | clustering                                  |
//! |-----------------------|--------------|---------------------------------------------|
//! | `sales_by_restaurant` | `restaurant` | `month_number`, `restaurant_id`             |
//! | `sales_by_month`      | `month`      | `restaurant`, `restaurant_id`               |
//! | `sales_by_total`      | `month`      | `total_sales` DESC, `restaurant`, `restaurant_id` |
//!
//! Reports look restaurants up by name; `restaurant_id` closes every primary
//! key so each fact owns exactly one row per table. The three inserts of one
//! fact always travel in one batch.

use crate::domain::{LinkedModel, SalesRecord};
use crate::port::outbound::column::{
    BoundStatement, ClusteringOrder, CqlType, CqlValue, KeyspaceDef, Statement, TableDef,
};

pub const SALES_BY_RESTAURANT: &str = "sales_by_restaurant";
pub const SALES_BY_MONTH: &str = "sales_by_month";
pub const SALES_BY_TOTAL: &str = "sales_by_total";

/// Keyspace holding the sales tables.
#[must_use]
pub fn keyspace(name: &str, replication_factor: u32) -> KeyspaceDef {
    KeyspaceDef {
        name: name.to_string(),
        replication_factor,
    }
}

/// The three sales tables, in write order.
#[must_use]
pub fn tables() -> Vec<TableDef> {
    vec![
        TableDef {
            name: SALES_BY_RESTAURANT,
            columns: vec![
                ("restaurant", CqlType::Text),
                ("month_number", CqlType::BigInt),
                ("restaurant_id", CqlType::Text),
                ("month", CqlType::Text),
                ("total_sales", CqlType::BigInt),
            ],
            partition_key: vec!["restaurant"],
            clustering: vec![
                ("month_number", ClusteringOrder::Asc),
                ("restaurant_id", ClusteringOrder::Asc),
            ],
        },
        TableDef {
            name: SALES_BY_MONTH,
            columns: vec![
                ("month", CqlType::Text),
                ("restaurant", CqlType::Text),
                ("restaurant_id", CqlType::Text),
                ("total_sales", CqlType::BigInt),
            ],
            partition_key: vec!["month"],
            clustering: vec![
                ("restaurant", ClusteringOrder::Asc),
                ("restaurant_id", ClusteringOrder::Asc),
            ],
        },
        TableDef {
            name: SALES_BY_TOTAL,
            columns: vec![
                ("month", CqlType::Text),
                ("total_sales", CqlType::BigInt),
                ("restaurant", CqlType::Text),
                ("restaurant_id", CqlType::Text),
            ],
            partition_key: vec!["month"],
            clustering: vec![
                ("total_sales", ClusteringOrder::Desc),
                ("restaurant", ClusteringOrder::Asc),
                ("restaurant_id", ClusteringOrder::Asc),
            ],
        },
    ]
}

/// Prepared insert for one sales table, binding every column in order.
#[must_use]
pub fn insert(table: &TableDef) -> Statement {
    Statement::Insert {
        table: table.name,
        columns: table.columns.iter().map(|(name, _)| *name).collect(),
    }
}

/// Prepared inserts for the three tables, in [`tables`] order.
#[must_use]
pub fn inserts() -> [Statement; 3] {
    let tables = tables();
    [insert(&tables[0]), insert(&tables[1]), insert(&tables[2])]
}

/// The three bound inserts for one fact.
#[must_use]
pub fn fact_batch(inserts: &[Statement; 3], fact: &SalesRecord) -> Vec<BoundStatement> {
    let restaurant = CqlValue::from(fact.restaurant_name.as_str());
    // Text keeps the full u64 range; it only breaks ties between equal names.
    let id = CqlValue::from(fact.restaurant.to_string());
    let month = CqlValue::from(fact.month.as_str());
    let amount = CqlValue::BigInt(fact.amount);
    let [by_restaurant, by_month, by_total] = inserts;
    vec![
        BoundStatement::new(
            by_restaurant.clone(),
            vec![
                restaurant.clone(),
                CqlValue::BigInt(i64::from(fact.month.number())),
                id.clone(),
                month.clone(),
                amount.clone(),
            ],
        ),
        BoundStatement::new(
            by_month.clone(),
            vec![month.clone(), restaurant.clone(), id.clone(), amount.clone()],
        ),
        BoundStatement::new(by_total.clone(), vec![month, amount, restaurant, id]),
    ]
}

/// One batch per fact, restaurants in input order and months in calendar
/// order.
#[must_use]
pub fn project(model: &LinkedModel) -> Vec<Vec<BoundStatement>> {
    let inserts = inserts();
    model
        .sales_records()
        .map(|fact| fact_batch(&inserts, &fact))
        .collect()
}
