//! Document store port.
//!
//! Documents are JSON objects. Filters, aggregation pipelines and index
//! specifications are typed here and render to the store's native JSON
//! operator syntax (`$match`, `$lookup`, `$regex`, ...).

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::error::StoreError;

pub type Document = Map<String, Value>;

/// Document selection predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document.
    All,
    /// Field equals the value exactly.
    Eq { field: String, value: Value },
    /// String field equals the text ignoring ASCII case.
    EqIgnoreCase { field: String, value: String },
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn eq_ignore_case(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::EqIgnoreCase {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Evaluate against a document.
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Self::All => true,
            Self::Eq { field, value } => doc.get(field) == Some(value),
            Self::EqIgnoreCase { field, value } => doc
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|s| s.eq_ignore_ascii_case(value)),
        }
    }

    /// Native filter document.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::All => json!({}),
            Self::Eq { field, value } => single(field, value.clone()),
            Self::EqIgnoreCase { field, value } => single(
                field,
                json!({ "$regex": format!("^{}$", escape_regex(value)), "$options": "i" }),
            ),
        }
    }
}

fn single(field: &str, value: Value) -> Value {
    let mut obj = Map::new();
    obj.insert(field.to_string(), value);
    Value::Object(obj)
}

/// Escape regex metacharacters so user text matches literally.
fn escape_regex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if "\\^$.|?*+()[]{}".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    const fn as_i32(self) -> i32 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub order: SortOrder,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Descending,
        }
    }
}

fn sort_json(keys: &[SortKey]) -> Value {
    let mut obj = Map::new();
    for key in keys {
        obj.insert(key.field.clone(), Value::from(key.order.as_i32()));
    }
    Value::Object(obj)
}

/// One aggregation stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Filter),
    Sort(Vec<SortKey>),
    Limit(usize),
    /// Left outer join on `local_field == foreign_field`, with the joined
    /// documents run through `pipeline` before landing in `as_field`.
    Lookup {
        from: String,
        local_field: String,
        foreign_field: String,
        pipeline: Vec<Stage>,
        as_field: String,
    },
}

impl Stage {
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Match(filter) => json!({ "$match": filter.to_json() }),
            Self::Sort(keys) => json!({ "$sort": sort_json(keys) }),
            Self::Limit(n) => json!({ "$limit": n }),
            Self::Lookup {
                from,
                local_field,
                foreign_field,
                pipeline,
                as_field,
            } => json!({
                "$lookup": {
                    "from": from,
                    "localField": local_field,
                    "foreignField": foreign_field,
                    "pipeline": pipeline.iter().map(Stage::to_json).collect::<Vec<_>>(),
                    "as": as_field,
                }
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pipeline(pub Vec<Stage>);

impl Pipeline {
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Array(self.0.iter().map(Stage::to_json).collect())
    }
}

/// `find` options beyond the filter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FindOptions {
    pub sort: Vec<SortKey>,
    pub limit: Option<usize>,
}

/// A single- or compound-field index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub keys: Vec<SortKey>,
}

impl IndexSpec {
    pub fn single(key: SortKey) -> Self {
        Self { keys: vec![key] }
    }

    /// Conventional index name, e.g. `rating_-1`.
    #[must_use]
    pub fn name(&self) -> String {
        self.keys
            .iter()
            .map(|k| format!("{}_{}", k.field, k.order.as_i32()))
            .collect::<Vec<_>>()
            .join("_")
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        sort_json(&self.keys)
    }
}

/// Client for a document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert documents in order. Returns the number inserted.
    async fn insert_many(
        &self,
        collection: &str,
        documents: &[Document],
    ) -> Result<u64, StoreError>;

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError>;

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> Result<Vec<Document>, StoreError>;

    /// Delete matching documents. A missing collection deletes nothing.
    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    /// Create an index if absent, returning its name.
    async fn create_index(
        &self,
        collection: &str,
        index: &IndexSpec,
    ) -> Result<String, StoreError>;

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_filter_renders_anchored_regex() {
        let filter = Filter::eq_ignore_case("category", "sushi");
        assert_eq!(
            filter.to_json(),
            json!({ "category": { "$regex": "^sushi$", "$options": "i" } })
        );
    }

    #[test]
    fn regex_metacharacters_are_escaped() {
        let filter = Filter::eq_ignore_case("category", "a.b*");
        assert_eq!(filter.to_json()["category"]["$regex"], "^a\\.b\\*$");
    }

    #[test]
    fn case_insensitive_filter_matches_any_case() {
        let mut doc = Document::new();
        doc.insert("category".into(), Value::from("Sushi"));
        assert!(Filter::eq_ignore_case("category", "SUSHI").matches(&doc));
        assert!(!Filter::eq_ignore_case("category", "sush").matches(&doc));
    }

    #[test]
    fn index_name_follows_convention() {
        assert_eq!(IndexSpec::single(SortKey::desc("rating")).name(), "rating_-1");
        assert_eq!(IndexSpec::single(SortKey::asc("zone_id")).name(), "zone_id_1");
    }

    #[test]
    fn lookup_stage_renders_join() {
        let stage = Stage::Lookup {
            from: "restaurants".into(),
            local_field: "id".into(),
            foreign_field: "zone_id".into(),
            pipeline: vec![Stage::Limit(3)],
            as_field: "restaurants".into(),
        };
        let json = stage.to_json();
        assert_eq!(json["$lookup"]["localField"], "id");
        assert_eq!(json["$lookup"]["pipeline"][0]["$limit"], 3);
    }
}
