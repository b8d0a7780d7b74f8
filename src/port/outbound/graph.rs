//! Property-graph store port.
//!
//! Payloads are expressed in the store's native vocabulary: a DQL schema,
//! JSON-style node mutations that reference each other through blank node
//! labels (`_:user1`), and DQL queries with `$`-prefixed variables.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

/// Value type of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateType {
    String,
    Int,
    Float,
    UidList,
}

impl PredicateType {
    const fn dql(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::UidList => "[uid]",
        }
    }
}

/// Tokenizer backing a predicate index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tokenizer {
    Exact,
    Term,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub name: &'static str,
    pub kind: PredicateType,
    pub index: Option<Tokenizer>,
    pub reverse: bool,
    pub count: bool,
}

impl Predicate {
    #[must_use]
    pub const fn new(name: &'static str, kind: PredicateType) -> Self {
        Self {
            name,
            kind,
            index: None,
            reverse: false,
            count: false,
        }
    }

    #[must_use]
    pub const fn indexed(mut self, tokenizer: Tokenizer) -> Self {
        self.index = Some(tokenizer);
        self
    }

    #[must_use]
    pub const fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    #[must_use]
    pub const fn counted(mut self) -> Self {
        self.count = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeType {
    pub name: &'static str,
    pub fields: Vec<&'static str>,
}

/// Schema descriptor handed to [`GraphStore::define_schema`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphSchema {
    pub types: Vec<NodeType>,
    pub predicates: Vec<Predicate>,
}

impl GraphSchema {
    #[must_use]
    pub fn predicate(&self, name: &str) -> Option<&Predicate> {
        self.predicates.iter().find(|p| p.name == name)
    }

    /// Render as DQL schema text.
    #[must_use]
    pub fn dql(&self) -> String {
        let mut out = String::new();
        for node_type in &self.types {
            let _ = writeln!(out, "type {} {{", node_type.name);
            for field in &node_type.fields {
                let _ = writeln!(out, "    {field}");
            }
            out.push_str("}\n\n");
        }
        for p in &self.predicates {
            let _ = write!(out, "{}: {}", p.name, p.kind.dql());
            if let Some(tokenizer) = p.index {
                let name = match tokenizer {
                    Tokenizer::Exact => "exact",
                    Tokenizer::Term => "term",
                };
                let _ = write!(out, " @index({name})");
            }
            if p.reverse {
                out.push_str(" @reverse");
            }
            if p.count {
                out.push_str(" @count");
            }
            out.push_str(" .\n");
        }
        out
    }
}

/// Scalar predicate value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Int(i64),
    Float(f64),
}

impl Scalar {
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::String(s) => Value::from(s.as_str()),
            Self::Int(n) => Value::from(*n),
            Self::Float(f) => Value::from(*f),
        }
    }
}

/// One node in a mutation. Edges name their targets by blank label.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub blank: String,
    pub node_type: &'static str,
    pub scalars: BTreeMap<&'static str, Scalar>,
    pub edges: BTreeMap<&'static str, Vec<String>>,
}

impl Node {
    pub fn new(blank: impl Into<String>, node_type: &'static str) -> Self {
        Self {
            blank: blank.into(),
            node_type,
            scalars: BTreeMap::new(),
            edges: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn scalar(mut self, predicate: &'static str, value: Scalar) -> Self {
        self.scalars.insert(predicate, value);
        self
    }

    #[must_use]
    pub fn edges(mut self, predicate: &'static str, targets: Vec<String>) -> Self {
        self.edges.insert(predicate, targets);
        self
    }

    /// Render as a `set_obj` JSON mutation entry.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut obj = serde_json::Map::new();
        obj.insert("uid".into(), Value::from(self.blank.as_str()));
        obj.insert("dgraph.type".into(), Value::from(self.node_type));
        for (name, value) in &self.scalars {
            obj.insert((*name).to_string(), value.to_json());
        }
        for (name, targets) in &self.edges {
            let refs = targets
                .iter()
                .map(|t| serde_json::json!({ "uid": t }))
                .collect();
            obj.insert((*name).to_string(), Value::Array(refs));
        }
        Value::Object(obj)
    }
}

/// A set of nodes committed in one transaction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeBatch {
    pub nodes: Vec<Node>,
}

impl NodeBatch {
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Array(self.nodes.iter().map(Node::to_json).collect())
    }
}

/// Blank-label to store uid assignments from a committed mutation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MutationReceipt {
    pub uids: BTreeMap<String, String>,
}

/// Node type names shared by the schema, mutations and queries.
pub const USER: &str = "User";
pub const RESTAURANT: &str = "Restaurant";
pub const CITY: &str = "City";

/// The queries the core issues against the graph store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphQuery {
    /// Every `Restaurant` node with `count(followers)`, in uid order.
    FollowerCounts,
    /// `City` nodes whose name contains all terms of `city`, each with the
    /// restaurants reached through the reverse `located_in` edge.
    RestaurantsInCity { city: String },
    /// Total number of typed nodes.
    NodeCount,
}

impl GraphQuery {
    /// Native DQL text.
    #[must_use]
    pub const fn dql(&self) -> &'static str {
        match self {
            Self::FollowerCounts => {
                "{
  all(func: type(Restaurant)) {
    restaurant_name
    followers_count: count(followers)
  }
}"
            }
            Self::RestaurantsInCity { .. } => {
                "query RestaurantsInCity($city_name: string) {
  city(func: allofterms(city_name, $city_name)) @filter(type(City)) {
    city_name
    ~located_in @filter(type(Restaurant)) {
      restaurant_name
      followers_count: count(followers)
    }
  }
}"
            }
            Self::NodeCount => {
                "{
  nodes(func: has(dgraph.type)) {
    total: count(uid)
  }
}"
            }
        }
    }

    /// Variable bindings for [`dql`](Self::dql).
    #[must_use]
    pub fn bindings(&self) -> BTreeMap<&'static str, String> {
        match self {
            Self::RestaurantsInCity { city } => BTreeMap::from([("$city_name", city.clone())]),
            Self::FollowerCounts | Self::NodeCount => BTreeMap::new(),
        }
    }
}

/// Client for a property-graph store.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Apply a schema. Re-applying an identical schema is a no-op.
    async fn define_schema(&self, schema: &GraphSchema) -> Result<(), StoreError>;

    /// Commit a batch of nodes atomically, returning the assigned uids.
    async fn mutate(&self, batch: &NodeBatch) -> Result<MutationReceipt, StoreError>;

    /// Run a read-only query and return the JSON response body.
    async fn query(&self, query: &GraphQuery) -> Result<Value, StoreError>;

    /// Remove all data and schema.
    async fn drop_all(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_renders_directives() {
        let schema = GraphSchema {
            types: vec![NodeType {
                name: "Restaurant",
                fields: vec!["restaurant_name", "followers"],
            }],
            predicates: vec![
                Predicate::new("restaurant_name", PredicateType::String)
                    .indexed(Tokenizer::Exact),
                Predicate::new("followers", PredicateType::UidList)
                    .reverse()
                    .counted(),
            ],
        };
        let dql = schema.dql();
        assert!(dql.contains("type Restaurant {"));
        assert!(dql.contains("restaurant_name: string @index(exact) ."));
        assert!(dql.contains("followers: [uid] @reverse @count ."));
    }

    #[test]
    fn node_json_references_blank_labels() {
        let node = Node::new("_:restaurant1", "Restaurant")
            .scalar("rating", Scalar::Float(4.5))
            .edges("followers", vec!["_:user1".into()]);
        let json = node.to_json();
        assert_eq!(json["uid"], "_:restaurant1");
        assert_eq!(json["rating"], 4.5);
        assert_eq!(json["followers"][0]["uid"], "_:user1");
    }

    #[test]
    fn city_query_binds_name() {
        let query = GraphQuery::RestaurantsInCity {
            city: "Cancun".into(),
        };
        assert_eq!(query.bindings().get("$city_name").map(String::as_str), Some("Cancun"));
        assert!(query.dql().contains("~located_in"));
    }
}
