//! In-memory property-graph store.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use super::Availability;
use crate::domain::{normalize_city_name, StoreKind};
use crate::error::StoreError;
use crate::port::outbound::graph::{
    GraphQuery, GraphSchema, GraphStore, MutationReceipt, NodeBatch, Scalar, CITY, RESTAURANT,
};

#[derive(Debug)]
struct StoredNode {
    uid: String,
    node_type: &'static str,
    scalars: BTreeMap<&'static str, Scalar>,
    edges: BTreeMap<&'static str, Vec<String>>,
}

#[derive(Debug, Default)]
struct GraphState {
    schema: Option<GraphSchema>,
    nodes: Vec<StoredNode>,
    by_uid: HashMap<String, usize>,
    /// `(predicate, target uid)` to source uids, for `@reverse` predicates.
    reverse: HashMap<(&'static str, String), Vec<String>>,
    next_uid: u64,
}

impl GraphState {
    fn is_reversed(&self, predicate: &str) -> bool {
        self.schema
            .as_ref()
            .and_then(|s| s.predicate(predicate))
            .is_some_and(|p| p.reverse)
    }

    fn node(&self, uid: &str) -> Option<&StoredNode> {
        self.by_uid.get(uid).map(|&i| &self.nodes[i])
    }

    fn scalar_str(&self, uid: &str, predicate: &str) -> Option<&str> {
        match self.node(uid)?.scalars.get(predicate)? {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    fn edge_count(&self, uid: &str, predicate: &str) -> usize {
        self.by_uid
            .get(uid)
            .and_then(|&i| self.nodes[i].edges.get(predicate))
            .map_or(0, Vec::len)
    }
}

/// Term set used by `allofterms`: diacritic-folded lowercase words.
fn terms(text: &str) -> HashSet<String> {
    normalize_city_name(text)
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Property-graph store held in process memory.
#[derive(Debug)]
pub struct InMemoryGraphStore {
    state: Mutex<GraphState>,
    availability: Availability,
}

impl Default for InMemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGraphStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GraphState::default()),
            availability: Availability::new(StoreKind::Graph),
        }
    }

    /// Simulate the store becoming reachable or unreachable.
    pub fn set_available(&self, up: bool) {
        self.availability.set(up);
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.state.lock().nodes.len()
    }

    #[must_use]
    pub fn schema(&self) -> Option<GraphSchema> {
        self.state.lock().schema.clone()
    }

    fn follower_counts(state: &GraphState) -> Value {
        let rows: Vec<Value> = state
            .nodes
            .iter()
            .filter(|node| node.node_type == RESTAURANT)
            .filter_map(|node| match node.scalars.get("restaurant_name") {
                Some(Scalar::String(name)) => Some(json!({
                    "uid": node.uid,
                    "restaurant_name": name,
                    "followers_count": state.edge_count(&node.uid, "followers"),
                })),
                _ => None,
            })
            .collect();
        json!({ "all": rows })
    }

    fn restaurants_in_city(state: &GraphState, city: &str) -> Value {
        let wanted = terms(city);
        let mut cities = Vec::new();
        if wanted.is_empty() {
            return json!({ "city": cities });
        }
        for node in state.nodes.iter().filter(|n| n.node_type == CITY) {
            let Some(Scalar::String(name)) = node.scalars.get("city_name") else {
                continue;
            };
            if !wanted.is_subset(&terms(name)) {
                continue;
            }
            let mut entry = Map::new();
            entry.insert("city_name".into(), Value::from(name.as_str()));
            if state.is_reversed("located_in") {
                let sources = state
                    .reverse
                    .get(&("located_in", node.uid.clone()))
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                let restaurants: Vec<Value> = sources
                    .iter()
                    .filter(|uid| state.node(uid).is_some_and(|n| n.node_type == RESTAURANT))
                    .filter_map(|uid| {
                        let name = state.scalar_str(uid, "restaurant_name")?;
                        Some(json!({
                            "restaurant_name": name,
                            "followers_count": state.edge_count(uid, "followers"),
                        }))
                    })
                    .collect();
                // Empty reverse edges are omitted from responses.
                if !restaurants.is_empty() {
                    entry.insert("~located_in".into(), Value::Array(restaurants));
                }
            }
            cities.push(Value::Object(entry));
        }
        json!({ "city": cities })
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn define_schema(&self, schema: &GraphSchema) -> Result<(), StoreError> {
        self.availability.check()?;
        let mut state = self.state.lock();
        let merged = match state.schema.take() {
            None => schema.clone(),
            Some(mut existing) => {
                for predicate in &schema.predicates {
                    existing.predicates.retain(|p| p.name != predicate.name);
                    existing.predicates.push(predicate.clone());
                }
                for node_type in &schema.types {
                    existing.types.retain(|t| t.name != node_type.name);
                    existing.types.push(node_type.clone());
                }
                existing
            }
        };
        state.schema = Some(merged);
        Ok(())
    }

    async fn mutate(&self, batch: &NodeBatch) -> Result<MutationReceipt, StoreError> {
        self.availability.check()?;
        let mut state = self.state.lock();

        let mut receipt = MutationReceipt::default();
        let mut next = state.next_uid;
        for node in &batch.nodes {
            if receipt.uids.contains_key(&node.blank) {
                return Err(StoreError::PartialWrite {
                    store: StoreKind::Graph,
                    table: node.node_type.to_string(),
                    reason: format!("blank node {} appears twice in one mutation", node.blank),
                });
            }
            next += 1;
            receipt.uids.insert(node.blank.clone(), format!("0x{next:x}"));
        }

        // Resolve every edge before touching state so a bad reference
        // leaves the store unchanged.
        let mut resolved = Vec::with_capacity(batch.nodes.len());
        for node in &batch.nodes {
            if let Some(schema) = &state.schema {
                let unknown = node
                    .scalars
                    .keys()
                    .chain(node.edges.keys())
                    .find(|p| schema.predicate(p).is_none());
                if let Some(predicate) = unknown {
                    return Err(StoreError::PartialWrite {
                        store: StoreKind::Graph,
                        table: node.node_type.to_string(),
                        reason: format!("predicate {predicate} is not in the schema"),
                    });
                }
            }
            let mut edges = BTreeMap::new();
            for (predicate, targets) in &node.edges {
                let mut uids = Vec::with_capacity(targets.len());
                for target in targets {
                    let uid = match receipt.uids.get(target) {
                        Some(uid) => uid.clone(),
                        None if state.by_uid.contains_key(target) => target.clone(),
                        None => {
                            return Err(StoreError::PartialWrite {
                                store: StoreKind::Graph,
                                table: node.node_type.to_string(),
                                reason: format!(
                                    "{} references unknown node {target} via {predicate}",
                                    node.blank
                                ),
                            })
                        }
                    };
                    uids.push(uid);
                }
                edges.insert(*predicate, uids);
            }
            resolved.push(StoredNode {
                uid: receipt.uids[&node.blank].clone(),
                node_type: node.node_type,
                scalars: node.scalars.clone(),
                edges,
            });
        }

        state.next_uid = next;
        for node in resolved {
            for (predicate, targets) in &node.edges {
                if state.is_reversed(predicate) {
                    for target in targets {
                        state
                            .reverse
                            .entry((*predicate, target.clone()))
                            .or_default()
                            .push(node.uid.clone());
                    }
                }
            }
            let index = state.nodes.len();
            state.by_uid.insert(node.uid.clone(), index);
            state.nodes.push(node);
        }

        Ok(receipt)
    }

    async fn query(&self, query: &GraphQuery) -> Result<Value, StoreError> {
        self.availability.check()?;
        let state = self.state.lock();
        Ok(match query {
            GraphQuery::FollowerCounts => Self::follower_counts(&state),
            GraphQuery::RestaurantsInCity { city } => Self::restaurants_in_city(&state, city),
            GraphQuery::NodeCount => json!({ "nodes": [{ "total": state.nodes.len() }] }),
        })
    }

    async fn drop_all(&self) -> Result<(), StoreError> {
        self.availability.check()?;
        *self.state.lock() = GraphState::default();
        Ok(())
    }
}
