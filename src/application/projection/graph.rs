//! Graph projection.
//!
//! Users, restaurants and cities become typed nodes. Follower counts and the
//! restaurants of a city are never stored as fields: they are read back via
//! `count(followers)` and the reverse `located_in` edge.

use crate::domain::{LinkedModel, RestaurantId, UserId, ZoneId};
use crate::port::outbound::graph::{
    GraphSchema, Node, NodeBatch, NodeType, Predicate, PredicateType, Scalar, Tokenizer,
};

pub use crate::port::outbound::graph::{CITY, RESTAURANT, USER};

/// Schema for the restaurant graph.
#[must_use]
pub fn schema() -> GraphSchema {
    GraphSchema {
        types: vec![
            NodeType {
                name: USER,
                fields: vec![
                    "user_name",
                    "email",
                    "follower_seed",
                    "lives_in",
                    "follows_user",
                    "follows_restaurant",
                ],
            },
            NodeType {
                name: RESTAURANT,
                fields: vec![
                    "restaurant_name",
                    "category",
                    "rating",
                    "located_in",
                    "followers",
                ],
            },
            NodeType {
                name: CITY,
                fields: vec!["city_name"],
            },
        ],
        predicates: vec![
            Predicate::new("user_name", PredicateType::String),
            Predicate::new("email", PredicateType::String).indexed(Tokenizer::Exact),
            Predicate::new("follower_seed", PredicateType::Int),
            Predicate::new("lives_in", PredicateType::UidList),
            Predicate::new("follows_user", PredicateType::UidList),
            Predicate::new("follows_restaurant", PredicateType::UidList),
            Predicate::new("restaurant_name", PredicateType::String).indexed(Tokenizer::Exact),
            Predicate::new("category", PredicateType::String).indexed(Tokenizer::Exact),
            Predicate::new("rating", PredicateType::Float),
            Predicate::new("followers", PredicateType::UidList).reverse().counted(),
            Predicate::new("located_in", PredicateType::UidList).reverse(),
            Predicate::new("city_name", PredicateType::String).indexed(Tokenizer::Term),
        ],
    }
}

fn user_label(id: UserId) -> String {
    format!("_:user{id}")
}

fn restaurant_label(id: RestaurantId) -> String {
    format!("_:restaurant{id}")
}

fn city_label(id: ZoneId) -> String {
    format!("_:city{id}")
}

fn with_edges(node: Node, predicate: &'static str, targets: Vec<String>) -> Node {
    if targets.is_empty() {
        node
    } else {
        node.edges(predicate, targets)
    }
}

/// Every entity as one mutation.
///
/// Blank labels are derived from entity ids, so edges resolve inside the
/// batch and the store assigns fresh uids on commit. Nodes are ordered
/// cities, users, restaurants, each in input order.
#[must_use]
pub fn project(model: &LinkedModel) -> NodeBatch {
    let mut nodes = Vec::with_capacity(
        model.zones().len() + model.users().len() + model.restaurants().len(),
    );

    for zone in model.zones() {
        nodes.push(
            Node::new(city_label(zone.id), CITY)
                .scalar("city_name", Scalar::String(zone.name.clone())),
        );
    }

    for user in model.users() {
        let node = Node::new(user_label(user.id), USER)
            .scalar("user_name", Scalar::String(user.name.clone()))
            .scalar("email", Scalar::String(user.email.clone()))
            .scalar("follower_seed", Scalar::Int(i64::from(user.follower_seed)));
        let node = with_edges(node, "lives_in", user.zone.into_iter().map(city_label).collect());
        let node = with_edges(
            node,
            "follows_user",
            user.follows_users.iter().copied().map(user_label).collect(),
        );
        let node = with_edges(
            node,
            "follows_restaurant",
            user.follows_restaurants
                .iter()
                .copied()
                .map(restaurant_label)
                .collect(),
        );
        nodes.push(node);
    }

    for restaurant in model.restaurants() {
        let node = Node::new(restaurant_label(restaurant.id), RESTAURANT)
            .scalar("restaurant_name", Scalar::String(restaurant.name.clone()))
            .scalar(
                "category",
                Scalar::String(restaurant.category.as_str().to_string()),
            )
            .scalar("rating", Scalar::Float(restaurant.rating));
        let node = with_edges(
            node,
            "located_in",
            restaurant.zone.into_iter().map(city_label).collect(),
        );
        let node = with_edges(
            node,
            "followers",
            restaurant.followers.iter().copied().map(user_label).collect(),
        );
        nodes.push(node);
    }

    NodeBatch { nodes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::fixtures;

    #[test]
    fn schema_marks_reverse_and_count_edges() {
        let dql = schema().dql();
        assert!(dql.contains("followers: [uid] @reverse @count ."));
        assert!(dql.contains("located_in: [uid] @reverse ."));
        assert!(dql.contains("city_name: string @index(term) ."));
        assert!(dql.contains("type Restaurant {"));
    }

    #[test]
    fn every_entity_becomes_one_node() {
        let model = fixtures::linked_model(11);
        let batch = project(&model);
        assert_eq!(
            batch.len(),
            model.users().len() + model.restaurants().len() + model.zones().len()
        );
    }

    #[test]
    fn restaurant_edges_reference_batch_labels() {
        let model = fixtures::linked_model(11);
        let batch = project(&model);
        let restaurant = &model.restaurants()[0];
        let node = batch
            .nodes
            .iter()
            .find(|n| n.blank == format!("_:restaurant{}", restaurant.id))
            .unwrap();
        let zone = restaurant.zone.unwrap();
        assert_eq!(node.edges["located_in"], vec![format!("_:city{zone}")]);
        assert_eq!(
            node.edges.get("followers").map_or(0, Vec::len),
            restaurant.followers.len()
        );
        for target in node.edges.values().flatten() {
            assert!(batch.nodes.iter().any(|n| &n.blank == target));
        }
    }

    #[test]
    fn projection_uses_only_schema_predicates() {
        let schema = schema();
        let batch = project(&fixtures::linked_model(3));
        for node in &batch.nodes {
            for predicate in node.scalars.keys().chain(node.edges.keys()) {
                assert!(schema.predicate(predicate).is_some(), "{predicate}");
            }
        }
    }
}
