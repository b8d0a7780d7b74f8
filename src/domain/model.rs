//! The canonical, store-agnostic dataset.
//!
//! A [`CanonicalModel`] is built once per load cycle from tabular input. Its
//! relational fields (zone references, follow edges, follower sets) start
//! empty and are filled in by the relationship generator, which hands back a
//! [`LinkedModel`]. Projectors only accept the linked form.

use std::collections::{HashMap, HashSet};
use std::ops::Deref;

use serde::Serialize;

use super::category::Category;
use super::id::{RestaurantId, UserId, ZoneId};
use super::month::Month;

/// Number of entries in a restaurant's sales sequence.
pub const MONTHS_PER_YEAR: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Follower count carried by the input file. Informational only; the
    /// follower counts reported by queries are derived from follow edges.
    pub follower_seed: u32,
    pub zone: Option<ZoneId>,
    pub follows_users: Vec<UserId>,
    pub follows_restaurants: Vec<RestaurantId>,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            follower_seed: 0,
            zone: None,
            follows_users: Vec::new(),
            follows_restaurants: Vec::new(),
        }
    }
}

/// Twelve non-negative monthly sales amounts, January first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlySales([i64; MONTHS_PER_YEAR]);

/// Why a sales sequence was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SalesError {
    #[error("expected {MONTHS_PER_YEAR} monthly amounts, got {0}")]
    WrongLength(usize),
    #[error("amount for {month} is negative ({amount})")]
    Negative { month: Month, amount: i64 },
}

impl MonthlySales {
    pub fn new(amounts: &[i64]) -> Result<Self, SalesError> {
        let values: [i64; MONTHS_PER_YEAR] = amounts
            .try_into()
            .map_err(|_| SalesError::WrongLength(amounts.len()))?;
        for (month, &amount) in Month::ALL.iter().zip(values.iter()) {
            if amount < 0 {
                return Err(SalesError::Negative {
                    month: *month,
                    amount,
                });
            }
        }
        Ok(Self(values))
    }

    #[must_use]
    pub fn amount(&self, month: Month) -> i64 {
        self.0[month as usize]
    }

    #[must_use]
    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Month, i64)> + '_ {
        Month::ALL.into_iter().zip(self.0.iter().copied())
    }
}

/// One (restaurant, month, amount) sales fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesRecord {
    pub restaurant: RestaurantId,
    pub restaurant_name: String,
    pub month: Month,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    pub category: Category,
    pub rating: f64,
    pub zone: Option<ZoneId>,
    pub followers: Vec<UserId>,
    pub sales: MonthlySales,
}

impl Restaurant {
    /// Explode the sales sequence into one record per month, in calendar order.
    pub fn sales_records(&self) -> impl Iterator<Item = SalesRecord> + '_ {
        self.sales.iter().map(move |(month, amount)| SalesRecord {
            restaurant: self.id,
            restaurant_name: self.name.clone(),
            month,
            amount,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub restaurants: Vec<RestaurantId>,
}

impl Zone {
    pub fn new(id: ZoneId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            restaurants: Vec::new(),
        }
    }
}

/// In-memory representation of every entity before projection.
#[derive(Debug, Clone, Default)]
pub struct CanonicalModel {
    users: Vec<User>,
    restaurants: Vec<Restaurant>,
    zones: Vec<Zone>,
    restaurant_index: HashMap<RestaurantId, usize>,
    zone_index: HashMap<ZoneId, usize>,
}

impl CanonicalModel {
    /// Assemble a model from already-validated entities.
    ///
    /// Identifier uniqueness is the caller's responsibility; ingest rejects
    /// duplicate ids before they get here.
    #[must_use]
    pub fn new(users: Vec<User>, restaurants: Vec<Restaurant>, zones: Vec<Zone>) -> Self {
        let restaurant_index = restaurants
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id, i))
            .collect();
        let zone_index = zones.iter().enumerate().map(|(i, z)| (z.id, i)).collect();
        Self {
            users,
            restaurants,
            zones,
            restaurant_index,
            zone_index,
        }
    }

    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    #[must_use]
    pub fn restaurants(&self) -> &[Restaurant] {
        &self.restaurants
    }

    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut [User], &mut [Restaurant], &mut [Zone]) {
        (&mut self.users, &mut self.restaurants, &mut self.zones)
    }

    #[must_use]
    pub fn restaurant(&self, id: RestaurantId) -> Option<&Restaurant> {
        self.restaurant_index.get(&id).map(|&i| &self.restaurants[i])
    }

    #[must_use]
    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zone_index.get(&id).map(|&i| &self.zones[i])
    }

    /// Every sales fact, restaurants in input order and months in calendar order.
    pub fn sales_records(&self) -> impl Iterator<Item = SalesRecord> + '_ {
        self.restaurants.iter().flat_map(Restaurant::sales_records)
    }

    /// Check the relational invariants that hold after generation.
    ///
    /// Returns every violation found rather than stopping at the first.
    #[must_use]
    pub fn violations(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let user_target = self.users.len().saturating_sub(1).min(5);
        let restaurant_target = self.restaurants.len().min(6);

        let mut derived_followers: HashMap<RestaurantId, Vec<UserId>> = HashMap::new();
        for user in &self.users {
            if user.follows_users.contains(&user.id) {
                problems.push(format!("user {} follows itself", user.id));
            }
            if !all_distinct(&user.follows_users) {
                problems.push(format!("user {} follows a user twice", user.id));
            }
            if !all_distinct(&user.follows_restaurants) {
                problems.push(format!("user {} follows a restaurant twice", user.id));
            }
            if user.follows_users.len() != user_target {
                problems.push(format!(
                    "user {} follows {} users, expected {user_target}",
                    user.id,
                    user.follows_users.len()
                ));
            }
            if user.follows_restaurants.len() != restaurant_target {
                problems.push(format!(
                    "user {} follows {} restaurants, expected {restaurant_target}",
                    user.id,
                    user.follows_restaurants.len()
                ));
            }
            if user.zone.and_then(|z| self.zone(z)).is_none() {
                problems.push(format!("user {} has no valid zone", user.id));
            }
            for restaurant in &user.follows_restaurants {
                derived_followers.entry(*restaurant).or_default().push(user.id);
            }
        }

        for restaurant in &self.restaurants {
            let mut recorded = restaurant.followers.clone();
            let mut derived = derived_followers.remove(&restaurant.id).unwrap_or_default();
            recorded.sort();
            derived.sort();
            if recorded != derived {
                problems.push(format!(
                    "restaurant {} records {} followers but {} users follow it",
                    restaurant.id,
                    recorded.len(),
                    derived.len()
                ));
            }

            match restaurant.zone.and_then(|z| self.zone(z)) {
                None => problems.push(format!("restaurant {} has no valid zone", restaurant.id)),
                Some(zone) => {
                    let hits = zone.restaurants.iter().filter(|r| **r == restaurant.id).count();
                    if hits != 1 {
                        problems.push(format!(
                            "zone {} lists restaurant {} {hits} times",
                            zone.id, restaurant.id
                        ));
                    }
                }
            }
        }

        for zone in &self.zones {
            for id in &zone.restaurants {
                if self.restaurant(*id).and_then(|r| r.zone) != Some(zone.id) {
                    problems.push(format!(
                        "zone {} lists restaurant {id} which points elsewhere",
                        zone.id
                    ));
                }
            }
        }

        for id in derived_followers.keys() {
            problems.push(format!("users follow unknown restaurant {id}"));
        }

        problems
    }
}

fn all_distinct<T: Eq + std::hash::Hash>(items: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(items.len());
    items.iter().all(|item| seen.insert(item))
}

/// A model whose relational fields have been populated by the generator.
///
/// Only the relationship generator constructs this, which is what lets the
/// projectors rely on zone references and follower sets being present.
#[derive(Debug, Clone)]
pub struct LinkedModel(CanonicalModel);

impl LinkedModel {
    pub(crate) fn new(model: CanonicalModel) -> Self {
        Self(model)
    }

    #[must_use]
    pub fn into_inner(self) -> CanonicalModel {
        self.0
    }
}

impl Deref for LinkedModel {
    type Target = CanonicalModel;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales(base: i64) -> MonthlySales {
        let amounts: Vec<i64> = (1..=12).map(|m| base * m).collect();
        MonthlySales::new(&amounts).expect("valid sales")
    }

    #[test]
    fn sales_require_twelve_entries() {
        assert_eq!(MonthlySales::new(&[1, 2, 3]), Err(SalesError::WrongLength(3)));
    }

    #[test]
    fn sales_reject_negative_amounts() {
        let mut amounts = vec![10; 12];
        amounts[4] = -1;
        assert_eq!(
            MonthlySales::new(&amounts),
            Err(SalesError::Negative {
                month: Month::May,
                amount: -1
            })
        );
    }

    #[test]
    fn sales_records_cover_every_month_once() {
        let restaurant = Restaurant {
            id: RestaurantId::new(1),
            name: "Casa".into(),
            category: Category::Mexicana,
            rating: 4.5,
            zone: None,
            followers: Vec::new(),
            sales: sales(100),
        };
        let records: Vec<_> = restaurant.sales_records().collect();
        assert_eq!(records.len(), 12);
        assert_eq!(records[0].month, Month::January);
        assert_eq!(records[0].amount, 100);
        assert_eq!(records[11].month, Month::December);
        assert_eq!(records[11].amount, 1200);
    }

    #[test]
    fn unlinked_model_reports_missing_zones() {
        let model = CanonicalModel::new(
            vec![User::new(UserId::new(1), "Ana", "ana@example.com")],
            vec![Restaurant {
                id: RestaurantId::new(1),
                name: "Casa".into(),
                category: Category::Mexicana,
                rating: 4.0,
                zone: None,
                followers: Vec::new(),
                sales: sales(1),
            }],
            vec![Zone::new(ZoneId::new(1), "Cancun")],
        );
        let problems = model.violations();
        assert!(problems.iter().any(|p| p.contains("restaurant 1 has no valid zone")));
        assert!(problems.iter().any(|p| p.contains("user 1 has no valid zone")));
    }
}
