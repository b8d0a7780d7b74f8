//! Relationship generation.
//!
//! Populates every relational field of a [`CanonicalModel`]: the zone of each
//! restaurant (and the inverse zone listing), the users and restaurants each
//! user follows, the inverse follower lists, and the zone each user lives in.
//! Sampling is driven by the caller's RNG so a seeded generator gives the same
//! graph every time.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::domain::{CanonicalModel, LinkedModel, RestaurantId, UserId};
use crate::error::InsufficientDataError;

/// Upper bound on the number of users each user follows.
pub const FOLLOWED_USERS: usize = 5;
/// Upper bound on the number of restaurants each user follows.
pub const FOLLOWED_RESTAURANTS: usize = 6;

/// Build the follow graph and zone assignment.
///
/// Any relational data already on the model is discarded first, so the
/// result depends only on the entities and the RNG.
///
/// # Errors
///
/// [`InsufficientDataError::NoZones`] when there are restaurants or users to
/// place but no zones to place them in.
pub fn generate<R: Rng>(
    mut model: CanonicalModel,
    rng: &mut R,
) -> Result<LinkedModel, InsufficientDataError> {
    let (users, restaurants, zones) = model.parts_mut();

    if zones.is_empty() {
        if !restaurants.is_empty() {
            return Err(InsufficientDataError::NoZones("restaurants"));
        }
        if !users.is_empty() {
            return Err(InsufficientDataError::NoZones("users"));
        }
    }

    for zone in zones.iter_mut() {
        zone.restaurants.clear();
    }
    for restaurant in restaurants.iter_mut() {
        restaurant.followers.clear();
        let slot = rng.gen_range(0..zones.len());
        restaurant.zone = Some(zones[slot].id);
        zones[slot].restaurants.push(restaurant.id);
    }

    let user_ids: Vec<UserId> = users.iter().map(|u| u.id).collect();
    let restaurant_ids: Vec<RestaurantId> = restaurants.iter().map(|r| r.id).collect();
    let position: HashMap<RestaurantId, usize> = restaurant_ids
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i))
        .collect();
    let user_quota = user_ids.len().saturating_sub(1).min(FOLLOWED_USERS);
    let restaurant_quota = restaurant_ids.len().min(FOLLOWED_RESTAURANTS);

    for user in users.iter_mut() {
        let others: Vec<UserId> = user_ids
            .iter()
            .copied()
            .filter(|id| *id != user.id)
            .collect();
        user.follows_users = others.choose_multiple(rng, user_quota).copied().collect();
        user.follows_restaurants = restaurant_ids
            .choose_multiple(rng, restaurant_quota)
            .copied()
            .collect();
        for followed in &user.follows_restaurants {
            restaurants[position[followed]].followers.push(user.id);
        }
        // Drawn after the follows, independently of any zone read from input.
        user.zone = Some(zones[rng.gen_range(0..zones.len())].id);
    }

    debug!(
        users = users.len(),
        restaurants = restaurants.len(),
        zones = zones.len(),
        user_quota,
        restaurant_quota,
        "Relationships generated"
    );

    Ok(LinkedModel::new(model))
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::domain::{Category, MonthlySales, Restaurant, User, Zone, ZoneId};

    fn model(users: u64, restaurants: u64, zones: u64) -> CanonicalModel {
        let sales = MonthlySales::new(&[1; 12]).unwrap();
        CanonicalModel::new(
            (1..=users)
                .map(|i| User::new(UserId::new(i), format!("u{i}"), format!("u{i}@example.com")))
                .collect(),
            (1..=restaurants)
                .map(|i| Restaurant {
                    id: RestaurantId::new(i),
                    name: format!("r{i}"),
                    category: Category::China,
                    rating: 3.0,
                    zone: None,
                    followers: Vec::new(),
                    sales,
                })
                .collect(),
            (1..=zones)
                .map(|i| Zone::new(ZoneId::new(i), format!("z{i}")))
                .collect(),
        )
    }

    #[test]
    fn generated_model_satisfies_all_invariants() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let linked = generate(model(9, 8, 3), &mut rng).unwrap();
            assert_eq!(linked.violations(), Vec::<String>::new(), "seed {seed}");
        }
    }

    #[test]
    fn small_populations_cap_the_quotas() {
        let mut rng = StdRng::seed_from_u64(7);
        let linked = generate(model(3, 2, 1), &mut rng).unwrap();
        for user in linked.users() {
            assert_eq!(user.follows_users.len(), 2);
            assert_eq!(user.follows_restaurants.len(), 2);
        }
    }

    #[test]
    fn single_user_follows_nobody() {
        let mut rng = StdRng::seed_from_u64(1);
        let linked = generate(model(1, 4, 2), &mut rng).unwrap();
        assert!(linked.users()[0].follows_users.is_empty());
        assert_eq!(linked.users()[0].follows_restaurants.len(), 4);
        assert!(linked.violations().is_empty());
    }

    #[test]
    fn same_seed_same_graph() {
        let a = generate(model(6, 6, 3), &mut StdRng::seed_from_u64(42)).unwrap();
        let b = generate(model(6, 6, 3), &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a.users(), b.users());
        assert_eq!(a.restaurants(), b.restaurants());
    }

    #[test]
    fn zero_zones_is_insufficient() {
        let err = generate(model(2, 2, 0), &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert_eq!(err, InsufficientDataError::NoZones("restaurants"));
        let err = generate(model(2, 0, 0), &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert_eq!(err, InsufficientDataError::NoZones("users"));
    }

    #[test]
    fn empty_model_links_trivially() {
        let linked = generate(model(0, 0, 0), &mut StdRng::seed_from_u64(0)).unwrap();
        assert!(linked.users().is_empty());
    }

    #[test]
    fn regeneration_discards_previous_links() {
        let mut rng = StdRng::seed_from_u64(3);
        let first = generate(model(5, 5, 2), &mut rng).unwrap();
        let second = generate(first.into_inner(), &mut rng).unwrap();
        assert!(second.violations().is_empty());
    }
}
