//! Canonical test data.
//!
//! The dataset is fixed: three zones, eight restaurants over four
//! categories (no `francesa`), six users. Only the relationships vary, and
//! they are driven by the seed passed to [`linked_model`].

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::application::relationship::generate;
use crate::domain::{
    CanonicalModel, Category, LinkedModel, MonthlySales, Restaurant, RestaurantId, User, UserId,
    Zone, ZoneId,
};

/// Zone names in id order.
pub const ZONE_NAMES: [&str; 3] = ["Cancún", "Tijuana", "Ciudad de México"];

/// Name of the restaurant whose sales are `100, 200, ..., 1200`.
pub const STEPPED_RESTAURANT: &str = "Sakura";

fn sales(amounts: [i64; 12]) -> MonthlySales {
    MonthlySales::new(&amounts).expect("fixture sales are twelve non-negative amounts")
}

fn restaurant(
    id: u64,
    name: &str,
    category: Category,
    rating: f64,
    sales: MonthlySales,
) -> Restaurant {
    Restaurant {
        id: RestaurantId::new(id),
        name: name.to_string(),
        category,
        rating,
        zone: None,
        followers: Vec::new(),
        sales,
    }
}

/// The unlinked dataset.
pub fn canonical_model() -> CanonicalModel {
    let zones = ZONE_NAMES
        .iter()
        .zip(1..)
        .map(|(name, id)| Zone::new(ZoneId::new(id), *name))
        .collect();

    let stepped = sales([100, 200, 300, 400, 500, 600, 700, 800, 900, 1000, 1100, 1200]);
    let restaurants = vec![
        restaurant(1, STEPPED_RESTAURANT, Category::Sushi, 4.5, stepped),
        restaurant(2, "Kaito", Category::Sushi, 3.8, sales([450; 12])),
        restaurant(3, "Umi", Category::Sushi, 4.9, sales([
            820, 760, 910, 1040, 980, 1150, 1230, 1190, 1010, 940, 880, 1300,
        ])),
        restaurant(4, "Nori Bar", Category::Sushi, 2.7, sales([
            150, 180, 210, 190, 230, 250, 270, 260, 240, 220, 200, 310,
        ])),
        restaurant(5, "Dragón Rojo", Category::China, 4.1, sales([
            600, 580, 640, 700, 720, 690, 750, 800, 770, 730, 710, 900,
        ])),
        restaurant(6, "Gran Muralla", Category::China, 3.2, sales([
            300, 320, 280, 350, 370, 390, 410, 400, 380, 360, 340, 450,
        ])),
        restaurant(7, "Trattoria Nonna", Category::Italiana, 4.7, sales([
            1200, 1100, 1250, 1300, 1280, 1350, 1400, 1420, 1380, 1330, 1290, 1500,
        ])),
        restaurant(8, "El Fogón", Category::Mexicana, 3.9, sales([
            500, 520, 540, 560, 580, 600, 620, 640, 660, 680, 700, 720,
        ])),
    ];

    let users = [
        (1, "Ana López", "ana@example.com"),
        (2, "Bruno Díaz", "bruno@example.com"),
        (3, "Carla Méndez", "carla@example.com"),
        (4, "Diego Ruiz", "diego@example.com"),
        (5, "Elena Vega", "elena@example.com"),
        (6, "Fernando Gil", "fernando@example.com"),
    ]
    .into_iter()
    .map(|(id, name, email)| User::new(UserId::new(id), name, email))
    .collect();

    CanonicalModel::new(users, restaurants, zones)
}

/// [`canonical_model`] with relationships generated from `seed`.
pub fn linked_model(seed: u64) -> LinkedModel {
    let mut rng = StdRng::seed_from_u64(seed);
    generate(canonical_model(), &mut rng).expect("fixture has zones")
}

/// Zones file for the three-zone, five-restaurant, four-user scenario.
pub const ZONES_CSV: &str = "\
id,nombre
1,Cancún
2,Tijuana
3,Monterrey
";

/// Restaurants file for the same scenario. Sales are bracketed the way
/// spreadsheet exports write them.
pub const RESTAURANTS_CSV: &str = "\
id,nombre,categoria,rating,ventas
1,Sakura,sushi,4.5,\"[100,200,300,400,500,600,700,800,900,1000,1100,1200]\"
2,Dragón Rojo,china,4.1,\"[600,580,640,700,720,690,750,800,770,730,710,900]\"
3,Trattoria Nonna,italiana,4.7,\"[1200,1100,1250,1300,1280,1350,1400,1420,1380,1330,1290,1500]\"
4,El Fogón,mexicana,3.9,\"[500,520,540,560,580,600,620,640,660,680,700,720]\"
5,Umi,sushi,4.9,\"[820,760,910,1040,980,1150,1230,1190,1010,940,880,1300]\"
";

/// Users file for the same scenario.
pub const USERS_CSV: &str = "\
id,nombre,email,seguidores,zona
1,Ana López,ana@example.com,10,Cancún
2,Bruno Díaz,bruno@example.com,3,Tijuana
3,Carla Méndez,carla@example.com,7,cancun
4,Diego Ruiz,diego@example.com,0,Monterrey
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_is_consistent_for_any_seed() {
        for seed in 0..10 {
            assert!(linked_model(seed).violations().is_empty(), "seed {seed}");
        }
    }
}
