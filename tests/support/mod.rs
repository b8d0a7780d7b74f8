//! Helpers shared by the integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use polystore::testkit::fixtures::{RESTAURANTS_CSV, USERS_CSV, ZONES_CSV};

/// Write the three-zone, five-restaurant, four-user inputs into `dir`.
pub fn write_inputs(dir: &Path) -> [PathBuf; 3] {
    let files = [
        ("usuarios.csv", USERS_CSV),
        ("restaurantes.csv", RESTAURANTS_CSV),
        ("zonas.csv", ZONES_CSV),
    ];
    files.map(|(name, body)| {
        let path = dir.join(name);
        fs::write(&path, body).expect("write input");
        path
    })
}

/// TOML pointing at the inputs in `dir`, with a fixed seed.
pub fn config_toml(dir: &Path, seed: u64) -> String {
    let [users, restaurants, zones] = write_inputs(dir);
    format!(
        "[data]\n\
         users = {users:?}\n\
         restaurants = {restaurants:?}\n\
         zones = {zones:?}\n\
         \n\
         [generation]\n\
         seed = {seed}\n\
         \n\
         [logging]\n\
         level = \"error\"\n\
         format = \"pretty\"\n",
        users = users.display().to_string(),
        restaurants = restaurants.display().to_string(),
        zones = zones.display().to_string(),
    )
}

/// Write a config file next to the inputs and return its path.
pub fn write_config(dir: &Path, seed: u64) -> PathBuf {
    let path = dir.join("config.toml");
    fs::write(&path, config_toml(dir, seed)).expect("write config");
    path
}
