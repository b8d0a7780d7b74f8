//! Tabular ingest into the canonical model.
//!
//! Reads the three CSV tables (zones, restaurants, users) and validates each
//! row independently. A bad row is either skipped and reported or aborts the
//! whole load, depending on [`IngestPolicy`]. Relational fields are left
//! empty; the relationship generator fills them in.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{
    normalize_city_name, CanonicalModel, Category, MonthlySales, Restaurant, RestaurantId, User,
    UserId, Zone, ZoneId,
};
use crate::error::{Error, InputTable, MalformedInputError, Result};

/// What to do with a row that fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestPolicy {
    /// Drop the row, record it, keep going.
    #[default]
    Skip,
    /// Fail the whole load on the first bad row.
    Abort,
}

/// A loaded model plus every row that was rejected on the way.
#[derive(Debug)]
pub struct LoadReport {
    pub model: CanonicalModel,
    pub rejected: Vec<MalformedInputError>,
}

#[derive(Debug, Deserialize)]
struct ZoneRow {
    id: Option<String>,
    #[serde(alias = "name")]
    nombre: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RestaurantRow {
    id: Option<String>,
    #[serde(alias = "name")]
    nombre: Option<String>,
    #[serde(alias = "category")]
    categoria: Option<String>,
    rating: Option<String>,
    #[serde(alias = "sales")]
    ventas: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserRow {
    id: Option<String>,
    #[serde(alias = "name")]
    nombre: Option<String>,
    email: Option<String>,
    #[serde(alias = "followers")]
    seguidores: Option<String>,
    #[serde(alias = "zone")]
    zona: Option<String>,
}

/// Row-level validation context.
struct RowCheck {
    table: InputTable,
    row: usize,
}

impl RowCheck {
    fn fail(&self, field: &'static str, reason: impl Into<String>) -> MalformedInputError {
        MalformedInputError::new(self.table, self.row, field, reason)
    }

    fn required<'a>(
        &self,
        field: &'static str,
        value: &'a Option<String>,
    ) -> std::result::Result<&'a str, MalformedInputError> {
        match value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(self.fail(field, "is missing")),
        }
    }

    fn id(&self, value: &Option<String>) -> std::result::Result<u64, MalformedInputError> {
        let raw = self.required("id", value)?;
        raw.parse()
            .map_err(|_| self.fail("id", format!("'{raw}' is not a non-negative integer")))
    }
}

/// Parse a bracketed sales list such as `[100, 200, 300]`.
///
/// The brackets are optional; whitespace around entries is ignored.
fn parse_sales(raw: &str) -> std::result::Result<Vec<i64>, String> {
    let inner = raw.trim();
    let inner = inner.strip_prefix('[').unwrap_or(inner);
    let inner = inner.strip_suffix(']').unwrap_or(inner);
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    inner
        .split(',')
        .map(|entry| {
            let entry = entry.trim();
            entry
                .parse::<i64>()
                .map_err(|_| format!("'{entry}' is not an integer"))
        })
        .collect()
}

/// Canonical-model loader.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ingest {
    policy: IngestPolicy,
}

impl Ingest {
    #[must_use]
    pub const fn new(policy: IngestPolicy) -> Self {
        Self { policy }
    }

    /// Load from three CSV files on disk.
    pub fn load_paths(
        &self,
        users: impl AsRef<Path>,
        restaurants: impl AsRef<Path>,
        zones: impl AsRef<Path>,
    ) -> Result<LoadReport> {
        self.load(
            File::open(users)?,
            File::open(restaurants)?,
            File::open(zones)?,
        )
    }

    /// Load from three CSV readers.
    ///
    /// Returns `Err` only for I/O failures, or for the first bad row when the
    /// policy is [`IngestPolicy::Abort`].
    pub fn load(
        &self,
        users: impl Read,
        restaurants: impl Read,
        zones: impl Read,
    ) -> Result<LoadReport> {
        let mut rejected = Vec::new();

        let zones = self.read_zones(zones, &mut rejected)?;
        let restaurants = self.read_restaurants(restaurants, &mut rejected)?;
        let zone_lookup: HashMap<String, ZoneId> = zones
            .iter()
            .map(|z| (zone_key(&z.name), z.id))
            .collect();
        let users = self.read_users(users, &zone_lookup, &mut rejected)?;

        info!(
            users = users.len(),
            restaurants = restaurants.len(),
            zones = zones.len(),
            rejected = rejected.len(),
            "Canonical model loaded"
        );

        Ok(LoadReport {
            model: CanonicalModel::new(users, restaurants, zones),
            rejected,
        })
    }

    fn reject(
        &self,
        error: MalformedInputError,
        rejected: &mut Vec<MalformedInputError>,
    ) -> Result<()> {
        match self.policy {
            IngestPolicy::Abort => Err(Error::MalformedInput(error)),
            IngestPolicy::Skip => {
                warn!(
                    table = %error.table,
                    row = error.row,
                    field = error.field,
                    reason = %error.reason,
                    "Skipping malformed row"
                );
                rejected.push(error);
                Ok(())
            }
        }
    }

    fn read_zones(
        &self,
        input: impl Read,
        rejected: &mut Vec<MalformedInputError>,
    ) -> Result<Vec<Zone>> {
        let mut seen = HashSet::new();
        let mut zones = Vec::new();
        for (index, record) in reader(input).deserialize::<ZoneRow>().enumerate() {
            let check = RowCheck {
                table: InputTable::Zones,
                row: index + 1,
            };
            let parsed = record
                .map_err(|e| check.fail("record", e.to_string()))
                .and_then(|row| {
                    let id = check.id(&row.id)?;
                    let name = check.required("nombre", &row.nombre)?;
                    if !seen.insert(id) {
                        return Err(check.fail("id", format!("{id} duplicates an earlier row")));
                    }
                    Ok(Zone::new(ZoneId::new(id), name))
                });
            match parsed {
                Ok(zone) => zones.push(zone),
                Err(e) => self.reject(e, rejected)?,
            }
        }
        Ok(zones)
    }

    fn read_restaurants(
        &self,
        input: impl Read,
        rejected: &mut Vec<MalformedInputError>,
    ) -> Result<Vec<Restaurant>> {
        let mut seen = HashSet::new();
        let mut seen_names = HashSet::new();
        let mut restaurants = Vec::new();
        for (index, record) in reader(input).deserialize::<RestaurantRow>().enumerate() {
            let check = RowCheck {
                table: InputTable::Restaurants,
                row: index + 1,
            };
            let parsed = record
                .map_err(|e| check.fail("record", e.to_string()))
                .and_then(|row| {
                    let id = check.id(&row.id)?;
                    let name = check.required("nombre", &row.nombre)?;
                    let category: Category = check
                        .required("categoria", &row.categoria)?
                        .parse()
                        .map_err(|e: crate::domain::UnknownCategory| {
                            check.fail("categoria", e.to_string())
                        })?;
                    let raw_rating = check.required("rating", &row.rating)?;
                    let rating: f64 = raw_rating.parse().map_err(|_| {
                        check.fail("rating", format!("'{raw_rating}' is not a number"))
                    })?;
                    if !(0.0..=5.0).contains(&rating) {
                        return Err(check.fail("rating", format!("{rating} is outside 0.0-5.0")));
                    }
                    let amounts = parse_sales(check.required("ventas", &row.ventas)?)
                        .map_err(|reason| check.fail("ventas", reason))?;
                    let sales = MonthlySales::new(&amounts)
                        .map_err(|e| check.fail("ventas", e.to_string()))?;
                    if !seen.insert(id) {
                        return Err(check.fail("id", format!("{id} duplicates an earlier row")));
                    }
                    // Sales facts are partitioned by name.
                    if !seen_names.insert(name.to_string()) {
                        return Err(check.fail(
                            "nombre",
                            format!("'{name}' duplicates an earlier restaurant"),
                        ));
                    }
                    Ok(Restaurant {
                        id: RestaurantId::new(id),
                        name: name.to_string(),
                        category,
                        rating,
                        zone: None,
                        followers: Vec::new(),
                        sales,
                    })
                });
            match parsed {
                Ok(restaurant) => restaurants.push(restaurant),
                Err(e) => self.reject(e, rejected)?,
            }
        }
        Ok(restaurants)
    }

    fn read_users(
        &self,
        input: impl Read,
        zones: &HashMap<String, ZoneId>,
        rejected: &mut Vec<MalformedInputError>,
    ) -> Result<Vec<User>> {
        let mut seen_ids = HashSet::new();
        let mut seen_emails = HashSet::new();
        let mut users = Vec::new();
        for (index, record) in reader(input).deserialize::<UserRow>().enumerate() {
            let check = RowCheck {
                table: InputTable::Users,
                row: index + 1,
            };
            let parsed = record
                .map_err(|e| check.fail("record", e.to_string()))
                .and_then(|row| {
                    let id = check.id(&row.id)?;
                    let name = check.required("nombre", &row.nombre)?;
                    let email = check.required("email", &row.email)?;
                    let follower_seed = match row.seguidores.as_deref().map(str::trim) {
                        None | Some("") => 0,
                        Some(raw) => raw.parse::<u32>().map_err(|_| {
                            check.fail(
                                "seguidores",
                                format!("'{raw}' is not a non-negative integer"),
                            )
                        })?,
                    };
                    if !seen_ids.insert(id) {
                        return Err(check.fail("id", format!("{id} duplicates an earlier row")));
                    }
                    if !seen_emails.insert(email.to_ascii_lowercase()) {
                        return Err(check.fail("email", format!("{email} is already taken")));
                    }
                    let mut user = User::new(UserId::new(id), name, email);
                    user.follower_seed = follower_seed;
                    user.zone = row
                        .zona
                        .as_deref()
                        .and_then(|zone| zones.get(&zone_key(zone)).copied());
                    Ok(user)
                });
            match parsed {
                Ok(user) => users.push(user),
                Err(e) => self.reject(e, rejected)?,
            }
        }
        Ok(users)
    }
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input)
}

fn zone_key(name: &str) -> String {
    normalize_city_name(name).to_lowercase()
}
