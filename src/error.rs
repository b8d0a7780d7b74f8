use thiserror::Error;

use crate::domain::{RestaurantId, StoreKind};

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Which input table a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTable {
    Users,
    Restaurants,
    Zones,
}

impl std::fmt::Display for InputTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Users => "users",
            Self::Restaurants => "restaurants",
            Self::Zones => "zones",
        };
        f.write_str(name)
    }
}

/// A row of tabular input that could not be turned into a canonical entity.
///
/// `row` is the 1-based data row (the header line is not counted).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("malformed {table} row {row}: field `{field}` {reason}")]
pub struct MalformedInputError {
    pub table: InputTable,
    pub row: usize,
    pub field: &'static str,
    pub reason: String,
}

impl MalformedInputError {
    pub fn new(
        table: InputTable,
        row: usize,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            table,
            row,
            field,
            reason: reason.into(),
        }
    }
}

/// Relationship generation or projection cannot satisfy its bounds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InsufficientDataError {
    #[error("no zones loaded; cannot assign {0} to a zone")]
    NoZones(&'static str),

    #[error("restaurant {0} has no zone assigned")]
    UnassignedZone(RestaurantId),
}

/// Store-level failures. The core never retries these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{store} store unavailable: {reason}")]
    Unavailable { store: StoreKind, reason: String },

    #[error("{store} store rejected a write to {table}: {reason}")]
    PartialWrite {
        store: StoreKind,
        table: String,
        reason: String,
    },

    #[error("{store} store already holds data; drop it before loading again")]
    NonEmpty { store: StoreKind },
}

impl StoreError {
    pub fn unavailable(store: StoreKind, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            store,
            reason: reason.into(),
        }
    }

    /// The store this failure belongs to.
    #[must_use]
    pub fn store(&self) -> StoreKind {
        match self {
            Self::Unavailable { store, .. }
            | Self::PartialWrite { store, .. }
            | Self::NonEmpty { store } => *store,
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    MalformedInput(#[from] MalformedInputError),

    #[error(transparent)]
    InsufficientData(#[from] InsufficientDataError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
