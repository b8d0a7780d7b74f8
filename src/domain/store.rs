use std::fmt;

use serde::{Deserialize, Serialize};

/// The three persistence engines the dataset is projected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Graph,
    Document,
    Column,
}

impl StoreKind {
    pub const ALL: [Self; 3] = [Self::Graph, Self::Document, Self::Column];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Graph => "graph",
            Self::Document => "document",
            Self::Column => "column",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
