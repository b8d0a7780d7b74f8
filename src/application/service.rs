//! Command dispatch.
//!
//! [`Polystore`] is the single entry point for every [`Command`]: lifecycle
//! commands go to the [`StoreLifecycle`], query intents to the
//! [`QueryService`].

use std::sync::Arc;

use super::lifecycle::{LoadSummary, StoreLifecycle, Stores};
use super::query::column::Clock;
use super::query::QueryService;
use crate::domain::{LinkedModel, QueryOutcome};
use crate::error::Result;
use crate::port::inbound::Command;

/// What a command produced.
#[derive(Debug)]
pub enum CommandOutcome {
    Summary(LoadSummary),
    Query(QueryOutcome),
}

pub struct Polystore {
    lifecycle: StoreLifecycle,
    queries: QueryService,
}

impl Polystore {
    #[must_use]
    pub fn new(lifecycle: StoreLifecycle, stores: &Stores, clock: Arc<dyn Clock>) -> Self {
        Self {
            lifecycle,
            queries: QueryService::new(stores, clock),
        }
    }

    #[must_use]
    pub const fn lifecycle(&self) -> &StoreLifecycle {
        &self.lifecycle
    }

    #[must_use]
    pub const fn queries(&self) -> &QueryService {
        &self.queries
    }

    /// Run one command. `model` is only read by [`Command::LoadAll`].
    pub async fn execute(
        &self,
        command: &Command,
        model: &LinkedModel,
    ) -> Result<CommandOutcome> {
        let outcome = match command {
            Command::CreateSchemas => {
                CommandOutcome::Summary(self.lifecycle.create_schemas().await)
            }
            Command::LoadAll => {
                CommandOutcome::Summary(self.lifecycle.load_everywhere(model).await)
            }
            Command::DropAll => CommandOutcome::Summary(self.lifecycle.drop_everywhere().await),
            Command::Query(intent) => CommandOutcome::Query(self.queries.run(intent).await?),
        };
        Ok(outcome)
    }
}
