//! Handler for `polystore check`.

use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::bootstrap::{self, PreparedModel};
use crate::infrastructure::config::Config;

/// Rejected rows listed without `-v`.
const REJECTED_PREVIEW: usize = 10;

fn follow_edges(prepared: &PreparedModel) -> (usize, usize) {
    prepared.model.users().iter().fold((0, 0), |(u, r), user| {
        (
            u + user.follows_users.len(),
            r + user.follows_restaurants.len(),
        )
    })
}

/// Ingest, generate and verify. Passes when the linked model has no
/// invariant violations; rejected input rows are reported but do not fail.
pub fn execute(config: &Config) -> Result<bool> {
    let prepared = bootstrap::prepare_model(config)?;
    let model = &prepared.model;
    let violations = model.violations();
    let (user_edges, restaurant_edges) = follow_edges(&prepared);

    if output::is_json() {
        let rejected: Vec<String> = prepared.rejected.iter().map(ToString::to_string).collect();
        output::json_line(
            "check",
            json!({
                "users": model.users().len(),
                "restaurants": model.restaurants().len(),
                "zones": model.zones().len(),
                "sales_records": model.sales_records().count(),
                "seed": prepared.seed,
                "follows_users": user_edges,
                "follows_restaurants": restaurant_edges,
                "rejected": rejected,
                "violations": violations,
            }),
        );
        return Ok(violations.is_empty());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Input");
    output::field("Users", model.users().len());
    output::field("Restaurants", model.restaurants().len());
    output::field("Zones", model.zones().len());
    output::field("Sales records", model.sales_records().count());

    if !prepared.rejected.is_empty() {
        output::warning(&format!("{} rows rejected", prepared.rejected.len()));
        let shown = if output::verbosity() > 0 {
            prepared.rejected.len()
        } else {
            REJECTED_PREVIEW
        };
        for row in prepared.rejected.iter().take(shown) {
            output::note(&row.to_string());
        }
        if prepared.rejected.len() > shown {
            output::note("(rerun with -v to list every rejected row)");
        }
    }

    output::section("Relationships");
    output::field("Seed", prepared.seed);
    output::field("User follows", user_edges);
    output::field("Restaurant follows", restaurant_edges);

    if violations.is_empty() {
        output::success("All relationship invariants hold");
    } else {
        for violation in &violations {
            output::error(violation);
        }
    }
    Ok(violations.is_empty())
}
