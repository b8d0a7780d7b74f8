//! Handler for `polystore cycle`.
//!
//! Loads every store, answers a fixed battery of intents, drops everything,
//! reloads the same model and answers the battery again. The two sets of
//! answers must be identical.

use serde_json::json;

use super::report::render_summary;
use crate::adapter::inbound::cli::output;
use crate::application::{LoadSummary, Polystore};
use crate::domain::{Category, LinkedModel, QueryOutcome};
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::Config;
use crate::port::inbound::{FollowerOrder, Intent, SalesQuery, ZoneScope};

/// Every intent kind, with cities and categories drawn from the model.
fn battery(model: &LinkedModel) -> Vec<Intent> {
    let mut intents = vec![
        Intent::TopByFollowers {
            order: FollowerOrder::Descending,
        },
        Intent::TopByFollowers {
            order: FollowerOrder::Ascending,
        },
        Intent::TopByZone {
            scope: ZoneScope::All,
        },
        Intent::Sales {
            query: SalesQuery::All,
        },
        Intent::Sales {
            query: SalesQuery::CurrentMonthTop,
        },
    ];
    intents.extend(model.zones().iter().map(|z| Intent::RestaurantsInCity {
        city: z.name.clone(),
    }));
    intents.extend(Category::ALL.iter().map(|c| Intent::TopByCategory {
        category: c.as_str().to_string(),
    }));
    intents.extend(model.restaurants().iter().map(|r| Intent::Sales {
        query: SalesQuery::ByRestaurant {
            restaurant: r.name.clone(),
        },
    }));
    intents
}

async fn answer(service: &Polystore, intents: &[Intent]) -> Result<Vec<QueryOutcome>> {
    let mut answers = Vec::with_capacity(intents.len());
    for intent in intents {
        answers.push(service.queries().run(intent).await?);
    }
    Ok(answers)
}

fn step(action: &str, summary: &LoadSummary) -> bool {
    render_summary(action, summary);
    if !summary.is_success() {
        output::error(&format!("{action} failed; cycle aborted"));
    }
    summary.is_success()
}

/// Run the cycle. Passes when every step succeeds and both answer sets match.
pub async fn execute(config: &Config) -> Result<bool> {
    let prepared = bootstrap::prepare_model(config)?;
    let service = bootstrap::build_default_service(config);
    let lifecycle = service.lifecycle();
    let intents = battery(&prepared.model);

    output::section("First load");
    if !step("schema", &lifecycle.create_schemas().await)
        || !step("loaded", &lifecycle.load_everywhere(&prepared.model).await)
    {
        return Ok(false);
    }
    let before = answer(&service, &intents).await?;

    output::section("Reload");
    if !step("dropped", &lifecycle.drop_everywhere().await)
        || !step("loaded", &lifecycle.load_everywhere(&prepared.model).await)
    {
        return Ok(false);
    }
    let after = answer(&service, &intents).await?;

    let differing: Vec<String> = intents
        .iter()
        .zip(before.iter().zip(&after))
        .filter(|(_, (b, a))| b != a)
        .map(|(intent, _)| intent.to_string())
        .collect();

    if output::is_json() {
        output::json_line(
            "cycle",
            json!({
                "intents": intents.len(),
                "identical": differing.is_empty(),
                "differing": differing,
            }),
        );
        return Ok(differing.is_empty());
    }

    output::section("Comparison");
    output::field("Intents", intents.len());
    if differing.is_empty() {
        output::success("Answers are identical after drop and reload");
    } else {
        for intent in &differing {
            output::error(&format!("answer changed: {intent}"));
        }
    }
    Ok(differing.is_empty())
}
