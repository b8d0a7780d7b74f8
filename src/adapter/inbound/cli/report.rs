//! Handler for `polystore report`.

use serde_json::json;
use tabled::Tabled;

use crate::adapter::inbound::cli::output;
use crate::application::{CommandOutcome, LoadSummary};
use crate::domain::QueryOutcome;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::Config;
use crate::port::inbound::{Command, Intent};

#[derive(Tabled)]
struct ReportLine {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

/// Print a query outcome as a table, a not-found warning, or one JSON line.
pub fn render(outcome: &QueryOutcome) -> Result<()> {
    if output::is_json() {
        output::json_line("report", serde_json::to_value(outcome)?);
        return Ok(());
    }

    match outcome {
        QueryOutcome::NotFound(missing) => output::warning(&missing.to_string()),
        QueryOutcome::Found(report) => {
            output::section(&report.title);
            if report.is_empty() {
                output::note("(no rows)");
                return Ok(());
            }
            output::table(report.rows.iter().enumerate().map(|(i, row)| ReportLine {
                rank: i + 1,
                name: row.entity_name.clone(),
                value: row.metric.to_string(),
                detail: row
                    .secondary_metric
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            }));
        }
    }
    Ok(())
}

/// Print per-store load results. Failures are warnings here; the caller
/// decides whether one matters.
pub fn render_summary(action: &str, summary: &LoadSummary) {
    if output::is_json() {
        let stores: Vec<_> = summary
            .outcomes
            .iter()
            .map(|o| match &o.result {
                Ok(count) => json!({ "store": o.store, "ok": true, "count": count }),
                Err(e) => json!({ "store": o.store, "ok": false, "error": e.to_string() }),
            })
            .collect();
        output::json_line("summary", json!({ "action": action, "stores": stores }));
        return;
    }

    for outcome in &summary.outcomes {
        match &outcome.result {
            Ok(count) => output::field(outcome.store.as_str(), format!("{action} ({count})")),
            Err(e) => output::warning(&format!("{}: {action} failed: {e}", outcome.store)),
        }
    }
}

/// Print whatever a command produced.
pub fn render_command(outcome: &CommandOutcome) -> Result<()> {
    match outcome {
        CommandOutcome::Summary(summary) => {
            render_summary("done", summary);
            Ok(())
        }
        CommandOutcome::Query(query) => render(query),
    }
}

/// Load every store, then answer `intent`.
///
/// Fails (returns `Ok(false)`) only when the store that owns the intent
/// could not be loaded; the other stores' failures are shown as warnings.
pub async fn execute(config: &Config, intent: &Intent) -> Result<bool> {
    let prepared = bootstrap::prepare_model(config)?;
    let service = bootstrap::build_default_service(config);

    let summary = service.lifecycle().load_everywhere(&prepared.model).await;
    output::section("Load");
    render_summary("loaded", &summary);

    let owner = intent.store();
    if let Some(failed) = summary.failures().find(|o| o.store == owner) {
        if let Err(e) = &failed.result {
            output::error(&format!("cannot answer {intent}: {owner} store failed: {e}"));
        }
        return Ok(false);
    }

    let outcome = service
        .execute(&Command::Query(intent.clone()), &prepared.model)
        .await?;
    render_command(&outcome)?;
    Ok(true)
}
