//! Handler for the `config` command group.

use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::config::Config;

/// Things that are legal but probably not intended.
fn warnings(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();
    for path in [
        &config.data.users,
        &config.data.restaurants,
        &config.data.zones,
    ] {
        if !path.exists() {
            warnings.push(format!("input file {} does not exist", path.display()));
        }
    }
    if config.generation.seed.is_none() {
        warnings.push("no generation seed: relationships differ on every run".to_string());
    }
    warnings
}

/// Execute `config show`.
pub fn execute_show(path: &Path) -> Result<()> {
    let config = Config::load(path)?;

    if output::is_json() {
        output::json_line("config", serde_json::to_value(&config)?);
        return Ok(());
    }

    output::section("Effective Configuration");
    output::field("Path", path.display());

    output::section("Data");
    output::field("Users", config.data.users.display());
    output::field("Restaurants", config.data.restaurants.display());
    output::field("Zones", config.data.zones.display());

    output::section("Generation");
    match config.generation.seed {
        Some(seed) => output::field("Seed", seed),
        None => output::field("Seed", "(entropy)"),
    }

    output::section("Stores");
    output::field("Ingest policy", format!("{:?}", config.ingest.policy).to_lowercase());
    output::field("Load mode", config.load.mode);
    output::field("Keyspace", &config.column.keyspace);
    output::field("Replication", config.column.replication_factor);
    output::field("Database", &config.document.database);

    output::section("Logging");
    output::field("Level", &config.logging.level);
    output::field("Format", &config.logging.format);

    Ok(())
}

/// Execute `config validate`.
pub fn execute_validate(path: &Path) -> Result<()> {
    let config = Config::load(path)?;
    let warnings = warnings(&config);

    if output::is_json() {
        output::json_line(
            "config_validation",
            json!({
                "path": path.display().to_string(),
                "valid": true,
                "warnings": warnings,
            }),
        );
        return Ok(());
    }

    output::section("Config Validation");
    output::field("Path", path.display());
    output::success("Config file is valid");

    if !warnings.is_empty() {
        output::section("Warnings");
        for warning in &warnings {
            output::warning(warning);
        }
    }

    output::field(
        "Next",
        format!("polystore check -c {}", path.display()),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_inputs_and_seed_are_flagged() {
        let mut config = Config::default();
        config.data.users = "/nonexistent/usuarios.csv".into();
        let found = warnings(&config);
        assert!(found.iter().any(|w| w.contains("/nonexistent/usuarios.csv")));
        assert!(found.iter().any(|w| w.contains("seed")));
    }

    #[test]
    fn seeded_config_with_real_files_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        for (slot, name) in [
            (&mut config.data.users, "u.csv"),
            (&mut config.data.restaurants, "r.csv"),
            (&mut config.data.zones, "z.csv"),
        ] {
            let path = dir.path().join(name);
            std::fs::write(&path, "id\n").unwrap();
            *slot = path;
        }
        config.generation.seed = Some(1);
        assert!(warnings(&config).is_empty());
    }
}
