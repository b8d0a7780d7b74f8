//! Command-line interface definitions.
//!
//! Defines the CLI structure for the polystore application using `clap`.
//! Subcommands check the input data, answer one report, run a full
//! drop/reload cycle, and inspect configuration.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::port::inbound::{FollowerOrder, Intent, SalesQuery, ZoneScope};

/// Project a restaurant dataset into graph, document and wide-column stores
#[derive(Parser, Debug)]
#[command(name = "polystore")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands for the polystore CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest the input files, generate relationships, verify invariants
    Check,

    /// Load every store and answer one report
    Report(ReportArgs),

    /// Load, query, drop, reload and query again; fail if the answers differ
    Cycle,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Subcommands for `polystore config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration with defaults applied.
    Show,
    /// Validate the configuration file for correctness.
    Validate,
}

/// Arguments for `polystore report`.
#[derive(Args, Debug)]
pub struct ReportArgs {
    #[command(subcommand)]
    pub intent: IntentCommand,
}

/// The report to produce.
#[derive(Subcommand, Debug)]
pub enum IntentCommand {
    /// Top 3 restaurants by follower count
    Followers {
        #[arg(long, value_enum, default_value = "desc")]
        order: OrderArg,
    },
    /// Restaurants located in a city
    City {
        /// City name; accents and case are ignored
        name: String,
    },
    /// Top 3 restaurants by rating inside each zone
    Zones {
        /// Only the named zone
        #[arg(long, conflicts_with_all = ["all", "first"])]
        zone: Option<String>,
        /// Every zone
        #[arg(long, conflicts_with = "first")]
        all: bool,
        /// The first N zones by id
        #[arg(long)]
        first: Option<usize>,
    },
    /// Top 3 restaurants of a category by rating
    Category {
        /// sushi, italiana, francesa, mexicana or china
        name: String,
    },
    /// Monthly sales
    #[command(subcommand)]
    Sales(SalesCommand),
}

#[derive(Subcommand, Debug)]
pub enum SalesCommand {
    /// Sales for the current month
    Current {
        /// Only the three highest amounts
        #[arg(long)]
        top: bool,
    },
    /// Every sales fact
    All,
    /// One month, by Spanish or English name or number
    Month { month: String },
    /// One restaurant, optionally narrowed to a month
    Restaurant {
        name: String,
        #[arg(long)]
        month: Option<String>,
    },
    /// Facts whose amount lies between MIN and MAX inclusive
    Range { min: i64, max: i64 },
}

/// Follower ranking direction.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OrderArg {
    /// Fewest followers first
    Asc,
    /// Most followers first
    Desc,
}

impl From<OrderArg> for FollowerOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Asc => Self::Ascending,
            OrderArg::Desc => Self::Descending,
        }
    }
}

impl IntentCommand {
    /// The query intent this command asks for.
    #[must_use]
    pub fn to_intent(&self) -> Intent {
        match self {
            Self::Followers { order } => Intent::TopByFollowers {
                order: (*order).into(),
            },
            Self::City { name } => Intent::RestaurantsInCity { city: name.clone() },
            Self::Zones { zone, all, first } => {
                let scope = match (zone, first) {
                    (Some(name), _) => ZoneScope::Named(name.clone()),
                    (None, _) if *all => ZoneScope::All,
                    (None, Some(n)) => ZoneScope::First(*n),
                    (None, None) => ZoneScope::default(),
                };
                Intent::TopByZone { scope }
            }
            Self::Category { name } => Intent::TopByCategory {
                category: name.clone(),
            },
            Self::Sales(sales) => Intent::Sales {
                query: sales.to_query(),
            },
        }
    }
}

impl SalesCommand {
    #[must_use]
    pub fn to_query(&self) -> SalesQuery {
        match self {
            Self::Current { top: false } => SalesQuery::CurrentMonth,
            Self::Current { top: true } => SalesQuery::CurrentMonthTop,
            Self::All => SalesQuery::All,
            Self::Month { month } => SalesQuery::ByMonth {
                month: month.clone(),
            },
            Self::Restaurant { name, month: None } => SalesQuery::ByRestaurant {
                restaurant: name.clone(),
            },
            Self::Restaurant {
                name,
                month: Some(month),
            } => SalesQuery::ByRestaurantAndMonth {
                restaurant: name.clone(),
                month: month.clone(),
            },
            Self::Range { min, max } => SalesQuery::InRange {
                min: *min,
                max: *max,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(args: &[&str]) -> Intent {
        let cli = Cli::parse_from(args);
        match cli.command {
            Commands::Report(report) => report.intent.to_intent(),
            other => panic!("expected report, got {other:?}"),
        }
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from(["polystore", "check", "--json", "-c", "other.toml"]);
        assert!(cli.json);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(matches!(cli.command, Commands::Check));
    }

    #[test]
    fn config_defaults_to_local_file() {
        let cli = Cli::parse_from(["polystore", "cycle"]);
        assert_eq!(cli.config, PathBuf::from("config.toml"));
    }

    #[test]
    fn followers_default_to_descending() {
        assert_eq!(
            intent(&["polystore", "report", "followers"]),
            Intent::TopByFollowers {
                order: FollowerOrder::Descending
            }
        );
        assert_eq!(
            intent(&["polystore", "report", "followers", "--order", "asc"]),
            Intent::TopByFollowers {
                order: FollowerOrder::Ascending
            }
        );
    }

    #[test]
    fn zone_scopes() {
        let scope = |args: &[&str]| match intent(args) {
            Intent::TopByZone { scope } => scope,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(
            scope(&["polystore", "report", "zones"]),
            ZoneScope::First(5)
        );
        assert_eq!(
            scope(&["polystore", "report", "zones", "--all"]),
            ZoneScope::All
        );
        assert_eq!(
            scope(&["polystore", "report", "zones", "--first", "2"]),
            ZoneScope::First(2)
        );
        assert_eq!(
            scope(&["polystore", "report", "zones", "--zone", "Cancún"]),
            ZoneScope::Named("Cancún".into())
        );
    }

    #[test]
    fn conflicting_zone_scopes_are_rejected() {
        let parsed =
            Cli::try_parse_from(["polystore", "report", "zones", "--all", "--first", "2"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn sales_subcommands() {
        assert_eq!(
            intent(&["polystore", "report", "sales", "current", "--top"]),
            Intent::Sales {
                query: SalesQuery::CurrentMonthTop
            }
        );
        assert_eq!(
            intent(&["polystore", "report", "sales", "restaurant", "Sakura", "--month", "3"]),
            Intent::Sales {
                query: SalesQuery::ByRestaurantAndMonth {
                    restaurant: "Sakura".into(),
                    month: "3".into()
                }
            }
        );
        assert_eq!(
            intent(&["polystore", "report", "sales", "range", "100", "300"]),
            Intent::Sales {
                query: SalesQuery::InRange { min: 100, max: 300 }
            }
        );
    }
}
