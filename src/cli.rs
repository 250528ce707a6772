use clap::{Args, Parser, Subcommand};
use property_valuer::features::PropertyType;
use property_valuer::location::LocationQuery;
use property_valuer::LogFormat;
use std::path::PathBuf;

/// Address used when no location is given on the command line
pub const DEFAULT_ADDRESS: &str = "173 Carmelite Road, Harrow";

#[derive(Parser, Debug)]
#[command(name = "valuer", version, about = "Property price estimates with per-feature explanations")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the valuation API server (default)
    Start,

    /// Estimate a single property and print the explanation
    Estimate(EstimateArgs),

    /// List the curated neighborhoods
    Neighborhoods,

    /// Validate configuration and try loading the price model
    Test,

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Validate configuration file
    Validate,
}

#[derive(Args, Debug, Clone)]
pub struct EstimateArgs {
    /// Free-text address, looked up with the geocoder
    #[arg(long, conflicts_with_all = ["neighborhood", "latitude"])]
    pub address: Option<String>,

    /// One of the curated neighborhoods
    #[arg(long, conflicts_with = "latitude")]
    pub neighborhood: Option<String>,

    /// Manual latitude (requires --longitude)
    #[arg(long, requires = "longitude", allow_hyphen_values = true)]
    pub latitude: Option<f64>,

    /// Manual longitude (requires --latitude)
    #[arg(long, requires = "latitude", allow_hyphen_values = true)]
    pub longitude: Option<f64>,

    #[arg(long, default_value_t = 3)]
    pub bedrooms: u32,

    #[arg(long, default_value_t = 1)]
    pub bathrooms: u32,

    /// Floor area in square feet
    #[arg(long, default_value_t = 900.0)]
    pub size_sq_ft: f64,

    /// unknown, flat, detached or terraced
    #[arg(long, default_value = "unknown")]
    pub property_type: PropertyType,

    /// Print the estimate view as JSON instead of a chart
    #[arg(long)]
    pub json: bool,
}

impl EstimateArgs {
    /// Location mode implied by the flags; the default address when none is given
    pub fn location_query(&self) -> LocationQuery {
        if let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) {
            return LocationQuery::Manual {
                latitude,
                longitude,
            };
        }
        if let Some(name) = &self.neighborhood {
            return LocationQuery::Neighborhood { name: name.clone() };
        }
        LocationQuery::Address {
            query: self
                .address
                .clone()
                .unwrap_or_else(|| DEFAULT_ADDRESS.to_string()),
        }
    }
}

impl Cli {
    /// Get the command to execute, defaulting to Start if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimate_args(args: &[&str]) -> EstimateArgs {
        let mut argv = vec!["valuer", "estimate"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().get_command() {
            Commands::Estimate(args) => args,
            _ => panic!("Expected Estimate command"),
        }
    }

    #[test]
    fn test_default_command_is_start() {
        let cli = Cli::try_parse_from(["valuer"]).unwrap();
        assert!(matches!(cli.get_command(), Commands::Start));
        assert_eq!(cli.config, PathBuf::from("config.toml"));
        assert_eq!(cli.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["valuer", "test", "--config", "custom.toml", "--log-format", "json"])
            .unwrap();
        assert!(matches!(cli.get_command(), Commands::Test));
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_estimate_defaults() {
        let args = estimate_args(&[]);
        assert_eq!(args.bedrooms, 3);
        assert_eq!(args.bathrooms, 1);
        assert_eq!(args.size_sq_ft, 900.0);
        assert_eq!(args.property_type, PropertyType::Unknown);
        assert!(!args.json);
        assert_eq!(
            args.location_query(),
            LocationQuery::Address {
                query: DEFAULT_ADDRESS.to_string()
            }
        );
    }

    #[test]
    fn test_estimate_location_modes() {
        let args = estimate_args(&["--neighborhood", "Camden", "--property-type", "flat"]);
        assert_eq!(args.property_type, PropertyType::Flat);
        assert_eq!(
            args.location_query(),
            LocationQuery::Neighborhood {
                name: "Camden".to_string()
            }
        );

        let args = estimate_args(&["--latitude", "51.5", "--longitude", "-0.12", "--json"]);
        assert!(args.json);
        assert_eq!(
            args.location_query(),
            LocationQuery::Manual {
                latitude: 51.5,
                longitude: -0.12
            }
        );
    }

    #[test]
    fn test_estimate_rejects_conflicting_locations() {
        let result = Cli::try_parse_from([
            "valuer",
            "estimate",
            "--address",
            "HA3 5NE",
            "--neighborhood",
            "Harrow",
        ]);
        assert!(result.is_err());

        let result = Cli::try_parse_from(["valuer", "estimate", "--latitude", "51.5"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parsing_config_show() {
        let cli = Cli::try_parse_from(["valuer", "config", "show"]).unwrap();
        match cli.get_command() {
            Commands::Config { action } => assert!(matches!(action, ConfigCommands::Show)),
            _ => panic!("Expected Config command"),
        }
    }
}
