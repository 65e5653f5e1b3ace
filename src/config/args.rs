use super::default_output_path;
use super::toml_config::TomlConfig;
use crate::core::columns::{default_rules, HeaderRule};
use crate::core::coordinates::CoordinatePolicy;
use crate::core::ConfigProvider;
use crate::domain::model::{OutputFormat, RowErrorPolicy};
use crate::utils::error::Result;
use crate::utils::validation::{validate_file_extension, validate_path, Validate};
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "csv2kml")]
#[command(about = "Convert a CSV target list into a KML placemark document")]
pub struct CliConfig {
    /// CSV file whose first row holds the column headers
    pub input: PathBuf,

    /// Output file (defaults to the input name with a .kml/.kmz extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// TOML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Write a zipped KMZ archive instead of plain KML")]
    pub kmz: bool,

    #[arg(long, help = "Log and skip rows with undecodable coordinates")]
    pub skip_invalid_rows: bool,

    #[arg(long, help = "Do not negate positive decimal longitudes")]
    pub keep_positive_longitude: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(skip)]
    pub file: TomlConfig,
}

impl CliConfig {
    /// Reads the `--config` file, if one was given.
    pub fn load_settings(mut self) -> Result<Self> {
        if let Some(path) = &self.config {
            tracing::debug!("Loading settings from {}", path.display());
            self.file = TomlConfig::from_file(path)?;
        }
        Ok(self)
    }
}

impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &Path {
        &self.input
    }

    fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .or_else(|| self.file.output.path.clone())
            .unwrap_or_else(|| default_output_path(&self.input, self.output_format()))
    }

    fn output_format(&self) -> OutputFormat {
        if self.kmz {
            OutputFormat::Kmz
        } else {
            self.file.output.format.unwrap_or_default()
        }
    }

    fn coordinate_policy(&self) -> CoordinatePolicy {
        CoordinatePolicy {
            western_hemisphere: !self.keep_positive_longitude
                && self.file.coordinates.western_hemisphere.unwrap_or(true),
        }
    }

    fn header_rules(&self) -> Vec<HeaderRule> {
        let mut rules = default_rules();
        rules.extend(self.file.headers.rules());
        rules
    }

    fn row_error_policy(&self) -> RowErrorPolicy {
        if self.skip_invalid_rows {
            RowErrorPolicy::Skip
        } else {
            self.file.error_handling.on_row_error.unwrap_or_default()
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        if let Some(config) = &self.config {
            validate_path("config", config)?;
        }
        self.file.validate()?;

        // Checked on the merged view: `--kmz` may meet a `.kml` path from the file.
        let output = self.output_path();
        validate_path("output", &output)?;
        validate_file_extension("output", &output, &[self.output_format().extension()])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::columns::HeaderRule;
    use crate::domain::model::ColumnRole;
    use crate::utils::error::EtlError;

    fn parse(args: &[&str]) -> CliConfig {
        CliConfig::try_parse_from(std::iter::once("csv2kml").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["data/targets.csv"]);
        assert_eq!(config.output_path(), PathBuf::from("data/targets.kml"));
        assert_eq!(config.output_format(), OutputFormat::Kml);
        assert!(config.coordinate_policy().western_hemisphere);
        assert_eq!(config.row_error_policy(), RowErrorPolicy::Abort);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_input_is_usage_error() {
        assert!(CliConfig::try_parse_from(["csv2kml"]).is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let mut config = parse(&[
            "targets.csv",
            "--kmz",
            "--skip-invalid-rows",
            "--keep-positive-longitude",
        ]);
        config.file = TomlConfig::from_toml_str(
            "[coordinates]\nwestern_hemisphere = true\n[error_handling]\non_row_error = \"abort\"\n",
        )
        .unwrap();

        assert_eq!(config.output_path(), PathBuf::from("targets.kmz"));
        assert_eq!(config.row_error_policy(), RowErrorPolicy::Skip);
        assert!(!config.coordinate_policy().western_hemisphere);
    }

    #[test]
    fn test_file_settings_apply() {
        let mut config = parse(&["targets.csv"]);
        config.file = TomlConfig::from_toml_str(
            "[headers]\nstate = [\"Province\"]\n[output]\npath = \"out/all.kml\"\n",
        )
        .unwrap();

        assert_eq!(config.output_path(), PathBuf::from("out/all.kml"));
        let rules = config.header_rules();
        assert_eq!(
            rules.last(),
            Some(&HeaderRule::exact("province", ColumnRole::State))
        );
    }

    #[test]
    fn test_output_extension_must_match_format() {
        let config = parse(&["targets.csv", "-o", "targets.kml", "--kmz"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_kmz_flag_checked_against_file_output_path() {
        let mut config = parse(&["targets.csv", "--kmz"]);
        config.file = TomlConfig::from_toml_str("[output]\npath = \"out.kml\"\n").unwrap();
        assert_eq!(config.output_format(), OutputFormat::Kmz);
        assert!(matches!(
            config.validate(),
            Err(EtlError::InvalidConfigValueError { .. })
        ));

        config.file = TomlConfig::from_toml_str("[output]\npath = \"out.kmz\"\n").unwrap();
        assert!(config.validate().is_ok());
    }
}
