use crate::core::columns::HeaderRule;
use crate::domain::model::{ColumnRole, OutputFormat, RowErrorPolicy};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_file_extension, validate_non_empty_string, validate_path, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Optional settings file. Every section may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TomlConfig {
    pub headers: HeaderAliases,
    pub coordinates: CoordinatesConfig,
    pub output: OutputConfig,
    pub error_handling: ErrorHandlingConfig,
}

/// Extra header names, matched exactly (case-insensitive) after the built-in rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeaderAliases {
    pub identifier: Vec<String>,
    pub state: Vec<String>,
    pub description: Vec<String>,
    pub instructions: Vec<String>,
    pub start_longitude: Vec<String>,
    pub start_latitude: Vec<String>,
    pub stop_longitude: Vec<String>,
    pub stop_latitude: Vec<String>,
}

impl HeaderAliases {
    fn aliases(&self, role: ColumnRole) -> &[String] {
        match role {
            ColumnRole::Identifier => &self.identifier,
            ColumnRole::State => &self.state,
            ColumnRole::Description => &self.description,
            ColumnRole::Instructions => &self.instructions,
            ColumnRole::StartLongitude => &self.start_longitude,
            ColumnRole::StartLatitude => &self.start_latitude,
            ColumnRole::StopLongitude => &self.stop_longitude,
            ColumnRole::StopLatitude => &self.stop_latitude,
        }
    }

    pub fn rules(&self) -> Vec<HeaderRule> {
        ColumnRole::ALL
            .iter()
            .flat_map(|role| {
                self.aliases(*role)
                    .iter()
                    .map(move |alias| HeaderRule::exact(alias, *role))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoordinatesConfig {
    pub western_hemisphere: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: Option<OutputFormat>,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ErrorHandlingConfig {
    pub on_row_error: Option<RowErrorPolicy>,
}

impl TomlConfig {
    /// Loads and parses a settings file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        for role in ColumnRole::ALL {
            for alias in self.headers.aliases(role) {
                validate_non_empty_string(&format!("headers.{}", role.label()), alias)?;
            }
        }

        if let Some(path) = &self.output.path {
            validate_path("output.path", path)?;
            // Without an explicit format the CLI decides; the merged check covers it.
            if let Some(format) = self.output.format {
                validate_file_extension("output.path", path, &[format.extension()])?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[headers]
identifier = ["Target"]
start_longitude = ["lon", "x"]

[coordinates]
western_hemisphere = false

[output]
format = "kmz"
path = "out/targets.kmz"

[error_handling]
on_row_error = "skip"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.coordinates.western_hemisphere, Some(false));
        assert_eq!(config.output.format, Some(OutputFormat::Kmz));
        assert_eq!(config.error_handling.on_row_error, Some(RowErrorPolicy::Skip));
        assert!(config.validate().is_ok());

        let rules = config.headers.rules();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0], HeaderRule::exact("target", ColumnRole::Identifier));
        assert_eq!(rules[2].role, ColumnRole::StartLongitude);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
        assert!(config.headers.rules().is_empty());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = TomlConfig::from_toml_str("[output]\ncompression = true\n").unwrap_err();
        assert!(matches!(err, EtlError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CSV2KML_TEST_OUTPUT", "exports/today.kml");

        let toml_content = r#"
[output]
path = "${CSV2KML_TEST_OUTPUT}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.output.path, Some(PathBuf::from("exports/today.kml")));

        std::env::remove_var("CSV2KML_TEST_OUTPUT");
    }

    #[test]
    fn test_config_validation() {
        let config = TomlConfig::from_toml_str("[headers]\nstate = [\" \"]\n").unwrap();
        assert!(config.validate().is_err());

        let config =
            TomlConfig::from_toml_str("[output]\nformat = \"kml\"\npath = \"targets.kmz\"\n")
                .unwrap();
        assert!(config.validate().is_err());

        // No format in the file: the extension is checked once the CLI flags are merged.
        let config = TomlConfig::from_toml_str("[output]\npath = \"targets.kmz\"\n").unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[headers]\nstate = [\"province\"]\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.headers.state, vec!["province".to_string()]);
    }
}
