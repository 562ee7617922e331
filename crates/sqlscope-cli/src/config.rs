//! Configuration file handling

use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};

use crate::args::OutputFormat;

pub const CONFIG_FILE_NAME: &str = "sqlscope.toml";

/// Configuration for sqlscope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Engine name (e.g. "mysql", "postgres")
    #[serde(default)]
    pub engine: Option<String>,

    /// Database used for unqualified table names
    #[serde(default)]
    pub database: Option<String>,

    /// Schema used for unqualified table names
    #[serde(default)]
    pub schema: Option<String>,

    /// Output format (human, json)
    #[serde(default)]
    pub format: Option<OutputFormat>,

    /// SQL file paths or patterns
    #[serde(default)]
    pub files: Vec<String>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).into_diagnostic()?;
        let config: Config = toml::from_str(&contents).into_diagnostic()?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Try to find and load sqlscope.toml in current directory or parent directories
    pub fn find_and_load() -> Result<Option<Self>> {
        let current_dir = std::env::current_dir().into_diagnostic()?;
        match Self::find_from(&current_dir) {
            Some(path) => Ok(Some(Self::from_file(&path)?)),
            None => Ok(None),
        }
    }

    fn find_from(start: &Path) -> Option<PathBuf> {
        let mut dir = start.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Some(config_path);
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    /// Merge CLI arguments into configuration
    /// CLI arguments take precedence over config file values
    pub fn merge_with_args(
        mut self,
        files: &[PathBuf],
        engine: &Option<String>,
        database: &Option<String>,
        schema: &Option<String>,
        format: &Option<OutputFormat>,
    ) -> Self {
        if !files.is_empty() {
            self.files = files.iter().map(|p| p.display().to_string()).collect();
        }

        if engine.is_some() {
            self.engine = engine.clone();
        }

        if database.is_some() {
            self.database = database.clone();
        }

        if schema.is_some() {
            self.schema = schema.clone();
        }

        if format.is_some() {
            self.format = *format;
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            engine = "postgres"
            database = "crm"
            schema = "sales"
            format = "json"
            files = ["queries/*.sql", "report.sql"]
            "#,
        )
        .unwrap();

        assert_eq!(config.engine.as_deref(), Some("postgres"));
        assert_eq!(config.database.as_deref(), Some("crm"));
        assert_eq!(config.schema.as_deref(), Some("sales"));
        assert_eq!(config.format, Some(OutputFormat::Json));
        assert_eq!(config.files, vec!["queries/*.sql", "report.sql"]);
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let result: Result<Config, _> = toml::from_str(r#"format = "sarif""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_args_override_config() {
        let config = Config {
            engine: Some("mysql".to_string()),
            database: Some("shop".to_string()),
            schema: None,
            format: Some(OutputFormat::Json),
            files: vec!["a.sql".to_string()],
        };

        let merged = config.merge_with_args(
            &[PathBuf::from("b.sql")],
            &Some("mariadb".to_string()),
            &None,
            &Some("public".to_string()),
            &None,
        );

        assert_eq!(merged.engine.as_deref(), Some("mariadb"));
        assert_eq!(merged.database.as_deref(), Some("shop"));
        assert_eq!(merged.schema.as_deref(), Some("public"));
        assert_eq!(merged.format, Some(OutputFormat::Json));
        assert_eq!(merged.files, vec!["b.sql"]);
    }

    #[test]
    fn test_find_config_in_parent_directory() {
        let root = std::env::temp_dir().join(format!("sqlscope-config-{}", std::process::id()));
        let nested = root.join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join(CONFIG_FILE_NAME), "engine = \"mysql\"\n").unwrap();

        let found = Config::find_from(&nested);
        assert_eq!(found, Some(root.join(CONFIG_FILE_NAME)));

        let config = Config::from_file(&root.join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config.engine.as_deref(), Some("mysql"));

        std::fs::remove_dir_all(&root).unwrap();
    }
}
