use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, VersionBumperError};
use crate::factory::csharp::ProjectOptions;

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "versionbumper.toml";

/// Represents the complete configuration for version-bumper.
///
/// Contains scanning rules, project parsing settings and bump behavior.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub projects: ProjectsConfig,

    #[serde(default)]
    pub bump: BumpConfig,
}

fn default_project_extensions() -> Vec<String> {
    vec!["csproj".to_string()]
}

fn default_solution_extensions() -> Vec<String> {
    vec!["sln".to_string()]
}

/// Which files and directories the scan considers.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScanConfig {
    #[serde(default = "default_project_extensions")]
    pub project_extensions: Vec<String>,

    #[serde(default = "default_solution_extensions")]
    pub solution_extensions: Vec<String>,

    /// Path prefixes, relative to the scan root, pruned after scanning
    #[serde(default)]
    pub excluded_directories: Vec<String>,

    /// Directory names the walk never descends into
    #[serde(default)]
    pub skipped_directory_names: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            project_extensions: default_project_extensions(),
            solution_extensions: default_solution_extensions(),
            excluded_directories: Vec::new(),
            skipped_directory_names: Vec::new(),
        }
    }
}

fn default_version_property() -> String {
    ProjectOptions::default().version_property
}

fn default_description_property() -> String {
    ProjectOptions::default().description_property
}

fn default_test_frameworks() -> Vec<String> {
    ProjectOptions::default().test_frameworks
}

/// How project files are interpreted.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProjectsConfig {
    #[serde(default = "default_version_property")]
    pub version_property: String,

    #[serde(default = "default_description_property")]
    pub description_property: String,

    #[serde(default = "default_test_frameworks")]
    pub test_frameworks: Vec<String>,
}

impl Default for ProjectsConfig {
    fn default() -> Self {
        ProjectsConfig {
            version_property: default_version_property(),
            description_property: default_description_property(),
            test_frameworks: default_test_frameworks(),
        }
    }
}

impl ProjectsConfig {
    pub fn to_options(&self) -> ProjectOptions {
        ProjectOptions {
            version_property: self.version_property.clone(),
            description_property: self.description_property.clone(),
            test_frameworks: self.test_frameworks.clone(),
        }
    }
}

fn default_interactive() -> bool {
    true
}

/// Bump behavior.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BumpConfig {
    /// Prompt for a choice when a pattern matches several components
    #[serde(default = "default_interactive")]
    pub interactive: bool,
}

impl Default for BumpConfig {
    fn default() -> Self {
        BumpConfig {
            interactive: default_interactive(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `versionbumper.toml` in current directory
/// 3. `~/.config/.versionbumper.toml` in user config directory
/// 4. Default configuration if no file found
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if local.exists() {
        fs::read_to_string(local)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(format!(".{}", CONFIG_FILE_NAME));
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Reject settings that would make every scan come back empty
    pub fn validate(&self) -> Result<()> {
        if self.scan.project_extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(VersionBumperError::config(
                "[scan] project_extensions must name at least one extension",
            ));
        }
        if self.projects.version_property.trim().is_empty() {
            return Err(VersionBumperError::config(
                "[projects] version_property must not be empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.scan.project_extensions, vec!["csproj".to_string()]);
        assert_eq!(config.scan.solution_extensions, vec!["sln".to_string()]);
        assert!(config.scan.excluded_directories.is_empty());
        assert_eq!(config.projects.version_property, "ApplicationVersion");
        assert!(config
            .projects
            .test_frameworks
            .contains(&"nunit.framework".to_string()));
        assert!(config.bump.interactive);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
[scan]
excluded_directories = ["legacy"]

[bump]
interactive = false
"#,
        )
        .unwrap();
        assert_eq!(config.scan.excluded_directories, vec!["legacy".to_string()]);
        assert_eq!(config.scan.project_extensions, vec!["csproj".to_string()]);
        assert!(!config.bump.interactive);
        assert_eq!(config.projects, ProjectsConfig::default());
    }

    #[test]
    fn test_to_options() {
        let projects = ProjectsConfig {
            version_property: "Version".to_string(),
            ..ProjectsConfig::default()
        };
        assert_eq!(projects.to_options().version_property, "Version");
    }

    #[test]
    fn test_validate_rejects_empty_extensions() {
        let mut config = Config::default();
        config.scan.project_extensions = vec![" ".to_string()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().starts_with("Configuration error"));
        assert!(Config::default().validate().is_ok());
    }
}
