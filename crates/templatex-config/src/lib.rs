//! Configuration management for templatex.
//!
//! Parses `templatex.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ## Environment Variable Expansion
//!
//! Path-valued configuration strings support shell-style expansion via
//! `shellexpand` (`~`, `$VAR`, `${VAR}`):
//!
//! - `engine.compiled_dir`
//! - `engine.temp_dir`
//! - `disks.<name>.root`
//!
//! ## Disks
//!
//! `[disks.<name>]` sections declare storage locations. Disks with
//! `driver = "local"` and a `root` contribute, in name order, to the
//! typesetting engine's search path ([`Config::local_disk_roots`]);
//! other drivers are carried for the embedding application but never
//! reach the search path.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "templatex.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Typesetting engine configuration (raw strings from TOML).
    engine: EngineConfigRaw,
    /// Storage disk declarations, keyed by disk name.
    disks: BTreeMap<String, DiskConfig>,

    /// Resolved engine configuration (set after loading).
    #[serde(skip)]
    pub engine_resolved: EngineConfig,
    /// Resolved local disk roots in name order (set after loading).
    #[serde(skip)]
    local_roots: Vec<PathBuf>,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw engine configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct EngineConfigRaw {
    binary: Option<String>,
    compiled_dir: Option<String>,
    temp_dir: Option<String>,
}

/// Resolved typesetting engine configuration with absolute paths.
#[derive(Debug)]
pub struct EngineConfig {
    /// Typesetting engine executable name.
    pub binary: String,
    /// Directory for compiled template output.
    pub compiled_dir: PathBuf,
    /// Root directory for per-render working directories.
    pub temp_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: "pdflatex".to_owned(),
            compiled_dir: PathBuf::from(".templatex/compiled"),
            temp_dir: std::env::temp_dir(),
        }
    }
}

/// A single storage disk declaration.
///
/// Unknown keys (e.g. `bucket` for object stores) are ignored here; they
/// belong to the backend the embedding application constructs.
#[derive(Debug, Deserialize)]
pub struct DiskConfig {
    /// Backend driver (e.g. "local", "s3").
    pub driver: String,
    /// Root directory for local disks.
    pub root: Option<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`disks.assets.root`").
        field: String,
        /// Error message (e.g., "${`ASSETS_ROOT`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Expand `~` and environment variables in a path string.
fn expand(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::full(value)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: e.to_string(),
        })
}

/// Resolve a possibly-relative path against a base directory.
fn resolve(path: &str, base: &Path) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

impl Config {
    /// Load configuration from file.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise,
    /// searches for `templatex.toml` in the current directory and parents,
    /// falling back to defaults when nothing is found.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist or parsing,
    /// expansion, or validation fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from_file(path);
        }
        if let Some(discovered) = Self::discover_config() {
            return Self::load_from_file(&discovered);
        }
        Ok(Self::default_with_cwd())
    }

    /// Resolved local disk roots, in disk-name order.
    ///
    /// Only disks with `driver = "local"` and a `root` key appear here;
    /// these are the directories handed to the typesetting engine's
    /// search path.
    #[must_use]
    pub fn local_disk_roots(&self) -> &[PathBuf] {
        &self.local_roots
    }

    /// All declared disks, keyed by name.
    #[must_use]
    pub fn disks(&self) -> &BTreeMap<String, DiskConfig> {
        &self.disks
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            engine: EngineConfigRaw::default(),
            disks: BTreeMap::new(),
            engine_resolved: EngineConfig {
                compiled_dir: base.join(".templatex/compiled"),
                ..EngineConfig::default()
            },
            local_roots: Vec::new(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        // Validate configuration after loading and resolution
        config.validate()?;

        Ok(config)
    }

    /// Expand and resolve all path-valued fields against the config dir.
    fn resolve_paths(&mut self, base: &Path) -> Result<(), ConfigError> {
        let defaults = Self::default_with_base(base);
        let mut resolved = defaults.engine_resolved;

        if let Some(binary) = &self.engine.binary {
            resolved.binary.clone_from(binary);
        }
        if let Some(compiled_dir) = &self.engine.compiled_dir {
            resolved.compiled_dir = resolve(&expand(compiled_dir, "engine.compiled_dir")?, base);
        }
        if let Some(temp_dir) = &self.engine.temp_dir {
            resolved.temp_dir = resolve(&expand(temp_dir, "engine.temp_dir")?, base);
        }
        self.engine_resolved = resolved;

        self.local_roots.clear();
        for (name, disk) in &self.disks {
            if disk.driver != "local" {
                continue;
            }
            let Some(root) = &disk.root else {
                continue;
            };
            let expanded = expand(root, &format!("disks.{name}.root"))?;
            self.local_roots.push(resolve(&expanded, base));
        }

        Ok(())
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.engine_resolved.binary, "engine.binary")?;

        for (name, disk) in &self.disks {
            require_non_empty(&disk.driver, &format!("disks.{name}.driver"))?;
            if disk.driver == "local" && disk.root.is_none() {
                return Err(ConfigError::Validation(format!(
                    "disks.{name} is local but has no root"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.engine_resolved.binary, "pdflatex");
        assert!(config.local_disk_roots().is_empty());
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let err = Config::load(Some(Path::new("/nonexistent/templatex.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_engine_section() {
        let (_dir, path) = write_config(
            r#"
[engine]
binary = "lualatex"
compiled_dir = "build/compiled"
temp_dir = "/tmp/texwork"
"#,
        );
        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.engine_resolved.binary, "lualatex");
        assert_eq!(
            config.engine_resolved.compiled_dir,
            path.parent().unwrap().join("build/compiled")
        );
        assert_eq!(config.engine_resolved.temp_dir, PathBuf::from("/tmp/texwork"));
    }

    #[test]
    fn test_local_disks_filtered_and_ordered() {
        let (_dir, path) = write_config(
            r#"
[disks.zeta]
driver = "local"
root = "zeta-assets"

[disks.alpha]
driver = "local"
root = "/srv/alpha"

[disks.published]
driver = "s3"
bucket = "docs"
"#,
        );
        let config = Config::load(Some(&path)).unwrap();
        let base = path.parent().unwrap();

        // Name order, local-with-root only
        assert_eq!(
            config.local_disk_roots(),
            &[PathBuf::from("/srv/alpha"), base.join("zeta-assets")]
        );
        assert_eq!(config.disks().len(), 3);
    }

    #[test]
    fn test_local_disk_without_root_fails_validation() {
        let (_dir, path) = write_config(
            r#"
[disks.broken]
driver = "local"
"#,
        );
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("disks.broken"));
    }

    #[test]
    fn test_empty_binary_fails_validation() {
        let (_dir, path) = write_config(
            r#"
[engine]
binary = ""
"#,
        );
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("engine.binary"));
    }

    #[test]
    fn test_env_expansion_in_disk_root() {
        // SAFETY: test-local variable name, no concurrent reader cares.
        unsafe { std::env::set_var("TEMPLATEX_TEST_ROOT", "/srv/expanded") };
        let (_dir, path) = write_config(
            r#"
[disks.assets]
driver = "local"
root = "${TEMPLATEX_TEST_ROOT}/assets"
"#,
        );
        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(
            config.local_disk_roots(),
            &[PathBuf::from("/srv/expanded/assets")]
        );
    }

    #[test]
    fn test_unset_env_var_is_reported_with_field() {
        let (_dir, path) = write_config(
            r#"
[disks.assets]
driver = "local"
root = "${TEMPLATEX_UNSET_VAR_42}/assets"
"#,
        );
        let err = Config::load(Some(&path)).unwrap_err();

        match err {
            ConfigError::EnvVar { field, .. } => assert_eq!(field, "disks.assets.root"),
            other => panic!("expected EnvVar error, got: {other}"),
        }
    }

    #[test]
    fn test_unknown_disk_keys_ignored() {
        let (_dir, path) = write_config(
            r#"
[disks.published]
driver = "s3"
bucket = "docs"
region = "eu-west-1"
"#,
        );
        let config = Config::load(Some(&path)).unwrap();

        assert!(config.local_disk_roots().is_empty());
        assert_eq!(config.disks()["published"].driver, "s3");
    }
}
