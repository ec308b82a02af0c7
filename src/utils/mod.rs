pub mod config {
    use serde::Deserialize;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tracing::{debug, warn};

    use crate::errors::GraphError;

    pub const LOCAL_CONFIG: &str = "netscaler-graph.toml";

    /// Settings that may come from a TOML file. Keys mirror the long CLI
    /// flags (`input-file`, `ignore-name`, ...); every key is optional.
    #[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
    #[serde(rename_all = "kebab-case", deny_unknown_fields)]
    pub struct Config {
        pub rankdir: Option<String>,
        pub input_file: Option<String>,
        pub output_file: Option<String>,
        pub stdout: Option<bool>,
        pub ignore_name: Option<Vec<String>>,
        pub ignore_type: Option<Vec<String>>,
        pub isolate_name: Option<Vec<String>>,
    }

    /// Load an explicitly requested config file.
    ///
    /// # Errors
    /// Returns `GraphError::Config` if the file cannot be read or parsed.
    pub fn load_config_at(path: &Path) -> Result<Config, GraphError> {
        let data = fs::read_to_string(path)
            .map_err(|e| GraphError::Config(format!("cannot read {}: {e}", path.display())))?;
        toml::from_str::<Config>(&data)
            .map_err(|e| GraphError::Config(format!("cannot parse {}: {e}", path.display())))
    }

    /// Default config locations, most specific first.
    #[must_use]
    pub fn default_config_paths(cwd: &Path, home: Option<&Path>) -> Vec<PathBuf> {
        let mut paths = vec![cwd.join(LOCAL_CONFIG)];
        if let Some(home) = home {
            paths.push(home.join(".config").join("netscaler-graph").join("config.toml"));
        }
        paths
    }

    /// First default config file that exists. A default file that exists but
    /// does not parse is reported and skipped.
    #[must_use]
    pub fn load_config_near(cwd: &Path, home: Option<&Path>) -> Option<Config> {
        for path in default_config_paths(cwd, home) {
            if !path.is_file() {
                continue;
            }
            match load_config_at(&path) {
                Ok(cfg) => {
                    debug!(path = %path.display(), "using config file");
                    return Some(cfg);
                }
                Err(e) => warn!(error = %e, "ignoring config file"),
            }
        }
        None
    }
}

pub mod logging {
    use tracing_subscriber::EnvFilter;

    /// Filter directive implied by the verbosity flags.
    #[must_use]
    pub fn default_level(verbose: bool, quiet: bool) -> &'static str {
        if quiet {
            "off"
        } else if verbose {
            "debug"
        } else {
            "warn"
        }
    }

    /// Install the stderr `fmt` subscriber. `RUST_LOG` wins over the flags.
    /// Calling it again is a no-op.
    pub fn init(verbose: bool, quiet: bool) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level(verbose, quiet)));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::config::*;
    use super::logging::default_level;
    use std::fs;

    #[test]
    fn test_levels() {
        assert_eq!(default_level(false, false), "warn");
        assert_eq!(default_level(true, false), "debug");
        assert_eq!(default_level(true, true), "off");
    }

    #[test]
    fn test_default_paths_order() {
        let cwd = std::path::Path::new("/work");
        let home = std::path::Path::new("/home/u");
        let paths = default_config_paths(cwd, Some(home));
        assert_eq!(paths[0], cwd.join(LOCAL_CONFIG));
        assert!(paths[1].ends_with(".config/netscaler-graph/config.toml"));
        assert_eq!(default_config_paths(cwd, None).len(), 1);
    }

    #[test]
    fn test_broken_local_config_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(LOCAL_CONFIG), "rankdir = [").unwrap();
        assert!(load_config_near(dir.path(), None).is_none());
        assert!(load_config_at(&dir.path().join(LOCAL_CONFIG)).is_err());
    }
}
