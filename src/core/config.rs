/// Startup configuration
///
/// Built once in `main` from defaults, an optional TOML file, the
/// environment and CLI flags (in that order of precedence, lowest first),
/// then shared read-only for the lifetime of the process.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::{
    is_valid_host, parse_host_list, DEFAULT_AGENT_SCRIPT, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_POLL_TIMEOUT, DEFAULT_SSH_PROGRAM, DEFAULT_SSH_USER, ENV_HOSTS, ENV_SSH_USER,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverseerConfig {
    pub hosts: Vec<String>,
    pub ssh_program: PathBuf,
    pub ssh_user: String,
    pub ssh_port: Option<u16>,
    pub identity_file: Option<PathBuf>,
    pub agent_script: PathBuf,
    #[serde(with = "human_duration")]
    pub connect_timeout: Duration,
    #[serde(with = "human_duration")]
    pub poll_timeout: Duration,
    pub log_file: Option<PathBuf>,
}

impl Default for OverseerConfig {
    fn default() -> Self {
        Self {
            hosts: Vec::new(),
            ssh_program: PathBuf::from(DEFAULT_SSH_PROGRAM),
            ssh_user: DEFAULT_SSH_USER.to_string(),
            ssh_port: None,
            identity_file: None,
            agent_script: PathBuf::from(DEFAULT_AGENT_SCRIPT),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            log_file: None,
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub hosts: Vec<String>,
    pub ssh_user: Option<String>,
    pub poll_timeout: Option<Duration>,
    pub log_file: Option<PathBuf>,
}

impl OverseerConfig {
    /// `~/.config/overseer/config.toml` (platform equivalent elsewhere)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("overseer").join("config.toml"))
    }

    /// Load configuration from a TOML file
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow!("config file not found at {}", path.display()));
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load the explicit file if given, else the default file if present,
    /// else built-in defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load_file(path),
            _ => Ok(Self::default()),
        }
    }

    /// Full resolution used by the binary
    pub fn resolve(explicit: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = Self::load(explicit)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.apply_overrides(overrides);
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(hosts) = lookup(ENV_HOSTS) {
            let hosts = parse_host_list(&hosts);
            if !hosts.is_empty() {
                self.hosts = hosts;
            }
        }

        if let Some(user) = lookup(ENV_SSH_USER) {
            if !user.trim().is_empty() {
                self.ssh_user = user.trim().to_string();
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if !overrides.hosts.is_empty() {
            self.hosts = overrides.hosts.clone();
        }
        if let Some(ref user) = overrides.ssh_user {
            self.ssh_user = user.clone();
        }
        if let Some(timeout) = overrides.poll_timeout {
            self.poll_timeout = timeout;
        }
        if let Some(ref path) = overrides.log_file {
            self.log_file = Some(path.clone());
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.hosts.is_empty() {
            errors.push(format!(
                "No hosts configured (use --host, {} or the config file)",
                ENV_HOSTS
            ));
        }

        let mut seen = HashSet::new();
        for host in &self.hosts {
            if !is_valid_host(host) {
                errors.push(format!("Invalid host address: {:?}", host));
            }
            if !seen.insert(host.as_str()) {
                errors.push(format!("Duplicate host: {}", host));
            }
        }

        if self.ssh_program.as_os_str().is_empty() {
            errors.push("ssh_program is empty".to_string());
        }

        if self.ssh_user.trim().is_empty() {
            errors.push("ssh_user is empty".to_string());
        }

        if self.connect_timeout.is_zero() {
            errors.push("connect_timeout must be greater than zero".to_string());
        }

        if self.poll_timeout <= self.connect_timeout {
            errors.push(format!(
                "poll_timeout ({}) must be greater than connect_timeout ({})",
                humantime::format_duration(self.poll_timeout),
                humantime::format_duration(self.connect_timeout)
            ));
        }

        errors
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

/// Durations written as human strings ("2s", "1m 30s")
mod human_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# Cluster nodes").unwrap();
        writeln!(file, r#"hosts = ["10.0.10.11", "10.0.10.12"]"#).unwrap();
        writeln!(file, r#"ssh_user = "monitor""#).unwrap();
        writeln!(file, r#"poll_timeout = "9s""#).unwrap();

        let config = OverseerConfig::load_file(file.path()).unwrap();

        assert_eq!(config.hosts, vec!["10.0.10.11", "10.0.10.12"]);
        assert_eq!(config.ssh_user, "monitor");
        assert_eq!(config.poll_timeout, Duration::from_secs(9));
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(config.ssh_program, PathBuf::from(DEFAULT_SSH_PROGRAM));
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        assert!(OverseerConfig::load(Some(Path::new("/nonexistent/overseer.toml"))).is_err());
    }

    #[test]
    fn test_bad_duration_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"poll_timeout = "soon""#).unwrap();

        assert!(OverseerConfig::load_file(file.path()).is_err());
    }

    #[test]
    fn test_env_and_overrides_precedence() {
        let mut config = OverseerConfig {
            hosts: vec!["file-host".to_string()],
            ..OverseerConfig::default()
        };

        let env: HashMap<&str, &str> = [
            (ENV_HOSTS, "10.0.10.11,10.0.10.12"),
            (ENV_SSH_USER, "ops"),
        ]
        .into_iter()
        .collect();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.hosts, vec!["10.0.10.11", "10.0.10.12"]);
        assert_eq!(config.ssh_user, "ops");

        config.apply_overrides(&ConfigOverrides {
            hosts: vec!["10.0.10.13".to_string()],
            poll_timeout: Some(Duration::from_secs(12)),
            ..ConfigOverrides::default()
        });

        assert_eq!(config.hosts, vec!["10.0.10.13"]);
        assert_eq!(config.ssh_user, "ops");
        assert_eq!(config.poll_timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_validate() {
        let config = OverseerConfig::default();
        assert_eq!(config.validate().len(), 1);

        let config = OverseerConfig {
            hosts: vec!["10.0.10.11".to_string(), "10.0.10.11".to_string()],
            poll_timeout: Duration::from_secs(2),
            ..OverseerConfig::default()
        };
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.contains("Duplicate host")));
        assert!(errors.iter().any(|e| e.contains("poll_timeout")));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = OverseerConfig {
            hosts: vec!["10.0.10.11".to_string()],
            ..OverseerConfig::default()
        };
        let text = config.to_toml().unwrap();
        assert!(text.contains(r#"poll_timeout = "7s""#));

        let parsed: OverseerConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
