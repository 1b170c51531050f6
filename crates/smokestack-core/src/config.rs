use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// File name looked up in the project directory.
pub const CONFIG_FILE_NAME: &str = "smokestack.toml";

/// smokestack.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmokestackConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub smoke: SmokeConfig,
    #[serde(default)]
    pub reap: ReapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Container engine executable (docker, podman, nerdctl, or a path)
    #[serde(default = "default_engine_program")]
    pub program: String,
}

/// How the smoke tester waits for the server inside the container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessStrategy {
    /// Retry the probe on connection errors until the warm-up deadline.
    #[default]
    Poll,
    /// Sleep for the whole warm-up period, then probe once.
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmokeConfig {
    /// Reserved name of the test container
    #[serde(default = "default_container_name")]
    pub container_name: String,
    /// Host side of the port mapping
    #[serde(default = "default_port")]
    pub host_port: u16,
    /// Port the server inside the container listens on
    #[serde(default = "default_port")]
    pub container_port: u16,
    #[serde(default)]
    pub readiness: ReadinessStrategy,
    /// Warm-up delay (fixed) or readiness deadline (poll), in seconds
    #[serde(default = "default_warmup_secs")]
    pub warmup_secs: u64,
    /// Delay between connection attempts while polling, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// URL probed once the container is up
    #[serde(default = "default_url")]
    pub url: String,
    /// Value of the `Host` header sent with the probe
    #[serde(default = "default_host_header")]
    pub host_header: String,
    /// Per-request HTTP timeout, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReapConfig {
    /// Treat a failing `rm` after a successful `stop` as an error.
    #[serde(default)]
    pub strict_remove: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: default_engine_program(),
        }
    }
}

impl Default for SmokeConfig {
    fn default() -> Self {
        Self {
            container_name: default_container_name(),
            host_port: default_port(),
            container_port: default_port(),
            readiness: ReadinessStrategy::default(),
            warmup_secs: default_warmup_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            url: default_url(),
            host_header: default_host_header(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl SmokeConfig {
    pub fn warmup(&self) -> Duration {
        Duration::from_secs(self.warmup_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `HOST:CONTAINER` argument for the engine's `--publish` flag.
    pub fn port_mapping(&self) -> String {
        format!("{}:{}", self.host_port, self.container_port)
    }
}

impl SmokestackConfig {
    /// Load from smokestack.toml in the given directory, or return defaults if not found.
    pub fn load(project_dir: &Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            let config: Self =
                toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                    path: config_path.clone(),
                    source: e,
                })?;
            tracing::debug!(path = %config_path.display(), "loaded config");
            Ok(config)
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Reject values the smoke tester and reaper cannot work with.
    pub fn validate(&self) -> crate::Result<()> {
        let invalid = |field, reason| Err(crate::Error::InvalidConfig { field, reason });

        if self.engine.program.trim().is_empty() {
            return invalid("engine.program", "must not be empty");
        }
        if self.smoke.container_name.trim().is_empty() {
            return invalid("smoke.container_name", "must not be empty");
        }
        if self.smoke.host_port == 0 {
            return invalid("smoke.host_port", "must be a non-zero port");
        }
        if self.smoke.container_port == 0 {
            return invalid("smoke.container_port", "must be a non-zero port");
        }
        if self.smoke.url.trim().is_empty() {
            return invalid("smoke.url", "must not be empty");
        }
        let url = match Url::parse(&self.smoke.url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => url,
            _ => return invalid("smoke.url", "must be an absolute http:// or https:// URL"),
        };
        // The container is only reachable on the published host port.
        if url.port_or_known_default() != Some(self.smoke.host_port) {
            return invalid("smoke.url", "port must match smoke.host_port");
        }
        if self.smoke.poll_interval_ms == 0 {
            return invalid("smoke.poll_interval_ms", "must be greater than zero");
        }
        if self.smoke.request_timeout_secs == 0 {
            return invalid("smoke.request_timeout_secs", "must be greater than zero");
        }

        Ok(())
    }
}

fn default_engine_program() -> String {
    "docker".to_owned()
}

fn default_container_name() -> String {
    "smk".to_owned()
}

fn default_port() -> u16 {
    8080
}

fn default_warmup_secs() -> u64 {
    5
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_url() -> String {
    "http://localhost:8080/".to_owned()
}

fn default_host_header() -> String {
    "localhost".to_owned()
}

fn default_request_timeout_secs() -> u64 {
    10
}
