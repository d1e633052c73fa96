//! Application settings. Read from env (and `.env` via dotenvy) or built in code.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const PROJECT_ROOT_ENV: &str = "MODEL_BOOT_PROJECT_ROOT";
pub const HOST_ENV: &str = "MODEL_BOOT_HOST";
pub const PORT_ENV: &str = "MODEL_BOOT_PORT";

/// Where a booter looks for its artifacts, relative to the project root.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactOptions {
    pub dirs: Vec<String>,
    pub extensions: Vec<String>,
    /// Descend into subdirectories.
    #[serde(default = "default_true")]
    pub nested: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BootOptions {
    #[serde(default = "BootOptions::default_models")]
    pub models: ArtifactOptions,
    #[serde(default = "BootOptions::default_model_endpoints")]
    pub model_endpoints: ArtifactOptions,
}

impl BootOptions {
    fn default_models() -> ArtifactOptions {
        ArtifactOptions {
            dirs: vec!["models".into()],
            extensions: vec![".model.json".into()],
            nested: true,
        }
    }

    fn default_model_endpoints() -> ArtifactOptions {
        ArtifactOptions {
            dirs: vec!["model-endpoints".into()],
            extensions: vec!["-config.json".into()],
            nested: true,
        }
    }
}

impl Default for BootOptions {
    fn default() -> Self {
        BootOptions {
            models: Self::default_models(),
            model_endpoints: Self::default_model_endpoints(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RestConfig {
    pub host: String,
    /// 0 binds a free port.
    pub port: u16,
    /// Max request body size in bytes.
    #[serde(default = "RestConfig::default_body_limit")]
    pub body_limit: usize,
}

impl RestConfig {
    fn default_body_limit() -> usize {
        1024 * 1024
    }
}

impl Default for RestConfig {
    fn default() -> Self {
        RestConfig {
            host: "127.0.0.1".into(),
            port: 3000,
            body_limit: Self::default_body_limit(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplicationConfig {
    pub project_root: PathBuf,
    #[serde(default)]
    pub rest: RestConfig,
    #[serde(default)]
    pub boot: BootOptions,
}

impl ApplicationConfig {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        ApplicationConfig {
            project_root: project_root.into(),
            ..Default::default()
        }
    }

    /// `MODEL_BOOT_PROJECT_ROOT` (default "."), `MODEL_BOOT_HOST` (default 127.0.0.1), `MODEL_BOOT_PORT` (default 3000).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let project_root = std::env::var(PROJECT_ROOT_ENV).unwrap_or_else(|_| ".".into());
        let mut rest = RestConfig::default();
        if let Ok(host) = std::env::var(HOST_ENV) {
            rest.host = host;
        }
        if let Ok(port) = std::env::var(PORT_ENV) {
            match port.parse() {
                Ok(p) => rest.port = p,
                Err(_) => tracing::warn!(value = %port, "invalid {}, using {}", PORT_ENV, rest.port),
            }
        }
        ApplicationConfig {
            project_root: project_root.into(),
            rest,
            boot: BootOptions::default(),
        }
    }

    /// Serve on a free local port.
    pub fn with_ephemeral_port(mut self) -> Self {
        self.rest.host = "127.0.0.1".into();
        self.rest.port = 0;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boot_defaults() {
        let opts = BootOptions::default();
        assert_eq!(opts.models.dirs, vec!["models"]);
        assert_eq!(opts.model_endpoints.extensions, vec!["-config.json"]);
    }

    #[test]
    fn deserialize_with_defaults() {
        let cfg: ApplicationConfig = serde_json::from_str(r#"{"project_root":"/srv/app"}"#).unwrap();
        assert_eq!(cfg.rest, RestConfig::default());
        assert_eq!(cfg.boot, BootOptions::default());
    }

    #[test]
    fn ephemeral_port() {
        let cfg = ApplicationConfig::new("/tmp").with_ephemeral_port();
        assert_eq!(cfg.rest.port, 0);
    }
}
