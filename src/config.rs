use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{DemoError, DemoResult};

/// Prefix for environment variables read into [`Settings`]
pub const ENV_PREFIX: &str = "KUBEDEMO";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_kubeconfig")]
    pub kubeconfig: Option<PathBuf>,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default = "default_pod_namespace")]
    pub pod_namespace: String,

    #[serde(default = "default_pod_name")]
    pub pod_name: String,

    #[serde(default = "default_deployment_manifest")]
    pub deployment_manifest: PathBuf,

    #[serde(default = "default_service_manifest")]
    pub service_manifest: PathBuf,

    #[serde(default = "default_node_port")]
    pub node_port: i32,

    #[serde(default)]
    pub assume_yes: bool,
}

/// `$HOME/.kube/config` when it exists; otherwise the client infers its config
fn default_kubeconfig() -> Option<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".kube").join("config"))
        .filter(|path| path.exists())
}

fn default_namespace() -> String {
    "default".to_string()
}

fn default_pod_namespace() -> String {
    "kube-system".to_string()
}

fn default_pod_name() -> String {
    "kube-apiserver-docker-for-desktop".to_string()
}

fn default_deployment_manifest() -> PathBuf {
    PathBuf::from("demo-deploy.json")
}

fn default_service_manifest() -> PathBuf {
    PathBuf::from("demo-service.json")
}

fn default_node_port() -> i32 {
    30000
}

impl Settings {
    /// Load settings from `.env` and `KUBEDEMO_*` environment variables
    pub fn load() -> DemoResult<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_environment(config::Environment::with_prefix(ENV_PREFIX))
    }

    fn from_environment(env: config::Environment) -> DemoResult<Self> {
        let config = config::Config::builder()
            .add_source(env.try_parsing(true))
            .build()
            .map_err(|e| DemoError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| DemoError::Config(e.to_string()))?;

        Ok(settings)
    }

    /// Check the merged settings; call after command-line flags are applied.
    /// NodePorts outside the default service-node-port-range are rejected by the API server
    pub fn validate(&self) -> DemoResult<()> {
        if !(30000..=32767).contains(&self.node_port) {
            return Err(DemoError::Config(format!(
                "node port {} is outside 30000-32767",
                self.node_port
            )));
        }
        if self.namespace.is_empty() {
            return Err(DemoError::Config("namespace must not be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            kubeconfig: default_kubeconfig(),
            namespace: default_namespace(),
            pod_namespace: default_pod_namespace(),
            pod_name: default_pod_name(),
            deployment_manifest: default_deployment_manifest(),
            service_manifest: default_service_manifest(),
            node_port: default_node_port(),
            assume_yes: false,
        }
    }
}
