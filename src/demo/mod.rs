//! Walkthrough scenarios
//!
//! Each scenario is a fixed sequence of cluster calls with the results printed to
//! stdout, optionally pausing for Enter between steps.

mod deployment;
mod manifests;
mod pods;
mod prompt;
mod report;

pub use prompt::{wait_for_enter, Pause};
pub use report::{deployment_line, pod_line, pod_lookup_line, pod_total};

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::Settings;
use crate::k8s::{spawn_watchers, K8sClient, RetryBackoff};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Pods,
    Deployment,
    Manifests,
    Watch,
}

/// Runs scenarios against one connected cluster
pub struct Walkthrough {
    k8s: K8sClient,
    settings: Settings,
    pause: Pause,
    backoff: RetryBackoff,
}

impl Walkthrough {
    pub fn new(k8s: K8sClient, settings: Settings) -> Self {
        let pause = Pause::new(!settings.assume_yes);
        Self {
            k8s,
            settings,
            pause,
            backoff: RetryBackoff::default(),
        }
    }

    /// Start the Deployment and Service watchers in the background
    pub fn start_watch(&self) -> Vec<JoinHandle<()>> {
        info!(namespace = %self.k8s.namespace(), "Starting Deployment and Service watchers");
        spawn_watchers(self.k8s.inner().clone(), self.k8s.namespace())
    }

    pub async fn run(&self, scenario: Scenario) -> Result<()> {
        info!(?scenario, "Running walkthrough");
        match scenario {
            Scenario::Pods => self.pods().await,
            Scenario::Deployment => self.deployment().await,
            Scenario::Manifests => self.manifests().await,
            Scenario::Watch => self.watch_until_interrupted().await,
        }
    }

    async fn watch_until_interrupted(&self) -> Result<()> {
        let handles = self.start_watch();
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")?;
        info!("Interrupted, stopping watchers");
        for handle in handles {
            handle.abort();
        }
        Ok(())
    }
}
