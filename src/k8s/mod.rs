//! Kubernetes integration module for kubedemo
//!
//! This module wraps every interaction with the cluster:
//! - Connecting from a kubeconfig file or the inferred environment
//! - Typed CRUD helpers for pods, deployments and services
//! - Building and editing resources, and loading them from manifests
//! - Retrying get-modify-replace updates on conflict
//! - Watching deployment and service events

mod client;
mod manifest;
mod resources;
mod retry;
mod watcher;

pub use client::{is_conflict, is_not_found, K8sClient, PodLookup};
pub use manifest::{load_manifest, manifest_name, parse_manifest};
pub use resources::{
    create_demo_deployment, demo_labels, desired_replicas, scale_and_retag, set_node_port,
    DEMO_DEPLOYMENT_NAME, DEMO_INITIAL_IMAGE, DEMO_UPDATED_IMAGE, DEMO_UPDATED_REPLICAS,
};
pub use retry::{is_conflict_error, retry_on_conflict, RetryBackoff};
pub use watcher::{spawn_watchers, watch_resource, WatchEventType, WatchLine};
