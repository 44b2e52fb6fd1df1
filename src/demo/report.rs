//! Formatting for the lines the walkthroughs print

use chrono::SecondsFormat;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Pod;

use crate::k8s::{desired_replicas, PodLookup};

/// One line per pod: namespace, name, phase and start time
pub fn pod_line(pod: &Pod) -> String {
    let status = pod.status.as_ref();
    let phase = status
        .and_then(|s| s.phase.as_deref())
        .unwrap_or("Unknown");
    let start_time = status
        .and_then(|s| s.start_time.as_ref())
        .map(|t| t.0.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "<none>".to_string());

    format!(
        "namespace: {}, name: {}, status: {}, startTime: {}",
        pod.metadata.namespace.as_deref().unwrap_or_default(),
        pod.metadata.name.as_deref().unwrap_or_default(),
        phase,
        start_time
    )
}

pub fn pod_total(count: usize) -> String {
    format!("Total: {} pods", count)
}

/// Result of looking up a single pod
pub fn pod_lookup_line(namespace: &str, name: &str, lookup: &PodLookup) -> String {
    match lookup {
        PodLookup::Found => format!("Found pod {:?} in namespace {:?}", name, namespace),
        PodLookup::NotFound => format!("Pod {:?} in namespace {:?} not found", name, namespace),
        PodLookup::StatusError { message } => format!(
            "Error getting pod {:?} in namespace {:?}: {}",
            name, namespace, message
        ),
    }
}

pub fn deployment_line(deployment: &Deployment) -> String {
    format!(
        " * {} ({} replicas)",
        deployment.metadata.name.as_deref().unwrap_or_default(),
        desired_replicas(deployment)
    )
}
