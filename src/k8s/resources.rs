//! Kubernetes resource builders and edits for the walkthroughs

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{Container, ContainerPort, PodSpec, PodTemplateSpec, Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use std::collections::BTreeMap;

use crate::error::{DemoError, DemoResult};

/// Name of the Deployment built in code
pub const DEMO_DEPLOYMENT_NAME: &str = "demo-deployment";

/// Image the demo Deployment starts with
pub const DEMO_INITIAL_IMAGE: &str = "nginx:1.12";

/// Image the update step rolls the demo Deployment to
pub const DEMO_UPDATED_IMAGE: &str = "nginx:1.13";

/// Replica count the update step scales the demo Deployment to
pub const DEMO_UPDATED_REPLICAS: i32 = 1;

/// Labels shared by the demo Deployment's selector and pod template
pub fn demo_labels() -> BTreeMap<String, String> {
    [("app".to_string(), "demo".to_string())]
        .into_iter()
        .collect()
}

/// Create the demo Deployment: an nginx `web` container serving HTTP on port 80
pub fn create_demo_deployment(name: &str, replicas: i32, image: &str) -> Deployment {
    let labels = demo_labels();

    let container = Container {
        name: "web".to_string(),
        image: Some(image.to_string()),
        ports: Some(vec![ContainerPort {
            name: Some("http".to_string()),
            protocol: Some("TCP".to_string()),
            container_port: 80,
            ..Default::default()
        }]),
        ..Default::default()
    };

    Deployment {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(replicas),
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![container],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Set the replica count and the first container's image
pub fn scale_and_retag(deployment: &mut Deployment, replicas: i32, image: &str) -> DemoResult<()> {
    let spec = deployment.spec.as_mut().ok_or(DemoError::MissingField {
        kind: "Deployment",
        field: "spec",
    })?;

    let container = spec
        .template
        .spec
        .as_mut()
        .and_then(|pod| pod.containers.first_mut())
        .ok_or(DemoError::MissingField {
            kind: "Deployment",
            field: "spec.template.spec.containers",
        })?;

    container.image = Some(image.to_string());
    spec.replicas = Some(replicas);
    Ok(())
}

/// Set the NodePort of the Service's first port
pub fn set_node_port(service: &mut Service, node_port: i32) -> DemoResult<()> {
    let port = service
        .spec
        .as_mut()
        .and_then(|spec| spec.ports.as_mut())
        .and_then(|ports| ports.first_mut())
        .ok_or(DemoError::MissingField {
            kind: "Service",
            field: "spec.ports",
        })?;

    port.node_port = Some(node_port);
    Ok(())
}

/// Replica count from the spec; the API server defaults an unset count to 1
pub fn desired_replicas(deployment: &Deployment) -> i32 {
    deployment
        .spec
        .as_ref()
        .and_then(|s| s.replicas)
        .unwrap_or(1)
}
