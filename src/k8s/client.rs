//! Kubernetes client wrapper for kubedemo

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Pod, Service};
use kube::{
    api::{Api, DeleteParams, ListParams, PostParams},
    config::{KubeConfigOptions, Kubeconfig},
    Client, Config,
};
use tracing::{debug, info, instrument};

/// Timeout for connecting to the API server
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for reading API server responses
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of looking up a single pod
#[derive(Debug, Clone, PartialEq)]
pub enum PodLookup {
    Found,
    NotFound,
    /// The API server answered with a status other than 404
    StatusError { message: String },
}

/// Wrapper around kube::Client scoped to one working namespace
#[derive(Clone)]
pub struct K8sClient {
    client: Client,
    namespace: String,
}

impl K8sClient {
    /// Connect using an explicit kubeconfig file, or infer the config when none is given
    #[instrument(skip_all, fields(kubeconfig = ?kubeconfig, namespace = %namespace))]
    pub async fn connect(kubeconfig: Option<&Path>, namespace: &str) -> Result<Self> {
        let mut config = match kubeconfig {
            Some(path) => {
                let kubeconfig = Kubeconfig::read_from(path)
                    .with_context(|| format!("Failed to read kubeconfig {}", path.display()))?;
                Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                    .await
                    .with_context(|| format!("Failed to load kubeconfig {}", path.display()))?
            }
            None => Config::infer()
                .await
                .context("Failed to infer Kubernetes configuration")?,
        };

        config.connect_timeout = Some(CONNECT_TIMEOUT);
        config.read_timeout = Some(READ_TIMEOUT);

        let client = Client::try_from(config).context("Failed to create Kubernetes client")?;

        let version = client
            .apiserver_version()
            .await
            .context("Failed to reach the Kubernetes API server")?;
        info!(version = %version.git_version, "Connected to Kubernetes cluster");

        Ok(Self {
            client,
            namespace: namespace.to_string(),
        })
    }

    /// Get the namespace this client operates in
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Get the inner kube Client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Pods across every namespace
    pub fn pods_all(&self) -> Api<Pod> {
        Api::all(self.client.clone())
    }

    /// Pods in a specific namespace
    pub fn pods_in(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }

    /// Get a typed API for deployments in the working namespace
    pub fn deployments(&self) -> Api<Deployment> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    /// Get a typed API for services in the working namespace
    pub fn services(&self) -> Api<Service> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    /// List pods in all namespaces
    #[instrument(skip(self))]
    pub async fn list_all_pods(&self) -> Result<Vec<Pod>> {
        let list = self
            .pods_all()
            .list(&ListParams::default())
            .await
            .context("Failed to list pods")?;
        debug!(count = list.items.len(), "Listed pods");
        Ok(list.items)
    }

    /// Look up a pod, classifying API status errors instead of failing on them
    #[instrument(skip(self))]
    pub async fn lookup_pod(&self, namespace: &str, name: &str) -> Result<PodLookup> {
        match self.pods_in(namespace).get(name).await {
            Ok(_) => Ok(PodLookup::Found),
            Err(e) => classify_lookup_error(e),
        }
    }

    /// Create a deployment
    #[instrument(skip(self, deployment), fields(deployment_name = %deployment.metadata.name.as_deref().unwrap_or("unknown")))]
    pub async fn create_deployment(&self, deployment: &Deployment) -> Result<Deployment> {
        let created = self
            .deployments()
            .create(&PostParams::default(), deployment)
            .await
            .context("Failed to create deployment")?;
        info!("Created deployment");
        Ok(created)
    }

    /// Get a deployment by name
    pub async fn get_deployment(&self, name: &str) -> kube::Result<Deployment> {
        self.deployments().get(name).await
    }

    /// Replace a deployment; the object's resourceVersion guards against lost updates
    #[instrument(skip(self, deployment), fields(deployment_name = %deployment.metadata.name.as_deref().unwrap_or("unknown")))]
    pub async fn replace_deployment(&self, deployment: &Deployment) -> kube::Result<Deployment> {
        let name = deployment.metadata.name.as_deref().unwrap_or_default();
        let updated = self
            .deployments()
            .replace(name, &PostParams::default(), deployment)
            .await?;
        info!("Replaced deployment");
        Ok(updated)
    }

    /// List deployments in the working namespace
    pub async fn list_deployments(&self) -> Result<Vec<Deployment>> {
        let list = self
            .deployments()
            .list(&ListParams::default())
            .await
            .context("Failed to list deployments")?;
        Ok(list.items)
    }

    /// Delete a deployment, removing its ReplicaSets and pods first
    #[instrument(skip(self))]
    pub async fn delete_deployment(&self, name: &str) -> Result<()> {
        self.deployments()
            .delete(name, &DeleteParams::foreground())
            .await
            .with_context(|| format!("Failed to delete deployment {name:?}"))?;
        info!(name, "Deleted deployment");
        Ok(())
    }

    /// Create a service
    #[instrument(skip(self, service), fields(service_name = %service.metadata.name.as_deref().unwrap_or("unknown")))]
    pub async fn create_service(&self, service: &Service) -> Result<Service> {
        let created = self
            .services()
            .create(&PostParams::default(), service)
            .await
            .context("Failed to create service")?;
        info!("Created service");
        Ok(created)
    }

    /// Get a service by name
    pub async fn get_service(&self, name: &str) -> kube::Result<Service> {
        self.services().get(name).await
    }

    /// Replace a service
    #[instrument(skip(self, service), fields(service_name = %service.metadata.name.as_deref().unwrap_or("unknown")))]
    pub async fn replace_service(&self, service: &Service) -> kube::Result<Service> {
        let name = service.metadata.name.as_deref().unwrap_or_default();
        let updated = self
            .services()
            .replace(name, &PostParams::default(), service)
            .await?;
        info!("Replaced service");
        Ok(updated)
    }

    /// Delete a service with foreground propagation
    #[instrument(skip(self))]
    pub async fn delete_service(&self, name: &str) -> Result<()> {
        self.services()
            .delete(name, &DeleteParams::foreground())
            .await
            .with_context(|| format!("Failed to delete service {name:?}"))?;
        info!(name, "Deleted service");
        Ok(())
    }
}

/// True when the API server answered 404 Not Found
pub fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(e) if e.code == 404)
}

/// True when the API server rejected a write because of a stale resourceVersion
pub fn is_conflict(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(e) if e.code == 409)
}

fn classify_lookup_error(err: kube::Error) -> Result<PodLookup> {
    match err {
        ref e if is_not_found(e) => Ok(PodLookup::NotFound),
        kube::Error::Api(status) => Ok(PodLookup::StatusError {
            message: status.message,
        }),
        // Transport and decoding failures are not something we can report and move past
        e => Err(anyhow::Error::new(e).context("Failed to get pod")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::error::ErrorResponse;

    fn api_error(code: u16, reason: &str, message: &str) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: message.to_string(),
            reason: reason.to_string(),
            code,
        })
    }

    fn decode_error() -> kube::Error {
        kube::Error::SerdeError(serde_json::from_str::<u32>("not a number").unwrap_err())
    }

    #[test]
    fn test_is_not_found() {
        assert!(is_not_found(&api_error(404, "NotFound", "pods \"x\" not found")));
        assert!(!is_not_found(&api_error(409, "Conflict", "conflict")));
        assert!(!is_not_found(&decode_error()));
    }

    #[test]
    fn test_is_conflict() {
        assert!(is_conflict(&api_error(409, "Conflict", "the object has been modified")));
        assert!(!is_conflict(&api_error(500, "InternalError", "boom")));
    }

    #[test]
    fn test_lookup_not_found() {
        let result = classify_lookup_error(api_error(404, "NotFound", "not found")).unwrap();
        assert_eq!(result, PodLookup::NotFound);
    }

    #[test]
    fn test_lookup_status_error_keeps_message() {
        let result =
            classify_lookup_error(api_error(403, "Forbidden", "pods is forbidden")).unwrap();
        assert_eq!(
            result,
            PodLookup::StatusError {
                message: "pods is forbidden".to_string()
            }
        );
    }

    #[test]
    fn test_lookup_transport_error_is_fatal() {
        let result = classify_lookup_error(decode_error());
        assert!(result.is_err());
    }
}
