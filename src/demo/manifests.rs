use anyhow::Result;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use tracing::instrument;

use super::Walkthrough;
use crate::error::DemoError;
use crate::k8s::{load_manifest, manifest_name, retry_on_conflict, set_node_port};

impl Walkthrough {
    /// Create a Deployment and a Service from manifest files, update the Service,
    /// then delete both
    #[instrument(skip(self), fields(namespace = %self.k8s.namespace()))]
    pub async fn manifests(&self) -> Result<()> {
        let deployment: Deployment = load_manifest(&self.settings.deployment_manifest).await?;
        let deployment_name = manifest_name(&deployment)?;

        println!("Creating deployment...");
        let created = self.k8s.create_deployment(&deployment).await?;
        println!(
            "Created deployment {:?}.",
            created.metadata.name.as_deref().unwrap_or(&deployment_name)
        );

        self.pause.wait()?;
        let service: Service = load_manifest(&self.settings.service_manifest).await?;
        let service_name = manifest_name(&service)?;

        println!("Creating Service...");
        let created = self.k8s.create_service(&service).await?;
        println!(
            "Created Service {:?}.",
            created.metadata.name.as_deref().unwrap_or(&service_name)
        );

        self.pause.wait()?;
        println!("Updating Service...");
        let k8s = &self.k8s;
        let name = service_name.as_str();
        let node_port = self.settings.node_port;
        retry_on_conflict(&self.backoff, move || async move {
            let mut latest = k8s
                .get_service(name)
                .await
                .map_err(|source| DemoError::GetLatest {
                    kind: "Service",
                    source,
                })?;
            set_node_port(&mut latest, node_port)?;
            k8s.replace_service(&latest).await?;
            Ok::<_, anyhow::Error>(())
        })
        .await
        .map_err(|e| e.context(format!("Update failed for Service {:?}", service_name)))?;
        println!("Updated Service {:?}", service_name);

        self.pause.wait()?;
        println!("Deleting Service...");
        self.k8s.delete_service(&service_name).await?;
        println!("Deleted Service {:?}.", service_name);

        self.pause.wait()?;
        println!("Deleting deployment...");
        self.k8s.delete_deployment(&deployment_name).await?;
        println!("Deleted deployment {:?}.", deployment_name);

        Ok(())
    }
}
