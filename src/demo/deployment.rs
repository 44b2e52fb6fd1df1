use anyhow::Result;
use tracing::instrument;

use super::report::deployment_line;
use super::Walkthrough;
use crate::error::DemoError;
use crate::k8s::{
    create_demo_deployment, retry_on_conflict, scale_and_retag, DEMO_DEPLOYMENT_NAME,
    DEMO_INITIAL_IMAGE, DEMO_UPDATED_IMAGE, DEMO_UPDATED_REPLICAS,
};

impl Walkthrough {
    /// Create, update, list and delete a Deployment built in code
    #[instrument(skip(self), fields(namespace = %self.k8s.namespace()))]
    pub async fn deployment(&self) -> Result<()> {
        let deployment = create_demo_deployment(DEMO_DEPLOYMENT_NAME, 2, DEMO_INITIAL_IMAGE);

        println!("Creating deployment...");
        let created = self.k8s.create_deployment(&deployment).await?;
        println!(
            "Created deployment {:?}.",
            created.metadata.name.as_deref().unwrap_or(DEMO_DEPLOYMENT_NAME)
        );

        self.pause.wait()?;
        println!("Updating deployment...");
        // Each attempt edits the latest stored version
        let k8s = &self.k8s;
        retry_on_conflict(&self.backoff, move || async move {
            let mut latest = k8s
                .get_deployment(DEMO_DEPLOYMENT_NAME)
                .await
                .map_err(|source| DemoError::GetLatest {
                    kind: "Deployment",
                    source,
                })?;
            scale_and_retag(&mut latest, DEMO_UPDATED_REPLICAS, DEMO_UPDATED_IMAGE)?;
            k8s.replace_deployment(&latest).await?;
            Ok::<_, anyhow::Error>(())
        })
        .await
        .map_err(|e| e.context(format!("Update failed for Deployment {:?}", DEMO_DEPLOYMENT_NAME)))?;
        println!("Updated deployment...");

        self.pause.wait()?;
        println!("Listing deployments in namespace {:?}:", self.k8s.namespace());
        for d in self.k8s.list_deployments().await? {
            println!("{}", deployment_line(&d));
        }

        self.pause.wait()?;
        println!("Deleting deployment...");
        self.k8s.delete_deployment(DEMO_DEPLOYMENT_NAME).await?;
        println!("Deleted deployment.");

        Ok(())
    }
}
