use anyhow::Result;
use tracing::{info, instrument};

use super::report::{pod_line, pod_lookup_line, pod_total};
use super::Walkthrough;

impl Walkthrough {
    /// List pods in every namespace, then look up the configured pod
    #[instrument(skip(self))]
    pub async fn pods(&self) -> Result<()> {
        let pods = self.k8s.list_all_pods().await?;
        for pod in &pods {
            println!("{}", pod_line(pod));
        }
        println!("{}", pod_total(pods.len()));

        let namespace = &self.settings.pod_namespace;
        let name = &self.settings.pod_name;
        let lookup = self.k8s.lookup_pod(namespace, name).await?;
        info!(?lookup, "Pod lookup finished");
        println!("{}", pod_lookup_line(namespace, name, &lookup));

        Ok(())
    }
}
