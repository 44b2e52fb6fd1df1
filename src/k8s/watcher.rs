//! Deployment and Service watchers
//!
//! Each watcher prints one line per change event to stdout until its stream ends.

use std::fmt;

use futures::stream::BoxStream;
use futures::StreamExt;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use kube::{
    api::Api,
    runtime::{
        watcher::{self, Event as WatchEvent},
        WatchStreamExt,
    },
    Client, Resource,
};
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Kind of change reported by a watch stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEventType {
    Applied,
    Deleted,
    Restarted,
    Synced,
}

impl fmt::Display for WatchEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchEventType::Applied => write!(f, "APPLIED"),
            WatchEventType::Deleted => write!(f, "DELETED"),
            WatchEventType::Restarted => write!(f, "RESTARTED"),
            WatchEventType::Synced => write!(f, "SYNCED"),
        }
    }
}

/// Printable summary of one watched object
#[derive(Debug, Clone, PartialEq)]
pub struct WatchLine {
    pub event_type: WatchEventType,
    pub kind: String,
    pub namespace: Option<String>,
    pub name: String,
    pub resource_version: Option<String>,
}

impl WatchLine {
    pub fn new<K>(event_type: WatchEventType, obj: &K) -> Self
    where
        K: Resource<DynamicType = ()>,
    {
        let meta = obj.meta();
        Self {
            event_type,
            kind: K::kind(&()).to_string(),
            namespace: meta.namespace.clone(),
            name: meta.name.clone().unwrap_or_default(),
            resource_version: meta.resource_version.clone(),
        }
    }
}

impl fmt::Display for WatchLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.event_type, self.kind)?;
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}", ns, self.name)?,
            None => write!(f, "{}", self.name)?,
        }
        if let Some(rv) = &self.resource_version {
            write!(f, " rv={}", rv)?;
        }
        Ok(())
    }
}

/// Spawn watchers for Deployments and Services in `namespace`
pub fn spawn_watchers(client: Client, namespace: &str) -> Vec<JoinHandle<()>> {
    let deployments: Api<Deployment> = Api::namespaced(client.clone(), namespace);
    let services: Api<Service> = Api::namespaced(client, namespace);

    vec![
        tokio::spawn(watch_resource(deployments)),
        tokio::spawn(watch_resource(services)),
    ]
}

/// Watch events for `api`; after an error the next re-list waits out an exponential backoff
pub fn event_stream<K>(api: Api<K>) -> BoxStream<'static, watcher::Result<WatchEvent<K>>>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + fmt::Debug + Send + Sync + 'static,
{
    watcher::watcher(api, watcher::Config::default())
        .default_backoff()
        .boxed()
}

/// Print every event from a watch on `api` until the stream ends
pub async fn watch_resource<K>(api: Api<K>)
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + fmt::Debug + Send + Sync + 'static,
{
    let kind = K::kind(&()).to_string();
    let mut stream = event_stream(api);

    info!(kind = %kind, "Watcher started");

    while let Some(event) = stream.next().await {
        match event {
            Ok(WatchEvent::Applied(obj)) => {
                println!("{}", WatchLine::new(WatchEventType::Applied, &obj));
            }
            Ok(WatchEvent::Deleted(obj)) => {
                println!("{}", WatchLine::new(WatchEventType::Deleted, &obj));
            }
            Ok(WatchEvent::Restarted(objs)) => {
                println!("{} {} ({} found)", WatchEventType::Restarted, kind, objs.len());
                for obj in &objs {
                    println!("{}", WatchLine::new(WatchEventType::Synced, obj));
                }
            }
            Err(e) => {
                // The watcher re-lists after the backoff; keep consuming
                error!(kind = %kind, "Watch error: {}", e);
            }
        }
    }

    warn!(kind = %kind, "Watch stream ended");
}
