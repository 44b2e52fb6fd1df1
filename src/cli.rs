use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;
use crate::demo::Scenario;

#[derive(Parser, Debug)]
#[command(name = "kubedemo")]
#[command(author, version, about = "Walk through the Kubernetes API: pods, deployments, services and watches")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// (optional) absolute path to the kubeconfig file
    #[arg(long, value_name = "PATH", global = true)]
    pub kubeconfig: Option<PathBuf>,

    /// Namespace for the deployment and service walkthroughs
    #[arg(short, long, global = true)]
    pub namespace: Option<String>,

    /// Do not pause between steps
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Print Deployment and Service events while the walkthrough runs
    #[arg(short, long, global = true)]
    pub watch: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List all pods, then look up a single pod
    Pods {
        /// Namespace of the pod to look up
        #[arg(long)]
        pod_namespace: Option<String>,

        /// Name of the pod to look up
        #[arg(long)]
        pod_name: Option<String>,
    },

    /// Create, update, list and delete a Deployment built in code
    Deployment,

    /// Create, update and delete a Deployment and a Service read from manifests
    Manifests {
        /// Deployment manifest (JSON or YAML)
        #[arg(long, value_name = "FILE")]
        deployment_file: Option<PathBuf>,

        /// Service manifest (JSON or YAML)
        #[arg(long, value_name = "FILE")]
        service_file: Option<PathBuf>,

        /// NodePort to set on the Service's first port
        #[arg(long)]
        node_port: Option<i32>,
    },

    /// Watch Deployments and Services until interrupted
    Watch,

    /// Run the pods, deployment and manifests walkthroughs in order
    All,
}

impl Args {
    /// Scenarios selected by the subcommand; `pods` when none is given
    pub fn scenarios(&self) -> Vec<Scenario> {
        match self.command {
            None | Some(Command::Pods { .. }) => vec![Scenario::Pods],
            Some(Command::Deployment) => vec![Scenario::Deployment],
            Some(Command::Manifests { .. }) => vec![Scenario::Manifests],
            Some(Command::Watch) => vec![Scenario::Watch],
            Some(Command::All) => {
                vec![Scenario::Pods, Scenario::Deployment, Scenario::Manifests]
            }
        }
    }

    /// Layer command-line flags over the loaded settings
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(path) = &self.kubeconfig {
            settings.kubeconfig = Some(path.clone());
        }
        if let Some(ns) = &self.namespace {
            settings.namespace = ns.clone();
        }
        if self.yes {
            settings.assume_yes = true;
        }

        match &self.command {
            Some(Command::Pods {
                pod_namespace,
                pod_name,
            }) => {
                if let Some(ns) = pod_namespace {
                    settings.pod_namespace = ns.clone();
                }
                if let Some(name) = pod_name {
                    settings.pod_name = name.clone();
                }
            }
            Some(Command::Manifests {
                deployment_file,
                service_file,
                node_port,
            }) => {
                if let Some(path) = deployment_file {
                    settings.deployment_manifest = path.clone();
                }
                if let Some(path) = service_file {
                    settings.service_manifest = path.clone();
                }
                if let Some(port) = node_port {
                    settings.node_port = *port;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_pods() {
        let args = Args::parse_from(["kubedemo"]);
        assert!(args.command.is_none());
        assert_eq!(args.scenarios(), vec![Scenario::Pods]);
    }

    #[test]
    fn test_all_runs_three_walkthroughs() {
        let args = Args::parse_from(["kubedemo", "all"]);
        assert_eq!(
            args.scenarios(),
            vec![Scenario::Pods, Scenario::Deployment, Scenario::Manifests]
        );
    }

    #[test]
    fn test_flags_override_settings() {
        let args = Args::parse_from([
            "kubedemo",
            "manifests",
            "--kubeconfig",
            "/tmp/kubeconfig",
            "-n",
            "demo",
            "-y",
            "--service-file",
            "svc.yaml",
            "--node-port",
            "30080",
        ]);
        let mut settings = Settings::default();
        args.apply_to(&mut settings);

        assert_eq!(settings.kubeconfig, Some(PathBuf::from("/tmp/kubeconfig")));
        assert_eq!(settings.namespace, "demo");
        assert!(settings.assume_yes);
        assert_eq!(settings.service_manifest, PathBuf::from("svc.yaml"));
        assert_eq!(settings.deployment_manifest, PathBuf::from("demo-deploy.json"));
        assert_eq!(settings.node_port, 30080);
    }

    #[test]
    fn test_pod_lookup_flags() {
        let args = Args::parse_from([
            "kubedemo",
            "pods",
            "--pod-namespace",
            "monitoring",
            "--pod-name",
            "prometheus-0",
        ]);
        let mut settings = Settings::default();
        args.apply_to(&mut settings);

        assert_eq!(settings.pod_namespace, "monitoring");
        assert_eq!(settings.pod_name, "prometheus-0");
    }
}
