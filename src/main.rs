use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kubedemo::{
    cli::Args,
    config::Settings,
    demo::{Scenario, Walkthrough},
    k8s::K8sClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so they do not interleave with walkthrough output
    let default_filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut settings = Settings::load()?;
    args.apply_to(&mut settings);
    settings.validate()?;
    tracing::debug!(?settings, "Configuration loaded");

    let k8s = K8sClient::connect(settings.kubeconfig.as_deref(), &settings.namespace).await?;
    let walkthrough = Walkthrough::new(k8s, settings);

    let scenarios = args.scenarios();
    let watchers = if args.watch && !scenarios.contains(&Scenario::Watch) {
        walkthrough.start_watch()
    } else {
        Vec::new()
    };

    for scenario in scenarios {
        walkthrough.run(scenario).await?;
    }

    for handle in watchers {
        handle.abort();
    }

    Ok(())
}
