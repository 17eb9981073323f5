//! NMS Operator
//!
//! Reconciles the SD-Core NMS workload from a stream of triggers:
//! - TLS artifacts, config file and service plan of the NMS container
//! - The operator's NMS admin account and session token
//! - gNB and UPF inventory derived from joined relations
//! - TAC/PLMN configuration published back to gNBs
//!
//! Triggers are read as JSON lines from stdin; outward effects are written as
//! JSON lines to stdout. Logs go to stderr.

mod certificates;
mod config;
mod config_file;
mod controller;
mod error;
mod events;
mod reconcile_helpers;
mod reconciler;
mod secrets;
mod sink;
mod state;
mod status;
#[cfg(test)]
mod test_utils;
mod workload;

use anyhow::Context;
use config::OperatorConfig;
use controller::Controller;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // kube and reqwest both use rustls; pick the provider once for the process
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        info!("rustls crypto provider already installed");
    }

    info!("Starting NMS Operator");

    let config = OperatorConfig::from_env()?;
    info!("Configuration:");
    info!("  NMS URL: {}", config.nms_url);
    info!("  Workload root: {}", config.workload_root.display());
    info!("  Secret namespace: {}", config.secret_namespace);

    let controller = Controller::new(&config)
        .await
        .context("failed to initialize the NMS operator")?;
    controller
        .run(BufReader::new(tokio::io::stdin()))
        .await
        .context("trigger processing stopped")?;

    Ok(())
}
