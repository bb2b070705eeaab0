use capt_operator::{config::OperatorConfig, init_tracing, runtime};
use clap::Command;
use envconfig::Envconfig;
use tracing::info;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing("info");

    let _matches = Command::new("capt-operator")
        .about("Ticket-backed Cluster API infrastructure provider")
        .version("0.1.0")
        .get_matches();

    let cfg = OperatorConfig::init_from_env()?;
    info!(?cfg, "Starting capt operator");

    runtime::run(cfg).await
}
