use std::io;

use anyhow::Context;
use clap::Parser;

use voucherdesk_console::args::Args;
use voucherdesk_console::console::Console;
use voucherdesk_infra::{build_services, AppConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    voucherdesk_observability::init_console();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let services = build_services(&config).await?;

    let stdin = io::stdin();
    let mut console = Console::new(services, stdin.lock(), io::stdout(), args.blacklist);
    console.run().await
}
