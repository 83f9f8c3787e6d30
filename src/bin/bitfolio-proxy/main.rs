use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use spdlog::{info, warn};

use bitfolio::config::open_config;
use bitfolio::logger::configure_logger;
use bitfolio::proxy::proxy_run;

const CFG_FILE_NAME: &str = "bitfolio-proxy.toml";

#[derive(Parser, Debug)]
#[command(version, about = "Serves the Feishu Bitable records as a JSON array", long_about = None)]
struct Args {
    /// Config path
    #[arg(short, long)]
    config_path: Option<String>,
}

#[ntex::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config_path = args.config_path.map(PathBuf::from);

    let config = match open_config(config_path, CFG_FILE_NAME, "proxy.log") {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Please run bitfolio-proxy --help");
            return Ok(());
        }
    };

    if let Err(err) = configure_logger(config.log.as_ref()) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    info!("Starting Bitfolio proxy =-=-=-=-=-=-=-=-=-=-=-=-=-=-=-");
    info!("Listening on {}:{}, upstream {}", config.server.address, config.server.port, config.upstream.base_url);

    proxy_run(&config.server, config.upstream).await?;
    Ok(())
}
