use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use spdlog::{info, warn};

use bitfolio::config::open_config;
use bitfolio::logger::configure_logger;
use bitfolio::server::server_run;

const CFG_FILE_NAME: &str = "bitfolio.toml";

#[derive(Parser, Debug)]
#[command(version, about = "Blog and portfolio site backed by a Feishu Bitable", long_about = None)]
struct Args {
    /// Config path
    #[arg(short, long)]
    config_path: Option<String>,
}

#[ntex::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config_path = args.config_path.map(PathBuf::from);

    let config = match open_config(config_path, CFG_FILE_NAME, "site.log") {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Please run bitfolio --help");
            return Ok(());
        }
    };

    if let Err(err) = configure_logger(config.log.as_ref()) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    let site = config.site.as_ref().ok_or_else(|| anyhow!("Missing [site] section"))?;

    info!("Starting Bitfolio =-=-=-=-=-=-=-=-=-=-=-=-=-=-=-");
    info!("Listening on {}:{}", config.server.address, config.server.port);

    server_run(&config.server, site, config.fields.clone()).await?;
    Ok(())
}
