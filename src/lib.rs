pub mod browser;
pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod platforms;

use clap::Parser;
use cli::{Cli, Commands};
use log::error;
use std::process::ExitCode;

pub async fn run() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => match commands::publish::run(&args).await {
            Ok(report) => commands::publish::render_report(&report, args.json).map(|out| {
                println!("{}", out);
            }),
            Err(e) => Err(e),
        },
        Commands::Open(args) => commands::chrome::open(&args).await,
        Commands::DetectChrome => {
            let status = commands::chrome::detect_chrome();
            serde_json::to_string_pretty(&status)
                .map(|out| println!("{}", out))
                .map_err(anyhow::Error::from)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
