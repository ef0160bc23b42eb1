#![deny(clippy::all)]
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use color_eyre::owo_colors::OwoColorize;
use gdl_review::dataset::Dataset;
use gdl_review::records::RecordStore;
use gdl_review::server::{ReviewState, routes};
use log::{info, warn};

#[derive(Parser, Debug)]
#[clap(name = "Gallery Dataset Review", author, version, about, long_about = None)]
struct Args {
    /// Directory with the scraped images and their captions
    #[clap(long, value_name = "PATH", default_value = "dataset")]
    dataset: PathBuf,

    /// Where confirmed images and edited captions are copied to
    #[clap(long, value_name = "PATH", default_value = "refined")]
    refined: PathBuf,

    /// JSON file keeping every confirm/skip decision
    #[clap(long, value_name = "FILE", default_value = "processed.json")]
    processed: PathBuf,

    /// Address to listen on
    #[clap(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on
    #[clap(short, long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::builder().format_timestamp(None).init();
    color_eyre::install()?;

    if !args.dataset.is_dir() {
        warn!(
            "Dataset directory {} does not exist yet",
            args.dataset.display()
        );
    }

    let state = Arc::new(ReviewState {
        dataset: Dataset::new(&args.dataset),
        refined_dir: args.refined.clone(),
        records: RecordStore::load(&args.processed).await,
    });

    let (addr, server) = warp::serve(routes(state))
        .try_bind_ephemeral((args.host, args.port))
        .wrap_err_with(|| format!("Failed to bind {}:{}", args.host, args.port))?;

    info!("Reviewing {}", args.dataset.display());
    println!(
        "{} {}",
        "Review server listening on".bold(),
        format!("http://{addr}").bold().blue().underline()
    );

    server.await;

    Ok(())
}
