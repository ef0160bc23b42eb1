#![deny(clippy::all)]
use color_eyre::eyre::Result;
use gdl_cli::clap::Parser;
use gdl_cli::cli::{Cli, get_servers};
use gdl_cli::progress_bars::IndicatifProgressHandler;
use gdl_core::crawl::{CrawlSummary, Crawler};
use gdl_core::downloader::ImageDownloader;
use gdl_core::processor::GalleryDownloader;
use gdl_core::progress::SharedProgressListener;
use gdl_extractors::prelude::{GalleryExtractor, PageFetcher};
use log::info;
use owo_colors::OwoColorize;
use std::process::exit;
use std::sync::Arc;
use tokio::fs::create_dir_all;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.servers {
        print_servers()
    }

    env_logger::builder().format_timestamp(None).init();
    color_eyre::install()?;

    create_dir_all(&args.output).await?;

    let progress_handler: SharedProgressListener = Arc::new(IndicatifProgressHandler::default());

    let listing = PageFetcher::new(args.server.clone(), args.listing_mode())?;
    let extractor = GalleryExtractor::new(&args.server)?;
    let downloader = ImageDownloader::new(&args.server, Some(progress_handler.clone()))?;
    let processor = GalleryDownloader::new(
        extractor,
        downloader,
        &args.output,
        Some(progress_handler.clone()),
    );

    let offsets = args.offset_store();
    info!(
        "Crawling {} into {} (offset file: {})",
        args.server.pretty_name,
        args.output.display(),
        offsets.path().display()
    );

    let crawler = Crawler::new(
        listing,
        processor,
        offsets,
        args.crawl_options(),
        Some(progress_handler),
    );

    let summary = crawler.run().await;

    print_results(&summary);

    Ok(())
}

fn print_results(summary: &CrawlSummary) {
    let totals = &summary.totals;

    println!(
        "{} {} {}",
        totals.images.downloaded.to_string().bold().blue(),
        "images".bold().blue(),
        "downloaded".bold()
    );

    if totals.images.existing > 0 {
        println!(
            "{} {}",
            totals.images.existing.to_string().bold().green(),
            "images were already in the dataset.".bold().green()
        );
    }

    println!(
        "{} {} {} {}",
        totals.galleries_processed.to_string().bold().blue(),
        "galleries processed over".bold(),
        summary.pages.to_string().bold().blue(),
        "pages".bold()
    );

    if totals.galleries_skipped > 0 {
        println!(
            "{} {}",
            totals.galleries_skipped.to_string().bold().yellow(),
            "galleries had no channel and were skipped.".bold().yellow()
        );
    }

    if totals.galleries_failed > 0 || totals.images.failed > 0 {
        println!(
            "{} {} {} {}",
            totals.galleries_failed.to_string().bold().red(),
            "galleries and".bold().red(),
            totals.images.failed.to_string().bold().red(),
            "images failed.".bold().red()
        );
    }

    println!(
        "{} {} {} {}",
        "Offset advanced from".bold(),
        summary.start_offset.to_string().bold().blue(),
        "to".bold(),
        summary.final_offset.to_string().bold().blue()
    );
}

fn print_servers() {
    println!(
        "{}\n----------------",
        "Available Servers:".underline().bold().blue()
    );

    for (srv, data) in get_servers() {
        println!(
            "{:<16} - {}:\n - {} {}\n - {} {}\n - {} {}\n",
            format!("[{}]", srv),
            data.pretty_name.bold().green(),
            "Base URL:".bold().blue(),
            data.base_url.bold().purple().underline(),
            "Search URL:".bold().blue(),
            data.search_url.bold().purple().underline(),
            "Max Page Limit:".bold().blue(),
            data.max_page_limit.bold().yellow(),
        )
    }

    exit(0)
}
