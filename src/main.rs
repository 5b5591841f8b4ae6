extern crate pretty_env_logger;
#[macro_use] extern crate log;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use std::env;
use std::path::Path;

use kachelmann::render::{render_html, render_text, write_outputs, PageInfo};
use kachelmann::{build_report, kachelmann_precip_24h, Config, KachelmannAPI};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    pretty_env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "-h" || a == "--help") {
        eprintln!("Usage: {} [config.json] [YYYY-MM-DD]", args[0]);
        eprintln!();
        eprintln!("Summarizes the maximum 24 h precipitation forecast by each model run");
        eprintln!("of the previous day. Without a config file the built-in Chisinau");
        eprintln!("setup is used; without a date, today (UTC) is the report date.");
        eprintln!("Set RUST_LOG=info to follow the individual requests.");
        return Ok(());
    }

    let config = Config::load(args.get(1).map(Path::new))?;
    let report_date = match args.get(2) {
        Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("invalid report date: {}", date))?,
        None => Utc::now().date_naive(),
    };

    let legend = kachelmann_precip_24h()?;
    info!("Using legend '{}' with {} colors", legend.name(), legend.len());

    let api = KachelmannAPI::new(&config)?;
    if let Err(e) = api.start_session().await {
        warn!("Could not open session, continuing anyway: {}", e);
    }

    let table = build_report(&api, &config, &legend, report_date).await;

    println!("{}", render_text(&table));

    let page = PageInfo::new(&config, report_date);
    let html = render_html(&table, &legend, &page);
    let (current, archive) = write_outputs(&html, &config, report_date)?;

    println!("Saved report to: {}", current.display());
    println!("Saved archive copy to: {}", archive.display());

    Ok(())
}
