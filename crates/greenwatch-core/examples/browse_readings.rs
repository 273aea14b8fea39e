//! Example: Browsing Cached Readings
//!
//! This example fills a mock source with a few days of synthetic readings,
//! then walks the paginated view the way a dashboard would: all days first,
//! then a single day, with page statistics and temperature levels.
//!
//! Run with: `cargo run --example browse_readings -- [DAYS] [PER_DAY]`
//!
//! Set `RUST_LOG=greenwatch_core=debug` to see fetch and cache events.

use std::env;

use greenwatch_core::{MockSource, PageState, ReadingView, ViewOutcome};
use tracing_subscriber::EnvFilter;

fn print_page(page: &PageState) {
    match page.display_range() {
        Some((from, to)) => println!(
            "  Page {}/{} (readings {}-{} of {})",
            page.current_page, page.total_pages, from, to, page.total_items
        ),
        None => println!("  Page 1/1 (no readings)"),
    }
    for reading in &page.visible {
        println!(
            "    {}  {:>5.1} °C  {:>5.1} %",
            reading.timestamp, reading.temperature, reading.humidity
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let days: u32 = args.get(1).map(|s| s.parse()).transpose()?.unwrap_or(3);
    let per_day: usize = args.get(2).map(|s| s.parse()).transpose()?.unwrap_or(8);

    let source = MockSource::builder().synthetic(days, per_day).build();
    let view = ReadingView::new(source);

    println!("Fetching readings...");
    let outcome = view.refresh().await;
    if outcome != ViewOutcome::Ok {
        eprintln!("Nothing to show: {}", outcome);
        std::process::exit(1);
    }

    let index = view.day_index();
    println!();
    println!("Cached days:");
    for day in &index {
        let marker = if view.is_today(*day) { " (today)" } else { "" };
        println!("  {}  {} readings{}", day, view.day_count(*day), marker);
    }

    // Every day, page by page
    println!();
    println!("All days:");
    let mut page = view.page_state();
    loop {
        print_page(&page);
        if let (Some(stats), Some(level)) = (view.page_stats(), view.page_level()) {
            println!(
                "    mean {:.1} °C / {:.1} %  -> {}",
                stats.mean_temperature,
                stats.mean_humidity,
                level.description()
            );
        }
        if !page.has_next() {
            break;
        }
        page = view.next_page();
    }

    // A single day
    if let Some(oldest) = index.last() {
        println!();
        println!("Only {}:", oldest);
        let outcome = view.set_filter(Some(*oldest)).await;
        println!("  Outcome: {}", outcome);
        print_page(&view.page_state());
        if let Some(trend) = view.trend() {
            println!("  Trend points: {}", trend.len());
        }
    }

    view.clear_filter().await;

    let stats = view.fetch_stats();
    println!();
    println!("Fetch statistics:");
    println!("  Started:   {}", stats.started);
    println!("  Succeeded: {}", stats.successes);
    println!("  Failed:    {}", stats.failures);
    println!("  Joined:    {}", stats.joined);
    println!("  Source fetches: {}", view.source().fetch_count());

    Ok(())
}
