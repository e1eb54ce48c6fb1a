//! logfetch CLI
//!
//! Access log fetching for load balancers and CDN distributions.

use clap::Parser;

mod args;
mod run;

use args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Logs go to stderr, records to stdout
    run::init_logging(args.log_level)?;

    let summary = run::execute(args).await?;
    let stats = summary.stats;

    eprintln!();
    eprintln!("Fetch stopped:");
    eprintln!("  Records output:   {}", summary.records);
    eprintln!("  Cycles:           {}", stats.cycles);
    eprintln!("  Objects listed:   {}", stats.objects_listed);
    eprintln!("  Objects too old:  {}", stats.objects_too_old);
    eprintln!("  Downloads:        {}", stats.downloads_succeeded);
    eprintln!("  Failed downloads: {}", stats.downloads_failed);
    eprintln!("  Bytes downloaded: {}", format_bytes(stats.bytes_downloaded));

    if let Some(uptime) = stats.uptime() {
        eprintln!(
            "  Duration:         {:.2}s",
            uptime.num_milliseconds() as f64 / 1000.0
        );
    }

    Ok(())
}

/// Format bytes as human-readable string.
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
