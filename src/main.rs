use clap::Parser;
use jobserve_scraper::browser::ChromeLauncher;
use jobserve_scraper::jobserve::{self, JsonFileSink};
use jobserve_scraper::Scrape;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;

/// Scrape JobServe search results into a JSON file.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Search results page to start from
    #[arg(long, env = "JOBSERVE_BASE_URL", default_value = jobserve::BASE_URL)]
    base_url: String,

    #[arg(short, long, default_value = "jobserve_jobs.json")]
    output: PathBuf,

    /// Seconds allowed for the initial page load
    #[arg(long, default_value_t = 60)]
    navigation_timeout: u64,

    /// Seconds allowed for the network to settle after each click
    #[arg(long, default_value_t = 30)]
    idle_timeout: u64,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Chrome or Chromium executable
    #[arg(long)]
    chrome: Option<PathBuf>,

    /// Also print the scraped jobs document to stdout
    #[arg(long)]
    print: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL")
                .unwrap_or_else(|_| "info,chromiumoxide=warn,tungstenite=warn".into()),
        )
        .with(ErrorLayer::default())
        .init();

    let args = Args::parse();

    let launcher = ChromeLauncher {
        headless: !args.headed,
        chrome: args.chrome,
        request_timeout: Duration::from_secs(args.navigation_timeout),
    };
    let sink = JsonFileSink::new(&args.output);
    let scrape = Scrape {
        navigation_timeout: Duration::from_secs(args.navigation_timeout),
        idle_timeout: Duration::from_secs(args.idle_timeout),
        ..Scrape::new(args.base_url, jobserve::listing_layout())
    };

    let report = scrape.run(&launcher, &sink).await?;

    if args.print {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&JsonFileSink::render(&report.jobs)?)?;
        writeln!(stdout)?;
    }

    println!("Scraping complete. Total jobs scraped: {}", report.jobs.len());
    println!("Output saved to {}", sink.path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_the_documented_run() {
        let args = Args::try_parse_from(["jobserve-scraper"]).unwrap();
        assert_eq!(args.output, PathBuf::from("jobserve_jobs.json"));
        assert_eq!(args.navigation_timeout, 60);
        assert_eq!(args.idle_timeout, 30);
        assert!(!args.headed);
        assert!(!args.print);
    }

    #[test]
    fn print_flag_is_opt_in() {
        let args = Args::try_parse_from(["jobserve-scraper", "--print", "-o", "out.json"]).unwrap();
        assert!(args.print);
        assert_eq!(args.output, PathBuf::from("out.json"));
    }
}
