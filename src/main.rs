//! Flowscribe CLI

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use flowscribe::config::Config;
use flowscribe::record::StoredRecord;
use flowscribe::storage::ArtifactReader;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        usage();
        process::exit(1);
    }

    let target = PathBuf::from(&args[2]);
    let result = match args[1].as_str() {
        "stats" => show_stats(&target),
        "show" => show_artifact(&target),
        "check-config" => check_config(&target),
        command => {
            eprintln!("Unknown command: {command}");
            eprintln!("Run 'flowscribe' for usage information.");
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn usage() {
    eprintln!("Flowscribe v{}", env!("CARGO_PKG_VERSION"));
    eprintln!();
    eprintln!("Usage: flowscribe <command> <path>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  stats <capture-dir>      Artifact counts per host");
    eprintln!("  show <artifact.json>     Summarize one captured record");
    eprintln!("  check-config <file>      Validate a TOML configuration");
}

fn show_stats(dir: &Path) -> Result<()> {
    let reader = ArtifactReader::open(dir)?;
    let summary = reader
        .summary()
        .with_context(|| format!("listing {}", dir.display()))?;

    println!("Capture directory: {}", dir.display());
    println!();
    println!("{:<40} {:>9} {:>9}", "HOST", "REQUESTS", "RESPONSES");
    for host in &summary {
        println!(
            "{:<40} {:>9} {:>9}",
            host.host, host.requests, host.responses
        );
    }

    let requests: usize = summary.iter().map(|h| h.requests).sum();
    let responses: usize = summary.iter().map(|h| h.responses).sum();
    println!();
    println!(
        "{} hosts, {requests} requests, {responses} responses",
        summary.len()
    );
    Ok(())
}

fn show_artifact(path: &Path) -> Result<()> {
    let record = ArtifactReader::load(path)?;

    match &record {
        StoredRecord::Request(request) => {
            println!("{} {}", request.method, request.url);
            println!("  headers: {}", request.headers.len());
            println!(
                "  body: {}",
                request
                    .content
                    .as_ref()
                    .map_or_else(|| "-".to_string(), |c| format!("{} bytes", c.len()))
            );
        }
        StoredRecord::Response(response) => {
            println!(
                "{} {} -> {} {}",
                response.request_method, response.request_url, response.status_code, response.reason
            );
            match response.request_timestamp {
                Some(sent) => println!("  latency: {:.3}s", response.timestamp - sent),
                None => println!("  latency: unknown"),
            }
            println!(
                "  body: {}",
                response
                    .response_content
                    .as_ref()
                    .map_or_else(|| "-".to_string(), |c| format!("{} bytes", c.len()))
            );
        }
    }
    Ok(())
}

fn check_config(path: &Path) -> Result<()> {
    let config = Config::from_file(path)?;
    println!(
        "OK: captures go to {}/{}_<epoch>",
        config.capture.output_dir.display(),
        config.capture.dir_prefix
    );
    Ok(())
}
