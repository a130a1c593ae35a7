use std::path::PathBuf;

use benchfire::{Bench, BenchConfig, BENCH_CONFIG_NAME};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Benchfire benchmark configuration viewer
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the YAML benchmarks file [default: bench.yaml]
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Show the effective spec for this service (namespace/name)
    #[clap(short, long, conflicts_with = "container")]
    service: Option<String>,

    /// Show the effective spec for this container (namespace/pod:container)
    #[clap(long)]
    container: Option<String>,
}

fn print_spec(spec: &BenchConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mode = spec.service_resolution.resolution_mode()?;
    let yaml = serde_yaml::to_string(&spec.redacted())?;
    println!("{yaml}");
    println!("Method: {}", spec.http.method()?);
    println!("Target: {}", spec.http.url());
    println!("Resolution: {mode}");
    Ok(())
}

fn print_summary(bench: &Bench) {
    let benchmarks = &bench.benchmarks;
    println!(
        "Defaults: concurrency={} requests={}",
        benchmarks.defaults.concurrency, benchmarks.defaults.requests
    );

    let mut services: Vec<_> = benchmarks.services.keys().collect();
    services.sort();
    println!("Services: {}", services.len());
    for name in services {
        println!("  {name}");
    }

    let mut containers: Vec<_> = benchmarks.containers.keys().collect();
    containers.sort();
    println!("Containers: {}", containers.len());
    for name in containers {
        println!("  {name}");
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let path = args
        .config
        .unwrap_or_else(|| PathBuf::from(format!("{BENCH_CONFIG_NAME}.yaml")));

    let bench = match Bench::new(&path) {
        Ok(bench) => bench,
        Err(e) => {
            tracing::error!("Failed to read config: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!("Loaded benchmarks from {}", path.display());

    let spec = match (&args.service, &args.container) {
        (Some(name), _) => Some(bench.benchmarks.service_spec(name)),
        (None, Some(name)) => Some(bench.benchmarks.container_spec(name)),
        (None, None) => None,
    };

    match spec {
        Some(spec) => {
            if let Err(e) = print_spec(&spec) {
                tracing::error!("Invalid benchmark spec for {}: {e}", spec.name);
                std::process::exit(1);
            }
        }
        None => print_summary(&bench),
    }
}
