use colored::Colorize;
use marketplace::api;
use marketplace::cli::{self, CLI};
use marketplace::config::AppConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json().flatten_event(true))
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("{}", format!("Application error: {}", e).red());
        std::process::exit(1);
    }
}

async fn run() -> marketplace::errors::Result<()> {
    let config = AppConfig::from_env()?;
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        None | Some("serve") => api::start_http_server(config).await?,
        Some("seed") => {
            CLI::print_header();
            cli::handle_seed_command(&config).await?;
        }
        Some("help") | Some("--help") | Some("-h") => CLI::print_help(),
        Some(other) => {
            CLI::print_error(&format!("Unknown command '{}'.", other));
            CLI::print_help();
        }
    }

    Ok(())
}
