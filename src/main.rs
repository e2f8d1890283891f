use std::path::PathBuf;

use anyhow::Context;
use clap::Arg;
use tracing_subscriber::EnvFilter;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // Parse CLI arguments
    let matches = clap::Command::new("Formwright")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("CONFIG")
                .help("Path to a YAML file with form settings"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Address to bind")
                .default_value(DEFAULT_HOST),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .env("FORMWRIGHT_PORT")
                .value_parser(clap::value_parser!(u16))
                .help("Port to listen on"),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").map(PathBuf::from);
    let host = matches
        .get_one::<String>("host")
        .map(|h| h.as_str())
        .unwrap_or(DEFAULT_HOST);
    let port = matches.get_one::<u16>("port").copied().unwrap_or(DEFAULT_PORT);

    let settings = formwright::config::load_settings(config_path.as_deref())?;
    let app = formwright::create_router(settings)?;

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(%addr, "formwright listening");
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
