use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use us_county_atlas::{
    audit, config, fetch::ResourceFetcher, filename, server,
    surface::{DetailPanel, SessionPanel, SessionSurface},
    types::LayerId,
    view::ViewController,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the interactive county map
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Run the click pipeline for one county and print the panel markup
    Show {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        /// Five-digit county identifier, e.g. 06037
        id: String,
    },
    /// Print the name-based record filename for a county
    Filename {
        /// County display name, e.g. "Orleans Parish"
        name: String,
        /// State identifier, e.g. louisiana
        state: String,
    },
    /// Report boundaries without a state code or without a record
    Audit {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let http = reqwest::Client::new();

    match &cli.command {
        Commands::Serve { config } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            server::start_server(app_config, http).await?;
        }
        Commands::Show { config, id } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            let fetcher = Arc::new(ResourceFetcher::new(
                app_config.input.records_location(),
                http.clone(),
            ));
            let mut view =
                ViewController::new(SessionSurface::default(), SessionPanel::default(), fetcher);
            view.load_boundaries(&app_config.input.topology_location(), &http)
                .await;

            let layer = view
                .boundaries()
                .iter()
                .position(|b| b.id.as_deref() == Some(id.as_str()))
                .map(LayerId)
                .ok_or_else(|| anyhow!("No boundary with id {}", id))?;

            let rendered = view
                .on_boundary_click(layer)
                .await
                .with_context(|| format!("County {} cannot be selected", id))?;
            if !rendered {
                return Err(anyhow!("No record could be loaded for county {}", id));
            }
            println!("{}", view.panel().markup());
        }
        Commands::Filename { name, state } => {
            println!("{}", filename::derive_filename(name, state));
        }
        Commands::Audit { config } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            let boundaries = us_county_atlas::data::load_boundaries(
                &app_config.input.topology_location(),
                &http,
            )
            .await?;
            let report = audit::audit_records(&boundaries, &app_config.input.records_location()).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
