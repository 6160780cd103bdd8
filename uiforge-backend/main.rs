mod actions;
mod api;
mod config;
mod generation;
mod library;
mod preview;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::Request;
use clap::Parser;
use dotenvy::dotenv;
use sentry::integrations::tower::{NewSentryLayer, SentryHttpLayer};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;
use crate::generation::groq::HttpComponentGenerator;
use crate::generation::{ComponentGenerator, GenerationOptions, GenerationRequest};
use crate::library::file_repository::FileComponentRepository;
use crate::library::repository::ComponentRepository;
use crate::preview::registry::DEFAULT_MAX_PREVIEWS;
use crate::preview::{DocumentOptions, PreviewRegistry, SandboxDocument, SourceSnippet};

#[derive(Parser)]
#[command(name = "uiforge", about = "Generate UI components and preview them in a sandbox")]
enum Cli {
    /// Start the HTTP server (default when no subcommand is given)
    #[command(alias = "run")]
    Serve,
    /// Write the sandbox document for a snippet file
    Render {
        /// Snippet to render (raw model output is fine)
        file: PathBuf,
        /// Output path; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a component from a prompt and print its source
    Generate {
        prompt: String,
        /// Component name to ask for
        #[arg(long)]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    // Default to serve when no subcommand is given, but keep --help and --version.
    let args: Vec<String> = std::env::args().collect();
    let cli = if args.len() <= 1 {
        Cli::Serve
    } else {
        Cli::parse()
    };

    let config = Config::from_env();
    init_tracing();

    match cli {
        Cli::Serve => run_server(config).await,
        Cli::Render { file, out } => {
            render_file(&config, &file, out.as_deref())?;
            Ok(())
        }
        Cli::Generate { prompt, name } => {
            generate_once(&config, prompt, name).await?;
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("uiforge=info,tower_http=warn,hyper=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_tree::HierarchicalLayer::new(2)
                .with_writer(std::io::stderr)
                .with_targets(true)
                .with_bracketed_fields(false),
        )
        .with(sentry::integrations::tracing::layer().event_filter(
            |metadata| match *metadata.level() {
                tracing::Level::ERROR => sentry::integrations::tracing::EventFilter::Event,
                tracing::Level::WARN | tracing::Level::INFO => {
                    sentry::integrations::tracing::EventFilter::Breadcrumb
                }
                _ => sentry::integrations::tracing::EventFilter::Ignore,
            },
        ))
        .init();
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(60))
        .build()
        .context("failed to build HTTP client")
}

fn generator(config: &Config) -> Result<HttpComponentGenerator> {
    Ok(HttpComponentGenerator::new(
        http_client()?,
        config.generation_api_url.clone(),
        config.generation_model.clone(),
        config.groq_api_key.clone(),
    ))
}

async fn run_server(config: Config) -> Result<(), Box<dyn Error>> {
    let _guard = sentry::init((
        config.sentry_dsn.clone().unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some(config.environment.clone().into()),
            send_default_pii: false,
            traces_sample_rate: 0.2,
            enable_logs: true,
            ..Default::default()
        },
    ));

    if config.groq_api_key.is_none() {
        tracing::warn!("GROQ_API_KEY is not set, generation will return the placeholder component");
    }

    let generator: Arc<dyn ComponentGenerator> = Arc::new(generator(&config)?);

    let library: Arc<dyn ComponentRepository> =
        Arc::new(FileComponentRepository::new(&config.data_dir));
    library
        .load_all()
        .await
        .context("failed to load component library")?;

    let previews = Arc::new(PreviewRegistry::new(
        DocumentOptions {
            mount_delay: config.mount_delay(),
        },
        DEFAULT_MAX_PREVIEWS,
    ));

    let app_state = api::AppState {
        generator,
        library,
        previews,
    };

    let app = api::create_app(app_state)
        .layer(SentryHttpLayer::new().enable_transaction())
        .layer(NewSentryLayer::<Request<Body>>::new_from_top());

    let port = config.port;
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(data_dir = %config.data_dir.display(), "listening on http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}

fn render_file(config: &Config, file: &std::path::Path, out: Option<&std::path::Path>) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read snippet: {}", file.display()))?;
    let snippet = SourceSnippet::new(preview::normalize_source(&raw));
    if snippet.is_blank() {
        anyhow::bail!("snippet is empty: {}", file.display());
    }

    let document = SandboxDocument::build(
        &snippet,
        &DocumentOptions {
            mount_delay: config.mount_delay(),
        },
    );
    tracing::info!(
        mount_target = document.mount_target(),
        bytes = document.byte_len(),
        "rendered sandbox document"
    );

    match out {
        Some(path) => std::fs::write(path, document.into_html())
            .with_context(|| format!("failed to write document: {}", path.display()))?,
        None => println!("{}", document.into_html()),
    }
    Ok(())
}

async fn generate_once(config: &Config, prompt: String, name: Option<String>) -> Result<()> {
    let request = GenerationRequest {
        prompt,
        component_name: name,
        options: GenerationOptions::default(),
    };
    let raw = generator(config)?
        .generate(&request)
        .await
        .context("component generation failed")?;
    println!("{}", preview::normalize_source(&raw));
    Ok(())
}
