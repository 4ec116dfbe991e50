mod cli;
mod config;
mod error;
mod fallback;
mod model;
mod normalize;
mod output;
mod resolve;
mod sanity;
mod source;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, Format, Section};
use config::{AppConfig, Overrides};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::CatalogError;
use crate::fallback::FallbackCatalog;
use crate::model::{Product, ProductKey};
use crate::resolve::{ProductView, Resolution, Resolver, ViewState};
use crate::sanity::client::SanityClient;
use crate::sanity::image::ImageUrlBuilder;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "cycle_catalog=debug"
    } else {
        "cycle_catalog=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load(Overrides {
        project_id: cli.project,
        dataset: cli.dataset,
        api_version: cli.api_version,
        no_cdn: cli.no_cdn,
        timeout_ms: cli.timeout_ms,
    })?;

    ctrlc::set_handler(|| {
        eprintln!("\nInterrupted.");
        std::process::exit(130);
    })
    .context("Failed to set Ctrl+C handler")?;

    let resolver = Arc::new(build_resolver(&config)?);

    match cli.command {
        Commands::Product {
            identifier,
            slug,
            section,
        } => cmd_product(resolver, &identifier, slug, section, cli.format).await,
        Commands::List => cmd_list(&resolver, cli.format).await,
        Commands::Browse { slug } => cmd_browse(resolver, slug, cli.format).await,
    }
}

fn build_resolver(config: &AppConfig) -> Result<Resolver<SanityClient>> {
    let client = SanityClient::new(&config.sanity, config.timeout)
        .context("Failed to create content store client")?;
    let images = ImageUrlBuilder::new(&config.sanity.project_id, &config.sanity.dataset);
    Ok(Resolver::new(
        client,
        images,
        FallbackCatalog::builtin(),
        config.timeout,
    ))
}

async fn cmd_product(
    resolver: Arc<Resolver<SanityClient>>,
    identifier: &str,
    by_slug: bool,
    section: Option<Section>,
    format: Format,
) -> Result<ExitCode> {
    let key = parse_product_key(identifier, by_slug)?;

    let mut view = ProductView::new(resolver);
    view.request(key);
    let state = view.settled().await;

    print!("{}", render_state(&state, section, format)?);
    Ok(match state.resolution {
        Resolution::Resolved(_) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

async fn cmd_list(resolver: &Resolver<SanityClient>, format: Format) -> Result<ExitCode> {
    let (products, origin) = resolver.list().await;
    tracing::debug!("Listing {} products from {:?}", products.len(), origin);

    match format {
        Format::Markdown => print!("{}", output::format_product_list(&products)),
        Format::Json => println!("{}", serde_json::to_string_pretty(&products)?),
    }
    Ok(ExitCode::SUCCESS)
}

/// Each stdin line is a new identifier for the same view. Only states for
/// the most recent identifier are ever printed.
async fn cmd_browse(
    resolver: Arc<Resolver<SanityClient>>,
    by_slug: bool,
    format: Format,
) -> Result<ExitCode> {
    let mut view = ProductView::new(resolver);
    let mut rx = view.subscribe();

    let printer = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            if state.key.is_none() || state.resolution.is_loading() {
                continue;
            }
            match render_state(&state, None, format) {
                Ok(text) => println!("{}", text),
                Err(e) => tracing::warn!("Failed to render product: {}", e),
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut requested = false;
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_product_key(line, by_slug) {
            Ok(key) => {
                view.request(key);
                requested = true;
            }
            Err(e) => eprintln!("{}", e),
        }
    }

    if requested {
        view.settled().await;
    }
    drop(view);
    if let Err(e) = printer.await {
        tracing::warn!("Printer task failed: {}", e);
    }
    Ok(ExitCode::SUCCESS)
}

fn render_state(state: &ViewState, section: Option<Section>, format: Format) -> Result<String> {
    let key = state
        .key
        .as_ref()
        .context("No product has been requested")?;
    let text = match (&state.resolution, format) {
        (Resolution::Resolved(product), Format::Markdown) => {
            output::format_product_detail(product, section)
        }
        (Resolution::Resolved(product), Format::Json) => product_json(product)?,
        (_, Format::Markdown) => output::format_not_found(key),
        (_, Format::Json) => {
            let body = serde_json::json!({ "found": false, "key": key.as_str() });
            format!("{}\n", serde_json::to_string_pretty(&body)?)
        }
    };
    Ok(text)
}

fn product_json(product: &Product) -> Result<String> {
    Ok(format!("{}\n", serde_json::to_string_pretty(product)?))
}

/// Accepts a bare id/slug or a storefront URL ending in `/products/<id>`.
fn parse_product_key(input: &str, by_slug: bool) -> Result<ProductKey, CatalogError> {
    let trimmed = input.trim();
    let value = match trimmed.split_once("/products/") {
        Some((_, rest)) => rest
            .split(['/', '?', '#'])
            .find(|s| !s.is_empty())
            .unwrap_or(""),
        None => trimmed,
    };

    if value.is_empty() {
        return Err(CatalogError::InvalidIdentifier(format!(
            "'{}'. Use a product id, a slug with --slug, or a URL ending in /products/<id>",
            input
        )));
    }

    Ok(if by_slug {
        ProductKey::Slug(value.to_string())
    } else {
        ProductKey::Id(value.to_string())
    })
}
