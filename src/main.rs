//! image-serve - On-demand image resizing for S3-compatible object storage.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use image_serve::{
    codec::RasterCodec,
    config::{CheckConfig, Cli, Command, ServeConfig},
    create_s3_client,
    io::S3BlobStore,
    resize::{ResizeService, MAX_RESIZE_SIZE},
    server::{create_router, RouterConfig},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Check(config) => run_check(config).await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let naming = config.naming_config();

    info!("image-serve v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    if let Some(ref endpoint) = config.s3_endpoint {
        info!("  S3 endpoint: {}", endpoint);
    }
    info!("  S3 region: {}", config.s3_region);
    match naming.alter_bucket {
        Some(ref bucket) => info!("  Rendition bucket: {}", bucket),
        None => info!("  Rendition bucket: alter-{{bucket}}"),
    }
    info!("  JPEG quality: {}", config.jpeg_quality);
    info!("  Cache max-age: {}s", config.cache_max_age);

    let s3_client = create_s3_client(config.s3_endpoint.as_deref(), &config.s3_region).await;
    let store = S3BlobStore::new(s3_client);
    let codec = RasterCodec::with_jpeg_quality(config.jpeg_quality);
    let resize_service = ResizeService::new(store, codec, naming);

    let router = create_router(resize_service, build_router_config(&config));

    let addr = config.bind_address();

    info!("");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!("    curl http://{}/v2/<bucket>/<object>", addr);
    info!(
        "    curl http://{}/v2/<bucket>/<object>/=s<1..{}>",
        addr,
        MAX_RESIZE_SIZE - 1
    );
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "image_serve=debug,tower_http=debug"
    } else {
        "image_serve=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_cache_max_age(config.cache_max_age)
        .with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}

// =============================================================================
// Check Command
// =============================================================================

async fn run_check(config: CheckConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    println!("image-serve Configuration Check");
    println!("═══════════════════════════════");
    println!();

    if config.bucket.is_empty() {
        println!("✗ Bucket: not set (use --bucket)");
        return ExitCode::FAILURE;
    }
    println!("✓ Bucket: {}", config.bucket);
    if let Some(ref endpoint) = config.s3_endpoint {
        println!("✓ Endpoint: {}", endpoint);
    }
    println!("✓ Region: {}", config.s3_region);
    println!();

    print!("Testing S3 connection... ");

    let s3_client = create_s3_client(config.s3_endpoint.as_deref(), &config.s3_region).await;

    match s3_client.head_bucket().bucket(&config.bucket).send().await {
        Ok(_) => println!("✓ success"),
        Err(e) => {
            println!("✗ failed");
            println!();
            println!("Error: {}", aws_sdk_s3::error::DisplayErrorContext(&e));
            println!();
            println!("Please check:");
            println!("  - Your AWS credentials are configured correctly");
            println!("  - The bucket '{}' exists and is accessible", config.bucket);
            if config.s3_endpoint.is_some() {
                println!("  - The S3 endpoint is correct and reachable");
            }
            return ExitCode::FAILURE;
        }
    }

    if let Some(ref key) = config.test_object {
        println!();
        print!("Testing object '{}'... ", key);

        match s3_client
            .head_object()
            .bucket(&config.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(result) => {
                println!("✓ found");
                if let Some(size) = result.content_length() {
                    println!("  Size: {} bytes", size);
                }
                if let Some(content_type) = result.content_type() {
                    println!("  Content-Type: {}", content_type);
                }
            }
            Err(_) => {
                println!("✗ not found");
                println!();
                println!("  The object '{}' does not exist in the bucket.", key);
                return ExitCode::FAILURE;
            }
        }
    }

    println!();
    println!("═══════════════════════════════");
    println!("✓ All checks passed!");

    ExitCode::SUCCESS
}
