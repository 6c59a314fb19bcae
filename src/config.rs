//! Configuration management for the image server.
//!
//! This module provides a configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `IMAGESERVE_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use image_serve::config::{Cli, Command};
//!
//! match Cli::parse().into_command() {
//!     Command::Serve(config) => println!("Listening on {}", config.bind_address()),
//!     Command::Check(config) => println!("Checking bucket {}", config.bucket),
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `IMAGESERVE_HOST` - Server bind address (default: 0.0.0.0)
//! - `IMAGESERVE_PORT` - Server port (default: 8080)
//! - `IMAGESERVE_S3_ENDPOINT` - Custom endpoint for S3-compatible services
//! - `IMAGESERVE_S3_REGION` - AWS region (default: us-east-1)
//! - `IMAGESERVE_ALTER_BUCKET` - Single bucket for all resized renditions
//! - `IMAGESERVE_CACHE_MAX_AGE` - HTTP cache max-age seconds (default: 3600)
//! - `IMAGESERVE_JPEG_QUALITY` - JPEG quality for renditions (default: 80)
//! - `IMAGESERVE_CORS_ORIGINS` - Comma-separated allowed CORS origins

use clap::{Args, Parser, Subcommand};

use crate::codec::{is_valid_quality, DEFAULT_JPEG_QUALITY};
use crate::resize::NamingConfig;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default HTTP cache max-age in seconds (1 hour).
pub const DEFAULT_CACHE_MAX_AGE: u32 = 3600;

// =============================================================================
// CLI Arguments
// =============================================================================

/// image-serve - On-demand image resizing for S3-compatible object storage.
///
/// Serves originals and resized renditions of images. Renditions are
/// computed on first request and stored back to the object store.
#[derive(Parser, Debug, Clone)]
#[command(name = "image-serve")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Server flags used when no subcommand is given
    #[command(flatten)]
    pub serve: ServeConfig,
}

impl Cli {
    /// Resolve the command to run; bare flags mean `serve`.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve(self.serve))
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve(ServeConfig),

    /// Verify object store connectivity and exit
    Check(CheckConfig),
}

// =============================================================================
// Serve Configuration
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "IMAGESERVE_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "IMAGESERVE_PORT")]
    pub port: u16,

    // =========================================================================
    // S3 Configuration
    // =========================================================================
    /// Custom S3 endpoint URL for S3-compatible services (MinIO, etc.).
    ///
    /// If not specified, uses the default AWS S3 endpoint.
    #[arg(long, env = "IMAGESERVE_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region for S3.
    #[arg(long, default_value = DEFAULT_REGION, env = "IMAGESERVE_S3_REGION")]
    pub s3_region: String,

    // =========================================================================
    // Rendition Configuration
    // =========================================================================
    /// Store every rendition in this bucket instead of `alter-{bucket}`.
    ///
    /// Keys do not include the source bucket, so the same key resized to
    /// the same size from two source buckets maps to one object.
    #[arg(long, env = "IMAGESERVE_ALTER_BUCKET")]
    pub alter_bucket: Option<String>,

    /// JPEG quality for resized JPEG renditions (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, env = "IMAGESERVE_JPEG_QUALITY")]
    pub jpeg_quality: u8,

    /// HTTP Cache-Control max-age in seconds (0 disables the header).
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "IMAGESERVE_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "IMAGESERVE_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !is_valid_quality(self.jpeg_quality) {
            return Err("jpeg_quality must be between 1 and 100".to_string());
        }

        if let Some(bucket) = &self.alter_bucket {
            if bucket.trim().is_empty() {
                return Err(
                    "alter_bucket must not be empty. Unset IMAGESERVE_ALTER_BUCKET to use \
                     the alter-{bucket} naming"
                        .to_string(),
                );
            }
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Rendition naming derived from `alter_bucket`.
    pub fn naming_config(&self) -> NamingConfig {
        match &self.alter_bucket {
            Some(bucket) => NamingConfig::with_alter_bucket(bucket),
            None => NamingConfig::new(),
        }
    }
}

// =============================================================================
// Check Configuration
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    /// Custom S3 endpoint URL for S3-compatible services.
    #[arg(long, env = "IMAGESERVE_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region for S3.
    #[arg(long, default_value = DEFAULT_REGION, env = "IMAGESERVE_S3_REGION")]
    pub s3_region: String,

    /// Bucket to check.
    #[arg(long, env = "IMAGESERVE_CHECK_BUCKET")]
    pub bucket: String,

    /// Object key that must exist in the bucket.
    #[arg(long)]
    pub test_object: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

// =============================================================================
// Tests
// =============================================================================
