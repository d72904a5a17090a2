//! Configuration module
//!
//! Configuration is an explicit value: the binary that embeds the pipeline builds a
//! [`Config`] once (usually from the environment) and hands the relevant parts to each
//! component. Tests construct [`PipelineConfig`] directly with their own roots.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_VIDEO_EXTENSIONS, HLS_SEGMENT_SECONDS, MAX_UPLOAD_BYTES, THUMBNAIL_OFFSET_SECONDS,
    THUMBNAIL_WIDTH,
};

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_CONCURRENT_TRANSCODES: usize = 2;

/// Settings consumed by the ingestion pipeline itself
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Root for raw uploads (`<id>_<filename>`).
    pub storage_root: PathBuf,
    /// Root for transcoded output (one directory per upload).
    pub output_root: PathBuf,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub segment_duration_secs: u64,
    pub thumbnail_offset_secs: u64,
    pub thumbnail_width: u32,
    pub max_upload_bytes: u64,
    pub allowed_extensions: Vec<String>,
    /// Leave the raw upload and output directory on disk after the run (debugging only).
    pub keep_local_artifacts: bool,
    /// Upper bound on concurrently running ffmpeg/ffprobe processes.
    pub max_concurrent_transcodes: usize,
}

/// Remote blob storage settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible providers (MinIO, DigitalOcean Spaces, etc.)
    pub endpoint: Option<String>,
    /// Overrides the public URL base for uploaded artifacts.
    pub public_base_url: Option<String>,
}

/// Catalog database settings
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_seconds: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(anyhow::anyhow!("Invalid log format: {}", s)),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
    pub environment: String,
    pub log_format: LogFormat,
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .to_lowercase()
        .parse()
        .unwrap_or(default)
}

/// `None` when the size does not fit in a `u64` byte count.
fn megabytes_to_bytes(mb: u64) -> Option<u64> {
    mb.checked_mul(1024 * 1024)
}

/// Build a connection string from discrete Postgres settings.
pub fn build_postgres_url(host: &str, port: &str, user: &str, password: &str, dbname: &str) -> String {
    format!("postgres://{}:{}@{}:{}/{}", user, password, host, port, dbname)
}

impl PipelineConfig {
    /// Defaults for everything except the two storage roots.
    pub fn new(storage_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: storage_root.into(),
            output_root: output_root.into(),
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            segment_duration_secs: HLS_SEGMENT_SECONDS,
            thumbnail_offset_secs: THUMBNAIL_OFFSET_SECONDS,
            thumbnail_width: THUMBNAIL_WIDTH,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            allowed_extensions: DEFAULT_VIDEO_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            keep_local_artifacts: false,
            max_concurrent_transcodes: MAX_CONCURRENT_TRANSCODES,
        }
    }

    pub fn from_env() -> Self {
        let defaults = Self::new(
            env::var("LOCAL_STORAGE_PATH").unwrap_or_else(|_| "static/videos".to_string()),
            env::var("OUTPUT_STORAGE_PATH").unwrap_or_else(|_| "static/temp".to_string()),
        );

        let max_upload_bytes = env::var("MAX_VIDEO_SIZE_MB")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .and_then(megabytes_to_bytes)
            .unwrap_or(defaults.max_upload_bytes);

        Self {
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or(defaults.ffmpeg_path),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or(defaults.ffprobe_path),
            segment_duration_secs: env::var("HLS_SEGMENT_DURATION")
                .unwrap_or_else(|_| HLS_SEGMENT_SECONDS.to_string())
                .parse()
                .unwrap_or(HLS_SEGMENT_SECONDS),
            thumbnail_offset_secs: env::var("THUMBNAIL_OFFSET_SECS")
                .unwrap_or_else(|_| THUMBNAIL_OFFSET_SECONDS.to_string())
                .parse()
                .unwrap_or(THUMBNAIL_OFFSET_SECONDS),
            thumbnail_width: env::var("THUMBNAIL_WIDTH")
                .unwrap_or_else(|_| THUMBNAIL_WIDTH.to_string())
                .parse()
                .unwrap_or(THUMBNAIL_WIDTH),
            max_upload_bytes,
            allowed_extensions: env::var("VIDEO_ALLOWED_EXTENSIONS")
                .map(|s| parse_list(&s))
                .unwrap_or(defaults.allowed_extensions),
            keep_local_artifacts: env_flag("KEEP_LOCAL_ARTIFACTS", false),
            max_concurrent_transcodes: env::var("MAX_CONCURRENT_TRANSCODES")
                .unwrap_or_else(|_| MAX_CONCURRENT_TRANSCODES.to_string())
                .parse()
                .unwrap_or(MAX_CONCURRENT_TRANSCODES),
            ..defaults
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.storage_root == self.output_root {
            return Err(anyhow::anyhow!(
                "LOCAL_STORAGE_PATH and OUTPUT_STORAGE_PATH must be different directories"
            ));
        }

        if self.segment_duration_secs == 0 {
            return Err(anyhow::anyhow!("HLS_SEGMENT_DURATION must be greater than 0"));
        }

        if self.thumbnail_width == 0 {
            return Err(anyhow::anyhow!("THUMBNAIL_WIDTH must be greater than 0"));
        }

        if self.max_concurrent_transcodes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CONCURRENT_TRANSCODES must be greater than 0"
            ));
        }

        if self.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!(
                "VIDEO_ALLOWED_EXTENSIONS must list at least one extension"
            ));
        }

        Ok(())
    }
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Ok(Self {
            bucket: env::var("S3_BUCKET")
                .or_else(|_| env::var("AWS_BUCKET_NAME"))
                .map_err(|_| anyhow::anyhow!("S3_BUCKET or AWS_BUCKET_NAME must be set"))?,
            region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok()
                .filter(|s| !s.is_empty()),
            endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
            public_base_url: env::var("S3_PUBLIC_BASE_URL").ok().filter(|s| !s.is_empty()),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.bucket.trim().is_empty() {
            return Err(anyhow::anyhow!("S3_BUCKET must not be empty"));
        }

        if self.region.is_none() && self.endpoint.is_none() {
            return Err(anyhow::anyhow!(
                "S3_REGION or AWS_REGION must be set when no S3_ENDPOINT is configured"
            ));
        }

        Ok(())
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        let url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            build_postgres_url(
                &env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string()),
                &env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".to_string()),
                &env::var("POSTGRES_USER").unwrap_or_else(|_| "postgres".to_string()),
                &env::var("POSTGRES_PASSWORD").unwrap_or_else(|_| "postgres".to_string()),
                &env::var("POSTGRES_DBNAME").unwrap_or_else(|_| "streamvault".to_string()),
            )
        });

        Self {
            url,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.url.starts_with("postgres://") || self.url.starts_with("postgresql://")) {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.max_connections == 0 {
            return Err(anyhow::anyhow!("DB_MAX_CONNECTIONS must be greater than 0"));
        }

        Ok(())
    }
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let log_format = env::var("LOG_FORMAT")
            .ok()
            .map(|s| s.parse())
            .transpose()?
            .unwrap_or(LogFormat::Pretty);

        let config = Config {
            pipeline: PipelineConfig::from_env(),
            storage: StorageConfig::from_env()?,
            database: DatabaseConfig::from_env(),
            environment,
            log_format,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.pipeline.validate()?;
        self.storage.validate()?;
        self.database.validate()?;

        if self.is_production() && self.pipeline.keep_local_artifacts {
            return Err(anyhow::anyhow!(
                "KEEP_LOCAL_ARTIFACTS cannot be enabled in production"
            ));
        }

        Ok(())
    }
}
