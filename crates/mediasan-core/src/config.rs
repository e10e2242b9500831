//! Configuration module
//!
//! Settings are read from the environment (optionally seeded from a `.env`
//! file) once at startup and validated before the server binds.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

// Common constants
const SERVER_PORT: u16 = 3000;
const MAX_FILE_SIZE_MB: usize = 5;
const MAX_REQUEST_BODY_MB: usize = 16;
const HTTP_CONCURRENCY_LIMIT: usize = 1024;
const SANITIZED_DIR: &str = "uploads_sanitized";
const UPLOAD_TEMP_DIR: &str = "uploads_temp";
const TRANSCODE_TIMEOUT_SECS: u64 = 120;
const MAX_CONCURRENT_TRANSCODES: usize = 2;
const MAX_IMAGE_DIMENSION: u32 = 16_384;

/// How strictly the detected format must agree with the declared MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeMatchPolicy {
    /// Detected format's MIME type must equal the declared one.
    #[default]
    Exact,
    /// Detected format must belong to the declared category.
    Category,
    /// Any recognized format is accepted regardless of declaration.
    Off,
}

impl FromStr for TypeMatchPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "category" => Ok(Self::Category),
            "off" | "none" => Ok(Self::Off),
            other => Err(anyhow::anyhow!(
                "TYPE_MATCH_POLICY must be one of exact, category, off (got '{}')",
                other
            )),
        }
    }
}

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    pub max_request_body_bytes: usize,
    pub http_concurrency_limit: usize,
    pub log_json: bool,
}

/// Validation and sanitization settings
#[derive(Clone, Debug)]
pub struct SanitizerSettings {
    pub max_file_size_bytes: usize,
    pub type_match_policy: TypeMatchPolicy,
    pub sanitized_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub unique_output_names: bool,
    pub ffmpeg_path: String,
    pub transcode_timeout: Duration,
    pub max_concurrent_transcodes: usize,
    pub max_image_dimension: u32,
    /// Log ffmpeg command lines and output. No behavioral effect.
    pub debug_ffmpeg: bool,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub sanitizer: SanitizerSettings,
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn megabytes(name: &str, mb: usize) -> Result<usize, anyhow::Error> {
    mb.checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("{} is too large", name))
}

fn parse_flag(value: Option<String>, default: bool) -> bool {
    value
        .map(|v| v.trim().to_lowercase())
        .and_then(|v| match v.as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let server_port = match var("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => SERVER_PORT,
        };

        let base = BaseConfig {
            server_port,
            environment,
            max_request_body_bytes: megabytes(
                "MAX_REQUEST_BODY_MB",
                parse_or(var("MAX_REQUEST_BODY_MB"), MAX_REQUEST_BODY_MB),
            )?,
            http_concurrency_limit: parse_or(var("HTTP_CONCURRENCY_LIMIT"), HTTP_CONCURRENCY_LIMIT)
                .max(1),
            log_json: var("LOG_FORMAT")
                .map(|v| v.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        };

        let type_match_policy = match var("TYPE_MATCH_POLICY") {
            Some(policy) => policy.parse()?,
            None => TypeMatchPolicy::default(),
        };

        let sanitizer = SanitizerSettings {
            max_file_size_bytes: megabytes(
                "MAX_FILE_SIZE_MB",
                parse_or(var("MAX_FILE_SIZE_MB"), MAX_FILE_SIZE_MB),
            )?,
            type_match_policy,
            sanitized_dir: var("SANITIZED_DIR")
                .unwrap_or_else(|| SANITIZED_DIR.to_string())
                .into(),
            temp_dir: var("UPLOAD_TEMP_DIR")
                .unwrap_or_else(|| UPLOAD_TEMP_DIR.to_string())
                .into(),
            unique_output_names: parse_flag(var("UNIQUE_OUTPUT_NAMES"), false),
            ffmpeg_path: var("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            transcode_timeout: Duration::from_secs(parse_or(
                var("TRANSCODE_TIMEOUT_SECS"),
                TRANSCODE_TIMEOUT_SECS,
            )),
            max_concurrent_transcodes: parse_or(
                var("MAX_CONCURRENT_TRANSCODES"),
                MAX_CONCURRENT_TRANSCODES,
            ),
            max_image_dimension: parse_or(var("MAX_IMAGE_DIMENSION"), MAX_IMAGE_DIMENSION),
            debug_ffmpeg: parse_flag(var("DEBUG_FFMPEG_ON"), false),
        };

        let config = Config { base, sanitizer };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let s = &self.sanitizer;

        if s.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        // Oversized uploads have to reach the validator to get a SizeExceeded answer.
        if self.base.max_request_body_bytes <= s.max_file_size_bytes {
            return Err(anyhow::anyhow!(
                "MAX_REQUEST_BODY_MB must be larger than MAX_FILE_SIZE_MB"
            ));
        }

        if s.transcode_timeout.is_zero() {
            return Err(anyhow::anyhow!(
                "TRANSCODE_TIMEOUT_SECS must be greater than 0"
            ));
        }

        if s.max_concurrent_transcodes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CONCURRENT_TRANSCODES must be greater than 0"
            ));
        }

        if s.max_image_dimension == 0 {
            return Err(anyhow::anyhow!("MAX_IMAGE_DIMENSION must be greater than 0"));
        }

        if s.ffmpeg_path.trim().is_empty() {
            return Err(anyhow::anyhow!("FFMPEG_PATH must not be empty"));
        }

        if s.sanitized_dir == s.temp_dir {
            return Err(anyhow::anyhow!(
                "SANITIZED_DIR and UPLOAD_TEMP_DIR must be different directories"
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn max_request_body_bytes(&self) -> usize {
        self.base.max_request_body_bytes
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.sanitizer.max_file_size_bytes
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.sanitizer.ffmpeg_path
    }
}
