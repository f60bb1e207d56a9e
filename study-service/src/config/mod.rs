use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default ceiling for any single call to a downstream collaborator.
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 60;

/// Default maximum accepted upload size (20MB).
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct StudyConfig {
    pub common: core_config::Config,
    pub provider: ProviderConfig,
    pub extractor: ExtractorConfig,
    pub limits: LimitsConfig,
    pub cors: CorsConfig,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: String,
    /// Model for the lighter capabilities (summary, explanation, flashcards).
    pub fast_model: String,
    /// Model for the heavier capabilities (quiz, study plan).
    pub pro_model: String,
    /// Text-to-speech model for `/speak`.
    pub tts_model: String,
    pub tts_voice: String,
}

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub kind: ExtractorKind,
    pub pdftotext_path: String,
}

#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub upstream_timeout_secs: u64,
    pub max_upload_bytes: usize,
}

impl LimitsConfig {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

/// Allowed CORS origins. Empty means any origin.
#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Mock,
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "Unknown text provider '{}' (expected gemini or mock)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorKind {
    Pdftotext,
    Mock,
}

impl FromStr for ExtractorKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdftotext" => Ok(ExtractorKind::Pdftotext),
            "mock" => Ok(ExtractorKind::Mock),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "Unknown PDF extractor '{}' (expected pdftotext or mock)",
                other
            ))),
        }
    }
}

impl StudyConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let kind: ProviderKind = get_env("STUDY_PROVIDER", Some("gemini"), is_prod)?.parse()?;
        // The key is only mandatory when a real provider is selected.
        let api_key = match kind {
            ProviderKind::Gemini => get_env("GOOGLE_API_KEY", None, is_prod)?,
            ProviderKind::Mock => env::var("GOOGLE_API_KEY").unwrap_or_default(),
        };

        Ok(StudyConfig {
            common: common_config,
            provider: ProviderConfig {
                kind,
                api_key,
                fast_model: get_env("STUDY_FAST_MODEL", Some("gemini-2.0-flash"), is_prod)?,
                pro_model: get_env("STUDY_PRO_MODEL", Some("gemini-2.5-pro"), is_prod)?,
                tts_model: get_env(
                    "STUDY_TTS_MODEL",
                    Some("gemini-2.5-flash-preview-tts"),
                    is_prod,
                )?,
                tts_voice: get_env("STUDY_TTS_VOICE", Some("Kore"), is_prod)?,
            },
            extractor: ExtractorConfig {
                kind: get_env("STUDY_EXTRACTOR", Some("pdftotext"), is_prod)?.parse()?,
                pdftotext_path: get_env("STUDY_PDFTOTEXT_PATH", Some("pdftotext"), is_prod)?,
            },
            limits: LimitsConfig {
                upstream_timeout_secs: parse_env(
                    "STUDY_UPSTREAM_TIMEOUT_SECS",
                    DEFAULT_UPSTREAM_TIMEOUT_SECS,
                )?,
                max_upload_bytes: parse_env("STUDY_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            },
            cors: CorsConfig {
                allowed_origins: env::var("STUDY_CORS_ORIGINS")
                    .map(|v| parse_origins(&v))
                    .unwrap_or_default(),
            },
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty() && *o != "*")
        .map(str::to_string)
        .collect()
}

fn parse_env<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val.trim().parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("{} has an invalid value '{}': {}", key, val, e))
        }),
        Err(_) => Ok(default),
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
