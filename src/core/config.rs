use std::{env, fs, path::PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

const DEFAULT_CORS_ORIGINS: &[&str] =
    &["http://localhost:5173", "http://localhost:3000", "http://localhost:8080"];

const DEFAULT_JUDGE_BASE_URL: &str = "https://judge0-ce.p.rapidapi.com";
const DEFAULT_RAPIDAPI_HOST: &str = "judge0-ce.p.rapidapi.com";

/// Judge0 CE ids: C, C++, Go, Java, JavaScript, Python 3.
const DEFAULT_ALLOWED_LANGUAGES: &[i32] = &[50, 54, 60, 62, 63, 71];

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    server: ServerSettings,
    runtime: RuntimeSettings,
    api: ApiSettings,
    security: SecuritySettings,
    cors: CorsSettings,
    database: DatabaseSettings,
    judge: JudgeSettings,
    grading: GradingSettings,
    telemetry: TelemetrySettings,
}

#[derive(Debug, Clone)]
pub(crate) struct ServerSettings {
    host: ServerHost,
    port: ServerPort,
}

#[derive(Debug, Clone)]
pub(crate) struct ApiSettings {
    pub(crate) project_name: String,
    pub(crate) version: String,
    pub(crate) api_v1_str: String,
}

#[derive(Debug, Clone)]
pub(crate) struct SecuritySettings {
    pub(crate) secret_key: String,
    pub(crate) algorithm: String,
    /// True when `SECRET_KEY` was unset and the key came from the local key file.
    pub(crate) key_generated: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct CorsSettings {
    pub(crate) origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct DatabaseSettings {
    pub(crate) postgres_server: String,
    pub(crate) postgres_port: u16,
    pub(crate) postgres_user: String,
    pub(crate) postgres_password: String,
    pub(crate) postgres_db: String,
    pub(crate) database_url: Option<String>,
    pub(crate) max_connections: u32,
}

#[derive(Debug, Clone)]
pub(crate) struct JudgeSettings {
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    pub(crate) rapidapi_host: String,
    pub(crate) request_timeout_seconds: u64,
    pub(crate) allowed_languages: Vec<i32>,
}

#[derive(Debug, Clone)]
pub(crate) struct GradingSettings {
    pub(crate) grace_period_seconds: i64,
    pub(crate) max_code_bytes: usize,
    pub(crate) zero_score_on_timeout: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct TelemetrySettings {
    pub(crate) log_level: String,
    pub(crate) json: bool,
    pub(crate) prometheus_enabled: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct RuntimeSettings {
    pub(crate) environment: Environment,
    pub(crate) strict_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Environment {
    Development,
    Production,
    Staging,
    Test,
}

impl Environment {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Staging => "staging",
            Environment::Test => "test",
        }
    }

    fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ServerHost(String);

#[derive(Debug, Clone, Copy)]
pub(crate) struct ServerPort(u16);

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("invalid server host: {0}")]
    InvalidHost(String),
    #[error("invalid server port: {0}")]
    InvalidPort(String),
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("invalid cors origins: {0}")]
    InvalidCors(String),
    #[error("missing required secret for {0}")]
    MissingSecret(&'static str),
}

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("PROCODE_HOST", "0.0.0.0");
        let port = env_or_default("PROCODE_PORT", "8000");

        let environment =
            parse_environment(env_optional("PROCODE_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("PROCODE_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Procode Grading API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        let secret_key_configured = env_optional("SECRET_KEY");
        let secret_from_env = secret_key_configured.is_some();
        let secret_key = match secret_key_configured {
            Some(value) => value,
            None => load_or_create_secret_key(),
        };
        let algorithm = env_or_default("ALGORITHM", "HS256");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "procode");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "procode_db");
        let database_url = env_optional("DATABASE_URL");
        let max_connections = parse_u32(
            "DATABASE_MAX_CONNECTIONS",
            env_or_default("DATABASE_MAX_CONNECTIONS", "30"),
        )?;

        let judge_base_url = env_or_default("JUDGE_BASE_URL", DEFAULT_JUDGE_BASE_URL);
        let judge_api_key =
            env_optional("JUDGE_API_KEY").or_else(|| env_optional("JUDGE0_API")).unwrap_or_default();
        let rapidapi_host = env_or_default("JUDGE_RAPIDAPI_HOST", DEFAULT_RAPIDAPI_HOST);
        let request_timeout_seconds = parse_u64(
            "JUDGE_REQUEST_TIMEOUT_SECONDS",
            env_or_default("JUDGE_REQUEST_TIMEOUT_SECONDS", "30"),
        )?;
        let allowed_languages = parse_language_ids(env_optional("JUDGE_ALLOWED_LANGUAGES"))?;

        let grace_period_seconds = parse_i64(
            "GRADING_GRACE_PERIOD_SECONDS",
            env_or_default("GRADING_GRACE_PERIOD_SECONDS", "10"),
        )?;
        let max_code_bytes = parse_u64(
            "GRADING_MAX_CODE_BYTES",
            env_or_default("GRADING_MAX_CODE_BYTES", "65536"),
        )? as usize;
        let zero_score_on_timeout = env_optional("GRADING_ZERO_SCORE_ON_TIMEOUT")
            .map(|value| parse_bool(&value))
            .unwrap_or(false);

        let log_level = env_or_default("PROCODE_LOG_LEVEL", "info");
        let json = env_optional("PROCODE_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            security: SecuritySettings { secret_key, algorithm, key_generated: !secret_from_env },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
                max_connections,
            },
            judge: JudgeSettings {
                base_url: judge_base_url.trim_end_matches('/').to_string(),
                api_key: judge_api_key,
                rapidapi_host,
                request_timeout_seconds,
                allowed_languages,
            },
            grading: GradingSettings { grace_period_seconds, max_code_bytes, zero_score_on_timeout },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate(secret_from_env)?;

        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn judge(&self) -> &JudgeSettings {
        &self.judge
    }

    pub(crate) fn grading(&self) -> &GradingSettings {
        &self.grading
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self, secret_from_env: bool) -> Result<(), ConfigError> {
        if self.judge.request_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "JUDGE_REQUEST_TIMEOUT_SECONDS",
                value: String::from("0"),
            });
        }
        if self.judge.allowed_languages.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "JUDGE_ALLOWED_LANGUAGES",
                value: String::from("<empty>"),
            });
        }
        if self.grading.grace_period_seconds < 0 {
            return Err(ConfigError::InvalidValue {
                field: "GRADING_GRACE_PERIOD_SECONDS",
                value: self.grading.grace_period_seconds.to_string(),
            });
        }
        if self.grading.max_code_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "GRADING_MAX_CODE_BYTES",
                value: String::from("0"),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }

        // Tokens are issued by the auth service, so both sides must share the key.
        if !secret_from_env {
            return Err(ConfigError::MissingSecret("SECRET_KEY"));
        }

        if self.judge.uses_rapidapi() && self.judge.api_key.is_empty() {
            return Err(ConfigError::MissingSecret("JUDGE_API_KEY"));
        }

        Ok(())
    }
}

impl DatabaseSettings {
    pub(crate) fn database_url(&self) -> String {
        if let Some(url) = &self.database_url {
            return url.clone();
        }
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.postgres_user,
            self.postgres_password,
            self.postgres_server,
            self.postgres_port,
            self.postgres_db
        )
    }
}

impl JudgeSettings {
    pub(crate) fn uses_rapidapi(&self) -> bool {
        self.base_url.contains("rapidapi.com")
    }

    pub(crate) fn is_language_allowed(&self, language_id: i32) -> bool {
        self.allowed_languages.contains(&language_id)
    }
}

impl ServerHost {
    fn parse(value: String) -> Result<Self, ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::InvalidHost(value));
        }
        Ok(Self(value))
    }
}

impl ServerPort {
    fn parse(value: String) -> Result<Self, ConfigError> {
        let parsed: u16 = value.parse().map_err(|_| ConfigError::InvalidPort(value.clone()))?;
        if parsed == 0 {
            return Err(ConfigError::InvalidPort(value));
        }
        Ok(Self(parsed))
    }
}

fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn env_or_default(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}

fn parse_u16(field: &'static str, value: String) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidValue { field, value })
}

fn parse_u32(field: &'static str, value: String) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidValue { field, value })
}

fn parse_u64(field: &'static str, value: String) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidValue { field, value })
}

fn parse_i64(field: &'static str, value: String) -> Result<i64, ConfigError> {
    value.parse::<i64>().map_err(|_| ConfigError::InvalidValue { field, value })
}

fn parse_cors_origins(value: Option<String>) -> Result<Vec<String>, ConfigError> {
    let Some(raw) = value else {
        return Ok(DEFAULT_CORS_ORIGINS.iter().map(|item| item.to_string()).collect());
    };

    if raw.trim().is_empty() {
        return Ok(DEFAULT_CORS_ORIGINS.iter().map(|item| item.to_string()).collect());
    }

    if raw.trim_start().starts_with('[') {
        let parsed: Vec<String> =
            serde_json::from_str(&raw).map_err(|_| ConfigError::InvalidCors(raw.clone()))?;
        if parsed.is_empty() {
            return Ok(DEFAULT_CORS_ORIGINS.iter().map(|item| item.to_string()).collect());
        }
        return Ok(parsed);
    }

    let items: Vec<String> = raw
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();

    if items.is_empty() {
        return Ok(DEFAULT_CORS_ORIGINS.iter().map(|item| item.to_string()).collect());
    }

    Ok(items)
}

fn parse_language_ids(value: Option<String>) -> Result<Vec<i32>, ConfigError> {
    let Some(raw) = value else {
        return Ok(DEFAULT_ALLOWED_LANGUAGES.to_vec());
    };

    raw.split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<i32>()
                .ok()
                .filter(|id| *id > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    field: "JUDGE_ALLOWED_LANGUAGES",
                    value: item.to_string(),
                })
        })
        .collect()
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES" | "on" | "ON")
}

fn parse_environment(value: Option<String>) -> Environment {
    match value.as_deref().map(|val| val.to_lowercase()) {
        Some(ref val) if val == "production" || val == "prod" => Environment::Production,
        Some(ref val) if val == "staging" => Environment::Staging,
        Some(ref val) if val == "test" || val == "testing" => Environment::Test,
        _ => Environment::Development,
    }
}

fn load_or_create_secret_key() -> String {
    let path = secret_file_path();

    if let Ok(value) = fs::read_to_string(&path) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let new_key = generate_secret_key();

    if let Some(parent) = path.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            tracing::warn!(error = %err, path = %parent.display(), "Failed to create secret key directory");
        }
    }

    match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(mut file) => {
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Err(err) = file.set_permissions(fs::Permissions::from_mode(0o600)) {
                    tracing::warn!(error = %err, path = %path.display(), "Failed to set secret key file permissions");
                }
            }
            if let Err(err) = std::io::Write::write_all(&mut file, new_key.as_bytes()) {
                tracing::warn!(error = %err, path = %path.display(), "Failed to write secret key file");
            }
            return new_key;
        }
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
            if let Ok(value) = fs::read_to_string(&path) {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    return trimmed.to_string();
                }
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, path = %path.display(), "Failed to create secret key file");
        }
    }

    new_key
}

fn generate_secret_key() -> String {
    let mut bytes = [0u8; 64];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn secret_file_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(".secret_key")
}
