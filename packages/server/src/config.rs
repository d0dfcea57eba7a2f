use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Team token lifetime.
    pub token_ttl_hours: i64,
    /// Admin token lifetime.
    pub admin_token_ttl_hours: i64,
    /// Login OTP validity window.
    pub otp_ttl_minutes: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SubmissionConfig {
    /// Maximum submitted code size in bytes.
    pub max_size: usize,
    /// Per-team submissions per minute; 0 disables rate limiting.
    pub rate_limit_per_minute: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CompilerConfig {
    /// Base URL of the code-execution service.
    pub url: String,
    /// Bound on a single grading run, end to end.
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_username: String,
    pub smtp_password: String,
    /// Display name used in the From header.
    pub from_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    /// Username of the primary admin row seeded on startup. Its
    /// `current_round` value gates submission intake.
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub submission: SubmissionConfig,
    pub compiler: CompilerConfig,
    /// When absent, OTPs are logged instead of emailed.
    pub email: Option<EmailConfig>,
    pub admin: AdminConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("auth.token_ttl_hours", 24)?
            .set_default("auth.admin_token_ttl_hours", 1)?
            .set_default("auth.otp_ttl_minutes", 5)?
            .set_default("submission.max_size", 65_536)?
            .set_default("submission.rate_limit_per_minute", 10)?
            .set_default("compiler.timeout_secs", 30)?
            .set_default("admin.username", "admin")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., CODECLASH__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("CODECLASH").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
