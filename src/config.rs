use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashSet;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info, warn};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::services::zones::{ZoneMap, ZoneSpec};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 5000;
const CONFIG_DIR: &str = "config";
const DEFAULT_UNKNOWN_BUILDING: &str = "Unknown";
const DEFAULT_ENTRY_DOOR_ID: i32 = 1;
const DEFAULT_ALLOCATION_MAX_ATTEMPTS: u32 = 8;

/// A parking zone as it appears in configuration files.
///
/// ```toml
/// [[zones]]
/// name = "Edificio A"
/// code = "A"
/// fallbacks = ["Edificio B"]
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ZoneConfig {
    /// Zone identifier as stored in `Places.zone` and `Users.building`
    pub name: String,
    /// Short code returned to clients as `edificio`
    pub code: String,
    /// Zones searched, in order, when this one has no free spot
    #[serde(default)]
    pub fallbacks: Vec<String>,
}

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// CORS: comma-separated list of allowed origins (production)
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Allow permissive CORS fallback
    #[serde(default)]
    pub cors_allow_any_origin: bool,

    /// CORS: allow credentials
    #[serde(default)]
    pub cors_allow_credentials: bool,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    #[validate(range(min = 1))]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// DB timeouts (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Door whose `requested` flag is raised on entry and exit
    #[serde(default = "default_entry_door_id")]
    pub entry_door_id: i32,

    /// Building assigned to users once they leave
    #[serde(default = "default_unknown_building")]
    #[validate(length(min = 1))]
    pub unknown_building: String,

    /// Include plaintext passwords in the user listing (legacy mobile client only)
    #[serde(default)]
    pub expose_passwords: bool,

    /// Claim attempts before an assignment gives up under contention
    #[serde(default = "default_allocation_max_attempts")]
    #[validate(range(min = 1, max = 100))]
    pub allocation_max_attempts: u32,

    /// Parking zones and their fallback order
    #[serde(default = "default_zones")]
    pub zones: Vec<ZoneConfig>,
}

impl AppConfig {
    /// Creates a new configuration with defaults for everything but the essentials
    pub fn new(database_url: String, host: String, port: u16, environment: String) -> Self {
        Self {
            database_url,
            host,
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            cors_allow_credentials: false,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            entry_door_id: default_entry_door_id(),
            unknown_building: default_unknown_building(),
            expose_passwords: false,
            allocation_max_attempts: default_allocation_max_attempts(),
            zones: default_zones(),
        }
    }

    /// Gets database URL reference
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
            || self.environment.eq_ignore_ascii_case("test")
    }

    pub fn has_cors_allowed_origins(&self) -> bool {
        self.cors_allowed_origins
            .as_deref()
            .map(|raw| raw.split(',').any(|origin| !origin.trim().is_empty()))
            .unwrap_or(false)
    }

    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }

    /// Builds the zone adjacency used by the spot allocator
    pub fn zone_map(&self) -> ZoneMap {
        ZoneMap::new(self.zones.iter().map(|zone| ZoneSpec {
            name: zone.name.clone(),
            code: zone.code.clone(),
            fallbacks: zone.fallbacks.clone(),
        }))
    }

    fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.is_development() && !self.has_cors_allowed_origins() && !self.cors_allow_any_origin
        {
            let mut err = ValidationError::new("cors_allowed_origins");
            err.message = Some(
                "Set cors_allowed_origins or cors_allow_any_origin outside development".into(),
            );
            errors.add("cors_allowed_origins", err);
        }

        if self.db_min_connections > self.db_max_connections {
            let mut err = ValidationError::new("db_min_connections");
            err.message = Some("db_min_connections cannot exceed db_max_connections".into());
            errors.add("db_min_connections", err);
        }

        if let Err(err) = validate_zones(&self.zones) {
            errors.add("zones", err);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] ConfigError),
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}
fn default_db_connect_timeout_secs() -> u64 {
    30
}
fn default_db_idle_timeout_secs() -> u64 {
    600
}
fn default_db_acquire_timeout_secs() -> u64 {
    8
}

fn default_entry_door_id() -> i32 {
    DEFAULT_ENTRY_DOOR_ID
}

fn default_unknown_building() -> String {
    DEFAULT_UNKNOWN_BUILDING.to_string()
}

fn default_allocation_max_attempts() -> u32 {
    DEFAULT_ALLOCATION_MAX_ATTEMPTS
}

/// The two campus buildings, each falling back to the other.
pub fn default_zones() -> Vec<ZoneConfig> {
    vec![
        ZoneConfig {
            name: "Edificio A".to_string(),
            code: "A".to_string(),
            fallbacks: vec!["Edificio B".to_string()],
        },
        ZoneConfig {
            name: "Edificio B".to_string(),
            code: "B".to_string(),
            fallbacks: vec!["Edificio A".to_string()],
        },
    ]
}

fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

fn validate_zones(zones: &[ZoneConfig]) -> Result<(), ValidationError> {
    let mut names = HashSet::new();
    for zone in zones {
        if zone.name.trim().is_empty() || zone.code.trim().is_empty() {
            let mut err = ValidationError::new("zones");
            err.message = Some("Every zone needs a non-empty name and code".into());
            return Err(err);
        }
        if !names.insert(zone.name.as_str()) {
            let mut err = ValidationError::new("zones");
            err.message = Some(format!("Zone '{}' is declared twice", zone.name).into());
            return Err(err);
        }
    }

    for zone in zones {
        if let Some(unknown) = zone
            .fallbacks
            .iter()
            .find(|fallback| !names.contains(fallback.as_str()))
        {
            let mut err = ValidationError::new("zones");
            err.message = Some(
                format!(
                    "Zone '{}' falls back to undeclared zone '{}'",
                    zone.name, unknown
                )
                .into(),
            );
            return Err(err);
        }
    }

    Ok(())
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_directive = format!("estaciona_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    // Optional OpenTelemetry initialization via env (APP__OTEL_ENABLED or OTEL_EXPORTER_OTLP_ENDPOINT)
    let otel_enabled = env::var("APP__OTEL_ENABLED")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
        || env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok();

    if otel_enabled {
        use opentelemetry::KeyValue;
        use opentelemetry_otlp::WithExportConfig;
        use opentelemetry_sdk::{trace as sdktrace, Resource};

        let endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .unwrap_or_else(|_| "http://localhost:4317".to_string());
        let service_name =
            env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "estaciona-api".to_string());

        let resource = Resource::new(vec![KeyValue::new("service.name", service_name)]);
        let tracer = match opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(
                opentelemetry_otlp::new_exporter()
                    .tonic()
                    .with_endpoint(endpoint),
            )
            .with_trace_config(sdktrace::config().with_resource(resource))
            .install_batch(opentelemetry_sdk::runtime::Tokio)
        {
            Ok(tracer) => tracer,
            Err(err) => {
                eprintln!("Failed to install OTLP pipeline: {}", err);
                if json {
                    let _ = fmt().with_env_filter(filter_directive).json().try_init();
                } else {
                    let _ = fmt().with_env_filter(filter_directive).try_init();
                }
                return;
            }
        };

        let base = tracing_subscriber::registry()
            .with(tracing_opentelemetry::layer().with_tracer(tracer))
            .with(EnvFilter::new(filter_directive));

        if json {
            let _ = base.with(fmt::layer().json()).try_init();
        } else {
            let _ = base.with(fmt::layer()).try_init();
        }
    } else if json {
        let _ = fmt().with_env_filter(filter_directive).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter_directive).try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Default config (config/default.toml)
/// 2. Environment-specific config (config/{env}.toml)
/// 3. Docker config (config/docker.toml) if DOCKER env var is set
/// 4. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    load_config_from(Path::new(CONFIG_DIR))
}

/// Same as [`load_config`] but reading files from `config_dir`.
pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !config_dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            config_dir.display()
        );
    }

    let dir = config_dir.display();
    let mut builder = Config::builder()
        .set_default("database_url", "sqlite://estaciona.db?mode=rwc")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", i64::from(DEFAULT_PORT))?
        .set_default("environment", run_env.as_str())?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", dir)).required(false))
        .add_source(File::with_name(&format!("{}/{}", dir, run_env)).required(false));

    if env::var("DOCKER").is_ok() {
        info!("Docker environment detected");
        builder = builder.add_source(File::with_name(&format!("{}/docker", dir)).required(false));
    }

    let config = builder
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    app_config.validate_additional_constraints().map_err(|e| {
        error!("Configuration constraint validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    if app_config.expose_passwords {
        warn!("expose_passwords is enabled: the user listing returns plaintext passwords");
    }

    info!("Configuration loaded successfully");
    Ok(app_config)
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            8080,
            "production".into(),
        )
    }

    #[test]
    fn non_dev_requires_cors_origins() {
        let cfg = base_config();
        assert!(cfg.validate_additional_constraints().is_err());
    }

    #[test]
    fn non_dev_allows_override_flag() {
        let mut cfg = base_config();
        cfg.cors_allow_any_origin = true;
        assert!(cfg.validate_additional_constraints().is_ok());
    }

    #[test]
    fn non_dev_with_origins_passes() {
        let mut cfg = base_config();
        cfg.cors_allowed_origins = Some("https://example.com".into());
        assert!(cfg.validate_additional_constraints().is_ok());
    }

    #[test]
    fn zones_must_reference_declared_fallbacks() {
        let mut cfg = base_config();
        cfg.cors_allow_any_origin = true;
        cfg.zones.push(ZoneConfig {
            name: "Edificio C".into(),
            code: "C".into(),
            fallbacks: vec!["Edificio D".into()],
        });
        let errors = cfg.validate_additional_constraints().unwrap_err();
        assert!(errors.field_errors().contains_key("zones"));
    }

    #[test]
    fn duplicate_zone_names_are_rejected() {
        let mut zones = default_zones();
        zones.push(zones[0].clone());
        assert!(validate_zones(&zones).is_err());
    }

    #[test]
    fn invalid_log_level_fails_validation() {
        let mut cfg = base_config();
        cfg.log_level = "verbose".into();
        let errors = cfg.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("log_level"));
    }

    #[test]
    fn zero_allocation_attempts_fail_validation() {
        let mut cfg = base_config();
        cfg.allocation_max_attempts = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn default_zone_map_pairs_both_buildings() {
        let map = base_config().zone_map();
        assert_eq!(
            map.search_order("Edificio A"),
            vec!["Edificio A".to_string(), "Edificio B".to_string()]
        );
        assert_eq!(map.code_for("Edificio B"), "B");
    }
}

#[cfg(test)]
mod load_tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn loads_zones_and_overrides_from_files() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            r#"
                database_url = "sqlite://from-file.db?mode=rwc"
                port = 6000
                environment = "development"
                entry_door_id = 3

                [[zones]]
                name = "North"
                code = "N"
                fallbacks = ["South"]

                [[zones]]
                name = "South"
                code = "S"
            "#,
        )
        .unwrap();

        let cfg = load_config_from(dir.path()).unwrap();

        assert_eq!(cfg.database_url, "sqlite://from-file.db?mode=rwc");
        assert_eq!(cfg.port, 6000);
        assert_eq!(cfg.entry_door_id, 3);
        assert_eq!(cfg.zones.len(), 2);
        assert_eq!(cfg.zones[1].fallbacks, Vec::<String>::new());
        assert_eq!(cfg.unknown_building, "Unknown");
    }
}
