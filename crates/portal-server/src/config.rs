use portal_auth::config::AuthConfig;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, net::SocketAddr, time::Duration};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Session tokens, cookie and protected routes
    #[serde(default)]
    pub auth: AuthConfig,
    /// Response cache TTLs
    #[serde(default)]
    pub cache: CacheConfig,
    /// Bootstrap configuration (initial admin user)
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Server validations
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.server.body_limit_bytes == 0 {
            return Err("server.body_limit_bytes must be > 0".into());
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        crate::observability::build_filter(&self.logging)?;
        // Cache validation
        for (name, secs) in self.cache.ttls() {
            if !(1..=MAX_CACHE_TTL_SECS).contains(&secs) {
                return Err(format!(
                    "cache.{name} must be between 1 and {MAX_CACHE_TTL_SECS} seconds"
                ));
            }
        }
        // Bootstrap validation
        if let Some(ref admin) = self.bootstrap.admin_user {
            if admin.email.trim().is_empty() || admin.password.is_empty() {
                return Err("bootstrap.admin_user requires email and password".into());
            }
        }
        // Auth validation
        self.auth
            .validate()
            .map_err(|e| format!("auth config error: {e}"))?;
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }

    /// Renders the configuration as TOML with the signing secret masked.
    pub fn to_redacted_toml(&self) -> Result<String, String> {
        let mut redacted = self.clone();
        if redacted.auth.secret.is_some() {
            redacted.auth.secret = Some("********".into());
        }
        if let Some(ref mut admin) = redacted.bootstrap.admin_user {
            admin.password = "********".into();
        }
        toml::to_string_pretty(&redacted).map_err(|e| format!("config serialize error: {e}"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_body_limit() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

/// Log output settings.
///
/// ```toml
/// [logging]
/// level = "info"
///
/// [logging.targets]
/// portal_auth = "debug"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level for every target.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Per-target level overrides, e.g. `tower_http = "debug"`.
    #[serde(default)]
    pub targets: BTreeMap<String, String>,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            targets: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    /// Filter directives in `EnvFilter` syntax: the default level followed
    /// by one `target=level` per override.
    pub fn directives(&self) -> String {
        let mut directives = vec![self.level.to_ascii_lowercase()];
        directives.extend(
            self.targets
                .iter()
                .map(|(target, level)| format!("{target}={}", level.to_ascii_lowercase())),
        );
        directives.join(",")
    }
}

/// Upper bound for any response cache TTL.
pub const MAX_CACHE_TTL_SECS: u64 = 3600;

/// Response cache configuration.
///
/// Notifications change more often than the other client data, so they get
/// a shorter TTL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Aggregate client data TTL in seconds
    #[serde(default = "default_data_ttl_secs")]
    pub client_data_ttl_secs: u64,

    #[serde(default = "default_data_ttl_secs")]
    pub projects_ttl_secs: u64,

    #[serde(default = "default_data_ttl_secs")]
    pub resources_ttl_secs: u64,

    #[serde(default = "default_data_ttl_secs")]
    pub milestones_ttl_secs: u64,

    #[serde(default = "default_notifications_ttl_secs")]
    pub notifications_ttl_secs: u64,
}

fn default_data_ttl_secs() -> u64 {
    300
}

fn default_notifications_ttl_secs() -> u64 {
    60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            client_data_ttl_secs: default_data_ttl_secs(),
            projects_ttl_secs: default_data_ttl_secs(),
            resources_ttl_secs: default_data_ttl_secs(),
            milestones_ttl_secs: default_data_ttl_secs(),
            notifications_ttl_secs: default_notifications_ttl_secs(),
        }
    }
}

impl CacheConfig {
    fn ttls(&self) -> [(&'static str, u64); 5] {
        [
            ("client_data_ttl_secs", self.client_data_ttl_secs),
            ("projects_ttl_secs", self.projects_ttl_secs),
            ("resources_ttl_secs", self.resources_ttl_secs),
            ("milestones_ttl_secs", self.milestones_ttl_secs),
            ("notifications_ttl_secs", self.notifications_ttl_secs),
        ]
    }

    pub fn client_data_ttl(&self) -> Duration {
        Duration::from_secs(self.client_data_ttl_secs)
    }
    pub fn projects_ttl(&self) -> Duration {
        Duration::from_secs(self.projects_ttl_secs)
    }
    pub fn resources_ttl(&self) -> Duration {
        Duration::from_secs(self.resources_ttl_secs)
    }
    pub fn milestones_ttl(&self) -> Duration {
        Duration::from_secs(self.milestones_ttl_secs)
    }
    pub fn notifications_ttl(&self) -> Duration {
        Duration::from_secs(self.notifications_ttl_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BootstrapConfig {
    /// Admin user configuration
    /// If set, creates an admin user on startup (if not already exists)
    #[serde(default)]
    pub admin_user: Option<AdminUserConfig>,
}

/// Configuration for bootstrapping an admin user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserConfig {
    /// Admin login email (required)
    pub email: String,
    /// Admin password in plain text (will be hashed)
    /// For security, prefer using PORTAL__BOOTSTRAP__ADMIN_USER__PASSWORD env var
    pub password: String,
    /// Display name
    #[serde(default = "default_admin_name")]
    pub name: String,
}

fn default_admin_name() -> String {
    "Administrator".into()
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::{Path, PathBuf};

    /// Default configuration file looked up in the working directory.
    pub const DEFAULT_CONFIG_FILE: &str = "portal.toml";

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        } else if path.is_some() {
            tracing::warn!(path = %pathbuf.display(), "Config file not found, using defaults");
        }
        // Environment variable overrides, e.g., PORTAL__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("PORTAL")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        // Validate
        merged.validate()?;
        Ok(merged)
    }

    pub fn load_config_with_default_path<P: AsRef<Path>>(
        path: Option<P>,
    ) -> Result<AppConfig, String> {
        let p = path
            .as_ref()
            .map(|p| p.as_ref().to_string_lossy().to_string());
        load_config(p.as_deref())
    }
}
