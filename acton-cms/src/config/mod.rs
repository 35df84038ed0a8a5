//! Configuration management for acton-cms
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `ACTON_` prefix, `__` for nesting)
//! 2. `./config.toml` (development)
//! 3. `~/.config/acton-cms/{service}/config.toml` (user config, XDG)
//! 4. `/etc/acton-cms/{service}/config.toml` (system config)
//! 5. Hardcoded defaults (fallback)
//!
//! Environment variable format: `ACTON_SECTION__FIELD_NAME`, for example
//! `ACTON_ADMIN__APP_PATH=backoffice`.
//!
//! # Example Configuration
//!
//! ```toml
//! # config.toml
//! [admin]
//! app_path = "admin"
//! auth_guard = "twill_users"
//! route_name_prefix = "twill"
//! login_path = "/admin/login"
//!
//! [locales]
//! available = ["en", "fr"]
//! fallback = "en"
//!
//! [database]
//! url = "sqlite://./dev.db"
//! max_connections = 5
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Admin surface settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSettings {
    /// Path prefix every module route is mounted under (no slashes needed)
    pub app_path: String,

    /// Name of the authentication guard required on module routes
    pub auth_guard: String,

    /// Prefix of every module route name
    pub route_name_prefix: String,

    /// Base middleware group applied before the guard
    pub middleware_group: String,

    /// Where unauthenticated browsers are sent
    pub login_path: String,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            app_path: "admin".to_string(),
            auth_guard: "twill_users".to_string(),
            route_name_prefix: "twill".to_string(),
            middleware_group: "web".to_string(),
            login_path: "/admin/login".to_string(),
        }
    }
}

impl AdminSettings {
    /// Admin prefix normalized to a leading slash and no trailing slash
    ///
    /// An empty `app_path` yields an empty prefix.
    #[must_use]
    pub fn path_prefix(&self) -> String {
        let trimmed = self.app_path.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        }
    }

    /// Middleware names attached to every module route
    #[must_use]
    pub fn middleware(&self) -> Vec<String> {
        vec![
            self.middleware_group.clone(),
            format!("twill_auth:{}", self.auth_guard),
        ]
    }
}

/// Locale settings used by the translation handler
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleSettings {
    /// Locales content can be translated into
    pub available: Vec<String>,

    /// Locale used when input carries a plain value
    pub fallback: String,
}

impl Default for LocaleSettings {
    fn default() -> Self {
        Self {
            available: vec!["en".to_string()],
            fallback: "en".to_string(),
        }
    }
}

/// Database settings used by the CLI and `SchemaStore` constructors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Connection url (`postgres://…` or `sqlite://…`)
    pub url: Option<String>,

    /// Maximum pool size
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}

/// Complete acton-cms configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ActonCmsConfig {
    /// Admin routing settings
    #[serde(default)]
    pub admin: AdminSettings,

    /// Translation locales
    #[serde(default)]
    pub locales: LocaleSettings,

    /// Database settings
    #[serde(default)]
    pub database: DatabaseSettings,

    /// Feature flags
    #[serde(default)]
    pub features: HashMap<String, bool>,
}

impl ActonCmsConfig {
    /// Load configuration for a specific service
    ///
    /// Searches the locations listed in the module docs, lowest priority first.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use acton_cms::config::ActonCmsConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = ActonCmsConfig::load_for_service("my-app")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load_for_service(service_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::new().merge(Toml::string(&toml::to_string(&Self::default())?));

        let system_config = PathBuf::from("/etc/acton-cms")
            .join(service_name)
            .join("config.toml");
        if system_config.exists() {
            figment = figment.merge(Toml::file(&system_config));
        }

        let user_config = Self::recommended_path(service_name);
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }

        let local_config = PathBuf::from("./config.toml");
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }

        figment = figment.merge(Env::prefixed("ACTON_").split("__").lowercase(true));

        Ok(figment.extract()?)
    }

    /// Load configuration from a specific file, layered over the defaults
    ///
    /// Environment variables still take precedence.
    pub fn load_from(path: &str) -> anyhow::Result<Self> {
        let config = Figment::new()
            .merge(Toml::string(&toml::to_string(&Self::default())?))
            .merge(Toml::file(path))
            .merge(Env::prefixed("ACTON_").split("__").lowercase(true))
            .extract()?;
        Ok(config)
    }

    /// Get the recommended XDG config path for a service
    ///
    /// Falls back to `./config.toml` when no config directory is known.
    #[must_use]
    pub fn recommended_path(service_name: &str) -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from("./config.toml"),
            |dir| dir.join("acton-cms").join(service_name).join("config.toml"),
        )
    }

    /// Whether a feature flag is enabled
    #[must_use]
    pub fn feature_enabled(&self, name: &str) -> bool {
        self.features.get(name).copied().unwrap_or(false)
    }
}
