use std::env;
use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub supabase: SupabaseConfig,
    pub jwt: JwtConfig,
    pub admin: AdminConfig,
    pub rate_limit: RateLimitConfig,
    pub mirror: MirrorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origin allowed by CORS (the SPA).
    pub frontend_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one `<collection>.json` file per resource.
    pub data_dir: PathBuf,
    /// Directory where uploaded files are written when Supabase Storage is not used.
    pub uploads_dir: PathBuf,
    /// Maximum accepted request body size for `/api/upload`, in bytes.
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`. Remote tier is disabled when unset.
    pub url: Option<String>,
    /// Service role key (preferred) or anon key.
    pub key: Option<String>,
    pub storage_bucket: String,
    pub timeout_seconds: u64,
}

impl SupabaseConfig {
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.url.as_deref(), self.key.as_deref()) {
            (Some(url), Some(key)) if !url.trim().is_empty() && !key.trim().is_empty() => {
                Some((url, key))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Bootstrap admin account, accepted when no stored user matches.
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Allowed requests per second (per IP) for auth endpoints (e.g. /api/auth/login)
    pub auth_per_second: u32,
    /// Burst size for auth endpoints
    pub auth_burst: u32,
    /// Allowed requests per second (per IP) for public form endpoints (e.g. /api/newsletter)
    pub forms_per_second: u32,
    /// Burst size for public form endpoints
    pub forms_burst: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MirrorConfig {
    /// Whether the Supabase -> local JSON mirror worker runs (only when Supabase is configured).
    pub enabled: bool,
    /// How often (seconds) remote collections are pulled into the local files.
    pub interval_seconds: u64,
}

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(v) => match v.to_lowercase().as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,
                frontend_url: env::var("FRONTEND_URL")
                    .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            },
            storage: StorageConfig {
                data_dir: env::var("DATA_DIR")
                    .unwrap_or_else(|_| "data".to_string())
                    .into(),
                uploads_dir: env::var("UPLOADS_DIR")
                    .unwrap_or_else(|_| "uploads".to_string())
                    .into(),
                max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                    .unwrap_or_else(|_| (10 * 1024 * 1024).to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("MAX_UPLOAD_BYTES".to_string()))?,
            },
            supabase: SupabaseConfig {
                url: non_empty_env("SUPABASE_URL"),
                key: non_empty_env("SUPABASE_SERVICE_ROLE_KEY")
                    .or_else(|| non_empty_env("SUPABASE_KEY"))
                    .or_else(|| non_empty_env("SUPABASE_ANON_KEY")),
                storage_bucket: env::var("SUPABASE_STORAGE_BUCKET")
                    .unwrap_or_else(|_| "property-images".to_string()),
                timeout_seconds: env::var("SUPABASE_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "8".to_string())
                    .parse()
                    .unwrap_or(8),
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET")
                    .map_err(|_| ConfigError::MissingEnv("JWT_SECRET".to_string()))?,
                expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                    .unwrap_or_else(|_| "24".to_string())
                    .parse()
                    .unwrap_or(24),
            },
            admin: AdminConfig {
                email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string()),
                password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string()),
                name: env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string()),
            },
            rate_limit: RateLimitConfig {
                auth_per_second: env::var("RATE_LIMIT_AUTH_PER_SECOND")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()
                    .unwrap_or(3),
                auth_burst: env::var("RATE_LIMIT_AUTH_BURST")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
                forms_per_second: env::var("RATE_LIMIT_FORMS_PER_SECOND")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse()
                    .unwrap_or(2),
                forms_burst: env::var("RATE_LIMIT_FORMS_BURST")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
            },
            mirror: MirrorConfig {
                enabled: env_flag("MIRROR_ENABLED", true),
                interval_seconds: env::var("MIRROR_INTERVAL_SECONDS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()
                    .unwrap_or(300u64),
            },
        })
    }

    /// True when the bootstrap admin still uses the built-in credentials.
    pub fn uses_default_admin(&self) -> bool {
        let defaults = Config::default();
        self.admin.email == defaults.admin.email && self.admin.password == defaults.admin.password
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                frontend_url: "http://localhost:5173".to_string(),
            },
            storage: StorageConfig {
                data_dir: "data".into(),
                uploads_dir: "uploads".into(),
                max_upload_bytes: 10 * 1024 * 1024,
            },
            supabase: SupabaseConfig {
                url: None,
                key: None,
                storage_bucket: "property-images".to_string(),
                timeout_seconds: 8,
            },
            jwt: JwtConfig {
                secret: String::new(),
                expiration_hours: 24,
            },
            admin: AdminConfig {
                email: "admin@example.com".to_string(),
                password: "admin123".to_string(),
                name: "Administrator".to_string(),
            },
            rate_limit: RateLimitConfig {
                auth_per_second: 3,
                auth_burst: 10,
                forms_per_second: 2,
                forms_burst: 5,
            },
            mirror: MirrorConfig {
                enabled: true,
                interval_seconds: 300,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_require_both_url_and_key() {
        let mut cfg = Config::default().supabase;
        assert!(cfg.credentials().is_none());

        cfg.url = Some("https://demo.supabase.co".to_string());
        assert!(cfg.credentials().is_none());

        cfg.key = Some("   ".to_string());
        assert!(cfg.credentials().is_none());

        cfg.key = Some("service-key".to_string());
        assert_eq!(
            cfg.credentials(),
            Some(("https://demo.supabase.co", "service-key"))
        );
    }

    #[test]
    fn default_admin_detection() {
        let mut cfg = Config::default();
        assert!(cfg.uses_default_admin());
        cfg.admin.password = "something-else".to_string();
        assert!(!cfg.uses_default_admin());
    }
}
