use std::{env, fmt};

use jsonwebtoken::{Algorithm, DecodingKey};

/// Default request body cap. Product images are often sent as data URLs.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
    /// Lowercased emails promoted to admin when their account syncs.
    pub admin_emails: Vec<String>,
    pub identity: IdentityConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let max_body_bytes = env::var("MAX_BODY_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);
        let admin_emails = parse_email_list(&env::var("ADMIN_EMAILS").unwrap_or_default());
        let identity = IdentityConfig::from_env()?;

        Ok(Self {
            port,
            database_url,
            host,
            max_body_bytes,
            admin_emails,
            identity,
        })
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.admin_emails.iter().any(|candidate| *candidate == email)
    }
}

/// How bearer tokens from the identity provider are checked.
#[derive(Clone, Default)]
pub struct IdentityConfig {
    pub key: Option<IdentityKey>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    /// Reduced-trust preview mode: accept `x-user-*` headers when the token
    /// cannot be verified. Never enable in production.
    pub allow_header_fallback: bool,
}

#[derive(Clone)]
pub struct IdentityKey {
    pub decoding: DecodingKey,
    pub algorithm: Algorithm,
}

impl IdentityConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let key = if let Ok(pem) = env::var("IDENTITY_JWT_PUBLIC_KEY") {
            Some(IdentityKey {
                decoding: DecodingKey::from_rsa_pem(pem.as_bytes())?,
                algorithm: Algorithm::RS256,
            })
        } else {
            env::var("IDENTITY_JWT_SECRET")
                .ok()
                .filter(|s| !s.is_empty())
                .map(|secret| IdentityKey {
                    decoding: DecodingKey::from_secret(secret.as_bytes()),
                    algorithm: Algorithm::HS256,
                })
        };

        let allow_header_fallback = env::var("AUTH_HEADER_FALLBACK")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        if key.is_none() && !allow_header_fallback {
            tracing::warn!("no identity key configured; every authenticated request will be rejected");
        }

        Ok(Self {
            key,
            issuer: env::var("IDENTITY_ISSUER").ok().filter(|s| !s.is_empty()),
            audience: env::var("IDENTITY_AUDIENCE").ok().filter(|s| !s.is_empty()),
            allow_header_fallback,
        })
    }

    pub fn with_secret(secret: &str) -> Self {
        Self {
            key: Some(IdentityKey {
                decoding: DecodingKey::from_secret(secret.as_bytes()),
                algorithm: Algorithm::HS256,
            }),
            ..Self::default()
        }
    }
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("algorithm", &self.key.as_ref().map(|k| k.algorithm))
            .field("key", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("allow_header_fallback", &self.allow_header_fallback)
            .finish()
    }
}

pub fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}
