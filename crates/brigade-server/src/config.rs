//! Server configuration from command-line flags or `BRIGADE_*`
//! environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use brigade_auth::AuthConfig;
use brigade_chart::ChartConfig;
use brigade_db::DbConfig;
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "brigade")]
#[command(about = "Staff training and org-chart API for hospitality venues")]
#[command(version)]
pub struct ServerArgs {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8080", env = "BRIGADE_BIND")]
    pub bind: SocketAddr,

    /// SurrealDB endpoint (`mem://` or `ws://host:port`)
    #[arg(long, default_value = "mem://", env = "BRIGADE_DB_URL")]
    pub db_url: String,

    #[arg(long, default_value = "brigade", env = "BRIGADE_DB_NAMESPACE")]
    pub db_namespace: String,

    #[arg(long, default_value = "main", env = "BRIGADE_DB_DATABASE")]
    pub db_database: String,

    #[arg(long, default_value = "root", env = "BRIGADE_DB_USERNAME")]
    pub db_username: String,

    #[arg(long, default_value = "root", env = "BRIGADE_DB_PASSWORD", hide_env_values = true)]
    pub db_password: String,

    /// Ed25519 private key (PKCS#8 PEM) used to sign access tokens
    #[arg(long, env = "BRIGADE_JWT_PRIVATE_KEY")]
    pub jwt_private_key: PathBuf,

    /// Ed25519 public key (SPKI PEM) used to verify access tokens
    #[arg(long, env = "BRIGADE_JWT_PUBLIC_KEY")]
    pub jwt_public_key: PathBuf,

    #[arg(long, default_value = "brigade", env = "BRIGADE_JWT_ISSUER")]
    pub jwt_issuer: String,

    /// Access token lifetime in seconds
    #[arg(long, default_value = "900", env = "BRIGADE_TOKEN_LIFETIME")]
    pub token_lifetime: u64,

    /// Server-side secret mixed into password hashes
    #[arg(long, env = "BRIGADE_PASSWORD_PEPPER", hide_env_values = true)]
    pub password_pepper: Option<String>,

    #[arg(long, default_value = "12", env = "BRIGADE_MIN_PASSWORD_LENGTH")]
    pub min_password_length: usize,

    /// Longest parent chain accepted when loading an org chart
    #[arg(long, default_value = "64", env = "BRIGADE_CHART_MAX_DEPTH")]
    pub chart_max_depth: usize,

    /// Allowed CORS origin; cross-origin requests are refused when unset
    #[arg(long, env = "BRIGADE_CORS_ORIGIN")]
    pub cors_origin: Option<String>,
}

/// Fully resolved configuration for every layer of the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub db: DbConfig,
    pub auth: AuthConfig,
    pub chart: ChartConfig,
    pub cors_origin: Option<String>,
}

impl ServerArgs {
    /// Resolve the arguments, reading the signing keys from disk.
    pub fn load(self) -> Result<ServerConfig> {
        let jwt_private_key_pem = std::fs::read_to_string(&self.jwt_private_key)
            .with_context(|| format!("reading {}", self.jwt_private_key.display()))?;
        let jwt_public_key_pem = std::fs::read_to_string(&self.jwt_public_key)
            .with_context(|| format!("reading {}", self.jwt_public_key.display()))?;

        Ok(ServerConfig {
            bind: self.bind,
            db: DbConfig {
                url: self.db_url,
                namespace: self.db_namespace,
                database: self.db_database,
                username: self.db_username,
                password: self.db_password,
            },
            auth: AuthConfig {
                jwt_private_key_pem,
                jwt_public_key_pem,
                access_token_lifetime_secs: self.token_lifetime,
                jwt_issuer: self.jwt_issuer,
                pepper: self.password_pepper,
                min_password_length: self.min_password_length,
            },
            chart: ChartConfig {
                max_depth: self.chart_max_depth,
            },
            cors_origin: self.cors_origin,
        })
    }
}
