use anyhow::{bail, Context, Result};

const DEFAULT_REGION: &str = "ap-southeast-2";
const DEFAULT_USERS_TABLE: &str = "LnDUsers";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Which `UserStore` implementation backs the users table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    DynamoDb,
    Memory,
}

/// Application configuration loaded from environment variables.
/// Nothing is strictly required: auth endpoints report a configuration error
/// at request time when the Cognito client id is absent.
#[derive(Debug, Clone)]
pub struct Config {
    pub aws_region: String,
    pub cognito_client_id: Option<String>,
    pub users_table: String,
    pub dynamodb_endpoint: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub storage_backend: StorageBackend,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let storage_backend = match get("STORAGE_BACKEND").as_deref() {
            None | Some("dynamodb") => StorageBackend::DynamoDb,
            Some("memory") => StorageBackend::Memory,
            Some(other) => bail!("STORAGE_BACKEND must be 'dynamodb' or 'memory', got '{other}'"),
        };

        Ok(Config {
            aws_region: get("AWS_REGION")
                .or_else(|| get("COGNITO_REGION"))
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            cognito_client_id: get("COGNITO_CLIENT_ID"),
            users_table: get("USERS_TABLE").unwrap_or_else(|| DEFAULT_USERS_TABLE.to_string()),
            dynamodb_endpoint: get("DYNAMODB_ENDPOINT"),
            aws_access_key_id: get("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: get("AWS_SECRET_ACCESS_KEY"),
            storage_backend,
            max_upload_bytes: match get("RESUME_MAX_BYTES") {
                Some(v) => v
                    .parse::<usize>()
                    .context("RESUME_MAX_BYTES must be a byte count")?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}
