use anyhow::Context;

/// Which store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    /// Non-persistent; for local runs without a database.
    Memory,
}

impl std::str::FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => anyhow::bail!("unknown store {other:?}, expected postgres or memory"),
        }
    }
}

/// Log output selected by `LOG_FORMAT`; anything but `json` is human-readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_env() -> Self {
        Self::from_value(std::env::var("LOG_FORMAT").ok().as_deref())
    }

    fn from_value(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub run_migrations: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store = match std::env::var("CATALOG_STORE") {
            Ok(raw) => raw.parse::<StoreKind>()?,
            Err(_) => StoreKind::Postgres,
        };
        let database_url = std::env::var("DATABASE_URL").ok();
        if store == StoreKind::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL must be set when CATALOG_STORE=postgres");
        }
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = parse_var("APP_PORT", 8080)?;
        let db_max_connections = parse_var("DB_MAX_CONNECTIONS", 10)?;
        let run_migrations = parse_var("RUN_MIGRATIONS", true)?;
        Ok(Self {
            store,
            database_url,
            host,
            port,
            db_max_connections,
            run_migrations,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Reads an optional variable, falling back to `default` when unset.
fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => parse_value(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(name: &str, raw: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("invalid value for {name}: {raw:?}"))
}
