use anyhow::{Context, Result};
use std::str::FromStr;

use super::config_model::{Analytics, BackendServer, Database, DotEnvyConfig, StaffAuth};

pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_COHORT_MAX_MONTHS: usize = 120;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: required("SERVER_PORT_BACKEND")?,
        body_limit: required("SERVER_BODY_LIMIT")?,
        timeout: required("SERVER_TIMEOUT")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
        max_connections: optional("DATABASE_MAX_CONNECTIONS")?
            .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
    };

    let staff_auth = get_staff_auth()?;

    let analytics = Analytics {
        cohort_max_months: optional("COHORT_MAX_MONTHS")?.unwrap_or(DEFAULT_COHORT_MAX_MONTHS),
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        staff_auth,
        analytics,
    })
}

pub fn get_staff_auth() -> Result<StaffAuth> {
    dotenvy::dotenv().ok();

    Ok(StaffAuth {
        jwt_secret: required("JWT_STAFF_SECRET")?,
    })
}

fn required<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = std::env::var(key).with_context(|| format!("{key} is invalid"))?;
    raw.parse::<T>()
        .with_context(|| format!("{key} is invalid"))
}

fn optional<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("{key} is invalid")),
        _ => Ok(None),
    }
}
