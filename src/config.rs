// src/config.rs
use crate::error::{AppError, AppResult};
use std::{env, path::PathBuf, str::FromStr};

// Um ano; acima disto `time::Duration::hours` deixa de ser seguro para a expiração da sessão
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Configuração lida das variáveis de ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub session_database_url: String,
    pub session_ttl_hours: i64,
    pub max_upload_bytes: usize,
    pub bcrypt_cost: u32,
    pub admin_username: String,
    // Só cria o administrador inicial quando definida
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let data_dir = PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "data".into()));
        let session_database_url = env::var("SESSION_DATABASE_URL").unwrap_or_else(|_| {
            format!("sqlite://{}", data_dir.join("sessions.db").display())
        });
        let max_upload_mb: usize = parse_var("MAX_UPLOAD_MB", 10)?;

        let config = Self {
            port: parse_var("PORT", 3000)?,
            data_dir,
            session_database_url,
            session_ttl_hours: parse_var("SESSION_TTL_HOURS", 24)?,
            max_upload_bytes: upload_bytes(max_upload_mb)?,
            bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            admin_username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
            admin_password: env::var("ADMIN_PASSWORD").ok().filter(|p| !p.is_empty()),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(AppError::Config(format!(
                "BCRYPT_COST deve estar entre 4 e 31 (recebido {})",
                self.bcrypt_cost
            )));
        }
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.session_ttl_hours) {
            return Err(AppError::Config(format!(
                "SESSION_TTL_HOURS deve estar entre 1 e {} (recebido {})",
                MAX_SESSION_TTL_HOURS, self.session_ttl_hours
            )));
        }
        if self.max_upload_bytes == 0 {
            return Err(AppError::Config("MAX_UPLOAD_MB deve ser positivo".into()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            data_dir: PathBuf::from("data"),
            session_database_url: "sqlite://data/sessions.db".into(),
            session_ttl_hours: 24,
            max_upload_bytes: 10 * 1024 * 1024,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            admin_username: "admin".into(),
            admin_password: None,
        }
    }
}

fn upload_bytes(megabytes: usize) -> AppResult<usize> {
    megabytes
        .checked_mul(1024 * 1024)
        .ok_or_else(|| AppError::Config(format!("MAX_UPLOAD_MB demasiado grande: {}", megabytes)))
}

fn parse_var<T: FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} inválida: '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_bcrypt_cost() {
        let config = Config { bcrypt_cost: 2, ..Config::default() };
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn session_ttl_must_fit_session_expiry() {
        for hours in [0, -5, MAX_SESSION_TTL_HOURS + 1, i64::MAX] {
            let config = Config { session_ttl_hours: hours, ..Config::default() };
            assert!(matches!(config.validate(), Err(AppError::Config(_))), "{}", hours);
        }
        let config = Config { session_ttl_hours: MAX_SESSION_TTL_HOURS, ..Config::default() };
        assert!(config.validate().is_ok());
        // O maior valor aceite ainda constrói a expiração sem pânico
        let _ = time::Duration::hours(MAX_SESSION_TTL_HOURS);
    }

    #[test]
    fn upload_limit_overflow_is_a_config_error() {
        assert_eq!(upload_bytes(10).unwrap(), 10 * 1024 * 1024);
        assert!(matches!(upload_bytes(usize::MAX), Err(AppError::Config(_))));
        assert!(matches!(upload_bytes(usize::MAX / 1024), Err(AppError::Config(_))));
    }
}
