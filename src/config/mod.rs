use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::collections::HashSet;
use validator::{Validate, ValidationError};

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub booking: BookingConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

// Настройки страницы бронирования: валюта и схема зала
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookingConfig {
    #[validate(length(min = 1, max = 8))]
    pub currency_symbol: String,
    /// Буквы рядов в порядке отрисовки, например `ABCDEFGH`.
    #[validate(length(min = 1, max = 26), custom(function = "validate_seat_rows"))]
    pub seat_rows: String,
    #[validate(range(min = 1, max = 99))]
    pub seats_per_row: u32,
    /// Места, которые на странице уже помечены как занятые.
    pub occupied_seats: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has invalid value `{value}`")]
    Invalid { name: &'static str, value: String },
    #[error("booking settings are invalid: {0}")]
    Booking(#[from] validator::ValidationErrors),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Собирает конфигурацию из произвольного источника переменных.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let config = Config {
            app: AppConfig {
                host: var_or("HOST", "0.0.0.0"),
                port: parse_var("PORT", var_or("PORT", "8000"))?,
                environment: var_or("ENVIRONMENT", "development"),
                rust_log: var_or("RUST_LOG", "seat_selector=debug,tower_http=debug"),
            },
            booking: BookingConfig {
                currency_symbol: var_or("CURRENCY_SYMBOL", "₹"),
                seat_rows: var_or("SEAT_ROWS", "ABCDEFGH"),
                seats_per_row: parse_var("SEATS_PER_ROW", var_or("SEATS_PER_ROW", "10"))?,
                occupied_seats: split_list(&var_or("OCCUPIED_SEATS", "")),
            },
        };

        config.booking.validate()?;
        Ok(config)
    }
}

fn parse_var<T: FromStr>(name: &'static str, raw: String) -> Result<T, ConfigError> {
    match raw.trim().parse() {
        Ok(value) => Ok(value),
        Err(_) => Err(ConfigError::Invalid { name, value: raw }),
    }
}

// Повтор буквы даёт одинаковые id мест, и ни одна страница не откроется
fn validate_seat_rows(rows: &str) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for row in rows.chars() {
        if row.is_whitespace() || row == ',' {
            return Err(ValidationError::new("seat_rows_invalid_char"));
        }
        if !seen.insert(row) {
            return Err(ValidationError::new("seat_rows_duplicate"));
        }
    }
    Ok(())
}

// "A3, B5,,C1" -> ["A3", "B5", "C1"]
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
