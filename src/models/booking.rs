use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::BookingError;
use crate::models::SeatElement;

/// Контейнер страницы бронирования: атрибуты сеанса и список мест.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookingContainer {
    #[validate(length(max = 256))]
    pub movie: String,
    #[validate(length(max = 256))]
    pub theater: String,
    #[validate(length(max = 512))]
    pub address: String,
    /// Сырое значение data-атрибута с ценой за место.
    pub price: String,
    #[validate(length(max = 2600))]
    pub seats: Vec<SeatElement>,
}

/// Цена за место, прочитанная один раз при инициализации.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BookingContext {
    unit_price: f64,
}

impl BookingContext {
    pub fn new(unit_price: f64) -> Result<Self, BookingError> {
        if !unit_price.is_finite() {
            return Err(BookingError::InvalidPrice(unit_price.to_string()));
        }
        if unit_price < 0.0 {
            return Err(BookingError::NegativePrice(unit_price));
        }
        // -0 превращаем в 0, иначе итог отрисуется как "-0"
        let unit_price = if unit_price == 0.0 { 0.0 } else { unit_price };
        Ok(Self { unit_price })
    }

    pub fn from_attribute(raw: &str) -> Result<Self, BookingError> {
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| BookingError::InvalidPrice(raw.to_string()))?;
        Self::new(value)
    }

    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SelectionSummary {
    pub count: usize,
    pub total: f64,
}

/// Поля формы, которые уходят на `/payment` после выбора мест.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingForm {
    pub movie: String,
    pub theater: String,
    pub address: String,
    pub seats: String,
    pub amount: String,
}

impl BookingForm {
    /// `application/x-www-form-urlencoded` тело для отправки формы.
    pub fn to_form_body(&self) -> Result<String, BookingError> {
        Ok(serde_urlencoded::to_string(self)?)
    }
}

/// Сумма в виде, в котором она пишется в поля: `600`, `150.5`.
pub fn format_amount(amount: f64) -> String {
    format!("{}", amount)
}
