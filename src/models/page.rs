use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::BookingContainer;
use crate::selector::{FieldTarget, RenderedFields};

/// Всё, что нужно странице, чтобы отрисовать схему зала и начальный итог.
#[derive(Debug, Clone, Serialize)]
pub struct PageModel {
    /// Есть только у страницы, отданной открытой сессией (кадр init).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    pub rendered_at: DateTime<Utc>,
    pub container: BookingContainer,
    /// Цели, которые есть на странице; в остальные ничего не пишется.
    pub targets: Vec<FieldTarget>,
    pub fields: RenderedFields,
}
