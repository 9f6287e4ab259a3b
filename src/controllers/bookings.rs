use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{ApiResult, BookingError};
use crate::models::{BookingContainer, PageModel, SelectionSummary};
use crate::selector::{FieldTarget, RenderTargets, RenderedFields, SeatSelector, Toggle};
use crate::services::session::Session;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/booking", get(booking_page))
        .route("/booking/preview", post(preview_selection))
}

/* ---------- helpers ---------- */

// GET /api/booking?movie=..&theater=..&address=..&price=..&targets=..
#[derive(Debug, Deserialize)]
pub struct BookingQuery {
    pub movie: Option<String>,
    pub theater: Option<String>,
    pub address: Option<String>,
    /// Отсутствие цены - такая же ошибка, как нечисловая цена.
    pub price: Option<String>,
    /// Список целей через запятую; по умолчанию все четыре.
    pub targets: Option<String>,
}

impl BookingQuery {
    pub fn container(&self, state: &AppState) -> Result<BookingContainer, BookingError> {
        let price = self
            .price
            .clone()
            .ok_or_else(|| BookingError::InvalidPrice(String::new()))?;
        Ok(BookingContainer {
            movie: self.movie.clone().unwrap_or_default(),
            theater: self.theater.clone().unwrap_or_default(),
            address: self.address.clone().unwrap_or_default(),
            price,
            seats: state.layout.clone(),
        })
    }

    pub fn targets(&self) -> Result<Vec<FieldTarget>, BookingError> {
        match self.targets.as_deref() {
            Some(raw) => FieldTarget::parse_list(raw),
            None => Ok(FieldTarget::ALL.to_vec()),
        }
    }
}

/* ---------- PAGE ---------- */

async fn booking_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookingQuery>,
) -> ApiResult<Json<PageModel>> {
    let targets = query.targets()?;
    let page = Session::page_model(
        query.container(&state)?,
        &state.config.booking.currency_symbol,
        &targets,
    )?;
    Ok(Json(page))
}

/* ---------- PREVIEW ---------- */

// POST /api/booking/preview
#[derive(Debug, Deserialize, Validate)]
pub struct PreviewRequest {
    #[serde(default)]
    pub movie: String,
    #[serde(default)]
    pub theater: String,
    #[serde(default)]
    pub address: String,
    pub price: String,
    /// Клики по порядку; повторный клик снимает выбор.
    #[validate(length(max = 500))]
    pub clicks: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub success: bool,
    pub summary: SelectionSummary,
    pub fields: RenderedFields,
    pub ignored: Vec<String>,
    pub form_body: String,
}

async fn preview_selection(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PreviewRequest>,
) -> ApiResult<Json<PreviewResponse>> {
    req.validate().map_err(BookingError::from)?;

    let container = BookingContainer {
        movie: req.movie,
        theater: req.theater,
        address: req.address,
        price: req.price,
        seats: state.layout.clone(),
    };
    let mut selector = SeatSelector::new(
        container,
        state.config.booking.currency_symbol.clone(),
        RenderTargets::detached(),
    )?;

    let mut ignored = Vec::new();
    for seat in req.clicks {
        if selector.toggle_seat(&seat) == Toggle::Ignored {
            ignored.push(seat);
        }
    }

    let fields = selector.refresh();
    let form_body = selector.booking_form().to_form_body()?;

    Ok(Json(PreviewResponse {
        success: true,
        summary: selector.compute_summary(),
        fields,
        ignored,
        form_body,
    }))
}
