use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::{future, SinkExt, StreamExt};
use std::sync::Arc;
use tracing::warn;

use crate::controllers::bookings::BookingQuery;
use crate::error::ApiResult;
use crate::services::session::{ServerMessage, Session};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/booking/ws", get(booking_socket))
}

// GET /api/booking/ws - одна сессия на одну открытую страницу
async fn booking_socket(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookingQuery>,
) -> ApiResult<Response> {
    // Ошибки цены и целей отдаём до апгрейда, обычным 400
    let targets = query.targets()?;
    let session = Session::open(
        query.container(&state)?,
        &state.config.booking.currency_symbol,
        &targets,
    )?;

    Ok(ws.on_upgrade(move |socket| drive(socket, session)))
}

async fn drive(socket: WebSocket, session: Session) {
    let id = session.id();
    let (sender, receiver) = socket.split();

    let outbound = sender.with(|message: ServerMessage| {
        future::ready(
            serde_json::to_string(&message)
                .map(|text| Message::Text(text.into()))
                .map_err(|e| axum::Error::new(e)),
        )
    });

    // Close или ошибка транспорта завершают сессию, бинарные и ping-кадры пропускаем
    let inbound = receiver
        .take_while(|frame| future::ready(!matches!(frame, Ok(Message::Close(_)) | Err(_))))
        .filter_map(|frame| {
            future::ready(match frame {
                Ok(Message::Text(text)) => Some(text.as_str().to_owned()),
                _ => None,
            })
        });

    if let Err(e) = session.run(inbound, outbound).await {
        warn!("Session {} aborted: {}", id, e);
    }
}
