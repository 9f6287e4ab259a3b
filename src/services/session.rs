//! session.rs
//!
//! Сессия выбора мест живёт ровно столько, сколько открыта страница
//! бронирования: создаётся при подключении и выбрасывается при закрытии сокета.
//!
//! Все кадры обрабатываются последовательно в одной задаче. Выбор принадлежит
//! задаче целиком, поэтому блокировки не нужны.

use chrono::Utc;
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::BookingError;
use crate::models::{BookingContainer, PageModel, SelectionSummary};
use crate::selector::{FieldTarget, FieldUpdate, RenderTargets, SeatSelector, Toggle};

/// Кадры от страницы.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Click { seat: String },
    Summary,
    Submit,
}

/// Кадры для страницы.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Init { page: PageModel },
    Field(FieldUpdate),
    Ignored { seat: String },
    Summary(SelectionSummary),
    Form { body: String },
    Error { message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to send frame: {0}")]
    Transport(String),
}

pub struct Session {
    id: Uuid,
    selector: SeatSelector,
    updates: UnboundedReceiver<FieldUpdate>,
    page: PageModel,
}

impl Session {
    pub fn open(
        container: BookingContainer,
        currency_symbol: &str,
        targets: &[FieldTarget],
    ) -> Result<Self, BookingError> {
        let id = Uuid::new_v4();
        let (selector, updates, page) = prepare(container, currency_symbol, targets, Some(id))?;
        Ok(Self { id, selector, updates, page })
    }

    /// Модель страницы без сессии: первичная отрисовка до подключения сокета.
    /// Идентификатор сессии появится только в кадре init.
    pub fn page_model(
        container: BookingContainer,
        currency_symbol: &str,
        targets: &[FieldTarget],
    ) -> Result<PageModel, BookingError> {
        prepare(container, currency_symbol, targets, None).map(|(_, _, page)| page)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn page(&self) -> &PageModel {
        &self.page
    }

    /// Главный цикл: init, затем по одному ответу на каждый входящий кадр.
    pub async fn run<R, S>(mut self, mut inbound: R, mut outbound: S) -> Result<(), SessionError>
    where
        R: Stream<Item = String> + Unpin,
        S: Sink<ServerMessage> + Unpin,
        S::Error: Display,
    {
        info!(
            "Session {} opened for '{}' ({} seats)",
            self.id(),
            self.page.container.movie,
            self.selector.seats().len()
        );

        send(&mut outbound, ServerMessage::Init { page: self.page.clone() }).await?;

        let mut frames = 0usize;
        while let Some(frame) = inbound.next().await {
            frames += 1;
            for reply in self.handle_frame(&frame) {
                send(&mut outbound, reply).await?;
            }
        }

        info!(
            "Session {} closed after {} frames, {} seats left selected",
            self.id(),
            frames,
            self.selector.compute_summary().count
        );
        Ok(())
    }

    pub fn handle_frame(&mut self, frame: &str) -> Vec<ServerMessage> {
        let message = match serde_json::from_str::<ClientMessage>(frame) {
            Ok(message) => message,
            Err(e) => {
                warn!("Session {}: malformed frame: {}", self.id(), e);
                return vec![ServerMessage::Error { message: format!("malformed frame: {}", e) }];
            }
        };

        match message {
            ClientMessage::Click { seat } => match self.selector.toggle_seat(&seat) {
                Toggle::Ignored => vec![ServerMessage::Ignored { seat }],
                outcome => {
                    debug!("Session {}: {} {:?}", self.id(), seat, outcome);
                    self.drain_updates()
                }
            },
            ClientMessage::Summary => vec![ServerMessage::Summary(self.selector.compute_summary())],
            ClientMessage::Submit => match self.selector.booking_form().to_form_body() {
                Ok(body) => vec![ServerMessage::Form { body }],
                Err(e) => {
                    error!("Session {}: {}", self.id(), e);
                    vec![ServerMessage::Error { message: e.to_string() }]
                }
            },
        }
    }

    fn drain_updates(&mut self) -> Vec<ServerMessage> {
        let mut replies = Vec::new();
        while let Ok(update) = self.updates.try_recv() {
            replies.push(ServerMessage::Field(update));
        }
        replies
    }
}

fn prepare(
    container: BookingContainer,
    currency_symbol: &str,
    targets: &[FieldTarget],
    session_id: Option<Uuid>,
) -> Result<(SeatSelector, UnboundedReceiver<FieldUpdate>, PageModel), BookingError> {
    let (tx, mut updates) = mpsc::unbounded_channel();
    let mut selector = SeatSelector::new(
        container.clone(),
        currency_symbol,
        RenderTargets::channel(targets, &tx),
    )?;

    // Начальные значения уходят в кадре init, отдельные field-кадры не нужны
    let fields = selector.refresh();
    while updates.try_recv().is_ok() {}

    let page = PageModel {
        session_id,
        rendered_at: Utc::now(),
        container,
        targets: targets.to_vec(),
        fields,
    };

    Ok((selector, updates, page))
}

async fn send<S>(outbound: &mut S, message: ServerMessage) -> Result<(), SessionError>
where
    S: Sink<ServerMessage> + Unpin,
    S::Error: Display,
{
    outbound
        .send(message)
        .await
        .map_err(|e| SessionError::Transport(e.to_string()))
}
