//! Цели отрисовки итога.
//!
//! Каждая цель - необязательный приёмник: если на странице нет соответствующего
//! элемента, запись в него просто ничего не делает. Правило одинаково для
//! видимых полей и для скрытых полей формы.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::BookingError;

/// Элементы страницы, в которые пишется итог выбора.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldTarget {
    /// Видимое количество выбранных мест.
    SeatCount,
    /// Видимая сумма с символом валюты.
    TotalPrice,
    /// Скрытое поле формы: идентификаторы мест через запятую.
    SeatsInput,
    /// Скрытое поле формы: сумма числом.
    AmountInput,
}

impl FieldTarget {
    pub const ALL: [FieldTarget; 4] = [
        FieldTarget::SeatCount,
        FieldTarget::TotalPrice,
        FieldTarget::SeatsInput,
        FieldTarget::AmountInput,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldTarget::SeatCount => "seat-count",
            FieldTarget::TotalPrice => "total-price",
            FieldTarget::SeatsInput => "seats-input",
            FieldTarget::AmountInput => "amount-input",
        }
    }

    /// Разбирает список целей вида `total-price,seats-input`.
    pub fn parse_list(raw: &str) -> Result<Vec<FieldTarget>, BookingError> {
        let mut targets = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let target: FieldTarget = part.parse()?;
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
        Ok(targets)
    }
}

impl fmt::Display for FieldTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldTarget {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldTarget::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| BookingError::UnknownTarget(s.to_string()))
    }
}

pub trait FieldSink: Send {
    fn write(&mut self, value: &str);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldUpdate {
    pub target: FieldTarget,
    pub value: String,
}

/// Приёмник, который отправляет каждую запись в канал сессии.
pub struct ChannelSink {
    target: FieldTarget,
    tx: UnboundedSender<FieldUpdate>,
}

impl ChannelSink {
    pub fn new(target: FieldTarget, tx: UnboundedSender<FieldUpdate>) -> Self {
        Self { target, tx }
    }
}

impl FieldSink for ChannelSink {
    fn write(&mut self, value: &str) {
        // Получатель закрыт - страница уже ушла, писать некуда
        let _ = self.tx.send(FieldUpdate { target: self.target, value: value.to_string() });
    }
}

#[derive(Default)]
pub struct OptionalSink(Option<Box<dyn FieldSink>>);

impl OptionalSink {
    pub fn absent() -> Self {
        Self(None)
    }

    pub fn attached(sink: Box<dyn FieldSink>) -> Self {
        Self(Some(sink))
    }

    pub fn is_attached(&self) -> bool {
        self.0.is_some()
    }

    pub fn write(&mut self, value: &str) {
        if let Some(sink) = self.0.as_mut() {
            sink.write(value);
        }
    }
}

impl fmt::Debug for OptionalSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OptionalSink").field(&self.is_attached()).finish()
    }
}

/// Набор из четырёх целей; отсутствующие цели пропускаются молча.
#[derive(Debug, Default)]
pub struct RenderTargets {
    seat_count: OptionalSink,
    total_price: OptionalSink,
    seats_input: OptionalSink,
    amount_input: OptionalSink,
}

impl RenderTargets {
    pub fn detached() -> Self {
        Self::default()
    }

    /// Подключает канальные приёмники только для перечисленных целей.
    pub fn channel(targets: &[FieldTarget], tx: &UnboundedSender<FieldUpdate>) -> Self {
        let mut render_targets = Self::detached();
        for &target in targets {
            render_targets.attach(target, Box::new(ChannelSink::new(target, tx.clone())));
        }
        render_targets
    }

    pub fn attach(&mut self, target: FieldTarget, sink: Box<dyn FieldSink>) {
        *self.slot_mut(target) = OptionalSink::attached(sink);
    }

    pub fn is_attached(&self, target: FieldTarget) -> bool {
        match target {
            FieldTarget::SeatCount => self.seat_count.is_attached(),
            FieldTarget::TotalPrice => self.total_price.is_attached(),
            FieldTarget::SeatsInput => self.seats_input.is_attached(),
            FieldTarget::AmountInput => self.amount_input.is_attached(),
        }
    }

    pub fn write(&mut self, target: FieldTarget, value: &str) {
        self.slot_mut(target).write(value);
    }

    fn slot_mut(&mut self, target: FieldTarget) -> &mut OptionalSink {
        match target {
            FieldTarget::SeatCount => &mut self.seat_count,
            FieldTarget::TotalPrice => &mut self.total_price,
            FieldTarget::SeatsInput => &mut self.seats_input,
            FieldTarget::AmountInput => &mut self.amount_input,
        }
    }
}
