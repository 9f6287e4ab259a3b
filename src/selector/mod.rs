//! Состояние выбора мест одной страницы бронирования.
//!
//! `SeatSelector` владеет выбором целиком: после инициализации он никогда не
//! перечитывает страницу. Каждое переключение места пересчитывает итог и
//! отрисовывает его во все подключённые цели.

pub mod sink;

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};
use validator::Validate;

use crate::error::BookingError;
use crate::models::booking::format_amount;
use crate::models::{BookingContainer, BookingContext, BookingForm, Seat, SelectionSummary};

pub use sink::{ChannelSink, FieldSink, FieldTarget, FieldUpdate, OptionalSink, RenderTargets};

/// Результат клика по месту.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Toggle {
    Selected,
    Deselected,
    /// Место занято или неизвестно; выбор не изменился.
    Ignored,
}

/// Значения, записанные в цели при последней отрисовке.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedFields {
    pub seat_count: String,
    pub total_price: String,
    pub seats_input: String,
    pub amount_input: String,
}

#[derive(Debug)]
pub struct SeatSelector {
    context: BookingContext,
    movie: String,
    theater: String,
    address: String,
    currency_symbol: String,
    /// Только доступные места, в порядке документа.
    seats: Vec<Seat>,
    index: HashMap<String, usize>,
    occupied: HashSet<String>,
    targets: RenderTargets,
}

impl SeatSelector {
    pub fn new(
        container: BookingContainer,
        currency_symbol: impl Into<String>,
        targets: RenderTargets,
    ) -> Result<Self, BookingError> {
        container.validate()?;
        let context = BookingContext::from_attribute(&container.price)?;

        let mut seen = HashSet::new();
        let mut seats = Vec::new();
        let mut occupied = HashSet::new();
        for element in container.seats {
            if !seen.insert(element.id.clone()) {
                return Err(BookingError::DuplicateSeat(element.id));
            }
            if element.occupied {
                occupied.insert(element.id);
            } else {
                seats.push(Seat::from(element));
            }
        }

        // Итог при выборе всех мест тоже должен остаться конечным числом
        if !(context.unit_price() * seats.len() as f64).is_finite() {
            return Err(BookingError::InvalidPrice(container.price));
        }

        let index = seats
            .iter()
            .enumerate()
            .map(|(i, seat)| (seat.id.clone(), i))
            .collect();

        Ok(Self {
            context,
            movie: container.movie,
            theater: container.theater,
            address: container.address,
            currency_symbol: currency_symbol.into(),
            seats,
            index,
            occupied,
            targets,
        })
    }

    pub fn context(&self) -> BookingContext {
        self.context
    }

    /// Доступные для клика места.
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn is_selected(&self, seat_id: &str) -> bool {
        self.index
            .get(seat_id)
            .map(|&i| self.seats[i].selected)
            .unwrap_or(false)
    }

    pub fn selected_ids(&self) -> impl Iterator<Item = &str> {
        self.seats.iter().filter(|s| s.selected).map(|s| s.id.as_str())
    }

    /// Переключает место и сразу перерисовывает итог.
    pub fn toggle_seat(&mut self, seat_id: &str) -> Toggle {
        let Some(&i) = self.index.get(seat_id) else {
            if self.occupied.contains(seat_id) {
                warn!("Click on occupied seat {} ignored", seat_id);
            } else {
                warn!("Click on unknown seat {} ignored", seat_id);
            }
            return Toggle::Ignored;
        };

        let seat = &mut self.seats[i];
        seat.selected = !seat.selected;
        let outcome = if seat.selected { Toggle::Selected } else { Toggle::Deselected };
        debug!("Seat {} -> {:?}", seat_id, outcome);

        self.refresh();
        outcome
    }

    pub fn compute_summary(&self) -> SelectionSummary {
        let count = self.seats.iter().filter(|s| s.selected).count();
        SelectionSummary {
            count,
            total: count as f64 * self.context.unit_price(),
        }
    }

    /// Пишет итог во все подключённые цели и возвращает записанные значения.
    pub fn render(&mut self, summary: &SelectionSummary) -> RenderedFields {
        let amount = format_amount(summary.total);
        let fields = RenderedFields {
            seat_count: summary.count.to_string(),
            total_price: format!("{}{}", self.currency_symbol, amount),
            seats_input: self.selected_ids().collect::<Vec<_>>().join(","),
            amount_input: amount,
        };

        self.targets.write(FieldTarget::SeatCount, &fields.seat_count);
        self.targets.write(FieldTarget::TotalPrice, &fields.total_price);
        self.targets.write(FieldTarget::SeatsInput, &fields.seats_input);
        self.targets.write(FieldTarget::AmountInput, &fields.amount_input);

        fields
    }

    pub fn refresh(&mut self) -> RenderedFields {
        let summary = self.compute_summary();
        self.render(&summary)
    }

    /// Форма для отправки на оплату с текущим выбором.
    pub fn booking_form(&self) -> BookingForm {
        BookingForm {
            movie: self.movie.clone(),
            theater: self.theater.clone(),
            address: self.address.clone(),
            seats: self.selected_ids().collect::<Vec<_>>().join(","),
            amount: format_amount(self.compute_summary().total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeatElement;
    use proptest::prelude::*;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn container(price: &str, seats: Vec<SeatElement>) -> BookingContainer {
        BookingContainer {
            movie: "Dune".into(),
            theater: "PVR Forum".into(),
            address: "Koramangala".into(),
            price: price.into(),
            seats,
        }
    }

    fn row(ids: &[&str]) -> Vec<SeatElement> {
        ids.iter().map(|id| SeatElement::available(*id)).collect()
    }

    fn wired(price: &str, seats: Vec<SeatElement>) -> (SeatSelector, UnboundedReceiver<FieldUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let targets = RenderTargets::channel(&FieldTarget::ALL, &tx);
        (SeatSelector::new(container(price, seats), "₹", targets).unwrap(), rx)
    }

    // последнее значение каждой цели
    fn latest(rx: &mut UnboundedReceiver<FieldUpdate>) -> HashMap<FieldTarget, String> {
        let mut fields = HashMap::new();
        while let Ok(update) = rx.try_recv() {
            fields.insert(update.target, update.value);
        }
        fields
    }

    #[test]
    fn three_seats_at_200_render_600() {
        let (mut selector, mut rx) = wired("200", row(&["A1", "A2", "A3", "A4"]));
        for id in ["A1", "A2", "A3"] {
            assert_eq!(selector.toggle_seat(id), Toggle::Selected);
        }

        assert_eq!(selector.compute_summary(), SelectionSummary { count: 3, total: 600.0 });
        let fields = latest(&mut rx);
        assert_eq!(fields[&FieldTarget::SeatCount], "3");
        assert_eq!(fields[&FieldTarget::TotalPrice], "₹600");
        assert_eq!(fields[&FieldTarget::SeatsInput], "A1,A2,A3");
        assert_eq!(fields[&FieldTarget::AmountInput], "600");
    }

    #[test]
    fn empty_selection_renders_zero() {
        let (mut selector, mut rx) = wired("200", row(&["A1"]));
        let fields = selector.refresh();

        assert_eq!(fields.total_price, "₹0");
        assert_eq!(fields.amount_input, "0");
        assert_eq!(fields.seats_input, "");
        assert_eq!(latest(&mut rx)[&FieldTarget::AmountInput], "0");
    }

    #[test]
    fn seats_field_follows_document_order_not_click_order() {
        let (mut selector, _rx) = wired("100", row(&["A1", "A2", "A3"]));
        selector.toggle_seat("A3");
        selector.toggle_seat("A1");
        assert_eq!(selector.booking_form().seats, "A1,A3");
    }

    #[test]
    fn occupied_seat_cannot_be_selected() {
        let mut seats = row(&["A1", "A2"]);
        seats.push(SeatElement::occupied("A3"));
        let (mut selector, mut rx) = wired("200", seats);

        assert_eq!(selector.toggle_seat("A3"), Toggle::Ignored);
        assert!(!selector.is_selected("A3"));
        assert_eq!(selector.seats().len(), 2);
        assert!(latest(&mut rx).is_empty(), "ignored clicks do not re-render");
    }

    #[test]
    fn unknown_seat_is_ignored() {
        let (mut selector, _rx) = wired("200", row(&["A1"]));
        assert_eq!(selector.toggle_seat("Z9"), Toggle::Ignored);
        assert_eq!(selector.compute_summary().count, 0);
    }

    #[test]
    fn select_then_deselect_all_restores_hidden_fields() {
        let (mut selector, mut rx) = wired("250", row(&["B1", "B2"]));
        selector.toggle_seat("B1");
        selector.toggle_seat("B2");
        selector.toggle_seat("B1");
        selector.toggle_seat("B2");

        let fields = latest(&mut rx);
        assert_eq!(fields[&FieldTarget::SeatsInput], "");
        assert_eq!(fields[&FieldTarget::AmountInput], "0");
    }

    #[test]
    fn missing_display_targets_are_skipped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let targets = RenderTargets::channel(&[FieldTarget::SeatsInput, FieldTarget::AmountInput], &tx);
        let mut selector =
            SeatSelector::new(container("200", row(&["A1"])), "₹", targets).unwrap();

        selector.toggle_seat("A1");

        let fields = latest(&mut rx);
        assert!(!fields.contains_key(&FieldTarget::TotalPrice));
        assert!(!fields.contains_key(&FieldTarget::SeatCount));
        assert_eq!(fields[&FieldTarget::AmountInput], "200");
    }

    #[test]
    fn detached_selector_still_computes() {
        let mut selector =
            SeatSelector::new(container("99.5", row(&["A1", "A2"])), "$", RenderTargets::detached())
                .unwrap();
        selector.toggle_seat("A1");
        selector.toggle_seat("A2");
        assert_eq!(selector.refresh().total_price, "$199");
    }

    #[test]
    fn duplicate_seat_ids_are_rejected() {
        let mut seats = row(&["A1"]);
        seats.push(SeatElement::occupied("A1"));
        let err = SeatSelector::new(container("200", seats), "₹", RenderTargets::detached())
            .unwrap_err();
        assert!(matches!(err, BookingError::DuplicateSeat(id) if id == "A1"));
    }

    #[test]
    fn malformed_price_fails_initialization() {
        let err = SeatSelector::new(container("two hundred", row(&["A1"])), "₹", RenderTargets::detached())
            .unwrap_err();
        assert!(matches!(err, BookingError::InvalidPrice(_)));
    }

    #[test]
    fn price_that_overflows_the_full_total_is_rejected() {
        let err = SeatSelector::new(container("1e308", row(&["A1", "A2"])), "₹", RenderTargets::detached())
            .unwrap_err();
        assert!(matches!(err, BookingError::InvalidPrice(raw) if raw == "1e308"));
    }

    #[test]
    fn large_price_with_one_seat_stays_finite() {
        let mut selector =
            SeatSelector::new(container("1e308", row(&["A1"])), "₹", RenderTargets::detached())
                .unwrap();
        selector.toggle_seat("A1");
        let fields = selector.refresh();
        assert!(selector.compute_summary().total.is_finite());
        assert_ne!(fields.amount_input, "inf");
    }

    #[test]
    fn booking_form_carries_container_attributes() {
        let (mut selector, _rx) = wired("200", row(&["A1", "A2"]));
        selector.toggle_seat("A2");
        let form = selector.booking_form();
        assert_eq!(form.movie, "Dune");
        assert_eq!(form.theater, "PVR Forum");
        assert_eq!(form.seats, "A2");
        assert_eq!(form.amount, "200");
    }

    fn seat_ids(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("S{}", i)).collect()
    }

    proptest! {
        #[test]
        fn distinct_toggles_count_and_total(
            price in 0u32..10_000,
            picked in proptest::sample::subsequence(seat_ids(20), 0..=20),
        ) {
            let seats = seat_ids(20).into_iter().map(SeatElement::available).collect();
            let mut selector = SeatSelector::new(
                container(&price.to_string(), seats), "₹", RenderTargets::detached(),
            ).unwrap();

            for id in &picked {
                prop_assert_eq!(selector.toggle_seat(id), Toggle::Selected);
            }

            let summary = selector.compute_summary();
            prop_assert_eq!(summary.count, picked.len());
            prop_assert_eq!(summary.total, picked.len() as f64 * price as f64);
        }

        #[test]
        fn double_toggle_is_an_involution(
            price in 0u32..10_000,
            preselected in proptest::sample::subsequence(seat_ids(12), 0..=12),
            target in 1usize..=12,
        ) {
            let seats = seat_ids(12).into_iter().map(SeatElement::available).collect();
            let mut selector = SeatSelector::new(
                container(&price.to_string(), seats), "₹", RenderTargets::detached(),
            ).unwrap();
            for id in &preselected {
                selector.toggle_seat(id);
            }

            let before_ids: Vec<String> = selector.selected_ids().map(str::to_string).collect();
            let before_fields = selector.refresh();

            let id = format!("S{}", target);
            selector.toggle_seat(&id);
            selector.toggle_seat(&id);

            let after_ids: Vec<String> = selector.selected_ids().map(str::to_string).collect();
            prop_assert_eq!(before_ids, after_ids);
            prop_assert_eq!(before_fields, selector.refresh());
        }
    }
}
