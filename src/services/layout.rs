use std::collections::HashSet;
use tracing::{info, warn};

use crate::config::BookingConfig;
use crate::models::SeatElement;

/// Схема зала из настроек: ряды сверху вниз, места слева направо.
pub fn build_layout(config: &BookingConfig) -> Vec<SeatElement> {
    let occupied: HashSet<&str> = config.occupied_seats.iter().map(String::as_str).collect();

    let mut seats = Vec::with_capacity(config.seat_rows.chars().count() * config.seats_per_row as usize);
    for row in config.seat_rows.chars() {
        for number in 1..=config.seats_per_row {
            let id = format!("{}{}", row, number);
            let element = if occupied.contains(id.as_str()) {
                SeatElement::occupied(id)
            } else {
                SeatElement::available(id)
            };
            seats.push(element);
        }
    }

    // Занятые места, которых нет в схеме, скорее всего опечатка в настройках
    for id in &config.occupied_seats {
        if !seats.iter().any(|s| &s.id == id) {
            warn!("Occupied seat {} is not part of the layout", id);
        }
    }

    info!(
        "Seat layout built: {} seats, {} occupied",
        seats.len(),
        seats.iter().filter(|s| s.occupied).count()
    );
    seats
}
