pub mod seat;
pub mod booking;
pub mod page;

pub use seat::{Seat, SeatElement};
pub use booking::{BookingContainer, BookingContext, BookingForm, SelectionSummary};
pub use page::PageModel;
