pub mod event;
pub mod seat;

pub use event::{EventLink, EventSnapshot};
pub use seat::{free_seats, new_seats, RectFill, SeatId};
