//! Bookings

mod display;
mod status;

pub use display::{DisplayStatus, Tone, display_status};
pub use status::{BookingStatus, DepositStatus, FinalPaymentStatus, ParseStatusError};
