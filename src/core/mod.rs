pub mod calendar;
pub mod error;
pub mod money;
pub mod nullable;

pub use calendar::{BusinessCalendar, BusinessClock, Clock, FixedClock, SystemClock};
pub use error::{AppError, Result};
pub use money::round_money;
