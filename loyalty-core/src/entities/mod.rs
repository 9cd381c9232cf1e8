//! Row types and their SQL.
//!
//! Each entity owns the statements that touch its table. Single-statement
//! operations take a pool reference; multi-statement operations are `_tx`
//! helpers taking an open transaction so callers control commit boundaries.

pub mod order;
pub mod user;
pub mod withdrawal;

pub use order::{OrderRecord, OrderStatus};
pub use user::{Balance, UserRecord};
pub use withdrawal::WithdrawalRecord;
