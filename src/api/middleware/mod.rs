//! API middleware stack.
//!
//! Only request logging; the clinic API carries no authentication.

pub mod audit;
