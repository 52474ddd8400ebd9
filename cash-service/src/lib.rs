//! # Cash Service
//!
//! Application service layer for cash counter management.
//!
//! The service is generic over `A: CashApi`, allowing the HTTP client or an
//! in-memory double to be injected. It applies the local session and transfer
//! rules from `cash-types` before issuing exactly one request per action.

pub mod service;


pub use service::{CashService, CloseOutcome};
