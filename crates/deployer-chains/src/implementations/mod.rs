//! Ledger client implementations.
//!
//! Available implementations:
//! - `algod`: Algorand node v2 REST API

pub mod algod;
