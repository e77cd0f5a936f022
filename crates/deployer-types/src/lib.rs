pub mod common;
pub mod configs;
pub mod errors;
pub mod ledger;
pub mod transaction;

pub use common::*;
pub use configs::*;
pub use errors::*;
pub use ledger::*;
pub use transaction::*;
