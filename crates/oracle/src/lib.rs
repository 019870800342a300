pub mod api;
mod error;
pub mod judge;
pub mod ledger;
pub mod pipeline;
pub mod settings;
pub mod store;
pub mod util;

pub use error::{Error, Result};
