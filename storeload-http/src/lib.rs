#![forbid(unsafe_code)]

mod client;
mod error;
mod types;
mod util;

pub use client::HttpPurchaseTransport;
pub use error::{Error, Result};
pub use types::{DEFAULT_BASE_PATH, TransportTimeouts};
