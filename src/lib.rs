//! Shared library for the auction client and server binaries: the wire
//! codec, the filesystem-backed store, the request dispatcher, and the
//! transports that connect them.

pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod model;
pub mod store;
pub mod transport;

pub use error::{AuctionError, Result};
