//! Error taxonomy shared by the client, server, codec, and store.

use thiserror::Error;

/// Top-level error type for the auction service.
///
/// Every variant maps to one of the failure kinds the protocol
/// distinguishes on the wire or at the CLI boundary.
#[derive(Debug, Error)]
pub enum AuctionError {
    /// A client-supplied command argument failed local validation.
    #[error("invalid argument: {0}")]
    ArgumentError(String),

    /// An inbound or outbound message violated the wire format.
    #[error("protocol error")]
    ProtocolViolation,

    /// The peer replied with the `ERR` sentinel.
    #[error("protocol message error")]
    ProtocolMessageError,

    /// No reply (client) or no request bytes (server) within the deadline.
    #[error("timed out waiting for the peer")]
    Timeout,

    /// A network-level failure: setup, send, receive, or unexpected close.
    #[error("a network error has occurred")]
    Socket(#[source] std::io::Error),

    /// An invariant breach or filesystem failure inside the store.
    #[error("database error: {0}")]
    Database(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// The store actor task is gone.
    #[error("store channel closed")]
    StoreGone,
}

impl From<std::io::Error> for AuctionError {
    fn from(e: std::io::Error) -> Self {
        AuctionError::Socket(e)
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for AuctionError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        AuctionError::StoreGone
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for AuctionError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        AuctionError::StoreGone
    }
}

impl From<config::ConfigError> for AuctionError {
    fn from(e: config::ConfigError) -> Self {
        AuctionError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AuctionError>;
