//! Error types for uartlink.
//!
//! The byte-feeding and control paths of a [`Session`](crate::Session) have no
//! error channel of their own: "no bytes yet" is a normal polling outcome and
//! frame acceptance is reported as a `bool`. Errors exist for the surrounding
//! plumbing instead -- opening ports, configuring sessions, and the physical
//! drivers that sit underneath a backend.

/// The error type for uartlink setup and driver operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (serial port open, line control, OS driver).
    #[error("transport error: {0}")]
    Transport(String),

    /// An invalid parameter was passed while configuring a session or port.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The underlying port has been closed or was never opened.
    #[error("not connected")]
    NotConnected,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
