//! Request/reply front end for a single simulation session.
//!
//! ```text
//! server
//!   ├─ TcpReplyTransport  (newline-delimited JSON, one peer)
//!   ├─ serve              (receive → handle → send loop)
//!   └─ Settings           (defaults, server.toml, APP__* env vars, CLI)
//! ```

pub mod config;
mod error;
pub mod run;
pub mod transport;

pub use error::ServerError;
pub use run::{serve, RunSummary};
pub use transport::{TcpReplyTransport, Transport, TransportError};
