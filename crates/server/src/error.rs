use session::SessionFault;
use thiserror::Error;

use crate::transport::TransportError;

/// Reasons the run loop stops without a `close`.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Session(#[from] SessionFault),
}
