use environment::EnvironmentFactory;
use session::{Control, Session};
use tracing::{error, info, warn};

use crate::{error::ServerError, transport::Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Completed request/reply exchanges, including the final `close`.
    pub exchanges: u64,
}

/// Serves the session until a `close` has been answered. Any fault ends the
/// loop immediately; the pending request is left unanswered.
pub async fn serve<T, F>(
    transport: &mut T,
    session: &mut Session<F>,
) -> Result<RunSummary, ServerError>
where
    T: Transport,
    F: EnvironmentFactory,
{
    let mut exchanges = 0;
    loop {
        let message = transport.receive().await.map_err(|error| {
            error!(%error, "transport fault; stopping");
            error
        })?;

        let reply = match session.handle_message(&message) {
            Ok(reply) => reply,
            Err(fault) => {
                error!(kind = ?fault.kind(), %fault, "fatal session fault; stopping without reply");
                return Err(fault.into());
            }
        };
        if let Some(raw) = &reply.coerced_action {
            warn!(action = %raw, "invalid action; defaulting to 0 (noop)");
        }

        transport.send(&reply.response).await?;
        exchanges += 1;

        if reply.control == Control::Shutdown {
            info!(exchanges, "session closed");
            return Ok(RunSummary { exchanges });
        }
    }
}

#[cfg(test)]
#[path = "tests/run_tests.rs"]
mod tests;
