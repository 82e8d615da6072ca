//! Data bridge: runs dashboard fetches off the UI loop.
//!
//! Each request gets its own task; the response goes back as an
//! [`Action::Fetched`] whether or not it is still current. The dashboard
//! decides what to keep. Tasks still running at shutdown are abandoned
//! through the shared cancellation token.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use retrievos_api::DashboardClient;
use retrievos_core::{FetchRequest, fetch};

use crate::action::Action;

pub fn spawn_fetch(
    client: DashboardClient,
    request: FetchRequest,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        let response = tokio::select! {
            () = cancel.cancelled() => {
                debug!(?request, "fetch abandoned");
                return;
            }
            response = fetch::execute(&client, request.clone()) => response,
        };
        if action_tx.send(Action::Fetched(Box::new(response))).is_err() {
            debug!("action channel closed, dropping fetch result");
        }
    });
}
