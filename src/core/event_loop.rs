//! Host event loop
//!
//! Key presses, timer fires and transport notifications all arrive on one
//! channel and run to completion one at a time against the controller.
//! A display update is broadcast after every event that changed something.

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

use crate::core::codec::ImportedSession;
use crate::core::controller::SessionController;
use crate::core::scheduler::{Scheduler, TimerId};
use crate::core::transport::VideoTransport;
use crate::types::{DisplayUpdate, KeyBindings, Mode, ReplayReason, Sign};

/// Everything the session reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Key press from the recording surface
    Key(String),
    /// On-screen +1/-1 button
    Click(Sign),
    /// Replay timer fire
    Tick(TimerId),
    TransportReady,
    TransportLost,
    SetMode(Mode),
    ToggleMode,
    SetJudgeName(String),
    SetBindings(KeyBindings),
    Reset,
    Import(ImportedSession),
    Shutdown,
}

/// Drive `controller` until `Shutdown` or until every sender is gone.
/// Returns the controller so the caller can inspect or export the session.
pub async fn run_session<T, S>(
    mut controller: SessionController<T, S>,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
    updates: broadcast::Sender<DisplayUpdate>,
) -> SessionController<T, S>
where
    T: VideoTransport,
    S: Scheduler,
{
    info!(mode = %controller.session().mode, "session loop started");

    while let Some(event) = events.recv().await {
        debug!(?event, "session event");
        let changed = match event {
            SessionEvent::Key(key) => controller.handle_key(&key).is_recorded(),
            SessionEvent::Click(sign) => controller.click(sign).is_recorded(),
            SessionEvent::Tick(timer) => {
                controller.on_tick(timer).reason != ReplayReason::R209_STALE_TICK
            }
            SessionEvent::TransportReady => controller.on_transport_ready().is_some(),
            SessionEvent::TransportLost => {
                controller.on_transport_lost();
                true
            }
            SessionEvent::SetMode(mode) => controller.set_mode(mode).is_some(),
            SessionEvent::ToggleMode => controller.toggle_mode().is_some(),
            SessionEvent::SetJudgeName(name) => {
                controller.set_judge_name(&name);
                false
            }
            SessionEvent::SetBindings(bindings) => {
                controller.set_bindings(bindings);
                false
            }
            SessionEvent::Reset => {
                controller.reset();
                true
            }
            SessionEvent::Import(imported) => {
                controller.import(imported);
                true
            }
            SessionEvent::Shutdown => {
                controller.shutdown();
                let _ = updates.send(controller.display());
                break;
            }
        };

        if changed {
            // No subscribers is fine
            let _ = updates.send(controller.display());
        }
    }

    info!(entries = controller.session().timeline.len(), "session loop finished");
    controller
}

// =============================================================================
// TESTS
// =============================================================================
