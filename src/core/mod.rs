//! Core modules for ClickJudge

pub mod aggregator;
pub mod transport;
pub mod scheduler;
pub mod recorder;
pub mod replayer;
pub mod codec;
pub mod store;
pub mod prefs;
pub mod controller;
pub mod event_loop;
pub mod api;

#[cfg(test)]
mod test_support;

pub use aggregator::{format_rate, rate, summarize};
pub use transport::{SimulatedTransport, VideoTransport};
pub use scheduler::{Scheduler, TimerId, TokioScheduler};
pub use recorder::Recorder;
pub use replayer::{ReplayState, Replayer};
pub use codec::{decode_str, decode_value, parse_video_id, serialize, share_hash, Document, ImportedSession};
pub use store::{
    export_remote, fetch_remote, load_document, save_document, DirectoryStore, HttpStore, RemoteStore,
    ShareResponse,
};
pub use prefs::Preferences;
pub use controller::SessionController;
pub use event_loop::{run_session, SessionEvent};
pub use api::{create_router, run_server};
