//! Cutline Session - the live editing session.
//!
//! [`EditorSession`] ties the entity model, history, autosave scheduling and
//! the playback clock together behind the discrete intents an input surface
//! emits. The engine is single-threaded cooperative: all timers are virtual
//! deadlines driven by the host's frame loop.

pub mod autosave;
pub mod playback;
pub mod session;

pub use autosave::{AutosaveConfig, AutosaveScheduler, PersistenceSink, SavePhase};
pub use playback::{PlaybackClock, TICK_SECS};
pub use session::{EditorSession, SessionConfig};
