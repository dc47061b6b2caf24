//! Change-detection-driven autosave scheduling.
//!
//! The scheduler watches a fingerprint of the save-worthy state, debounces
//! bursts of edits into one save, and guarantees at most one save is ever in
//! flight. Persistence itself is an injected sink; completion is reported
//! back explicitly so asynchronous sinks fit without threads or a runtime.

use cutline_core::Result;
use cutline_timeline::ProjectSnapshot;
use tracing::{debug, warn};

/// The injected persistence collaborator.
///
/// `submit` is fire-and-forget: the host begins the write (local storage,
/// remote API, file system) and later reports the outcome through
/// [`AutosaveScheduler::save_finished`].
pub trait PersistenceSink {
    fn submit(&mut self, snapshot: ProjectSnapshot);
}

/// Scheduler phase. Explicit states instead of ambient flags: anything that
/// must not overlap a save checks the phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SavePhase {
    Idle,
    /// A debounce deadline is armed (seconds on the host clock).
    Pending { deadline: f64 },
    /// A save was submitted and has not completed yet.
    Saving,
}

/// Scheduler timing knobs.
#[derive(Debug, Clone, Copy)]
pub struct AutosaveConfig {
    /// Debounce delay after the last observed change, seconds.
    pub delay: f64,
    /// Post-construction quiet period, seconds. Changes observed inside the
    /// window are recorded but never compared, so loading a project is not
    /// mistaken for an edit.
    pub warmup: f64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            delay: 3.0,
            warmup: 1.5,
        }
    }
}

/// Debounced, diff-detecting autosave state machine.
#[derive(Debug)]
pub struct AutosaveScheduler<S> {
    sink: S,
    config: AutosaveConfig,
    phase: SavePhase,
    /// Fingerprint of the last successfully persisted state.
    last_saved: Option<String>,
    /// Fingerprint seen by the previous `observe` call; deadline resets
    /// happen only when this changes, not on every poll of a dirty state.
    last_observed: Option<String>,
    /// Fingerprint submitted with the in-flight save, promoted on success.
    in_flight: Option<String>,
    started_at: f64,
}

impl<S: PersistenceSink> AutosaveScheduler<S> {
    pub fn new(sink: S, config: AutosaveConfig, now: f64) -> Self {
        Self {
            sink,
            config,
            phase: SavePhase::Idle,
            last_saved: None,
            last_observed: None,
            in_flight: None,
            started_at: now,
        }
    }

    pub fn phase(&self) -> SavePhase {
        self.phase
    }

    pub fn is_saving(&self) -> bool {
        self.phase == SavePhase::Saving
    }

    /// Record the just-loaded state's fingerprint as already saved, so the
    /// first dirty check compares against it instead of an empty baseline.
    pub fn prime(&mut self, fingerprint: String) {
        self.last_saved = Some(fingerprint);
    }

    /// Observe the current state fingerprint.
    ///
    /// Inside the warm-up window the fingerprint is recorded without
    /// comparison. Afterwards, any difference from the last-saved
    /// fingerprint arms (or re-arms, replace-on-reset) the debounce
    /// deadline. Observations while a save is in flight are ignored; the
    /// next cycle after completion re-arms naturally.
    pub fn observe(&mut self, fingerprint: &str, now: f64) {
        if now < self.started_at + self.config.warmup {
            self.last_saved = Some(fingerprint.to_string());
            self.last_observed = Some(fingerprint.to_string());
            return;
        }

        let changed = self.last_observed.as_deref() != Some(fingerprint);
        if changed {
            self.last_observed = Some(fingerprint.to_string());
        }
        let dirty = self.last_saved.as_deref() != Some(fingerprint);

        match self.phase {
            // A save in flight absorbs everything; the first observation
            // after completion re-arms if the state is still dirty.
            SavePhase::Saving => {}
            SavePhase::Idle if dirty => {
                self.phase = SavePhase::Pending {
                    deadline: now + self.config.delay,
                };
            }
            SavePhase::Pending { .. } if !dirty => {
                // Reverted to the saved state before the deadline fired.
                self.phase = SavePhase::Idle;
            }
            SavePhase::Pending { .. } if changed => {
                self.phase = SavePhase::Pending {
                    deadline: now + self.config.delay,
                };
            }
            _ => {}
        }
    }

    /// Whether the caller should build a snapshot and [`begin_save`] now:
    /// the debounce deadline has passed, nothing is in flight, and the state
    /// still differs from what was last saved (an edit that was reverted
    /// before the deadline disarms instead of saving).
    ///
    /// [`begin_save`]: AutosaveScheduler::begin_save
    pub fn should_save(&mut self, fingerprint: &str, now: f64) -> bool {
        match self.phase {
            SavePhase::Pending { deadline } if now >= deadline => {
                if self.last_saved.as_deref() == Some(fingerprint) {
                    self.phase = SavePhase::Idle;
                    false
                } else {
                    true
                }
            }
            _ => false,
        }
    }

    /// Submit a save to the sink. Refused (returning false) while another
    /// save is in flight.
    pub fn begin_save(&mut self, snapshot: ProjectSnapshot, fingerprint: String) -> bool {
        if self.phase == SavePhase::Saving {
            return false;
        }
        debug!(project = %snapshot.project_name, "submitting save");
        self.phase = SavePhase::Saving;
        self.in_flight = Some(fingerprint);
        self.sink.submit(snapshot);
        true
    }

    /// Report completion of the in-flight save.
    ///
    /// Success promotes the submitted fingerprint to last-saved; failure
    /// discards it (so the next dirty cycle or manual save retries) and is
    /// logged rather than silently swallowed.
    pub fn save_finished(&mut self, result: Result<()>) {
        if self.phase != SavePhase::Saving {
            warn!("save completion reported with no save in flight");
            return;
        }
        self.phase = SavePhase::Idle;
        match result {
            Ok(()) => {
                self.last_saved = self.in_flight.take();
                debug!("save completed");
            }
            Err(error) => {
                self.in_flight = None;
                warn!(%error, "autosave failed; will retry on next change cycle");
            }
        }
    }
}
