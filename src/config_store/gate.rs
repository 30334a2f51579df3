use std::{
    sync::{Arc, Mutex, OnceLock, PoisonError},
    time::{Duration, Instant},
};

/// Minimum spacing between two accepted change notifications.
///
/// The file watcher reports a single save as two events in quick
/// succession; anything inside this window after an accepted change is
/// treated as the echo of that change.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_secs(1);

static GLOBAL_GATE: OnceLock<Arc<ChangeGate>> = OnceLock::new();

/// Debounce gate for file-change invalidations.
///
/// Holds the time of the last accepted change. A notification is accepted
/// when at least `window` has passed since then; there is no timer, the
/// window is checked lazily on each notification.
#[derive(Debug)]
pub struct ChangeGate {
    window: Duration,
    last_accepted: Mutex<Instant>,
}

impl ChangeGate {
    /// Creates a gate with the default window, starting closed for one
    /// window from now.
    pub fn new() -> Self {
        Self::with_window(DEFAULT_DEBOUNCE_WINDOW)
    }

    /// Creates a gate with a custom window, starting closed for one window
    /// from now.
    pub fn with_window(window: Duration) -> Self {
        Self::starting_at(window, Instant::now())
    }

    /// Creates a gate whose last accepted change is `last_accepted`.
    pub fn starting_at(window: Duration, last_accepted: Instant) -> Self {
        Self {
            window,
            last_accepted: Mutex::new(last_accepted),
        }
    }

    /// The process-wide gate shared by every store that does not bring its own.
    ///
    /// Initialised on first use, so changes within the first window after
    /// that are suppressed.
    pub fn global() -> Arc<Self> {
        Arc::clone(GLOBAL_GATE.get_or_init(|| Arc::new(Self::new())))
    }

    /// The debounce window
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Time of the last accepted change
    pub fn last_accepted(&self) -> Instant {
        *self.lock()
    }

    /// Runs `on_accept` if a change arriving at `now` passes the gate.
    ///
    /// On acceptance the action runs first and `now` is then recorded as the
    /// last accepted change, both under the gate's lock, so concurrent
    /// notifications cannot both pass. Returns the action's result, or
    /// `None` if the change was suppressed.
    pub fn admit_at<R>(&self, now: Instant, on_accept: impl FnOnce() -> R) -> Option<R> {
        let mut last_accepted = self.lock();

        if now.saturating_duration_since(*last_accepted) < self.window {
            return None;
        }

        let result = on_accept();
        *last_accepted = now;

        Some(result)
    }

    /// [`ChangeGate::admit_at`] using the current time
    pub fn admit<R>(&self, on_accept: impl FnOnce() -> R) -> Option<R> {
        self.admit_at(Instant::now(), on_accept)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Instant> {
        self.last_accepted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ChangeGate {
    fn default() -> Self {
        Self::new()
    }
}
