use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Upper limit on how long `TeardownHandle::wait` blocks.
pub const MAX_TEARDOWN_WAIT: Duration = Duration::from_secs(60);

/// Something a session holds that must be let go before another session starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Microphone,
    Render,
    Player,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::Microphone, Resource::Render, Resource::Player];
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("teardown timed out after {waited_ms} ms, still holding {pending:?}")]
pub struct TeardownWarning {
    pub pending: Vec<Resource>,
    pub waited_ms: u64,
}

#[derive(Debug)]
struct ReleaseState {
    pending: Vec<Resource>,
}

/// Set once per resource by whichever side finishes releasing it.
#[derive(Debug)]
pub struct ReleaseSignal {
    state: Mutex<ReleaseState>,
    released: Condvar,
}

impl ReleaseSignal {
    pub fn new(pending: &[Resource]) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ReleaseState {
                pending: pending.to_vec(),
            }),
            released: Condvar::new(),
        })
    }

    /// Releasing twice is a no-op.
    pub fn release(&self, resource: Resource) {
        let mut state = self.state.lock();
        let before = state.pending.len();
        state.pending.retain(|r| *r != resource);
        if state.pending.len() != before {
            tracing::debug!(?resource, remaining = state.pending.len(), "resource released");
            self.released.notify_all();
        }
    }

    pub fn pending(&self) -> Vec<Resource> {
        self.state.lock().pending.clone()
    }

    pub fn is_complete(&self) -> bool {
        self.state.lock().pending.is_empty()
    }
}

/// Awaitable end of a session teardown. Clones observe the same signal.
#[derive(Clone, Debug)]
pub struct TeardownHandle {
    signal: Arc<ReleaseSignal>,
}

impl TeardownHandle {
    pub fn new(signal: Arc<ReleaseSignal>) -> Self {
        Self { signal }
    }

    pub fn is_complete(&self) -> bool {
        self.signal.is_complete()
    }

    pub fn pending(&self) -> Vec<Resource> {
        self.signal.pending()
    }

    /// Block until every resource is released or `timeout` elapses. The
    /// timeout is capped at `MAX_TEARDOWN_WAIT`.
    pub fn wait(&self, timeout: Duration) -> Result<(), TeardownWarning> {
        let started = Instant::now();
        let timeout = timeout.min(MAX_TEARDOWN_WAIT);
        let deadline = started.checked_add(timeout).unwrap_or(started);
        let mut state = self.signal.state.lock();
        while !state.pending.is_empty() {
            if self
                .signal
                .released
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                break;
            }
        }
        if state.pending.is_empty() {
            return Ok(());
        }
        let warning = TeardownWarning {
            pending: state.pending.clone(),
            waited_ms: started.elapsed().as_millis() as u64,
        };
        tracing::warn!(pending = ?warning.pending, "teardown incomplete");
        Err(warning)
    }
}
