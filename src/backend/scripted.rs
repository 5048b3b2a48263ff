//! Scripted backend for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{BackendError, GenerativeBackend, SamplingParams};

/// In-memory backend that replays a queue of canned replies.
///
/// Each call pops the next scripted reply; an exhausted queue behaves like a
/// transport failure so tests exercising the degradation path stay honest.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, BackendError>>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    /// Create an empty scripted backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful text reply.
    pub fn push_text(&self, text: impl Into<String>) {
        self.replies.lock().push_back(Ok(text.into()));
    }

    /// Queue a failing call.
    pub fn push_error(&self, error: BackendError) {
        self.replies.lock().push_back(Err(error));
    }

    /// Number of generation calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn generate(&self, _prompt: &str, _params: Option<&SamplingParams>) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::Transport("scripted backend exhausted".to_string())))
    }
}
