//! Timeout-bounded collaborator calls.

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use super::{CollaboratorError, IntentExtractor, IntentRequest, NarrationRequest, Narrator, RoomView};

/// A collaborator whose every call runs on a worker thread and is abandoned
/// after a fixed timeout.
///
/// An abandoned worker is left to finish on its own; its late answer is
/// dropped.
pub struct Guarded<T: ?Sized> {
    inner: Arc<T>,
    timeout: Duration,
}

impl<T: ?Sized> Clone for Guarded<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            timeout: self.timeout,
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> Guarded<T> {
    /// Wrap a collaborator.
    pub fn new(inner: Arc<T>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// The configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `f` against the collaborator, waiting at most the timeout.
    pub fn call<R, F>(&self, label: &str, f: F) -> Result<R, CollaboratorError>
    where
        R: Send + 'static,
        F: FnOnce(&T) -> Result<R, CollaboratorError> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let (tx, rx) = mpsc::sync_channel(1);
        std::thread::Builder::new()
            .name(format!("collaborator-{label}"))
            .spawn(move || {
                // The receiver may already have given up.
                let _ = tx.send(f(&inner));
            })
            .map_err(|e| CollaboratorError::Unavailable(e.to_string()))?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(CollaboratorError::Timeout(
                u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            )),
            Err(RecvTimeoutError::Disconnected) => Err(CollaboratorError::Disconnected),
        }
    }
}

impl Guarded<dyn IntentExtractor> {
    /// Interpret an action within the timeout.
    pub fn extract(&self, request: &IntentRequest) -> Result<String, CollaboratorError> {
        let request = request.clone();
        self.call("intent", move |x| x.extract(&request))
    }
}

impl Guarded<dyn Narrator> {
    /// Narrate an outcome within the timeout.
    pub fn narrate(&self, request: &NarrationRequest) -> Result<String, CollaboratorError> {
        let request = request.clone();
        self.call("narrate", move |n| n.narrate(&request))
    }

    /// Describe a room within the timeout.
    pub fn describe_room(&self, room: &RoomView) -> Result<String, CollaboratorError> {
        let room = room.clone();
        self.call("describe", move |n| n.describe_room(&room))
    }
}
