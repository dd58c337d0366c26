//! Resource registry
//!
//! Tracks live external resources so every teardown path (user leave, call
//! end, controller shutdown) releases each of them exactly once. The active
//! voice agent handle has a dedicated slot: only one is ever "the" session.

use crate::agent::VoiceAgent;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Teardown operation a resource variant exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Teardown {
    Stop,
    Cleanup,
    Destroy,
    Dispose,
}

/// A disposable resource
pub enum Resource {
    /// Voice agent call handle; always stored in the session slot
    Session(Arc<dyn VoiceAgent>),
    /// Background task, aborted on teardown
    Task(JoinHandle<()>),
    /// Arbitrary cleanup callback
    Hook(Box<dyn FnOnce() + Send>),
    /// Temporary file, removed on teardown
    Scratch(PathBuf),
    /// Liveness flag, cleared on teardown
    Guard(Arc<AtomicBool>),
    /// Tracked but never torn down
    Retained(String),
}

impl Resource {
    pub fn teardown_kind(&self) -> Option<Teardown> {
        match self {
            Resource::Session(_) | Resource::Task(_) => Some(Teardown::Stop),
            Resource::Hook(_) => Some(Teardown::Cleanup),
            Resource::Scratch(_) => Some(Teardown::Destroy),
            Resource::Guard(_) => Some(Teardown::Dispose),
            Resource::Retained(_) => None,
        }
    }

    /// Run this resource's teardown. Returns the operation invoked, if any.
    async fn teardown(self) -> Option<Teardown> {
        let kind = self.teardown_kind();
        match self {
            Resource::Session(agent) => {
                if let Err(e) = agent.stop().await {
                    warn!("Failed to stop voice agent: {}", e);
                }
            }
            Resource::Task(handle) => handle.abort(),
            Resource::Hook(hook) => hook(),
            Resource::Scratch(path) => {
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    warn!("Failed to remove {}: {}", path.display(), e);
                }
            }
            Resource::Guard(flag) => flag.store(false, Ordering::SeqCst),
            Resource::Retained(label) => debug!("Leaving {} untouched", label),
        }
        kind
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Resource::Session(_) => "Session",
            Resource::Task(_) => "Task",
            Resource::Hook(_) => "Hook",
            Resource::Scratch(_) => "Scratch",
            Resource::Guard(_) => "Guard",
            Resource::Retained(_) => "Retained",
        };
        f.write_str(name)
    }
}

#[derive(Default)]
struct Slots {
    session: Option<Arc<dyn VoiceAgent>>,
    resources: HashMap<String, Resource>,
}

/// Shared registry of live resources, one per application
#[derive(Default)]
pub struct ResourceRegistry {
    slots: Mutex<Slots>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a resource. Session handles replace the session slot whatever the
    /// key; other resources replace any previous entry under the same key.
    pub async fn register(&self, key: impl Into<String>, resource: Resource) {
        let key = key.into();
        let mut slots = self.slots.lock().await;

        match resource {
            Resource::Session(agent) => {
                if slots.session.replace(agent).is_some() {
                    debug!("Replaced session handle (registered as {})", key);
                }
            }
            other => {
                debug!("Registering {:?} resource under {}", other, key);
                slots.resources.insert(key, other);
            }
        }
    }

    /// Stop the session handle and empty its slot. Returns whether one was stopped.
    pub async fn release_session(&self) -> bool {
        let session = self.slots.lock().await.session.take();
        match session {
            Some(agent) => Resource::Session(agent).teardown().await.is_some(),
            None => false,
        }
    }

    /// Empty the session slot without stopping, for calls the vendor already closed
    pub async fn forget_session(&self) -> bool {
        let forgotten = self.slots.lock().await.session.take().is_some();
        if forgotten {
            debug!("Session handle dropped without teardown");
        }
        forgotten
    }

    pub async fn has_session(&self) -> bool {
        self.slots.lock().await.session.is_some()
    }

    /// Number of tracked resources, session slot included
    pub async fn len(&self) -> usize {
        let slots = self.slots.lock().await;
        slots.resources.len() + usize::from(slots.session.is_some())
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Tear down everything once and empty the registry.
    ///
    /// Returns the number of teardown operations invoked; calling it again
    /// with nothing registered returns 0.
    pub async fn cleanup_all(&self) -> usize {
        let (session, resources) = {
            let mut slots = self.slots.lock().await;
            (
                slots.session.take(),
                std::mem::take(&mut slots.resources),
            )
        };

        let mut invoked = 0;

        if let Some(agent) = session {
            if Resource::Session(agent).teardown().await.is_some() {
                invoked += 1;
            }
        }

        for (key, resource) in resources {
            if let Some(kind) = resource.teardown().await {
                debug!("Tore down {} ({:?})", key, kind);
                invoked += 1;
            }
        }

        if invoked > 0 {
            info!("Released {} resource(s)", invoked);
        }

        invoked
    }
}
