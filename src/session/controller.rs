use super::config::SessionConfig;
use super::state::{Effect, Phase, SessionEvent, SessionState, SessionStatus};
use super::transcript::{Message, Originator, TranscriptStore};
use crate::agent::{AgentEvent, AgentOptions, VoiceAgent};
use crate::error::{CastingFitError, Result};
use crate::feedback::{FeedbackPoller, FeedbackSource, FeedbackState, SessionGuard};
use crate::registry::{Resource, ResourceRegistry};
use futures::stream::{BoxStream, StreamExt};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

/// Registry key of the voice agent handle
pub const AGENT_RESOURCE_KEY: &str = "voice-agent";
/// Registry key of the task pumping agent events
pub const DRIVER_RESOURCE_KEY: &str = "session-driver";
/// Registry key of the liveness flag polls check before retrying
pub const GUARD_RESOURCE_KEY: &str = "session-guard";

pub const MISSING_INPUT_MESSAGE: &str =
    "Requirements and skills context are required for CastingFit";
pub const ALREADY_RUNNING_MESSAGE: &str = "A CastingFit session is already running";

/// Everything a view needs to render the current session
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_key: Option<String>,
    pub phase: Phase,
    pub active: bool,
    pub status: SessionStatus,
    pub identifier: Option<String>,
    pub error: Option<String>,
    pub messages: Vec<Message>,
    pub feedback: FeedbackState,
}

/// Drives one voice-agent interview at a time
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

struct Inner {
    config: SessionConfig,
    agent: Arc<dyn VoiceAgent>,
    feedback_source: Arc<dyn FeedbackSource>,
    registry: Arc<ResourceRegistry>,
    state: Mutex<SessionState>,
    transcript: Mutex<TranscriptStore>,
    feedback: Arc<watch::Sender<FeedbackState>>,
    session_key: Mutex<Option<String>>,
    /// Cleared on shutdown
    alive: Arc<AtomicBool>,
    /// Bumped on every start; events and polls from older runs are dropped
    generation: Arc<AtomicU64>,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        agent: Arc<dyn VoiceAgent>,
        feedback_source: Arc<dyn FeedbackSource>,
        registry: Arc<ResourceRegistry>,
    ) -> Self {
        let (feedback, _) = watch::channel(FeedbackState::Idle);

        Self {
            inner: Arc::new(Inner {
                config,
                agent,
                feedback_source,
                registry,
                state: Mutex::new(SessionState::new()),
                transcript: Mutex::new(TranscriptStore::new()),
                feedback: Arc::new(feedback),
                session_key: Mutex::new(None),
                alive: Arc::new(AtomicBool::new(true)),
                generation: Arc::new(AtomicU64::new(0)),
            }),
        }
    }

    /// Open a voice-agent session for the given role requirements and candidate profile.
    ///
    /// Empty input, or a session that is still live, is reported as a
    /// user-visible error and leaves the agent untouched.
    pub async fn start(&self, requirements: &str, skills_context: &str) -> Result<()> {
        let inner = &self.inner;

        if requirements.trim().is_empty() || skills_context.trim().is_empty() {
            warn!("Refusing to start session: missing requirements or skills context");
            inner.state.lock().await.error = Some(MISSING_INPUT_MESSAGE.to_string());
            return Err(CastingFitError::Validation(MISSING_INPUT_MESSAGE.to_string()));
        }

        if inner.state.lock().await.apply(SessionEvent::Start) == Effect::Rejected {
            warn!("Session already running");
            return Err(CastingFitError::Validation(ALREADY_RUNNING_MESSAGE.to_string()));
        }

        let generation = inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        inner.alive.store(true, Ordering::SeqCst);

        let session_key = format!("castingfit-{}", uuid::Uuid::new_v4());
        info!("Starting session {}", session_key);
        *inner.session_key.lock().await = Some(session_key);

        inner.feedback.send_replace(FeedbackState::Idle);
        {
            let mut transcript = inner.transcript.lock().await;
            transcript.clear();
            transcript.append(Message::new(
                inner.config.welcome_message.clone(),
                Originator::Agent,
                inner.config.agent_display_name.clone(),
            ));
        }

        let options = AgentOptions::for_interview(&inner.config.agent, requirements, skills_context);

        inner
            .registry
            .register(AGENT_RESOURCE_KEY, Resource::Session(Arc::clone(&inner.agent)))
            .await;
        inner
            .registry
            .register(GUARD_RESOURCE_KEY, Resource::Guard(Arc::clone(&inner.alive)))
            .await;

        let events = inner.agent.subscribe();
        let driver = tokio::spawn(Arc::clone(inner).drive(generation, options, events));
        inner
            .registry
            .register(DRIVER_RESOURCE_KEY, Resource::Task(driver))
            .await;

        Ok(())
    }

    /// Close the session: deactivate it, append the closing message and
    /// retrieve feedback for `identifier`, if there is one.
    pub async fn leave(&self, identifier: Option<String>) {
        self.inner.leave(identifier).await;
    }

    /// User-initiated leave: stop the agent, then close with whatever call id is known.
    ///
    /// While the call is still opening, the stop and the close wait for the
    /// start result so a late call is stopped and its id kept.
    pub async fn hang_up(&self) {
        let inner = &self.inner;
        let generation = inner.generation.load(Ordering::SeqCst);

        let effect = inner.state.lock().await.apply(SessionEvent::Leave);
        match effect {
            Effect::None => debug!("Hang-up ignored: no live session"),
            Effect::AwaitStart => info!("Hang-up while the call is opening; closing once it starts"),
            effect => {
                inner.run_effect(effect).await;
                inner.dispatch(generation, SessionEvent::Terminated).await;
            }
        }
    }

    pub async fn dismiss_error(&self) {
        self.inner.state.lock().await.error = None;
    }

    /// Tear down everything the controller holds. Pending feedback retries
    /// notice and stop without publishing.
    pub async fn shutdown(&self) {
        let inner = &self.inner;
        info!("Shutting down session controller");

        inner.alive.store(false, Ordering::SeqCst);
        inner.registry.cleanup_all().await;

        {
            let mut state = inner.state.lock().await;
            if state.is_active() {
                state.end();
            }
        }
        inner.transcript.lock().await.clear();
    }

    pub async fn snapshot(&self) -> SessionView {
        let inner = &self.inner;
        let state = inner.state.lock().await.clone();

        SessionView {
            session_key: inner.session_key.lock().await.clone(),
            phase: state.phase,
            active: state.is_active(),
            status: state.status,
            identifier: state.identifier,
            error: state.error,
            messages: inner.transcript.lock().await.deduped_view(),
            feedback: inner.feedback.borrow().clone(),
        }
    }

    pub async fn is_active(&self) -> bool {
        self.inner.state.lock().await.is_active()
    }

    pub async fn phase(&self) -> Phase {
        self.inner.state.lock().await.phase
    }

    pub async fn error(&self) -> Option<String> {
        self.inner.state.lock().await.error.clone()
    }

    pub async fn identifier(&self) -> Option<String> {
        self.inner.state.lock().await.identifier.clone()
    }

    /// De-duplicated transcript
    pub async fn messages(&self) -> Vec<Message> {
        self.inner.transcript.lock().await.deduped_view()
    }

    pub fn feedback_state(&self) -> FeedbackState {
        self.inner.feedback.borrow().clone()
    }

    pub fn feedback_updates(&self) -> watch::Receiver<FeedbackState> {
        self.inner.feedback.subscribe()
    }

    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        &self.inner.registry
    }
}

impl Inner {
    /// Pump the start result and agent events into the state machine until the session ends
    async fn drive(
        self: Arc<Self>,
        generation: u64,
        options: AgentOptions,
        mut events: BoxStream<'static, AgentEvent>,
    ) {
        debug!("Session driver started");

        let agent = Arc::clone(&self.agent);
        let mut start = agent.start(options);
        let mut start_pending = true;

        loop {
            tokio::select! {
                result = &mut start, if start_pending => {
                    start_pending = false;
                    let event = match result {
                        Ok(call) => {
                            match &call.id {
                                Some(id) => info!("Voice agent started call {}", id),
                                None => warn!("Voice agent start returned no call id"),
                            }
                            SessionEvent::Started(call.id)
                        }
                        Err(e) => {
                            error!("Voice agent failed to start: {}", e);
                            SessionEvent::StartFailed
                        }
                    };
                    self.dispatch(generation, event).await;
                }
                event = events.next() => match event {
                    Some(event) => self.on_agent_event(generation, event).await,
                    None => {
                        debug!("Agent event stream closed");
                        self.dispatch(generation, SessionEvent::Terminated).await;
                    }
                },
            }

            if self.generation.load(Ordering::SeqCst) != generation
                || self.state.lock().await.phase == Phase::Ended
            {
                break;
            }
        }

        debug!("Session driver stopped");
    }

    async fn on_agent_event(self: &Arc<Self>, generation: u64, event: AgentEvent) {
        if self.generation.load(Ordering::SeqCst) != generation {
            return;
        }

        match event {
            AgentEvent::Terminated => {
                info!("Voice agent call ended");
                self.dispatch(generation, SessionEvent::Terminated).await;
            }
            AgentEvent::Fault { message } => {
                let fault = CastingFitError::SessionFault {
                    message: message.clone(),
                };
                if fault.is_benign_fault() {
                    debug!("Ignoring benign agent fault: {}", message);
                } else {
                    error!("Voice agent error: {}", fault);
                }
                self.dispatch(generation, SessionEvent::Fault(message)).await;
            }
            AgentEvent::SpeechStarted => self.set_status(SessionStatus::Speaking).await,
            AgentEvent::SpeechEnded => self.set_status(SessionStatus::Listening).await,
            AgentEvent::Transcript { originator, text } => {
                let sender = match originator {
                    Originator::Agent => &self.config.agent_display_name,
                    Originator::User => &self.config.candidate_display_name,
                };
                self.transcript
                    .lock()
                    .await
                    .append(Message::new(text, originator, sender.clone()));

                let mut state = self.state.lock().await;
                if state.is_active() {
                    state.status = match (originator, state.status) {
                        (Originator::User, _) => SessionStatus::Analyzing,
                        (Originator::Agent, SessionStatus::Analyzing) => SessionStatus::Next,
                        (Originator::Agent, status) => status,
                    };
                }
            }
        }
    }

    async fn set_status(&self, status: SessionStatus) {
        let mut state = self.state.lock().await;
        if state.is_active() {
            state.status = status;
        }
    }

    async fn dispatch(self: &Arc<Self>, generation: u64, event: SessionEvent) {
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Dropping {:?} from a previous session", event);
            return;
        }

        let effect = self.state.lock().await.apply(event);
        self.run_effect(effect).await;
    }

    async fn run_effect(self: &Arc<Self>, effect: Effect) {
        match effect {
            Effect::None | Effect::Rejected | Effect::AwaitStart => {}
            Effect::ShowError(message) => warn!("Session error: {}", message),
            Effect::StopAgent => {
                if !self.registry.release_session().await {
                    debug!("No session handle left to stop");
                }
            }
            Effect::Close(identifier) => {
                self.registry.release_session().await;
                self.leave(identifier).await;
            }
            Effect::Leave(identifier) => {
                self.registry.forget_session().await;
                self.leave(identifier).await;
            }
        }
    }

    async fn leave(self: &Arc<Self>, identifier: Option<String>) {
        info!("Leaving session (call id: {:?})", identifier);

        self.state.lock().await.end();
        self.transcript.lock().await.append(Message::new(
            self.config.closing_message.clone(),
            Originator::Agent,
            self.config.agent_display_name.clone(),
        ));

        match identifier {
            Some(call_id) => {
                let guard = SessionGuard::new(Arc::clone(&self.alive), Arc::clone(&self.generation));
                let poller = FeedbackPoller::new(
                    Arc::clone(&self.feedback_source),
                    Arc::clone(&self.feedback),
                    &self.config.feedback,
                )
                .with_guard(guard);
                let retries = self.config.feedback.max_retries;

                self.feedback.send_replace(FeedbackState::Loading {
                    retries_remaining: retries,
                });
                tokio::spawn(async move {
                    poller.fetch(&call_id, retries).await;
                });
            }
            None => {
                warn!("No call id available; skipping feedback retrieval");
                self.feedback.send_replace(FeedbackState::NoIdentifier);
            }
        }
    }
}
