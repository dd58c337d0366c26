// Shared fakes for the voice agent and the feedback backend

#![allow(dead_code)]

use castingfit::agent::{AgentEvent, AgentOptions, StartedCall, VoiceAgent};
use castingfit::error::{CastingFitError, Result};
use castingfit::feedback::FeedbackSource;
use futures::channel::mpsc;
use futures::stream::{BoxStream, StreamExt};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

/// Voice agent whose start result and events are driven by the test
#[derive(Default)]
pub struct FakeAgent {
    events: Mutex<Option<mpsc::UnboundedSender<AgentEvent>>>,
    pending_start: Mutex<Option<oneshot::Receiver<Result<StartedCall>>>>,
    started_with: Mutex<Vec<AgentOptions>>,
    stops: AtomicUsize,
}

impl FakeAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `start` wait until the returned sender resolves it
    pub fn defer_start(&self) -> oneshot::Sender<Result<StartedCall>> {
        let (tx, rx) = oneshot::channel();
        *self.pending_start.lock().unwrap() = Some(rx);
        tx
    }

    pub fn emit(&self, event: AgentEvent) {
        if let Some(tx) = self.events.lock().unwrap().as_ref() {
            let _ = tx.unbounded_send(event);
        }
    }

    pub fn last_options(&self) -> Option<AgentOptions> {
        self.started_with.lock().unwrap().last().cloned()
    }

    pub fn start_count(&self) -> usize {
        self.started_with.lock().unwrap().len()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl VoiceAgent for FakeAgent {
    fn subscribe(&self) -> BoxStream<'static, AgentEvent> {
        let (tx, rx) = mpsc::unbounded();
        *self.events.lock().unwrap() = Some(tx);
        rx.boxed()
    }

    async fn start(&self, options: AgentOptions) -> Result<StartedCall> {
        self.started_with.lock().unwrap().push(options);
        let pending = self.pending_start.lock().unwrap().take();
        match pending {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(CastingFitError::Transport("start abandoned".into()))),
            None => Ok(StartedCall {
                id: Some("call-default".into()),
            }),
        }
    }

    async fn stop(&self) -> Result<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Feedback source replaying a script of responses; the last one repeats
pub struct ScriptedFeedback {
    script: Mutex<VecDeque<Result<Value>>>,
    calls: AtomicUsize,
}

impl ScriptedFeedback {
    pub fn new(script: Vec<Result<Value>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always answers with `value`
    pub fn always(value: Value) -> Self {
        Self::new(vec![Ok(value)])
    }

    /// Always fails with a transport error
    pub fn failing() -> Self {
        Self::new(vec![Err(CastingFitError::Transport("connection refused".into()))])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl FeedbackSource for ScriptedFeedback {
    async fn call_feedback(&self, _call_id: &str) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let next = {
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().map(clone_result)
            }
        };

        next.unwrap_or(Ok(Value::Null))
    }
}

fn clone_result(result: &Result<Value>) -> Result<Value> {
    match result {
        Ok(v) => Ok(v.clone()),
        Err(CastingFitError::Timeout) => Err(CastingFitError::Timeout),
        Err(e) => Err(CastingFitError::Transport(e.to_string())),
    }
}

/// Let spawned tasks run until they block
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
