//! Shared test support utilities
//!
//! Provides `ScriptedGenerator`, a canned `TextGenerator` for unit and
//! integration tests that must not reach the network.

use crate::clients::TextGenerator;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Replies with scripted text, in order; the last reply repeats once exhausted.
///
/// Records every prompt it receives and can be told to fail on a given call.
pub struct ScriptedGenerator {
    replies: Vec<String>,
    fail_on_call: Option<usize>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn replying<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: replies.into_iter().map(Into::into).collect(),
            fail_on_call: None,
            delay: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fails the `call`-th invocation (1-based) and every one after it.
    pub fn failing_on<I, S>(call: usize, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fail_on_call: Some(call),
            ..Self::replying(replies)
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log lock").clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.prompts.lock().expect("prompt log lock").push(prompt.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_on_call.is_some_and(|fail_on| call >= fail_on) {
            return Err(anyhow!("scripted failure on call {call}"));
        }

        self.replies
            .get(call - 1)
            .or_else(|| self.replies.last())
            .cloned()
            .ok_or_else(|| anyhow!("no scripted reply"))
    }
}
