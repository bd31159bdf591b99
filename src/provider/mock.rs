//! Scripted provider for tests.

use super::{CompletionOptions, CompletionProvider, ConversationTurn};
use crate::error::{Result, SegueError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Canned reply for one provider call.
pub(crate) enum Reply {
    Text(String),
    Fail(String),
}

/// Returns queued replies in order and records every conversation it saw.
pub(crate) struct ScriptedProvider {
    replies: Mutex<VecDeque<Reply>>,
    /// Reply used once the queue is empty.
    fallback: Option<String>,
    seen: Mutex<Vec<(Vec<ConversationTurn>, CompletionOptions)>>,
}

impl ScriptedProvider {
    pub(crate) fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Reply::Text(r.into())).collect()),
            fallback: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `reply`.
    pub(crate) fn repeating(reply: impl Into<String>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: Some(reply.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(message: impl Into<String>) -> Self {
        let mut replies = VecDeque::new();
        replies.push_back(Reply::Fail(message.into()));
        Self {
            replies: Mutex::new(replies),
            fallback: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub(crate) fn conversation(&self, call: usize) -> Vec<ConversationTurn> {
        self.seen.lock().unwrap()[call].0.clone()
    }

    pub(crate) fn options(&self, call: usize) -> CompletionOptions {
        self.seen.lock().unwrap()[call].1.clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, turns: &[ConversationTurn], options: &CompletionOptions) -> Result<String> {
        self.seen
            .lock()
            .unwrap()
            .push((turns.to_vec(), options.clone()));

        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(message)) => Err(SegueError::Provider(message)),
            None => self
                .fallback
                .clone()
                .ok_or_else(|| SegueError::Provider("no scripted reply left".to_string())),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
