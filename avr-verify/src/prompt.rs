//! Reviewer prompt seam
//!
//! The frame-boundary confirmation is a human-paced suspension point with no
//! timeout. The navigator asks through `ReviewPrompt` so a terminal, a GUI
//! dialog, or a scripted double can answer.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Question put to the reviewer
#[derive(Debug, Clone, PartialEq)]
pub enum Question {
    /// Last annotation of a frame reached; move on?
    FinishedWithFrame {
        index: usize,
        size: usize,
        video_id: i64,
        frame_number: i64,
    },
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Question::FinishedWithFrame {
                index,
                size,
                video_id,
                frame_number,
            } => write!(
                f,
                "Finished with current frame (video {}, frame {}, {}/{}). Move on to next frame?",
                video_id,
                frame_number,
                index + 1,
                size
            ),
        }
    }
}

/// Reviewer's answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptResponse {
    /// Move on ("Next")
    Confirm,
    /// Stay and add annotations to this frame ("Add annotations")
    Decline,
    /// Dialog closed without an answer; nothing changes
    Dismissed,
}

/// Asks the reviewer a question and waits for the answer
#[async_trait]
pub trait ReviewPrompt: Send + Sync {
    async fn ask(&self, question: Question) -> PromptResponse;
}

#[async_trait]
impl<P: ReviewPrompt + ?Sized> ReviewPrompt for Arc<P> {
    async fn ask(&self, question: Question) -> PromptResponse {
        (**self).ask(question).await
    }
}

/// Prompt that replays queued answers and records the questions asked
///
/// Answers `Dismissed` once the queue runs dry.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    answers: Arc<Mutex<VecDeque<PromptResponse>>>,
    asked: Arc<Mutex<Vec<Question>>>,
}

impl ScriptedPrompt {
    pub fn new(answers: impl IntoIterator<Item = PromptResponse>) -> Self {
        Self {
            answers: Arc::new(Mutex::new(answers.into_iter().collect())),
            asked: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn push(&self, answer: PromptResponse) {
        self.answers.lock().await.push_back(answer);
    }

    /// Questions asked so far, oldest first
    pub async fn asked(&self) -> Vec<Question> {
        self.asked.lock().await.clone()
    }
}

#[async_trait]
impl ReviewPrompt for ScriptedPrompt {
    async fn ask(&self, question: Question) -> PromptResponse {
        self.asked.lock().await.push(question);
        self.answers
            .lock()
            .await
            .pop_front()
            .unwrap_or(PromptResponse::Dismissed)
    }
}
