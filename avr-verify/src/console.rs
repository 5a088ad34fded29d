//! Line-oriented terminal driver
//!
//! Reads one command per line and drives the `Navigator`. The same input
//! stream answers the frame-boundary prompt, so the prompt and the command
//! loop share one `SharedLines` reader.

use crate::error::NavigatorError;
use crate::models::{AnnotationCollection, AnnotationId, CollectionId};
use crate::navigator::{AdvanceOutcome, Navigator, ResumeOutcome, StartOutcome};
use crate::prompt::{PromptResponse, Question, ReviewPrompt};
use crate::view::{FrameView, ReviewView, SelectionView};
use async_trait::async_trait;
use avr_common::ReviewPhase;
use std::fmt::Write as _;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::Mutex;
use tracing::warn;

/// Console command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Toggle(CollectionId),
    TrackingFirst(bool),
    ExcludeTracking(bool),
    Start,
    Reset,
    Retry,
    Next,
    Ignore,
    Unignore(AnnotationId),
    ClearIgnored,
    Back,
    Help,
    Quit,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}' (type 'help')")]
    Unknown(String),

    #[error("'{0}' expects {1}")]
    BadArgument(&'static str, &'static str),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(CommandError::Empty);
        };
        let arg = words.next();

        match verb.to_ascii_lowercase().as_str() {
            "toggle" | "t" => parse_id(arg)
                .map(Command::Toggle)
                .ok_or(CommandError::BadArgument("toggle", "a collection id")),
            "tracking-first" => parse_switch(arg)
                .map(Command::TrackingFirst)
                .ok_or(CommandError::BadArgument("tracking-first", "on or off")),
            "exclude-tracking" => parse_switch(arg)
                .map(Command::ExcludeTracking)
                .ok_or(CommandError::BadArgument("exclude-tracking", "on or off")),
            "start" | "s" => Ok(Command::Start),
            "reset" => Ok(Command::Reset),
            "retry" => Ok(Command::Retry),
            "next" | "n" => Ok(Command::Next),
            "ignore" | "i" => Ok(Command::Ignore),
            "unignore" | "u" => parse_id(arg)
                .map(Command::Unignore)
                .ok_or(CommandError::BadArgument("unignore", "an annotation id")),
            "clear-ignored" => Ok(Command::ClearIgnored),
            "back" | "b" => Ok(Command::Back),
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn parse_id(arg: Option<&str>) -> Option<i64> {
    arg.and_then(|a| a.parse().ok())
}

fn parse_switch(arg: Option<&str>) -> Option<bool> {
    match arg?.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Map a prompt answer to a response; anything unrecognised dismisses
pub fn parse_answer(line: &str) -> PromptResponse {
    match line.trim().to_ascii_lowercase().as_str() {
        "next" | "y" | "yes" => PromptResponse::Confirm,
        "add" | "a" => PromptResponse::Decline,
        _ => PromptResponse::Dismissed,
    }
}

/// Input line stream shared by the command loop and the prompt
pub struct SharedLines<R> {
    lines: Arc<Mutex<Lines<R>>>,
}

impl<R> Clone for SharedLines<R> {
    fn clone(&self) -> Self {
        Self {
            lines: Arc::clone(&self.lines),
        }
    }
}

impl<R: AsyncBufRead + Unpin + Send> SharedLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: Arc::new(Mutex::new(reader.lines())),
        }
    }

    /// Next input line; `None` at end of input
    pub async fn next_line(&self) -> std::io::Result<Option<String>> {
        self.lines.lock().await.next_line().await
    }
}

/// `ReviewPrompt` answered from the terminal
pub struct TerminalPrompt<R> {
    input: SharedLines<R>,
}

impl<R> TerminalPrompt<R> {
    pub fn new(input: SharedLines<R>) -> Self {
        Self { input }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send + 'static> ReviewPrompt for TerminalPrompt<R> {
    async fn ask(&self, question: Question) -> PromptResponse {
        println!("{}", question);
        println!("  [next] move on    [add] add annotations    [anything else] cancel");

        match self.input.next_line().await {
            Ok(Some(line)) => parse_answer(&line),
            Ok(None) => PromptResponse::Dismissed,
            Err(e) => {
                warn!(error = %e, "Failed to read prompt answer");
                PromptResponse::Dismissed
            }
        }
    }
}

/// Run the command loop until `quit` or end of input
pub async fn run<R>(navigator: &mut Navigator, input: SharedLines<R>) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin + Send,
{
    resume_if_loading(navigator).await;

    loop {
        let view = match navigator.render().await {
            Ok(view) => view,
            Err(e) => {
                report(&e);
                ReviewView::Loading
            }
        };

        let collections = match &view {
            ReviewView::Selection(_) => match navigator.list_collections().await {
                Ok(collections) => collections,
                Err(e) => {
                    report(&e);
                    Vec::new()
                }
            },
            _ => Vec::new(),
        };
        print!("{}", render_text(&view, &collections));

        let Some(line) = input.next_line().await? else {
            return Ok(());
        };

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(CommandError::Empty) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        if command == Command::Quit {
            return Ok(());
        }
        if command == Command::Help {
            print!("{}", HELP);
            continue;
        }

        if let Err(e) = execute(navigator, command).await {
            report(&e);
        }
    }
}

async fn execute(navigator: &mut Navigator, command: Command) -> crate::error::Result<()> {
    match command {
        Command::Toggle(id) => navigator.toggle_collection(id).await,
        Command::TrackingFirst(on) => navigator.set_tracking_first(on).await,
        Command::ExcludeTracking(on) => navigator.set_exclude_tracking(on).await,
        Command::Start => {
            match navigator.start_review().await? {
                StartOutcome::Reviewing { total } => println!("{} annotations to verify", total),
                StartOutcome::NoAnnotations => {}
                StartOutcome::Stale => println!("Selection changed, start again"),
            }
            Ok(())
        }
        Command::Retry => {
            resume_if_loading(navigator).await;
            Ok(())
        }
        Command::Reset => match navigator.phase() {
            ReviewPhase::Selecting => navigator.reset_session().await,
            _ => navigator.return_to_selection().await,
        },
        Command::Back => navigator.return_to_selection().await,
        Command::Next => {
            match navigator.advance().await? {
                AdvanceOutcome::FrameVerified {
                    video_id,
                    frame_number,
                    ..
                } => println!("Verified video {} frame {:.2}", video_id, frame_number),
                AdvanceOutcome::Annotating => {
                    println!("Add annotations for this frame, then 'next' again")
                }
                AdvanceOutcome::Finished => println!("Finished verifying annotations"),
                AdvanceOutcome::Recovered => println!("Reached end of annotations, starting over"),
                AdvanceOutcome::Moved { .. } | AdvanceOutcome::Dismissed => {}
            }
            Ok(())
        }
        Command::Ignore => navigator.ignore_current().await,
        Command::Unignore(id) => navigator.unignore(id).await,
        Command::ClearIgnored => navigator.clear_ignored().await,
        Command::Help | Command::Quit => Ok(()),
    }
}

async fn resume_if_loading(navigator: &mut Navigator) {
    if navigator.phase() != ReviewPhase::Loading {
        return;
    }

    match navigator.resume().await {
        Ok(ResumeOutcome::Reviewing {
            index,
            total,
            reconciled_from: Some(previous),
        }) => println!(
            "Annotations changed since last session: resuming at {}/{} (was {})",
            index + 1,
            total,
            previous + 1
        ),
        Ok(_) => {}
        Err(e) => {
            report(&e);
            println!("Type 'retry' to load again or 'back' to return to selection");
        }
    }
}

fn report(error: &NavigatorError) {
    println!("Error: {}", error);
}

/// Text rendering of a view
pub fn render_text(view: &ReviewView, collections: &[AnnotationCollection]) -> String {
    let mut out = String::new();
    match view {
        ReviewView::Selection(selection) => render_selection(&mut out, selection, collections),
        ReviewView::Loading => out.push_str("Loading annotations...\n"),
        ReviewView::NoAnnotations => {
            out.push_str("No annotations to verify in the selected collections.\n");
            out.push_str("Type 'reset' to choose other collections.\n");
        }
        ReviewView::Reviewing(frame) => render_frame(&mut out, frame),
    }
    out.push_str("> ");
    out
}

fn render_selection(out: &mut String, selection: &SelectionView, collections: &[AnnotationCollection]) {
    out.push_str("Annotation collections:\n");
    if collections.is_empty() {
        out.push_str("  (none)\n");
    }
    for collection in collections {
        let mark = if selection.selected_collections.contains(&collection.id) {
            'x'
        } else {
            ' '
        };
        let _ = writeln!(out, "  [{}] {:>4}  {}", mark, collection.id, collection.name);
    }
    let _ = writeln!(
        out,
        "tracking-first: {}  exclude-tracking: {}",
        on_off(selection.tracking_first),
        on_off(selection.exclude_tracking)
    );
}

fn render_frame(out: &mut String, frame: &FrameView) {
    let a = &frame.annotation;
    let _ = writeln!(
        out,
        "Annotation {}/{} (#{} of {} in frame){}",
        frame.index + 1,
        frame.size,
        frame.position_in_frame(),
        frame.frame_len(),
        if frame.annotating { " [annotating]" } else { "" }
    );
    let _ = writeln!(
        out,
        "  id {}  video {}  time {:.3}s  concept {}",
        a.id, a.video_id, a.time_in_video, a.concept_id
    );
    let b = &a.bounding_box;
    let _ = writeln!(
        out,
        "  box ({:.0}, {:.0}) - ({:.0}, {:.0})  {:.0}x{:.0}",
        b.x1,
        b.y1,
        b.x2,
        b.y2,
        b.width(),
        b.height()
    );
    if frame.is_ignored(a.id) {
        out.push_str("  (ignored)\n");
    }
    if !frame.ignored.is_empty() {
        let ids: Vec<String> = frame.ignored.iter().map(|id| id.to_string()).collect();
        let _ = writeln!(out, "  ignored: {}", ids.join(", "));
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

const HELP: &str = "\
Selection:  toggle <id>, tracking-first on|off, exclude-tracking on|off, start, reset
Reviewing:  next, ignore, unignore <id>, clear-ignored, back
Loading:    retry, back
Anywhere:   help, quit
";
