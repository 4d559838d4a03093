//! ==============================================================================
//! notify.rs - user feedback without blocking the control flow
//! ==============================================================================
//!
//! purpose:
//!     views report outcomes through a Notifier (fire and forget) and ask
//!     questions through a Dialog (confirm / prompt). nothing in the views
//!     waits on a notification to be read.
//!
//! implementations:
//!     - TerminalNotifier / TerminalDialog: styled stderr output and
//!       line input for the cli
//!     - Recorder: keeps everything in memory and answers dialogs from a
//!       script; used by tests and by `--yes` style cli runs
//!
//! ==============================================================================

use console::{style, Term};
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: Level::Info, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: Level::Error, message: message.into() }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

pub trait Dialog: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
    /// `None` means the user cancelled
    fn prompt(&self, message: &str, default: &str) -> Option<String>;
}

// ==============================================================================
// terminal
// ==============================================================================

pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        if let Err(e) = emit(&mut Term::stderr(), &notification) {
            tracing::warn!(error = %e, message = %notification.message, "could not print notification");
        }
    }
}

fn emit(out: &mut impl Write, notification: &Notification) -> io::Result<()> {
    let line = match notification.level {
        Level::Info => style(&notification.message).green().to_string(),
        Level::Error => style(&notification.message).red().bold().to_string(),
    };
    writeln!(out, "{}", line)
}

pub struct TerminalDialog {
    term: Term,
}

impl TerminalDialog {
    pub fn new() -> Self {
        Self { term: Term::stderr() }
    }
}

impl Default for TerminalDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialog for TerminalDialog {
    fn confirm(&self, message: &str) -> bool {
        if self.term.write_str(&format!("{} [y/N] ", message)).is_err() {
            return false;
        }
        match self.term.read_line() {
            Ok(answer) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }

    fn prompt(&self, message: &str, default: &str) -> Option<String> {
        if self.term.write_str(&format!("{} [{}] ", message, default)).is_err() {
            return None;
        }
        // read errors (closed stdin) behave like pressing cancel
        let answer = self.term.read_line().ok()?;
        if answer.is_empty() {
            Some(default.to_string())
        } else {
            Some(answer)
        }
    }
}

// ==============================================================================
// in-memory recorder
// ==============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Answer {
    Confirm(bool),
    Prompt(Option<String>),
}

/// records notifications and the questions asked, answering from a queue
///
/// an empty queue answers "no" to confirms and cancels prompts.
#[derive(Default)]
pub struct Recorder {
    notifications: Mutex<Vec<Notification>>,
    questions: Mutex<Vec<String>>,
    answers: Mutex<VecDeque<Answer>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answers(answers: impl IntoIterator<Item = Answer>) -> Self {
        let recorder = Self::new();
        for a in answers {
            recorder.push_answer(a);
        }
        recorder
    }

    pub fn push_answer(&self, answer: Answer) {
        if let Ok(mut q) = self.answers.lock() {
            q.push_back(answer);
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().map(|n| n.clone()).unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notifications().into_iter().map(|n| n.message).collect()
    }

    /// drain notifications, oldest first
    pub fn take(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|mut n| std::mem::take(&mut *n))
            .unwrap_or_default()
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().map(|q| q.clone()).unwrap_or_default()
    }

    fn next_answer(&self, question: &str) -> Option<Answer> {
        if let Ok(mut q) = self.questions.lock() {
            q.push(question.to_string());
        }
        self.answers.lock().ok().and_then(|mut a| a.pop_front())
    }
}

impl Notifier for Recorder {
    fn notify(&self, notification: Notification) {
        if let Ok(mut n) = self.notifications.lock() {
            n.push(notification);
        }
    }
}

impl Dialog for Recorder {
    fn confirm(&self, message: &str) -> bool {
        matches!(self.next_answer(message), Some(Answer::Confirm(true)))
    }

    fn prompt(&self, message: &str, _default: &str) -> Option<String> {
        match self.next_answer(message) {
            Some(Answer::Prompt(answer)) => answer,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_answers_in_order() {
        let r = Recorder::with_answers([
            Answer::Confirm(true),
            Answer::Prompt(Some("Pump".into())),
        ]);
        assert!(r.confirm("delete?"));
        assert_eq!(r.prompt("name?", "Lamp"), Some("Pump".to_string()));
        // queue exhausted
        assert!(!r.confirm("again?"));
        assert_eq!(r.prompt("name?", "Lamp"), None);
        assert_eq!(r.questions(), vec!["delete?", "name?", "again?", "name?"]);
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_emit_writes_one_line() {
        let mut out = Vec::new();
        emit(&mut out, &Notification::error("Failed to delete button: busy")).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Failed to delete button: busy"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_emit_surfaces_write_errors() {
        let err = emit(&mut ClosedPipe, &Notification::info("hello")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_recorder_take_drains() {
        let r = Recorder::new();
        r.notify(Notification::info("one"));
        r.notify(Notification::error("two"));
        assert_eq!(r.take().len(), 2);
        assert!(r.notifications().is_empty());
    }
}
