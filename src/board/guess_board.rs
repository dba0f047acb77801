//! # Guess Board
//!
//! Client-side session state around the relay: which model is selected, whether a
//! request is outstanding, the guess on display, the error on display, and the
//! bounded history.
//!
//! ## Overlapping requests
//!
//! Nothing stops a user from triggering a second analysis before the first answers.
//! Each trigger takes an [`AnalysisTicket`]; each ticket is settled exactly once by
//! [`GuessBoard::apply_success`] or [`GuessBoard::apply_failure`]. Outcomes are applied
//! in the order they resolve, so whichever response arrives last is what stays on
//! screen. The analyzing flag stays up until every ticket has settled.

use tracing::debug;

use crate::board::history::{GuessHistory, GuessResult};
use crate::profiles;
use crate::relay::types::AnalyzeReply;

/// Proof that an analysis was started. Consumed when its outcome is applied.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "every ticket must be settled with apply_success or apply_failure"]
pub struct AnalysisTicket(u64);

impl AnalysisTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct GuessBoard {
    selected_model: String,
    in_flight: usize,
    next_ticket: u64,
    current_guess: Option<String>,
    current_model: Option<String>,
    error: Option<String>,
    history: GuessHistory,
}

impl Default for GuessBoard {
    fn default() -> Self {
        Self {
            selected_model: profiles::DEFAULT_PROFILE.to_string(),
            in_flight: 0,
            next_ticket: 0,
            current_guess: None,
            current_model: None,
            error: None,
            history: GuessHistory::default(),
        }
    }
}

impl GuessBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a new analysis as outstanding and clears any displayed error.
    pub fn begin_analysis(&mut self) -> AnalysisTicket {
        self.in_flight += 1;
        self.error = None;
        let ticket = AnalysisTicket(self.next_ticket);
        self.next_ticket += 1;
        debug!(ticket = ticket.0, in_flight = self.in_flight, "Analysis started");
        ticket
    }

    /// Shows `reply` and records it at the front of the history.
    pub fn apply_success(&mut self, ticket: AnalysisTicket, reply: &AnalyzeReply) {
        self.settle(&ticket);
        self.current_guess = Some(reply.guess.clone());
        self.current_model = Some(reply.model.clone()).filter(|model| !model.is_empty());
        self.history
            .push(GuessResult::new(reply.guess.clone(), self.current_model.clone()));
    }

    /// Shows `message` as the error. Guess and history are left as they were.
    pub fn apply_failure(&mut self, ticket: AnalysisTicket, message: impl Into<String>) {
        self.settle(&ticket);
        self.error = Some(message.into());
    }

    fn settle(&mut self, ticket: &AnalysisTicket) {
        self.in_flight = self.in_flight.saturating_sub(1);
        debug!(ticket = ticket.0, in_flight = self.in_flight, "Analysis settled");
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn select_model(&mut self, model: impl Into<String>) {
        self.selected_model = model.into();
    }

    pub fn selected_model(&self) -> &str {
        &self.selected_model
    }

    /// True while at least one analysis is outstanding.
    pub fn is_analyzing(&self) -> bool {
        self.in_flight > 0
    }

    pub fn current_guess(&self) -> Option<&str> {
        self.current_guess.as_deref()
    }

    pub fn current_model(&self) -> Option<&str> {
        self.current_model.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn history(&self) -> &GuessHistory {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(guess: &str, model: &str) -> AnalyzeReply {
        AnalyzeReply {
            guess: guess.to_string(),
            success: true,
            model: model.to_string(),
        }
    }

    #[test]
    fn test_success_updates_display_and_history() {
        let mut board = GuessBoard::new();
        assert_eq!(board.selected_model(), profiles::DEFAULT_PROFILE);

        let ticket = board.begin_analysis();
        assert!(board.is_analyzing());
        board.apply_success(ticket, &reply("a cat", "Qwen-VL Plus (Latest)"));

        assert!(!board.is_analyzing());
        assert_eq!(board.current_guess(), Some("a cat"));
        assert_eq!(board.current_model(), Some("Qwen-VL Plus (Latest)"));
        assert_eq!(board.history().len(), 1);
    }

    #[test]
    fn test_failure_leaves_guess_and_history() {
        let mut board = GuessBoard::new();
        let ticket = board.begin_analysis();
        board.apply_success(ticket, &reply("a cat", "Qwen"));

        let ticket = board.begin_analysis();
        board.apply_failure(ticket, "AI analysis failed, please try again later");

        assert_eq!(board.error(), Some("AI analysis failed, please try again later"));
        assert_eq!(board.current_guess(), Some("a cat"));
        assert_eq!(board.history().len(), 1);

        board.dismiss_error();
        assert_eq!(board.error(), None);
    }

    #[test]
    fn test_begin_clears_error() {
        let mut board = GuessBoard::new();
        let ticket = board.begin_analysis();
        board.apply_failure(ticket, "boom");
        let ticket = board.begin_analysis();
        assert_eq!(board.error(), None);
        board.apply_success(ticket, &reply("x", "m"));
    }

    #[test]
    fn test_last_resolved_response_wins() {
        let mut board = GuessBoard::new();
        let first = board.begin_analysis();
        let second = board.begin_analysis();
        assert_ne!(first.id(), second.id());

        // The second request answers first, the first answers last.
        board.apply_success(second, &reply("second", "m"));
        assert!(board.is_analyzing());
        board.apply_success(first, &reply("first", "m"));

        assert!(!board.is_analyzing());
        assert_eq!(board.current_guess(), Some("first"));
        let order: Vec<_> = board.history().iter().map(|r| r.guess.as_str()).collect();
        assert_eq!(order, ["first", "second"]);
    }

    #[test]
    fn test_history_keeps_ten_most_recent() {
        let mut board = GuessBoard::new();
        for i in 0..13 {
            let ticket = board.begin_analysis();
            board.apply_success(ticket, &reply(&format!("guess {}", i), "m"));
        }
        let order: Vec<_> = board.history().iter().map(|r| r.guess.clone()).collect();
        let expected: Vec<_> = (3..13).rev().map(|i| format!("guess {}", i)).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn test_empty_model_name_is_absent() {
        let mut board = GuessBoard::new();
        let ticket = board.begin_analysis();
        board.apply_success(ticket, &reply("a tree", ""));
        assert_eq!(board.current_model(), None);
        assert_eq!(board.history().latest().unwrap().model, None);
    }
}
