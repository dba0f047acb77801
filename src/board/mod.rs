//! # Guess Board
//!
//! The client half of the game: session state for displaying guesses and the HTTP
//! client that submits captures to the relay.

pub mod client;
pub mod guess_board;
pub mod history;

pub use client::{ClientError, RelayClient};
pub use guess_board::{AnalysisTicket, GuessBoard};
pub use history::{GuessHistory, GuessResult, HISTORY_CAPACITY};
