//! # Landmine Connect Four
//!
//! Connect Four with a twist: a few cells hide landmines. Dropping a piece
//! onto one sets it off instead of placing the piece, and the unlucky player
//! owes skipped turns.
//!
//! ## Modules
//!
//! - [`game`] — Core game logic: board, seats, minefield, state machine, text rendering
//! - [`session`] — Registry of running games keyed by session, with idle expiry
//! - [`ui`] — Local front-ends: terminal UI and headless line mode
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

pub mod config;
pub mod error;
pub mod game;
pub mod session;
pub mod ui;
