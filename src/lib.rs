//! tuiman: a vim-like terminal HTTP client.
//!
//! `core` holds terminal-free state and pure layout/text logic, `services`
//! the file, database, network and OS collaborators, `render` the palette,
//! and `tui_main` the crossterm event loop tying them together.

pub mod core;
pub mod render;
pub mod services;
pub mod tui_main;
