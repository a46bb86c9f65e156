//! # gradebook
//!
//! HTTP API, CLI and configuration around `gradebook-core`.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │          apps/gradebook (THE BINARY)         │
//! │                                              │
//! │   ┌───────────┐            ┌────────────┐    │
//! │   │    CLI    │            │  HTTP API  │    │
//! │   │  (clap)   │            │   (axum)   │    │
//! │   └─────┬─────┘            └─────┬──────┘    │
//! │         └────────────┬───────────┘           │
//! │                      ▼                       │
//! │             ┌────────────────┐               │
//! │             │ gradebook-core │               │
//! │             │  (THE LOGIC)   │               │
//! │             └────────────────┘               │
//! └──────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod cli;
pub mod config;
