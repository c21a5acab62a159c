//! # SuperHxPro Architecture
//!
//! SuperHxPro attaches structured attributes (tags, a per-directory mood) to
//! files without touching the files themselves. Each directory may hold one
//! hidden sidecar document describing its direct children; everything else
//! (searching, cataloguing, deduplicating, health checks) is built on walking
//! a tree and reading those sidecars alongside live filesystem facts.
//!
//! Like any tool here it is a library first: the CLI is one client of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, sets up logging, prints messages       │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Parses tag lists and JSON queries, applies config        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - tag, mood, search, catalog, dedupe, health               │
//! │  - Drives the tree walker, returns CmdResult                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Walker + Storage (walker.rs, store/)                       │
//! │  - Deterministic pre-order traversal, one load per dir      │
//! │  - SidecarStore trait: FsStore, InMemoryStore               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! From `api.rs` inward nothing prints or exits. Diagnostics go through
//! `tracing`; user-facing outcomes are returned as `CmdMessage`s.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: One module per command
//! - [`walker`]: Directory traversal with per-directory sidecar loading
//! - [`query`]: JSON metadata queries and the facts they are evaluated against
//! - [`store`]: Sidecar storage abstraction and implementations
//! - [`model`]: Sidecar document types
//! - [`config`]: Configuration loading
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod store;
pub mod walker;
