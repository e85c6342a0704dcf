//! # docsync
//!
//! A command-line tool for reconciling a local source tree with the documents
//! stored in a remote project.
//!
//! ## Overview
//!
//! `docsync` scans a working directory for source files, lists the documents
//! held by the remote project, and pairs the two sides up. Every file ends up
//! with one status (synced, out of sync, partial match, local only or remote
//! only) and the user decides what to upload, delete or overwrite.
//!
//! ## Key Features
//!
//! - **Directory rules**: map a local directory onto a differently named remote one
//! - **Partial matches**: files that share a name but live in different directories are linked for review
//! - **Diffs**: unified diffs from the remote copy to the local one
//! - **Manifest**: rules and the last known status of every file, saved as JSON and uploadable
//! - **Confirmation**: destructive remote actions always ask first unless `--yes` is given
//!
//! ## Architecture
//!
//! - File model and reconciliation ([`model`], [`rules`], [`reconcile`])
//! - Persistence ([`manifest`], [`config`])
//! - Local and remote I/O ([`discovery`], [`transport`])
//! - Actions ([`session`], [`prompt`], [`error`])
//! - User interface ([`handlers`], [`report`], [`logger`])

/// Platform-agnostic configuration directory management and settings.
///
/// Locates the config directory following platform conventions and loads the
/// TOML settings: scan filters, the remote endpoint and the default manifest
/// location. Environment variables override the stored remote settings.
pub mod config;

/// Local file discovery.
///
/// Walks the working directory, pruning excluded directories, and keeps files
/// matching the configured extensions or names.
pub mod discovery;

/// Library error types.
pub mod error;

/// Command handlers shared by the CLI and the interactive menu.
pub mod handlers;

/// Logging configuration and utilities.
///
/// Sets up console logging (configurable via `RUST_LOG`) and an append-only
/// audit log in the config directory with size-based rotation.
pub mod logger;

/// The manifest file: directory rules plus a status snapshot.
pub mod manifest;

/// File entries, keys and statuses.
pub mod model;

/// Confirmation prompts for destructive actions.
pub mod prompt;

/// Pairing of local files with remote documents.
///
/// Produces a [`reconcile::SyncState`] from a local listing, a remote listing
/// and the directory rules. Pure and deterministic.
pub mod reconcile;

/// Terminal output for states, diffs and manifests.
pub mod report;

/// Directory rules and path translation between the two sides.
pub mod rules;

/// The action orchestrator tying discovery, transport and state together.
pub mod session;

/// Remote document store access.
pub mod transport;
