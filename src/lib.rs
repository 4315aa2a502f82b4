//! # Timetable Rust Backend
//!
//! Recurring weekly schedule engine for institutional timetabling.
//!
//! This crate implements the scheduling core of a class-records system: a
//! weekly recurring timetable store, resource-conflict detection that gates
//! every write, greedy auto-placement of bulk-imported course offerings,
//! and projection of the weekly template into concrete dated sessions for
//! attendance history, calendar feeds, and "next class" lookups. The
//! backend can expose a REST API via Axum for administrative frontends.
//!
//! ## Features
//!
//! - **Weekly Slot Store**: Repository-backed templates, the source of
//!   truth for conflict checks and projection
//! - **Conflict Detection**: Pure room/lecturer collision predicates over a
//!   consistent snapshot, applied atomically with every commit
//! - **Auto-Placement**: Greedy first-fit planner for bulk imports, with
//!   per-request failure reporting and cooperative cancellation
//! - **Recurrence Projection**: One projection function parameterized by
//!   window policy (history window, nearest-forward, current week)
//! - **HTTP API**: RESTful endpoints plus SSE progress streams for batch
//!   placement jobs
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Identifier newtypes shared across every layer
//! - [`models`]: Weekly slots, sessions, the resource catalog, and the
//!   canonical weekday representation
//! - [`db`]: Storage operations, repository pattern, and write services
//! - [`scheduler`]: Conflict detector and auto-placement planner
//! - [`services`]: Projection, query façade, notification, and batch jobs
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError carries rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;
pub mod models;

pub mod scheduler;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
