//! Library crate for blumdate-admin.
//!
//! This crate exposes the building blocks of the TUI:
//! - REST client and wire models (`api`)
//! - Application state and update loop (`app`)
//! - Email one-time-code sign-in (`auth`)
//! - Command-line configuration (`config`)
//! - The per-screen list controller (`controller`) with its search and pager parts
//! - Dashboard aggregates (`dashboard`)
//! - Error and result types (`error`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `blumdate-admin` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod controller;
pub mod dashboard;
pub mod error;
pub mod pager;
pub mod records;
pub mod search;
pub mod session;
pub mod ui;

/// Convenient error and result types shared across the crate.
pub use error::{AdminError, DynError, Result};
pub use controller::{ListController, LoadState};
