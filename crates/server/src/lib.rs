//! Core library for the `skillmatch` application.
//!
//! Pending skill requests are matched against the declared skills of every
//! other user; the ranked candidates and a status are written back to the
//! request. The main entry point is [`run`], which parses the command line
//! and either processes pending requests once or runs the watch daemon that
//! reprocesses them on every change.
//!
//! Library users can drive the same pieces directly:
//! [`RequestProcessor`] for one pass, [`ChangeTrigger`] for a batch of change
//! events and [`watch()`] for the daemon loop.

#![deny(unsafe_code)]

pub mod app;
pub mod backend;
pub mod cli;
pub mod config;
pub mod processor;
pub mod signals;
pub mod trigger;
pub mod watch;

pub use app::{run, run_command};
pub use backend::{Backend, StoreArgs};
pub use processor::{evaluate, ProcessReport, RequestOutcome, RequestProcessor};
pub use trigger::{ChangeTrigger, ReprocessScope};
pub use watch::{watch, WatchSummary};
