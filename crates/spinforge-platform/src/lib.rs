//! Spinforge Platform - talking to Spinnaker
//!
//! The platform itself is reached through [`PlatformClient`]. [`SpinCli`]
//! drives the `spin` command-line tool; [`MockPlatformClient`] keeps
//! objects in memory for tests. [`Reconciler`] compares compiled objects
//! with what the platform holds and saves only what changed.

pub mod client;
pub mod diff;
pub mod error;
pub mod mock;
pub mod reconcile;
pub mod spin;

pub use client::{DeleteOutcome, ObjectRef, PlatformClient};
pub use diff::{DiffEngine, SpecDiff};
pub use error::{PlatformError, Result};
pub use mock::{MockPlatformClient, OperationCounts};
pub use reconcile::{Outcome, ReconcileOptions, ReconcileReport, Reconciler};
pub use spin::SpinCli;
