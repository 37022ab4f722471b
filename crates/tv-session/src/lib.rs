// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Session state for the trace viewer.
//!
//! [`SessionStore`] owns the currently loaded payload and publishes it as
//! immutable snapshots. [`PayloadController`] feeds it from the `payload`
//! query parameter or from uploaded files.

pub mod controller;
pub mod error;
pub mod source;
pub mod store;

pub use controller::PayloadController;
pub use error::{Result, SessionError};
pub use source::{Acquisition, AcquisitionSource, FetchSource, UploadSource};
pub use store::{Generation, LoadOutcome, Origin, OriginKind, SessionSnapshot, SessionStore};
