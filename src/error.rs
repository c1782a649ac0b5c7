/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the cluster sizing engine.
//!
//! Mirrors the donor's `scheduler/error.rs` split: [`SizingError`] is the
//! top-level failure returned from [`crate::facade::size`], with each
//! variant carrying exactly the structured fields needed to reproduce the
//! message text the spec requires, so a caller never has to string-parse a
//! message to recover a value.

use thiserror::Error;

/// Minimum viable MachineSet size, per spec §4.2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimumViableSize {
    pub cpu: f64,
    pub memory: f64,
}

impl std::fmt::Display for MinimumViableSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cpu={}, memory={}GB", self.cpu, self.memory)
    }
}

/// Top-level error type returned by [`crate::facade::size`].
///
/// | Variant | Taxonomy (spec §7) |
/// |---|---|
/// | `NotSchedulable` | NotSchedulable |
/// | `EmptyWorkloads` / `MissingPlatform` / `UnknownServiceReference` / `SelfAvoidance` | InvalidInput |
/// | `NoOwningWorkload` | Internal |
#[derive(Debug, Error)]
pub enum SizingError {
    /// No MachineSet can host the named workload's heaviest bundle.
    #[error(
        "workload '{workload}' is not schedulable on any candidate MachineSet (target: '{target_machine_set}'); minimum viable size: {minimum_viable_size}"
    )]
    NotSchedulable {
        workload: String,
        target_machine_set: String,
        minimum_viable_size: MinimumViableSize,
    },

    /// The sizing request did not include a platform.
    #[error("platform is required")]
    MissingPlatform,

    /// The sizing request's workload list was empty.
    #[error("workloads must not be empty")]
    EmptyWorkloads,

    /// A `runsWith`/`avoid` reference named a service that does not exist in
    /// the same workload descriptor.
    #[error("workload '{workload}' service '{service}' references unknown service '{reference}'")]
    UnknownServiceReference {
        workload: String,
        service: String,
        reference: String,
    },

    /// A service named itself in its own `avoid` set.
    #[error("workload '{workload}' service '{service}' cannot avoid itself")]
    SelfAvoidance { workload: String, service: String },

    /// Invariant violation: a service with no owning workload was
    /// encountered mid-scheduling. This should be unreachable for any input
    /// that passed facade expansion.
    #[error("internal error: service '{service}' has no owning workload")]
    NoOwningWorkload { service: String },
}
