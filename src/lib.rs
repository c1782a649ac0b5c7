/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Cluster sizing engine.
//!
//! ```text
//! WorkloadDescriptor[] ──(facade::size)──► feasibility ──► scheduler ──► ClusterSizing
//!         │                                    │               │
//!         │                                    │               ├─ grouper   (co-placement bundles)
//!         │                                    │               ├─ node_engine (admission + placement)
//!         │                                    │               └─ zone_selector (failure-domain spread)
//!         │                                    └─ resources (capacity accounting)
//!         └─ platform (instance catalog, when no explicit MachineSet list is given)
//! ```
//!
//! `facade::size` is the single entry point; every other module is an
//! internal collaborator it wires together.

pub mod error;
pub mod facade;
pub mod feasibility;
pub mod grouper;
pub mod ids;
pub mod metrics;
pub mod model;
pub mod node_engine;
pub mod platform;
pub mod resources;
pub mod scheduler;
pub mod zone_selector;
