/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! C2 — Feasibility Analyzer.
//!
//! Determines, per workload, which MachineSets could host its heaviest
//! co-placed bundle. Grounded on the donor's `scheduler/feasibility.rs`: a
//! pure analysis module returning a structured verdict rather than a bare
//! `bool`, consumed by the orchestrator (here, `facade::size`) to fail fast
//! before any scheduling work begins.

use std::collections::HashMap;

use crate::error::{MinimumViableSize, SizingError};
use crate::grouper;
use crate::model::{MachineSet, Service, Workload};
use crate::node_engine::choose_machine_set_for_workload;
use crate::resources::{kubelet_overhead, total_request, Usage};

/// Result of analyzing one workload's feasibility.
pub struct Analysis {
    pub schedulable: bool,
    pub candidate_machine_sets: Vec<String>,
}

/// Selection order from spec §4.2: restrict the universe of MachineSets a
/// workload may be placed on, before bundle-fit filtering.
pub fn eligible_machine_sets<'a>(
    workload: &Workload,
    machine_sets: &'a [MachineSet],
) -> Vec<&'a MachineSet> {
    if !workload.uses_machines.is_empty() {
        return machine_sets
            .iter()
            .filter(|ms| workload.uses_machines.contains(&ms.name))
            .collect();
    }

    let dedicated: Vec<&MachineSet> = machine_sets
        .iter()
        .filter(|ms| ms.only_for.contains(&workload.name))
        .collect();
    if !dedicated.is_empty() {
        return dedicated;
    }

    machine_sets
        .iter()
        .filter(|ms| {
            let scope_ok = ms.only_for.is_empty() || ms.only_for.contains(&workload.name);
            let control_plane_ok =
                !ms.is_control_plane_named() || ms.allows_workload_scheduling();
            scope_ok && control_plane_ok
        })
        .collect()
}

/// `true` iff a single node of type `ms` could host `bundle` (the heaviest
/// co-placement group is what callers should check first, but any bundle can
/// be tested independently).
fn machine_set_hosts_bundle(ms: &MachineSet, bundle_usage: Usage) -> bool {
    let overhead = kubelet_overhead(ms.cpu, ms.memory);
    bundle_usage.cpu + overhead.cpu <= ms.cpu
        && bundle_usage.memory + overhead.memory <= ms.memory
        && bundle_usage.disks <= ms.number_of_disks
}

/// Compute the minimum viable MachineSet size for a bundle that no
/// candidate could host, per spec §4.2's formula.
fn minimum_viable_size(bundle_usage: Usage) -> MinimumViableSize {
    let overhead = kubelet_overhead(bundle_usage.cpu, bundle_usage.memory);
    let min_cpu = 200.0_f64.min((((bundle_usage.cpu + overhead.cpu) / 2.0).ceil()) * 2.0);
    let min_memory = 512.0_f64.min((((bundle_usage.memory + overhead.memory) / 4.0).ceil()) * 4.0);
    MinimumViableSize {
        cpu: min_cpu,
        memory: min_memory,
    }
}

/// Analyze `workload`'s feasibility against `machine_sets`. Returns
/// `Err(SizingError::NotSchedulable)` if no MachineSet can host every
/// co-placement bundle; otherwise `Ok(Analysis)` naming the surviving
/// candidates.
pub fn analyze(
    workload: &Workload,
    services: &HashMap<String, Service>,
    machine_sets: &[MachineSet],
) -> Result<Analysis, SizingError> {
    let eligible = eligible_machine_sets(workload, machine_sets);

    let mut bundles = grouper::bundles(workload, services);
    // Largest bundle first, so a failing candidate is rejected as early as
    // possible (spec §4.2).
    bundles.sort_by(|a, b| {
        bundle_resource_sum(b, services)
            .partial_cmp(&bundle_resource_sum(a, services))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut candidates = Vec::new();
    for ms in &eligible {
        let hosts_all = bundles.iter().all(|bundle| {
            let usage = total_request(bundle.iter().filter_map(|id| services.get(id)));
            machine_set_hosts_bundle(ms, usage)
        });
        if hosts_all {
            candidates.push(ms.name.clone());
        }
    }

    if candidates.is_empty() {
        let heaviest = bundles.first();
        let usage = heaviest
            .map(|b| total_request(b.iter().filter_map(|id| services.get(id))))
            .unwrap_or_default();
        let target = choose_machine_set_for_workload(workload, machine_sets)
            .map(|ms| ms.name.clone())
            .unwrap_or_else(|| "<none available>".to_string());
        return Err(SizingError::NotSchedulable {
            workload: workload.name.clone(),
            target_machine_set: target,
            minimum_viable_size: minimum_viable_size(usage),
        });
    }

    Ok(Analysis {
        schedulable: true,
        candidate_machine_sets: candidates,
    })
}

fn bundle_resource_sum(bundle: &[String], services: &HashMap<String, Service>) -> f64 {
    let usage = total_request(bundle.iter().filter_map(|id| services.get(id)));
    usage.cpu + usage.memory
}
