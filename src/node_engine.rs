/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! C4 — Node Engine.
//!
//! Decides whether a given node can accept a co-placement bundle, and picks
//! or creates the node a bundle should land on within a zone. Grounded on
//! the donor's `scheduler/mod.rs` admission sequence (`check_admission`):
//! an ordered chain of named rejection reasons evaluated eagerly, rather
//! than one opaque boolean.

use std::collections::HashMap;

use crate::ids::IdGen;
use crate::model::{MachineSet, Node, Service, Workload, Zone};
use crate::resources::{can_support, total_request, Usage};

/// Why a node was rejected for a bundle. Mirrors the donor's
/// `AdmissionReason` in spirit: named, inspectable reasons rather than a
/// bare `bool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MachineSetNotInUsesMachines,
    ControlPlaneRouting,
    Tainted,
    AntiAffinity,
    InsufficientCapacity,
}

/// Selection order from spec §4.4 for creating a fresh node: dedicated
/// `onlyFor` match, then the first of `usesMachines`, then the first
/// non-control-plane MachineSet, then the first MachineSet at all.
pub fn choose_machine_set_for_workload<'a>(
    workload: &Workload,
    machine_sets: &'a [MachineSet],
) -> Option<&'a MachineSet> {
    if let Some(ms) = machine_sets
        .iter()
        .find(|ms| ms.only_for.contains(&workload.name))
    {
        return Some(ms);
    }
    if !workload.uses_machines.is_empty() {
        if let Some(ms) = machine_sets
            .iter()
            .find(|ms| workload.uses_machines.contains(&ms.name))
        {
            return Some(ms);
        }
    }
    if let Some(ms) = machine_sets.iter().find(|ms| !ms.is_control_plane_named()) {
        return Some(ms);
    }
    machine_sets.first()
}

/// `Ok(())` iff `node` could host every service in `bundle` on top of its
/// current occupants, `Err(reason)` naming the first check that failed.
pub fn can_node_add_bundle(
    node: &Node,
    bundle: &[String],
    owning_workload: &Workload,
    services: &HashMap<String, Service>,
) -> Result<(), RejectReason> {
    if !owning_workload.uses_machines.is_empty()
        && !owning_workload.uses_machines.contains(&node.machine_set)
    {
        return Err(RejectReason::MachineSetNotInUsesMachines);
    }

    if node.is_control_plane {
        // Control-plane services (by name, spec §4.4) are always admitted;
        // anything else needs the node (equivalently, its MachineSet, which
        // `node.allow_workload_scheduling` already snapshots) to allow
        // ordinary workload scheduling, or the owning workload to require
        // control-plane placement outright.
        let bundle_is_control_plane = bundle
            .iter()
            .all(|id| services.get(id).map(|s| s.is_control_plane_service()).unwrap_or(false));
        let admitted = bundle_is_control_plane
            || owning_workload.require_control_plane
            || node.allow_workload_scheduling;
        if !admitted {
            return Err(RejectReason::ControlPlaneRouting);
        }
    } else if owning_workload.require_control_plane {
        return Err(RejectReason::ControlPlaneRouting);
    }

    let schedulable_control_plane = node.is_control_plane && node.allow_workload_scheduling;
    if !node.only_for.is_empty()
        && !node.only_for.contains(&owning_workload.name)
        && !schedulable_control_plane
    {
        return Err(RejectReason::Tainted);
    }

    for id in bundle {
        if let Some(svc) = services.get(id) {
            if node.services.iter().any(|placed| svc.avoid.contains(placed)) {
                return Err(RejectReason::AntiAffinity);
            }
        }
        if node.services.iter().any(|placed| {
            services
                .get(placed)
                .map(|placed_svc| placed_svc.avoid.contains(id))
                .unwrap_or(false)
        }) {
            return Err(RejectReason::AntiAffinity);
        }
    }

    let current_usage = node_current_usage(node, services);
    let requirement = total_request(bundle.iter().filter_map(|id| services.get(id)));
    let capacity = Usage {
        cpu: node.cpu_units,
        memory: node.memory,
        disks: node.max_disks,
    };
    if !can_support(requirement, current_usage, capacity) {
        return Err(RejectReason::InsufficientCapacity);
    }

    Ok(())
}

fn node_current_usage(node: &Node, services: &HashMap<String, Service>) -> Usage {
    total_request(node.services.iter().filter_map(|id| services.get(id)))
}

/// Place `bundle` into `zone`: onto the least-loaded (by current memory
/// consumption) eligible existing node, or a freshly created one if none
/// qualify. Returns the id of the node the bundle landed on, or `None` if
/// even a freshly created node cannot host it (unreachable for any workload
/// that passed feasibility analysis; see `feasibility::analyze`).
pub fn add_service_to_zone(
    zone: &mut Zone,
    nodes: &mut HashMap<String, Node>,
    bundle: &[String],
    owning_workload: &Workload,
    services: &HashMap<String, Service>,
    machine_sets: &[MachineSet],
    id_gen: &mut IdGen,
) -> Option<String> {
    let mut best: Option<(&String, f64)> = None;
    for node_id in &zone.nodes {
        let Some(node) = nodes.get(node_id) else {
            continue;
        };
        if can_node_add_bundle(node, bundle, owning_workload, services).is_err() {
            continue;
        }
        let usage = node_current_usage(node, services).memory;
        if best.map(|(_, m)| usage < m).unwrap_or(true) {
            best = Some((node_id, usage));
        }
    }

    if let Some((node_id, _)) = best {
        let node_id = node_id.clone();
        nodes
            .get_mut(&node_id)
            .unwrap()
            .services
            .extend(bundle.iter().cloned());
        return Some(node_id);
    }

    let ms = choose_machine_set_for_workload(owning_workload, machine_sets)?;
    let node_id = id_gen.next("node");
    let mut node = Node::from_machine_set(node_id.clone(), ms);
    if can_node_add_bundle(&node, bundle, owning_workload, services).is_err() {
        return None;
    }
    node.services.extend(bundle.iter().cloned());
    nodes.insert(node_id.clone(), node);
    zone.nodes.push(node_id.clone());
    Some(node_id)
}
