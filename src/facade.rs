/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! C8 — Sizing Facade.
//!
//! The single entry point: takes raw workload descriptors plus either an
//! explicit MachineSet catalog or a platform to default one from, expands
//! descriptors into the internal id-addressed model, runs feasibility
//! analysis up front, schedules every workload, and reports the resulting
//! cluster shape together with over-commitment metrics. Grounded on the
//! donor's `GlobalScheduler::schedule`, which plays the same "one call
//! wires up every component" role for task scheduling.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::info;

use crate::error::SizingError;
use crate::feasibility;
use crate::ids::IdGen;
use crate::metrics::{self, ClusterMetrics};
use crate::model::{MachineSet, Node, Platform, Service, Workload, WorkloadDescriptor, Zone};
use crate::platform;
use crate::scheduler;

/// The fully computed cluster shape and its over-commitment profile.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterSizing {
    pub node_count: usize,
    pub zone_count: usize,
    pub total_cpu: f64,
    pub total_memory: f64,
    pub zones: Vec<Zone>,
    pub nodes: Vec<Node>,
    pub services: Vec<Service>,
    pub metrics: ClusterMetrics,
}

/// Size a cluster for `workloads`.
///
/// `machine_sets`, if given, is used as-is as the MachineSet catalog.
/// Otherwise `platform` is required, and a single MachineSet named
/// `"default"` is synthesized from that platform's default instance type.
pub fn size(
    workloads: Vec<WorkloadDescriptor>,
    platform: Option<Platform>,
    machine_sets: Option<Vec<MachineSet>>,
) -> Result<ClusterSizing, SizingError> {
    if workloads.is_empty() {
        return Err(SizingError::EmptyWorkloads);
    }

    info!(
        workload_count = workloads.len(),
        platform = ?platform,
        "=== facade::size() ==="
    );

    let machine_sets = match machine_sets {
        Some(sets) => sets,
        None => {
            let platform = platform.ok_or(SizingError::MissingPlatform)?;
            vec![default_machine_set(platform)]
        }
    };

    let mut id_gen = IdGen::new();
    let mut services: HashMap<String, Service> = HashMap::new();
    let mut expanded_workloads: Vec<Workload> = Vec::new();

    for descriptor in &workloads {
        let workload = expand_workload(descriptor, &mut id_gen, &mut services)?;
        expanded_workloads.push(workload);
    }

    for workload in &expanded_workloads {
        feasibility::analyze(workload, &services, &machine_sets)?;
    }

    let mut zones: Vec<Zone> = Vec::new();
    let mut nodes: HashMap<String, Node> = HashMap::new();

    for workload in &expanded_workloads {
        scheduler::schedule_workload(workload, &services, &mut zones, &mut nodes, &machine_sets, &mut id_gen)?;
    }

    let total_cpu = nodes.values().map(|n| n.cpu_units).sum();
    let total_memory = nodes.values().map(|n| n.memory).sum();
    let cluster_metrics = metrics::cluster_metrics(&nodes, &services);

    let mut node_list: Vec<Node> = nodes.into_values().collect();
    node_list.sort_by(|a, b| a.id.cmp(&b.id));

    let mut service_list: Vec<Service> = services.into_values().collect();
    service_list.sort_by(|a, b| a.id.cmp(&b.id));

    info!(
        node_count = node_list.len(),
        zone_count = zones.len(),
        "=== Sizing complete ==="
    );

    Ok(ClusterSizing {
        node_count: node_list.len(),
        zone_count: zones.len(),
        total_cpu,
        total_memory,
        zones,
        nodes: node_list,
        services: service_list,
        metrics: cluster_metrics,
    })
}

fn default_machine_set(platform: Platform) -> MachineSet {
    let instance = platform::default_instance_for_platform(platform);
    MachineSet {
        name: "default".to_string(),
        cpu: instance.cpu_units,
        memory: instance.memory,
        instance_name: instance.name,
        number_of_disks: instance.max_disks.unwrap_or(0),
        only_for: BTreeSet::new(),
        label: String::new(),
        allow_workload_scheduling: None,
        control_plane_reserved: None,
    }
}

/// Expand one wire-format workload descriptor into the internal
/// id-addressed `Workload`, inserting its services into `services`.
///
/// Per spec §4.8: ids are freshly assigned, `runsWith`/`avoid` name
/// references are resolved within the same descriptor, and a service
/// naming itself in its own `avoid` set or an unknown reference is
/// rejected before any scheduling work begins.
fn expand_workload(
    descriptor: &WorkloadDescriptor,
    id_gen: &mut IdGen,
    services: &mut HashMap<String, Service>,
) -> Result<Workload, SizingError> {
    let workload_id = id_gen.next("workload");

    let name_to_id: HashMap<String, String> = descriptor
        .services
        .iter()
        .map(|s| (s.name.clone(), id_gen.next("service")))
        .collect();

    let mut service_ids = Vec::with_capacity(descriptor.services.len());
    for svc in &descriptor.services {
        let id = name_to_id[&svc.name].clone();

        if svc.avoid.iter().any(|other| other == &svc.name) {
            return Err(SizingError::SelfAvoidance {
                workload: descriptor.name.clone(),
                service: svc.name.clone(),
            });
        }

        let mut runs_with = BTreeSet::new();
        for reference in &svc.runs_with {
            let resolved = name_to_id.get(reference).ok_or_else(|| SizingError::UnknownServiceReference {
                workload: descriptor.name.clone(),
                service: svc.name.clone(),
                reference: reference.clone(),
            })?;
            runs_with.insert(resolved.clone());
        }

        let mut avoid = BTreeSet::new();
        for reference in &svc.avoid {
            let resolved = name_to_id.get(reference).ok_or_else(|| SizingError::UnknownServiceReference {
                workload: descriptor.name.clone(),
                service: svc.name.clone(),
                reference: reference.clone(),
            })?;
            avoid.insert(resolved.clone());
        }

        // Replica semantics (spec §3): count > 1 rewrites every contained
        // service's `zones` to `count` outright, not just a floor on it.
        let zones = if descriptor.count > 1 {
            descriptor.count
        } else {
            svc.zones
        };

        services.insert(
            id.clone(),
            Service {
                id: id.clone(),
                name: svc.name.clone(),
                required_cpu: svc.required_cpu,
                required_memory: svc.required_memory,
                limit_cpu: svc.limit_cpu,
                limit_memory: svc.limit_memory,
                min_limit_cpu: svc.min_limit_cpu,
                max_limit_cpu: svc.max_limit_cpu,
                min_limit_memory: svc.min_limit_memory,
                max_limit_memory: svc.max_limit_memory,
                over_commit_mode: svc.over_commit_mode,
                zones,
                runs_with,
                avoid,
                owner_reference: Some(workload_id.clone()),
            },
        );
        service_ids.push(id);
    }

    Ok(Workload {
        id: workload_id,
        name: descriptor.name.clone(),
        count: descriptor.count,
        uses_machines: descriptor.uses_machines.clone(),
        services: service_ids,
        allow_control_plane: descriptor.allow_control_plane,
        require_control_plane: descriptor.require_control_plane,
    })
}
