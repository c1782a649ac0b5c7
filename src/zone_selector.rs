/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! C5 — Zone Selector.
//!
//! Decides how many failure domains a workload needs and ranks existing
//! zones by how well they could still absorb a bundle. Pure functions over
//! the same `Zone`/`Node` types the scheduler mutates, in the donor's
//! table-driven style (`hyperperiod/math.rs`).

use std::collections::HashMap;

use crate::ids::IdGen;
use crate::model::{Node, Service, Workload, Zone};
use crate::node_engine::can_node_add_bundle;

/// `N` from spec §4.5: the largest `zones` value across the workload's own
/// services (default 1 if the workload has no services yet).
pub fn required_zone_count(workload: &Workload, services: &HashMap<String, Service>) -> u32 {
    workload
        .services
        .iter()
        .filter_map(|id| services.get(id))
        .map(|svc| svc.zones)
        .max()
        .unwrap_or(1)
        .max(1)
}

/// Grow `zones` with freshly-minted empty zones until it holds at least
/// `needed` entries.
pub fn ensure_zone_count(zones: &mut Vec<Zone>, needed: usize, id_gen: &mut IdGen) {
    while zones.len() < needed {
        zones.push(Zone::new(id_gen.next("zone")));
    }
}

/// Rank zone ids by how many of their existing nodes could still accept
/// `bundle`, descending; ties break by zone id, descending (newer zones
/// first — they are more likely to be under-utilized). Zones with zero
/// capable nodes are dropped: a zone that cannot currently reuse any node is
/// not a placement candidate, though the scheduler may still create a fresh
/// node in it as a fallback.
pub fn sort_best_zones(
    zones: &[Zone],
    nodes: &HashMap<String, Node>,
    bundle: &[String],
    owning_workload: &Workload,
    services: &HashMap<String, Service>,
) -> Vec<String> {
    let mut ranked: Vec<(String, usize)> = zones
        .iter()
        .map(|zone| {
            let capable = zone
                .nodes
                .iter()
                .filter_map(|id| nodes.get(id))
                .filter(|node| can_node_add_bundle(node, bundle, owning_workload, services).is_ok())
                .count();
            (zone.id.clone(), capable)
        })
        .filter(|(_, capable)| *capable > 0)
        .collect();

    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));
    ranked.into_iter().map(|(id, _)| id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OverCommitMode;
    use std::collections::BTreeSet;

    fn svc(id: &str, zones: u32) -> Service {
        Service {
            id: id.to_string(),
            name: id.to_string(),
            required_cpu: 1.0,
            required_memory: 1.0,
            limit_cpu: None,
            limit_memory: None,
            min_limit_cpu: None,
            max_limit_cpu: None,
            min_limit_memory: None,
            max_limit_memory: None,
            over_commit_mode: OverCommitMode::None,
            zones,
            runs_with: BTreeSet::new(),
            avoid: BTreeSet::new(),
            owner_reference: None,
        }
    }

    fn workload(service_ids: &[&str]) -> Workload {
        Workload {
            id: "w".into(),
            name: "w".into(),
            count: 1,
            uses_machines: BTreeSet::new(),
            services: service_ids.iter().map(|s| s.to_string()).collect(),
            allow_control_plane: false,
            require_control_plane: false,
        }
    }

    #[test]
    fn required_zone_count_defaults_to_one() {
        let wl = workload(&[]);
        let services = HashMap::new();
        assert_eq!(required_zone_count(&wl, &services), 1);
    }

    #[test]
    fn required_zone_count_is_the_max_across_services() {
        let services: HashMap<String, Service> = [svc("a", 1), svc("b", 3), svc("c", 2)]
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();
        let wl = workload(&["a", "b", "c"]);
        assert_eq!(required_zone_count(&wl, &services), 3);
    }

    #[test]
    fn ensure_zone_count_grows_but_never_shrinks() {
        let mut zones = vec![Zone::new("z1".into())];
        let mut idgen = IdGen::new();
        ensure_zone_count(&mut zones, 3, &mut idgen);
        assert_eq!(zones.len(), 3);
        ensure_zone_count(&mut zones, 1, &mut idgen);
        assert_eq!(zones.len(), 3);
    }

    #[test]
    fn sort_best_zones_drops_zones_with_no_capable_nodes() {
        let zones = vec![Zone::new("z1".into()), Zone::new("z2".into())];
        let nodes = HashMap::new();
        let services = HashMap::new();
        let wl = workload(&[]);
        let ranked = sort_best_zones(&zones, &nodes, &[], &wl, &services);
        assert!(ranked.is_empty());
    }
}
