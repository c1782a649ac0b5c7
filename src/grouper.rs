/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! C3 — Co-placement Grouper.
//!
//! Partitions a workload's services into bundles that must land on the same
//! node: the connected components of the symmetric closure of `runsWith`,
//! restricted to the workload's own services (spec §4.3, Design Notes §9
//! "Cyclic references" — computed as a graph traversal rather than assumed
//! acyclic, since `runsWith` is an undirected relation and may contain
//! cycles).

use std::collections::{HashMap, HashSet};

use crate::model::{Service, Workload};

/// A bundle: the ids of services that must be scheduled onto the same node,
/// ordered by their position in the owning workload's `services` list (for
/// deterministic downstream iteration).
pub type Bundle = Vec<String>;

/// Compute every co-placement bundle for `workload`.
///
/// Bundles are returned in order of first occurrence within
/// `workload.services`; each bundle's own members are likewise ordered by
/// their position in `workload.services`.
pub fn bundles(workload: &Workload, services: &HashMap<String, Service>) -> Vec<Bundle> {
    let in_workload: HashSet<&str> = workload.services.iter().map(String::as_str).collect();
    let mut visited: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for id in &workload.services {
        if visited.contains(id) {
            continue;
        }
        let component = connected_component(id, &in_workload, services);
        visited.extend(component.iter().cloned());
        out.push(order_by_workload(&component, workload));
    }

    out
}

/// Return the bundle (ordered per `workload.services`) containing `start`.
pub fn bundle_containing(
    workload: &Workload,
    services: &HashMap<String, Service>,
    start: &str,
) -> Bundle {
    let in_workload: HashSet<&str> = workload.services.iter().map(String::as_str).collect();
    let component = connected_component(start, &in_workload, services);
    order_by_workload(&component, workload)
}

fn connected_component(
    start: &str,
    in_workload: &HashSet<&str>,
    services: &HashMap<String, Service>,
) -> HashSet<String> {
    let mut visited: HashSet<String> = HashSet::new();
    let mut stack = vec![start.to_string()];

    while let Some(id) = stack.pop() {
        if !visited.insert(id.clone()) {
            continue;
        }
        let Some(svc) = services.get(&id) else {
            continue;
        };
        for neighbor in &svc.runs_with {
            if in_workload.contains(neighbor.as_str()) && !visited.contains(neighbor) {
                stack.push(neighbor.clone());
            }
        }
        // Symmetric closure: a neighbor that names `id` in its own
        // `runsWith` must also pull `id`'s component in, even if `id`
        // itself didn't list the neighbor (input normalization should make
        // this redundant, but the closure is computed defensively).
        for (other_id, other_svc) in services {
            if in_workload.contains(other_id.as_str())
                && other_svc.runs_with.contains(&id)
                && !visited.contains(other_id)
            {
                stack.push(other_id.clone());
            }
        }
    }

    visited
}

fn order_by_workload(component: &HashSet<String>, workload: &Workload) -> Bundle {
    workload
        .services
        .iter()
        .filter(|id| component.contains(id.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OverCommitMode;
    use std::collections::BTreeSet;

    fn svc(id: &str, runs_with: &[&str]) -> Service {
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
            zones: 1,
            runs_with: runs_with.iter().map(|s| s.to_string()).collect(),
            avoid: BTreeSet::new(),
            owner_reference: None,
        }
    }

    fn workload(service_ids: &[&str]) -> Workload {
        Workload {
            id: "w1".into(),
            name: "w1".into(),
            count: 1,
            uses_machines: BTreeSet::new(),
            services: service_ids.iter().map(|s| s.to_string()).collect(),
            allow_control_plane: false,
            require_control_plane: false,
        }
    }

    #[test]
    fn singleton_services_form_their_own_bundles() {
        let services: HashMap<String, Service> = [svc("a", &[]), svc("b", &[])]
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();
        let wl = workload(&["a", "b"]);
        let b = bundles(&wl, &services);
        assert_eq!(b, vec![vec!["a".to_string()], vec!["b".to_string()]]);
    }

    #[test]
    fn runs_with_merges_services_into_one_bundle() {
        let services: HashMap<String, Service> = [svc("a", &["b"]), svc("b", &["a"]), svc("c", &[])]
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();
        let wl = workload(&["a", "b", "c"]);
        let b = bundles(&wl, &services);
        assert_eq!(
            b,
            vec![vec!["a".to_string(), "b".to_string()], vec!["c".to_string()]]
        );
    }

    #[test]
    fn transitive_runs_with_forms_one_bundle_via_connected_components() {
        // a-b, b-c (a and c not directly linked) -> one bundle {a,b,c}
        let services: HashMap<String, Service> = [
            svc("a", &["b"]),
            svc("b", &["a", "c"]),
            svc("c", &["b"]),
        ]
        .into_iter()
        .map(|s| (s.id.clone(), s))
        .collect();
        let wl = workload(&["a", "b", "c"]);
        let b = bundles(&wl, &services);
        assert_eq!(b.len(), 1);
        assert_eq!(b[0], vec!["a".to_string(), "b".to_string(), "c".to_string()]);
    }

    #[test]
    fn cycles_do_not_cause_infinite_loops() {
        let services: HashMap<String, Service> = [
            svc("a", &["b"]),
            svc("b", &["c"]),
            svc("c", &["a"]),
        ]
        .into_iter()
        .map(|s| (s.id.clone(), s))
        .collect();
        let wl = workload(&["a", "b", "c"]);
        let b = bundles(&wl, &services);
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].len(), 3);
    }

    #[test]
    fn runs_with_outside_the_workload_is_ignored() {
        let services: HashMap<String, Service> = [svc("a", &["x"]), svc("b", &[])]
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();
        let wl = workload(&["a", "b"]);
        let b = bundles(&wl, &services);
        assert_eq!(b, vec![vec!["a".to_string()], vec!["b".to_string()]]);
    }

    #[test]
    fn bundle_containing_returns_the_right_component() {
        let services: HashMap<String, Service> = [svc("a", &["b"]), svc("b", &["a"]), svc("c", &[])]
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();
        let wl = workload(&["a", "b", "c"]);
        assert_eq!(
            bundle_containing(&wl, &services, "b"),
            vec!["a".to_string(), "b".to_string()]
        );
        assert_eq!(bundle_containing(&wl, &services, "c"), vec!["c".to_string()]);
    }

    #[test]
    fn asymmetric_runs_with_is_still_merged_via_symmetric_closure() {
        // Only a -> b declared (normalization should make this symmetric on
        // input, but the grouper itself tolerates an asymmetric graph).
        let services: HashMap<String, Service> = [svc("a", &["b"]), svc("b", &[])]
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();
        let wl = workload(&["a", "b"]);
        let b = bundles(&wl, &services);
        assert_eq!(b.len(), 1);
        assert_eq!(b[0], vec!["a".to_string(), "b".to_string()]);
    }
}
