/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! C7 — Over-commitment Metrics.
//!
//! Per-node and cluster-wide over-commit ratios and risk classification.
//! Pure analysis over the already-placed `Node`/`Service` state, in the
//! donor's `feasibility.rs` style: small structs carrying every number a
//! caller might want, rather than a single derived verdict.

use std::collections::HashMap;
use serde::Serialize;

use crate::model::{LimitValue, Node, Service};
use crate::resources::{kubelet_overhead, total_request};

/// Over-commitment risk tier, per spec §4.7's ratio thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
}

/// Classify a limit/allocatable ratio: `<= 1.0` no over-commit, `<= 2.0`
/// low, `<= 4.0` medium, anything higher high.
pub fn classify(ratio: f64) -> RiskLevel {
    if ratio <= 1.0 {
        RiskLevel::None
    } else if ratio <= 2.0 {
        RiskLevel::Low
    } else if ratio <= 4.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

/// Over-commitment metrics for a single node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeMetrics {
    pub node_id: String,
    pub requested_cpu: f64,
    pub requested_memory: f64,
    pub limit_cpu: LimitValue,
    pub limit_memory: LimitValue,
    pub allocatable_cpu: f64,
    pub allocatable_memory: f64,
    pub cpu_ratio: f64,
    pub memory_ratio: f64,
    pub risk: RiskLevel,
}

/// Cluster-wide rollup: each service's requests/limits counted once per
/// placement (spec §4.7 — "multiply each service's requests/limits by its
/// placement count"), summed against total allocatable across every node,
/// and classified through the same ratio/risk rule as a single node.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterMetrics {
    pub nodes: Vec<NodeMetrics>,
    pub total_requested_cpu: f64,
    pub total_requested_memory: f64,
    pub total_limit_cpu: LimitValue,
    pub total_limit_memory: LimitValue,
    pub total_allocatable_cpu: f64,
    pub total_allocatable_memory: f64,
    pub cpu_ratio: f64,
    pub memory_ratio: f64,
    pub risk: RiskLevel,
}

/// Compute over-commitment metrics for `node`.
pub fn node_metrics(node: &Node, services: &HashMap<String, Service>) -> NodeMetrics {
    let placed: Vec<&Service> = node.services.iter().filter_map(|id| services.get(id)).collect();

    let requested = total_request(placed.iter().copied());

    let limit_cpu = placed
        .iter()
        .fold(LimitValue::scalar(0.0), |acc, s| acc + s.limit_cpu_value());
    let limit_memory = placed
        .iter()
        .fold(LimitValue::scalar(0.0), |acc, s| acc + s.limit_memory_value());

    // Allocatable is capacity minus kubelet overhead only (spec §4.7,
    // Glossary "Allocatable") — control-plane reservation is a scheduling-time
    // concern (node_engine/resources), not part of the over-commit ratio base.
    let overhead = kubelet_overhead(node.cpu_units, node.memory);
    let allocatable_cpu = (node.cpu_units - overhead.cpu).max(0.0);
    let allocatable_memory = (node.memory - overhead.memory).max(0.0);

    let cpu_ratio = ratio(limit_cpu.max_value(), allocatable_cpu);
    let memory_ratio = ratio(limit_memory.max_value(), allocatable_memory);
    let risk = classify(cpu_ratio.max(memory_ratio));

    NodeMetrics {
        node_id: node.id.clone(),
        requested_cpu: requested.cpu,
        requested_memory: requested.memory,
        limit_cpu,
        limit_memory,
        allocatable_cpu,
        allocatable_memory,
        cpu_ratio,
        memory_ratio,
        risk,
    }
}

fn ratio(used: f64, allocatable: f64) -> f64 {
    if allocatable <= 0.0 {
        if used <= 0.0 {
            0.0
        } else {
            f64::INFINITY
        }
    } else {
        used / allocatable
    }
}

/// Compute cluster-wide metrics over every node.
pub fn cluster_metrics(nodes: &HashMap<String, Node>, services: &HashMap<String, Service>) -> ClusterMetrics {
    let mut per_node: Vec<NodeMetrics> = nodes.values().map(|n| node_metrics(n, services)).collect();
    per_node.sort_by(|a, b| a.node_id.cmp(&b.node_id));

    let total_requested_cpu = per_node.iter().map(|m| m.requested_cpu).sum();
    let total_requested_memory = per_node.iter().map(|m| m.requested_memory).sum();

    // Each node's limit_cpu/limit_memory already sums its own placed
    // services once per placement; summing across nodes is equivalent to
    // multiplying each service by its placement count across the whole
    // cluster (spec §4.7), since a service placed on N nodes contributes to
    // N of these per-node sums.
    let total_limit_cpu = per_node
        .iter()
        .fold(LimitValue::scalar(0.0), |acc, m| acc + m.limit_cpu);
    let total_limit_memory = per_node
        .iter()
        .fold(LimitValue::scalar(0.0), |acc, m| acc + m.limit_memory);
    let total_allocatable_cpu = per_node.iter().map(|m| m.allocatable_cpu).sum();
    let total_allocatable_memory = per_node.iter().map(|m| m.allocatable_memory).sum();

    let cpu_ratio = ratio(total_limit_cpu.max_value(), total_allocatable_cpu);
    let memory_ratio = ratio(total_limit_memory.max_value(), total_allocatable_memory);
    let risk = classify(cpu_ratio.max(memory_ratio));

    ClusterMetrics {
        nodes: per_node,
        total_requested_cpu,
        total_requested_memory,
        total_limit_cpu,
        total_limit_memory,
        total_allocatable_cpu,
        total_allocatable_memory,
        cpu_ratio,
        memory_ratio,
        risk,
    }
}
