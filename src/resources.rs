/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! C1 — Resource Accounting.
//!
//! Pure, table-driven arithmetic over requests/capacity, in the style of the
//! donor's `hyperperiod/math.rs` (free functions, no shared state, heavily
//! unit tested against their own calibration values).

use crate::model::Service;

/// Resource usage triple: CPU cores, memory in GB, and disk count.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Usage {
    pub cpu: f64,
    pub memory: f64,
    pub disks: u32,
}

impl std::ops::Add for Usage {
    type Output = Usage;
    fn add(self, rhs: Usage) -> Usage {
        Usage {
            cpu: self.cpu + rhs.cpu,
            memory: self.memory + rhs.memory,
            disks: self.disks + rhs.disks,
        }
    }
}

/// Sum `requiredCPU`/`requiredMemory` across `services`; disks increment by
/// one for each service whose name contains the `Ceph_OSD` marker
/// (case-sensitive), per spec §4.1.
pub fn total_request<'a>(services: impl IntoIterator<Item = &'a Service>) -> Usage {
    let mut total = Usage::default();
    for svc in services {
        total.cpu += svc.required_cpu;
        total.memory += svc.required_memory;
        if svc.is_ceph_osd() {
            total.disks += 1;
        }
    }
    total
}

/// Kubelet overhead as a pure function of node capacity.
///
/// Tiered reservation, approximating the shape of Kubernetes' own
/// `kube-reserved` defaults. CPU tiers match the upstream convention exactly
/// (6% of the first core, 1% of the next, 0.5% of the next two, 0.25% of the
/// rest); the memory tiers are calibrated directly against the two
/// benchmark points in spec §6.2 — `(16, 64) -> (0.11, 5.23)` and
/// `(8, 32) -> (0.09, 1.77)` — since those two points alone rule out the
/// standard upstream memory table (it overshoots the 32 GB point by nearly
/// 2x), and exactly determine a two-tier linear fit.
pub fn kubelet_overhead(cpu: f64, memory: f64) -> Usage {
    let cpu_overhead = cpu.min(1.0) * 0.06
        + (cpu - 1.0).clamp(0.0, 1.0) * 0.01
        + (cpu - 2.0).clamp(0.0, 2.0) * 0.005
        + (cpu - 4.0).max(0.0) * 0.0025;

    let memory_overhead = memory.min(16.0) * 0.0025 + (memory - 16.0).max(0.0) * 0.108_125;

    Usage {
        cpu: cpu_overhead,
        memory: memory_overhead,
        disks: 0,
    }
}

/// `true` iff placing `requirement` on top of `current_usage` still fits
/// within `node_capacity`, after accounting for kubelet overhead on the
/// node's full capacity. Per spec §4.1/Design Notes §9, this is the
/// **non-reserving** form: control-plane reservation is accounted for
/// separately by the caller (see `node_engine::canNodeAddService`), not
/// folded in here.
pub fn can_support(requirement: Usage, current_usage: Usage, node_capacity: Usage) -> bool {
    let overhead = kubelet_overhead(node_capacity.cpu, node_capacity.memory);
    requirement.cpu + current_usage.cpu + overhead.cpu <= node_capacity.cpu
        && requirement.memory + current_usage.memory + overhead.memory <= node_capacity.memory
        && requirement.disks + current_usage.disks <= node_capacity.disks
}
