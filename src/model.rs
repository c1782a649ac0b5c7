/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core data model for the cluster sizing engine.
//!
//! Mirrors the donor's approach in `task.rs`: typed enums replace bare
//! strings/sentinels (`SchedPolicy`, `CpuAffinity`), and the wire-facing
//! descriptor types are kept distinct from the internal working types that
//! the scheduler mutates in place.
//!
//! ```text
//! WorkloadDescriptor  ──(facade::expand)──►  Workload + Service  ──(scheduler)──►  Node / Zone
//!        ↑ input, string refs                  ↑ internal, id refs              ↑ output
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

// ── Resource amount ───────────────────────────────────────────────────────────

/// A plain `(cpu, memory)` pair, used for control-plane reservations and for
/// intermediate sums. `cpu` is in cores (fractional requests allowed),
/// `memory` in GB.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceAmount {
    pub cpu: f64,
    pub memory: f64,
}

impl ResourceAmount {
    pub const ZERO: ResourceAmount = ResourceAmount {
        cpu: 0.0,
        memory: 0.0,
    };

    pub fn new(cpu: f64, memory: f64) -> Self {
        Self { cpu, memory }
    }
}

impl std::ops::Add for ResourceAmount {
    type Output = ResourceAmount;
    fn add(self, rhs: ResourceAmount) -> ResourceAmount {
        ResourceAmount {
            cpu: self.cpu + rhs.cpu,
            memory: self.memory + rhs.memory,
        }
    }
}

/// Default control-plane reservation, per spec §4.4: `{cpu: 2, memory: 4}`.
pub const DEFAULT_CONTROL_PLANE_RESERVED: ResourceAmount = ResourceAmount {
    cpu: 2.0,
    memory: 4.0,
};

// ── Polymorphic limit value ───────────────────────────────────────────────────

/// Either a scalar limit or a `{min, max}` range.
///
/// Design Notes §9 ("Polymorphic limit fields"): modeled as a tagged
/// variant rather than a `min == max` convention so the output format
/// preserves the scalar-vs-range distinction observed in scenario S6.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LimitValue {
    Scalar(f64),
    Range { min: f64, max: f64 },
}

impl LimitValue {
    pub fn scalar(v: f64) -> Self {
        LimitValue::Scalar(v)
    }

    /// The value used for ratio computation: `max` for a range (worst case),
    /// the value itself for a scalar.
    pub fn max_value(&self) -> f64 {
        match self {
            LimitValue::Scalar(v) => *v,
            LimitValue::Range { max, .. } => *max,
        }
    }

    pub fn min_value(&self) -> f64 {
        match self {
            LimitValue::Scalar(v) => *v,
            LimitValue::Range { min, .. } => *min,
        }
    }
}

impl std::ops::Add for LimitValue {
    type Output = LimitValue;

    /// Summing two scalars stays a scalar; summing anything that involves a
    /// range produces a range (scalars widen to `{v, v}` first).
    fn add(self, rhs: LimitValue) -> LimitValue {
        match (self, rhs) {
            (LimitValue::Scalar(a), LimitValue::Scalar(b)) => LimitValue::Scalar(a + b),
            (a, b) => LimitValue::Range {
                min: a.min_value() + b.min_value(),
                max: a.max_value() + b.max_value(),
            },
        }
    }
}

impl Serialize for LimitValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LimitValue::Scalar(v) => serializer.serialize_f64(*v),
            LimitValue::Range { min, max } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("min", min)?;
                map.serialize_entry("max", max)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for LimitValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LimitValueVisitor;

        impl<'de> Visitor<'de> for LimitValueVisitor {
            type Value = LimitValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number or a {min, max} object")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<LimitValue, E> {
                Ok(LimitValue::Scalar(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<LimitValue, E> {
                Ok(LimitValue::Scalar(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<LimitValue, E> {
                Ok(LimitValue::Scalar(v as f64))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<LimitValue, A::Error> {
                let mut min = None;
                let mut max = None;
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "min" => min = Some(map.next_value()?),
                        "max" => max = Some(map.next_value()?),
                        _ => {
                            let _: de::IgnoredAny = map.next_value()?;
                        }
                    }
                }
                let min = min.ok_or_else(|| de::Error::missing_field("min"))?;
                let max = max.ok_or_else(|| de::Error::missing_field("max"))?;
                Ok(LimitValue::Range { min, max })
            }
        }

        deserializer.deserialize_any(LimitValueVisitor)
    }
}

// ── Over-commit mode ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverCommitMode {
    Static,
    Dynamic,
    #[default]
    None,
}

// ── MachineSet ─────────────────────────────────────────────────────────────────

/// An abstract description of a node type. Immutable after input.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MachineSet {
    pub name: String,
    pub cpu: f64,
    pub memory: f64,
    #[serde(default)]
    pub instance_name: String,
    #[serde(default)]
    pub number_of_disks: u32,
    /// Set of workload names this MachineSet is dedicated to. Empty = universal.
    #[serde(default)]
    pub only_for: BTreeSet<String>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub allow_workload_scheduling: Option<bool>,
    #[serde(default)]
    pub control_plane_reserved: Option<ResourceAmount>,
}

impl MachineSet {
    /// `true` if the MachineSet is named `controlPlane`/`control-plane`
    /// (case-insensitive), per spec §4.2/§4.4.
    pub fn is_control_plane_named(&self) -> bool {
        let n = self.name.to_ascii_lowercase();
        n == "controlplane" || n == "control-plane"
    }

    pub fn allows_workload_scheduling(&self) -> bool {
        self.allow_workload_scheduling.unwrap_or(false)
    }
}

// ── Service ────────────────────────────────────────────────────────────────────

/// A schedulable unit (one container/pod archetype), after id-expansion.
#[derive(Debug, Clone, Serialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub required_cpu: f64,
    pub required_memory: f64,
    pub limit_cpu: Option<f64>,
    pub limit_memory: Option<f64>,
    pub min_limit_cpu: Option<f64>,
    pub max_limit_cpu: Option<f64>,
    pub min_limit_memory: Option<f64>,
    pub max_limit_memory: Option<f64>,
    pub over_commit_mode: OverCommitMode,
    pub zones: u32,
    /// Service ids this service must be co-placed with (symmetric).
    pub runs_with: BTreeSet<String>,
    /// Service ids this service must not share a node with.
    pub avoid: BTreeSet<String>,
    pub owner_reference: Option<String>,
}

impl Service {
    /// `true` if this service's name contains the `Ceph_OSD` marker,
    /// case-sensitive, per spec §4.1.
    pub fn is_ceph_osd(&self) -> bool {
        self.name.contains("Ceph_OSD")
    }

    /// `true` if this service's name identifies it as a control-plane
    /// component, per spec §4.4's marker list (case-insensitive).
    pub fn is_control_plane_service(&self) -> bool {
        const MARKERS: [&str; 7] = [
            "kube-apiserver",
            "etcd",
            "kube-controller-manager",
            "kube-scheduler",
            "cluster-version-operator",
            "control-plane",
            "controlplane",
        ];
        let lower = self.name.to_ascii_lowercase();
        MARKERS.iter().any(|marker| lower.contains(marker))
    }

    /// Effective limit value for CPU: a range if any dynamic bound is set,
    /// otherwise a scalar defaulting to the request.
    pub fn limit_cpu_value(&self) -> LimitValue {
        effective_limit(
            self.required_cpu,
            self.limit_cpu,
            self.min_limit_cpu,
            self.max_limit_cpu,
        )
    }

    pub fn limit_memory_value(&self) -> LimitValue {
        effective_limit(
            self.required_memory,
            self.limit_memory,
            self.min_limit_memory,
            self.max_limit_memory,
        )
    }

    /// `true` if any dynamic-limit bound is present — forces range-valued
    /// output per spec §4.7.
    pub fn has_dynamic_bounds(&self) -> bool {
        self.min_limit_cpu.is_some()
            || self.max_limit_cpu.is_some()
            || self.min_limit_memory.is_some()
            || self.max_limit_memory.is_some()
    }
}

/// `min*` defaults to `limit*` defaults to `required*`; same for `max*`.
/// Produces a scalar unless `min`/`max` are explicitly set and differ in
/// source from a plain `limit`.
fn effective_limit(
    required: f64,
    limit: Option<f64>,
    min_limit: Option<f64>,
    max_limit: Option<f64>,
) -> LimitValue {
    if min_limit.is_none() && max_limit.is_none() {
        return LimitValue::Scalar(limit.unwrap_or(required));
    }
    let min = min_limit.or(limit).unwrap_or(required);
    let max = max_limit.or(limit).unwrap_or(required);
    LimitValue::Range { min, max }
}

// ── Workload ───────────────────────────────────────────────────────────────────

/// A named bundle of Services owned by a user-level unit, after id-expansion.
#[derive(Debug, Clone)]
pub struct Workload {
    pub id: String,
    pub name: String,
    pub count: u32,
    pub uses_machines: BTreeSet<String>,
    pub services: Vec<String>,
    pub allow_control_plane: bool,
    pub require_control_plane: bool,
}

// ── Node ───────────────────────────────────────────────────────────────────────

/// An allocated machine instance.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub id: String,
    pub machine_set: String,
    pub cpu_units: f64,
    pub memory: f64,
    pub max_disks: u32,
    pub instance_name: String,
    #[serde(skip)]
    pub only_for: BTreeSet<String>,
    pub services: Vec<String>,
    pub is_control_plane: bool,
    pub allow_workload_scheduling: bool,
    pub control_plane_reserved: ResourceAmount,
}

impl Node {
    pub fn from_machine_set(id: String, ms: &MachineSet) -> Self {
        Node {
            id,
            machine_set: ms.name.clone(),
            cpu_units: ms.cpu,
            memory: ms.memory,
            max_disks: ms.number_of_disks,
            instance_name: ms.instance_name.clone(),
            only_for: ms.only_for.clone(),
            services: Vec::new(),
            is_control_plane: ms.is_control_plane_named(),
            allow_workload_scheduling: ms.allows_workload_scheduling(),
            control_plane_reserved: ms
                .control_plane_reserved
                .unwrap_or(DEFAULT_CONTROL_PLANE_RESERVED),
        }
    }
}

// ── Zone ───────────────────────────────────────────────────────────────────────

/// A failure domain.
#[derive(Debug, Clone, Serialize)]
pub struct Zone {
    pub id: String,
    pub nodes: Vec<String>,
}

impl Zone {
    pub fn new(id: String) -> Self {
        Zone {
            id,
            nodes: Vec::new(),
        }
    }
}

// ── Platform ───────────────────────────────────────────────────────────────────

/// String-valued platform enum, per spec §6.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    BareMetal,
    Gcp,
    Azure,
    VMware,
    Rhv,
    Aws,
    IbmClassic,
    IbmVpc,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::BareMetal => "BAREMETAL",
            Platform::Gcp => "GCP",
            Platform::Azure => "AZURE",
            Platform::VMware => "VMware",
            Platform::Rhv => "RHV",
            Platform::Aws => "AWS",
            Platform::IbmClassic => "IBM-Classic",
            Platform::IbmVpc => "IBM-VPC",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Case-insensitive, dash/underscore tolerant — real request bodies
        // are inconsistently cased (spec §6.5 lists mixed-case variants).
        let normalized = s.to_ascii_uppercase().replace('_', "-");
        match normalized.as_str() {
            "BAREMETAL" | "BARE-METAL" => Ok(Platform::BareMetal),
            "GCP" => Ok(Platform::Gcp),
            "AZURE" => Ok(Platform::Azure),
            "VMWARE" => Ok(Platform::VMware),
            "RHV" => Ok(Platform::Rhv),
            "AWS" => Ok(Platform::Aws),
            "IBM-CLASSIC" => Ok(Platform::IbmClassic),
            "IBM-VPC" => Ok(Platform::IbmVpc),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Platform::from_str(&s).map_err(de::Error::custom)
    }
}

// ── Instance (platform catalog entry) ─────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Instance {
    pub name: String,
    pub memory: f64,
    pub cpu_units: f64,
    #[serde(default)]
    pub instance_storage: Option<f64>,
    #[serde(default)]
    pub storage_type: Option<String>,
    #[serde(default)]
    pub max_disks: Option<u32>,
    #[serde(default)]
    pub default: Option<bool>,
    #[serde(default)]
    pub control_plane: Option<bool>,
    #[serde(default)]
    pub odf_default: Option<bool>,
}

// ── Descriptor types (wire format, pre id-expansion) ──────────────────────────

/// Raw service description as it arrives in a sizing request, before ids are
/// assigned and name references are resolved (spec §4.8 step 2).
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceDescriptor {
    pub name: String,
    pub required_cpu: f64,
    pub required_memory: f64,
    #[serde(default)]
    pub limit_cpu: Option<f64>,
    #[serde(default)]
    pub limit_memory: Option<f64>,
    #[serde(default)]
    pub min_limit_cpu: Option<f64>,
    #[serde(default)]
    pub max_limit_cpu: Option<f64>,
    #[serde(default)]
    pub min_limit_memory: Option<f64>,
    #[serde(default)]
    pub max_limit_memory: Option<f64>,
    #[serde(default)]
    pub over_commit_mode: OverCommitMode,
    #[serde(default = "default_zones")]
    pub zones: u32,
    #[serde(default)]
    pub runs_with: Vec<String>,
    #[serde(default)]
    pub avoid: Vec<String>,
}

fn default_zones() -> u32 {
    1
}

/// Raw workload description as it arrives in a sizing request.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkloadDescriptor {
    pub name: String,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub uses_machines: BTreeSet<String>,
    pub services: Vec<ServiceDescriptor>,
    #[serde(default)]
    pub allow_control_plane: bool,
    #[serde(default)]
    pub require_control_plane: bool,
}

fn default_count() -> u32 {
    1
}
