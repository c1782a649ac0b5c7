/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! §6.3 — Platform instance catalog.
//!
//! A small in-memory table standing in for the real instance-type catalog
//! an external collaborator service would otherwise provide. Grounded on
//! the donor's `config::NodeConfigManager`: a lookup keyed by a small enum,
//! falling back to a sane default rather than failing when the exact key
//! isn't present.

use crate::model::{Instance, Platform};

/// Every known instance type for `platform`, largest-memory first.
pub fn instances_for_platform(platform: Platform) -> Vec<Instance> {
    match platform {
        Platform::Aws => vec![
            instance("m5.2xlarge", 32.0, 8.0, Some(true), None),
            instance("m5.xlarge", 16.0, 4.0, None, None),
            instance("m5.4xlarge", 64.0, 16.0, None, None),
            control_plane_instance("m5.2xlarge-cp", 32.0, 8.0),
        ],
        Platform::Gcp => vec![
            instance("n2-standard-8", 32.0, 8.0, Some(true), None),
            instance("n2-standard-4", 16.0, 4.0, None, None),
            instance("n2-standard-16", 64.0, 16.0, None, None),
            control_plane_instance("n2-standard-8-cp", 32.0, 8.0),
        ],
        Platform::Azure => vec![
            instance("Standard_D8s_v5", 32.0, 8.0, Some(true), None),
            instance("Standard_D4s_v5", 16.0, 4.0, None, None),
            instance("Standard_D16s_v5", 64.0, 16.0, None, None),
            control_plane_instance("Standard_D8s_v5-cp", 32.0, 8.0),
        ],
        Platform::VMware => vec![instance("vmware-generic-8x32", 32.0, 8.0, Some(true), None)],
        Platform::Rhv => vec![instance("rhv-generic-8x32", 32.0, 8.0, Some(true), None)],
        Platform::BareMetal => vec![instance("baremetal-generic", 64.0, 16.0, Some(true), None)],
        Platform::IbmClassic => vec![instance("ibm-classic-8x32", 32.0, 8.0, Some(true), None)],
        Platform::IbmVpc => vec![instance("ibm-vpc-8x32", 32.0, 8.0, Some(true), None)],
    }
}

/// The platform's default instance type — the one marked `default: true`,
/// or the first entry if none is marked. Unknown platforms never reach
/// this function; `Platform::from_str` rejects them before a `Platform`
/// value can exist (spec §6.5's "AWS fallback" applies one layer up, at
/// the facade, for a missing/unspecified platform string).
pub fn default_instance_for_platform(platform: Platform) -> Instance {
    let catalog = instances_for_platform(platform);
    catalog
        .iter()
        .find(|i| i.default.unwrap_or(false))
        .cloned()
        .or_else(|| catalog.first().cloned())
        .expect("every platform has at least one catalog entry")
}

fn instance(name: &str, memory: f64, cpu_units: f64, default: Option<bool>, odf_default: Option<bool>) -> Instance {
    Instance {
        name: name.to_string(),
        memory,
        cpu_units,
        instance_storage: None,
        storage_type: None,
        max_disks: Some(4),
        default,
        control_plane: None,
        odf_default,
    }
}

fn control_plane_instance(name: &str, memory: f64, cpu_units: f64) -> Instance {
    Instance {
        name: name.to_string(),
        memory,
        cpu_units,
        instance_storage: None,
        storage_type: None,
        max_disks: Some(4),
        default: None,
        control_plane: Some(true),
        odf_default: None,
    }
}
