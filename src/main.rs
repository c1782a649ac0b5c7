/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Command-line front end for the cluster sizing engine.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use sizer::facade;
use sizer::model::{MachineSet, Platform, WorkloadDescriptor};

#[derive(Parser)]
#[command(name = "sizer", about = "Kubernetes/OpenShift cluster sizing engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute a cluster size for a set of workloads.
    Size {
        /// Path to a JSON file containing an array of workload descriptors.
        #[arg(long)]
        input: PathBuf,

        /// Path to a JSON file containing an explicit MachineSet catalog.
        /// When omitted, a single default MachineSet is derived from
        /// `--platform`.
        #[arg(long)]
        machine_sets: Option<PathBuf>,

        /// Target platform, used to pick a default instance type when
        /// `--machine-sets` is not given.
        #[arg(long)]
        platform: Option<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Size {
            input,
            machine_sets,
            platform,
        } => run_size(input, machine_sets, platform),
    }
}

fn run_size(input: PathBuf, machine_sets_path: Option<PathBuf>, platform: Option<String>) -> Result<()> {
    let workloads = read_workloads(&input)?;
    let machine_sets = machine_sets_path.as_deref().map(read_machine_sets).transpose()?;
    let platform = platform.map(resolve_platform);

    let sizing = facade::size(workloads, platform, machine_sets)?;

    let output = serde_json::to_string_pretty(&sizing).context("serializing cluster sizing result")?;
    println!("{output}");

    Ok(())
}

fn read_workloads(path: &std::path::Path) -> Result<Vec<WorkloadDescriptor>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading workload input file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing workload input file {}", path.display()))
}

fn read_machine_sets(path: &std::path::Path) -> Result<Vec<MachineSet>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading MachineSet catalog {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing MachineSet catalog {}", path.display()))
}

/// Spec §6.3: unknown platform names fall back to the AWS catalog rather
/// than rejecting the request outright.
fn resolve_platform(raw: String) -> Platform {
    raw.parse::<Platform>().unwrap_or_else(|_| {
        tracing::warn!(platform = %raw, "unknown platform, falling back to AWS catalog");
        Platform::Aws
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_workloads_from_a_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name":"wl","services":[{{"name":"a","required_cpu":1.0,"required_memory":1.0}}]}}]"#
        )
        .unwrap();
        let workloads = read_workloads(file.path()).unwrap();
        assert_eq!(workloads.len(), 1);
        assert_eq!(workloads[0].services[0].name, "a");
    }

    #[test]
    fn reads_machine_sets_from_a_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"name":"worker","cpu":32.0,"memory":64.0}}]"#).unwrap();
        let sets = read_machine_sets(file.path()).unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].name, "worker");
    }

    #[test]
    fn missing_input_file_is_a_contextual_error() {
        let err = read_workloads(std::path::Path::new("/no/such/file.json")).unwrap_err();
        assert!(err.to_string().contains("reading workload input file"));
    }

    #[test]
    fn unknown_platform_name_falls_back_to_aws() {
        assert_eq!(resolve_platform("openstack".to_string()), Platform::Aws);
        assert_eq!(resolve_platform("gcp".to_string()), Platform::Gcp);
    }
}
