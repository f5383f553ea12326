//! Benchmark kind table and record construction.
//!
//! Every recognized `-name` value maps to a [`KindDescriptor`]. Validation and
//! command building are driven by the descriptor's [`Family`], so adding a
//! kind means adding a table row rather than another branch.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::error::ManifestError;
use crate::options::ManifestOptions;

pub const OSU_MPI_PATH: &str = "/opt/osu-micro-benchmarks/libexec/osu-micro-benchmarks/mpi/";

pub const OSU_IMAGE: &str =
    "image-registry.openshift-image-registry.svc:5000/mpi-benchmark/mpi-bench:osu-bench";
pub const SYSBENCH_IMAGE: &str =
    "image-registry.openshift-image-registry.svc:5000/mpi-benchmark/mpi-bench:base3";

const CPU_MAX_PRIME: u32 = 20_000;
const FILE_IO_PREFIX: &str = "sys-fio_";
const FILE_IO_MODES: [&str; 2] = ["rndwr", "rndrd"];
const POINT_TO_POINT_PROCS: u32 = 2;
const SYSTEM_PROCS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkType {
    Sdn,
    Multus,
    HostNetwork,
}

impl NetworkType {
    pub const ALL: [Self; 3] = [Self::Sdn, Self::Multus, Self::HostNetwork];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sdn => "SDN",
            Self::Multus => "Multus",
            Self::HostNetwork => "HostNetwork",
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkType {
    type Err = ManifestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|net| net.as_str() == value)
            .ok_or_else(|| ManifestError::InvalidNetwork(value.to_string()))
    }
}

/// How a kind is validated and how its command is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Two-process OSU run, optionally pinned to a source/destination pair.
    PointToPoint { binary: &'static str },
    /// sysbench CPU stress on one node.
    SystemCpu,
    /// sysbench random write/read passes inside `directory`.
    SystemFileIo { directory: &'static str },
    /// OSU collective over `-np` processes.
    Collective { binary: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindDescriptor {
    pub name: &'static str,
    pub family: Family,
    pub image: &'static str,
}

impl KindDescriptor {
    /// Kind name with underscores replaced, suitable for resource names.
    #[must_use]
    pub fn label(&self) -> String {
        self.name.replace('_', "-")
    }
}

pub const KINDS: &[KindDescriptor] = &[
    KindDescriptor {
        name: "latency",
        family: Family::PointToPoint {
            binary: "pt2pt/osu_latency",
        },
        image: OSU_IMAGE,
    },
    KindDescriptor {
        name: "bandwidth",
        family: Family::PointToPoint {
            binary: "pt2pt/osu_bw",
        },
        image: OSU_IMAGE,
    },
    KindDescriptor {
        name: "sys-cpu",
        family: Family::SystemCpu,
        image: SYSBENCH_IMAGE,
    },
    KindDescriptor {
        name: "sys-fio_tmp",
        family: Family::SystemFileIo { directory: "/tmp" },
        image: SYSBENCH_IMAGE,
    },
    KindDescriptor {
        name: "sys-fio_local",
        family: Family::SystemFileIo {
            directory: "/mnt/storage",
        },
        image: SYSBENCH_IMAGE,
    },
    KindDescriptor {
        name: "sys-fio_cephfs",
        family: Family::SystemFileIo {
            directory: "/mnt/storage",
        },
        image: SYSBENCH_IMAGE,
    },
    KindDescriptor {
        name: "sys-fio_overlay",
        family: Family::SystemFileIo {
            directory: "/mnt/storage",
        },
        image: SYSBENCH_IMAGE,
    },
    KindDescriptor {
        name: "osu-allreduce",
        family: Family::Collective {
            binary: "collective/osu_allreduce",
        },
        image: OSU_IMAGE,
    },
    KindDescriptor {
        name: "osu-alltoall",
        family: Family::Collective {
            binary: "collective/osu_alltoall",
        },
        image: OSU_IMAGE,
    },
];

pub fn lookup_kind(name: &str) -> Result<&'static KindDescriptor, ManifestError> {
    KINDS
        .iter()
        .find(|kind| kind.name == name)
        .ok_or_else(|| {
            if name.starts_with(FILE_IO_PREFIX) {
                ManifestError::UnsupportedMode(name.to_string())
            } else {
                ManifestError::InvalidName(name.to_string())
            }
        })
}

/// Values handed to the manifest template.
///
/// Template files address these as `.Bench`, `.Name`, `.Image`, `.Nproc`,
/// `.NetworkType`, `.Command`, `.SrcNode` and `.DstNode`; absent optional
/// values render as empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkRecord {
    pub benchmark_kind: String,
    pub display_name: String,
    pub container_image: String,
    pub process_count: u32,
    pub network_type: Option<NetworkType>,
    pub command_line: String,
    pub source_node: Option<String>,
    pub destination_node: Option<String>,
}

impl BenchmarkRecord {
    pub fn from_options(options: &ManifestOptions) -> Result<Self, ManifestError> {
        let name = options.name().ok_or(ManifestError::MissingName)?;
        let kind = lookup_kind(name)?;
        match kind.family {
            Family::PointToPoint { binary } => point_to_point(kind, binary, options),
            Family::SystemCpu => {
                let source = options.src().ok_or(ManifestError::MissingSource)?;
                let threads = options.threads().ok_or(ManifestError::MissingThreads)?;
                let command =
                    format!("sysbench --cpu-max-prime={CPU_MAX_PRIME} --threads={threads} cpu run");
                Ok(system(kind, source, Some(threads), command, options))
            }
            Family::SystemFileIo { directory } => {
                let source = options.src().ok_or(ManifestError::MissingSource)?;
                let command = file_io_command(directory);
                Ok(system(kind, source, options.threads(), command, options))
            }
            Family::Collective { binary } => collective(kind, binary, options),
        }
    }
}

fn point_to_point(
    kind: &KindDescriptor,
    binary: &str,
    options: &ManifestOptions,
) -> Result<BenchmarkRecord, ManifestError> {
    let network = require_network(options)?;
    let placement = match (options.src(), options.dst()) {
        (Some(src), Some(dst)) => Some((src.to_string(), dst.to_string())),
        (None, None) => None,
        _ => return Err(ManifestError::UnpairedPlacement),
    };

    let mut display_name = format!(
        "{}-{}-{POINT_TO_POINT_PROCS}procs",
        kind.name,
        network.as_str().to_lowercase()
    );
    if let Some((src, dst)) = &placement {
        display_name.push_str(&format!("-{src}-{dst}"));
    }
    let (source_node, destination_node) = placement.unzip();

    Ok(BenchmarkRecord {
        benchmark_kind: kind.name.to_string(),
        display_name,
        container_image: kind.image.to_string(),
        process_count: POINT_TO_POINT_PROCS,
        network_type: Some(network),
        command_line: format!("{OSU_MPI_PATH}{binary}"),
        source_node,
        destination_node,
    })
}

fn system(
    kind: &KindDescriptor,
    source: &str,
    threads: Option<&str>,
    command_line: String,
    options: &ManifestOptions,
) -> BenchmarkRecord {
    if let Some(net) = options.net() {
        warn!(kind = kind.name, net, "ignoring -net for a single-node benchmark");
    }
    if let Some(dst) = options.dst() {
        warn!(kind = kind.name, dst, "ignoring -dst for a single-node benchmark");
    }

    BenchmarkRecord {
        benchmark_kind: kind.name.to_string(),
        display_name: format!(
            "{}-{source}-{}threads",
            kind.label(),
            threads.unwrap_or_default()
        ),
        container_image: kind.image.to_string(),
        process_count: SYSTEM_PROCS,
        network_type: None,
        command_line,
        source_node: Some(source.to_string()),
        destination_node: None,
    }
}

fn collective(
    kind: &KindDescriptor,
    binary: &str,
    options: &ManifestOptions,
) -> Result<BenchmarkRecord, ManifestError> {
    let np = options.np().ok_or(ManifestError::MissingProcessCount)?;
    let process_count = parse_process_count(np)?;
    let network = require_network(options)?;
    if options.src().is_some() || options.dst().is_some() {
        warn!(kind = kind.name, "ignoring -src/-dst for a collective benchmark");
    }

    Ok(BenchmarkRecord {
        benchmark_kind: kind.name.to_string(),
        display_name: format!(
            "{}-{}-{np}procs",
            kind.label(),
            network.as_str().to_lowercase()
        ),
        container_image: kind.image.to_string(),
        process_count,
        network_type: Some(network),
        command_line: format!("{OSU_MPI_PATH}{binary}"),
        source_node: None,
        destination_node: None,
    })
}

fn require_network(options: &ManifestOptions) -> Result<NetworkType, ManifestError> {
    options.net().ok_or(ManifestError::MissingNetwork)?.parse()
}

fn parse_process_count(value: &str) -> Result<u32, ManifestError> {
    let count: u32 = value
        .parse()
        .map_err(|source| ManifestError::InvalidProcessCount {
            value: value.to_string(),
            source,
        })?;
    if count == 0 {
        return Err(ManifestError::ZeroProcessCount(value.to_string()));
    }
    Ok(count)
}

fn file_io_command(directory: &str) -> String {
    let mut steps = vec![format!("mkdir -p {directory}"), format!("cd {directory}")];
    for mode in FILE_IO_MODES {
        steps.push(format!(
            "sysbench fileio prepare --file-test-mode={mode} >/dev/null"
        ));
        steps.push(format!("sysbench fileio run --file-test-mode={mode}"));
    }
    steps.push("echo DONE".to_string());
    steps.join(" && ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(name: &str) -> ManifestOptions {
        ManifestOptions {
            name: Some(name.into()),
            ..ManifestOptions::default()
        }
    }

    #[test]
    fn every_table_name_resolves_to_itself() {
        for kind in KINDS {
            assert_eq!(lookup_kind(kind.name).unwrap(), kind);
        }
    }

    #[test]
    fn images_split_by_benchmark_suite() {
        for kind in KINDS {
            let expected = match kind.family {
                Family::PointToPoint { .. } | Family::Collective { .. } => OSU_IMAGE,
                Family::SystemCpu | Family::SystemFileIo { .. } => SYSBENCH_IMAGE,
            };
            assert_eq!(kind.image, expected, "{}", kind.name);
        }
    }

    #[test]
    fn latency_runs_two_processes() {
        let record = BenchmarkRecord::from_options(&ManifestOptions {
            net: Some("SDN".into()),
            ..options("latency")
        })
        .unwrap();
        assert_eq!(record.process_count, 2);
        assert_eq!(
            record.command_line,
            "/opt/osu-micro-benchmarks/libexec/osu-micro-benchmarks/mpi/pt2pt/osu_latency"
        );
        assert_eq!(record.display_name, "latency-sdn-2procs");
        assert_eq!(record.container_image, OSU_IMAGE);
        assert_eq!(record.source_node, None);
    }

    #[test]
    fn bandwidth_name_carries_placement() {
        let record = BenchmarkRecord::from_options(&ManifestOptions {
            net: Some("Multus".into()),
            src: Some("a".into()),
            dst: Some("b".into()),
            ..options("bandwidth")
        })
        .unwrap();
        assert_eq!(record.display_name, "bandwidth-multus-2procs-a-b");
        assert!(record.command_line.ends_with("pt2pt/osu_bw"));
        assert_eq!(record.source_node.as_deref(), Some("a"));
        assert_eq!(record.destination_node.as_deref(), Some("b"));
    }

    #[test]
    fn point_to_point_requires_paired_placement() {
        let err = BenchmarkRecord::from_options(&ManifestOptions {
            net: Some("SDN".into()),
            src: Some("a".into()),
            ..options("bandwidth")
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Please pass -src AND -dst flags");

        let err = BenchmarkRecord::from_options(&ManifestOptions {
            net: Some("SDN".into()),
            dst: Some("b".into()),
            ..options("latency")
        })
        .unwrap_err();
        assert!(matches!(err, ManifestError::UnpairedPlacement));
    }

    #[test]
    fn network_is_required_and_closed() {
        let err = BenchmarkRecord::from_options(&options("latency")).unwrap_err();
        assert!(matches!(err, ManifestError::MissingNetwork));
        assert!(err.to_string().contains("SDN, Multus, HostNetwork"));

        let err = BenchmarkRecord::from_options(&ManifestOptions {
            net: Some("sdn".into()),
            np: Some("4".into()),
            ..options("osu-alltoall")
        })
        .unwrap_err();
        assert!(matches!(err, ManifestError::InvalidNetwork(ref net) if net == "sdn"));
        assert!(err.to_string().contains("SDN, Multus, HostNetwork"));
    }

    #[test]
    fn sys_cpu_uses_thread_count() {
        let record = BenchmarkRecord::from_options(&ManifestOptions {
            src: Some("node1".into()),
            threads: Some("4".into()),
            ..options("sys-cpu")
        })
        .unwrap();
        assert_eq!(record.display_name, "sys-cpu-node1-4threads");
        assert_eq!(
            record.command_line,
            "sysbench --cpu-max-prime=20000 --threads=4 cpu run"
        );
        assert_eq!(record.process_count, 1);
        assert_eq!(record.network_type, None);
        assert_eq!(record.container_image, SYSBENCH_IMAGE);
    }

    #[test]
    fn sys_cpu_requires_source_then_threads() {
        let err = BenchmarkRecord::from_options(&options("sys-cpu")).unwrap_err();
        assert!(matches!(err, ManifestError::MissingSource));

        let err = BenchmarkRecord::from_options(&ManifestOptions {
            src: Some("node1".into()),
            ..options("sys-cpu")
        })
        .unwrap_err();
        assert!(matches!(err, ManifestError::MissingThreads));
    }

    #[test]
    fn file_io_builds_write_then_read_passes() {
        let record = BenchmarkRecord::from_options(&ManifestOptions {
            src: Some("worker-0".into()),
            threads: Some("2".into()),
            ..options("sys-fio_tmp")
        })
        .unwrap();
        assert_eq!(
            record.command_line,
            "mkdir -p /tmp && cd /tmp \
             && sysbench fileio prepare --file-test-mode=rndwr >/dev/null \
             && sysbench fileio run --file-test-mode=rndwr \
             && sysbench fileio prepare --file-test-mode=rndrd >/dev/null \
             && sysbench fileio run --file-test-mode=rndrd \
             && echo DONE"
        );
        assert_eq!(record.display_name, "sys-fio-tmp-worker-0-2threads");
    }

    #[test]
    fn file_io_storage_kinds_share_mount() {
        for name in ["sys-fio_local", "sys-fio_cephfs", "sys-fio_overlay"] {
            let record = BenchmarkRecord::from_options(&ManifestOptions {
                src: Some("n".into()),
                ..options(name)
            })
            .unwrap();
            assert!(record.command_line.starts_with("mkdir -p /mnt/storage && cd /mnt/storage"));
            assert_eq!(record.display_name, format!("{}-n-threads", name.replace('_', "-")));
        }
    }

    #[test]
    fn unknown_file_io_suffix_is_unsupported() {
        let err = BenchmarkRecord::from_options(&ManifestOptions {
            src: Some("x".into()),
            ..options("sys-fio_unknown")
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported mode: sys-fio_unknown");
    }

    #[test]
    fn unknown_and_missing_names() {
        let err = BenchmarkRecord::from_options(&options("pingpong")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid -name value: 'pingpong'");

        let err = BenchmarkRecord::from_options(&ManifestOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "Please pass a -name value");
    }

    #[test]
    fn collective_parses_process_count() {
        let record = BenchmarkRecord::from_options(&ManifestOptions {
            net: Some("HostNetwork".into()),
            np: Some("8".into()),
            ..options("osu-allreduce")
        })
        .unwrap();
        assert_eq!(record.process_count, 8);
        assert_eq!(record.display_name, "osu-allreduce-hostnetwork-8procs");
        assert!(record
            .command_line
            .ends_with("collective/osu_allreduce"));
    }

    #[test]
    fn collective_rejects_bad_process_counts() {
        let err = BenchmarkRecord::from_options(&ManifestOptions {
            net: Some("SDN".into()),
            ..options("osu-alltoall")
        })
        .unwrap_err();
        assert!(matches!(err, ManifestError::MissingProcessCount));

        let err = BenchmarkRecord::from_options(&ManifestOptions {
            net: Some("SDN".into()),
            np: Some("abc".into()),
            ..options("osu-alltoall")
        })
        .unwrap_err();
        assert!(matches!(err, ManifestError::InvalidProcessCount { ref value, .. } if value == "abc"));

        let err = BenchmarkRecord::from_options(&ManifestOptions {
            net: Some("SDN".into()),
            np: Some("0".into()),
            ..options("osu-alltoall")
        })
        .unwrap_err();
        assert!(matches!(err, ManifestError::ZeroProcessCount(_)));
    }

    #[test]
    fn collective_name_keeps_process_count_as_given() {
        let record = BenchmarkRecord::from_options(&ManifestOptions {
            net: Some("SDN".into()),
            np: Some("08".into()),
            ..options("osu-alltoall")
        })
        .unwrap();
        assert_eq!(record.display_name, "osu-alltoall-sdn-08procs");
        assert_eq!(record.process_count, 8);
    }

    #[test]
    fn network_type_round_trips_through_display() {
        for net in NetworkType::ALL {
            assert_eq!(net.to_string().parse::<NetworkType>().unwrap(), net);
        }
    }
}
