//! Command-line options for the manifest generator.
//!
//! Flags use single-dash long spellings (`-name=latency`, `-np 8`). Those are
//! rewritten to their double-dash form before `clap` sees them, so both
//! spellings are accepted.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser};

use crate::render::TEMPLATE_FILE;

#[derive(Debug, Clone, Default, Parser)]
#[command(
    author,
    version,
    about = "MPI benchmark job manifest generator",
    args_override_self = true
)]
pub struct ManifestOptions {
    /// Benchmark kind (latency, bandwidth, sys-cpu, sys-fio_*, osu-allreduce, osu-alltoall)
    #[arg(long = "name", allow_hyphen_values = true)]
    pub name: Option<String>,

    /// Network type (SDN, Multus, HostNetwork)
    #[arg(long = "net", allow_hyphen_values = true)]
    pub net: Option<String>,

    /// Source node for placement
    #[arg(long = "src", allow_hyphen_values = true)]
    pub src: Option<String>,

    /// Destination node for point-to-point placement
    #[arg(long = "dst", allow_hyphen_values = true)]
    pub dst: Option<String>,

    /// Process count for collective benchmarks
    #[arg(long = "np", allow_hyphen_values = true)]
    pub np: Option<String>,

    /// Accepted for compatibility; not used.
    #[arg(long = "node_id", allow_hyphen_values = true)]
    pub node_id: Option<String>,

    /// Thread count passed to sysbench
    #[arg(long = "threads", allow_hyphen_values = true)]
    pub threads: Option<String>,

    /// Template to render
    #[arg(long = "template", value_name = "FILE", allow_hyphen_values = true)]
    pub template: Option<PathBuf>,
}

impl ManifestOptions {
    /// Parses raw process arguments, accepting single-dash long flags.
    pub fn try_parse_flags<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_flag_args(args))
    }

    pub fn name(&self) -> Option<&str> {
        given(self.name.as_deref())
    }

    pub fn net(&self) -> Option<&str> {
        given(self.net.as_deref())
    }

    pub fn src(&self) -> Option<&str> {
        given(self.src.as_deref())
    }

    pub fn dst(&self) -> Option<&str> {
        given(self.dst.as_deref())
    }

    pub fn np(&self) -> Option<&str> {
        given(self.np.as_deref())
    }

    pub fn node_id(&self) -> Option<&str> {
        given(self.node_id.as_deref())
    }

    pub fn threads(&self) -> Option<&str> {
        given(self.threads.as_deref())
    }

    pub fn template_path(&self) -> &Path {
        self.template
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new(TEMPLATE_FILE))
    }
}

// An empty value (`-net=`) is the same as an absent flag.
fn given(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// Rewrites `-flag` and `-flag=value` into `--flag` forms for every long flag
/// the parser knows about.
///
/// Only tokens in flag position are touched: the token after a flag that
/// takes a separate value is that flag's value, even if it starts with a
/// dash. The program name and anything after a bare `--` are left alone.
pub fn normalize_flag_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut command = ManifestOptions::command();
    command.build();
    let known: Vec<(String, bool)> = command
        .get_arguments()
        .filter_map(|arg| {
            arg.get_long()
                .map(|long| (long.to_string(), arg.get_action().takes_values()))
        })
        .collect();

    let mut normalized = Vec::new();
    let mut terminated = false;
    let mut value_next = false;
    for (idx, arg) in args.into_iter().map(Into::into).enumerate() {
        if idx == 0 || terminated || std::mem::take(&mut value_next) {
            normalized.push(arg);
            continue;
        }
        let Some(text) = arg.to_str() else {
            normalized.push(arg);
            continue;
        };
        if text == "--" {
            terminated = true;
            normalized.push(arg);
            continue;
        }

        let double_dash = text.starts_with("--");
        let spelled = text
            .strip_prefix("--")
            .or_else(|| text.strip_prefix('-'))
            .map(|rest| rest.split_once('=').map_or((rest, false), |(flag, _)| (flag, true)));
        let matched = spelled.and_then(|(flag, inline)| {
            known
                .iter()
                .find(|(long, _)| long == flag)
                .map(|(_, takes_value)| (*takes_value, inline))
        });

        match matched {
            Some((takes_value, inline)) => {
                value_next = takes_value && !inline;
                if double_dash {
                    normalized.push(arg);
                } else {
                    normalized.push(OsString::from(format!("-{text}")));
                }
            }
            None => normalized.push(arg),
        }
    }
    normalized
}
