//! MPI benchmark job manifest generation.
//!
//! Flags select a benchmark kind, the kind table validates them and builds a
//! [`BenchmarkRecord`], and the record is rendered through a manifest
//! template.

pub mod benchmark;
pub mod error;
pub mod options;
pub mod render;

use tracing::debug;

pub use benchmark::{BenchmarkRecord, Family, KindDescriptor, NetworkType, KINDS};
pub use error::ManifestError;
pub use options::ManifestOptions;

/// Validates `options`, then renders the manifest they describe.
///
/// Nothing is written anywhere; the caller decides where the document goes.
pub fn generate(options: &ManifestOptions) -> Result<String, ManifestError> {
    if let Some(node_id) = options.node_id() {
        debug!(node_id, "-node_id is accepted but not used");
    }

    let record = BenchmarkRecord::from_options(options)?;
    debug!(
        bench = %record.benchmark_kind,
        name = %record.display_name,
        nproc = record.process_count,
        command = %record.command_line,
        "resolved benchmark record"
    );

    let template = render::load_template(options.template_path())?;
    render::render_manifest(&template, &record)
}
