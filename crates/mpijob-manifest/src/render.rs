//! Manifest template loading and rendering.
//!
//! Templates use Go `text/template` syntax (`{{ .Name }}`,
//! `{{ ToLower .NetworkType }}`), so existing manifest templates render
//! unchanged.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use gtmpl::{Context, FuncError, Template, Value};
use tracing::debug;

use crate::benchmark::BenchmarkRecord;
use crate::error::ManifestError;

/// Template looked up in the working directory when no override is given.
pub const TEMPLATE_FILE: &str = "mpijob_template.yaml";

pub fn load_template(path: &Path) -> Result<String, ManifestError> {
    debug!(path = %path.display(), "reading manifest template");
    fs::read_to_string(path).map_err(|source| ManifestError::TemplateRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Renders `source` against `record`.
///
/// The record is exposed as an object, so a field the record does not provide
/// fails rendering instead of printing an empty value.
pub fn render_manifest(source: &str, record: &BenchmarkRecord) -> Result<String, ManifestError> {
    let mut template = Template::default();
    template.add_func("ToLower", to_lower);
    template
        .parse(source)
        .map_err(|err| ManifestError::TemplateParse(err.to_string()))?;

    template
        .render(&Context::from(template_value(record)))
        .map_err(|err| ManifestError::TemplateRender(err.to_string()))
}

fn template_value(record: &BenchmarkRecord) -> Value {
    let optional = |value: Option<&str>| Value::from(value.unwrap_or_default().to_string());

    let mut fields = HashMap::new();
    fields.insert("Bench".to_string(), Value::from(record.benchmark_kind.clone()));
    fields.insert("Name".to_string(), Value::from(record.display_name.clone()));
    fields.insert("Image".to_string(), Value::from(record.container_image.clone()));
    fields.insert("Nproc".to_string(), Value::from(record.process_count));
    fields.insert(
        "NetworkType".to_string(),
        optional(record.network_type.map(|net| net.as_str())),
    );
    fields.insert("Command".to_string(), Value::from(record.command_line.clone()));
    fields.insert("SrcNode".to_string(), optional(record.source_node.as_deref()));
    fields.insert(
        "DstNode".to_string(),
        optional(record.destination_node.as_deref()),
    );
    Value::Object(fields)
}

fn to_lower(args: &[Value]) -> Result<Value, FuncError> {
    match args {
        [Value::String(value)] => Ok(Value::from(value.to_lowercase())),
        [_] => Err(FuncError::UnableToConvertFromValue),
        _ => Err(FuncError::ExactlyXArgs("ToLower".to_string(), 1)),
    }
}
