use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Please pass a -name value")]
    MissingName,
    #[error("Invalid -name value: '{0}'")]
    InvalidName(String),
    #[error("Unsupported mode: {0}")]
    UnsupportedMode(String),
    #[error("Please pass a -net value (SDN, Multus, HostNetwork)")]
    MissingNetwork,
    #[error("Please pass a valid -net value (SDN, Multus, HostNetwork), got '{0}'")]
    InvalidNetwork(String),
    #[error("Please pass -src AND -dst flags")]
    UnpairedPlacement,
    #[error("Please pass a valid -src value")]
    MissingSource,
    #[error("Please pass a valid -threads value")]
    MissingThreads,
    #[error("Please pass -np flag")]
    MissingProcessCount,
    #[error("Failed to parse '-np {value}'")]
    InvalidProcessCount {
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("Invalid '-np {0}': the process count must be greater than zero")]
    ZeroProcessCount(String),
    #[error("Failed to read the template '{}'", path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse the template: {0}")]
    TemplateParse(String),
    #[error("Failed to apply the template: {0}")]
    TemplateRender(String),
}
