use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Asset host backend types
///
/// Defined in core because configuration selects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostBackend {
    S3,
    Local,
}

impl FromStr for HostBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(HostBackend::S3),
            "local" => Ok(HostBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for HostBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            HostBackend::S3 => write!(f, "s3"),
            HostBackend::Local => write!(f, "local"),
        }
    }
}
