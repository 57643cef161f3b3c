use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ObjectKey;

/// The single operation a capability grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    Write,
}

impl Operation {
    /// HTTP method the signed URL is valid for.
    pub fn http_method(&self) -> &'static str {
        match self {
            Operation::Read => "GET",
            Operation::Write => "PUT",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Operation::Read => write!(f, "read"),
            Operation::Write => write!(f, "write"),
        }
    }
}

impl FromStr for Operation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Operation::Read),
            "write" => Ok(Operation::Write),
            _ => Err(anyhow::anyhow!("Invalid operation: {}", s)),
        }
    }
}

/// A signed URL granting exactly one operation on exactly one key until `expires_at`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Capability {
    pub url: String,
    pub key: ObjectKey,
    pub operation: Operation,
    pub expires_at: DateTime<Utc>,
}
