//! Query layer over the caselake database
//!
//! One module per layer. All functions take the shared pool; Gold replacement
//! is the only multi-statement transaction (one atomic fan-out per case).

pub mod bronze;
pub mod cases;
pub mod gold;
pub mod silver;

use caselake_common::{Error, Result};
use uuid::Uuid;

/// Parse a TEXT uuid column
pub(crate) fn parse_uuid(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| Error::Internal(format!("malformed uuid {raw:?}: {e}")))
}
