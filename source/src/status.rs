use crate::source::{SourceError, SourceResult};
use crate::types::Status;

/// Converts an Xray status name into a canonical status.
///
/// Cloud reports run statuses such as `PASSED` or `TO DO`, Server/DC reports `PASS` or `TODO`.
/// Anything else is an error.
pub fn convert_status(xray_status: &str) -> SourceResult<Status> {
    match xray_status {
        "PASSED" | "PASS" => Ok(Status::Pass),
        "FAILED" | "FAIL" => Ok(Status::Fail),
        "TO DO" | "TODO" => Ok(Status::Pending),
        "SKIPPED" => Ok(Status::Skipped),
        other => Err(SourceError::UnknownStatus {
            status: other.to_string(),
        }),
    }
}
