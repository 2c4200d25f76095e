//! Exit status codes for the CLI
//!
//! curlsmith follows standard Unix exit code conventions:
//! - 0: Success
//! - 1: Any error (unreadable document, unknown operation, missing parameters)

use std::process::{ExitCode, Termination};

use crate::errors::CurlsmithError;

/// Exit status codes following standard Unix conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    /// Command produced its output
    Success = 0,
    /// Any error
    Error = 1,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status as u8)
    }
}

impl Termination for ExitStatus {
    fn report(self) -> ExitCode {
        ExitCode::from(self as u8)
    }
}

impl From<&CurlsmithError> for ExitStatus {
    fn from(_: &CurlsmithError) -> Self {
        ExitStatus::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitStatus::Success as u8, 0);
        assert_eq!(ExitStatus::Error as u8, 1);
    }

    #[test]
    fn test_error_maps_to_failure() {
        let err = CurlsmithError::UnknownOperation("nope".to_string());
        assert_eq!(ExitStatus::from(&err), ExitStatus::Error);
    }
}
