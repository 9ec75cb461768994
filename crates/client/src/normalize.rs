//! Funnel every RPC outcome into the closed error taxonomy

use crate::proto::{ErrorCode, Status};
use crate::transport::TransportFailure;
use std::time::Duration;
use thiserror::Error;
use vecadmin_core::{Error, Result};

/// Non-success status the service returned for which no domain kind exists
///
/// Attached as the cause of [`Error::Unknown`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("service returned code {code}: {reason}")]
pub struct ServiceError {
    pub code: i32,
    pub reason: String,
}

/// Map a raised transport failure
pub(crate) fn map_failure(operation: &str, timeout: Duration, failure: TransportFailure) -> Error {
    match failure {
        TransportFailure::DeadlineExceeded => Error::timeout(operation, millis(timeout)),
        TransportFailure::Status(status) if is_deadline(&status) => {
            Error::timeout(operation, millis(timeout))
        }
        TransportFailure::Status(status) => {
            let code = status.code() as i32;
            let message = status.message().to_string();
            Error::transport(code, message, status)
        }
        TransportFailure::Other(cause) => Error::unknown(format!("{operation} failed"), cause),
    }
}

/// Message tonic puts on the `Cancelled` status its channel timeout raises
const TIMEOUT_EXPIRED: &str = "Timeout expired";

fn is_deadline(status: &tonic::Status) -> bool {
    match status.code() {
        tonic::Code::DeadlineExceeded => true,
        tonic::Code::Cancelled => status.message() == TIMEOUT_EXPIRED,
        _ => false,
    }
}

/// Map the status a reply carries; `collection` names the subject of the call
pub(crate) fn check_status(
    operation: &str,
    collection: &str,
    status: Option<&Status>,
) -> Result<()> {
    let Some(status) = status else {
        return Err(Error::unknown(
            format!("{operation} failed"),
            anyhow::anyhow!("reply carried no status"),
        ));
    };

    match ErrorCode::try_from(status.error_code) {
        Ok(ErrorCode::Success) => Ok(()),
        Ok(ErrorCode::CollectionAlreadyExists) => Err(Error::already_exists(collection)),
        Ok(ErrorCode::CollectionNotExists) => Err(Error::not_found(collection)),
        Ok(
            ErrorCode::IllegalArgument
            | ErrorCode::IllegalRange
            | ErrorCode::IllegalDimension
            | ErrorCode::IllegalCollectionName,
        ) => Err(Error::validation(status.reason.clone())),
        _ => Err(Error::unknown(
            format!("{operation} rejected by service"),
            ServiceError {
                code: status.error_code,
                reason: status.reason.clone(),
            },
        )),
    }
}

pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::error::Error as _;
    use vecadmin_core::ErrorKind;

    const TIMEOUT: Duration = Duration::from_millis(250);

    #[test]
    fn test_deadline_maps_to_timeout() {
        let err = map_failure("create_collection", TIMEOUT, TransportFailure::DeadlineExceeded);
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.to_string(), "create_collection timed out after 250ms");
    }

    #[test]
    fn test_deadline_status_maps_to_timeout() {
        let failure = TransportFailure::Status(tonic::Status::deadline_exceeded("too slow"));
        assert_eq!(
            map_failure("list_collections", TIMEOUT, failure).kind(),
            ErrorKind::Timeout
        );
    }

    #[test]
    fn test_channel_timeout_maps_to_timeout() {
        let failure = TransportFailure::Status(tonic::Status::cancelled("Timeout expired"));
        let err = map_failure("create_collection", TIMEOUT, failure);
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_other_cancellation_stays_transport() {
        let failure = TransportFailure::Status(tonic::Status::cancelled("client went away"));
        let err = map_failure("create_collection", TIMEOUT, failure);
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.status_code(), Some(tonic::Code::Cancelled as i32));
    }

    #[test]
    fn test_status_maps_to_transport_with_code() {
        let failure = TransportFailure::Status(tonic::Status::unavailable("connection refused"));
        let err = map_failure("drop_collection", TIMEOUT, failure);

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.status_code(), Some(tonic::Code::Unavailable as i32));
        let cause = err.source().and_then(|s| s.downcast_ref::<tonic::Status>());
        assert_eq!(cause.map(|s| s.message()), Some("connection refused"));
    }

    #[test]
    fn test_other_failure_maps_to_unknown_with_cause() {
        let failure = TransportFailure::Other(anyhow::anyhow!("error"));
        let err = map_failure("create_collection", TIMEOUT, failure);

        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("error"));
    }

    #[test]
    fn test_domain_codes() {
        let exists = Status::with_code(ErrorCode::CollectionAlreadyExists, "exists");
        let missing = Status::with_code(ErrorCode::CollectionNotExists, "missing");
        let illegal = Status::with_code(ErrorCode::IllegalArgument, "segment_row_limit out of range");

        assert!(check_status("op", "c", Some(&Status::success())).is_ok());
        assert_eq!(
            check_status("op", "c", Some(&exists)).unwrap_err().kind(),
            ErrorKind::AlreadyExists
        );
        assert_eq!(
            check_status("op", "c", Some(&missing)).unwrap_err().kind(),
            ErrorKind::NotFound
        );
        let err = check_status("op", "c", Some(&illegal)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("segment_row_limit out of range"));
    }

    #[test]
    fn test_unmapped_code_keeps_service_error() {
        let status = Status::with_code(ErrorCode::MetaFailed, "meta store down");
        let err = check_status("create_collection", "c", Some(&status)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Unknown);
        let cause = err.source().and_then(|s| s.downcast_ref::<ServiceError>());
        assert_eq!(
            cause,
            Some(&ServiceError {
                code: ErrorCode::MetaFailed as i32,
                reason: "meta store down".to_string(),
            })
        );
    }

    #[test]
    fn test_missing_status_is_unknown() {
        let err = check_status("describe_collection", "c", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unknown);
    }

    #[test]
    fn test_unrecognized_code_is_unknown() {
        let status = Status {
            error_code: 999,
            reason: String::new(),
        };
        let err = check_status("op", "c", Some(&status)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unknown);
    }
}
