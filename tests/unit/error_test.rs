//! Tests for error types

use prometheus_process_sim::core::ManagerError;
use prometheus_process_sim::util::ResourceId;

#[test]
fn test_unknown_resource_error() {
    let err = ManagerError::UnknownResource("R9".to_string());
    assert_eq!(format!("{}", err), "unknown resource: R9");
}

#[test]
fn test_claim_exceeded_error() {
    let err = ManagerError::ClaimExceeded {
        resource: ResourceId::R1,
        held: 1,
        requested: 1,
        total: 1,
    };
    assert_eq!(
        format!("{}", err),
        "claim exceeded on R1: held 1 + requested 1 > total 1"
    );
}

#[test]
fn test_insufficient_held_error() {
    let err = ManagerError::InsufficientHeld {
        resource: ResourceId::R3,
        held: 0,
        requested: 2,
    };
    assert_eq!(format!("{}", err), "insufficient held on R3: held 0, releasing 2");
}

#[test]
fn test_process_errors() {
    assert_eq!(
        format!("{}", ManagerError::DuplicateProcessId("A".into())),
        "duplicate process id: A"
    );
    assert_eq!(format!("{}", ManagerError::PoolExhausted), "process pool exhausted");
    assert_eq!(format!("{}", ManagerError::ProtectedProcess), "process is protected");
    assert_eq!(format!("{}", ManagerError::InvalidPriority(7)), "invalid priority: 7");
}

#[test]
fn test_errors_convert_to_anyhow() {
    let app: prometheus_process_sim::core::AppResult<()> =
        Err(ManagerError::PermissionDenied("no process `X`".into()).into());
    assert_eq!(app.unwrap_err().to_string(), "permission denied: no process `X`");
}
