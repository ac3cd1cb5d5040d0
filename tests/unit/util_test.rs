//! Tests for utility types

use prometheus_process_sim::util::{
    now_ms, Priority, ProcessState, ResourceId, RESOURCE_CATALOG,
};

#[test]
fn test_priority_ordering() {
    assert!(Priority::System > Priority::User);
    assert!(Priority::User > Priority::Init);
}

#[test]
fn test_creatable_levels() {
    assert_eq!(Priority::from_creatable_level(1), Some(Priority::User));
    assert_eq!(Priority::from_creatable_level(2), Some(Priority::System));
    assert_eq!(Priority::from_creatable_level(0), None);
    assert_eq!(Priority::from_creatable_level(3), None);
}

#[test]
fn test_resource_catalog() {
    let caps: Vec<u32> = RESOURCE_CATALOG.iter().map(|r| r.capacity()).collect();
    assert_eq!(caps, vec![1, 2, 3, 4]);
    assert_eq!("R3".parse::<ResourceId>(), Ok(ResourceId::R3));
    assert_eq!("r3".parse::<ResourceId>(), Err("r3".to_string()));
    assert_eq!(ResourceId::R4.to_string(), "R4");
}

#[test]
fn test_process_state_liveness() {
    assert!(!ProcessState::Unused.is_live());
    assert!(ProcessState::Blocked.is_live());
    assert_eq!(ProcessState::default(), ProcessState::Unused);
}

#[test]
fn test_clock() {
    assert!(now_ms() > 0);
}
