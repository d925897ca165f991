//! Attribute-based authorization.
//!
//! Requests are evaluated against an immutable snapshot of the
//! organization's policies: filter active, sort by priority (descending,
//! creation time ascending as tie-breaker), match subject ∧ resource ∧
//! action ∧ environment, then apply deny-override. Absent any match, the
//! decision is deny. Every denial produces a record for the append-only
//! denial sink.

pub mod denial;
pub mod engine;
pub mod error;
pub mod matching;
pub mod types;

pub use denial::{DenialRecord, DenialSink, InMemoryDenialSink};
pub use engine::{AuthorizationEngine, Decision, PolicySnapshot};
pub use error::AuthzError;
pub use types::{
    AccessRequest, ActionCondition, Effect, EnvironmentCondition, Policy, RequestEnvironment,
    ResourceAttributes, ResourceCondition, Subject, SubjectCondition, TimeWindow, Weekday,
    CUSTOM_PRIORITY_MAX, SYSTEM_PRIORITY_MAX, SYSTEM_PRIORITY_MIN,
};
