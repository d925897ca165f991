//! Authorization policy and request types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use uuid::Uuid;

use crate::account::AccountType;
use crate::fiscal::FiscalPeriodStatus;
use crate::journal::EntryType;

use super::error::AuthzError;

/// Highest priority a custom policy may carry.
pub const CUSTOM_PRIORITY_MAX: u16 = 899;
/// Lowest priority reserved for system policies.
pub const SYSTEM_PRIORITY_MIN: u16 = 900;
/// Highest priority overall.
pub const SYSTEM_PRIORITY_MAX: u16 = 1000;

/// The effect of a matched policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    /// Grants the action.
    Allow,
    /// Denies the action; overrides any allow.
    Deny,
}

/// An attribute-based access policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Unique identifier.
    pub id: Uuid,
    /// Organization scope.
    pub organization_id: Uuid,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Who the policy applies to.
    #[serde(default)]
    pub subject: SubjectCondition,
    /// What the policy applies to.
    #[serde(default)]
    pub resource: ResourceCondition,
    /// Which actions the policy covers.
    #[serde(default)]
    pub action: ActionCondition,
    /// Environmental constraints, if any.
    pub environment: Option<EnvironmentCondition>,
    /// Allow or deny.
    pub effect: Effect,
    /// Priority 0..=1000; system policies occupy 900..=1000.
    pub priority: u16,
    /// System policies are immutable and cannot be deleted.
    pub is_system: bool,
    /// Inactive policies never match.
    pub is_active: bool,
    /// Creation time; ascending tie-breaker within a priority.
    pub created_at: DateTime<Utc>,
}

/// Subject condition: empty lists match any subject.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectCondition {
    /// Specific users (OR semantics).
    #[serde(default)]
    pub user_ids: Vec<Uuid>,
    /// Role names (OR semantics).
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Action condition: empty list matches any action. Actions are
/// `resource:verb` strings; `resource:*` matches every verb.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionCondition {
    /// Action patterns (OR semantics).
    #[serde(default)]
    pub actions: Vec<String>,
}

/// Inclusive account number range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountNumberRange {
    /// Lower bound (inclusive).
    pub from: String,
    /// Upper bound (inclusive).
    pub to: String,
}

/// Resource condition: every present constraint must hold, lists are OR.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceCondition {
    /// Resource type names (e.g. "journal_entry", "account").
    #[serde(default)]
    pub resource_types: Vec<String>,
    /// Specific account numbers.
    #[serde(default)]
    pub account_numbers: Vec<String>,
    /// Account number ranges.
    #[serde(default)]
    pub account_number_ranges: Vec<AccountNumberRange>,
    /// Account types.
    #[serde(default)]
    pub account_types: Vec<AccountType>,
    /// Matches the account's intercompany flag.
    pub is_intercompany: Option<bool>,
    /// Journal entry types.
    #[serde(default)]
    pub journal_entry_types: Vec<EntryType>,
    /// Matches when the resource was created by the requesting user.
    pub is_own_entry: Option<bool>,
    /// Fiscal period statuses.
    #[serde(default)]
    pub fiscal_period_statuses: Vec<FiscalPeriodStatus>,
}

/// Day of the week for environment masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    /// Monday.
    Mon,
    /// Tuesday.
    Tue,
    /// Wednesday.
    Wed,
    /// Thursday.
    Thu,
    /// Friday.
    Fri,
    /// Saturday.
    Sat,
    /// Sunday.
    Sun,
}

impl From<chrono::Weekday> for Weekday {
    fn from(value: chrono::Weekday) -> Self {
        match value {
            chrono::Weekday::Mon => Self::Mon,
            chrono::Weekday::Tue => Self::Tue,
            chrono::Weekday::Wed => Self::Wed,
            chrono::Weekday::Thu => Self::Thu,
            chrono::Weekday::Fri => Self::Fri,
            chrono::Weekday::Sat => Self::Sat,
            chrono::Weekday::Sun => Self::Sun,
        }
    }
}

/// A daily time window, evaluated in the request's timezone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Window start, "HH:MM".
    pub start: String,
    /// Window end, "HH:MM" (inclusive). Windows may wrap past midnight.
    pub end: String,
}

/// Environment condition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentCondition {
    /// Time-of-day window.
    pub time_window: Option<TimeWindow>,
    /// Allowed days of week; empty matches every day.
    #[serde(default)]
    pub days_of_week: Vec<Weekday>,
    /// CIDR allow list; non-empty requires the request IP to match one.
    #[serde(default)]
    pub ip_allow: Vec<String>,
    /// CIDR deny list; a matching request IP fails the condition.
    #[serde(default)]
    pub ip_deny: Vec<String>,
}

/// The requesting subject.
#[derive(Debug, Clone)]
pub struct Subject {
    /// The requesting user.
    pub user_id: Uuid,
    /// The user's roles in the organization.
    pub roles: Vec<String>,
}

/// Attributes of the resource being accessed.
#[derive(Debug, Clone, Default)]
pub struct ResourceAttributes {
    /// Resource type name.
    pub resource_type: String,
    /// Resource id, if it exists yet.
    pub resource_id: Option<Uuid>,
    /// Account number, for account-scoped checks.
    pub account_number: Option<String>,
    /// Account type.
    pub account_type: Option<AccountType>,
    /// Intercompany flag.
    pub is_intercompany: Option<bool>,
    /// Journal entry type.
    pub journal_entry_type: Option<EntryType>,
    /// Who created the resource.
    pub created_by: Option<Uuid>,
    /// Status of the fiscal period the resource sits in.
    pub fiscal_period_status: Option<FiscalPeriodStatus>,
}

/// Environment of the request.
#[derive(Debug, Clone)]
pub struct RequestEnvironment {
    /// Caller IP address.
    pub ip_address: Option<IpAddr>,
    /// Caller user agent.
    pub user_agent: Option<String>,
    /// Request time (UTC).
    pub timestamp: DateTime<Utc>,
    /// IANA timezone the time window evaluates in; UTC when absent.
    pub timezone: Option<String>,
}

impl RequestEnvironment {
    /// A bare environment stamped now, without network attributes.
    #[must_use]
    pub fn now() -> Self {
        Self {
            ip_address: None,
            user_agent: None,
            timestamp: Utc::now(),
            timezone: None,
        }
    }
}

/// A full access request.
#[derive(Debug, Clone)]
pub struct AccessRequest {
    /// Who is asking.
    pub subject: Subject,
    /// The `resource:verb` action.
    pub action: String,
    /// What is being accessed.
    pub resource: ResourceAttributes,
    /// Request environment.
    pub environment: RequestEnvironment,
}

/// Validates a policy's priority against its system flag.
///
/// # Errors
///
/// Returns `PriorityOutOfRange` when custom policies exceed 899 or system
/// policies fall outside 900..=1000.
pub fn validate_priority(is_system: bool, priority: u16) -> Result<(), AuthzError> {
    let valid = if is_system {
        (SYSTEM_PRIORITY_MIN..=SYSTEM_PRIORITY_MAX).contains(&priority)
    } else {
        priority <= CUSTOM_PRIORITY_MAX
    };
    if valid {
        Ok(())
    } else {
        Err(AuthzError::PriorityOutOfRange {
            priority,
            is_system,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_priority_capped_at_899() {
        assert!(validate_priority(false, 0).is_ok());
        assert!(validate_priority(false, 899).is_ok());
        assert!(validate_priority(false, 900).is_err());
    }

    #[test]
    fn test_system_priority_band() {
        assert!(validate_priority(true, 900).is_ok());
        assert!(validate_priority(true, 1000).is_ok());
        assert!(validate_priority(true, 899).is_err());
    }
}
