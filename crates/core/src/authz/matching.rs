//! Policy predicate matching.
//!
//! A policy matches when its subject, resource, action, and environment
//! conditions all hold. Within a condition, lists carry OR semantics and a
//! missing (empty) sub-predicate matches anything.

use std::net::IpAddr;

use chrono::{Datelike, NaiveTime, Timelike};
use chrono_tz::Tz;

use super::types::{
    AccessRequest, ActionCondition, EnvironmentCondition, Policy, RequestEnvironment,
    ResourceAttributes, ResourceCondition, Subject, SubjectCondition, Weekday,
};

/// Returns true when the policy's conditions all match the request.
#[must_use]
pub fn policy_matches(policy: &Policy, request: &AccessRequest) -> bool {
    subject_matches(&policy.subject, &request.subject)
        && action_matches(&policy.action, &request.action)
        && resource_matches(&policy.resource, &request.resource, &request.subject)
        && policy
            .environment
            .as_ref()
            .is_none_or(|env| environment_matches(env, &request.environment))
}

fn subject_matches(condition: &SubjectCondition, subject: &Subject) -> bool {
    if !condition.user_ids.is_empty() && !condition.user_ids.contains(&subject.user_id) {
        return false;
    }
    if !condition.roles.is_empty()
        && !subject.roles.iter().any(|r| condition.roles.contains(r))
    {
        return false;
    }
    true
}

fn action_matches(condition: &ActionCondition, action: &str) -> bool {
    if condition.actions.is_empty() {
        return true;
    }
    condition.actions.iter().any(|pattern| {
        if pattern == action || pattern == "*" {
            return true;
        }
        // "journal_entry:*" covers every verb on the resource.
        pattern
            .strip_suffix(":*")
            .is_some_and(|prefix| action.split(':').next() == Some(prefix))
    })
}

fn resource_matches(
    condition: &ResourceCondition,
    resource: &ResourceAttributes,
    subject: &Subject,
) -> bool {
    if !condition.resource_types.is_empty()
        && !condition.resource_types.contains(&resource.resource_type)
    {
        return false;
    }

    let number_constrained =
        !condition.account_numbers.is_empty() || !condition.account_number_ranges.is_empty();
    if number_constrained {
        let Some(number) = &resource.account_number else {
            return false;
        };
        let in_set = condition.account_numbers.iter().any(|n| n == number);
        let in_range = condition
            .account_number_ranges
            .iter()
            .any(|r| number.as_str() >= r.from.as_str() && number.as_str() <= r.to.as_str());
        if !in_set && !in_range {
            return false;
        }
    }

    if !condition.account_types.is_empty() {
        let Some(account_type) = resource.account_type else {
            return false;
        };
        if !condition.account_types.contains(&account_type) {
            return false;
        }
    }

    if let Some(required) = condition.is_intercompany {
        if resource.is_intercompany != Some(required) {
            return false;
        }
    }

    if !condition.journal_entry_types.is_empty() {
        let Some(entry_type) = resource.journal_entry_type else {
            return false;
        };
        if !condition.journal_entry_types.contains(&entry_type) {
            return false;
        }
    }

    if let Some(required) = condition.is_own_entry {
        let is_own = resource.created_by == Some(subject.user_id);
        if is_own != required {
            return false;
        }
    }

    if !condition.fiscal_period_statuses.is_empty() {
        let Some(status) = resource.fiscal_period_status else {
            return false;
        };
        if !condition.fiscal_period_statuses.contains(&status) {
            return false;
        }
    }

    true
}

fn environment_matches(condition: &EnvironmentCondition, env: &RequestEnvironment) -> bool {
    let tz: Tz = env
        .timezone
        .as_deref()
        .and_then(|name| name.parse().ok())
        .unwrap_or(chrono_tz::UTC);
    let local = env.timestamp.with_timezone(&tz);

    if let Some(window) = &condition.time_window {
        let (Some(start), Some(end)) = (parse_hhmm(&window.start), parse_hhmm(&window.end))
        else {
            return false;
        };
        let time = local.time();
        let inside = if start <= end {
            time >= start && time <= end
        } else {
            // Window wraps past midnight (e.g. 22:00-06:00).
            time >= start || time <= end
        };
        if !inside {
            return false;
        }
    }

    if !condition.days_of_week.is_empty() {
        let today: Weekday = local.weekday().into();
        if !condition.days_of_week.contains(&today) {
            return false;
        }
    }

    if !condition.ip_deny.is_empty() {
        if let Some(ip) = env.ip_address {
            if condition.ip_deny.iter().any(|cidr| ip_in_cidr(ip, cidr)) {
                return false;
            }
        }
    }

    if !condition.ip_allow.is_empty() {
        let Some(ip) = env.ip_address else {
            return false;
        };
        if !condition.ip_allow.iter().any(|cidr| ip_in_cidr(ip, cidr)) {
            return false;
        }
    }

    true
}

fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    let time = NaiveTime::parse_from_str(value, "%H:%M").ok()?;
    // Normalize away seconds so comparisons stay minute-granular.
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0)
}

/// Returns true when `ip` falls inside `cidr` ("a.b.c.d/n", bare address,
/// or the IPv6 equivalents). Malformed patterns never match.
#[must_use]
pub fn ip_in_cidr(ip: IpAddr, cidr: &str) -> bool {
    let (addr_part, prefix_part) = match cidr.split_once('/') {
        Some((addr, prefix)) => (addr, Some(prefix)),
        None => (cidr, None),
    };
    let Ok(network) = addr_part.parse::<IpAddr>() else {
        return false;
    };
    let prefix = match prefix_part {
        Some(p) => match p.parse::<u32>() {
            Ok(bits) => Some(bits),
            Err(_) => return false,
        },
        None => None,
    };

    match (ip, network) {
        (IpAddr::V4(ip), IpAddr::V4(net)) => {
            let bits = prefix.unwrap_or(32);
            if bits > 32 {
                return false;
            }
            let mask = if bits == 0 { 0 } else { u32::MAX << (32 - bits) };
            (u32::from(ip) & mask) == (u32::from(net) & mask)
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) => {
            let bits = prefix.unwrap_or(128);
            if bits > 128 {
                return false;
            }
            let mask = if bits == 0 {
                0
            } else {
                u128::MAX << (128 - bits)
            };
            (u128::from(ip) & mask) == (u128::from(net) & mask)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn subject() -> Subject {
        Subject {
            user_id: Uuid::new_v4(),
            roles: vec!["accountant".to_string()],
        }
    }

    #[test]
    fn test_empty_subject_condition_matches_anyone() {
        assert!(subject_matches(&SubjectCondition::default(), &subject()));
    }

    #[test]
    fn test_subject_role_or_semantics() {
        let condition = SubjectCondition {
            user_ids: vec![],
            roles: vec!["admin".to_string(), "accountant".to_string()],
        };
        assert!(subject_matches(&condition, &subject()));

        let condition = SubjectCondition {
            user_ids: vec![],
            roles: vec!["admin".to_string()],
        };
        assert!(!subject_matches(&condition, &subject()));
    }

    #[test]
    fn test_subject_user_id_filter() {
        let s = subject();
        let condition = SubjectCondition {
            user_ids: vec![s.user_id],
            roles: vec![],
        };
        assert!(subject_matches(&condition, &s));

        let condition = SubjectCondition {
            user_ids: vec![Uuid::new_v4()],
            roles: vec![],
        };
        assert!(!subject_matches(&condition, &s));
    }

    #[test]
    fn test_action_exact_and_wildcard() {
        let condition = ActionCondition {
            actions: vec!["journal_entry:post".to_string()],
        };
        assert!(action_matches(&condition, "journal_entry:post"));
        assert!(!action_matches(&condition, "journal_entry:approve"));

        let condition = ActionCondition {
            actions: vec!["journal_entry:*".to_string()],
        };
        assert!(action_matches(&condition, "journal_entry:post"));
        assert!(action_matches(&condition, "journal_entry:approve"));
        assert!(!action_matches(&condition, "account:create"));

        assert!(action_matches(&ActionCondition::default(), "anything:at_all"));
    }

    #[test]
    fn test_resource_account_number_range() {
        let condition = ResourceCondition {
            account_number_ranges: vec![super::super::types::AccountNumberRange {
                from: "4000".to_string(),
                to: "4999".to_string(),
            }],
            ..ResourceCondition::default()
        };
        let mut resource = ResourceAttributes {
            resource_type: "account".to_string(),
            account_number: Some("4500".to_string()),
            ..ResourceAttributes::default()
        };
        assert!(resource_matches(&condition, &resource, &subject()));

        resource.account_number = Some("5000".to_string());
        assert!(!resource_matches(&condition, &resource, &subject()));

        resource.account_number = None;
        assert!(!resource_matches(&condition, &resource, &subject()));
    }

    #[test]
    fn test_resource_is_own_entry() {
        let s = subject();
        let condition = ResourceCondition {
            is_own_entry: Some(true),
            ..ResourceCondition::default()
        };

        let own = ResourceAttributes {
            resource_type: "journal_entry".to_string(),
            created_by: Some(s.user_id),
            ..ResourceAttributes::default()
        };
        assert!(resource_matches(&condition, &own, &s));

        let foreign = ResourceAttributes {
            resource_type: "journal_entry".to_string(),
            created_by: Some(Uuid::new_v4()),
            ..ResourceAttributes::default()
        };
        assert!(!resource_matches(&condition, &foreign, &s));
    }

    #[test]
    fn test_environment_time_window() {
        let condition = EnvironmentCondition {
            time_window: Some(super::super::types::TimeWindow {
                start: "09:00".to_string(),
                end: "17:00".to_string(),
            }),
            ..EnvironmentCondition::default()
        };

        let noon = RequestEnvironment {
            ip_address: None,
            user_agent: None,
            timestamp: Utc.with_ymd_and_hms(2025, 6, 16, 12, 0, 0).unwrap(),
            timezone: None,
        };
        assert!(environment_matches(&condition, &noon));

        let midnight = RequestEnvironment {
            timestamp: Utc.with_ymd_and_hms(2025, 6, 16, 0, 30, 0).unwrap(),
            ..noon.clone()
        };
        assert!(!environment_matches(&condition, &midnight));
    }

    #[test]
    fn test_environment_time_window_respects_timezone() {
        let condition = EnvironmentCondition {
            time_window: Some(super::super::types::TimeWindow {
                start: "09:00".to_string(),
                end: "17:00".to_string(),
            }),
            ..EnvironmentCondition::default()
        };

        // 15:00 UTC is 10:00 in New York (June, UTC-5 with DST -4): inside.
        let env = RequestEnvironment {
            ip_address: None,
            user_agent: None,
            timestamp: Utc.with_ymd_and_hms(2025, 6, 16, 15, 0, 0).unwrap(),
            timezone: Some("America/New_York".to_string()),
        };
        assert!(environment_matches(&condition, &env));

        // 05:00 UTC is 01:00 in New York: outside.
        let env = RequestEnvironment {
            timestamp: Utc.with_ymd_and_hms(2025, 6, 16, 5, 0, 0).unwrap(),
            ..env
        };
        assert!(!environment_matches(&condition, &env));
    }

    #[test]
    fn test_environment_wrapping_window() {
        let condition = EnvironmentCondition {
            time_window: Some(super::super::types::TimeWindow {
                start: "22:00".to_string(),
                end: "06:00".to_string(),
            }),
            ..EnvironmentCondition::default()
        };
        let late = RequestEnvironment {
            ip_address: None,
            user_agent: None,
            timestamp: Utc.with_ymd_and_hms(2025, 6, 16, 23, 0, 0).unwrap(),
            timezone: None,
        };
        assert!(environment_matches(&condition, &late));

        let noon = RequestEnvironment {
            timestamp: Utc.with_ymd_and_hms(2025, 6, 16, 12, 0, 0).unwrap(),
            ..late
        };
        assert!(!environment_matches(&condition, &noon));
    }

    #[test]
    fn test_environment_day_mask() {
        let condition = EnvironmentCondition {
            days_of_week: vec![Weekday::Mon, Weekday::Tue],
            ..EnvironmentCondition::default()
        };
        // 2025-06-16 is a Monday.
        let monday = RequestEnvironment {
            ip_address: None,
            user_agent: None,
            timestamp: Utc.with_ymd_and_hms(2025, 6, 16, 12, 0, 0).unwrap(),
            timezone: None,
        };
        assert!(environment_matches(&condition, &monday));

        let saturday = RequestEnvironment {
            timestamp: Utc.with_ymd_and_hms(2025, 6, 21, 12, 0, 0).unwrap(),
            ..monday
        };
        assert!(!environment_matches(&condition, &saturday));
    }

    #[test]
    fn test_cidr_matching() {
        let ip: IpAddr = "10.1.2.3".parse().unwrap();
        assert!(ip_in_cidr(ip, "10.0.0.0/8"));
        assert!(ip_in_cidr(ip, "10.1.2.0/24"));
        assert!(ip_in_cidr(ip, "10.1.2.3"));
        assert!(ip_in_cidr(ip, "0.0.0.0/0"));
        assert!(!ip_in_cidr(ip, "10.1.3.0/24"));
        assert!(!ip_in_cidr(ip, "192.168.0.0/16"));
        assert!(!ip_in_cidr(ip, "not-a-cidr"));
        assert!(!ip_in_cidr(ip, "10.0.0.0/40"));

        let ip6: IpAddr = "2001:db8::1".parse().unwrap();
        assert!(ip_in_cidr(ip6, "2001:db8::/32"));
        assert!(!ip_in_cidr(ip6, "2001:db9::/32"));
        // Family mismatch never matches.
        assert!(!ip_in_cidr(ip6, "10.0.0.0/8"));
    }

    #[test]
    fn test_environment_ip_allow_and_deny() {
        let allow_only = EnvironmentCondition {
            ip_allow: vec!["10.0.0.0/8".to_string()],
            ..EnvironmentCondition::default()
        };
        let inside = RequestEnvironment {
            ip_address: Some("10.1.2.3".parse().unwrap()),
            user_agent: None,
            timestamp: Utc::now(),
            timezone: None,
        };
        assert!(environment_matches(&allow_only, &inside));

        let outside = RequestEnvironment {
            ip_address: Some("192.168.1.1".parse().unwrap()),
            ..inside.clone()
        };
        assert!(!environment_matches(&allow_only, &outside));

        // Missing IP cannot satisfy an allow list.
        let unknown = RequestEnvironment {
            ip_address: None,
            ..inside.clone()
        };
        assert!(!environment_matches(&allow_only, &unknown));

        let deny_list = EnvironmentCondition {
            ip_deny: vec!["10.0.0.0/8".to_string()],
            ..EnvironmentCondition::default()
        };
        assert!(!environment_matches(&deny_list, &inside));
        assert!(environment_matches(&deny_list, &outside));
        assert!(environment_matches(&deny_list, &unknown));
    }
}
