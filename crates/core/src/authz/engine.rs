//! Policy evaluation with deny-override.

use uuid::Uuid;

use super::matching::policy_matches;
use super::types::{AccessRequest, Effect, Policy};

/// An immutable, pre-sorted view of an organization's active policies.
///
/// Snapshots are captured at request start and swapped atomically on
/// policy writes; evaluation never observes a half-updated policy set.
#[derive(Debug, Clone)]
pub struct PolicySnapshot {
    organization_id: Uuid,
    policies: Vec<Policy>,
}

impl PolicySnapshot {
    /// Builds a snapshot: keeps active policies of the organization,
    /// sorted by priority descending with `created_at` ascending as the
    /// stable tie-breaker.
    #[must_use]
    pub fn new(organization_id: Uuid, mut policies: Vec<Policy>) -> Self {
        policies.retain(|p| p.organization_id == organization_id && p.is_active);
        policies.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.created_at.cmp(&b.created_at))
        });
        Self {
            organization_id,
            policies,
        }
    }

    /// The organization this snapshot belongs to.
    #[must_use]
    pub fn organization_id(&self) -> Uuid {
        self.organization_id
    }

    /// The policies in evaluation order.
    #[must_use]
    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }
}

/// The outcome of an evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Allow or deny.
    pub effect: Effect,
    /// Every policy that matched, in evaluation order.
    pub matched_policy_ids: Vec<Uuid>,
    /// The policy that determined the outcome: the highest-priority deny,
    /// else the highest-priority allow. None for the default deny.
    pub deciding_policy_id: Option<Uuid>,
}

impl Decision {
    /// Returns true when the request is allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        self.effect == Effect::Allow
    }
}

/// Stateless evaluation engine.
pub struct AuthorizationEngine;

impl AuthorizationEngine {
    /// Evaluates a request against a snapshot.
    ///
    /// Deny-override: any matched deny wins over every allow, regardless
    /// of priority order between them. Absent any match the decision is
    /// deny with no deciding policy.
    #[must_use]
    pub fn evaluate(snapshot: &PolicySnapshot, request: &AccessRequest) -> Decision {
        let mut matched_ids = Vec::new();
        let mut first_deny: Option<Uuid> = None;
        let mut first_allow: Option<Uuid> = None;

        for policy in snapshot.policies() {
            if !policy_matches(policy, request) {
                continue;
            }
            matched_ids.push(policy.id);
            match policy.effect {
                Effect::Deny => {
                    if first_deny.is_none() {
                        first_deny = Some(policy.id);
                    }
                }
                Effect::Allow => {
                    if first_allow.is_none() {
                        first_allow = Some(policy.id);
                    }
                }
            }
        }

        if let Some(deny) = first_deny {
            Decision {
                effect: Effect::Deny,
                matched_policy_ids: matched_ids,
                deciding_policy_id: Some(deny),
            }
        } else if let Some(allow) = first_allow {
            Decision {
                effect: Effect::Allow,
                matched_policy_ids: matched_ids,
                deciding_policy_id: Some(allow),
            }
        } else {
            Decision {
                effect: Effect::Deny,
                matched_policy_ids: matched_ids,
                deciding_policy_id: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::types::{
        ActionCondition, RequestEnvironment, ResourceAttributes, ResourceCondition, Subject,
        SubjectCondition,
    };
    use chrono::{Duration, TimeZone, Utc};

    fn make_policy(
        organization_id: Uuid,
        effect: Effect,
        priority: u16,
        action: &str,
    ) -> Policy {
        Policy {
            id: Uuid::new_v4(),
            organization_id,
            name: format!("{action} {effect:?}"),
            description: None,
            subject: SubjectCondition::default(),
            resource: ResourceCondition::default(),
            action: ActionCondition {
                actions: vec![action.to_string()],
            },
            environment: None,
            effect,
            priority,
            is_system: false,
            is_active: true,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn make_request(user_id: Uuid, roles: &[&str], action: &str) -> AccessRequest {
        AccessRequest {
            subject: Subject {
                user_id,
                roles: roles.iter().map(ToString::to_string).collect(),
            },
            action: action.to_string(),
            resource: ResourceAttributes {
                resource_type: "journal_entry".to_string(),
                ..ResourceAttributes::default()
            },
            environment: RequestEnvironment::now(),
        }
    }

    #[test]
    fn test_default_deny_without_matches() {
        let org = Uuid::new_v4();
        let snapshot = PolicySnapshot::new(org, vec![]);
        let decision = AuthorizationEngine::evaluate(
            &snapshot,
            &make_request(Uuid::new_v4(), &[], "journal_entry:post"),
        );
        assert_eq!(decision.effect, Effect::Deny);
        assert!(decision.matched_policy_ids.is_empty());
        assert!(decision.deciding_policy_id.is_none());
    }

    #[test]
    fn test_allow_when_only_allow_matches() {
        let org = Uuid::new_v4();
        let allow = make_policy(org, Effect::Allow, 500, "journal_entry:post");
        let snapshot = PolicySnapshot::new(org, vec![allow.clone()]);
        let decision = AuthorizationEngine::evaluate(
            &snapshot,
            &make_request(Uuid::new_v4(), &["accountant"], "journal_entry:post"),
        );
        assert!(decision.is_allowed());
        assert_eq!(decision.deciding_policy_id, Some(allow.id));
    }

    #[test]
    fn test_deny_override_beats_allow() {
        // Scenario: allow journal_entry:post for accountants (priority 500);
        // deny posting your own entry for everyone (priority 800).
        let org = Uuid::new_v4();
        let alice = Uuid::new_v4();

        let mut allow = make_policy(org, Effect::Allow, 500, "journal_entry:post");
        allow.subject = SubjectCondition {
            user_ids: vec![],
            roles: vec!["accountant".to_string()],
        };

        let mut deny = make_policy(org, Effect::Deny, 800, "journal_entry:post");
        deny.resource = ResourceCondition {
            is_own_entry: Some(true),
            ..ResourceCondition::default()
        };

        let snapshot = PolicySnapshot::new(org, vec![allow.clone(), deny.clone()]);

        let mut request = make_request(alice, &["accountant"], "journal_entry:post");
        request.resource.created_by = Some(alice);

        let decision = AuthorizationEngine::evaluate(&snapshot, &request);
        assert_eq!(decision.effect, Effect::Deny);
        assert_eq!(decision.deciding_policy_id, Some(deny.id));
        assert!(decision.matched_policy_ids.contains(&allow.id));
        assert!(decision.matched_policy_ids.contains(&deny.id));

        // Posting someone else's entry stays allowed.
        let mut request = make_request(alice, &["accountant"], "journal_entry:post");
        request.resource.created_by = Some(Uuid::new_v4());
        let decision = AuthorizationEngine::evaluate(&snapshot, &request);
        assert!(decision.is_allowed());
    }

    #[test]
    fn test_low_priority_deny_still_overrides() {
        let org = Uuid::new_v4();
        let allow = make_policy(org, Effect::Allow, 800, "report:read");
        let deny = make_policy(org, Effect::Deny, 10, "report:read");
        let snapshot = PolicySnapshot::new(org, vec![allow, deny.clone()]);

        let decision = AuthorizationEngine::evaluate(
            &snapshot,
            &make_request(Uuid::new_v4(), &[], "report:read"),
        );
        assert_eq!(decision.effect, Effect::Deny);
        assert_eq!(decision.deciding_policy_id, Some(deny.id));
    }

    #[test]
    fn test_snapshot_filters_inactive_and_foreign_policies() {
        let org = Uuid::new_v4();
        let mut inactive = make_policy(org, Effect::Allow, 500, "report:read");
        inactive.is_active = false;
        let foreign = make_policy(Uuid::new_v4(), Effect::Allow, 500, "report:read");

        let snapshot = PolicySnapshot::new(org, vec![inactive, foreign]);
        assert!(snapshot.policies().is_empty());
    }

    #[test]
    fn test_snapshot_sort_order() {
        let org = Uuid::new_v4();
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        let mut older = make_policy(org, Effect::Allow, 500, "report:read");
        older.created_at = base;
        let mut newer = make_policy(org, Effect::Allow, 500, "report:read");
        newer.created_at = base + Duration::hours(1);
        let high = make_policy(org, Effect::Allow, 900, "report:read");

        let snapshot =
            PolicySnapshot::new(org, vec![newer.clone(), older.clone(), high.clone()]);
        let order: Vec<Uuid> = snapshot.policies().iter().map(|p| p.id).collect();
        assert_eq!(order, vec![high.id, older.id, newer.id]);
    }

    #[test]
    fn test_highest_priority_allow_is_deciding() {
        let org = Uuid::new_v4();
        let low = make_policy(org, Effect::Allow, 100, "report:read");
        let high = make_policy(org, Effect::Allow, 700, "report:read");
        let snapshot = PolicySnapshot::new(org, vec![low, high.clone()]);

        let decision = AuthorizationEngine::evaluate(
            &snapshot,
            &make_request(Uuid::new_v4(), &[], "report:read"),
        );
        assert!(decision.is_allowed());
        assert_eq!(decision.deciding_policy_id, Some(high.id));
    }
}
