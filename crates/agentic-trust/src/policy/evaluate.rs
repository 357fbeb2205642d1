//! Policy evaluation: first match wins.
//!
//! Statements are visited in document order (and, for a policy set, in
//! attachment order). The first statement whose action list covers the
//! request and whose condition holds decides. Nothing matching is a deny.

use super::action::action_matches;
use super::condition::RequestContext;
use super::document::{Effect, Policy};

/// Outcome of evaluating an action against a policy set.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDecision {
    /// Final answer.
    pub allowed: bool,
    /// Effect of the deciding statement, `None` when nothing matched.
    pub effect: Option<Effect>,
    /// Code of the policy holding the deciding statement.
    pub policy_code: Option<String>,
    /// Index of the deciding statement within its document.
    pub statement_index: Option<usize>,
}

impl PolicyDecision {
    /// A deny that no statement decided.
    pub fn denied() -> Self {
        Self {
            allowed: false,
            effect: None,
            policy_code: None,
            statement_index: None,
        }
    }
}

/// Evaluate `action` against `policies` in order.
///
/// A missing context evaluates conditions against an empty one, so
/// conditional statements never match without one.
pub fn evaluate(policies: &[Policy], action: &str, context: Option<&RequestContext>) -> PolicyDecision {
    let empty = RequestContext::new();
    let ctx = context.unwrap_or(&empty);

    for policy in policies {
        for (i, statement) in policy.document.statements.iter().enumerate() {
            if !statement.actions.iter().any(|a| action_matches(a, action)) {
                continue;
            }
            if let Some(cond) = &statement.condition {
                if !cond.holds(ctx) {
                    continue;
                }
            }
            return PolicyDecision {
                allowed: statement.effect == Effect::Allow,
                effect: Some(statement.effect),
                policy_code: Some(policy.code.clone()),
                statement_index: Some(i),
            };
        }
    }

    PolicyDecision::denied()
}

/// Quick check: does this single policy allow `action`?
pub fn is_action_allowed(policy: &Policy, action: &str, context: Option<&RequestContext>) -> bool {
    evaluate(std::slice::from_ref(policy), action, context).allowed
}
