//! Policy engine: statement-based Allow/Deny rules attached to identities.
//!
//! A [`Policy`] wraps a [`PolicyDocument`] (the `Version`/`Statement`
//! shape callers already use). Evaluation is first-match-wins in
//! statement order; no matching statement means deny.

pub mod action;
pub mod condition;
pub mod document;
pub mod evaluate;

pub use action::action_matches;
pub use condition::{Condition, RequestContext};
pub use document::{
    lookup_policy_by_code, Effect, Policy, PolicyDocument, PolicyField, Statement,
};
pub use evaluate::{evaluate, is_action_allowed, PolicyDecision};
