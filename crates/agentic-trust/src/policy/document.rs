//! Policy documents and attached policies.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, TrustError};
use crate::identity::IdentityId;

use super::condition::Condition;

pub const POLICY_VERSION: &str = "2024-06-01";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// One Allow/Deny rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(rename = "Sid", default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(rename = "Effect")]
    pub effect: Effect,
    /// Accepts a single action string or a list on input.
    #[serde(rename = "Action", deserialize_with = "one_or_many")]
    pub actions: Vec<String>,
    #[serde(rename = "Condition", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl Statement {
    pub fn allow<I, A>(actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self::new(Effect::Allow, actions)
    }

    pub fn deny<I, A>(actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self::new(Effect::Deny, actions)
    }

    fn new<I, A>(effect: Effect, actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            sid: None,
            effect,
            actions: actions.into_iter().map(Into::into).collect(),
            condition: None,
        }
    }

    pub fn sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

/// The `{"Version": ..., "Statement": [...]}` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(rename = "Version", default = "default_version")]
    pub version: String,
    #[serde(rename = "Statement")]
    pub statements: Vec<Statement>,
}

fn default_version() -> String {
    POLICY_VERSION.to_string()
}

impl PolicyDocument {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self {
            version: default_version(),
            statements,
        }
    }

    /// The policy attached when issuance supplies none: allow `read:*`.
    pub fn default_read_only() -> Self {
        Self::new(vec![Statement::allow(["read:*"]).sid("default-read")])
    }

    /// A document needs at least one statement and every statement at
    /// least one non-blank action.
    pub fn validate(&self) -> Result<()> {
        if self.statements.is_empty() {
            return Err(TrustError::Validation(
                "policy document has no statements".into(),
            ));
        }
        for (i, s) in self.statements.iter().enumerate() {
            if s.actions.is_empty() || s.actions.iter().any(|a| a.trim().is_empty()) {
                return Err(TrustError::Validation(format!(
                    "policy statement {i} has an empty action"
                )));
            }
        }
        Ok(())
    }
}

/// A policy document attached to one identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// Policy identifier, `pol_` + base58.
    pub code: String,
    pub statement_id: String,
    pub identity: IdentityId,
    #[serde(rename = "policyStatement")]
    pub document: PolicyDocument,
}

impl Policy {
    /// Attach `document` to `identity`. `index` is the position in the
    /// identity's policy list and names the statement id when the first
    /// statement has no `Sid`.
    pub fn attach(identity: &IdentityId, document: PolicyDocument, index: usize) -> Self {
        let code = format!(
            "pol_{}",
            bs58::encode(crate::crypto::random::random_bytes::<12>()).into_string()
        );
        let statement_id = document
            .statements
            .first()
            .and_then(|s| s.sid.clone())
            .unwrap_or_else(|| format!("stmt-{}", index + 1));
        Self {
            code,
            statement_id,
            identity: identity.clone(),
            document,
        }
    }
}

/// Which [`Policy`] field [`lookup_policy_by_code`] compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyField {
    Code,
    StatementId,
    Identity,
}

impl std::str::FromStr for PolicyField {
    type Err = TrustError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "code" => Ok(Self::Code),
            "statementId" | "statement_id" | "sid" => Ok(Self::StatementId),
            "identity" => Ok(Self::Identity),
            other => Err(TrustError::Validation(format!(
                "unknown policy field: {other}"
            ))),
        }
    }
}

/// First policy whose `field` equals `value`.
pub fn lookup_policy_by_code<'a>(
    policies: &'a [Policy],
    field: PolicyField,
    value: &str,
) -> Option<&'a Policy> {
    policies.iter().find(|p| match field {
        PolicyField::Code => p.code == value,
        PolicyField::StatementId => p.statement_id == value,
        PolicyField::Identity => p.identity.as_str() == value,
    })
}
