//! Stress test: policy evaluation over large documents and policy sets.

use agentic_trust::policy::evaluate;
use agentic_trust::{
    is_action_allowed, lookup_policy_by_code, Condition, EngineConfig, IdentityId, Policy,
    PolicyDocument, PolicyField, RequestContext, ScopeConfig, Statement, TrustEngine,
};

fn owner() -> IdentityId {
    IdentityId::from("aid_policy_owner")
}

#[test]
fn stress_first_match_in_1000_statements() {
    let mut statements: Vec<Statement> = (0..999)
        .map(|i| Statement::allow([format!("svc{i}:read")]))
        .collect();
    statements.push(Statement::deny(["*"]).sid("catch-all"));
    let policy = Policy::attach(&owner(), PolicyDocument::new(statements), 0);

    for i in (0..999).step_by(37) {
        let decision = evaluate(std::slice::from_ref(&policy), &format!("svc{i}:read"), None);
        assert!(decision.allowed);
        assert_eq!(decision.statement_index, Some(i));
    }
    let decision = evaluate(std::slice::from_ref(&policy), "svc5:write", None);
    assert!(!decision.allowed);
    assert_eq!(decision.statement_index, Some(999));
}

#[test]
fn stress_policy_set_order_decides() {
    let policies: Vec<Policy> = (0..200)
        .map(|i| {
            let stmt = if i % 2 == 0 {
                Statement::deny([format!("tenant{i}:*")])
            } else {
                Statement::allow([format!("tenant{i}:*")])
            };
            Policy::attach(&owner(), PolicyDocument::new(vec![stmt]), i)
        })
        .collect();

    for i in 0..200 {
        let decision = evaluate(&policies, &format!("tenant{i}:write"), None);
        assert_eq!(decision.allowed, i % 2 == 1, "tenant{i}");
        assert_eq!(decision.policy_code.as_deref(), Some(policies[i].code.as_str()));
    }
    assert!(!evaluate(&policies, "tenant200:write", None).allowed);
}

#[test]
fn stress_conditions_over_every_hour() {
    let doc = PolicyDocument::new(vec![
        Statement::deny(["publish:*"]).when(Condition::StringEquals {
            key: "role".into(),
            value: "guest".into(),
        }),
        Statement::allow(["publish:*"]).when(Condition::All(vec![
            Condition::NumericBetween {
                key: "hour".into(),
                min: 9.0,
                max: 17.0,
            },
            Condition::Not(Box::new(Condition::StringIn {
                key: "region".into(),
                values: vec!["embargoed".into()],
            })),
        ])),
    ]);
    let policy = Policy::attach(&owner(), doc, 0);

    for hour in 0..24 {
        let ctx = RequestContext::new().with("hour", hour).with("region", "eu");
        assert_eq!(
            is_action_allowed(&policy, "publish:post", Some(&ctx)),
            (9..=17).contains(&hour),
            "hour {hour}"
        );
        let guest = ctx.clone().with("role", "guest");
        assert!(!is_action_allowed(&policy, "publish:post", Some(&guest)));
    }

    // Missing region: Not(None) stays unknown, so the allow never fires.
    let no_region = RequestContext::new().with("hour", 12);
    assert!(!is_action_allowed(&policy, "publish:post", Some(&no_region)));
}

#[test]
fn stress_wire_documents_through_engine() {
    let engine = TrustEngine::in_memory(EngineConfig::default()).unwrap();
    let raw = r#"{
        "Version": "2024-06-01",
        "Statement": [
            {"Sid": "editors", "Effect": "Allow", "Action": ["write:*", "read:*"],
             "Condition": {"string_in": {"key": "role", "values": ["editor", "admin"]}}},
            {"Effect": "Deny", "Action": "*"}
        ]
    }"#;
    let doc: PolicyDocument = serde_json::from_str(raw).expect("wire document parses");

    let mut scope = ScopeConfig::domain("gptarticles.xyz");
    for _ in 0..25 {
        scope = scope.policy(doc.clone());
    }
    let editor = engine.issue("editor", &scope).unwrap();

    let policies = engine.get_policy(&editor.id).unwrap();
    assert_eq!(policies.len(), 25);
    assert!(policies.iter().all(|p| p.statement_id == "editors"));
    let codes: std::collections::HashSet<_> = policies.iter().map(|p| &p.code).collect();
    assert_eq!(codes.len(), 25, "every attachment gets its own code");

    let found = lookup_policy_by_code(&policies, PolicyField::Code, &policies[13].code).unwrap();
    assert_eq!(found, &policies[13]);

    let admin = RequestContext::new().with("role", "admin");
    let viewer = RequestContext::new().with("role", "viewer");
    assert!(engine.is_action_allowed_for(&editor.id, "write:drafts", Some(&admin)));
    assert!(!engine.is_action_allowed_for(&editor.id, "write:drafts", Some(&viewer)));
    assert!(!engine.is_action_allowed_for(&editor.id, "read:drafts", None));
}
