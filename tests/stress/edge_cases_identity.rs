//! Edge cases: identity names, scopes, malformed tokens, bad references.

use agentic_trust::{
    Caller, EngineConfig, IdentityId, RevocationReason, ScopeConfig, TrustEngine, TrustError,
};

fn engine() -> TrustEngine {
    TrustEngine::in_memory(EngineConfig::default()).expect("default config is valid")
}

fn is_validation<T: std::fmt::Debug>(result: agentic_trust::Result<T>) -> bool {
    matches!(result, Err(TrustError::Validation(_)))
}

#[test]
fn edge_names() {
    let engine = engine();
    let global = ScopeConfig::global();

    assert!(is_validation(engine.issue("", &global)));
    assert!(is_validation(engine.issue("   ", &global)));
    assert!(is_validation(engine.issue("two words", &global)));
    assert!(is_validation(engine.issue("a/b", &global)));
    assert!(is_validation(engine.issue(&"x".repeat(129), &global)));

    assert!(engine.issue(&"x".repeat(128), &global).is_ok());
    let unicode = engine.issue("агент-研究", &global).unwrap();
    assert!(engine.verify_identity_by_name("агент-研究", None));
    assert_eq!(engine.get_identity_by_name("агент-研究", None).unwrap().id, unicode.id);
}

#[test]
fn edge_scope_flags() {
    let engine = engine();

    let mut conflicting = ScopeConfig::global();
    conflicting.trust_domain = Some("example.xyz".into());
    assert!(is_validation(engine.issue("a", &conflicting)));

    let mut missing = ScopeConfig::global();
    missing.is_global_identity = false;
    assert!(is_validation(engine.issue("a", &missing)));

    assert!(is_validation(engine.issue("a", &ScopeConfig::domain("   "))));
    assert!(is_validation(engine.issue("a", &ScopeConfig::domain("untrusted-domain.com"))));
}

#[test]
fn edge_domain_case_is_normalized() {
    let engine = engine();
    let agent = engine.issue("agent", &ScopeConfig::domain(" Example.XYZ ")).unwrap();
    assert_eq!(agent.trust_domain(), Some("example.xyz"));

    assert!(engine.verify_identity_by_name("agent", Some("EXAMPLE.xyz")));
    assert!(is_validation(engine.issue("agent", &ScopeConfig::domain("example.xyz"))));
    // The global namespace is separate.
    assert!(!engine.verify_identity_by_name("agent", None));
}

#[test]
fn edge_unknown_ids() {
    let engine = engine();
    let ghost = IdentityId::from("aid_ghost");

    assert!(matches!(engine.get_identity(&ghost), Err(TrustError::NotFound(_))));
    assert!(matches!(engine.reissue(&ghost, None), Err(TrustError::NotFound(_))));
    assert!(matches!(
        engine.revoke(&ghost, RevocationReason::Decommissioned),
        Err(TrustError::NotFound(_))
    ));
    assert!(matches!(engine.get_policy(&ghost), Err(TrustError::NotFound(_))));
    assert!(!engine.verify_identity_id(&ghost));
    assert!(!engine.is_action_allowed_for(&ghost, "read:x", None));

    // Ids that look like paths are just unknown ids.
    assert!(engine.get_identity(&IdentityId::from("../etc/passwd")).is_err());
}

#[test]
fn edge_bad_references() {
    let engine = engine();
    let root = engine.issue("root", &ScopeConfig::global()).unwrap();
    let ghost = IdentityId::from("aid_ghost");

    assert!(is_validation(engine.issue("child", &ScopeConfig::global().parent(ghost.clone()))));
    assert!(is_validation(engine.issue("child", &ScopeConfig::global().link(ghost))));
    assert!(is_validation(engine.reissue(&root.id, Some(&ScopeConfig::global().parent(root.id.clone())))));
    assert!(is_validation(engine.reissue(&root.id, Some(&ScopeConfig::global().link(root.id.clone())))));

    engine.revoke(&root.id, RevocationReason::PolicyViolation).unwrap();
    assert!(is_validation(engine.issue("orphan", &ScopeConfig::global().parent(root.id.clone()))));
    // Links to revoked identities stay allowed.
    assert!(engine.issue("linker", &ScopeConfig::global().link(root.id.clone())).is_ok());
}

#[test]
fn edge_duplicate_links_collapse() {
    let engine = engine();
    let a = engine.issue("a", &ScopeConfig::global()).unwrap();
    let b = engine
        .issue(
            "b",
            &ScopeConfig::global().links([a.id.clone(), a.id.clone(), a.id.clone()]),
        )
        .unwrap();
    assert_eq!(b.links, vec![a.id]);
}

#[test]
fn edge_malformed_tokens() {
    let engine = engine();
    let agent = engine.issue("agent", &ScopeConfig::global()).unwrap();
    let other = engine.issue("other", &ScopeConfig::global()).unwrap();
    let token = &agent.credential.token;

    for bad in ["", "atok1", "atok1..", "not-a-token", "atok2.e30.AAAA", "atok1.!!!.AAAA"] {
        assert!(
            matches!(engine.verify_credential(bad), Err(TrustError::CredentialInvalid(_))),
            "{bad:?} should be invalid"
        );
    }

    let extra = format!("{token}.extra");
    assert!(matches!(engine.verify_credential(&extra), Err(TrustError::CredentialInvalid(_))));

    // Body of one token with the signature of another.
    let body = token.rsplit_once('.').unwrap().0;
    let signature = other.credential.token.rsplit_once('.').unwrap().1;
    let spliced = format!("{body}.{signature}");
    assert!(matches!(engine.verify_credential(&spliced), Err(TrustError::CredentialInvalid(_))));

    // Garbage credentials fall back to anonymous discovery.
    let seen = engine.discover(&Caller::Credential("garbage".into()), None).unwrap();
    assert_eq!(seen.len(), 2, "both identities are global");
}

#[test]
fn edge_scope_change_keeps_id() {
    let engine = engine();
    let agent = engine.issue("agent", &ScopeConfig::global()).unwrap();
    let moved = engine
        .reissue(&agent.id, Some(&ScopeConfig::domain("gigacity.xyz")))
        .unwrap();

    assert_eq!(moved.id, agent.id);
    assert_eq!(moved.trust_domain(), Some("gigacity.xyz"));
    assert!(engine.verify_identity_by_name("agent", Some("gigacity.xyz")));
    assert!(!engine.verify_identity_by_name("agent", None));
    // The old global name is free again.
    assert!(engine.issue("agent", &ScopeConfig::global()).is_ok());
}
