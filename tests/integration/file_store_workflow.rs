//! Integration test: file-backed engine across restarts.
//!
//! Issues identities into a `FileStore`, persists the issuer key, then
//! rebuilds the engine from disk and checks that credentials, edges,
//! revocations and policies all survive.

use agentic_trust::storage::{load_issuer, save_issuer};
use agentic_trust::{
    CredentialIssuer, EngineConfig, FileStore, IdentityStore, RevocationReason, ScopeConfig,
    TrustEngine, TrustError,
};

const PASSPHRASE: &str = "correct horse battery staple";

#[test]
fn engine_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let key_path = dir.path().join("issuer.key");

    let issuer = CredentialIssuer::generate();
    save_issuer(&issuer, &key_path, PASSPHRASE).unwrap();

    let (blog, research, token_v1) = {
        let store = FileStore::new(dir.path()).unwrap();
        let engine = TrustEngine::new(store, issuer, EngineConfig::default()).unwrap();

        let blog = engine.issue("blog-writer", &ScopeConfig::global()).unwrap();
        let research = engine
            .issue(
                "researcher",
                &ScopeConfig::domain("example.xyz").link(blog.id.clone()),
            )
            .unwrap();
        let token_v1 = research.credential.token.clone();
        engine.reissue(&research.id, None).unwrap();
        engine
            .revoke(&blog.id, RevocationReason::Decommissioned)
            .unwrap();
        (blog, research, token_v1)
    };

    // ── Restart ─────────────────────────────────────────────────────────
    let issuer = load_issuer(&key_path, PASSPHRASE).unwrap();
    let store = FileStore::new(dir.path()).unwrap();
    assert_eq!(store.list_ids().unwrap().len(), 2);
    let engine = TrustEngine::new(store, issuer, EngineConfig::default()).unwrap();

    let research_now = engine.get_identity(&research.id).unwrap();
    assert_eq!(research_now.credential.generation, 2);
    assert!(engine.verify_identity_id(&research.id));
    assert!(matches!(
        engine.verify_credential(&token_v1),
        Err(TrustError::CredentialStale { presented: 1, current: 2 })
    ));

    assert!(!engine.verify_identity_id(&blog.id));
    let blog_now = engine.get_identity(&blog.id).unwrap();
    let revocation = blog_now.revocation.expect("revocation persisted");
    assert!(revocation.verify_signature().is_ok());

    assert!(engine.verify_connection(&research.id, &blog.id));
    assert_eq!(engine.get_policy(&research.id).unwrap().len(), 1);
    assert_eq!(
        engine
            .get_identity_by_name("researcher", Some("example.xyz"))
            .unwrap()
            .id,
        research.id
    );
}

#[test]
fn other_issuer_cannot_verify_persisted_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let engine = TrustEngine::new(
        FileStore::new(dir.path()).unwrap(),
        CredentialIssuer::generate(),
        EngineConfig::default(),
    )
    .unwrap();
    let agent = engine.issue("agent", &ScopeConfig::global()).unwrap();
    drop(engine);

    let imposter = TrustEngine::new(
        FileStore::new(dir.path()).unwrap(),
        CredentialIssuer::generate(),
        EngineConfig::default(),
    )
    .unwrap();
    assert!(matches!(
        imposter.verify_credential(&agent.credential.token),
        Err(TrustError::CredentialInvalid(_))
    ));
    assert!(imposter.store().contains(&agent.id).unwrap());
}

#[test]
fn wrong_passphrase_cannot_load_issuer() {
    let dir = tempfile::tempdir().unwrap();
    let key_path = dir.path().join("issuer.key");
    save_issuer(&CredentialIssuer::generate(), &key_path, PASSPHRASE).unwrap();

    assert!(matches!(
        load_issuer(&key_path, "nope"),
        Err(TrustError::InvalidPassphrase)
    ));
}
