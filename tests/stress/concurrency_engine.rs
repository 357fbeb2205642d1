//! Concurrency test: parallel mutations against one engine.
//!
//! Validates that per-identity and per-name locking serializes writers
//! without losing updates, and that readers never observe torn records.

use std::collections::HashSet;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use agentic_trust::{
    Deadline, EngineConfig, RevocationReason, ScopeConfig, TrustEngine, TrustError,
};

fn engine() -> TrustEngine {
    TrustEngine::in_memory(EngineConfig::default()).expect("default config is valid")
}

#[test]
fn stress_concurrent_reissues_of_one_identity() {
    let engine = engine();
    let agent = engine.issue("agent", &ScopeConfig::global()).unwrap();
    let generations = Mutex::new(Vec::new());

    thread::scope(|s| {
        for _ in 0..16 {
            s.spawn(|| {
                for _ in 0..10 {
                    let next = engine.reissue(&agent.id, None).expect("reissue should succeed");
                    generations.lock().unwrap().push(next.credential.generation);
                }
            });
        }
    });

    let mut generations = generations.into_inner().unwrap();
    generations.sort_unstable();
    let expected: Vec<u64> = (2..=161).collect();
    assert_eq!(generations, expected, "every reissue gets its own generation");

    let stored = engine.get_identity(&agent.id).unwrap();
    assert_eq!(stored.credential.generation, 161);
    assert!(engine.verify_identity(&stored));
}

#[test]
fn stress_parallel_issues_of_distinct_names() {
    let engine = engine();

    let ids: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..32)
            .map(|t| {
                let engine = &engine;
                s.spawn(move || {
                    (0..8)
                        .map(|i| {
                            engine
                                .issue(&format!("worker-{t}-{i}"), &ScopeConfig::domain("gptapps.ai"))
                                .expect("distinct names never collide")
                                .id
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
    });

    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), 256);
    assert_eq!(engine.list_identities().unwrap().len(), 256);
}

#[test]
fn stress_same_name_race_has_one_winner() {
    for round in 0..10 {
        let engine = engine();
        let name = format!("contested-{round}");

        let results: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| engine.issue(&name, &ScopeConfig::domain("example.xyz"))))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1, "round {round}: exactly one issue may claim the name");
        for r in results.iter().filter(|r| r.is_err()) {
            assert!(matches!(r, Err(TrustError::Validation(_))));
        }
    }
}

#[test]
fn stress_same_name_in_different_scopes_all_succeed() {
    let engine = engine();
    let scopes = [
        ScopeConfig::global(),
        ScopeConfig::domain("gptapp.ai"),
        ScopeConfig::domain("gptapps.ai"),
        ScopeConfig::domain("gigacity.xyz"),
        ScopeConfig::domain("gptarticles.xyz"),
        ScopeConfig::domain("example.xyz"),
    ];

    thread::scope(|s| {
        for scope in &scopes {
            let engine = &engine;
            s.spawn(move || engine.issue("shared", scope).expect("scopes are separate namespaces"));
        }
    });
    assert_eq!(engine.list_identities().unwrap().len(), scopes.len());
}

#[test]
fn stress_readers_during_reissue() {
    let engine = engine();
    let agent = engine.issue("agent", &ScopeConfig::global()).unwrap();

    thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..50 {
                engine.reissue(&agent.id, None).unwrap();
            }
        });
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..200 {
                    let seen = engine.get_identity(&agent.id).unwrap();
                    // A snapshot only stops verifying once a newer generation exists.
                    if engine.verifier().check_identity(&seen).is_err() {
                        let now = engine.get_identity(&agent.id).unwrap();
                        assert!(now.credential.generation > seen.credential.generation);
                    }
                }
            });
        }
    });
}

#[test]
fn stress_revoke_and_reissue_interleaved() {
    let engine = engine();
    let agent = engine.issue("agent", &ScopeConfig::global()).unwrap();

    thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..20 {
                engine.revoke(&agent.id, RevocationReason::ManualRevocation).unwrap();
            }
        });
        s.spawn(|| {
            for _ in 0..20 {
                engine.reissue(&agent.id, None).unwrap();
            }
        });
    });

    let last = engine.get_identity(&agent.id).unwrap();
    assert_eq!(last.credential.generation, 21);
    // Whatever ran last decides the final state; both states are coherent.
    if last.is_active() {
        assert!(last.revocation.is_none());
        assert!(engine.verify_identity(&last));
    } else {
        assert!(last.revocation.is_some());
        assert!(!engine.verify_identity(&last));
    }
}

#[test]
fn stress_blocked_writer_times_out() {
    let engine = engine();
    let agent = engine.issue("agent", &ScopeConfig::global()).unwrap();

    // An already-expired deadline cannot wait for anything.
    let bounded = engine.within(Deadline::after(Duration::ZERO));
    assert!(matches!(
        bounded.reissue(&agent.id, None),
        Err(TrustError::Timeout(_))
    ));
    assert_eq!(engine.get_identity(&agent.id).unwrap().credential.generation, 1);
}
