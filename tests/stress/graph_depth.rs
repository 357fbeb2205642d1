//! Stress test: long trust chains, the search depth bound, and cycles.

use agentic_trust::{
    Deadline, EngineConfig, Identity, IdentityId, ScopeConfig, TrustEngine, TrustError,
    TrustGraph,
};

fn engine_with_depth(max_graph_depth: usize) -> TrustEngine {
    let config = EngineConfig {
        max_graph_depth,
        ..EngineConfig::default()
    };
    TrustEngine::in_memory(config).expect("config is valid")
}

/// Issue `len` identities where node `i` links to node `i - 1`.
fn chain(engine: &TrustEngine, len: usize) -> Vec<Identity> {
    let mut nodes: Vec<Identity> = Vec::with_capacity(len);
    for i in 0..len {
        let mut scope = ScopeConfig::global();
        if let Some(prev) = nodes.last() {
            scope = scope.link(prev.id.clone());
        }
        nodes.push(
            engine
                .issue(&format!("node-{i}"), &scope)
                .expect("chain issue should succeed"),
        );
    }
    nodes
}

#[test]
fn stress_chain_of_100_within_bound() {
    let engine = engine_with_depth(128);
    let nodes = chain(&engine, 101);

    let path = engine
        .connection_path(&nodes[100].id, &nodes[0].id)
        .unwrap()
        .expect("the chain connects end to start");
    assert_eq!(path.len(), 101);
    assert_eq!(path.first(), Some(&nodes[100].id));
    assert_eq!(path.last(), Some(&nodes[0].id));

    // Links point backwards only.
    assert!(engine.connection_path(&nodes[0].id, &nodes[100].id).unwrap().is_none());
}

#[test]
fn stress_default_bound_truncates_long_chain() {
    let engine = engine_with_depth(32);
    let nodes = chain(&engine, 41);

    assert!(engine.verify_connection(&nodes[40].id, &nodes[8].id), "exactly 32 hops");
    assert!(matches!(
        engine.connection_path(&nodes[40].id, &nodes[0].id),
        Err(TrustError::GraphDepthExceeded(32))
    ));
    assert!(!engine.verify_connection(&nodes[40].id, &nodes[0].id));
}

#[test]
fn stress_cycle_search_terminates() {
    let engine = engine_with_depth(64);
    let nodes = chain(&engine, 50);
    let outsider = engine.issue("outsider", &ScopeConfig::global()).unwrap();

    // Close the loop: node-0 links to node-49.
    engine
        .reissue(&nodes[0].id, Some(&ScopeConfig::global().link(nodes[49].id.clone())))
        .unwrap();

    assert!(engine.verify_connection(&nodes[0].id, &nodes[1].id));
    assert!(engine.verify_connection(&nodes[1].id, &nodes[0].id));
    assert!(engine.connection_path(&nodes[10].id, &outsider.id).unwrap().is_none());
}

#[test]
fn stress_parent_edges_count_as_outbound() {
    let engine = engine_with_depth(32);
    let root = engine.issue("root", &ScopeConfig::global()).unwrap();
    let mut parent = root.id.clone();
    for i in 0..20 {
        let child = engine
            .issue(
                &format!("child-{i}"),
                &ScopeConfig::domain("gigacity.xyz").parent(parent.clone()),
            )
            .unwrap();
        parent = child.id;
    }

    let path = engine.connection_path(&parent, &root.id).unwrap().unwrap();
    assert_eq!(path.len(), 21);
    assert!(!engine.verify_connection(&root.id, &parent));
}

#[test]
fn stress_wide_fan_in_snapshot() {
    let engine = engine_with_depth(32);
    let hub = engine.issue("hub", &ScopeConfig::global()).unwrap();
    let spokes: Vec<IdentityId> = (0..300)
        .map(|i| {
            engine
                .issue(
                    &format!("spoke-{i}"),
                    &ScopeConfig::domain("gptapp.ai").link(hub.id.clone()),
                )
                .unwrap()
                .id
        })
        .collect();

    let all = engine.list_identities().unwrap();
    let graph = TrustGraph::from_identities(&all);
    assert_eq!(graph.edge_count(), 300);
    assert_eq!(graph.inbound(&hub.id).len(), 300);
    assert_eq!(graph.domain_members("gptapp.ai").count(), 300);

    let d = Deadline::none();
    // Spokes reach each other only through the hub, which has no outbound edges.
    assert!(graph.path(&spokes[0], &spokes[1], 32, &d).unwrap().is_none());
    assert!(graph
        .connected_either_way(&hub.id, &spokes[299], 32, &d)
        .unwrap());
}

#[test]
fn stress_expired_deadline_stops_search() {
    let engine = engine_with_depth(64);
    let nodes = chain(&engine, 10);
    let bounded = engine.within(Deadline::after(std::time::Duration::ZERO));
    assert!(matches!(
        bounded.connection_path(&nodes[9].id, &nodes[0].id),
        Err(TrustError::Timeout(_))
    ));
}
