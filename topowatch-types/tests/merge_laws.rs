//! Algebraic properties of report merging.

use topowatch_types::{
    ids, keys, EdgeMetadata, Metric, Node, Report, StringSet, CONTAINER, HOST, PROCESS,
};

fn client_report() -> Report {
    let host = ids::make_host_node_id("client");
    Report::builder()
        .id("client")
        .window_ms(15_000)
        .node(
            PROCESS,
            Node::new(ids::make_process_node_id("client", "2"))
                .with_latest(keys::process::PID, 10, "2")
                .with_latest(keys::process::NAME, 10, "curl")
                .with_metric(keys::process::CPU_USAGE, Metric::new().add(10, 0.5))
                .with_edge(
                    ids::make_process_node_id("server", "7"),
                    EdgeMetadata {
                        egress_byte_count: Some(100),
                        ..Default::default()
                    },
                )
                .with_parent(HOST, host.clone()),
        )
        .node(
            HOST,
            Node::new(host).with_set(
                keys::host::LOCAL_NETWORKS,
                StringSet::single("10.10.10.0/24"),
            ),
        )
        .build()
}

fn server_report() -> Report {
    Report::builder()
        .id("server")
        .window_ms(10_000)
        .node(
            PROCESS,
            Node::new(ids::make_process_node_id("server", "7"))
                .with_latest(keys::process::PID, 12, "7")
                .with_edge(
                    ids::make_process_node_id("client", "2"),
                    EdgeMetadata {
                        ingress_byte_count: Some(90),
                        ..Default::default()
                    },
                ),
        )
        .build()
}

/// Overlaps both of the above on the client process and adds a container.
fn overlap_report() -> Report {
    Report::builder()
        .id("overlap")
        .node(
            PROCESS,
            Node::new(ids::make_process_node_id("client", "2"))
                .with_latest(keys::process::NAME, 20, "wget")
                .with_metric(keys::process::CPU_USAGE, Metric::new().add(20, 0.7))
                .with_edge(
                    ids::make_process_node_id("server", "7"),
                    EdgeMetadata {
                        egress_byte_count: Some(150),
                        ..Default::default()
                    },
                ),
        )
        .node(
            CONTAINER,
            Node::new(ids::make_container_node_id("ping"))
                .with_latest(keys::docker::CONTAINER_ID, 20, "ping"),
        )
        .build()
}

#[test]
fn merge_is_commutative() {
    let (a, b, c) = (client_report(), server_report(), overlap_report());
    assert_eq!(a.merge(&b), b.merge(&a));
    assert_eq!(a.merge(&c), c.merge(&a));
    assert_eq!(b.merge(&c), c.merge(&b));
}

#[test]
fn merge_is_associative() {
    let (a, b, c) = (client_report(), server_report(), overlap_report());
    assert_eq!(a.merge(&b).merge(&c), a.merge(&b.merge(&c)));
}

#[test]
fn merge_is_idempotent() {
    let a = client_report();
    assert_eq!(a.merge(&a), a);

    let abc = a.merge(&server_report()).merge(&overlap_report());
    assert_eq!(abc.merge(&abc), abc);
    assert_eq!(abc.merge(&a), abc);
}

#[test]
fn empty_report_is_identity() {
    let a = client_report().merge(&overlap_report());
    assert_eq!(a.merge(&Report::new()), a);
    assert_eq!(Report::new().merge(&a), a);
}

#[test]
fn merged_fields_follow_their_operators() {
    let merged = client_report().merge(&overlap_report());
    let process = merged
        .process
        .get(&ids::make_process_node_id("client", "2"))
        .unwrap();

    // later observation wins
    assert_eq!(process.latest_value(keys::process::NAME), Some("wget"));
    assert_eq!(process.latest_value(keys::process::PID), Some("2"));

    // samples are unioned
    let cpu = process.metrics.lookup(keys::process::CPU_USAGE).unwrap();
    assert_eq!(cpu.len(), 2);
    assert_eq!(cpu.last_value(), Some(0.7));

    // the same edge from two vantage points is not double counted
    let edge = process
        .edges
        .lookup(&ids::make_process_node_id("server", "7"))
        .unwrap();
    assert_eq!(edge.egress_byte_count, Some(150));

    assert_eq!(merged.window_ms, 15_000);
    assert_eq!(merged.id.to_string(), "client,overlap");
}

#[test]
fn latest_tie_break_is_order_independent() {
    let x = Report::builder()
        .id("x")
        .node(HOST, Node::new("h;<host>").with_latest("k", 5, "x"))
        .build();
    let y = Report::builder()
        .id("y")
        .node(HOST, Node::new("h;<host>").with_latest("k", 5, "y"))
        .build();

    let xy = x.merge(&y);
    assert_eq!(xy, y.merge(&x));
    assert_eq!(xy.host.get("h;<host>").and_then(|n| n.latest_value("k")), Some("y"));
}

#[test]
fn set_union_is_sorted_and_deduplicated() {
    let a: StringSet = ["a", "b"].into_iter().collect();
    let b: StringSet = ["b", "c"].into_iter().collect();
    assert_eq!(a.merge(&b).as_slice(), &["a", "b", "c"]);
}

#[cfg(feature = "serde")]
#[test]
fn report_survives_json() {
    let report = client_report().merge(&server_report());
    let json = serde_json::to_string(&report).unwrap();
    let back: Report = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
}

#[cfg(feature = "serde")]
#[test]
fn missing_fields_default_to_empty() {
    let back: Report = serde_json::from_str(r#"{"id":["abc"],"process":{"nodes":{}}}"#).unwrap();
    assert!(back.is_empty());
    assert_eq!(back.id.to_string(), "abc");
}

#[cfg(feature = "serde")]
#[test]
fn node_ids_follow_their_keys_on_the_wire() {
    let skewed: Report =
        serde_json::from_str(r#"{"process":{"nodes":{"h;1":{"id":"h;2"}}}}"#).unwrap();
    let aligned: Report =
        serde_json::from_str(r#"{"process":{"nodes":{"h;1":{"id":"h;1"}}}}"#).unwrap();
    assert_eq!(skewed.process.get("h;1").map(|n| n.id.as_str()), Some("h;1"));

    let merged = skewed.merge(&aligned);
    assert_eq!(merged.process.len(), 1);
    assert_eq!(merged.process.get("h;1").map(|n| n.id.as_str()), Some("h;1"));
    assert_eq!(merged, aligned.merge(&skewed));
}
