use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use topowatch::{App, ChannelSource, Collector, DataSource, FileSource};
use topowatch_probe::{FnReporter, HostTagger, Output, Probe, Report};
use topowatch_render::{registry, TopologyRegistry};
use topowatch_types::{ids, keys, Node, CONTAINER, HOST, PROCESS};

fn host_probe(host: &'static str, container: &'static str, output: Output) -> Probe {
    Probe::builder()
        .reporter(FnReporter::new("host", move || {
            Ok(Report::builder()
                .node(
                    HOST,
                    Node::new(ids::make_host_node_id(host))
                        .with_latest(keys::host::HOST_NAME, 1, host),
                )
                .build())
        }))
        .reporter(FnReporter::new("processes", move || {
            Ok(Report::builder()
                .node(
                    PROCESS,
                    Node::new(ids::make_process_node_id(host, "42"))
                        .with_latest(keys::process::PID, 1, "42")
                        .with_latest(keys::docker::CONTAINER_ID, 1, container),
                )
                .build())
        }))
        .reporter(FnReporter::new("docker", move || {
            Ok(Report::builder()
                .node(
                    CONTAINER,
                    Node::new(ids::make_container_node_id(container))
                        .with_latest(keys::docker::CONTAINER_ID, 1, container),
                )
                .build())
        }))
        .tagger(HostTagger::new(host, format!("probe-{host}")))
        .output(output)
        .interval(Duration::from_secs(1))
        .build()
}

fn file_app(paths: &[&Path]) -> App {
    let mut app = App::new(Arc::new(Collector::default()), TopologyRegistry::default());
    for path in paths {
        app.add_source(Box::new(FileSource::new(path)));
    }
    app
}

#[tokio::test]
async fn reports_from_two_hosts_merge_into_one_view() {
    let dir = tempfile::tempdir().unwrap();
    let (a, b) = (dir.path().join("a.json"), dir.path().join("b.json"));
    host_probe("web-1", "aaa", Output::file(&a)).publish_now().await;
    host_probe("web-2", "bbb", Output::file(&b)).publish_now().await;

    let mut app = file_app(&[&a, &b]);
    assert_eq!(app.poll(), 2);
    assert!(app.errors().is_empty());

    let hosts = app.topology(registry::HOSTS, true).unwrap();
    assert!(hosts.contains(&ids::make_host_node_id("web-1")));
    assert!(hosts.contains(&ids::make_host_node_id("web-2")));

    let containers = app.topology(registry::CONTAINERS, true).unwrap();
    assert!(containers.contains(&ids::make_container_node_id("aaa")));
    assert!(containers.contains(&ids::make_container_node_id("bbb")));

    let details = app
        .node(registry::CONTAINERS, &ids::make_container_node_id("aaa"))
        .unwrap();
    assert!(details.parents.iter().any(|p| p.id == ids::make_host_node_id("web-1")));
}

#[tokio::test]
async fn republished_files_are_picked_up_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    let probe = host_probe("web-1", "aaa", Output::file(&path));
    probe.publish_now().await;

    let mut source = FileSource::new(&path);
    assert!(source.poll().is_some());
    assert!(source.poll().is_none());
}

#[tokio::test(start_paused = true)]
async fn in_process_probe_feeds_a_channel_source() {
    let (output, mut rx) = Output::channel(4);
    let probe = host_probe("web-1", "aaa", output);
    let handle = probe.start();

    let (tx, source) = ChannelSource::create("in-process");
    let mut app = App::new(Arc::new(Collector::default()), TopologyRegistry::default())
        .with_source(Box::new(source));
    let mut changed = app.collector().subscribe();

    tx.send(rx.recv().await.unwrap()).unwrap();
    assert_eq!(app.poll(), 1);
    assert!(changed.try_recv().is_ok());
    assert_eq!(app.report().container.len(), 1);

    handle.shutdown().await;
}
