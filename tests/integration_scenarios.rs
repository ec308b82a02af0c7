use netscaler_graph::graph::{ConfigGraph, FilterOptions, NodeKind, GLOBAL_NAME};
use netscaler_graph::visualization::RankDir;

const NS_CONF: &str = r#"#NS13.1 Build 49.13
set ns config -IPAddress 192.168.10.10 -netmask 255.255.255.0
add server srv1 10.1.1.1
add server srv2 10.1.1.2
add service svc1 srv1 HTTP 80
add service svc2 srv2 HTTP 80
add lb vserver lbvs1 HTTP 0.0.0.0 80
add lb vserver lbvs2 SSL 10.0.0.20 443
bind lb vserver lbvs1 svc1
bind lb vserver lbvs2 svc2
add ssl certkey cert1 -cert cert1.pem -key cert1.key
bind ssl vserver lbvs2 -certkeyName cert1
bind ssl vserver lbvs2 -eccCurveName P_256
set audit syslogParams -serverIP 10.9.9.9
"#;

fn build(filters: FilterOptions) -> ConfigGraph {
    ConfigGraph::build_from_reader(NS_CONF.as_bytes(), filters, RankDir::Tb).unwrap()
}

fn kind(g: &ConfigGraph, token: &str) -> Option<NodeKind> {
    g.find(token).and_then(|id| g.node(id)).map(|n| n.kind)
}

fn has_edge(g: &ConfigGraph, from: &str, to: &str) -> bool {
    g.edges.iter().any(|e| e.from == from && e.to == to)
}

#[test]
fn end_to_end_server_service_vserver() {
    let input = "add server srv1 10.1.1.1\nadd service svc1 srv1 HTTP 80\nadd lb vserver lbvs1 HTTP 0.0.0.0 80\n";
    let g = ConfigGraph::build_from_reader(input.as_bytes(), FilterOptions::default(), RankDir::Tb).unwrap();

    assert_eq!(g.nodes.len(), 4);
    assert_eq!(kind(&g, "srv1"), Some(NodeKind::Server));
    assert_eq!(kind(&g, "svc1"), Some(NodeKind::Service));
    assert_eq!(kind(&g, "lbvs1"), Some(NodeKind::LbVServer));
    assert_eq!(kind(&g, GLOBAL_NAME), Some(NodeKind::Vip));

    assert_eq!(g.edges.len(), 2);
    let svc = g.edges.iter().find(|e| e.from == "svc1").unwrap();
    assert_eq!(svc.to, "srv1 | 10.1.1.1");
    assert_eq!(svc.port.as_deref(), Some("80"));
    assert_eq!(svc.protocol.as_deref(), Some("HTTP"));
    let global = g.edges.iter().find(|e| e.to == "lbvs1").unwrap();
    assert_eq!(global.from, "Global | 0.0.0.0");
    assert_eq!(global.protocol.as_deref(), Some("HTTP"));
    assert_eq!(global.port, None);
}

#[test]
fn full_graph_without_filters() {
    let g = build(FilterOptions::default());
    // Global, NSIP, 2 servers, 2 services, 2 vservers, VIP, cert
    assert_eq!(g.nodes.len(), 10);
    assert_eq!(g.edges.len(), 7);
    assert_eq!(kind(&g, "192.168.10.10"), Some(NodeKind::Netscaler));
    assert_eq!(kind(&g, "10.0.0.20"), Some(NodeKind::Vip));
    assert!(g.find("P_256").is_none());
    assert!(g.find("10.9.9.9").is_none());
    // inherited from the vserver
    let bind = g.edges.iter().find(|e| e.from == "lbvs2" && e.to == "svc2").unwrap();
    assert_eq!(bind.label, "SSL");
    assert!(g.nodes.iter().all(|n| !n.isolated && !n.highlighted));
}

#[test]
fn isolation_keeps_both_directions_from_seed() {
    let g = build(FilterOptions { isolate_names: vec!["lbvs1".into()], ..FilterOptions::default() });
    let mut labels: Vec<&str> = g.nodes.iter().map(|n| n.label.as_str()).collect();
    labels.sort_unstable();
    assert_eq!(labels, vec!["Global | 0.0.0.0", "lbvs1", "srv1 | 10.1.1.1", "svc1"]);
    assert_eq!(g.edges.len(), 3);
    assert!(has_edge(&g, "Global | 0.0.0.0", "lbvs1"));
    assert!(has_edge(&g, "lbvs1", "svc1"));
    assert!(has_edge(&g, "svc1", "srv1 | 10.1.1.1"));
    assert!(g.nodes.iter().all(|n| n.isolated));
    assert_eq!(g.nodes.iter().filter(|n| n.highlighted).count(), 1);
}

#[test]
fn isolation_by_address_and_multiple_seeds() {
    let g = build(FilterOptions {
        isolate_names: vec!["10.1.1.2".into(), "cert1".into()],
        ..FilterOptions::default()
    });
    // backward from srv2: svc2, lbvs2, VIP; backward from cert1: lbvs2, VIP
    assert!(g.find("srv2").is_some());
    assert!(g.find("lbvs2").is_some());
    assert!(g.find("10.0.0.20").is_some());
    assert!(g.find("lbvs1").is_none());
    assert_eq!(g.nodes.iter().filter(|n| n.highlighted).count(), 2);
}

#[test]
fn ignore_by_kind_beats_isolation_seed() {
    let g = build(FilterOptions {
        ignore_kinds: vec![NodeKind::Cert],
        isolate_names: vec!["cert1".into()],
        ..FilterOptions::default()
    });
    assert!(g.find("cert1").is_none());
    // the only seed is gone, so isolation fails open over the remaining graph
    assert_eq!(g.nodes.len(), 9);
    assert_eq!(g.edges.len(), 6);
}

#[test]
fn ignore_by_name_removes_edges_too() {
    let g = build(FilterOptions { ignore_names: vec!["10.1.1.1".into()], ..FilterOptions::default() });
    assert!(g.find("srv1").is_none());
    assert!(!g.edges.iter().any(|e| e.to.starts_with("srv1")));
    assert_eq!(g.edges.len(), 6);
}

#[test]
fn unresolvable_seed_keeps_everything() {
    let full = build(FilterOptions::default());
    let g = build(FilterOptions { isolate_names: vec!["nowhere".into()], ..FilterOptions::default() });
    assert_eq!(g.nodes, full.nodes);
    assert_eq!(g.edges, full.edges);
}

#[test]
fn build_from_file_matches_reader() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ns.conf");
    std::fs::write(&path, NS_CONF).unwrap();
    let from_file = ConfigGraph::build_from_file(&path, FilterOptions::default(), RankDir::Lr).unwrap();
    let from_reader = build(FilterOptions::default());
    assert_eq!(from_file.nodes, from_reader.nodes);
    assert_eq!(from_file.edges, from_reader.edges);
    assert_eq!(from_file.rankdir, RankDir::Lr);
}

#[test]
fn empty_quoted_value_does_not_abort_the_build() {
    let input = "add server srv1 10.1.1.1\nadd vpn sessionAction sa1 -wihome \"\" -ntDomain x\n";
    let g = ConfigGraph::build_from_reader(input.as_bytes(), FilterOptions::default(), RankDir::Tb).unwrap();
    assert_eq!(kind(&g, "srv1"), Some(NodeKind::Server));
    assert_eq!(kind(&g, "sa1"), Some(NodeKind::SessionAction));
    assert!(g.edges.is_empty());
}

#[test]
fn isolation_does_not_walk_through_other_seeds() {
    let input = "bind lb group S1 M\nbind lb group M S2\nbind lb group R M\n";
    let g = ConfigGraph::build_from_reader(
        input.as_bytes(),
        FilterOptions { isolate_names: vec!["S1".into(), "S2".into()], ..FilterOptions::default() },
        RankDir::Tb,
    )
    .unwrap();
    let mut labels: Vec<&str> = g.nodes.iter().map(|n| n.label.as_str()).collect();
    labels.sort_unstable();
    assert_eq!(labels, vec!["M", "S1", "S2"]);
}
