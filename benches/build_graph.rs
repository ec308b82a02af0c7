use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use netscaler_graph::graph::{ConfigGraph, FilterOptions};
use netscaler_graph::visualization::RankDir;
use std::fmt::Write as _;

/// A synthetic ns.conf with `n` load-balanced applications.
fn synthetic_config(n: usize) -> String {
    let mut s = String::new();
    for i in 0..n {
        let _ = writeln!(s, "add server srv{i} 10.{}.{}.1", i / 250, i % 250);
        let _ = writeln!(s, "add service svc{i} srv{i} HTTP 80");
        let _ = writeln!(s, "add lb vserver lb{i} SSL 172.16.{}.{} 443", i / 250, i % 250);
        let _ = writeln!(s, "bind lb vserver lb{i} svc{i}");
        let _ = writeln!(s, "add ssl certkey cert{i} -cert cert{i}.pem -key cert{i}.key");
        let _ = writeln!(s, "bind ssl vserver lb{i} -certkeyName cert{i}");
        let _ = writeln!(s, "set lb parameter -sessionsThreshold {i}");
    }
    s
}

fn bench_build_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_graph");

    for n in [10usize, 100, 500] {
        let conf = synthetic_config(n);
        group.bench_function(BenchmarkId::new("build_from_reader", n), |b| {
            b.iter(|| {
                let graph = ConfigGraph::build_from_reader(
                    black_box(conf.as_bytes()),
                    FilterOptions::default(),
                    RankDir::Tb,
                )
                .expect("build graph");
                // prevent optimizer from discarding
                black_box(graph.edges.len())
            })
        });
    }

    group.finish();
}

criterion_group!(name = benches; config = Criterion::default(); targets = bench_build_graph);
criterion_main!(benches);
