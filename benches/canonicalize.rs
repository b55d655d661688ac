use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use node_stream_diff::{
    scan, to_text, CanonicalRules, Canonicalizer, Comparator, CompareOptions, MemberName, Node,
    Source,
};

const UI: &str = "urn:ui";

/// A panel holding `count` buttons, each with members written in reverse
/// alphabetical order so every scope needs reordering.
fn panel(count: usize) -> Vec<Node> {
    let mut nodes = vec![
        Node::namespace("", UI),
        Node::start_object(UI, "StackPanel"),
        Node::start_member(MemberName::declared(UI, "Children")),
    ];
    for i in 0..count {
        nodes.push(Node::start_object(UI, "Button"));
        for (name, value) in [
            ("Width", i.to_string()),
            ("RenderTransformOrigin", "0.5, 0.5".to_string()),
            ("IsEnabled", "True".to_string()),
            ("Background", "Red".to_string()),
        ] {
            nodes.push(Node::start_member(MemberName::declared(UI, name)));
            nodes.push(Node::value(value));
            nodes.push(Node::EndMember);
        }
        nodes.push(Node::EndObject);
    }
    nodes.push(Node::EndMember);
    nodes.push(Node::EndObject);
    nodes
}

fn benchmark_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    for size in [10, 100, 1000].iter() {
        let nodes = panel(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &nodes, |b, nodes| {
            b.iter(|| to_text(black_box(nodes.clone())).unwrap());
        });
    }
    group.finish();
}

fn benchmark_scan(c: &mut Criterion) {
    let text = to_text(panel(100)).unwrap();
    c.bench_function("scan_100_buttons", |b| {
        b.iter(|| scan(black_box(&text)).unwrap());
    });
}

fn benchmark_canonicalize(c: &mut Criterion) {
    let rules = CanonicalRules::default();
    let canon = Canonicalizer::new(&rules);
    let mut group = c.benchmark_group("canonicalize");
    for size in [10, 100, 1000].iter() {
        let text = to_text(panel(*size)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| canon.canonicalize_text(black_box(text), Source::Markup).unwrap());
        });
    }
    group.finish();
}

fn benchmark_compare(c: &mut Criterion) {
    let comparator = Comparator::new(CompareOptions::new().with_persist_on_failure(false));
    let text = to_text(panel(100)).unwrap();
    c.bench_function("compare_100_buttons", |b| {
        b.iter(|| {
            comparator
                .compare_text(black_box(&text), black_box(&text))
                .unwrap()
        });
    });
}

criterion_group!(
    benches,
    benchmark_encode,
    benchmark_scan,
    benchmark_canonicalize,
    benchmark_compare
);
criterion_main!(benches);
