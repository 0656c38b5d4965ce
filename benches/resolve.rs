use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use docket::{resolve, CallSite, DocOptions, TitleTable};

fn bench_resolve_table_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    let site = CallSite::new("WidgetTest", "test lists all widgets", "tests/widget.rs", 100);

    for size in [0, 10, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let titles: TitleTable = (0..size)
                .map(|i| (format!("Module{i}"), format!("Title {i}")))
                .chain([("Widget".to_string(), "Widgets API".to_string())])
                .collect();

            b.iter(|| resolve(black_box(&site), black_box(&titles), DocOptions::new()));
        });
    }

    group.finish();
}

fn bench_resolve_complete_options(c: &mut Criterion) {
    let site = CallSite::new("WidgetTest", "test lists all widgets", "tests/widget.rs", 100);
    let titles = TitleTable::new().with("Widget", "Widgets API");
    let options = DocOptions::new()
        .description("custom")
        .group_title("Custom")
        .module("WidgetTest")
        .file("tests/widget.rs")
        .line(42);

    c.bench_function("resolve_complete_options", |b| {
        b.iter(|| resolve(black_box(&site), black_box(&titles), options.clone()));
    });
}

criterion_group!(benches, bench_resolve_table_sizes, bench_resolve_complete_options);
criterion_main!(benches);
