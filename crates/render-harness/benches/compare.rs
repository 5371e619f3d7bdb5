use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use render_harness::testing::{SimpleMarkupParser, TreeComparer};
use render_harness::{MarkupComparer, MarkupParser};

/// Build a table-like markup document with the given number of rows.
fn build_markup(rows: usize) -> String {
    let mut markup = String::from("<table class=\"results\">");
    for row in 0..rows {
        markup.push_str(&format!(
            "<tr id=\"row-{row}\"><td class=\"name\">item {row}</td><td>{}</td></tr>",
            row * 7
        ));
    }
    markup.push_str("</table>");
    markup
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    let parser = SimpleMarkupParser::new();

    for rows in [10usize, 100, 1000].iter() {
        let markup = build_markup(*rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &markup, |b, markup| {
            b.iter(|| parser.parse(black_box(markup)).unwrap());
        });
    }
    group.finish();
}

fn bench_compare_identical(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare_identical");
    let parser = SimpleMarkupParser::new();
    let comparer = TreeComparer::new();

    for rows in [10usize, 100, 1000].iter() {
        let tree = parser.parse(&build_markup(*rows)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(rows), &tree, |b, tree| {
            b.iter(|| comparer.compare(black_box(tree), black_box(tree)));
        });
    }
    group.finish();
}

fn bench_compare_with_difference(c: &mut Criterion) {
    let parser = SimpleMarkupParser::new();
    let comparer = TreeComparer::new();

    let expected = parser.parse(&build_markup(100)).unwrap();
    let actual = parser
        .parse(&build_markup(100).replace("item 50", "item fifty"))
        .unwrap();

    c.bench_function("compare_one_difference", |b| {
        b.iter(|| {
            let diffs = comparer.compare(black_box(&expected), black_box(&actual));
            assert_eq!(diffs.len(), 1);
        });
    });
}

criterion_group!(
    benches,
    bench_parse,
    bench_compare_identical,
    bench_compare_with_difference
);
criterion_main!(benches);
