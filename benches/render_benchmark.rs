//! Benchmarks for rich-text rendering and workbook writing.
//!
//! Run with: cargo bench
//!
//! These benchmarks render synthetic documents of various sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ctfexport::model::{MarkType, Node, NodeType};
use ctfexport::xlsx::{Workbook, Worksheet};

/// Creates a synthetic rich-text document with the given number of sections.
///
/// Each section has a heading, a marked-up paragraph, a nested list, and a
/// small table, so every stateful Markdown handler is exercised.
fn create_test_document(section_count: usize) -> Node {
    let mut content = Vec::with_capacity(section_count * 4);

    for i in 0..section_count {
        content.push(Node::element(
            NodeType::Heading2,
            vec![Node::text(format!("Section {}", i))],
        ));
        content.push(Node::element(
            NodeType::Paragraph,
            vec![
                Node::text("Plain text with "),
                Node::marked("bold", [MarkType::Bold]),
                Node::text(" and "),
                Node::marked("code", [MarkType::Code, MarkType::Italic]),
                Node::text("."),
            ],
        ));

        let item = |text: &str| {
            Node::element(
                NodeType::ListItem,
                vec![Node::element(NodeType::Paragraph, vec![Node::text(text)])],
            )
        };
        content.push(Node::element(
            NodeType::OrderedList,
            vec![
                item("first"),
                Node::element(
                    NodeType::ListItem,
                    vec![Node::element(
                        NodeType::UnorderedList,
                        vec![item("nested a"), item("nested b")],
                    )],
                ),
                item("third"),
            ],
        ));

        let cell = |text: &str| {
            Node::element(
                NodeType::TableCell,
                vec![Node::element(NodeType::Paragraph, vec![Node::text(text)])],
            )
        };
        content.push(Node::element(
            NodeType::Table,
            vec![
                Node::element(NodeType::TableRow, vec![cell("key"), cell("value")]),
                Node::element(NodeType::TableRow, vec![cell("a"), cell("1")]),
                Node::element(NodeType::TableRow, vec![cell("b"), cell("2")]),
            ],
        ));
    }

    Node::document(content)
}

/// Benchmark rendering through the HTML profile.
fn bench_html_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("html_rendering");

    for section_count in [10, 100, 1000].iter() {
        let document = create_test_document(*section_count);

        group.bench_with_input(
            BenchmarkId::new("sections", section_count),
            &document,
            |b, doc| {
                b.iter(|| ctfexport::to_html(black_box(doc)));
            },
        );
    }

    group.finish();
}

/// Benchmark rendering through the Markdown profile.
fn bench_markdown_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("markdown_rendering");

    for section_count in [10, 100, 1000].iter() {
        let document = create_test_document(*section_count);

        group.bench_with_input(
            BenchmarkId::new("sections", section_count),
            &document,
            |b, doc| {
                b.iter(|| ctfexport::to_markdown(black_box(doc)));
            },
        );
    }

    group.finish();
}

/// Benchmark writing a workbook package to memory.
fn bench_workbook_writing(c: &mut Criterion) {
    let mut group = c.benchmark_group("workbook_writing");

    for row_count in [100, 1000, 10000].iter() {
        let records = (0..*row_count).map(|i| {
            vec![
                ("id".to_string(), format!("entry{}", i)),
                ("field".to_string(), "title".to_string()),
                ("en-US".to_string(), format!("Title number {}", i)),
            ]
        });
        let mut workbook = Workbook::new();
        workbook
            .add_sheet(Worksheet::from_records("entries", records).unwrap())
            .unwrap();

        group.throughput(Throughput::Elements(*row_count as u64));
        group.bench_with_input(
            BenchmarkId::new("rows", row_count),
            &workbook,
            |b, workbook| {
                b.iter(|| black_box(workbook).to_bytes().unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_html_rendering,
    bench_markdown_rendering,
    bench_workbook_writing,
);
criterion_main!(benches);
