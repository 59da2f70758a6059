use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use sql_managed::splitter::split_statements;

fn generate_dump(tables: usize, rows_per_table: usize) -> String {
    let mut sql = String::new();
    for table in 0..tables {
        sql.push_str(&format!(
            "CREATE TABLE stock_{table} (id INT PRIMARY KEY, label VARCHAR(64), note TEXT);\n"
        ));
        for row in 0..rows_per_table {
            sql.push_str(&format!(
                "INSERT INTO stock_{table} (id, label, note) VALUES ({row}, 'item {row}', 'kept; it\\'s fine');\n"
            ));
        }
    }
    sql
}

fn bench_split(c: &mut Criterion) {
    let dump = generate_dump(20, 200);
    c.bench_function("split_statements_4k", |b| {
        b.iter(|| split_statements(black_box(&dump)))
    });

    let comment_heavy = format!(
        "/* banner */\n-- preface\n{}",
        generate_dump(5, 50).replace('\n', "\n-- filler comment\n")
    );
    c.bench_function("split_statements_comment_heavy", |b| {
        b.iter(|| split_statements(black_box(&comment_heavy)))
    });
}

criterion_group!(benches, bench_split);
criterion_main!(benches);
