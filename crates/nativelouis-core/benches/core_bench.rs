// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the per-call glue in nativelouis-core: table list
// resolution and input sanitizing.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use nativelouis_core::{resolve_table_list, sanitize};

fn bench_resolve_tables(c: &mut Criterion) {
    c.bench_function("resolve_table_list (single)", |b| {
        b.iter(|| {
            resolve_table_list(black_box("en-ueb-g1.ctb"), black_box("/data/liblouis/tables"))
        })
    });

    c.bench_function("resolve_table_list (mixed, 4 entries)", |b| {
        b.iter(|| {
            resolve_table_list(
                black_box("unicode.dis, /abs/chardefs.cti ,en-ueb-g2.ctb,braille-patterns.cti"),
                black_box("/data/liblouis/tables"),
            )
        })
    });
}

fn bench_sanitize(c: &mut Criterion) {
    let sentence = "The quick brown fox jumps over the lazy dog. ".repeat(40);
    let cells = "⠓⠑⠇⠇⠕⠀⠺⠕⠗⠇⠙⠀".repeat(80);
    let blank = "⠀".repeat(512);

    c.bench_function("sanitize (plain text, 1.8 KiB)", |b| {
        b.iter(|| sanitize(black_box(&sentence)))
    });
    c.bench_function("sanitize (braille with blanks)", |b| {
        b.iter(|| sanitize(black_box(&cells)))
    });
    c.bench_function("sanitize (all blank)", |b| b.iter(|| sanitize(black_box(&blank))));
}

criterion_group!(benches, bench_resolve_tables, bench_sanitize);
criterion_main!(benches);
