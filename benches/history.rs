// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};

use nereid_mindmap::config::EditorConfig;
use nereid_mindmap::editor::Editor;
use nereid_mindmap::history::{HistoryManager, DEFAULT_HISTORY_CAPACITY};
use nereid_mindmap::model::Point;

mod fixtures;
mod profiler;

// Benchmark identity (keep stable):
// - Groups: `history.record`, `history.undo_redo`, `history.drag`.
fn benches_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("history.record");
    for case in fixtures::Case::ALL {
        let diagram = fixtures::fixture(case);

        // A full manager, so every record also evicts the oldest entry.
        let mut full = HistoryManager::new(DEFAULT_HISTORY_CAPACITY);
        for _ in 0..DEFAULT_HISTORY_CAPACITY {
            full.record(&diagram);
        }

        group.throughput(Throughput::Elements(1));
        group.bench_function(case.id(), |b| {
            b.iter_batched(
                || full.clone(),
                |mut history| {
                    history.record(black_box(&diagram));
                    black_box(history.len())
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();

    let mut group = c.benchmark_group("history.undo_redo");
    for case in fixtures::Case::ALL {
        let mut editor = Editor::with_diagram(EditorConfig::default(), fixtures::fixture(case));
        let hub = fixtures::hub(editor.diagram());
        for step in 0..10_u32 {
            editor.update_node_position(&hub, Point::new(f64::from(step) * 10.0, 0.0));
        }

        group.throughput(Throughput::Elements(20));
        group.bench_function(case.id(), |b| {
            b.iter(|| {
                for _ in 0..10 {
                    editor.undo();
                }
                for _ in 0..10 {
                    editor.redo();
                }
                black_box(fixtures::checksum_diagram(editor.diagram()))
            })
        });
    }
    group.finish();

    let mut group = c.benchmark_group("history.drag");
    for case in fixtures::Case::ALL {
        let template = fixtures::fixture(case);

        group.throughput(Throughput::Elements(32));
        group.bench_function(case.id(), |b| {
            b.iter_batched(
                || Editor::with_diagram(EditorConfig::default(), template.clone()),
                |mut editor| {
                    // The hub sits at the origin with the default 120x60 size.
                    editor.pointer_down(1, Point::new(10.0, 10.0));
                    for step in 1..=32_u32 {
                        let offset = f64::from(step) * 4.0;
                        editor.pointer_move(1, Point::new(10.0 + offset, 10.0 + offset / 2.0));
                    }
                    editor.pointer_up(1);
                    black_box(editor.history().len())
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_history
}
criterion_main!(benches);
