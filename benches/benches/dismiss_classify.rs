// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use canopy_dismiss::{DismissRegistry, Marker};

/// A chain of nested popovers: each anchored inside the previous one's
/// content, all open and closable.
fn build_chain(depth: u32) -> DismissRegistry<u32> {
    let mut registry = DismissRegistry::new();
    for i in 0..depth {
        let parent = i.checked_sub(1);
        registry.register(i, parent);
        registry.set_state(i, true, true);
    }
    registry
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("dismiss_classify");

    for depth in [4_u32, 16, 64] {
        let registry = build_chain(depth);
        // Click inside the innermost popover's content.
        let innermost: Vec<Marker<u32>> = (0..depth)
            .rev()
            .map(Marker::Scope)
            .collect();
        group.throughput(Throughput::Elements(u64::from(depth)));
        group.bench_function(format!("innermost_content_depth_{depth}"), |b| {
            b.iter(|| black_box(registry.classify(black_box(&innermost))));
        });
        group.bench_function(format!("document_click_depth_{depth}"), |b| {
            b.iter(|| black_box(registry.classify(&[])));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_classify);
criterion_main!(benches);
