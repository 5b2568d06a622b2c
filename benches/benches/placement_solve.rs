// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Rect, Size};

use canopy_placement::{Placement, SolveOptions, solve};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // xorshift64*
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_f491_4f6c_dd1d)
    }

    fn next_f64(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1_u64 << 53) as f64;
        lo + unit * (hi - lo)
    }
}

/// Anchors scattered over (and slightly past) the viewport, so the flip and
/// shift branches are all exercised.
fn gen_anchors(n: usize, viewport: Rect) -> Vec<Rect> {
    let mut rng = Rng::new(0x5eed);
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        let x = rng.next_f64(viewport.x0 - 50.0, viewport.x1 + 50.0);
        let y = rng.next_f64(viewport.y0 - 50.0, viewport.y1 + 50.0);
        let w = rng.next_f64(10.0, 200.0);
        let h = rng.next_f64(10.0, 80.0);
        out.push(Rect::new(x, y, x + w, y + h));
    }
    out
}

fn bench_solve(c: &mut Criterion) {
    let viewport = Rect::new(0.0, 0.0, 1920.0, 1080.0);
    let overlay = Size::new(240.0, 320.0);
    let anchors = gen_anchors(1024, viewport);

    let mut group = c.benchmark_group("placement_solve");
    group.throughput(Throughput::Elements(anchors.len() as u64));

    group.bench_function("bottom_start_plain", |b| {
        let options = SolveOptions {
            flip: false,
            can_leave_viewport: true,
            ..SolveOptions::default()
        };
        b.iter(|| {
            for anchor in &anchors {
                black_box(solve(
                    *anchor,
                    overlay,
                    viewport,
                    Placement::BOTTOM_START,
                    &options,
                ));
            }
        });
    });

    group.bench_function("bottom_start_full_pipeline", |b| {
        let options = SolveOptions {
            gap: 8.0,
            flip: true,
            sync_size: true,
            ..SolveOptions::default()
        };
        b.iter(|| {
            for anchor in &anchors {
                black_box(solve(
                    *anchor,
                    overlay,
                    viewport,
                    Placement::BOTTOM_START,
                    &options,
                ));
            }
        });
    });

    group.bench_function("right_center_flip_shift", |b| {
        let options = SolveOptions {
            gap: 4.0,
            ..SolveOptions::default()
        };
        b.iter(|| {
            for anchor in &anchors {
                black_box(solve(*anchor, overlay, viewport, Placement::RIGHT, &options));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_solve);
criterion_main!(benches);
