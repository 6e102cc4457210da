//! Benchmarks for per-frame motion work

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use assay_animation::{
    AnimatedCounter, AnimatedLoop, AnimatedSpotlight, LoopingAnimator, MotionScheduler,
    SpringConfig, SpringSmoother,
};
use assay_core::clock::FrameTick;
use assay_core::events::{FrameEvent, PointerSample};
use assay_core::visibility::AlwaysVisible;

fn bench_spring_step(c: &mut Criterion) {
    let mut spring = SpringSmoother::new(SpringConfig::spotlight(), 0.0);

    c.bench_function("spring_step_60hz", |b| {
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            spring.set_raw(if flip { 400.0 } else { 0.0 });
            black_box(spring.step(black_box(1.0 / 60.0)))
        })
    });
}

fn bench_spring_long_gap(c: &mut Criterion) {
    let mut spring = SpringSmoother::new(SpringConfig::gentle(), 0.0);

    c.bench_function("spring_step_long_gap", |b| {
        b.iter(|| {
            spring.set_raw(black_box(250.0));
            black_box(spring.step(black_box(1.5)))
        })
    });
}

fn bench_scheduler_tick(c: &mut Criterion) {
    let scheduler = MotionScheduler::new();
    let handle = scheduler.handle();

    let mut owned = Vec::new();
    for element in 0..64u64 {
        owned.push((
            AnimatedCounter::new(handle.clone(), element, 10_000, 2.0),
            AnimatedSpotlight::new(handle.clone(), element, SpringConfig::spotlight()),
            AnimatedLoop::new(handle.clone(), element, LoopingAnimator::spin(8.0)),
        ));
        scheduler.dispatch(FrameEvent::PointerMove {
            target: element,
            pointer: PointerSample::new(120.0, 80.0),
        });
    }

    c.bench_function("scheduler_tick_64_elements", |b| {
        let mut frame = 0u64;
        b.iter(|| {
            frame += 1;
            let tick = FrameTick {
                now: frame as f64 / 60.0,
                dt: 1.0 / 60.0,
                frame,
            };
            black_box(scheduler.tick_with(tick, &AlwaysVisible))
        })
    });

    drop(owned);
}

criterion_group!(
    benches,
    bench_spring_step,
    bench_spring_long_gap,
    bench_scheduler_tick
);
criterion_main!(benches);
