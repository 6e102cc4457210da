//! Integration tests for clock + visibility + motion scheduler
//!
//! These tests drive a whole page the way a host would:
//! - A manual clock stands in for the display's frame callback
//! - Visibility arrives as events, or is sampled from viewport geometry
//! - Element wrappers read their state back after every frame

use assay_animation::{
    AnimatedCounter, AnimatedLoop, AnimatedSpotlight, AnimatedStagger, CounterFormat,
    LoopingAnimator, MotionScheduler, RevealState, SpringConfig, StaggerConfig,
};
use assay_core::clock::{FrameTicker, ManualClock};
use assay_core::events::{FrameEvent, PointerSample};
use assay_core::geometry::Rect;
use assay_core::visibility::{ElementId, ViewportOptions};

const STATS: ElementId = 1;
const FEATURES: ElementId = 2;
const HERO: ElementId = 3;
const BADGE: ElementId = 4;

/// A counter stays at zero until its section scrolls into view, then
/// reaches the target exactly at the end of its duration
#[test]
fn test_counter_starts_on_first_sight() {
    let scheduler = MotionScheduler::new();
    let mut ticker = FrameTicker::new(ManualClock::new());
    let counter = AnimatedCounter::new(scheduler.handle(), STATS, 100, 2.0);

    // One second offscreen
    for _ in 0..60 {
        scheduler.tick(ticker.tick());
        ticker.clock().advance(1.0 / 60.0);
    }
    assert_eq!(counter.get(), 0);

    scheduler.dispatch(FrameEvent::Visibility {
        target: STATS,
        visible: true,
    });

    let mut previous = 0;
    let mut reached_at = None;
    for frame in 0..=150 {
        scheduler.tick(ticker.tick());
        let value = counter.get();
        assert!(value >= previous, "counter went backwards");
        assert!(value <= 100);
        if value == 100 && reached_at.is_none() {
            reached_at = Some(frame);
        }
        previous = value;
        ticker.clock().advance(1.0 / 60.0);
    }

    // 2s at 60Hz: the target shows on the frame 120 ticks after the latch
    let reached_at = reached_at.expect("counter never finished");
    assert!((119..=121).contains(&reached_at), "finished at frame {reached_at}");
    assert!(counter.is_finished());
}

/// Scrolling away does not reset or pause a running counter
#[test]
fn test_counter_ignores_leaving_viewport() {
    let scheduler = MotionScheduler::new();
    let counter = AnimatedCounter::new(scheduler.handle(), STATS, 1200, 1.0)
        .with_format(CounterFormat::new().separator(',').suffix("+"));
    let mut ticker = FrameTicker::new(ManualClock::new());

    scheduler.dispatch(FrameEvent::Visibility {
        target: STATS,
        visible: true,
    });
    scheduler.tick(ticker.tick());

    scheduler.dispatch(FrameEvent::Visibility {
        target: STATS,
        visible: false,
    });
    ticker.clock().advance(0.5);
    scheduler.tick(ticker.tick());
    assert_eq!(counter.get(), 600);

    ticker.clock().advance(0.5);
    scheduler.tick(ticker.tick());
    assert_eq!(counter.display(), "1,200+");
}

/// A feature grid reveals card by card once it crosses the viewport
#[test]
fn test_stagger_from_viewport_geometry() {
    let scheduler = MotionScheduler::new();
    let mut ticker = FrameTicker::new(ManualClock::new());
    let cards = AnimatedStagger::new(
        scheduler.handle(),
        FEATURES,
        vec!["Speed", "Accuracy", "Scale", "Support"],
        StaggerConfig::new(0.1),
    );

    let grid = Rect::new(0.0, 900.0, 800.0, 400.0);
    let options = ViewportOptions::default().amount(0.25);
    let mut scroll = 0.0f32;
    let mut first_seen = None;

    for _ in 0..120 {
        let viewport = Rect::new(0.0, scroll, 800.0, 600.0);
        let visible = |id: ElementId| id == FEATURES && options.is_visible(&grid, &viewport);
        let tick = ticker.tick();
        scheduler.tick_with(tick, &visible);
        if first_seen.is_none() && !cards.revealed().is_empty() {
            first_seen = Some(tick.now);
        }
        scroll += 10.0;
        ticker.clock().advance(1.0 / 60.0);
    }

    assert!(first_seen.is_some());
    assert_eq!(cards.revealed(), cards.items());

    let states = cards.states();
    assert!(states.iter().all(|(_, state)| state.is_revealed()));
}

/// A heading reveals word by word; whitespace never produces empty words
#[test]
fn test_word_by_word_heading() {
    let scheduler = MotionScheduler::new();
    let heading = AnimatedStagger::words(
        scheduler.handle(),
        HERO,
        "Measure what  matters",
        StaggerConfig::new(0.08).item_duration(0.3),
    );
    assert_eq!(heading.items(), ["Measure", "what", "matters"]);

    let clock = ManualClock::new();
    let mut ticker = FrameTicker::new(&clock);
    scheduler.dispatch(FrameEvent::Visibility {
        target: HERO,
        visible: true,
    });

    scheduler.tick(ticker.tick());
    assert_eq!(heading.revealed(), ["Measure"]);

    clock.set(0.1);
    scheduler.tick(ticker.tick());
    assert_eq!(heading.revealed(), ["Measure", "what"]);
    assert!(matches!(
        heading.states()[1].1,
        RevealState::Revealing { .. }
    ));

    clock.set(1.0);
    scheduler.tick(ticker.tick());
    assert!(heading
        .states()
        .iter()
        .all(|(_, state)| *state == RevealState::Revealed));
}

/// The spotlight follows the pointer smoothly and fades out on leave
#[test]
fn test_spotlight_follows_pointer() {
    let scheduler = MotionScheduler::new();
    let spotlight = AnimatedSpotlight::new(scheduler.handle(), HERO, SpringConfig::new(200.0, 30.0));
    let mut ticker = FrameTicker::new(ManualClock::new());

    scheduler.tick(ticker.tick());
    scheduler.dispatch(FrameEvent::PointerMove {
        target: HERO,
        pointer: PointerSample::new(100.0, 100.0),
    });

    let mut last_x = 0.0;
    for _ in 0..60 {
        ticker.clock().advance(1.0 / 60.0);
        scheduler.tick(ticker.tick());
        let x = spotlight.position().x;
        assert!(x.is_finite());
        assert!(x >= last_x - 0.5, "spotlight jittered backwards");
        last_x = x;
    }
    let at = spotlight.position();
    assert!((at.x - 100.0).abs() < 1.0 && (at.y - 100.0).abs() < 1.0);

    scheduler.dispatch(FrameEvent::PointerLeave { target: HERO });
    for _ in 0..120 {
        ticker.clock().advance(1.0 / 60.0);
        scheduler.tick(ticker.tick());
    }
    assert!(spotlight.intensity() < 0.01);
}

/// Loops are a pure function of the clock, whatever the frame pacing
#[test]
fn test_loop_independent_of_frame_rate() {
    let smooth = MotionScheduler::new();
    let choppy = MotionScheduler::new();
    let a = AnimatedLoop::new(smooth.handle(), BADGE, LoopingAnimator::spin(3.0));
    let b = AnimatedLoop::new(choppy.handle(), BADGE, LoopingAnimator::spin(3.0));

    let mut smooth_ticker = FrameTicker::new(ManualClock::new());
    for _ in 0..=240 {
        smooth.tick(smooth_ticker.tick());
        smooth_ticker.clock().advance(1.0 / 120.0);
    }

    let mut choppy_ticker = FrameTicker::new(ManualClock::starting_at(0.5));
    choppy.tick(choppy_ticker.tick());
    choppy_ticker.clock().set(2.0);
    choppy.tick(choppy_ticker.tick());

    assert!((a.get() - b.get()).abs() < 1e-3);
    assert!((a.get() - 240.0).abs() < 1e-3);
}

/// Unmounting a section releases all of its state and nothing fires later
#[test]
fn test_unmount_releases_everything() {
    let scheduler = MotionScheduler::new();
    let handle = scheduler.handle();
    let counter = AnimatedCounter::new(handle.clone(), STATS, 50, 1.0);
    let cards = AnimatedStagger::new(handle.clone(), STATS, vec![1, 2, 3], StaggerConfig::default());
    let _badge = AnimatedLoop::new(handle.clone(), BADGE, LoopingAnimator::pulse_opacity(2.0));
    assert_eq!(scheduler.len(), 3);

    scheduler.dispatch(FrameEvent::Visibility {
        target: STATS,
        visible: true,
    });
    scheduler.dispatch(FrameEvent::Unmount { target: STATS });
    assert_eq!(scheduler.len(), 1);

    let mut ticker = FrameTicker::new(ManualClock::new());
    for _ in 0..120 {
        scheduler.tick(ticker.tick());
        ticker.clock().advance(1.0 / 60.0);
    }
    assert_eq!(counter.get(), 0);
    assert!(cards.revealed().is_empty());

    drop(counter);
    drop(cards);
    assert_eq!(scheduler.len(), 1);
    assert!(scheduler.has_active_animations());
}
