//! Motion scheduler
//!
//! Owns the animation state of every mounted element and advances it once
//! per frame. Elements do not hold their state directly; they hold an
//! `Animated*` wrapper that registers through a weak [`SchedulerHandle`]
//! and removes its state when dropped. Anything that reaches the scheduler
//! for state that is gone (a stale id, an unmounted element, a dropped
//! scheduler) is a no-op.
//!
//! Wrappers may be read or dropped from inside a frame (from a
//! [`VisibilitySource`], say). Reads made then see no state (a counter
//! falls back to its last-known value). Removals are queued until the frame
//! ends.

use std::cell::{Cell, RefCell, RefMut};
use std::ops::Range;
use std::rc::{Rc, Weak};

use assay_core::clock::FrameTick;
use assay_core::events::{FrameEvent, PointerSample};
use assay_core::visibility::{ElementId, VisibilityMap, VisibilitySource};
use slotmap::{new_key_type, SlotMap};

use crate::counter::CounterAnimator;
use crate::looping::LoopingAnimator;
use crate::reveal::RevealState;
use crate::spring::{SpringConfig, Spotlight};
use crate::stagger::{Stagger, StaggerConfig};

new_key_type! {
    /// Handle to a counter in the scheduler
    pub struct CounterId;
    /// Handle to a stagger group in the scheduler
    pub struct StaggerId;
    /// Handle to a pointer spotlight in the scheduler
    pub struct SpotlightId;
    /// Handle to a looping animation in the scheduler
    pub struct LoopId;
}

/// Animation state tagged with the element that owns it
struct Owned<T> {
    element: ElementId,
    state: T,
}

struct SchedulerInner {
    counters: SlotMap<CounterId, Owned<CounterAnimator>>,
    staggers: SlotMap<StaggerId, Owned<Stagger>>,
    spotlights: SlotMap<SpotlightId, Owned<Spotlight>>,
    loops: SlotMap<LoopId, Owned<LoopingAnimator>>,
    visibility: VisibilityMap,
    /// Timestamp of the last frame, used to answer queries between frames
    now: f64,
}

impl SchedulerInner {
    fn advance(&mut self, tick: &FrameTick, visibility: &dyn VisibilitySource) -> bool {
        self.now = tick.now;
        let mut active = false;

        for (_, owned) in self.counters.iter_mut() {
            let visible = visibility.is_visible(owned.element);
            owned.state.tick(visible, tick.now);
            active |= !owned.state.is_finished();
        }

        for (_, owned) in self.staggers.iter_mut() {
            let visible = visibility.is_visible(owned.element);
            owned.state.tick(visible, tick.now);
            active |= !owned.state.is_complete(tick.now);
        }

        for (_, owned) in self.spotlights.iter_mut() {
            owned.state.step(tick.dt);
            active |= !owned.state.is_settled();
        }

        // Loops never finish
        active |= !self.loops.is_empty();

        tracing::trace!(frame = tick.frame, now = tick.now, active, "motion tick");
        active
    }

    fn remove_element(&mut self, element: ElementId) -> usize {
        let before = self.len();
        self.counters.retain(|_, o| o.element != element);
        self.staggers.retain(|_, o| o.element != element);
        self.spotlights.retain(|_, o| o.element != element);
        self.loops.retain(|_, o| o.element != element);
        self.visibility.remove(element);
        before - self.len()
    }

    fn len(&self) -> usize {
        self.counters.len() + self.staggers.len() + self.spotlights.len() + self.loops.len()
    }

    fn release(&mut self, released: Released) {
        match released {
            Released::Counter(id) => {
                self.counters.remove(id);
            }
            Released::Stagger(id) => {
                self.staggers.remove(id);
            }
            Released::Spotlight(id) => {
                self.spotlights.remove(id);
            }
            Released::Loop(id) => {
                self.loops.remove(id);
            }
        }
    }
}

/// State dropped by a wrapper
#[derive(Clone, Copy, Debug)]
enum Released {
    Counter(CounterId),
    Stagger(StaggerId),
    Spotlight(SpotlightId),
    Loop(LoopId),
}

struct Shared {
    state: RefCell<SchedulerInner>,
    /// Removals requested while the state was borrowed by a frame
    deferred: RefCell<Vec<Released>>,
}

impl Shared {
    /// Borrow the state, or `None` when called from inside a frame
    fn state(&self) -> Option<RefMut<'_, SchedulerInner>> {
        match self.state.try_borrow_mut() {
            Ok(state) => Some(state),
            Err(_) => {
                tracing::trace!("scheduler busy, call skipped");
                None
            }
        }
    }

    fn release(&self, released: Released) {
        match self.state.try_borrow_mut() {
            Ok(mut state) => state.release(released),
            Err(_) => self.deferred.borrow_mut().push(released),
        }
    }

    fn apply_deferred(&self, state: &mut SchedulerInner) {
        let deferred = std::mem::take(&mut *self.deferred.borrow_mut());
        if !deferred.is_empty() {
            tracing::debug!(count = deferred.len(), "released state dropped mid-frame");
        }
        for released in deferred {
            state.release(released);
        }
    }
}

/// The scheduler that ticks all element animations
///
/// Single-threaded: it lives on the frame loop's thread and is driven by
/// [`tick`](Self::tick) or [`dispatch`](Self::dispatch).
pub struct MotionScheduler {
    shared: Rc<Shared>,
}

impl MotionScheduler {
    pub fn new() -> Self {
        Self {
            shared: Rc::new(Shared {
                state: RefCell::new(SchedulerInner {
                    counters: SlotMap::with_key(),
                    staggers: SlotMap::with_key(),
                    spotlights: SlotMap::with_key(),
                    loops: SlotMap::with_key(),
                    visibility: VisibilityMap::new(),
                    now: 0.0,
                }),
                deferred: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Weak handle for element wrappers
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Advance every element, using visibility delivered through
    /// [`FrameEvent::Visibility`]
    ///
    /// Returns true while anything still needs frames. A nested call from
    /// inside a frame does nothing and returns false.
    pub fn tick(&self, tick: FrameTick) -> bool {
        let Some(mut guard) = self.shared.state() else {
            return false;
        };
        let inner = &mut *guard;
        let visibility = std::mem::take(&mut inner.visibility);
        let active = inner.advance(&tick, &visibility);
        inner.visibility = visibility;
        self.shared.apply_deferred(inner);
        active
    }

    /// Advance every element, sampling visibility from `source`
    pub fn tick_with(&self, tick: FrameTick, source: &dyn VisibilitySource) -> bool {
        let Some(mut inner) = self.shared.state() else {
            return false;
        };
        let active = inner.advance(&tick, source);
        self.shared.apply_deferred(&mut inner);
        active
    }

    /// Apply a host event
    pub fn dispatch(&self, event: FrameEvent) {
        match event {
            FrameEvent::Tick(tick) => {
                self.tick(tick);
            }
            FrameEvent::Visibility { target, visible } => {
                if let Some(mut inner) = self.shared.state() {
                    inner.visibility.set(target, visible);
                }
            }
            FrameEvent::PointerMove { target, pointer } => {
                let Some(mut inner) = self.shared.state() else {
                    return;
                };
                for (_, owned) in inner.spotlights.iter_mut() {
                    if owned.element == target {
                        owned.state.set_pointer(pointer);
                    }
                }
            }
            FrameEvent::PointerLeave { target } => {
                let Some(mut inner) = self.shared.state() else {
                    return;
                };
                for (_, owned) in inner.spotlights.iter_mut() {
                    if owned.element == target {
                        owned.state.pointer_leave();
                    }
                }
            }
            FrameEvent::Unmount { target } => {
                self.remove_element(target);
            }
        }
    }

    /// Drop every piece of state owned by `element`
    pub fn remove_element(&self, element: ElementId) -> usize {
        let removed = self
            .shared
            .state()
            .map_or(0, |mut inner| inner.remove_element(element));
        if removed > 0 {
            tracing::debug!(element, removed, "released element animations");
        }
        removed
    }

    /// Whether anything still needs frames
    pub fn has_active_animations(&self) -> bool {
        self.read(|inner| {
            let now = inner.now;
            !inner.loops.is_empty()
                || inner.counters.values().any(|o| !o.state.is_finished())
                || inner.staggers.values().any(|o| !o.state.is_complete(now))
                || inner.spotlights.values().any(|o| !o.state.is_settled())
        })
        .unwrap_or(false)
    }

    fn read<R>(&self, f: impl FnOnce(&SchedulerInner) -> R) -> Option<R> {
        let inner = self.shared.state.try_borrow().ok()?;
        Some(f(&inner))
    }

    pub fn counter_count(&self) -> usize {
        self.read(|inner| inner.counters.len()).unwrap_or(0)
    }

    pub fn stagger_count(&self) -> usize {
        self.read(|inner| inner.staggers.len()).unwrap_or(0)
    }

    pub fn spotlight_count(&self) -> usize {
        self.read(|inner| inner.spotlights.len()).unwrap_or(0)
    }

    pub fn loop_count(&self) -> usize {
        self.read(|inner| inner.loops.len()).unwrap_or(0)
    }

    /// Total pieces of element state held
    pub fn len(&self) -> usize {
        self.read(SchedulerInner::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MotionScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// A weak handle to the motion scheduler
///
/// Does not keep the scheduler alive. Every operation on a dead scheduler
/// or a removed id does nothing and returns `None`, as does every query
/// made from inside a frame.
#[derive(Clone)]
pub struct SchedulerHandle {
    shared: Weak<Shared>,
}

impl SchedulerHandle {
    /// A handle that was never attached to a scheduler
    pub fn detached() -> Self {
        Self { shared: Weak::new() }
    }

    pub fn is_alive(&self) -> bool {
        self.shared.strong_count() > 0
    }

    fn with<R>(&self, f: impl FnOnce(&mut SchedulerInner) -> R) -> Option<R> {
        let shared = self.shared.upgrade()?;
        let mut state = shared.state()?;
        let result = f(&mut state);
        Some(result)
    }

    /// Remove state now, or at the end of the current frame
    fn release(&self, released: Released) {
        if let Some(shared) = self.shared.upgrade() {
            shared.release(released);
        }
    }

    /// Timestamp of the scheduler's last frame
    pub fn now(&self) -> Option<f64> {
        self.with(|inner| inner.now)
    }

    // =========================================================================
    // Counters
    // =========================================================================

    pub fn register_counter(&self, element: ElementId, counter: CounterAnimator) -> Option<CounterId> {
        self.with(|inner| inner.counters.insert(Owned { element, state: counter }))
    }

    pub fn counter_value(&self, id: CounterId) -> Option<u64> {
        self.with(|inner| inner.counters.get(id).map(|o| o.state.current()))
            .flatten()
    }

    pub fn is_counter_finished(&self, id: CounterId) -> Option<bool> {
        self.with(|inner| inner.counters.get(id).map(|o| o.state.is_finished()))
            .flatten()
    }

    pub fn remove_counter(&self, id: CounterId) {
        self.release(Released::Counter(id));
    }

    // =========================================================================
    // Stagger groups
    // =========================================================================

    pub fn register_stagger(&self, element: ElementId, stagger: Stagger) -> Option<StaggerId> {
        self.with(|inner| inner.staggers.insert(Owned { element, state: stagger }))
    }

    pub fn stagger_revealed(&self, id: StaggerId) -> Option<Range<usize>> {
        self.with(|inner| inner.staggers.get(id).map(|o| o.state.revealed()))
            .flatten()
    }

    /// Visual state of one item as of the last frame
    pub fn stagger_item_state(&self, id: StaggerId, index: usize) -> Option<RevealState> {
        self.with(|inner| {
            let now = inner.now;
            inner.staggers.get(id).map(|o| o.state.item_state(index, now))
        })
        .flatten()
    }

    pub fn remove_stagger(&self, id: StaggerId) {
        self.release(Released::Stagger(id));
    }

    // =========================================================================
    // Spotlights
    // =========================================================================

    pub fn register_spotlight(&self, element: ElementId, spotlight: Spotlight) -> Option<SpotlightId> {
        self.with(|inner| inner.spotlights.insert(Owned { element, state: spotlight }))
    }

    pub fn set_pointer(&self, id: SpotlightId, pointer: PointerSample) {
        self.with(|inner| {
            if let Some(o) = inner.spotlights.get_mut(id) {
                o.state.set_pointer(pointer);
            }
        });
    }

    pub fn pointer_leave(&self, id: SpotlightId) {
        self.with(|inner| {
            if let Some(o) = inner.spotlights.get_mut(id) {
                o.state.pointer_leave();
            }
        });
    }

    pub fn spotlight_position(&self, id: SpotlightId) -> Option<PointerSample> {
        self.with(|inner| inner.spotlights.get(id).map(|o| o.state.position()))
            .flatten()
    }

    pub fn spotlight_intensity(&self, id: SpotlightId) -> Option<f32> {
        self.with(|inner| inner.spotlights.get(id).map(|o| o.state.intensity()))
            .flatten()
    }

    pub fn remove_spotlight(&self, id: SpotlightId) {
        self.release(Released::Spotlight(id));
    }

    // =========================================================================
    // Loops
    // =========================================================================

    pub fn register_loop(&self, element: ElementId, animator: LoopingAnimator) -> Option<LoopId> {
        self.with(|inner| inner.loops.insert(Owned { element, state: animator }))
    }

    /// Loop value as of the last frame
    pub fn loop_value(&self, id: LoopId) -> Option<f32> {
        self.with(|inner| {
            let now = inner.now;
            inner.loops.get(id).map(|o| o.state.value(now))
        })
        .flatten()
    }

    pub fn remove_loop(&self, id: LoopId) {
        self.release(Released::Loop(id));
    }
}

// ============================================================================
// Element wrappers
// ============================================================================

/// A counter owned by an element
///
/// ```ignore
/// let stat = AnimatedCounter::new(scheduler.handle(), STATS_ID, 1200, 2.0);
/// // every frame, after scheduler.tick(..):
/// label.set_text(stat.display());
/// ```
pub struct AnimatedCounter {
    handle: SchedulerHandle,
    id: Option<CounterId>,
    format: crate::counter::CounterFormat,
    last: Cell<u64>,
}

impl AnimatedCounter {
    pub fn new(handle: SchedulerHandle, element: ElementId, target: u64, duration_secs: f64) -> Self {
        let counter = CounterAnimator::new(target, duration_secs);
        let last = counter.current();
        let id = handle.register_counter(element, counter);
        Self {
            handle,
            id,
            format: Default::default(),
            last: Cell::new(last),
        }
    }

    pub fn with_format(mut self, format: crate::counter::CounterFormat) -> Self {
        self.format = format;
        self
    }

    /// Current value (the last known one once the scheduler is gone)
    pub fn get(&self) -> u64 {
        if let Some(value) = self.id.and_then(|id| self.handle.counter_value(id)) {
            self.last.set(value);
        }
        self.last.get()
    }

    /// Formatted current value
    pub fn display(&self) -> String {
        self.format.format(self.get())
    }

    pub fn is_finished(&self) -> bool {
        self.id
            .and_then(|id| self.handle.is_counter_finished(id))
            .unwrap_or(true)
    }

    pub fn id(&self) -> Option<CounterId> {
        self.id
    }
}

impl Drop for AnimatedCounter {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.handle.remove_counter(id);
        }
    }
}

/// A stagger group owned by an element, with its items
pub struct AnimatedStagger<T> {
    handle: SchedulerHandle,
    id: Option<StaggerId>,
    items: Vec<T>,
}

impl<T> AnimatedStagger<T> {
    pub fn new(handle: SchedulerHandle, element: ElementId, items: Vec<T>, config: StaggerConfig) -> Self {
        let id = handle.register_stagger(element, Stagger::with_config(items.len(), config));
        Self { handle, id, items }
    }

    /// Items revealed as of the last frame
    pub fn revealed(&self) -> &[T] {
        let range = self
            .id
            .and_then(|id| self.handle.stagger_revealed(id))
            .unwrap_or(0..0);
        &self.items[range]
    }

    /// Items with their visual state as of the last frame
    pub fn states(&self) -> Vec<(&T, RevealState)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let state = self
                    .id
                    .and_then(|id| self.handle.stagger_item_state(id, i))
                    .unwrap_or_default();
                (item, state)
            })
            .collect()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn id(&self) -> Option<StaggerId> {
        self.id
    }
}

impl AnimatedStagger<String> {
    /// Word-by-word reveal of `text`
    pub fn words(handle: SchedulerHandle, element: ElementId, text: &str, config: StaggerConfig) -> Self {
        let words = crate::stagger::split_words(text)
            .into_iter()
            .map(str::to_owned)
            .collect();
        Self::new(handle, element, words, config)
    }
}

impl<T> Drop for AnimatedStagger<T> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.handle.remove_stagger(id);
        }
    }
}

/// A pointer spotlight owned by an element
pub struct AnimatedSpotlight {
    handle: SchedulerHandle,
    id: Option<SpotlightId>,
}

impl AnimatedSpotlight {
    pub fn new(handle: SchedulerHandle, element: ElementId, config: SpringConfig) -> Self {
        let id = handle.register_spotlight(element, Spotlight::new(config, PointerSample::default()));
        Self { handle, id }
    }

    /// Feed a raw pointer position; may be called any number of times per frame
    pub fn set_pointer(&self, pointer: PointerSample) {
        if let Some(id) = self.id {
            self.handle.set_pointer(id, pointer);
        }
    }

    pub fn pointer_leave(&self) {
        if let Some(id) = self.id {
            self.handle.pointer_leave(id);
        }
    }

    pub fn position(&self) -> PointerSample {
        self.id
            .and_then(|id| self.handle.spotlight_position(id))
            .unwrap_or_default()
    }

    pub fn intensity(&self) -> f32 {
        self.id
            .and_then(|id| self.handle.spotlight_intensity(id))
            .unwrap_or(0.0)
    }

    pub fn id(&self) -> Option<SpotlightId> {
        self.id
    }
}

impl Drop for AnimatedSpotlight {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.handle.remove_spotlight(id);
        }
    }
}

/// A looping animation owned by an element
pub struct AnimatedLoop {
    handle: SchedulerHandle,
    id: Option<LoopId>,
}

impl AnimatedLoop {
    pub fn new(handle: SchedulerHandle, element: ElementId, animator: LoopingAnimator) -> Self {
        let id = handle.register_loop(element, animator);
        Self { handle, id }
    }

    pub fn get(&self) -> f32 {
        self.id
            .and_then(|id| self.handle.loop_value(id))
            .unwrap_or(0.0)
    }

    pub fn id(&self) -> Option<LoopId> {
        self.id
    }
}

impl Drop for AnimatedLoop {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.handle.remove_loop(id);
        }
    }
}
