use crate::geom::Rect;

/// Push/pop stack of clip rectangles.
///
/// The active clip is `None` when unclipped. Pushes and pops are expected to
/// balance within a frame; popping an empty stack restores the unclipped
/// state instead of faulting, so a producer that over-pops degrades to
/// "no clip" rather than crashing.
///
/// Setting a clip never flushes by itself. The pending snapshot compares its
/// recorded clip against [`active`](Self::active) on the next push, so
/// redundant `set` calls (same rect) cannot cause spurious packet splits.
#[derive(Debug, Default)]
pub struct ClipStack {
    saved: Vec<Option<Rect>>,
    active: Option<Rect>,
}

impl ClipStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears everything; called at frame boundaries.
    pub fn reset(&mut self) {
        self.saved.clear();
        self.active = None;
    }

    #[inline]
    pub fn active(&self) -> Option<Rect> {
        self.active
    }

    /// Replaces the active clip.
    pub fn set(&mut self, rect: Rect) {
        self.active = Some(rect);
    }

    /// Removes any active clip.
    pub fn remove(&mut self) {
        self.active = None;
    }

    /// Intersects `rect` with the current clip, or with `target_bounds` when
    /// no clip is set, and makes the result active.
    ///
    /// A disjoint intersection produces a zero-area clip; subsequent draws
    /// under it are discarded at flush time.
    pub fn intersect(&mut self, rect: Rect, target_bounds: Rect) {
        let base = self.active.unwrap_or(target_bounds);
        self.active = Some(base.intersect(rect).unwrap_or(Rect::empty()));
    }

    /// Saves the active clip for a nested scope.
    pub fn push(&mut self) {
        self.saved.push(self.active);
    }

    /// Restores the clip saved by the matching [`push`](Self::push).
    ///
    /// An unbalanced pop resets to "no clip".
    pub fn pop(&mut self) {
        self.active = self.saved.pop().unwrap_or(None);
    }
}
