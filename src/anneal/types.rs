//! Improvement events and the sink trait that receives them.

use crate::grid::{Grid, ReachMask};

/// Emitted whenever the search finds a new best score.
#[derive(Debug, Clone, PartialEq)]
pub struct ImprovementEvent {
    /// Grid snapshot at the moment of improvement.
    pub grid: Grid,
    /// The new best score.
    pub score: usize,
    /// Tiles credited by the evaluation that produced `score`.
    pub mask: ReachMask,
    /// 1-based count of improvements so far in this run.
    pub attempt: usize,
}

/// Receives improvement events from the annealing loop.
///
/// Called inline from the hot loop, so implementations should hand work off
/// rather than perform I/O themselves. See
/// [`FrameWriter`](crate::render::FrameWriter) for the channel-backed sink.
pub trait ImprovementSink {
    fn on_improvement(&mut self, event: ImprovementEvent);
}

/// Discards every event.
impl ImprovementSink for () {
    fn on_improvement(&mut self, _event: ImprovementEvent) {}
}

/// Collects events in memory.
impl ImprovementSink for Vec<ImprovementEvent> {
    fn on_improvement(&mut self, event: ImprovementEvent) {
        self.push(event);
    }
}

impl<S: ImprovementSink + ?Sized> ImprovementSink for &mut S {
    fn on_improvement(&mut self, event: ImprovementEvent) {
        (**self).on_improvement(event);
    }
}
