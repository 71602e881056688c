//! Raw edge events delivered by a scan group

/// Monotonic millisecond timestamp
///
/// Differences are taken with wrapping arithmetic, so a counter that rolls
/// over between two events still yields the right elapsed time.
pub type Millis = u32;

/// Direction of a transition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    Pressed,
    Released,
}

/// One press or release transition on an input of a scan group
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeEvent {
    /// Position of the input inside its scan group
    pub index: usize,
    pub edge: Edge,
    pub timestamp: Millis,
}

impl EdgeEvent {
    pub fn pressed(index: usize, timestamp: Millis) -> Self {
        Self {
            index,
            edge: Edge::Pressed,
            timestamp,
        }
    }

    pub fn released(index: usize, timestamp: Millis) -> Self {
        Self {
            index,
            edge: Edge::Released,
            timestamp,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.edge == Edge::Pressed
    }

    pub fn is_released(&self) -> bool {
        self.edge == Edge::Released
    }
}

/// Time elapsed from `since` to `now`, tolerating counter wraparound
#[inline]
pub(crate) fn elapsed(now: Millis, since: Millis) -> Millis {
    now.wrapping_sub(since)
}
