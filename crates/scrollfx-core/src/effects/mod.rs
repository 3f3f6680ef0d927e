//! Composite effects
//!
//! Each effect is a constructor on [`ScrollEngine`](crate::ScrollEngine)
//! that wires triggers, animations, timers and smooth scrolls together.
//! None of them reach past the host traits.

pub mod horizontal;
pub mod markers;
pub mod parallax;
pub mod pin;
pub mod progress;
pub mod reveal;
pub mod scroll_to;
pub mod sticky;
pub mod timeline;

pub use horizontal::{HorizontalHandle, HorizontalOptions, HorizontalTarget};
pub use markers::Markers;
pub use parallax::{Anchor, Axis, ParallaxLayer, ParallaxOptions};
pub use pin::{PinDuration, PinHandle, PinOptions, PinPhase};
pub use progress::{ProgressHandle, ProgressOptions, ProgressPosition};
pub use reveal::{Origin, RevealOptions};
pub use scroll_to::{ScrollHandle, ScrollTarget, ScrollTo};
pub use sticky::{HeaderState, HeaderStateMachine, StickyHandle, StickyOptions};
pub use timeline::{
    PlayOptions, Position, Timeline, TimelineId, TimelineItem, TimelineOptions, TimelineTween,
};

use crate::value::format_number;

/// `12.5` -> `"12.5px"`
pub(crate) fn px(n: f64) -> String {
    format!("{}px", format_number(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_px() {
        assert_eq!(px(12.5), "12.5px");
        assert_eq!(px(-0.0), "0px");
    }
}
