//! Schedule calculation.
//!
//! Everything here is a pure function of settings, history and the current
//! time. Nothing fails: bad input degrades to interval behaviour.

mod calculator;
mod jitter;
mod timeline;

pub use calculator::{next_for_schedule, next_trigger_at};
pub use jitter::{jitter_offset_minutes, jittered_minutes, splitmix64};
pub use timeline::{build_timeline_preview, TimelineEntry};
