//! Small runtime utilities.

/// Frame rate tracking and periodic performance reports.
pub mod frame_timing;
