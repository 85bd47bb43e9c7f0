// Capture diagnostics — request counters and latency.

pub mod stats;
