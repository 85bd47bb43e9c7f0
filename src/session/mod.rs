// AR session boundary — capture requests, scene depth, and orientation.

pub mod api;
pub mod error;
pub mod simulated;
pub mod types;
