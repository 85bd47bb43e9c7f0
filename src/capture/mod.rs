// Capture pipeline — decode, align, coordinate, and publish.

pub mod align;
pub mod coordinator;
pub mod decode;
pub mod error;
pub mod orientation;
pub mod result;
pub mod thumbnail;
