//! Foundation utilities shared by every engine layer

pub mod logging;
pub mod opaque;

pub use opaque::OpaqueHandle;
