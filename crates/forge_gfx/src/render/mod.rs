//! Rendering backends
//!
//! Only the Vulkan bootstrap lives here; frame rendering is driven by the
//! application through [`crate::application::RenderContext`].

/// Vulkan instance, surface, device and queue setup
pub mod vulkan;
