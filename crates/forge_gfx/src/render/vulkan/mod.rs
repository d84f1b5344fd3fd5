//! Vulkan backend
//!
//! Resources are built leaves first, each from the one before it:
//! [`Instance`] → [`Surface`] → [`PhysicalDevice`] / [`QueueFamily`]
//! (selection) → [`Device`] → [`Queue`]. Borrowing enforces teardown order:
//! surfaces, physical devices and devices cannot outlive their instance, and
//! queues cannot outlive their device.

pub mod ash_backend;
pub mod backend;
pub mod device;
pub mod instance;
pub mod physical_device;
pub mod queue;
pub mod queue_family;
pub mod selection;
pub mod surface;

pub use ash_backend::AshBackend;
pub use backend::{
    Backend, DeviceDescriptor, GraphicsBackend, InstanceDescriptor, PhysicalDeviceProperties, QueueRequest,
    VulkanError, VulkanResult,
};
pub use device::{Device, DeviceBuilder, SWAPCHAIN_EXTENSION};
pub use instance::{Instance, InstanceBuilder, DEBUG_UTILS_EXTENSION, VALIDATION_LAYER};
pub use physical_device::PhysicalDevice;
pub use queue::Queue;
pub use queue_family::QueueFamily;
pub use selection::{find_queue_family, select_device, DeviceRequirements, DeviceSelection};
pub use surface::{Surface, SurfaceBuilder};
