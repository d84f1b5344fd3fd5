//! Native Vulkan service boundary
//!
//! [`GraphicsBackend`] is the only way the resource wrappers reach the
//! driver. Handles crossing the boundary are plain `ash::vk` handles; the
//! backend keeps whatever dispatch state it needs behind them.

use ash::vk;
use std::rc::Rc;
use thiserror::Error;

/// Vulkan-specific error types
#[derive(Error, Debug)]
pub enum VulkanError {
    /// General Vulkan API error with result code
    #[error("Vulkan API error: {0:?}")]
    Api(vk::Result),

    /// The Vulkan loader could not be found or loaded
    #[error("Failed to load Vulkan: {0}")]
    LoaderUnavailable(String),

    /// A handle that the backend did not create or already destroyed
    #[error("Unknown {0} handle")]
    UnknownHandle(&'static str),

    /// A name that cannot be passed to the driver
    #[error("Invalid name {0:?}")]
    InvalidName(String),
}

/// Result type for Vulkan operations
pub type VulkanResult<T> = Result<T, VulkanError>;

/// Everything needed to create an instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDescriptor {
    /// Application name
    pub application_name: String,
    /// Application version (major, minor, patch)
    pub application_version: (u32, u32, u32),
    /// Engine name
    pub engine_name: String,
    /// Requested API version, see `vk::make_api_version`
    pub api_version: u32,
    /// Extensions to enable
    pub extensions: Vec<String>,
    /// Layers to enable
    pub layers: Vec<String>,
    /// Route validation messages to the log
    pub debug_messenger: bool,
}

/// Queues requested from one queue family
#[derive(Debug, Clone, PartialEq)]
pub struct QueueRequest {
    /// Queue family index
    pub family_index: u32,
    /// One priority per queue
    pub priorities: Vec<f32>,
}

/// Everything needed to create a logical device
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeviceDescriptor {
    /// One request per distinct queue family, in ascending family order
    pub queues: Vec<QueueRequest>,
    /// Extensions to enable
    pub extensions: Vec<String>,
}

/// Cached physical device description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalDeviceProperties {
    /// Device name reported by the driver
    pub name: String,
    /// Integrated, discrete, virtual, CPU or other
    pub device_type: vk::PhysicalDeviceType,
    /// Highest supported API version
    pub api_version: u32,
}

/// Native Vulkan service
///
/// Destroy operations never fail and ignore null or unknown handles.
pub trait GraphicsBackend {
    /// Instance extensions the driver supports
    fn instance_extensions(&self) -> VulkanResult<Vec<String>>;

    /// Instance layers the driver supports
    fn instance_layers(&self) -> VulkanResult<Vec<String>>;

    /// Create an instance
    fn create_instance(&self, descriptor: &InstanceDescriptor) -> VulkanResult<vk::Instance>;

    /// Destroy an instance
    fn destroy_instance(&self, instance: vk::Instance);

    /// Physical devices in driver enumeration order
    fn enumerate_physical_devices(&self, instance: vk::Instance) -> VulkanResult<Vec<vk::PhysicalDevice>>;

    /// Name and type of a physical device
    fn physical_device_properties(
        &self,
        instance: vk::Instance,
        device: vk::PhysicalDevice,
    ) -> VulkanResult<PhysicalDeviceProperties>;

    /// Queue families of a physical device, indexed by position
    fn queue_family_properties(
        &self,
        instance: vk::Instance,
        device: vk::PhysicalDevice,
    ) -> VulkanResult<Vec<vk::QueueFamilyProperties>>;

    /// Whether a queue family can present to a surface
    fn presentation_support(
        &self,
        instance: vk::Instance,
        device: vk::PhysicalDevice,
        family_index: u32,
        surface: vk::SurfaceKHR,
    ) -> VulkanResult<bool>;

    /// Device extensions a physical device supports
    fn device_extensions(&self, instance: vk::Instance, device: vk::PhysicalDevice) -> VulkanResult<Vec<String>>;

    /// Create a logical device
    fn create_device(
        &self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
        descriptor: &DeviceDescriptor,
    ) -> VulkanResult<vk::Device>;

    /// Destroy a logical device
    fn destroy_device(&self, device: vk::Device);

    /// Look up a queue provisioned at device creation
    fn device_queue(&self, device: vk::Device, family_index: u32, queue_index: u32) -> vk::Queue;

    /// Destroy a surface created on `instance`
    fn destroy_surface(&self, instance: vk::Instance, surface: vk::SurfaceKHR);
}

/// Shared handle to the Vulkan backend
pub type Backend = Rc<dyn GraphicsBackend>;
