//! Physical device view

use ash::vk;
use std::fmt;

use crate::error::{ConstructionError, ConstructionResult, ResourceKind};
use crate::foundation::OpaqueHandle;

use super::backend::{PhysicalDeviceProperties, VulkanError};
use super::instance::Instance;

#[derive(Clone)]
struct PhysicalDeviceImpl<'i> {
    instance: &'i Instance,
    handle: vk::PhysicalDevice,
    properties: PhysicalDeviceProperties,
}

/// Non-owning view of a GPU reported by an instance
///
/// Name, type and API version are read once at enumeration. The view is only
/// valid while its instance is alive.
#[derive(Clone)]
pub struct PhysicalDevice<'i> {
    inner: OpaqueHandle<PhysicalDeviceImpl<'i>, 48, 8>,
}

impl<'i> PhysicalDevice<'i> {
    /// Physical devices of `instance` in driver enumeration order
    pub fn enumerate(instance: &'i Instance) -> ConstructionResult<Vec<Self>> {
        let backend = instance.backend();
        let native = |e: VulkanError| ConstructionError::native(ResourceKind::PhysicalDevice, e);

        let handles = backend.enumerate_physical_devices(instance.handle()).map_err(native)?;
        let devices = handles
            .into_iter()
            .map(|handle| {
                let properties = backend
                    .physical_device_properties(instance.handle(), handle)
                    .map_err(native)?;
                Ok(Self {
                    inner: OpaqueHandle::new(PhysicalDeviceImpl {
                        instance,
                        handle,
                        properties,
                    }),
                })
            })
            .collect::<ConstructionResult<Vec<_>>>()?;

        log::debug!("Found {} physical device(s)", devices.len());
        Ok(devices)
    }

    /// Device name reported by the driver
    pub fn name(&self) -> &str {
        &self.inner.properties.name
    }

    /// Integrated, discrete, virtual, CPU or other
    pub fn device_type(&self) -> vk::PhysicalDeviceType {
        self.inner.properties.device_type
    }

    /// Highest Vulkan version the device supports, see `vk::api_version_major`
    pub fn api_version(&self) -> u32 {
        self.inner.properties.api_version
    }

    /// Device extensions the driver reports for this device
    pub fn supported_extensions(&self) -> ConstructionResult<Vec<String>> {
        self.instance()
            .backend()
            .device_extensions(self.instance().handle(), self.handle())
            .map_err(|e| ConstructionError::native(ResourceKind::PhysicalDevice, e))
    }

    pub(crate) fn handle(&self) -> vk::PhysicalDevice {
        self.inner.handle
    }

    pub(crate) fn instance(&self) -> &'i Instance {
        self.inner.instance
    }
}

impl fmt::Debug for PhysicalDevice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version = self.api_version();
        f.debug_struct("PhysicalDevice")
            .field("name", &self.name())
            .field("device_type", &self.device_type())
            .field(
                "api_version",
                &format_args!(
                    "{}.{}.{}",
                    vk::api_version_major(version),
                    vk::api_version_minor(version),
                    vk::api_version_patch(version)
                ),
            )
            .finish()
    }
}
