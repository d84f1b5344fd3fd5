//! Logical device and its builder

use ash::vk;
use std::collections::BTreeMap;

use crate::error::{ensure_supported, ConstructionError, ConstructionResult, ResourceKind};
use crate::foundation::OpaqueHandle;

use super::backend::{DeviceDescriptor, QueueRequest};
use super::instance::Instance;
use super::physical_device::PhysicalDevice;
use super::queue_family::QueueFamily;

/// Swapchain extension every device is created with
pub const SWAPCHAIN_EXTENSION: &str = "VK_KHR_swapchain";

struct DeviceImpl<'i> {
    instance: &'i Instance,
    handle: vk::Device,
    /// (family index, queue count) for every provisioned family
    provisioned: Vec<(u32, u32)>,
}

impl Drop for DeviceImpl<'_> {
    fn drop(&mut self) {
        let handle = std::mem::replace(&mut self.handle, vk::Device::null());
        if handle != vk::Device::null() {
            self.instance.backend().destroy_device(handle);
            log::debug!("Logical device destroyed");
        }
    }
}

/// Logical device with the queues requested at build time
pub struct Device<'i> {
    inner: OpaqueHandle<DeviceImpl<'i>, 40, 8>,
}

impl Device<'_> {
    /// Number of queues provisioned in `family`, zero if none were requested
    pub fn provisioned_queue_count(&self, family: &QueueFamily) -> u32 {
        self.inner
            .provisioned
            .iter()
            .find(|(index, _)| *index == family.index())
            .map_or(0, |(_, count)| *count)
    }

    /// Raw device handle for the render loop
    pub fn handle(&self) -> vk::Device {
        self.inner.handle
    }

    pub(crate) fn instance(&self) -> &Instance {
        self.inner.instance
    }
}

/// Builder for [`Device`]
///
/// Queue requests are keyed by family; requesting the same family twice
/// replaces the earlier priorities.
#[derive(Default)]
pub struct DeviceBuilder<'i> {
    physical_device: Option<PhysicalDevice<'i>>,
    queues: BTreeMap<QueueFamily, Vec<f32>>,
    extensions: Vec<String>,
}

impl<'i> DeviceBuilder<'i> {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the physical device to open
    pub fn with_physical_device(&mut self, physical_device: &PhysicalDevice<'i>) -> &mut Self {
        self.physical_device = Some(physical_device.clone());
        self
    }

    /// Request one queue per priority from `family`
    pub fn add_queues(&mut self, family: QueueFamily, priorities: &[f32]) -> &mut Self {
        self.queues.insert(family, priorities.to_vec());
        self
    }

    /// Request a device extension on top of the swapchain extension
    pub fn with_extension(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        if !self.extensions.contains(&name) {
            self.extensions.push(name);
        }
        self
    }

    /// Create the device
    pub fn build(&self) -> ConstructionResult<Device<'i>> {
        let physical_device = self.physical_device.as_ref().ok_or(ConstructionError::MissingParameter {
            resource: ResourceKind::Device,
            parameter: "physical device",
        })?;
        if self.queues.is_empty() {
            return Err(ConstructionError::MissingParameter {
                resource: ResourceKind::Device,
                parameter: "queues",
            });
        }
        for (family, priorities) in &self.queues {
            Self::validate_queues(family, priorities)?;
        }

        let mut extensions = vec![SWAPCHAIN_EXTENSION.to_string()];
        for extension in &self.extensions {
            if !extensions.contains(extension) {
                extensions.push(extension.clone());
            }
        }

        let instance = physical_device.instance();
        let supported = instance
            .backend()
            .device_extensions(instance.handle(), physical_device.handle())
            .map_err(|e| ConstructionError::native(ResourceKind::Device, e))?;
        ensure_supported(ResourceKind::Device, "extension", &extensions, &supported)?;

        let descriptor = DeviceDescriptor {
            queues: self
                .queues
                .iter()
                .map(|(family, priorities)| QueueRequest {
                    family_index: family.index(),
                    priorities: priorities.clone(),
                })
                .collect(),
            extensions,
        };

        let handle = instance
            .backend()
            .create_device(instance.handle(), physical_device.handle(), &descriptor)
            .map_err(|e| ConstructionError::native(ResourceKind::Device, e))?;

        log::info!(
            "Created logical device on {} with {} queue family(ies)",
            physical_device.name(),
            descriptor.queues.len()
        );

        let provisioned = descriptor
            .queues
            .iter()
            .map(|request| (request.family_index, request.priorities.len() as u32))
            .collect();

        Ok(Device {
            inner: OpaqueHandle::new(DeviceImpl {
                instance,
                handle,
                provisioned,
            }),
        })
    }

    fn validate_queues(family: &QueueFamily, priorities: &[f32]) -> ConstructionResult<()> {
        let invalid = |reason: String| ConstructionError::InvalidParameter {
            resource: ResourceKind::Device,
            reason,
        };

        if priorities.is_empty() {
            return Err(invalid(format!("queue family {} requested with no priorities", family.index())));
        }
        if priorities.len() > family.queue_count() as usize {
            return Err(invalid(format!(
                "queue family {} offers {} queue(s), {} requested",
                family.index(),
                family.queue_count(),
                priorities.len()
            )));
        }
        if let Some(priority) = priorities.iter().find(|p| !(0.0..=1.0).contains(*p)) {
            return Err(invalid(format!("queue priority {priority} outside [0.0, 1.0]")));
        }
        Ok(())
    }
}
