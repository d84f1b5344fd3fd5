//! Queue family view

use ash::vk;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use crate::error::{ConstructionError, ConstructionResult, ResourceKind};
use crate::foundation::OpaqueHandle;

use super::physical_device::PhysicalDevice;

#[derive(Clone, Copy, Debug)]
struct QueueFamilyImpl {
    index: u32,
    flags: vk::QueueFlags,
    queue_count: u32,
}

// Identity is the family index; flags and counts are cached properties.
impl PartialEq for QueueFamilyImpl {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for QueueFamilyImpl {}

impl PartialOrd for QueueFamilyImpl {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueFamilyImpl {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index.cmp(&other.index)
    }
}

impl Hash for QueueFamilyImpl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

/// Queue family of a physical device
///
/// Families compare, order and hash by index, so a set of families
/// deduplicates requests that name the same family twice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueueFamily {
    inner: OpaqueHandle<QueueFamilyImpl, 12, 4>,
}

impl QueueFamily {
    /// Queue families of `physical_device`, ordered by index
    pub fn enumerate(physical_device: &PhysicalDevice<'_>) -> ConstructionResult<Vec<Self>> {
        let instance = physical_device.instance();
        let properties = instance
            .backend()
            .queue_family_properties(instance.handle(), physical_device.handle())
            .map_err(|e| ConstructionError::native(ResourceKind::QueueFamily, e))?;

        Ok(properties
            .iter()
            .zip(0_u32..)
            .map(|(family, index)| Self::from_properties(index, family))
            .collect())
    }

    pub(crate) fn from_properties(index: u32, properties: &vk::QueueFamilyProperties) -> Self {
        Self {
            inner: OpaqueHandle::new(QueueFamilyImpl {
                index,
                flags: properties.queue_flags,
                queue_count: properties.queue_count,
            }),
        }
    }

    /// Family index
    pub fn index(&self) -> u32 {
        self.inner.index
    }

    /// Number of queues the family offers
    pub fn queue_count(&self) -> u32 {
        self.inner.queue_count
    }

    /// Capability flags
    pub fn flags(&self) -> vk::QueueFlags {
        self.inner.flags
    }

    /// Whether the family accepts graphics work
    pub fn has_graphics_support(&self) -> bool {
        self.inner.flags.contains(vk::QueueFlags::GRAPHICS)
    }

    /// Whether the family accepts compute work
    pub fn has_compute_support(&self) -> bool {
        self.inner.flags.contains(vk::QueueFlags::COMPUTE)
    }

    /// Whether the family accepts transfer work
    ///
    /// Graphics and compute families support transfers implicitly.
    pub fn has_transfer_support(&self) -> bool {
        self.inner
            .flags
            .intersects(vk::QueueFlags::TRANSFER | vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE)
    }
}
