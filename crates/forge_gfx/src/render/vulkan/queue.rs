//! Device queues

use ash::vk;
use std::marker::PhantomData;

use crate::error::{ConstructionError, ConstructionResult, ResourceKind};
use crate::foundation::OpaqueHandle;

use super::device::Device;
use super::queue_family::QueueFamily;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct QueueImpl<'d> {
    handle: vk::Queue,
    family_index: u32,
    queue_index: u32,
    _device: PhantomData<&'d ()>,
}

/// Queue owned by a logical device
///
/// A view only; the device releases its queues when it is destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Queue<'d> {
    inner: OpaqueHandle<QueueImpl<'d>, 16, 8>,
}

impl<'d> Queue<'d> {
    /// Look up queue `index` of `family` on `device`
    ///
    /// Only queues requested when the device was built exist; anything else
    /// is a [`ConstructionError::ContractViolation`].
    pub fn get(device: &'d Device<'_>, family: &QueueFamily, index: u32) -> ConstructionResult<Self> {
        let provisioned = device.provisioned_queue_count(family);
        if index >= provisioned {
            return Err(ConstructionError::ContractViolation {
                resource: ResourceKind::Queue,
                reason: format!(
                    "queue {index} of family {} requested, {provisioned} provisioned",
                    family.index()
                ),
            });
        }

        let handle = device
            .instance()
            .backend()
            .device_queue(device.handle(), family.index(), index);

        Ok(Self {
            inner: OpaqueHandle::new(QueueImpl {
                handle,
                family_index: family.index(),
                queue_index: index,
                _device: PhantomData,
            }),
        })
    }

    /// Index of the family the queue belongs to
    pub fn family_index(&self) -> u32 {
        self.inner.family_index
    }

    /// Index of the queue within its family
    pub fn index(&self) -> u32 {
        self.inner.queue_index
    }

    /// Raw queue handle for the render loop
    pub fn handle(&self) -> vk::Queue {
        self.inner.handle
    }
}
