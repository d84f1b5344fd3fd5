//! Physical device and queue family selection
//!
//! The first device in enumeration order that satisfies every requirement
//! wins; there is no scoring between suitable devices. Within that device the
//! first family with each capability is chosen independently, so graphics and
//! presentation may land on the same family or on different ones.

use std::collections::BTreeSet;

use crate::error::{ConstructionError, ConstructionResult};

use super::instance::Instance;
use super::physical_device::PhysicalDevice;
use super::queue_family::QueueFamily;
use super::surface::Surface;

/// Capabilities a device must offer to be selected
pub struct DeviceRequirements<'s> {
    /// Require a graphics-capable queue family
    pub graphics: bool,
    /// Require a queue family that can present to this surface
    pub presentation: Option<&'s Surface<'s>>,
    /// Require these device extensions
    pub extensions: Vec<String>,
}

impl Default for DeviceRequirements<'_> {
    fn default() -> Self {
        Self {
            graphics: true,
            presentation: None,
            extensions: Vec::new(),
        }
    }
}

impl<'s> DeviceRequirements<'s> {
    /// Graphics plus presentation to `surface`
    pub fn presenting_to(surface: &'s Surface<'s>) -> Self {
        Self {
            presentation: Some(surface),
            ..Self::default()
        }
    }
}

/// Outcome of [`select_device`]
#[derive(Debug, Clone)]
pub struct DeviceSelection<'i> {
    /// Chosen physical device
    pub physical_device: PhysicalDevice<'i>,
    /// First graphics-capable family, when graphics was required
    pub graphics_family: Option<QueueFamily>,
    /// First family able to present, when presentation was required
    pub present_family: Option<QueueFamily>,
}

impl DeviceSelection<'_> {
    /// Selected families without duplicates, in index order
    pub fn unique_families(&self) -> Vec<QueueFamily> {
        self.graphics_family
            .into_iter()
            .chain(self.present_family)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// First queue family of `physical_device` satisfying `predicate`
pub fn find_queue_family(
    physical_device: &PhysicalDevice<'_>,
    predicate: impl Fn(&QueueFamily) -> bool,
) -> ConstructionResult<QueueFamily> {
    QueueFamily::enumerate(physical_device)?
        .into_iter()
        .find(|family| predicate(family))
        .ok_or_else(|| ConstructionError::NoSuitableQueueFamily {
            device: physical_device.name().to_string(),
        })
}

fn find_present_family(
    physical_device: &PhysicalDevice<'_>,
    surface: &Surface<'_>,
) -> ConstructionResult<Option<QueueFamily>> {
    for family in QueueFamily::enumerate(physical_device)? {
        if surface.supports_present(physical_device, &family)? {
            return Ok(Some(family));
        }
    }
    Ok(None)
}

/// Pick the first physical device of `instance` meeting `requirements`
pub fn select_device<'i>(
    instance: &'i Instance,
    requirements: &DeviceRequirements<'_>,
) -> ConstructionResult<DeviceSelection<'i>> {
    for physical_device in PhysicalDevice::enumerate(instance)? {
        let graphics_family = if requirements.graphics {
            match find_queue_family(&physical_device, QueueFamily::has_graphics_support) {
                Ok(family) => Some(family),
                Err(ConstructionError::NoSuitableQueueFamily { .. }) => {
                    log::debug!("Skipping {}: no graphics queue family", physical_device.name());
                    continue;
                }
                Err(e) => return Err(e),
            }
        } else {
            None
        };

        let present_family = match requirements.presentation {
            Some(surface) => match find_present_family(&physical_device, surface)? {
                Some(family) => Some(family),
                None => {
                    log::debug!("Skipping {}: cannot present to the surface", physical_device.name());
                    continue;
                }
            },
            None => None,
        };

        if !requirements.extensions.is_empty() {
            let supported = physical_device.supported_extensions()?;
            if let Some(missing) = requirements.extensions.iter().find(|e| !supported.contains(*e)) {
                log::debug!("Skipping {}: missing extension {missing}", physical_device.name());
                continue;
            }
        }

        log::info!("Selected GPU: {}", physical_device.name());
        return Ok(DeviceSelection {
            physical_device,
            graphics_family,
            present_family,
        });
    }

    Err(ConstructionError::NoSuitableDevice)
}
