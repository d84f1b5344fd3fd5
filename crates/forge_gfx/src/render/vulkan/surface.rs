//! Presentation surface

use ash::vk;
use std::marker::PhantomData;
use std::ptr;

use crate::error::{ConstructionError, ConstructionResult, ResourceKind};
use crate::foundation::OpaqueHandle;
use crate::platform::Window;

use super::instance::Instance;
use super::physical_device::PhysicalDevice;
use super::queue_family::QueueFamily;

struct SurfaceImpl<'a> {
    instance: &'a Instance,
    handle: vk::SurfaceKHR,
    _window: PhantomData<&'a Window>,
}

impl Drop for SurfaceImpl<'_> {
    fn drop(&mut self) {
        let handle = std::mem::replace(&mut self.handle, vk::SurfaceKHR::null());
        if handle != vk::SurfaceKHR::null() {
            self.instance.backend().destroy_surface(self.instance.handle(), handle);
            log::debug!("Surface destroyed");
        }
    }
}

/// Surface binding a window to an instance
///
/// Borrows both, so it is always destroyed before either of them.
pub struct Surface<'a> {
    inner: OpaqueHandle<SurfaceImpl<'a>, 16, 8>,
}

impl Surface<'_> {
    /// Whether `family` of `physical_device` can present to this surface
    pub fn supports_present(
        &self,
        physical_device: &PhysicalDevice<'_>,
        family: &QueueFamily,
    ) -> ConstructionResult<bool> {
        if !ptr::eq(physical_device.instance(), self.inner.instance) {
            return Err(ConstructionError::ContractViolation {
                resource: ResourceKind::Surface,
                reason: format!("{} belongs to a different instance", physical_device.name()),
            });
        }

        self.inner
            .instance
            .backend()
            .presentation_support(
                self.inner.instance.handle(),
                physical_device.handle(),
                family.index(),
                self.inner.handle,
            )
            .map_err(|e| ConstructionError::native(ResourceKind::Surface, e))
    }

    pub(crate) fn handle(&self) -> vk::SurfaceKHR {
        self.inner.handle
    }
}

/// Builder for [`Surface`]
#[derive(Default)]
pub struct SurfaceBuilder<'a> {
    instance: Option<&'a Instance>,
    window: Option<&'a Window>,
}

impl<'a> SurfaceBuilder<'a> {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the instance that will own the surface
    pub fn with_instance(&mut self, instance: &'a Instance) -> &mut Self {
        self.instance = Some(instance);
        self
    }

    /// Set the window to present to
    pub fn with_window(&mut self, window: &'a Window) -> &mut Self {
        self.window = Some(window);
        self
    }

    /// Create the surface through the window toolkit
    pub fn build(&self) -> ConstructionResult<Surface<'a>> {
        let instance = self.instance.ok_or(ConstructionError::MissingParameter {
            resource: ResourceKind::Surface,
            parameter: "instance",
        })?;
        let window = self.window.ok_or(ConstructionError::MissingParameter {
            resource: ResourceKind::Surface,
            parameter: "window",
        })?;

        let handle = window
            .toolkit()
            .create_surface(instance.handle(), window.key())
            .map_err(|e| ConstructionError::native(ResourceKind::Surface, e))?;

        log::info!("Created window surface");

        Ok(Surface {
            inner: OpaqueHandle::new(SurfaceImpl {
                instance,
                handle,
                _window: PhantomData,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{SystemBuilder, WindowBuilder};
    use crate::render::vulkan::InstanceBuilder;
    use crate::testing::{Journal, MockBackend, MockDevice, MockToolkit};
    use std::rc::Rc;

    #[test]
    fn test_surface_is_destroyed_before_instance() {
        let journal = Journal::default();
        let toolkit = Rc::new(MockToolkit::new(&journal));
        let backend = Rc::new(MockBackend::new(&journal));
        let system = SystemBuilder::new(toolkit).build().unwrap();
        let window = WindowBuilder::new().with_system(&system).build().unwrap();

        {
            let instance = InstanceBuilder::new(backend)
                .with_system(&system)
                .with_validation(false)
                .build()
                .unwrap();
            let surface = SurfaceBuilder::new()
                .with_instance(&instance)
                .with_window(&window)
                .build()
                .unwrap();
            assert_ne!(surface.handle(), vk::SurfaceKHR::null());
        }

        let entries = journal.entries();
        let surface = entries.iter().position(|e| e == "destroy_surface").unwrap();
        let instance = entries.iter().position(|e| e == "destroy_instance").unwrap();
        assert!(surface < instance);
    }

    #[test]
    fn test_missing_window_is_rejected() {
        let journal = Journal::default();
        let backend = Rc::new(MockBackend::new(&journal));
        let instance = InstanceBuilder::new(backend).with_validation(false).build().unwrap();

        let error = SurfaceBuilder::new().with_instance(&instance).build().err().unwrap();
        assert!(matches!(
            error,
            ConstructionError::MissingParameter { resource: ResourceKind::Surface, parameter: "window" }
        ));
    }

    #[test]
    fn test_toolkit_failure_is_native_error() {
        let journal = Journal::default();
        let toolkit = Rc::new(MockToolkit::new(&journal).failing_surface_creation());
        let backend = Rc::new(MockBackend::new(&journal));
        let system = SystemBuilder::new(toolkit).build().unwrap();
        let window = WindowBuilder::new().with_system(&system).build().unwrap();
        let instance = InstanceBuilder::new(backend)
            .with_system(&system)
            .with_validation(false)
            .build()
            .unwrap();

        let error = SurfaceBuilder::new()
            .with_instance(&instance)
            .with_window(&window)
            .build()
            .err()
            .unwrap();
        assert!(matches!(error, ConstructionError::Native { resource: ResourceKind::Surface, .. }));
    }

    #[test]
    fn test_presentation_support_follows_backend() {
        let journal = Journal::default();
        let toolkit = Rc::new(MockToolkit::new(&journal));
        let backend = Rc::new(MockBackend::new(&journal).with_device(MockDevice::graphics_without_present("Headless")));
        let system = SystemBuilder::new(toolkit).build().unwrap();
        let window = WindowBuilder::new().with_system(&system).build().unwrap();
        let instance = InstanceBuilder::new(backend)
            .with_system(&system)
            .with_validation(false)
            .build()
            .unwrap();
        let surface = SurfaceBuilder::new()
            .with_instance(&instance)
            .with_window(&window)
            .build()
            .unwrap();

        let device = PhysicalDevice::enumerate(&instance).unwrap().remove(0);
        let family = QueueFamily::enumerate(&device).unwrap()[0];
        assert!(!surface.supports_present(&device, &family).unwrap());
    }
}
