//! Vulkan instance wrapper

use ash::vk;
use std::rc::Rc;

use crate::error::{ensure_supported, ConstructionError, ConstructionResult, ResourceKind};
use crate::foundation::OpaqueHandle;
use crate::platform::System;

use super::backend::{Backend, InstanceDescriptor};

/// Khronos validation layer
pub const VALIDATION_LAYER: &str = "VK_LAYER_KHRONOS_validation";

/// Debug messenger extension, enabled alongside validation when available
pub const DEBUG_UTILS_EXTENSION: &str = "VK_EXT_debug_utils";

const ENGINE_NAME: &str = "Forge";

struct InstanceImpl {
    backend: Backend,
    handle: vk::Instance,
    extensions: Vec<String>,
    layers: Vec<String>,
}

impl Drop for InstanceImpl {
    fn drop(&mut self) {
        let handle = std::mem::replace(&mut self.handle, vk::Instance::null());
        if handle != vk::Instance::null() {
            self.backend.destroy_instance(handle);
            log::debug!("Vulkan instance destroyed");
        }
    }
}

/// Root owner of the Vulkan context
///
/// Surfaces, physical devices and logical devices borrow the instance, so it
/// can only drop after all of them.
pub struct Instance {
    inner: OpaqueHandle<InstanceImpl, 72, 8>,
}

impl Instance {
    /// Extensions the instance was created with
    pub fn enabled_extensions(&self) -> &[String] {
        &self.inner.extensions
    }

    /// Layers the instance was created with
    pub fn enabled_layers(&self) -> &[String] {
        &self.inner.layers
    }

    /// Whether the validation layer is active
    pub fn validation_enabled(&self) -> bool {
        self.inner.layers.iter().any(|layer| layer == VALIDATION_LAYER)
    }

    pub(crate) fn handle(&self) -> vk::Instance {
        self.inner.handle
    }

    pub(crate) fn backend(&self) -> &Backend {
        &self.inner.backend
    }
}

/// Builder for [`Instance`]
///
/// Without a system the instance is headless and only the extra extensions
/// are enabled.
pub struct InstanceBuilder<'s> {
    backend: Backend,
    system: Option<&'s System>,
    application_name: String,
    application_version: (u32, u32, u32),
    validation: Option<bool>,
    extensions: Vec<String>,
}

impl<'s> InstanceBuilder<'s> {
    /// Create a builder for the given backend
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            system: None,
            application_name: "Forge".to_string(),
            application_version: (0, 1, 0),
            validation: None,
            extensions: Vec::new(),
        }
    }

    /// Enable the extensions the window toolkit needs for presentation
    pub fn with_system(&mut self, system: &'s System) -> &mut Self {
        self.system = Some(system);
        self
    }

    /// Set the application name reported to the driver
    pub fn with_application_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.application_name = name.into();
        self
    }

    /// Set the application version reported to the driver
    pub fn with_application_version(&mut self, major: u32, minor: u32, patch: u32) -> &mut Self {
        self.application_version = (major, minor, patch);
        self
    }

    /// Require (`true`) or disable (`false`) the validation layer
    ///
    /// Left unset, validation is enabled in debug builds when the layer is
    /// installed.
    pub fn with_validation(&mut self, enabled: bool) -> &mut Self {
        self.validation = Some(enabled);
        self
    }

    /// Request an additional instance extension
    pub fn with_extension(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        if !self.extensions.contains(&name) {
            self.extensions.push(name);
        }
        self
    }

    /// Create the instance
    pub fn build(&self) -> ConstructionResult<Instance> {
        let mut extensions = match self.system {
            Some(system) => system
                .required_instance_extensions()
                .map_err(|e| ConstructionError::native(ResourceKind::Instance, e))?,
            None => Vec::new(),
        };
        for extension in &self.extensions {
            if !extensions.contains(extension) {
                extensions.push(extension.clone());
            }
        }

        let supported_extensions = self
            .backend
            .instance_extensions()
            .map_err(|e| ConstructionError::native(ResourceKind::Instance, e))?;
        ensure_supported(ResourceKind::Instance, "extension", &extensions, &supported_extensions)?;

        let mut layers = Vec::new();
        let mut debug_messenger = false;
        if self.validation_requested()? {
            layers.push(VALIDATION_LAYER.to_string());
            if supported_extensions.iter().any(|e| e == DEBUG_UTILS_EXTENSION) {
                if !extensions.iter().any(|e| e == DEBUG_UTILS_EXTENSION) {
                    extensions.push(DEBUG_UTILS_EXTENSION.to_string());
                }
                debug_messenger = cfg!(debug_assertions);
            }
        }

        let descriptor = InstanceDescriptor {
            application_name: self.application_name.clone(),
            application_version: self.application_version,
            engine_name: ENGINE_NAME.to_string(),
            api_version: vk::API_VERSION_1_0,
            extensions,
            layers,
            debug_messenger,
        };

        let handle = self
            .backend
            .create_instance(&descriptor)
            .map_err(|e| ConstructionError::native(ResourceKind::Instance, e))?;

        log::info!(
            "Created Vulkan instance for \"{}\" ({} extensions, validation {})",
            descriptor.application_name,
            descriptor.extensions.len(),
            if descriptor.layers.is_empty() { "off" } else { "on" }
        );
        for extension in &descriptor.extensions {
            log::debug!("  instance extension: {extension}");
        }

        Ok(Instance {
            inner: OpaqueHandle::new(InstanceImpl {
                backend: Rc::clone(&self.backend),
                handle,
                extensions: descriptor.extensions,
                layers: descriptor.layers,
            }),
        })
    }

    fn validation_requested(&self) -> ConstructionResult<bool> {
        let layers = |builder: &Self| {
            builder
                .backend
                .instance_layers()
                .map_err(|e| ConstructionError::native(ResourceKind::Instance, e))
        };

        match self.validation {
            Some(false) => Ok(false),
            Some(true) => {
                ensure_supported(ResourceKind::Instance, "layer", &[VALIDATION_LAYER], &layers(self)?)?;
                Ok(true)
            }
            None if cfg!(debug_assertions) => {
                let available = layers(self)?.iter().any(|layer| layer == VALIDATION_LAYER);
                if !available {
                    log::warn!("{VALIDATION_LAYER} not installed, continuing without validation");
                }
                Ok(available)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::SystemBuilder;
    use crate::testing::{Journal, MockBackend, MockToolkit};

    #[test]
    fn test_instance_enables_toolkit_extensions() {
        let journal = Journal::default();
        let toolkit = Rc::new(MockToolkit::new(&journal));
        let system = SystemBuilder::new(toolkit).build().unwrap();
        let backend = Rc::new(MockBackend::new(&journal));

        let instance = InstanceBuilder::new(backend.clone())
            .with_system(&system)
            .with_validation(false)
            .with_application_name("Test")
            .build()
            .unwrap();

        let descriptor = backend.last_instance_descriptor().unwrap();
        assert_eq!(descriptor.application_name, "Test");
        assert_eq!(descriptor.extensions, MockToolkit::REQUIRED_EXTENSIONS);
        assert_eq!(instance.enabled_extensions(), MockToolkit::REQUIRED_EXTENSIONS);
        assert!(!instance.validation_enabled());
    }

    #[test]
    fn test_unsupported_toolkit_extension_fails_before_creation() {
        let journal = Journal::default();
        let toolkit = Rc::new(MockToolkit::new(&journal));
        let system = SystemBuilder::new(toolkit).build().unwrap();
        let backend = Rc::new(MockBackend::new(&journal).with_instance_extensions(&["VK_KHR_surface"]));

        let error = InstanceBuilder::new(backend.clone())
            .with_system(&system)
            .build()
            .err()
            .unwrap();

        assert!(matches!(
            error,
            ConstructionError::UnsupportedCapability { resource: ResourceKind::Instance, .. }
        ));
        assert_eq!(backend.live_instances(), 0);
        assert!(!journal.entries().contains(&"create_instance".to_string()));
    }

    #[test]
    fn test_required_validation_needs_layer() {
        let journal = Journal::default();
        let backend = Rc::new(MockBackend::new(&journal).with_instance_layers(&[]));

        let error = InstanceBuilder::new(backend).with_validation(true).build().err().unwrap();
        assert_eq!(
            error.to_string(),
            "instance: required layer VK_LAYER_KHRONOS_validation not supported"
        );
    }

    #[test]
    fn test_validation_enables_layer_and_debug_utils() {
        let journal = Journal::default();
        let backend = Rc::new(MockBackend::new(&journal));

        let instance = InstanceBuilder::new(backend.clone())
            .with_validation(true)
            .build()
            .unwrap();

        assert!(instance.validation_enabled());
        assert_eq!(instance.enabled_layers(), [VALIDATION_LAYER]);
        assert!(instance.enabled_extensions().iter().any(|e| e == DEBUG_UTILS_EXTENSION));
    }

    #[test]
    fn test_extra_extensions_are_deduplicated() {
        let journal = Journal::default();
        let backend = Rc::new(MockBackend::new(&journal));

        let instance = InstanceBuilder::new(backend)
            .with_validation(false)
            .with_extension("VK_KHR_surface")
            .with_extension("VK_KHR_surface")
            .build()
            .unwrap();

        assert_eq!(instance.enabled_extensions(), ["VK_KHR_surface"]);
    }

    #[test]
    fn test_native_failure_is_wrapped() {
        let journal = Journal::default();
        let backend = Rc::new(MockBackend::new(&journal).failing_instance_creation());

        let error = InstanceBuilder::new(backend).with_validation(false).build().err().unwrap();
        assert!(matches!(error, ConstructionError::Native { resource: ResourceKind::Instance, .. }));
    }

    #[test]
    fn test_repeated_build_creates_independent_instances() {
        let journal = Journal::default();
        let backend = Rc::new(MockBackend::new(&journal));
        let mut builder = InstanceBuilder::new(backend.clone());
        builder.with_validation(false);

        let first = builder.build().unwrap();
        let second = builder.build().unwrap();
        assert_ne!(first.handle(), second.handle());
        assert_eq!(backend.live_instances(), 2);

        drop(first);
        drop(second);
        assert_eq!(backend.live_instances(), 0);
    }
}
