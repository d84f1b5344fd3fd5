//! `ash` implementation of [`GraphicsBackend`]
//!
//! Keeps the `ash` dispatch tables for every instance and device it created,
//! keyed by the raw handles handed out to the resource wrappers.

use ash::extensions::ext::DebugUtils;
use ash::extensions::khr::Surface as SurfaceLoader;
use ash::{vk, Entry};
use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::{c_char, CStr, CString};

use super::backend::{
    DeviceDescriptor, GraphicsBackend, InstanceDescriptor, PhysicalDeviceProperties, VulkanError, VulkanResult,
};

struct InstanceRecord {
    instance: ash::Instance,
    surface_loader: SurfaceLoader,
    debug: Option<(DebugUtils, vk::DebugUtilsMessengerEXT)>,
}

impl InstanceRecord {
    fn destroy(self) {
        unsafe {
            if let Some((debug_utils, messenger)) = &self.debug {
                debug_utils.destroy_debug_utils_messenger(*messenger, None);
            }
            self.instance.destroy_instance(None);
        }
    }
}

/// Vulkan backend driving the system loader through `ash`
pub struct AshBackend {
    entry: Entry,
    instances: RefCell<HashMap<vk::Instance, InstanceRecord>>,
    devices: RefCell<HashMap<vk::Device, ash::Device>>,
}

impl AshBackend {
    /// Load the Vulkan loader library
    pub fn load() -> VulkanResult<Self> {
        let entry = unsafe { Entry::load() }.map_err(|e| VulkanError::LoaderUnavailable(format!("{e:?}")))?;
        log::debug!("Vulkan loader loaded");

        Ok(Self {
            entry,
            instances: RefCell::new(HashMap::new()),
            devices: RefCell::new(HashMap::new()),
        })
    }

    fn with_instance<R>(
        &self,
        instance: vk::Instance,
        f: impl FnOnce(&InstanceRecord) -> VulkanResult<R>,
    ) -> VulkanResult<R> {
        let instances = self.instances.borrow();
        let record = instances.get(&instance).ok_or(VulkanError::UnknownHandle("instance"))?;
        f(record)
    }

    fn setup_debug_messenger(debug_utils: &DebugUtils) -> VulkanResult<vk::DebugUtilsMessengerEXT> {
        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
            .message_severity(
                vk::DebugUtilsMessageSeverityFlagsEXT::WARNING | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(debug_callback));

        unsafe {
            debug_utils
                .create_debug_utils_messenger(&create_info, None)
                .map_err(VulkanError::Api)
        }
    }
}

fn c_strings(names: &[String]) -> VulkanResult<Vec<CString>> {
    names
        .iter()
        .map(|name| CString::new(name.as_str()).map_err(|_| VulkanError::InvalidName(name.clone())))
        .collect()
}

fn pointers(names: &[CString]) -> Vec<*const c_char> {
    names.iter().map(|name| name.as_ptr()).collect()
}

fn fixed_name(raw: &[c_char]) -> String {
    unsafe { CStr::from_ptr(raw.as_ptr()) }.to_string_lossy().into_owned()
}

impl GraphicsBackend for AshBackend {
    fn instance_extensions(&self) -> VulkanResult<Vec<String>> {
        let properties = self
            .entry
            .enumerate_instance_extension_properties(None)
            .map_err(VulkanError::Api)?;
        Ok(properties.iter().map(|p| fixed_name(&p.extension_name)).collect())
    }

    fn instance_layers(&self) -> VulkanResult<Vec<String>> {
        let properties = self.entry.enumerate_instance_layer_properties().map_err(VulkanError::Api)?;
        Ok(properties.iter().map(|p| fixed_name(&p.layer_name)).collect())
    }

    fn create_instance(&self, descriptor: &InstanceDescriptor) -> VulkanResult<vk::Instance> {
        let app_name = CString::new(descriptor.application_name.as_str())
            .map_err(|_| VulkanError::InvalidName(descriptor.application_name.clone()))?;
        let engine_name = CString::new(descriptor.engine_name.as_str())
            .map_err(|_| VulkanError::InvalidName(descriptor.engine_name.clone()))?;
        let (major, minor, patch) = descriptor.application_version;

        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name)
            .application_version(vk::make_api_version(0, major, minor, patch))
            .engine_name(&engine_name)
            .engine_version(vk::make_api_version(0, 0, 1, 0))
            .api_version(descriptor.api_version);

        let extensions = c_strings(&descriptor.extensions)?;
        let extension_ptrs = pointers(&extensions);
        let layers = c_strings(&descriptor.layers)?;
        let layer_ptrs = pointers(&layers);

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extension_ptrs)
            .enabled_layer_names(&layer_ptrs);

        let instance = unsafe { self.entry.create_instance(&create_info, None) }.map_err(VulkanError::Api)?;

        let debug = if descriptor.debug_messenger {
            let debug_utils = DebugUtils::new(&self.entry, &instance);
            match Self::setup_debug_messenger(&debug_utils) {
                Ok(messenger) => Some((debug_utils, messenger)),
                Err(e) => {
                    unsafe { instance.destroy_instance(None) };
                    return Err(e);
                }
            }
        } else {
            None
        };

        let handle = instance.handle();
        let surface_loader = SurfaceLoader::new(&self.entry, &instance);
        self.instances.borrow_mut().insert(
            handle,
            InstanceRecord {
                instance,
                surface_loader,
                debug,
            },
        );
        Ok(handle)
    }

    fn destroy_instance(&self, instance: vk::Instance) {
        if let Some(record) = self.instances.borrow_mut().remove(&instance) {
            record.destroy();
        }
    }

    fn enumerate_physical_devices(&self, instance: vk::Instance) -> VulkanResult<Vec<vk::PhysicalDevice>> {
        self.with_instance(instance, |record| {
            unsafe { record.instance.enumerate_physical_devices() }.map_err(VulkanError::Api)
        })
    }

    fn physical_device_properties(
        &self,
        instance: vk::Instance,
        device: vk::PhysicalDevice,
    ) -> VulkanResult<PhysicalDeviceProperties> {
        self.with_instance(instance, |record| {
            let properties = unsafe { record.instance.get_physical_device_properties(device) };
            Ok(PhysicalDeviceProperties {
                name: fixed_name(&properties.device_name),
                device_type: properties.device_type,
                api_version: properties.api_version,
            })
        })
    }

    fn queue_family_properties(
        &self,
        instance: vk::Instance,
        device: vk::PhysicalDevice,
    ) -> VulkanResult<Vec<vk::QueueFamilyProperties>> {
        self.with_instance(instance, |record| {
            Ok(unsafe { record.instance.get_physical_device_queue_family_properties(device) })
        })
    }

    fn presentation_support(
        &self,
        instance: vk::Instance,
        device: vk::PhysicalDevice,
        family_index: u32,
        surface: vk::SurfaceKHR,
    ) -> VulkanResult<bool> {
        self.with_instance(instance, |record| unsafe {
            record
                .surface_loader
                .get_physical_device_surface_support(device, family_index, surface)
                .map_err(VulkanError::Api)
        })
    }

    fn device_extensions(&self, instance: vk::Instance, device: vk::PhysicalDevice) -> VulkanResult<Vec<String>> {
        self.with_instance(instance, |record| {
            let properties =
                unsafe { record.instance.enumerate_device_extension_properties(device) }.map_err(VulkanError::Api)?;
            Ok(properties.iter().map(|p| fixed_name(&p.extension_name)).collect())
        })
    }

    fn create_device(
        &self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
        descriptor: &DeviceDescriptor,
    ) -> VulkanResult<vk::Device> {
        let queue_infos: Vec<vk::DeviceQueueCreateInfo> = descriptor
            .queues
            .iter()
            .map(|request| {
                vk::DeviceQueueCreateInfo::builder()
                    .queue_family_index(request.family_index)
                    .queue_priorities(&request.priorities)
                    .build()
            })
            .collect();

        let extensions = c_strings(&descriptor.extensions)?;
        let extension_ptrs = pointers(&extensions);
        let features = vk::PhysicalDeviceFeatures::default();

        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&extension_ptrs)
            .enabled_features(&features);

        let device = self.with_instance(instance, |record| {
            unsafe { record.instance.create_device(physical_device, &create_info, None) }.map_err(VulkanError::Api)
        })?;

        let handle = device.handle();
        self.devices.borrow_mut().insert(handle, device);
        Ok(handle)
    }

    fn destroy_device(&self, device: vk::Device) {
        if let Some(device) = self.devices.borrow_mut().remove(&device) {
            unsafe {
                // Nothing useful to do with a wait failure during teardown.
                let _ = device.device_wait_idle();
                device.destroy_device(None);
            }
        }
    }

    fn device_queue(&self, device: vk::Device, family_index: u32, queue_index: u32) -> vk::Queue {
        self.devices
            .borrow()
            .get(&device)
            .map_or_else(vk::Queue::null, |device| unsafe {
                device.get_device_queue(family_index, queue_index)
            })
    }

    fn destroy_surface(&self, instance: vk::Instance, surface: vk::SurfaceKHR) {
        if surface == vk::SurfaceKHR::null() {
            return;
        }
        if let Some(record) = self.instances.borrow().get(&instance) {
            unsafe { record.surface_loader.destroy_surface(surface, None) };
        }
    }
}

impl Drop for AshBackend {
    fn drop(&mut self) {
        let devices: Vec<_> = self.devices.get_mut().drain().collect();
        for (_, device) in devices {
            log::warn!("Destroying leaked Vulkan device");
            unsafe { device.destroy_device(None) };
        }
        let instances: Vec<_> = self.instances.get_mut().drain().collect();
        for (_, record) in instances {
            log::warn!("Destroying leaked Vulkan instance");
            record.destroy();
        }
    }
}

/// Debug callback for validation layers
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    if callback_data.is_null() || (*callback_data).p_message.is_null() {
        return vk::FALSE;
    }
    let message = CStr::from_ptr((*callback_data).p_message).to_string_lossy();

    if message_severity >= vk::DebugUtilsMessageSeverityFlagsEXT::ERROR {
        log::error!("[Vulkan] {:?} - {}", message_type, message);
    } else if message_severity >= vk::DebugUtilsMessageSeverityFlagsEXT::WARNING {
        log::warn!("[Vulkan] {:?} - {}", message_type, message);
    } else {
        log::debug!("[Vulkan] {:?} - {}", message_type, message);
    }

    vk::FALSE
}
