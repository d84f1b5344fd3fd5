//! Recording test doubles for the window toolkit and the Vulkan backend

use ash::vk::{self, Handle};
use slotmap::SlotMap;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::platform::{PlatformError, PlatformResult, WindowDescriptor, WindowKey, WindowToolkit};
use crate::render::vulkan::{
    DeviceDescriptor, GraphicsBackend, InstanceDescriptor, PhysicalDeviceProperties, VulkanError, VulkanResult,
    DEBUG_UTILS_EXTENSION, SWAPCHAIN_EXTENSION, VALIDATION_LAYER,
};

/// Ordered log of native calls shared by the toolkit and backend doubles
#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: &str) {
        self.0.borrow_mut().push(entry.to_string());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

struct MockWindow {
    descriptor: WindowDescriptor,
    closing: bool,
}

pub struct MockToolkit {
    journal: Journal,
    users: Cell<usize>,
    windows: RefCell<SlotMap<WindowKey, MockWindow>>,
    polls: Cell<usize>,
    close_after: Option<usize>,
    next_surface: Cell<u64>,
    fail_initialization: bool,
    fail_surface: bool,
}

impl MockToolkit {
    pub const REQUIRED_EXTENSIONS: &'static [&'static str] = &["VK_KHR_surface", "VK_KHR_xcb_surface"];

    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            users: Cell::new(0),
            windows: RefCell::new(SlotMap::with_key()),
            polls: Cell::new(0),
            close_after: None,
            next_surface: Cell::new(1),
            fail_initialization: false,
            fail_surface: false,
        }
    }

    pub fn failing_initialization(mut self) -> Self {
        self.fail_initialization = true;
        self
    }

    pub fn failing_surface_creation(mut self) -> Self {
        self.fail_surface = true;
        self
    }

    /// Every window asks to close once `polls` event polls have happened
    pub fn closing_after(mut self, polls: usize) -> Self {
        self.close_after = Some(polls);
        self
    }

    pub fn active_users(&self) -> usize {
        self.users.get()
    }

    pub fn live_windows(&self) -> usize {
        self.windows.borrow().len()
    }

    pub fn polls(&self) -> usize {
        self.polls.get()
    }

    pub fn window_descriptor(&self, key: WindowKey) -> Option<WindowDescriptor> {
        self.windows.borrow().get(key).map(|w| w.descriptor.clone())
    }
}

impl WindowToolkit for MockToolkit {
    fn initialize(&self) -> PlatformResult<()> {
        self.journal.record("initialize");
        if self.fail_initialization {
            return Err(PlatformError::InitializationFailed("mock refused".to_string()));
        }
        self.users.set(self.users.get() + 1);
        Ok(())
    }

    fn create_window(&self, descriptor: &WindowDescriptor) -> PlatformResult<WindowKey> {
        if self.users.get() == 0 {
            return Err(PlatformError::NotInitialized);
        }
        self.journal.record("create_window");
        Ok(self.windows.borrow_mut().insert(MockWindow {
            descriptor: descriptor.clone(),
            closing: false,
        }))
    }

    fn should_close(&self, window: WindowKey) -> bool {
        self.windows.borrow().get(window).map_or(true, |w| w.closing)
    }

    fn request_close(&self, window: WindowKey) {
        if let Some(window) = self.windows.borrow_mut().get_mut(window) {
            window.closing = true;
        }
    }

    fn poll_events(&self) {
        let polls = self.polls.get() + 1;
        self.polls.set(polls);
        if self.close_after.is_some_and(|limit| polls >= limit) {
            for (_, window) in self.windows.borrow_mut().iter_mut() {
                window.closing = true;
            }
        }
    }

    fn framebuffer_size(&self, window: WindowKey) -> Option<(u32, u32)> {
        self.windows
            .borrow()
            .get(window)
            .map(|w| (w.descriptor.width, w.descriptor.height))
    }

    fn required_instance_extensions(&self) -> PlatformResult<Vec<String>> {
        if self.users.get() == 0 {
            return Err(PlatformError::NotInitialized);
        }
        Ok(Self::REQUIRED_EXTENSIONS.iter().map(ToString::to_string).collect())
    }

    fn create_surface(&self, _instance: vk::Instance, window: WindowKey) -> PlatformResult<vk::SurfaceKHR> {
        self.journal.record("create_surface");
        if self.fail_surface {
            return Err(PlatformError::SurfaceCreationFailed(vk::Result::ERROR_INITIALIZATION_FAILED));
        }
        if !self.windows.borrow().contains_key(window) {
            return Err(PlatformError::UnknownWindow);
        }
        let raw = self.next_surface.get();
        self.next_surface.set(raw + 1);
        Ok(vk::SurfaceKHR::from_raw(raw))
    }

    fn destroy_window(&self, window: WindowKey) {
        if self.windows.borrow_mut().remove(window).is_some() {
            self.journal.record("destroy_window");
        }
    }

    fn terminate(&self) {
        self.journal.record("terminate");
        self.users.set(self.users.get().saturating_sub(1));
    }
}

#[derive(Clone)]
pub struct MockFamily {
    flags: vk::QueueFlags,
    queue_count: u32,
    present: bool,
}

impl MockFamily {
    pub const fn new(flags: vk::QueueFlags, queue_count: u32, present: bool) -> Self {
        Self {
            flags,
            queue_count,
            present,
        }
    }
}

#[derive(Clone)]
pub struct MockDevice {
    name: String,
    device_type: vk::PhysicalDeviceType,
    families: Vec<MockFamily>,
    extensions: Vec<String>,
}

impl MockDevice {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            device_type: vk::PhysicalDeviceType::INTEGRATED_GPU,
            families: Vec::new(),
            extensions: vec![SWAPCHAIN_EXTENSION.to_string()],
        }
    }

    /// One family doing everything, presentation included
    pub fn graphics(name: &str) -> Self {
        Self::new(name).with_family(MockFamily::new(
            vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER,
            4,
            true,
        ))
    }

    /// Graphics and transfer families, neither able to present
    pub fn graphics_without_present(name: &str) -> Self {
        Self::new(name)
            .with_family(MockFamily::new(vk::QueueFlags::GRAPHICS, 1, false))
            .with_family(MockFamily::new(vk::QueueFlags::TRANSFER, 1, false))
    }

    pub fn compute_only(name: &str) -> Self {
        Self::new(name).with_family(MockFamily::new(vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER, 2, false))
    }

    pub fn with_family(mut self, family: MockFamily) -> Self {
        self.families.push(family);
        self
    }

    pub fn discrete(mut self) -> Self {
        self.device_type = vk::PhysicalDeviceType::DISCRETE_GPU;
        self
    }

    pub fn without_extensions(mut self) -> Self {
        self.extensions.clear();
        self
    }
}

pub struct MockBackend {
    journal: Journal,
    instance_extensions: Vec<String>,
    instance_layers: Vec<String>,
    devices: Vec<MockDevice>,
    live_instances: RefCell<HashSet<vk::Instance>>,
    live_devices: RefCell<HashMap<vk::Device, vk::PhysicalDevice>>,
    next_handle: Cell<u64>,
    last_instance: RefCell<Option<InstanceDescriptor>>,
    last_device: RefCell<Option<DeviceDescriptor>>,
    fail_instance: bool,
    fail_enumeration: bool,
    fail_device: bool,
    fail_presentation: bool,
}

impl MockBackend {
    pub fn new(journal: &Journal) -> Self {
        let mut instance_extensions: Vec<String> =
            MockToolkit::REQUIRED_EXTENSIONS.iter().map(ToString::to_string).collect();
        instance_extensions.push(DEBUG_UTILS_EXTENSION.to_string());

        Self {
            journal: journal.clone(),
            instance_extensions,
            instance_layers: vec![VALIDATION_LAYER.to_string()],
            devices: Vec::new(),
            live_instances: RefCell::new(HashSet::new()),
            live_devices: RefCell::new(HashMap::new()),
            next_handle: Cell::new(1),
            last_instance: RefCell::new(None),
            last_device: RefCell::new(None),
            fail_instance: false,
            fail_enumeration: false,
            fail_device: false,
            fail_presentation: false,
        }
    }

    pub fn with_instance_extensions(mut self, extensions: &[&str]) -> Self {
        self.instance_extensions = extensions.iter().map(ToString::to_string).collect();
        self
    }

    pub fn with_instance_layers(mut self, layers: &[&str]) -> Self {
        self.instance_layers = layers.iter().map(ToString::to_string).collect();
        self
    }

    pub fn with_device(mut self, device: MockDevice) -> Self {
        self.devices.push(device);
        self
    }

    pub fn failing_instance_creation(mut self) -> Self {
        self.fail_instance = true;
        self
    }

    pub fn failing_enumeration(mut self) -> Self {
        self.fail_enumeration = true;
        self
    }

    pub fn failing_device_creation(mut self) -> Self {
        self.fail_device = true;
        self
    }

    pub fn failing_presentation_query(mut self) -> Self {
        self.fail_presentation = true;
        self
    }

    pub fn live_instances(&self) -> usize {
        self.live_instances.borrow().len()
    }

    pub fn live_devices(&self) -> usize {
        self.live_devices.borrow().len()
    }

    pub fn last_instance_descriptor(&self) -> Option<InstanceDescriptor> {
        self.last_instance.borrow().clone()
    }

    pub fn last_device_descriptor(&self) -> Option<DeviceDescriptor> {
        self.last_device.borrow().clone()
    }

    fn next_raw(&self) -> u64 {
        let raw = self.next_handle.get();
        self.next_handle.set(raw + 1);
        raw
    }

    fn check_instance(&self, instance: vk::Instance) -> VulkanResult<()> {
        if self.live_instances.borrow().contains(&instance) {
            Ok(())
        } else {
            Err(VulkanError::UnknownHandle("instance"))
        }
    }

    fn device(&self, device: vk::PhysicalDevice) -> VulkanResult<&MockDevice> {
        usize::try_from(device.as_raw())
            .ok()
            .and_then(|raw| raw.checked_sub(1))
            .and_then(|index| self.devices.get(index))
            .ok_or(VulkanError::UnknownHandle("physical device"))
    }
}

impl GraphicsBackend for MockBackend {
    fn instance_extensions(&self) -> VulkanResult<Vec<String>> {
        Ok(self.instance_extensions.clone())
    }

    fn instance_layers(&self) -> VulkanResult<Vec<String>> {
        Ok(self.instance_layers.clone())
    }

    fn create_instance(&self, descriptor: &InstanceDescriptor) -> VulkanResult<vk::Instance> {
        self.journal.record("create_instance");
        *self.last_instance.borrow_mut() = Some(descriptor.clone());
        if self.fail_instance {
            return Err(VulkanError::Api(vk::Result::ERROR_INCOMPATIBLE_DRIVER));
        }
        let instance = vk::Instance::from_raw(self.next_raw());
        self.live_instances.borrow_mut().insert(instance);
        Ok(instance)
    }

    fn destroy_instance(&self, instance: vk::Instance) {
        if self.live_instances.borrow_mut().remove(&instance) {
            self.journal.record("destroy_instance");
        }
    }

    fn enumerate_physical_devices(&self, instance: vk::Instance) -> VulkanResult<Vec<vk::PhysicalDevice>> {
        self.check_instance(instance)?;
        if self.fail_enumeration {
            return Err(VulkanError::Api(vk::Result::ERROR_INITIALIZATION_FAILED));
        }
        Ok((1..=self.devices.len() as u64).map(vk::PhysicalDevice::from_raw).collect())
    }

    fn physical_device_properties(
        &self,
        instance: vk::Instance,
        device: vk::PhysicalDevice,
    ) -> VulkanResult<PhysicalDeviceProperties> {
        self.check_instance(instance)?;
        let device = self.device(device)?;
        Ok(PhysicalDeviceProperties {
            name: device.name.clone(),
            device_type: device.device_type,
            api_version: vk::make_api_version(0, 1, 3, 0),
        })
    }

    fn queue_family_properties(
        &self,
        instance: vk::Instance,
        device: vk::PhysicalDevice,
    ) -> VulkanResult<Vec<vk::QueueFamilyProperties>> {
        self.check_instance(instance)?;
        Ok(self
            .device(device)?
            .families
            .iter()
            .map(|family| vk::QueueFamilyProperties {
                queue_flags: family.flags,
                queue_count: family.queue_count,
                ..Default::default()
            })
            .collect())
    }

    fn presentation_support(
        &self,
        instance: vk::Instance,
        device: vk::PhysicalDevice,
        family_index: u32,
        _surface: vk::SurfaceKHR,
    ) -> VulkanResult<bool> {
        self.check_instance(instance)?;
        if self.fail_presentation {
            return Err(VulkanError::Api(vk::Result::ERROR_SURFACE_LOST_KHR));
        }
        Ok(self
            .device(device)?
            .families
            .get(family_index as usize)
            .is_some_and(|family| family.present))
    }

    fn device_extensions(&self, instance: vk::Instance, device: vk::PhysicalDevice) -> VulkanResult<Vec<String>> {
        self.check_instance(instance)?;
        Ok(self.device(device)?.extensions.clone())
    }

    fn create_device(
        &self,
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
        descriptor: &DeviceDescriptor,
    ) -> VulkanResult<vk::Device> {
        self.check_instance(instance)?;
        self.device(physical_device)?;
        self.journal.record("create_device");
        *self.last_device.borrow_mut() = Some(descriptor.clone());
        if self.fail_device {
            return Err(VulkanError::Api(vk::Result::ERROR_DEVICE_LOST));
        }
        let device = vk::Device::from_raw(self.next_raw());
        self.live_devices.borrow_mut().insert(device, physical_device);
        Ok(device)
    }

    fn destroy_device(&self, device: vk::Device) {
        if self.live_devices.borrow_mut().remove(&device).is_some() {
            self.journal.record("destroy_device");
        }
    }

    fn device_queue(&self, device: vk::Device, family_index: u32, queue_index: u32) -> vk::Queue {
        self.journal.record("device_queue");
        if !self.live_devices.borrow().contains_key(&device) {
            return vk::Queue::null();
        }
        vk::Queue::from_raw((device.as_raw() << 16) | (u64::from(family_index) << 8) | (u64::from(queue_index) + 1))
    }

    fn destroy_surface(&self, instance: vk::Instance, surface: vk::SurfaceKHR) {
        if surface != vk::SurfaceKHR::null() && self.live_instances.borrow().contains(&instance) {
            self.journal.record("destroy_surface");
        }
    }
}
