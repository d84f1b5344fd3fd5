//! Application driver
//!
//! Runs the bootstrap pipeline in dependency order and owns the resulting
//! resource chain for the lifetime of the event loop:
//!
//! `Start → SystemReady → WindowReady → InstanceReady → SurfaceReady →
//! DeviceSelected → DeviceReady → Running → Terminated`
//!
//! Any construction failure jumps straight to `Terminated`. Resources built
//! before the failure are locals of the pipeline and drop in reverse order.

use thiserror::Error;

use crate::core::ApplicationConfig;
use crate::error::ConstructionError;
use crate::platform::{SystemBuilder, Toolkit, Window, WindowBuilder};
use crate::render::vulkan::{
    select_device, Backend, Device, DeviceBuilder, DeviceRequirements, InstanceBuilder, PhysicalDevice, Queue,
    SurfaceBuilder, SWAPCHAIN_EXTENSION,
};

/// Pipeline states, in the order they are entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Nothing built yet
    Start,
    /// Window toolkit initialized
    SystemReady,
    /// Window created
    WindowReady,
    /// Vulkan instance created
    InstanceReady,
    /// Presentation surface created
    SurfaceReady,
    /// Physical device and queue families chosen
    DeviceSelected,
    /// Logical device and queues created
    DeviceReady,
    /// Event loop running
    Running,
    /// Pipeline finished, successfully or not
    Terminated,
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// A pipeline step failed
    #[error("Initialization failed after {state:?}: {source}")]
    Initialization {
        /// Last state reached before the failure
        state: AppState,
        /// Construction failure
        #[source]
        source: ConstructionError,
    },

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Resources handed to the frame hook once per loop iteration
pub struct RenderContext<'r> {
    /// Window being presented to
    pub window: &'r Window,
    /// Selected physical device
    pub physical_device: &'r PhysicalDevice<'r>,
    /// Logical device
    pub device: &'r Device<'r>,
    /// First queue of the graphics family
    pub graphics_queue: Queue<'r>,
    /// First queue of the presentation family
    pub present_queue: Queue<'r>,
    /// Loop iteration, starting at zero
    pub frame: u64,
}

/// Bootstrap application
pub struct Application {
    config: ApplicationConfig,
    backend: Backend,
    toolkit: Toolkit,
    state: AppState,
    transitions: Vec<AppState>,
}

impl Application {
    /// Create an application after validating `config`
    pub fn new(config: ApplicationConfig, backend: Backend, toolkit: Toolkit) -> Result<Self, AppError> {
        config.validate().map_err(AppError::Config)?;

        Ok(Self {
            config,
            backend,
            toolkit,
            state: AppState::Start,
            transitions: vec![AppState::Start],
        })
    }

    /// Current pipeline state
    pub fn state(&self) -> AppState {
        self.state
    }

    /// Every state entered by the last run, in order
    pub fn transitions(&self) -> &[AppState] {
        &self.transitions
    }

    /// Run the pipeline and the event loop until the window closes
    pub fn run(&mut self) -> Result<(), AppError> {
        self.run_with(|_| {})
    }

    /// Run the pipeline, calling `frame_hook` once per loop iteration
    pub fn run_with<F>(&mut self, frame_hook: F) -> Result<(), AppError>
    where
        F: FnMut(&RenderContext<'_>),
    {
        self.state = AppState::Start;
        self.transitions = vec![AppState::Start];

        let result = self.run_pipeline(frame_hook);
        self.enter(AppState::Terminated);

        if let Err(e) = &result {
            log::error!("{e}");
        }
        result
    }

    fn run_pipeline<F>(&mut self, mut frame_hook: F) -> Result<(), AppError>
    where
        F: FnMut(&RenderContext<'_>),
    {
        let config = self.config.clone();

        let system = SystemBuilder::new(self.toolkit.clone()).build().map_err(self.failure())?;
        self.enter(AppState::SystemReady);

        let window = WindowBuilder::new()
            .with_system(&system)
            .with_width(config.window.width)
            .with_height(config.window.height)
            .with_title(config.window.title.as_str())
            .with_resizable(config.window.resizable)
            .build()
            .map_err(self.failure())?;
        self.enter(AppState::WindowReady);

        let mut instance_builder = InstanceBuilder::new(self.backend.clone());
        let (major, minor, patch) = config.instance.application_version;
        instance_builder
            .with_system(&system)
            .with_application_name(config.instance.application_name.as_str())
            .with_application_version(major, minor, patch);
        if let Some(enabled) = config.instance.enable_validation {
            instance_builder.with_validation(enabled);
        }
        for extension in &config.instance.extensions {
            instance_builder.with_extension(extension.as_str());
        }
        let instance = instance_builder.build().map_err(self.failure())?;
        self.enter(AppState::InstanceReady);

        let surface = SurfaceBuilder::new()
            .with_instance(&instance)
            .with_window(&window)
            .build()
            .map_err(self.failure())?;
        self.enter(AppState::SurfaceReady);

        let mut extensions = vec![SWAPCHAIN_EXTENSION.to_string()];
        extensions.extend(config.device.extensions.iter().cloned());
        let requirements = DeviceRequirements {
            graphics: true,
            presentation: config.device.require_presentation.then_some(&surface),
            extensions,
        };
        let selection = select_device(&instance, &requirements).map_err(self.failure())?;
        let graphics_family = selection.graphics_family.ok_or_else(|| {
            self.failure()(ConstructionError::NoSuitableQueueFamily {
                device: selection.physical_device.name().to_string(),
            })
        })?;
        let present_family = selection.present_family.unwrap_or(graphics_family);
        self.enter(AppState::DeviceSelected);

        let mut device_builder = DeviceBuilder::new();
        device_builder.with_physical_device(&selection.physical_device);
        for family in selection.unique_families() {
            device_builder.add_queues(family, &config.device.queue_priorities);
        }
        for extension in &config.device.extensions {
            device_builder.with_extension(extension.as_str());
        }
        let device = device_builder.build().map_err(self.failure())?;
        let graphics_queue = Queue::get(&device, &graphics_family, 0).map_err(self.failure())?;
        let present_queue = Queue::get(&device, &present_family, 0).map_err(self.failure())?;
        self.enter(AppState::DeviceReady);

        self.enter(AppState::Running);
        let mut frame = 0;
        loop {
            window.poll_events();
            if window.should_close() {
                break;
            }
            if config.frame_limit.is_some_and(|limit| frame >= limit) {
                log::info!("Frame limit of {frame} reached");
                break;
            }

            frame_hook(&RenderContext {
                window: &window,
                physical_device: &selection.physical_device,
                device: &device,
                graphics_queue,
                present_queue,
                frame,
            });
            frame += 1;
        }

        log::info!("Event loop finished after {frame} frame(s)");
        Ok(())
    }

    fn enter(&mut self, state: AppState) {
        log::debug!("{:?} -> {:?}", self.state, state);
        self.state = state;
        self.transitions.push(state);
    }

    fn failure(&self) -> impl Fn(ConstructionError) -> AppError {
        let state = self.state;
        move |source| AppError::Initialization { state, source }
    }
}
