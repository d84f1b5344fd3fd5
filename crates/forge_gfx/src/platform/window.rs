//! Native window wrapper

use slotmap::Key;
use std::mem;
use std::rc::Rc;

use crate::error::{ConstructionError, ConstructionResult, ResourceKind};
use crate::foundation::OpaqueHandle;

use super::system::System;
use super::toolkit::{Toolkit, WindowDescriptor, WindowKey};

struct WindowImpl {
    toolkit: Toolkit,
    key: WindowKey,
}

impl Drop for WindowImpl {
    fn drop(&mut self) {
        let key = mem::take(&mut self.key);
        if !key.is_null() {
            self.toolkit.destroy_window(key);
        }
    }
}

/// Native window without a client graphics API
///
/// The window is destroyed when the wrapper drops.
pub struct Window {
    inner: OpaqueHandle<WindowImpl, 24, 8>,
}

impl Window {
    /// Whether the window was asked to close
    pub fn should_close(&self) -> bool {
        self.inner.toolkit.should_close(self.inner.key)
    }

    /// Process pending window events
    pub fn poll_events(&self) {
        self.inner.toolkit.poll_events();
    }

    /// Ask the window to close at the next loop check
    pub fn request_close(&self) {
        self.inner.toolkit.request_close(self.inner.key);
    }

    /// Framebuffer size in pixels, `(0, 0)` if the window is gone
    pub fn framebuffer_size(&self) -> (u32, u32) {
        self.inner
            .toolkit
            .framebuffer_size(self.inner.key)
            .unwrap_or((0, 0))
    }

    pub(crate) fn key(&self) -> WindowKey {
        self.inner.key
    }

    pub(crate) fn toolkit(&self) -> &Toolkit {
        &self.inner.toolkit
    }
}

/// Builder for [`Window`]
///
/// Defaults to a 640x480 non-resizable window titled "No Title".
pub struct WindowBuilder<'s> {
    system: Option<&'s System>,
    width: u32,
    height: u32,
    title: String,
    resizable: bool,
}

impl<'s> WindowBuilder<'s> {
    /// Create a builder with default parameters
    pub fn new() -> Self {
        Self {
            system: None,
            width: 640,
            height: 480,
            title: "No Title".to_string(),
            resizable: false,
        }
    }

    /// Set the system the window is created on
    pub fn with_system(&mut self, system: &'s System) -> &mut Self {
        self.system = Some(system);
        self
    }

    /// Set the width
    pub fn with_width(&mut self, width: u32) -> &mut Self {
        self.width = width;
        self
    }

    /// Set the height
    pub fn with_height(&mut self, height: u32) -> &mut Self {
        self.height = height;
        self
    }

    /// Set the title
    pub fn with_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = title.into();
        self
    }

    /// Allow or forbid user resizing
    pub fn with_resizable(&mut self, resizable: bool) -> &mut Self {
        self.resizable = resizable;
        self
    }

    /// Create the window
    pub fn build(&self) -> ConstructionResult<Window> {
        let system = self.system.ok_or(ConstructionError::MissingParameter {
            resource: ResourceKind::Window,
            parameter: "system",
        })?;

        if self.width == 0 || self.height == 0 {
            return Err(ConstructionError::InvalidParameter {
                resource: ResourceKind::Window,
                reason: format!("dimensions must be non-zero, got {}x{}", self.width, self.height),
            });
        }

        let descriptor = WindowDescriptor {
            width: self.width,
            height: self.height,
            title: self.title.clone(),
            resizable: self.resizable,
        };

        let toolkit = Rc::clone(system.toolkit());
        let key = toolkit
            .create_window(&descriptor)
            .map_err(|e| ConstructionError::native(ResourceKind::Window, e))?;

        log::info!("Created window \"{}\" ({}x{})", self.title, self.width, self.height);

        Ok(Window {
            inner: OpaqueHandle::new(WindowImpl { toolkit, key }),
        })
    }
}

impl Default for WindowBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}
