//! Window toolkit system token
//!
//! A [`System`] proves the toolkit is initialized. Windows are created against
//! it and the toolkit is released when it drops.

use std::rc::Rc;

use crate::error::{ConstructionError, ConstructionResult, ResourceKind};
use crate::foundation::OpaqueHandle;

use super::toolkit::{PlatformResult, Toolkit};

struct SystemImpl {
    toolkit: Toolkit,
}

impl Drop for SystemImpl {
    fn drop(&mut self) {
        self.toolkit.terminate();
        log::debug!("Window toolkit released");
    }
}

/// Initialized window toolkit
pub struct System {
    inner: OpaqueHandle<SystemImpl, 16, 8>,
}

impl System {
    /// Instance extensions the toolkit needs to create presentation surfaces
    pub fn required_instance_extensions(&self) -> PlatformResult<Vec<String>> {
        self.inner.toolkit.required_instance_extensions()
    }

    pub(crate) fn toolkit(&self) -> &Toolkit {
        &self.inner.toolkit
    }
}

/// Builder for [`System`]
pub struct SystemBuilder {
    toolkit: Toolkit,
}

impl SystemBuilder {
    /// Create a builder for the given toolkit
    pub fn new(toolkit: Toolkit) -> Self {
        Self { toolkit }
    }

    /// Initialize the toolkit
    ///
    /// Each built system holds one initialization of the toolkit, so several
    /// systems may coexist.
    pub fn build(&self) -> ConstructionResult<System> {
        self.toolkit
            .initialize()
            .map_err(|e| ConstructionError::native(ResourceKind::System, e))?;

        Ok(System {
            inner: OpaqueHandle::new(SystemImpl {
                toolkit: Rc::clone(&self.toolkit),
            }),
        })
    }
}
