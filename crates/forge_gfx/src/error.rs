//! Construction error taxonomy
//!
//! Every builder and the device selection pipeline report failures as a
//! [`ConstructionError`]. Native failures from the window toolkit or the
//! Vulkan backend are wrapped together with the kind of resource whose
//! construction they interrupted.

use std::fmt;
use thiserror::Error;

use crate::platform::PlatformError;
use crate::render::vulkan::VulkanError;

/// Resource kinds produced by the bootstrap pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Window toolkit token
    System,
    /// Native window
    Window,
    /// Vulkan instance
    Instance,
    /// Presentation surface
    Surface,
    /// Physical device view
    PhysicalDevice,
    /// Queue family view
    QueueFamily,
    /// Logical device
    Device,
    /// Device queue
    Queue,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::System => "system",
            Self::Window => "window",
            Self::Instance => "instance",
            Self::Surface => "surface",
            Self::PhysicalDevice => "physical device",
            Self::QueueFamily => "queue family",
            Self::Device => "device",
            Self::Queue => "queue",
        };
        f.write_str(name)
    }
}

/// Failure reported by one of the native collaborators
#[derive(Error, Debug)]
pub enum NativeError {
    /// The Vulkan backend rejected a call
    #[error(transparent)]
    Backend(#[from] VulkanError),

    /// The window toolkit rejected a call
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Errors raised while building resources or selecting a device
#[derive(Error, Debug)]
pub enum ConstructionError {
    /// A required extension, layer or feature is not reported as supported
    #[error("{resource}: required {capability} not supported")]
    UnsupportedCapability {
        /// Resource being constructed
        resource: ResourceKind,
        /// Human readable capability name, e.g. `extension VK_KHR_swapchain`
        capability: String,
    },

    /// A native call failed for reasons internal to the backend or toolkit
    #[error("{resource}: native call failed: {source}")]
    Native {
        /// Resource being constructed or queried
        resource: ResourceKind,
        /// Underlying native failure
        #[source]
        source: NativeError,
    },

    /// A builder was asked to build without a required parameter
    #[error("{resource}: missing {parameter}")]
    MissingParameter {
        /// Resource being constructed
        resource: ResourceKind,
        /// Name of the parameter that was never set
        parameter: &'static str,
    },

    /// A builder parameter is out of range
    #[error("{resource}: {reason}")]
    InvalidParameter {
        /// Resource being constructed
        resource: ResourceKind,
        /// What is wrong with the parameter
        reason: String,
    },

    /// No physical device satisfies the required capabilities
    #[error("Failed to find a suitable Vulkan device")]
    NoSuitableDevice,

    /// The chosen physical device has no queue family with a required capability
    #[error("Failed to find a suitable Vulkan queue family on {device}")]
    NoSuitableQueueFamily {
        /// Name of the physical device that was searched
        device: String,
    },

    /// A request that earlier construction never provisioned
    #[error("{resource}: contract violation: {reason}")]
    ContractViolation {
        /// Resource being accessed
        resource: ResourceKind,
        /// What was requested
        reason: String,
    },
}

impl ConstructionError {
    /// Wrap a native failure for `resource`
    pub fn native(resource: ResourceKind, source: impl Into<NativeError>) -> Self {
        Self::Native {
            resource,
            source: source.into(),
        }
    }

    /// Resource the error is attributed to, if any
    pub const fn resource(&self) -> Option<ResourceKind> {
        match self {
            Self::UnsupportedCapability { resource, .. }
            | Self::Native { resource, .. }
            | Self::MissingParameter { resource, .. }
            | Self::InvalidParameter { resource, .. }
            | Self::ContractViolation { resource, .. } => Some(*resource),
            Self::NoSuitableDevice | Self::NoSuitableQueueFamily { .. } => None,
        }
    }
}

/// Result type for resource construction
pub type ConstructionResult<T> = Result<T, ConstructionError>;

/// Fail with [`ConstructionError::UnsupportedCapability`] unless every entry
/// of `required` appears in `supported`
pub(crate) fn ensure_supported<S: AsRef<str>>(
    resource: ResourceKind,
    kind: &str,
    required: &[S],
    supported: &[String],
) -> ConstructionResult<()> {
    let missing = required
        .iter()
        .map(AsRef::as_ref)
        .find(|name| !supported.iter().any(|available| available.as_str() == *name));

    match missing {
        Some(name) => Err(ConstructionError::UnsupportedCapability {
            resource,
            capability: format!("{kind} {name}"),
        }),
        None => Ok(()),
    }
}
