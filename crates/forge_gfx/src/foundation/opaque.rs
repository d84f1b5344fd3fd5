//! Fixed-layout inline storage for resource implementations
//!
//! Every resource wrapper (window, instance, surface, device, ...) keeps its
//! implementation state inline in an [`OpaqueHandle`] rather than behind a
//! `Box` or a trait object. The wrapper declares the storage size and
//! alignment it exposes; the declaration is checked against the embedded type
//! when the handle is instantiated, so changing an implementation type without
//! updating the wrapper fails the build instead of silently changing the
//! wrapper's layout.
//!
//! ```
//! use forge_gfx::foundation::OpaqueHandle;
//!
//! struct Counter {
//!     value: u64,
//! }
//!
//! let handle: OpaqueHandle<Counter, 8, 8> = OpaqueHandle::new(Counter { value: 3 });
//! assert_eq!(handle.value, 3);
//! ```
//!
//! A mismatched declaration is rejected when the handle is built:
//!
//! ```compile_fail
//! use forge_gfx::foundation::OpaqueHandle;
//!
//! struct Counter {
//!     value: u64,
//! }
//!
//! let handle: OpaqueHandle<Counter, 16, 8> = OpaqueHandle::new(Counter { value: 3 });
//! assert_eq!(handle.value, 3);
//! ```
//!
//! The same holds for the alignment:
//!
//! ```compile_fail
//! use forge_gfx::foundation::OpaqueHandle;
//!
//! let handle: OpaqueHandle<u64, 8, 4> = OpaqueHandle::new(3);
//! assert_eq!(*handle, 3);
//! ```

use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};

/// Inline storage for a value of type `T` with a declared size and alignment
///
/// Copy, clone, comparison and hashing are forwarded to `T` exactly when `T`
/// provides them. Dropping the handle drops the embedded value once.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct OpaqueHandle<T, const SIZE: usize, const ALIGN: usize> {
    value: T,
}

impl<T, const SIZE: usize, const ALIGN: usize> OpaqueHandle<T, SIZE, ALIGN> {
    const LAYOUT_MATCHES: () = {
        assert!(
            mem::size_of::<T>() == SIZE,
            "declared storage size does not match the embedded type"
        );
        assert!(
            mem::align_of::<T>() == ALIGN,
            "declared storage alignment does not match the embedded type"
        );
    };

    /// Embed `value`, verifying the declared layout
    #[inline]
    pub fn new(value: T) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::LAYOUT_MATCHES;
        Self { value }
    }

    /// Shared access to the embedded value
    #[inline]
    pub const fn get(&self) -> &T {
        &self.value
    }

    /// Exclusive access to the embedded value
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.value
    }

    /// Move the embedded value out of the handle
    #[inline]
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Declared storage size in bytes
    pub const fn size() -> usize {
        SIZE
    }

    /// Declared storage alignment in bytes
    pub const fn alignment() -> usize {
        ALIGN
    }
}

impl<T, const SIZE: usize, const ALIGN: usize> Deref for OpaqueHandle<T, SIZE, ALIGN> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T, const SIZE: usize, const ALIGN: usize> DerefMut for OpaqueHandle<T, SIZE, ALIGN> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: fmt::Debug, const SIZE: usize, const ALIGN: usize> fmt::Debug for OpaqueHandle<T, SIZE, ALIGN> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}
