//! Scoped ownership of raw Vulkan handles.
//!
//! A [`ScopedHandle`] holds one raw handle plus the function that destroys it,
//! and calls that function when the handle is replaced, reset or dropped.
//! Handles whose destroy call needs a parent (a messenger needs its instance,
//! a buffer needs its device) are bound to a [`ParentRef`], which is read when
//! the release actually happens.

use std::any::type_name;
use std::cell::Cell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;
use vulkanalia::vk::{self, Handle};

type Release<T> = Box<dyn FnMut(T, Option<&vk::AllocationCallbacks>)>;

pub struct ScopedHandle<T: Handle> {
    value: Rc<Cell<T>>,
    release: Release<T>,
}

/// Non-owning view of another wrapper's current value.
///
/// Cloning a `ParentRef` never extends the parent's resource lifetime; once
/// the parent releases its handle the view reads the null handle.
pub struct ParentRef<P: Handle> {
    value: Rc<Cell<P>>,
}

impl<P: Handle> ParentRef<P> {
    pub fn get(&self) -> P {
        self.value.get()
    }
}

impl<P: Handle> Clone for ParentRef<P> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}

impl<T: Handle> ScopedHandle<T> {
    /// A wrapper that holds nothing and releases nothing.
    pub fn empty() -> Self {
        Self::new(|_, _| {})
    }

    /// Binds `release` to whatever handle is later written into this wrapper.
    pub fn new<F>(release: F) -> Self
    where
        F: FnMut(T, Option<&vk::AllocationCallbacks>) + 'static,
    {
        Self {
            value: Rc::new(Cell::new(T::null())),
            release: Box::new(release),
        }
    }

    /// Binds a release function that also needs the parent's handle.
    ///
    /// The parent is looked up when the release runs, so replacing the parent
    /// between binding and release hands the newer parent to `release`. If the
    /// parent has already been released the child is not destroyed, because
    /// destroying the parent invalidated it.
    pub fn with_parent<P, F>(parent: &ParentRef<P>, mut release: F) -> Self
    where
        P: Handle + 'static,
        F: FnMut(P, T, Option<&vk::AllocationCallbacks>) + 'static,
    {
        let parent = parent.clone();
        Self::new(move |handle, allocator| {
            let parent_handle = parent.get();
            if parent_handle == P::null() {
                tracing::warn!(
                    "Parent `{}` already released, skipping release of {:?}.",
                    type_name::<P>(),
                    handle
                );
                return;
            }
            release(parent_handle, handle, allocator);
        })
    }

    pub fn parent_ref(&self) -> ParentRef<T> {
        ParentRef {
            value: self.value.clone(),
        }
    }

    pub fn get(&self) -> T {
        self.value.get()
    }

    pub fn is_empty(&self) -> bool {
        self.get() == T::null()
    }

    /// Releases the held handle, if any, and leaves the wrapper empty.
    pub fn reset(&mut self) {
        let handle = self.value.replace(T::null());
        if handle != T::null() {
            tracing::trace!("Releasing `{}` {:?}.", type_name::<T>(), handle);
            (self.release)(handle, None);
        }
    }

    /// Releases the held handle and returns a slot for a create call to fill.
    ///
    /// The previous handle is gone even if nothing is written into the slot;
    /// callers must check the create call's own result.
    pub fn slot_for_write(&mut self) -> HandleSlot<'_, T> {
        self.reset();
        HandleSlot {
            cell: &self.value,
            value: T::null(),
        }
    }

    pub fn replace(&mut self, handle: T) {
        *self.slot_for_write() = handle;
    }
}

impl<T: Handle> Drop for ScopedHandle<T> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T: Handle> fmt::Debug for ScopedHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ScopedHandle").field(&self.get()).finish()
    }
}

/// Write access to an emptied [`ScopedHandle`]; the written value is stored
/// back into the wrapper when the slot goes out of scope.
pub struct HandleSlot<'a, T: Handle> {
    cell: &'a Cell<T>,
    value: T,
}

impl<T: Handle> Deref for HandleSlot<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: Handle> DerefMut for HandleSlot<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: Handle> Drop for HandleSlot<'_, T> {
    fn drop(&mut self) {
        self.cell.set(self.value);
    }
}
