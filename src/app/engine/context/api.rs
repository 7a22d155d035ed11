use std::cell::RefCell;
use std::collections::HashMap;
use std::ptr;

use vulkanalia::Version;
use vulkanalia::loader::{LIBRARY, LibloadingLoader};
use vulkanalia::prelude::v1_0::*;
use vulkanalia::vk;
use vulkanalia::vk::ExtDebugUtilsExtension;

use crate::error::AppError;

/// The slice of the Vulkan API the context drives.
///
/// Create calls follow the C shape: a status plus a handle written into an
/// output slot. Enumeration follows the count-then-fill pattern.
///
/// # Safety
///
/// Every method forwards to the Vulkan loader; callers uphold the usual
/// Vulkan valid-usage rules for the handles and create infos they pass.
pub trait InstanceApi {
    unsafe fn create_instance(
        &self,
        info: &vk::InstanceCreateInfo,
        slot: &mut vk::Instance,
    ) -> Result<(), vk::ErrorCode>;

    unsafe fn destroy_instance(
        &self,
        instance: vk::Instance,
        allocator: Option<&vk::AllocationCallbacks>,
    );

    /// With `properties` unset, writes the number of available extensions to
    /// `count`. Otherwise fills `properties` and writes how many were filled.
    unsafe fn enumerate_instance_extension_properties(
        &self,
        count: &mut u32,
        properties: Option<&mut [vk::ExtensionProperties]>,
    ) -> Result<(), vk::ErrorCode>;

    unsafe fn enumerate_instance_layer_names(&self) -> Result<Vec<vk::ExtensionName>, vk::ErrorCode>;

    unsafe fn loader_version(&self) -> Result<Version, vk::ErrorCode>;

    unsafe fn create_debug_messenger(
        &self,
        instance: vk::Instance,
        info: &vk::DebugUtilsMessengerCreateInfoEXT,
    ) -> Result<vk::DebugUtilsMessengerEXT, vk::ErrorCode>;

    unsafe fn destroy_debug_messenger(
        &self,
        instance: vk::Instance,
        messenger: vk::DebugUtilsMessengerEXT,
        allocator: Option<&vk::AllocationCallbacks>,
    );
}

/// [`InstanceApi`] backed by the system Vulkan loader.
pub struct VulkanApi {
    entry: Entry,
    instances: RefCell<HashMap<vk::Instance, Instance>>,
}

impl VulkanApi {
    pub fn load() -> Result<Self, AppError> {
        let loader = unsafe { LibloadingLoader::new(LIBRARY) }
            .map_err(|e| AppError::LoaderUnavailable(e.to_string()))?;
        let entry =
            unsafe { Entry::new(loader) }.map_err(|e| AppError::LoaderUnavailable(e.to_string()))?;
        tracing::debug!("Loaded Vulkan library `{}`.", LIBRARY);

        Ok(Self {
            entry,
            instances: RefCell::new(HashMap::new()),
        })
    }
}

impl InstanceApi for VulkanApi {
    unsafe fn create_instance(
        &self,
        info: &vk::InstanceCreateInfo,
        slot: &mut vk::Instance,
    ) -> Result<(), vk::ErrorCode> {
        let instance = unsafe { self.entry.create_instance(info, None)? };
        *slot = instance.handle();
        self.instances.borrow_mut().insert(*slot, instance);
        Ok(())
    }

    unsafe fn destroy_instance(
        &self,
        instance: vk::Instance,
        allocator: Option<&vk::AllocationCallbacks>,
    ) {
        match self.instances.borrow_mut().remove(&instance) {
            Some(instance) => unsafe { instance.destroy_instance(allocator) },
            None => tracing::warn!("Unknown instance {:?}, nothing to destroy.", instance),
        }
    }

    unsafe fn enumerate_instance_extension_properties(
        &self,
        count: &mut u32,
        properties: Option<&mut [vk::ExtensionProperties]>,
    ) -> Result<(), vk::ErrorCode> {
        let data = match properties {
            None => ptr::null_mut(),
            Some(out) => {
                *count = out.len() as u32;
                out.as_mut_ptr()
            }
        };

        let enumerate = self.entry.commands().enumerate_instance_extension_properties;
        let result = unsafe { enumerate(ptr::null(), count, data) };
        if result == vk::Result::SUCCESS || result == vk::Result::INCOMPLETE {
            Ok(())
        } else {
            Err(result.into())
        }
    }

    unsafe fn enumerate_instance_layer_names(&self) -> Result<Vec<vk::ExtensionName>, vk::ErrorCode> {
        let layers = unsafe { self.entry.enumerate_instance_layer_properties()? };
        Ok(layers.iter().map(|l| l.layer_name).collect())
    }

    unsafe fn loader_version(&self) -> Result<Version, vk::ErrorCode> {
        unsafe { self.entry.version() }
    }

    unsafe fn create_debug_messenger(
        &self,
        instance: vk::Instance,
        info: &vk::DebugUtilsMessengerCreateInfoEXT,
    ) -> Result<vk::DebugUtilsMessengerEXT, vk::ErrorCode> {
        let instances = self.instances.borrow();
        let instance = instances
            .get(&instance)
            .ok_or(vk::ErrorCode::INITIALIZATION_FAILED)?;
        unsafe { instance.create_debug_utils_messenger_ext(info, None) }
    }

    unsafe fn destroy_debug_messenger(
        &self,
        instance: vk::Instance,
        messenger: vk::DebugUtilsMessengerEXT,
        allocator: Option<&vk::AllocationCallbacks>,
    ) {
        match self.instances.borrow().get(&instance) {
            Some(instance) => unsafe {
                instance.destroy_debug_utils_messenger_ext(messenger, allocator)
            },
            None => tracing::warn!(
                "Unknown instance {:?}, cannot destroy messenger {:?}.",
                instance,
                messenger
            ),
        }
    }
}
