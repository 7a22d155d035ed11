use std::ffi::CStr;
use std::io::{self, Write};
use std::marker::PhantomData;
use std::os::raw::c_void;
use std::rc::Rc;

use vulkanalia::vk::{self, HasBuilder};

use crate::config::{
    APPLICATION_NAME, ENGINE_NAME, PORTABILITY_MACOS_VERSION, PORTABILITY_REQUESTED,
    VALIDATION_ENABLED, VALIDATION_LAYER,
};
use crate::error::AppError;
use crate::handle::ScopedHandle;

pub use api::{InstanceApi, VulkanApi};

mod api;

/// The instance-level Vulkan objects of the application.
pub struct Context<A: InstanceApi + 'static> {
    // Dropped before `instance`: the messenger is destroyed through it.
    messenger: ScopedHandle<vk::DebugUtilsMessengerEXT>,
    instance: ScopedHandle<vk::Instance>,
    _api: PhantomData<A>,
}

/// Optional instance features, resolved against what the loader offers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
struct InstanceFeatures {
    validation: bool,
    portability: bool,
}

impl<A: InstanceApi + 'static> Context<A> {
    /// Creates the instance with `required_extensions` enabled, then writes the
    /// extensions the loader supports to `out`.
    pub unsafe fn create(
        api: Rc<A>,
        required_extensions: &[&vk::ExtensionName],
        out: &mut impl Write,
    ) -> Result<Self, AppError> {
        unsafe {
            Self::create_with(
                api,
                required_extensions,
                out,
                VALIDATION_ENABLED,
                PORTABILITY_REQUESTED,
            )
        }
    }

    unsafe fn create_with(
        api: Rc<A>,
        required_extensions: &[&vk::ExtensionName],
        out: &mut impl Write,
        validation_requested: bool,
        portability_requested: bool,
    ) -> Result<Self, AppError> {
        let features = InstanceFeatures {
            validation: validation_requested && unsafe { Self::validation_available(&api) },
            portability: portability_requested && unsafe { Self::portability_needed(&api) },
        };

        let instance = unsafe { Self::create_instance(&api, required_extensions, features)? };

        let extensions = unsafe { available_extensions(api.as_ref())? };
        if let Err(error) = report_extensions(out, &extensions) {
            tracing::warn!("Could not print the extension report: {}", error);
        }

        let mut messenger = if features.validation {
            let api = api.clone();
            ScopedHandle::<vk::DebugUtilsMessengerEXT>::with_parent(
                &instance.parent_ref(),
                move |instance, messenger, allocator| unsafe {
                    api.destroy_debug_messenger(instance, messenger, allocator)
                },
            )
        } else {
            ScopedHandle::empty()
        };

        if features.validation {
            let info = debug_messenger_info();
            match unsafe { api.create_debug_messenger(instance.get(), &info) } {
                Ok(handle) => messenger.replace(handle),
                Err(code) => tracing::warn!("Debug messenger unavailable ({}).", code),
            }
        }

        Ok(Self {
            messenger,
            instance,
            _api: PhantomData,
        })
    }

    unsafe fn validation_available(api: &A) -> bool {
        match unsafe { api.enumerate_instance_layer_names() } {
            Ok(layers) if layers.contains(&VALIDATION_LAYER) => true,
            Ok(_) => {
                tracing::warn!("Validation layer requested but not supported, skipping it.");
                false
            }
            Err(code) => {
                tracing::warn!("Could not enumerate instance layers ({}).", code);
                false
            }
        }
    }

    unsafe fn portability_needed(api: &A) -> bool {
        match unsafe { api.loader_version() } {
            Ok(version) => version >= PORTABILITY_MACOS_VERSION,
            Err(code) => {
                tracing::warn!("Could not query the loader version ({}).", code);
                false
            }
        }
    }

    unsafe fn create_instance(
        api: &Rc<A>,
        required_extensions: &[&vk::ExtensionName],
        features: InstanceFeatures,
    ) -> Result<ScopedHandle<vk::Instance>, AppError> {
        let app_info = vk::ApplicationInfo::builder()
            .application_name(APPLICATION_NAME)
            .application_version(vk::make_version(1, 0, 0))
            .engine_name(ENGINE_NAME)
            .engine_version(vk::make_version(1, 0, 0))
            .api_version(vk::make_version(1, 0, 0));

        let mut extensions = required_extensions
            .iter()
            .map(|e| e.as_ptr())
            .collect::<Vec<_>>();

        let layers = if features.validation {
            extensions.push(vk::EXT_DEBUG_UTILS_EXTENSION.name.as_ptr());
            vec![VALIDATION_LAYER.as_ptr()]
        } else {
            Vec::new()
        };

        // Enable portability extensions for MoltenVK on macOS
        let flags = if features.portability {
            extensions.push(
                vk::KHR_GET_PHYSICAL_DEVICE_PROPERTIES2_EXTENSION
                    .name
                    .as_ptr(),
            );
            extensions.push(vk::KHR_PORTABILITY_ENUMERATION_EXTENSION.name.as_ptr());
            vk::InstanceCreateFlags::ENUMERATE_PORTABILITY_KHR
        } else {
            vk::InstanceCreateFlags::empty()
        };

        let info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_layer_names(&layers)
            .enabled_extension_names(&extensions)
            .flags(flags);

        let mut instance = {
            let api = api.clone();
            ScopedHandle::<vk::Instance>::new(move |instance, allocator| unsafe {
                api.destroy_instance(instance, allocator)
            })
        };

        unsafe { api.create_instance(&info, &mut instance.slot_for_write()) }
            .map_err(AppError::InstanceCreationFailure)?;

        tracing::info!(
            "Created Vulkan instance {:?} with {} extension(s).",
            instance.get(),
            extensions.len()
        );
        Ok(instance)
    }

    pub fn instance(&self) -> vk::Instance {
        self.instance.get()
    }

    pub fn has_debug_messenger(&self) -> bool {
        !self.messenger.is_empty()
    }
}

/// Queries the supported instance extensions with the count-then-fill pattern.
pub unsafe fn available_extensions(
    api: &impl InstanceApi,
) -> Result<Vec<vk::ExtensionProperties>, AppError> {
    let mut count = 0;
    unsafe { api.enumerate_instance_extension_properties(&mut count, None) }
        .map_err(AppError::ExtensionEnumeration)?;

    let mut extensions = vec![vk::ExtensionProperties::default(); count as usize];
    unsafe { api.enumerate_instance_extension_properties(&mut count, Some(&mut extensions)) }
        .map_err(AppError::ExtensionEnumeration)?;
    extensions.truncate(count as usize);

    Ok(extensions)
}

pub fn report_extensions(
    out: &mut impl Write,
    extensions: &[vk::ExtensionProperties],
) -> io::Result<()> {
    writeln!(out, "available extensions:")?;
    for extension in extensions {
        tracing::debug!(
            "Instance extension `{}` (revision {}).",
            extension.extension_name,
            extension.spec_version
        );
        writeln!(out, "\t{}", extension.extension_name)?;
    }
    Ok(())
}

fn debug_messenger_info() -> vk::DebugUtilsMessengerCreateInfoEXT {
    vk::DebugUtilsMessengerCreateInfoEXT::builder()
        .message_severity(vk::DebugUtilsMessageSeverityFlagsEXT::all())
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .user_callback(Some(debug_callback))
        .build()
}

extern "system" fn debug_callback(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    type_: vk::DebugUtilsMessageTypeFlagsEXT,
    data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _: *mut c_void,
) -> vk::Bool32 {
    let data = unsafe { *data };
    let message = unsafe { CStr::from_ptr(data.message) }.to_string_lossy();

    if severity >= vk::DebugUtilsMessageSeverityFlagsEXT::ERROR {
        tracing::error!("({:?}) {}", type_, message);
    } else if severity >= vk::DebugUtilsMessageSeverityFlagsEXT::WARNING {
        tracing::warn!("({:?}) {}", type_, message);
    } else if severity >= vk::DebugUtilsMessageSeverityFlagsEXT::INFO {
        tracing::debug!("({:?}) {}", type_, message);
    } else {
        tracing::trace!("({:?}) {}", type_, message);
    }

    vk::FALSE
}
