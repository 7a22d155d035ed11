use vulkanalia::Version;
use vulkanalia::vk;
use winit::dpi::LogicalSize;
use winit::window::WindowAttributes;

pub const APPLICATION_NAME: &[u8] = b"Hello Triangle\0";
pub const ENGINE_NAME: &[u8] = b"No Engine\0";

pub const VALIDATION_ENABLED: bool = cfg!(debug_assertions);

pub const VALIDATION_LAYER: vk::ExtensionName =
    vk::ExtensionName::from_bytes(b"VK_LAYER_KHRONOS_validation");

/// MoltenVK only lists its devices to instances that opt into portability
/// enumeration, starting with this loader version.
pub const PORTABILITY_REQUESTED: bool = cfg!(target_os = "macos");

pub const PORTABILITY_MACOS_VERSION: Version = Version::new(1, 3, 216);

#[derive(Clone, Debug, PartialEq)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "Vulkan Learning".to_string(),
            resizable: false,
        }
    }
}

impl WindowConfig {
    /// winit never binds a GL context to a window, so no hint is needed for that.
    pub fn attributes(&self) -> WindowAttributes {
        WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(self.width, self.height))
            .with_resizable(self.resizable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_is_fixed_size() {
        let config = WindowConfig::default();
        assert_eq!((config.width, config.height), (800, 600));
        assert!(!config.resizable);

        let attributes = config.attributes();
        assert!(!attributes.resizable);
        assert_eq!(attributes.title, "Vulkan Learning");
    }

    #[test]
    fn application_names_are_nul_terminated() {
        assert_eq!(APPLICATION_NAME.last(), Some(&0));
        assert_eq!(ENGINE_NAME.last(), Some(&0));
    }
}
