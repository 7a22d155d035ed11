use thiserror::Error;
use vulkanalia::vk;
use winit::error::{EventLoopError, OsError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create instance! ({0})")]
    InstanceCreationFailure(vk::ErrorCode),

    #[error("failed to enumerate instance extensions ({0})")]
    ExtensionEnumeration(vk::ErrorCode),

    #[error("failed to load the Vulkan library: {0}")]
    LoaderUnavailable(String),

    #[error("failed to create window: {0}")]
    WindowCreation(#[from] OsError),

    #[error("failed to start the window system: {0}")]
    EventLoop(#[from] EventLoopError),
}
