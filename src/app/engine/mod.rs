use std::io;
use std::rc::Rc;
use std::sync::Arc;

use context::{Context, VulkanApi};
use vulkanalia::window as vk_window;
use winit::{
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

use crate::config::WindowConfig;
use crate::error::AppError;

mod context;

pub struct Engine {
    // Instance handles go before the window they were created for.
    context: Context<VulkanApi>,
    window: Arc<Window>,
}

impl Engine {
    pub fn new(event_loop: &ActiveEventLoop, config: &WindowConfig) -> Result<Self, AppError> {
        let window = Arc::new(event_loop.create_window(config.attributes())?);
        tracing::info!(
            "Opened window `{}` ({}x{}, id {:?}).",
            config.title,
            config.width,
            config.height,
            window.id()
        );

        let api = Rc::new(VulkanApi::load()?);
        let required_extensions = vk_window::get_required_instance_extensions(window.as_ref());
        // SAFETY: the window outlives the instance; `context` is dropped first.
        let context = unsafe { Context::create(api, required_extensions, &mut io::stdout())? };
        tracing::debug!(
            "Instance {:?} ready (debug messenger: {}).",
            context.instance(),
            context.has_debug_messenger()
        );

        Ok(Self { context, window })
    }

    pub fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if window_id != self.window.id() {
            return;
        }
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!(
                    "Close requested, releasing instance {:?}.",
                    self.context.instance()
                );
                event_loop.exit();
            }
            _ => {}
        }
    }
}
