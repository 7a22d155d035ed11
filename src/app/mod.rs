mod engine;
use crate::app::engine::Engine;
use crate::config::WindowConfig;
use crate::error::AppError;
use winit::{
    application::ApplicationHandler, event::WindowEvent, event_loop::ActiveEventLoop,
    window::WindowId,
};

#[derive(Default)]
pub struct App {
    config: WindowConfig,
    engine: Option<Engine>,
    error: Option<AppError>,
}

impl App {
    /// Consumes the app once the event loop has returned, surfacing any
    /// failure that stopped it.
    pub fn finish(mut self) -> Result<(), AppError> {
        self.engine = None;
        match self.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.engine.is_some() {
            return;
        }
        match Engine::new(event_loop, &self.config) {
            Ok(engine) => self.engine = Some(engine),
            Err(error) => {
                tracing::error!("Start-up failed: {}", error);
                self.error = Some(error);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(engine) = self.engine.as_mut() {
            engine.window_event(event_loop, window_id, event);
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.engine = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vulkanalia::vk;

    #[test]
    fn finish_without_error_is_ok() {
        assert!(App::default().finish().is_ok());
    }

    #[test]
    fn finish_returns_the_stored_error() {
        let app = App {
            error: Some(AppError::InstanceCreationFailure(
                vk::ErrorCode::INITIALIZATION_FAILED,
            )),
            ..Default::default()
        };
        let error = app.finish().unwrap_err();
        assert!(error.to_string().starts_with("failed to create instance!"));
    }
}
