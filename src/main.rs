use crate::app::App;
use crate::error::AppError;
use anyhow::Result;
use winit::event_loop::EventLoop;

mod app;
mod config;
mod error;
mod handle;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let mut app = App::default();
    let event_loop = EventLoop::new().map_err(AppError::from)?;

    event_loop.run_app(&mut app).map_err(AppError::from)?;

    app.finish()?;
    Ok(())
}
