//! Demo window: winit event handling around the [`SimulationLoop`].

use std::sync::Arc;
use std::time::Duration;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

use crate::error::SimulationError;
use crate::gpu::GpuState;
use crate::input::{PointerInput, SharedPointer};
use crate::physics::RapierWorld;
use crate::simulation::SimulationLoop;
use crate::template::TemplateState;
use crate::time::FrameClock;

/// Longest the window waits for a loading template before the first frame.
const TEMPLATE_WAIT: Duration = Duration::from_secs(2);

pub(crate) struct App {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    sim: SimulationLoop<RapierWorld>,
    input: PointerInput,
    clock: FrameClock,
    error: Option<SimulationError>,
}

impl App {
    pub(crate) fn new(sim: SimulationLoop<RapierWorld>, pointer: SharedPointer) -> Self {
        Self {
            window: None,
            gpu_state: None,
            sim,
            input: PointerInput::new(pointer),
            clock: FrameClock::new(),
            error: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub(crate) fn into_error(self) -> Option<SimulationError> {
        self.error
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SimulationError> {
        let window_attrs = Window::default_attributes()
            .with_title("swarmlight")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let size = window.inner_size();
        self.input.set_window_size(size.width, size.height);

        // Population happens on the first frame; give the loader a bounded chance to finish first.
        match self.sim.template().wait_timeout(TEMPLATE_WAIT) {
            TemplateState::Ready(_) => {}
            TemplateState::Pending => log::warn!(
                "template still loading after {:?}, continuing without bodies",
                TEMPLATE_WAIT
            ),
            TemplateState::Failed(reason) => log::warn!("continuing without bodies: {}", reason),
        }

        let gpu_state = pollster::block_on(GpuState::new(window.clone(), self.sim.config().bloom))?;

        window.request_redraw();
        self.window = Some(window);
        self.gpu_state = Some(gpu_state);
        Ok(())
    }

    fn update_title(&self, fps: f32) {
        log::debug!("{:.1} fps, {} bodies", fps, self.sim.bodies().len());
        if let Some(window) = &self.window {
            window.set_title(&format!(
                "swarmlight | {} bodies | {:.0} fps",
                self.sim.bodies().len(),
                fps
            ));
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                log::error!("{}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("closing after {} frames", self.sim.frames());
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(fps) = self.clock.tick() {
                    self.update_title(fps);
                }

                if let Some(gpu_state) = &mut self.gpu_state {
                    match self.sim.frame(gpu_state) {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            gpu_state.reconfigure()
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("GPU out of memory");
                            event_loop.exit();
                        }
                        Err(e) => log::warn!("Render error: {:?}", e),
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
