use std::sync::Arc;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

/// Window settings. The game renders a fixed logical resolution that is
/// scaled up by an integer factor for the initial window size.
pub struct PlatformConfig {
    pub title: String,
    pub logical_width: u32,
    pub logical_height: u32,
    pub scale: u32,
}

impl PlatformConfig {
    pub fn window_size(&self) -> (u32, u32) {
        let scale = self.scale.max(1);
        (self.logical_width * scale, self.logical_height * scale)
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "Dadkin".to_string(),
            logical_width: 480,
            logical_height: 270,
            scale: 2,
        }
    }
}

pub fn create_window(event_loop: &ActiveEventLoop, config: &PlatformConfig) -> Arc<Window> {
    let (width, height) = config.window_size();
    let attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_inner_size(winit::dpi::LogicalSize::new(width, height))
        .with_min_inner_size(winit::dpi::LogicalSize::new(
            config.logical_width,
            config.logical_height,
        ));

    let window = event_loop
        .create_window(attrs)
        .expect("Failed to create window");
    log::info!("Window created: {}x{} ({})", width, height, config.title);
    Arc::new(window)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_size_scales_logical_resolution() {
        let config = PlatformConfig::default();
        assert_eq!(config.window_size(), (960, 540));
    }

    #[test]
    fn zero_scale_falls_back_to_one() {
        let config = PlatformConfig {
            scale: 0,
            ..PlatformConfig::default()
        };
        assert_eq!(config.window_size(), (480, 270));
    }
}
