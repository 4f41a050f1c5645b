pub mod canvas;
pub mod gpu_context;

pub use canvas::Canvas;
pub use gpu_context::GpuContext;
