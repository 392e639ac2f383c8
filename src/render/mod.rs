//! Rendering: colour model, drawing surfaces, meters and panels

pub mod color;
pub mod meter;
pub mod panels;
pub mod surface;

pub use color::{Color, Palette};
pub use meter::MeterScale;
pub use surface::{Canvas, ChannelOrder, Display, Font, Framebuffer, MemoryDisplay, PixelFormat};
