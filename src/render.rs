use glam::Vec3;

use crate::camera::{PerspectiveCamera, StereoParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Shape {
    /// Filled, softly shaded sphere body.
    Disc = 0,
    /// Annulus between 80% and 100% of the radius.
    Ring = 1,
    /// Thin outline at the radius.
    Shell = 2,
    /// Small glowing point.
    Spark = 3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub position: Vec3,
    /// World-space radius.
    pub radius: f32,
    /// Linear RGBA, alpha is opacity.
    pub color: [f32; 4],
    pub shape: Shape,
}

pub struct Frame<'a> {
    pub camera: &'a PerspectiveCamera,
    pub sprites: &'a [Sprite],
    pub clear_color: [f32; 4],
}

pub trait Renderer {
    fn render(&mut self, frame: &Frame<'_>);

    fn set_size(&mut self, width: u32, height: u32);

    fn set_pixel_ratio(&mut self, ratio: f32);

    fn pixel_ratio(&self) -> f32;
}

/// Renderer producing an interleaved left/right pair for a parallax barrier.
pub trait StereoRenderer: Renderer {
    fn set_stereo(&mut self, params: StereoParams);

    fn stereo(&self) -> StereoParams;
}

/// Draws nothing. Stands in when no graphics context is available so the
/// todo side keeps working without a scene.
#[derive(Debug, Clone)]
pub struct NullRenderer {
    pixel_ratio: f32,
}

impl Default for NullRenderer {
    fn default() -> Self {
        Self { pixel_ratio: 1.0 }
    }
}

impl Renderer for NullRenderer {
    fn render(&mut self, _frame: &Frame<'_>) {}

    fn set_size(&mut self, _width: u32, _height: u32) {}

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio;
    }

    fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }
}
