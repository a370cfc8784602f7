use crate::render::{Frame, Sprite};
use crate::scene::Stage;
use crate::view_mode::ViewModeController;

const CLEAR: [f32; 4] = [0.0, 0.02, 0.067, 1.0];

/// Frames observed over roughly the last second.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    frames: u32,
    window_start_ms: Option<f64>,
    fps: Option<u32>,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self {
            frames: 0,
            window_start_ms: None,
            fps: None,
        }
    }
}

impl FpsCounter {
    /// Counts a frame; yields a fresh reading once a second has elapsed.
    pub fn frame(&mut self, now_ms: f64) -> Option<u32> {
        let start = *self.window_start_ms.get_or_insert(now_ms);
        self.frames += 1;
        let elapsed = now_ms - start;
        if elapsed < 1000.0 {
            return None;
        }
        let fps = (f64::from(self.frames) * 1000.0 / elapsed).round() as u32;
        self.fps = Some(fps);
        self.frames = 0;
        self.window_start_ms = Some(now_ms);
        Some(fps)
    }

    pub fn fps(&self) -> Option<u32> {
        self.fps
    }
}

/// Lowers resolution and rotation speed when frames drop below the floor.
/// One-way: quality is not restored once the rate recovers.
#[derive(Debug, Clone)]
pub struct QualityPolicy {
    pub floor: u32,
    pub degraded_rotate_speed: f32,
    pub device_pixel_ratio: f32,
    degraded: bool,
}

impl QualityPolicy {
    pub fn new(floor: u32, degraded_rotate_speed: f32, device_pixel_ratio: f32) -> Self {
        Self {
            floor,
            degraded_rotate_speed,
            device_pixel_ratio,
            degraded: false,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Returns true on the reading that triggers degradation.
    pub fn observe(&mut self, fps: u32, stage: &mut Stage, views: &mut ViewModeController) -> bool {
        if fps >= self.floor {
            return false;
        }
        views.set_pixel_ratio((self.device_pixel_ratio * 0.5).min(1.0));
        stage.controls.rotate_speed_cap = Some(self.degraded_rotate_speed);
        if self.degraded {
            return false;
        }
        self.degraded = true;
        log::warn!("{fps} fps is below {}; reducing render quality", self.floor);
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub fps: Option<u32>,
    pub degraded: bool,
    pub sprites: usize,
}

pub struct RenderLoop {
    pub fps: FpsCounter,
    pub quality: QualityPolicy,
    /// Timestamp of the first tick; animation time counts from here.
    start_ms: Option<f64>,
    sprites: Vec<Sprite>,
}

impl RenderLoop {
    pub fn new(quality: QualityPolicy) -> Self {
        Self {
            fps: FpsCounter::default(),
            quality,
            start_ms: None,
            sprites: Vec::new(),
        }
    }

    /// Advances every animation and hands exactly one frame to the active renderer.
    pub fn tick(&mut self, now_ms: f64, stage: &mut Stage, views: &mut ViewModeController) -> TickReport {
        let mut report = TickReport::default();

        if let Some(fps) = self.fps.frame(now_ms) {
            report.fps = Some(fps);
            report.degraded = self.quality.observe(fps, stage, views);
        }

        // Epoch milliseconds do not fit an f32; only the elapsed span is narrowed.
        let start_ms = *self.start_ms.get_or_insert(now_ms);
        let time_s = ((now_ms - start_ms) * 0.001) as f32;
        stage.scene.decor.advance(time_s);

        stage.scene.nodes.advance(now_ms);
        stage.scene.nodes.animate(time_s);

        if stage.controls.auto_rotate {
            stage.float.apply(&mut stage.camera, time_s);
        }
        stage.controls.update(&mut stage.camera);

        stage.scene.collect(&mut self.sprites);
        report.sprites = self.sprites.len();
        views.render(&Frame {
            camera: &stage.camera,
            sprites: &self.sprites,
            clear_color: CLEAR,
        });
        report
    }
}
