use rand::Rng;

use crate::camera::{StereoParams, NORMAL_VANTAGE, PARALLAX_VANTAGE};
use crate::error::UniverseError;
use crate::render::{Frame, Renderer, StereoRenderer};
use crate::scene::{hex, Light, LightKind, LightTag, Stage};

use glam::Vec3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Normal,
    ParallaxBarrier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveRenderer {
    Normal,
    Stereo,
}

/// What a toggle did, for notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub mode: ViewMode,
    /// Parallax was requested but only the normal renderer exists.
    pub degraded: bool,
}

pub struct ViewModeController {
    mode: ViewMode,
    active: ActiveRenderer,
    normal: Box<dyn Renderer>,
    stereo: Option<Box<dyn StereoRenderer>>,
    params: StereoParams,
    parallax_rotate_speed: f32,
    indicator: bool,
}

impl ViewModeController {
    pub fn new(
        normal: Box<dyn Renderer>,
        stereo: Option<Box<dyn StereoRenderer>>,
        params: StereoParams,
        parallax_rotate_speed: f32,
    ) -> Self {
        if stereo.is_none() {
            log::warn!("parallax barrier renderer failed to initialize; 3D view will fall back to normal rendering");
        }
        Self {
            mode: ViewMode::Normal,
            active: ActiveRenderer::Normal,
            normal,
            stereo,
            params,
            parallax_rotate_speed,
            indicator: false,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn active(&self) -> ActiveRenderer {
        self.active
    }

    /// Whether the on-screen "parallax barrier active" badge should show.
    pub fn indicator(&self) -> bool {
        self.indicator
    }

    pub fn toggle(&mut self, stage: &mut Stage, rng: &mut impl Rng) -> Transition {
        match self.mode {
            ViewMode::Normal => self.enter_parallax(stage),
            ViewMode::ParallaxBarrier => self.enter_normal(stage, rng),
        }
    }

    pub fn enter_parallax(&mut self, stage: &mut Stage) -> Transition {
        if self.mode == ViewMode::ParallaxBarrier {
            return Transition {
                mode: self.mode,
                degraded: self.active == ActiveRenderer::Normal,
            };
        }
        self.mode = ViewMode::ParallaxBarrier;

        let degraded = match self.stereo.as_mut() {
            Some(stereo) => {
                stereo.set_stereo(self.params);
                self.active = ActiveRenderer::Stereo;
                false
            }
            None => {
                log::warn!("{}, rendering with the normal renderer", UniverseError::RendererUnavailable);
                self.active = ActiveRenderer::Normal;
                true
            }
        };

        stage.controls.auto_rotate = true;
        stage.controls.auto_rotate_speed = self.parallax_rotate_speed;
        stage.set_vantage(PARALLAX_VANTAGE);

        let scene = &mut stage.scene;
        scene.nodes.apply_depth_layout();
        scene.lighting.add(Light {
            tag: LightTag::DepthFront,
            kind: LightKind::Directional,
            color: hex(0x00ffff),
            intensity: 0.5,
            position: Vec3::new(0.0, 0.0, 50.0),
        });
        scene.lighting.add(Light {
            tag: LightTag::DepthBack,
            kind: LightKind::Directional,
            color: hex(0xff4444),
            intensity: 0.3,
            position: Vec3::new(0.0, 0.0, -50.0),
        });
        scene.lighting.add(Light {
            tag: LightTag::Dramatic,
            kind: LightKind::Point { range: 100.0 },
            color: hex(0x00ffff),
            intensity: 2.0,
            position: Vec3::new(0.0, 50.0, 50.0),
        });
        scene.decor.starfield.enhance();
        self.indicator = true;

        log::info!("view mode: parallax barrier (degraded: {degraded})");
        Transition {
            mode: self.mode,
            degraded,
        }
    }

    /// Node positions are re-randomized, not restored.
    pub fn enter_normal(&mut self, stage: &mut Stage, rng: &mut impl Rng) -> Transition {
        if self.mode == ViewMode::Normal {
            return Transition {
                mode: self.mode,
                degraded: false,
            };
        }
        self.mode = ViewMode::Normal;
        self.active = ActiveRenderer::Normal;

        stage.controls.auto_rotate = false;
        stage.set_vantage(NORMAL_VANTAGE);

        let scene = &mut stage.scene;
        scene.nodes.scatter(rng);
        for tag in [LightTag::DepthFront, LightTag::DepthBack, LightTag::Dramatic] {
            scene.lighting.remove(tag);
        }
        scene.decor.starfield.restore();
        self.indicator = false;

        log::info!("view mode: normal");
        Transition {
            mode: self.mode,
            degraded: false,
        }
    }

    pub fn render(&mut self, frame: &Frame<'_>) {
        match (self.active, self.stereo.as_mut()) {
            (ActiveRenderer::Stereo, Some(stereo)) => stereo.render(frame),
            _ => self.normal.render(frame),
        }
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.normal.set_size(width, height);
        if let Some(stereo) = self.stereo.as_mut() {
            stereo.set_size(width, height);
        }
    }

    pub fn set_pixel_ratio(&mut self, ratio: f32) {
        self.normal.set_pixel_ratio(ratio);
        if let Some(stereo) = self.stereo.as_mut() {
            stereo.set_pixel_ratio(ratio);
        }
    }

    pub fn pixel_ratio(&self) -> f32 {
        match (self.active, self.stereo.as_ref()) {
            (ActiveRenderer::Stereo, Some(stereo)) => stereo.pixel_ratio(),
            _ => self.normal.pixel_ratio(),
        }
    }
}
