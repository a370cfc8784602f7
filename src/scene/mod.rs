pub mod decor;
pub mod node;
pub mod registry;

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::camera::{CameraFloat, OrbitControls, PerspectiveCamera};
use crate::render::Sprite;

use self::decor::Decor;
use self::registry::NodeRegistry;

/// `0xRRGGBB` to linear-ish RGB in [0, 1].
pub fn hex(rgb: u32) -> Vec3 {
    Vec3::new(
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
    )
}

pub fn hsl(h: f32, s: f32, l: f32) -> Vec3 {
    if s == 0.0 {
        return Vec3::splat(l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |t: f32| {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * 6.0 * (2.0 / 3.0 - t)
        } else {
            p
        }
    };
    Vec3::new(channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles, XYZ order.
    pub rotation: Vec3,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z),
            self.position,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Vec3,
    pub opacity: f32,
    pub emissive: Vec3,
    /// Lit materials respond to scene lights; basic ones draw their color as is.
    pub lit: bool,
}

impl Material {
    pub fn basic(color: Vec3, opacity: f32) -> Self {
        Self {
            color,
            opacity,
            emissive: Vec3::ZERO,
            lit: false,
        }
    }

    pub fn lit(color: Vec3, opacity: f32, emissive: Vec3) -> Self {
        Self {
            color,
            opacity,
            emissive,
            lit: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightTag {
    Ambient,
    Key,
    Accent,
    /// Depth-accent lights that only exist in parallax barrier mode.
    DepthFront,
    DepthBack,
    Dramatic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Ambient,
    Directional,
    Point { range: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub tag: LightTag,
    pub kind: LightKind,
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
}

#[derive(Debug, Clone, Default)]
pub struct Lighting {
    lights: Vec<Light>,
}

impl Lighting {
    pub fn space() -> Self {
        let mut lighting = Self::default();
        lighting.add(Light {
            tag: LightTag::Ambient,
            kind: LightKind::Ambient,
            color: hex(0x404040),
            intensity: 1.4,
            position: Vec3::ZERO,
        });
        lighting.add(Light {
            tag: LightTag::Key,
            kind: LightKind::Directional,
            color: hex(0xffffff),
            intensity: 1.0,
            position: Vec3::new(100.0, 100.0, 50.0),
        });
        for (color, position) in [
            (0x00ffff, Vec3::new(-50.0, 30.0, 50.0)),
            (0xff00ff, Vec3::new(50.0, -30.0, -50.0)),
        ] {
            lighting.add(Light {
                tag: LightTag::Accent,
                kind: LightKind::Point { range: 200.0 },
                color: hex(color),
                intensity: 0.8,
                position,
            });
        }
        lighting
    }

    pub fn add(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn remove(&mut self, tag: LightTag) -> usize {
        let before = self.lights.len();
        self.lights.retain(|l| l.tag != tag);
        before - self.lights.len()
    }

    pub fn has(&self, tag: LightTag) -> bool {
        self.lights.iter().any(|l| l.tag == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Light> {
        self.lights.iter()
    }

    /// Final RGBA for a material at `world`.
    pub fn shade(&self, material: &Material, world: Vec3) -> [f32; 4] {
        let rgb = if material.lit {
            let dir = world.normalize_or_zero();
            let mut light = Vec3::ZERO;
            for l in &self.lights {
                let weight = match l.kind {
                    LightKind::Ambient => 1.0,
                    LightKind::Directional => 0.5 + 0.5 * dir.dot(l.position.normalize_or_zero()),
                    LightKind::Point { range } => (1.0 - world.distance(l.position) / range).max(0.0),
                };
                light += l.color * l.intensity * weight;
            }
            (material.color * light + material.emissive).min(Vec3::ONE)
        } else {
            material.color
        };
        [rgb.x, rgb.y, rgb.z, material.opacity]
    }
}

#[derive(Debug)]
pub struct Scene {
    pub nodes: NodeRegistry,
    pub decor: Decor,
    pub lighting: Lighting,
}

impl Scene {
    pub fn new(decor: Decor) -> Self {
        Self {
            nodes: NodeRegistry::default(),
            decor,
            lighting: Lighting::space(),
        }
    }

    /// Flattens decorations then todo nodes into `out` (cleared first).
    pub fn collect(&self, out: &mut Vec<Sprite>) {
        out.clear();
        self.decor.collect(&self.lighting, out);
        for node in self.nodes.iter() {
            node.collect(&self.lighting, out);
        }
    }
}

/// Everything the render loop and view mode controller move around.
#[derive(Debug)]
pub struct Stage {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub float: CameraFloat,
}

impl Stage {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            camera: PerspectiveCamera::default(),
            controls: OrbitControls::default(),
            float: CameraFloat::default(),
        }
    }

    /// Moves the camera to `vantage` looking at the origin, dropping any
    /// pending orbit motion and float offset.
    pub fn set_vantage(&mut self, vantage: Vec3) {
        self.camera.position = vantage;
        self.camera.target = Vec3::ZERO;
        self.controls.target = Vec3::ZERO;
        self.controls.settle();
        self.float.reset();
    }
}
