use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::Rng;

use super::{hex, Lighting, Material, Transform};
use crate::account::{Todo, TodoId};
use crate::render::{Shape, Sprite};

const OPEN: u32 = 0x00ffff;
const DONE: u32 = 0x00ff00;
const GLOW: u32 = 0x002244;
const HALO_POINTS: usize = 30;

/// Visual attributes derived from `completed` alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    pub color: Vec3,
    pub opacity: f32,
    pub emissive: Vec3,
}

impl Appearance {
    pub fn of(completed: bool) -> Self {
        if completed {
            Self {
                color: hex(DONE),
                opacity: 0.7,
                emissive: hex(0x002200),
            }
        } else {
            Self {
                color: hex(OPEN),
                opacity: 0.9,
                emissive: hex(0x002222),
            }
        }
    }
}

fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

/// Position tween sampled once per display frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub from: Vec3,
    pub to: Vec3,
    pub start_ms: f64,
    pub duration_ms: f64,
}

impl Tween {
    /// Position at `now_ms` and whether the tween has finished.
    pub fn sample(&self, now_ms: f64) -> (Vec3, bool) {
        let progress = if self.duration_ms <= 0.0 {
            1.0
        } else {
            ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
        };
        let eased = ease_out_cubic(progress) as f32;
        (self.from + (self.to - self.from) * eased, progress >= 1.0)
    }
}

/// One-shot scale bump after completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    pub restore_scale: f32,
    pub until_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Part {
    pub transform: Transform,
    pub material: Material,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Halo {
    pub transform: Transform,
    pub material: Material,
    pub points: Vec<Vec3>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTiming {
    pub entrance_delay_ms: f64,
    pub entrance_duration_ms: f64,
    pub pulse_scale: f32,
    pub pulse_ms: f64,
}

impl Default for NodeTiming {
    fn default() -> Self {
        Self {
            entrance_delay_ms: 100.0,
            entrance_duration_ms: 2000.0,
            pulse_scale: 1.3,
            pulse_ms: 300.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: TodoId,
    pub transform: Transform,
    pub body: Part,
    pub ring: Part,
    pub shell: Part,
    pub halo: Halo,
    pub entrance: Option<Tween>,
    pub pulse: Option<Pulse>,
    /// Parallax mode glow on the body.
    pub highlighted: bool,
    completed: bool,
}

/// Random resting spot: horizontal radius in [50, 150], height in [-50, 50].
pub fn random_rest(rng: &mut impl Rng) -> Vec3 {
    let angle = rng.gen::<f32>() * TAU;
    let radius = 50.0 + rng.gen::<f32>() * 100.0;
    let height = (rng.gen::<f32>() - 0.5) * 100.0;
    Vec3::new(angle.cos() * radius, height, angle.sin() * radius)
}

impl SceneNode {
    /// Builds the node three times farther out than its resting spot, with an
    /// entrance tween that pulls it in.
    pub fn new(todo: &Todo, now_ms: f64, timing: &NodeTiming, rng: &mut impl Rng) -> Self {
        let rest = random_rest(rng);
        let start = Vec3::new(rest.x * 3.0, rest.y, rest.z * 3.0);
        let look = Appearance::of(todo.completed);

        let points = (0..HALO_POINTS)
            .map(|_| {
                let radius = 12.0 + rng.gen::<f32>() * 8.0;
                let theta = rng.gen::<f32>() * TAU;
                let phi = rng.gen::<f32>() * PI;
                Vec3::new(
                    radius * phi.sin() * theta.cos(),
                    radius * phi.sin() * theta.sin(),
                    radius * phi.cos(),
                )
            })
            .collect();

        let mut ring = Transform::default();
        ring.rotation.x = PI / 2.0;

        Self {
            id: todo.id,
            transform: Transform::at(start),
            body: Part {
                transform: Transform::default(),
                material: Material::lit(look.color, look.opacity, look.emissive),
            },
            ring: Part {
                transform: ring,
                material: Material::basic(look.color, 0.3),
            },
            shell: Part {
                transform: Transform::default(),
                material: Material::basic(hex(0xffffff), 0.4),
            },
            halo: Halo {
                transform: Transform::default(),
                material: Material::basic(look.color, 0.8),
                points,
            },
            entrance: Some(Tween {
                from: start,
                to: rest,
                start_ms: now_ms + timing.entrance_delay_ms,
                duration_ms: timing.entrance_duration_ms,
            }),
            pulse: None,
            highlighted: false,
            completed: todo.completed,
        }
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Re-applies the completion look; returns true when the todo has just
    /// become complete.
    pub fn restyle(&mut self, completed: bool) -> bool {
        let became_complete = completed && !self.completed;
        self.completed = completed;
        let look = Appearance::of(completed);
        self.body.material.color = look.color;
        self.body.material.opacity = look.opacity;
        self.body.material.emissive = look.emissive;
        self.ring.material.color = look.color;
        self.halo.material.color = look.color;
        became_complete
    }

    pub fn start_pulse(&mut self, now_ms: f64, timing: &NodeTiming) {
        let restore_scale = match self.pulse {
            Some(p) => p.restore_scale,
            None => self.transform.scale,
        };
        self.transform.scale = restore_scale * timing.pulse_scale;
        self.pulse = Some(Pulse {
            restore_scale,
            until_ms: now_ms + timing.pulse_ms,
        });
    }

    /// Samples the entrance tween and ends an expired pulse.
    pub fn advance(&mut self, now_ms: f64) {
        if let Some(tween) = self.entrance {
            if now_ms >= tween.start_ms {
                let (position, done) = tween.sample(now_ms);
                self.transform.position = position;
                if done {
                    self.entrance = None;
                }
            }
        }
        if let Some(pulse) = self.pulse {
            if now_ms >= pulse.until_ms {
                self.transform.scale = pulse.restore_scale;
                self.pulse = None;
            }
        }
    }

    /// Per-frame float and spin. The float offset accumulates onto the
    /// position, so nodes drift over long sessions.
    pub fn animate(&mut self, index: usize, time_s: f32) {
        let i = index as f32;
        let t = &mut self.transform;
        t.rotation.y += 0.02;
        t.rotation.x += 0.01;

        let speed = 0.5 + i * 0.1;
        let height = 2.0 + i * 0.5;
        let circle = 3.0;
        t.position.y += (time_s * speed + i).sin() * height;
        t.position.x += (time_s * speed * 0.7 + i).cos() * circle;
        t.position.z += (time_s * speed * 0.5 + i).sin() * circle;

        self.body.transform.rotation.y += 0.03;
        self.body.transform.rotation.z += 0.02;

        self.ring.transform.rotation.z += 0.05;
        self.ring.transform.scale = 1.0 + (time_s * 2.0 + i).sin() * 0.2;

        self.shell.transform.rotation.x += 0.04;
        self.shell.transform.rotation.y -= 0.03;

        for (k, p) in self.halo.points.iter_mut().enumerate() {
            let j = (k * 3) as f32;
            p.x += (time_s * 3.0 + j).sin() * 0.1;
            p.y += (time_s * 2.0 + j).cos() * 0.1;
            p.z += (time_s * 4.0 + j).sin() * 0.1;
        }
    }

    pub fn body_material(&self) -> Material {
        let mut material = self.body.material;
        if self.highlighted {
            material.emissive = hex(GLOW);
        }
        material
    }

    pub fn collect(&self, lighting: &Lighting, out: &mut Vec<Sprite>) {
        let group = self.transform.matrix();
        let center = self.transform.position;
        let scale = self.transform.scale;

        out.push(Sprite {
            position: center,
            radius: 6.0 * scale * self.body.transform.scale,
            color: lighting.shade(&self.body_material(), center),
            shape: Shape::Disc,
        });
        out.push(Sprite {
            position: center,
            radius: 10.0 * scale * self.ring.transform.scale,
            color: lighting.shade(&self.ring.material, center),
            shape: Shape::Ring,
        });
        out.push(Sprite {
            position: center,
            radius: 6.5 * scale * self.shell.transform.scale,
            color: lighting.shade(&self.shell.material, center),
            shape: Shape::Shell,
        });

        let halo = group * self.halo.transform.matrix();
        let color = lighting.shade(&self.halo.material, center);
        out.extend(self.halo.points.iter().map(|p| Sprite {
            position: halo.transform_point3(*p),
            radius: 0.75 * scale,
            color,
            shape: Shape::Spark,
        }));
    }
}
