use std::f32::consts::{PI, TAU};

use glam::{Mat4, Vec3};
use rand::Rng;

use super::{hex, hsl, Lighting, Material, Transform};
use crate::render::{Shape, Sprite};

#[derive(Debug, Clone)]
pub struct Starfield {
    pub points: Vec<(Vec3, Vec3)>,
    pub transform: Transform,
    pub size: f32,
    pub base_opacity: f32,
    pub opacity: f32,
}

impl Starfield {
    pub fn new(count: usize, rng: &mut impl Rng) -> Self {
        let points = (0..count)
            .map(|_| {
                let p = Vec3::new(
                    (rng.gen::<f32>() - 0.5) * 2000.0,
                    (rng.gen::<f32>() - 0.5) * 2000.0,
                    (rng.gen::<f32>() - 0.5) * 2000.0,
                );
                let c = hsl(rng.gen(), 0.5, 0.5 + rng.gen::<f32>() * 0.5);
                (p, c)
            })
            .collect();
        Self {
            points,
            transform: Transform::default(),
            size: 2.0,
            base_opacity: 0.8,
            opacity: 0.8,
        }
    }

    /// Larger, fully opaque stars for depth perception.
    pub fn enhance(&mut self) {
        self.size = 3.0;
        self.base_opacity = 1.0;
        self.opacity = 1.0;
    }

    pub fn restore(&mut self) {
        self.size = 2.0;
        self.base_opacity = 0.8;
        self.opacity = 0.8;
    }

    pub fn advance(&mut self, time_s: f32) {
        self.transform.rotation.y += 0.0002;
        self.transform.rotation.x += 0.0001;
        self.opacity = self.base_opacity - 0.2 + (time_s * 2.0).sin() * 0.2;
    }
}

#[derive(Debug, Clone)]
pub struct Planet {
    pub radius: f32,
    pub distance: f32,
    pub color: Vec3,
    /// Radians per frame.
    pub speed: f32,
    pub angle: f32,
    pub ringed: bool,
    pub transform: Transform,
}

impl Planet {
    pub fn advance(&mut self) {
        self.angle += self.speed;
        self.transform.position = Vec3::new(
            self.angle.cos() * self.distance,
            0.0,
            self.angle.sin() * self.distance,
        );
        self.transform.rotation.y += 0.01;
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpaceStation {
    pub transform: Transform,
    pub ring_spin: [f32; 3],
}

impl SpaceStation {
    pub fn advance(&mut self) {
        self.transform.rotation.y += 0.005;
        // Rings sit after the hub among the station's children.
        for (i, spin) in self.ring_spin.iter_mut().enumerate() {
            *spin += 0.01 * (i + 2) as f32;
        }
    }

    fn bay_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        let m: Mat4 = self.transform.matrix();
        (0..6).map(move |i| {
            let a = i as f32 / 6.0 * TAU;
            m.transform_point3(Vec3::new(a.cos() * 12.0, a.sin() * 12.0, 0.0))
        })
    }
}

#[derive(Debug, Clone)]
pub struct Decor {
    pub starfield: Starfield,
    pub planets: Vec<Planet>,
    pub station: SpaceStation,
}

impl Decor {
    pub fn new(star_count: usize, rng: &mut impl Rng) -> Self {
        let table = [
            (15.0, 200.0, 0xff6b6b, 0.001),
            (12.0, 300.0, 0x4ecdc4, 0.0008),
            (18.0, 450.0, 0x45b7d1, 0.0006),
            (10.0, 150.0, 0xf9ca24, 0.0012),
        ];
        let planets = table
            .iter()
            .enumerate()
            .map(|(i, &(radius, distance, color, speed))| Planet {
                radius,
                distance,
                color: hex(color),
                speed,
                angle: rng.gen::<f32>() * TAU,
                ringed: i % 2 == 0,
                transform: Transform::at(Vec3::new(distance, 0.0, 0.0)),
            })
            .collect();
        Self {
            starfield: Starfield::new(star_count, rng),
            planets,
            station: SpaceStation::default(),
        }
    }

    /// Orbits, station spin, starfield spin and twinkle.
    pub fn advance(&mut self, time_s: f32) {
        for planet in &mut self.planets {
            planet.advance();
        }
        self.station.advance();
        self.starfield.advance(time_s);
    }

    pub fn collect(&self, lighting: &Lighting, out: &mut Vec<Sprite>) {
        let stars = self.starfield.transform.matrix();
        let opacity = self.starfield.opacity.clamp(0.0, 1.0);
        out.extend(self.starfield.points.iter().map(|(p, c)| Sprite {
            position: stars.transform_point3(*p),
            radius: self.starfield.size * 0.5,
            color: [c.x, c.y, c.z, opacity],
            shape: Shape::Spark,
        }));

        for planet in &self.planets {
            let at = planet.transform.position;
            let body = Material::lit(planet.color, 0.9, Vec3::ZERO);
            out.push(Sprite {
                position: at,
                radius: planet.radius,
                color: lighting.shade(&body, at),
                shape: Shape::Disc,
            });
            if planet.ringed {
                out.push(Sprite {
                    position: at,
                    radius: planet.radius * 2.0,
                    color: lighting.shade(&Material::basic(planet.color, 0.3), at),
                    shape: Shape::Ring,
                });
            }
        }

        let hub = self.station.transform.position;
        out.push(Sprite {
            position: hub,
            radius: 8.0,
            color: lighting.shade(&Material::lit(hex(0x888888), 1.0, Vec3::ZERO), hub),
            shape: Shape::Disc,
        });
        for (i, spin) in self.station.ring_spin.iter().enumerate() {
            // Wobble hints at the spin since sprites are view-aligned.
            let wobble = 1.0 + (spin + PI * i as f32).sin() * 0.03;
            out.push(Sprite {
                position: hub,
                radius: (15.0 + i as f32 * 5.0 + 2.0) * wobble,
                color: lighting.shade(&Material::lit(hex(0x00ffff), 1.0, hex(0x003333)), hub),
                shape: Shape::Ring,
            });
        }
        let bay = Material::lit(hex(0xff6600), 1.0, hex(0x331100));
        out.extend(self.station.bay_positions().map(|p| Sprite {
            position: p,
            radius: 1.5,
            color: lighting.shade(&bay, p),
            shape: Shape::Disc,
        }));
    }
}
