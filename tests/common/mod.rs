#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use todo_universe::camera::StereoParams;
use todo_universe::clock::ManualClock;
use todo_universe::render::{Frame, Renderer, StereoRenderer};
use todo_universe::storage::MemoryStorage;
use todo_universe::{Renderers, Universe, UniverseConfig};

/// Counts what a renderer was asked to do. Shared with the test through `Rc`.
#[derive(Debug, Default)]
pub struct Counters {
    pub frames: Cell<u32>,
    pub last_sprites: Cell<usize>,
    pub pixel_ratio: Cell<f32>,
    pub size: Cell<(u32, u32)>,
    pub stereo_set: Cell<u32>,
}

pub struct Recording {
    counters: Rc<Counters>,
    params: StereoParams,
}

impl Recording {
    pub fn new() -> (Self, Rc<Counters>) {
        let counters = Rc::new(Counters::default());
        counters.pixel_ratio.set(1.0);
        let params = StereoParams {
            eye_separation: 0.064,
            focal_length: 0.5,
        };
        (
            Self {
                counters: Rc::clone(&counters),
                params,
            },
            counters,
        )
    }
}

impl Renderer for Recording {
    fn render(&mut self, frame: &Frame<'_>) {
        self.counters.frames.set(self.counters.frames.get() + 1);
        self.counters.last_sprites.set(frame.sprites.len());
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.counters.size.set((width, height));
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.counters.pixel_ratio.set(ratio);
    }

    fn pixel_ratio(&self) -> f32 {
        self.counters.pixel_ratio.get()
    }
}

impl StereoRenderer for Recording {
    fn set_stereo(&mut self, params: StereoParams) {
        self.params = params;
        self.counters.stereo_set.set(self.counters.stereo_set.get() + 1);
    }

    fn stereo(&self) -> StereoParams {
        self.params
    }
}

pub struct Harness<'c> {
    pub universe: Universe<MemoryStorage, &'c ManualClock>,
    pub normal: Rc<Counters>,
    pub stereo: Option<Rc<Counters>>,
}

pub fn config() -> UniverseConfig {
    UniverseConfig {
        star_count: 64,
        ..UniverseConfig::default()
    }
}

pub fn harness(clock: &ManualClock, with_stereo: bool) -> Harness<'_> {
    harness_with(clock, with_stereo, MemoryStorage::new())
}

pub fn harness_with(clock: &ManualClock, with_stereo: bool, storage: MemoryStorage) -> Harness<'_> {
    let (normal, normal_counters) = Recording::new();
    let (stereo, stereo_counters) = if with_stereo {
        let (r, p) = Recording::new();
        (Some(Box::new(r) as Box<dyn StereoRenderer>), Some(p))
    } else {
        (None, None)
    };
    let universe = Universe::new(
        config(),
        storage,
        clock,
        Renderers {
            normal: Box::new(normal),
            stereo,
            device_pixel_ratio: 1.0,
        },
        SmallRng::seed_from_u64(7),
    );
    Harness {
        universe,
        normal: normal_counters,
        stereo: stereo_counters,
    }
}

pub const START_MS: i64 = 1_700_000_000_000;
