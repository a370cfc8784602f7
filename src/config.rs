use serde::Deserialize;

use crate::camera::StereoParams;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UniverseConfig {
    /// `localStorage` key holding the account blob.
    pub storage_key: String,
    pub log_level: String,
    pub notification_ms: f64,
    pub entrance_delay_ms: f64,
    pub entrance_duration_ms: f64,
    pub pulse_scale: f32,
    pub pulse_ms: f64,
    /// Below this many frames per second the loop degrades quality once.
    pub fps_floor: u32,
    pub eye_separation: f32,
    pub focal_length: f32,
    pub parallax_rotate_speed: f32,
    pub degraded_rotate_speed: f32,
    pub star_count: usize,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            storage_key: "3d-todo-universe-data".to_string(),
            log_level: "info".to_string(),
            notification_ms: 3000.0,
            entrance_delay_ms: 100.0,
            entrance_duration_ms: 2000.0,
            pulse_scale: 1.3,
            pulse_ms: 300.0,
            fps_floor: 30,
            eye_separation: 0.064,
            focal_length: 0.5,
            parallax_rotate_speed: 0.5,
            degraded_rotate_speed: 0.2,
            star_count: 5000,
        }
    }
}

impl UniverseConfig {
    /// Parses an override document, falling back to defaults when it is malformed.
    pub fn from_json(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("ignoring malformed universe config: {err}");
                Self::default()
            }
        }
    }

    pub fn stereo(&self) -> StereoParams {
        StereoParams {
            eye_separation: self.eye_separation,
            focal_length: self.focal_length,
        }
    }

    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }
}
