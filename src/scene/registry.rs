use glam::Vec3;
use indexmap::IndexMap;
use rand::Rng;

use super::node::{random_rest, NodeTiming, SceneNode};
use crate::account::{Todo, TodoId};

/// Scale boost applied to nodes while the parallax barrier is on.
pub const PARALLAX_ENLARGE: f32 = 1.5;

/// Insertion order is the index the float and parallax layout use.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: IndexMap<TodoId, SceneNode>,
    timing: NodeTiming,
}

impl NodeRegistry {
    pub fn new(timing: NodeTiming) -> Self {
        Self {
            nodes: IndexMap::new(),
            timing,
        }
    }

    pub fn create(&mut self, todo: &Todo, now_ms: f64, rng: &mut impl Rng) -> &SceneNode {
        let node = SceneNode::new(todo, now_ms, &self.timing, rng);
        let (index, _) = self.nodes.insert_full(todo.id, node);
        &self.nodes[index]
    }

    /// Restyles the node for `todo`; a fresh completion gets the scale pulse.
    pub fn update(&mut self, todo: &Todo, now_ms: f64) {
        let timing = self.timing;
        if let Some(node) = self.nodes.get_mut(&todo.id) {
            if node.restyle(todo.completed) {
                node.start_pulse(now_ms, &timing);
            }
        }
    }

    pub fn remove(&mut self, id: TodoId) -> Option<SceneNode> {
        self.nodes.shift_remove(&id)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn get(&self, id: TodoId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = TodoId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.values()
    }

    /// Entrance tweens and completion pulses.
    pub fn advance(&mut self, now_ms: f64) {
        for node in self.nodes.values_mut() {
            node.advance(now_ms);
        }
    }

    pub fn animate(&mut self, time_s: f32) {
        for (index, node) in self.nodes.values_mut().enumerate() {
            node.animate(index, time_s);
        }
    }

    /// Depth-staggered arrangement for the parallax barrier: five depth bands
    /// cycling by index, a horizontal offset around x = 20, and a scale that
    /// shrinks with depth.
    pub fn apply_depth_layout(&mut self) {
        for (index, node) in self.nodes.values_mut().enumerate() {
            let i = index as f32;
            let depth = ((index % 5) as f32 - 2.0) * 15.0;
            let horizontal = ((index % 3) as f32 - 1.0) * 8.0;
            node.transform.position = Vec3::new(20.0 + horizontal, (i * 0.8).sin() * 10.0, depth);
            node.transform.scale = (1.0 + depth * 0.01).max(0.5) * PARALLAX_ENLARGE;
            node.entrance = None;
            node.pulse = None;
            node.highlighted = true;
        }
    }

    /// Sends every node to a fresh random floating spot at unit scale.
    pub fn scatter(&mut self, rng: &mut impl Rng) {
        for node in self.nodes.values_mut() {
            node.transform.position = random_rest(rng);
            node.transform.scale = 1.0;
            node.entrance = None;
            node.pulse = None;
            node.highlighted = false;
        }
    }
}
