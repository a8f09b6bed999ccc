//! Opacity animations for composite expand/collapse.
//!
//! Time comes from the host's animation frames via [`FadeSchedule::tick`];
//! nothing here reads a clock.

use lw_core::{Node, NodeId};
use lw_render::Ghost;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Fade {
    start_ms: f64,
    duration_ms: f64,
}

impl Fade {
    fn progress(&self, now: f64) -> f32 {
        if now <= self.start_ms {
            return 0.0;
        }
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now - self.start_ms) / self.duration_ms).min(1.0) as f32
    }

    fn done(&self, now: f64) -> bool {
        now >= self.start_ms + self.duration_ms
    }
}

#[derive(Debug, Default)]
pub struct FadeSchedule {
    now: f64,
    fading_in: HashMap<NodeId, Fade>,
    /// Snapshots of visuals that left the visible set and are fading out.
    ghosts: Vec<(Node, Fade)>,
}

impl FadeSchedule {
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Fade a visible node in after `delay_ms`.
    pub fn fade_in(&mut self, id: NodeId, delay_ms: f64, duration_ms: f64) {
        self.fading_in.insert(
            id,
            Fade {
                start_ms: self.now + delay_ms,
                duration_ms,
            },
        );
    }

    /// Keep drawing `node` while it fades out, even though it is no longer visible.
    pub fn fade_out(&mut self, node: Node, delay_ms: f64, duration_ms: f64) {
        self.fading_in.remove(&node.id);
        self.ghosts.retain(|(n, _)| n.id != node.id);
        self.ghosts.push((
            node,
            Fade {
                start_ms: self.now + delay_ms,
                duration_ms,
            },
        ));
    }

    /// Advance the clock. Returns `true` while anything is still animating.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.now = now_ms;
        self.fading_in.retain(|_, f| !f.done(now_ms));
        self.ghosts.retain(|(_, f)| !f.done(now_ms));
        self.is_animating()
    }

    pub fn is_animating(&self) -> bool {
        !self.fading_in.is_empty() || !self.ghosts.is_empty()
    }

    /// Current opacity of every node that is fading in.
    pub fn opacities(&self) -> HashMap<NodeId, f32> {
        self.fading_in
            .iter()
            .map(|(id, f)| (*id, f.progress(self.now)))
            .collect()
    }

    pub fn ghosts(&self) -> Vec<Ghost> {
        self.ghosts
            .iter()
            .map(|(node, f)| Ghost {
                node: node.clone(),
                opacity: 1.0 - f.progress(self.now),
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.fading_in.clear();
        self.ghosts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn staggered_fade_in() {
        let mut fades = FadeSchedule::default();
        fades.tick(1000.0);
        let a = NodeId::intern("fade_a");
        let b = NodeId::intern("fade_b");
        fades.fade_in(a, 0.0, 300.0);
        fades.fade_in(b, 30.0, 300.0);

        fades.tick(1150.0);
        let op = fades.opacities();
        assert_eq!(op[&a], 0.5);
        assert_eq!(op[&b], 0.4);

        assert!(fades.tick(1310.0));
        assert!(!fades.opacities().contains_key(&a));
        assert!(!fades.tick(1330.0));
    }

    #[test]
    fn ghost_fades_out_then_disappears() {
        let mut fades = FadeSchedule::default();
        fades.fade_out(Node::composite("fade_sys", 0.0, 0.0), 0.0, 200.0);
        fades.tick(50.0);
        assert_eq!(fades.ghosts()[0].opacity, 0.75);
        fades.tick(200.0);
        assert!(fades.ghosts().is_empty());
    }
}
