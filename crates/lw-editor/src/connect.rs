//! Port-to-port connection gestures.
//!
//! Two gestures share one state: pressing an output port selects it as the
//! source. Releasing without moving leaves it selected (click-to-connect:
//! the next press on an input port completes). Moving past the drag
//! threshold turns it into drag-to-connect: a rubber band follows the
//! pointer and the release point decides.
//!
//! Port highlighting is derived from this state at paint time, so dropping
//! the state is the whole reset.

use crate::error::ConnectError;
use crate::sync::Intent;
use kurbo::Point;
use lw_core::{NodeGeometry, NodeId, PortRef, PortSide};
use std::collections::HashMap;

/// Ports connect iff their names match. Self-loops are refused first.
pub fn check_compatible(source: &PortRef, target: &PortRef) -> Result<(), ConnectError> {
    if source.node == target.node {
        return Err(ConnectError::SelfLoop { node: source.node });
    }
    if source.port != target.port {
        return Err(ConnectError::PortMismatch {
            source_port: source.port.clone(),
            target_port: target.port.clone(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectMode {
    /// Pressed, not yet released or moved past the threshold.
    Pressed,
    /// Released in place; waiting for a second click.
    Click,
    /// Moved past the threshold; rubber band visible.
    Drag,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub source: PortRef,
    pub mode: ConnectMode,
    /// Surface position of the press, for the drag threshold.
    press: Point,
    /// Latest pointer position in graph space.
    pointer: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectOutcome {
    /// Still connecting.
    Pending,
    Connected(Intent),
    Rejected(ConnectError),
    Cancelled,
}

impl Connection {
    pub fn press(source: PortRef, press: Point, pointer: Point) -> Self {
        debug_assert_eq!(source.side, PortSide::Output);
        log::debug!("connect: source {}:{}", source.node, source.port);
        Self {
            source,
            mode: ConnectMode::Pressed,
            press,
            pointer,
        }
    }

    /// Pointer moved. Returns `true` if the rubber band needs a redraw.
    pub fn pointer_move(&mut self, screen: Point, graph: Point, threshold: f64) -> bool {
        self.pointer = graph;
        match self.mode {
            ConnectMode::Pressed if screen.distance(self.press) > threshold => {
                self.mode = ConnectMode::Drag;
                true
            }
            ConnectMode::Drag => true,
            _ => false,
        }
    }

    /// Pointer released over `target` (an input port, or `None` for anything else).
    pub fn release(&mut self, target: Option<&PortRef>) -> ConnectOutcome {
        match self.mode {
            ConnectMode::Pressed => {
                self.mode = ConnectMode::Click;
                ConnectOutcome::Pending
            }
            ConnectMode::Click => ConnectOutcome::Pending,
            ConnectMode::Drag => match target {
                Some(t) if t.side == PortSide::Input => self.complete(t),
                _ => ConnectOutcome::Cancelled,
            },
        }
    }

    /// Second click of click-to-connect on some port.
    pub fn click_port(&self, port: &PortRef) -> ConnectOutcome {
        match port.side {
            PortSide::Input => self.complete(port),
            // Same output toggles off; a different one is handled by the caller
            // starting a fresh connection.
            PortSide::Output => ConnectOutcome::Cancelled,
        }
    }

    fn complete(&self, target: &PortRef) -> ConnectOutcome {
        match check_compatible(&self.source, target) {
            Ok(()) => ConnectOutcome::Connected(Intent::EdgeAdded {
                source_id: self.source.node,
                target_id: target.node,
                source_port: Some(self.source.port.clone()),
                target_port: Some(target.port.clone()),
            }),
            Err(e) => ConnectOutcome::Rejected(e),
        }
    }

    /// Rubber band from the source anchor to the pointer, while dragging.
    pub fn rubber_band(&self, layouts: &HashMap<NodeId, NodeGeometry>) -> Option<(Point, Point)> {
        if self.mode != ConnectMode::Drag {
            return None;
        }
        let anchor = layouts
            .get(&self.source.node)?
            .anchor(PortSide::Output, &self.source.port)?;
        Some((anchor, self.pointer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn water_out(node: &str) -> PortRef {
        PortRef::output(NodeId::intern(node), "water")
    }

    #[test]
    fn compatibility_rules() {
        let a = water_out("ca");
        assert_eq!(check_compatible(&a, &PortRef::input(NodeId::intern("cb"), "water")), Ok(()));
        assert_eq!(
            check_compatible(&a, &PortRef::input(NodeId::intern("cb"), "sunlight")),
            Err(ConnectError::PortMismatch {
                source_port: "water".into(),
                target_port: "sunlight".into()
            })
        );
        assert_eq!(
            check_compatible(&a, &PortRef::input(NodeId::intern("ca"), "water")),
            Err(ConnectError::SelfLoop { node: NodeId::intern("ca") })
        );
    }

    #[test]
    fn release_in_place_becomes_click() {
        let mut c = Connection::press(water_out("ca"), Point::ZERO, Point::ZERO);
        assert!(!c.pointer_move(Point::new(2.0, 1.0), Point::new(2.0, 1.0), 4.0));
        assert_eq!(c.release(None), ConnectOutcome::Pending);
        assert_eq!(c.mode, ConnectMode::Click);
        let target = PortRef::input(NodeId::intern("cb"), "water");
        assert!(matches!(c.click_port(&target), ConnectOutcome::Connected(_)));
    }

    #[test]
    fn drag_released_on_canvas_cancels() {
        let mut c = Connection::press(water_out("ca"), Point::ZERO, Point::ZERO);
        assert!(c.pointer_move(Point::new(30.0, 0.0), Point::new(30.0, 0.0), 4.0));
        assert_eq!(c.mode, ConnectMode::Drag);
        assert_eq!(c.release(None), ConnectOutcome::Cancelled);
    }
}
