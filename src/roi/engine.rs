use super::{Handle, Point, Roi, Size};
use crate::config::RoiConfig;

/// What the current pointer gesture is doing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    Idle,
    Drawing { start: Point },
    Dragging { offset: Point },
    Resizing { handle: Handle },
}

/// Pointer-driven state machine that owns the committed ROI.
///
/// Invalid candidates (too small, inverted, out of the container) are never
/// committed; the last valid rectangle is kept and no error is reported.
#[derive(Debug, Clone)]
pub struct RoiEngine {
    roi: Option<Roi>,
    interaction: Interaction,
    container: Size,
    enabled: bool,
    min_size: f64,
    handle_radius: f64,
    reset_inset: f64,
}

impl RoiEngine {
    pub fn new(config: &RoiConfig, container: Size) -> Self {
        Self {
            roi: None,
            interaction: Interaction::Idle,
            container,
            enabled: true,
            min_size: config.min_size,
            handle_radius: config.handle_radius,
            reset_inset: config.reset_inset,
        }
    }

    pub fn roi(&self) -> Option<Roi> {
        self.roi
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Resize the viewport. A committed ROI that no longer fits is dropped.
    pub fn set_container(&mut self, container: Size) {
        self.container = container;
        if let Some(roi) = self.roi {
            if !roi.is_valid(self.min_size, container) {
                tracing::debug!("ROI {roi:?} no longer fits {container:?}, clearing");
                self.roi = None;
            }
        }
    }

    /// Turning selection off clears the ROI and ignores pointer input.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.roi = None;
            self.interaction = Interaction::Idle;
        }
    }

    /// Replace the ROI. `None` clears it; an invalid rectangle is ignored.
    pub fn set_roi(&mut self, roi: Option<Roi>) -> bool {
        match roi {
            None => {
                self.roi = None;
                true
            }
            Some(r) if r.is_valid(self.min_size, self.container) => {
                self.roi = Some(r);
                true
            }
            Some(r) => {
                tracing::debug!("Ignoring invalid ROI {r:?}");
                false
            }
        }
    }

    pub fn clear(&mut self) {
        self.roi = None;
        self.interaction = Interaction::Idle;
    }

    /// Centre a rectangle inset by `reset_inset` on every side.
    pub fn reset(&mut self) -> Option<Roi> {
        let Size { width, height } = self.container;
        let inset = self.reset_inset;
        let candidate = Roi::new(
            width * inset,
            height * inset,
            width * (1.0 - 2.0 * inset),
            height * (1.0 - 2.0 * inset),
        );
        self.set_roi(Some(candidate));
        self.interaction = Interaction::Idle;
        self.roi
    }

    /// Begin a gesture: resize on a handle, drag inside, otherwise draw anew.
    pub fn pointer_down(&mut self, p: Point) {
        if !self.enabled {
            return;
        }
        if let Some(roi) = self.roi {
            if let Some(handle) = roi.handle_at(p, self.handle_radius) {
                self.interaction = Interaction::Resizing { handle };
                return;
            }
            if roi.contains(p) {
                self.interaction = Interaction::Dragging {
                    offset: Point::new(p.x - roi.x, p.y - roi.y),
                };
                return;
            }
        }
        self.roi = None;
        self.interaction = Interaction::Drawing {
            start: self.clamp_point(p),
        };
    }

    /// Update the gesture. Returns the rectangle when this move committed one.
    pub fn pointer_move(&mut self, p: Point) -> Option<Roi> {
        if !self.enabled {
            return None;
        }
        let candidate = match self.interaction {
            Interaction::Idle => return None,
            Interaction::Drawing { start } => Roi::from_corners(start, self.clamp_point(p)),
            Interaction::Resizing { handle } => handle.drag(&self.roi?, p),
            Interaction::Dragging { offset } => {
                let roi = self.roi?;
                let max_x = (self.container.width - roi.width).max(0.0);
                let max_y = (self.container.height - roi.height).max(0.0);
                Roi {
                    x: (p.x - offset.x).clamp(0.0, max_x),
                    y: (p.y - offset.y).clamp(0.0, max_y),
                    ..roi
                }
            }
        };
        if candidate.is_valid(self.min_size, self.container) {
            self.roi = Some(candidate);
            Some(candidate)
        } else {
            None
        }
    }

    /// End the gesture, leaving the last committed rectangle in place.
    pub fn pointer_up(&mut self) -> Option<Roi> {
        self.interaction = Interaction::Idle;
        self.roi
    }

    fn clamp_point(&self, p: Point) -> Point {
        Point::new(
            p.x.clamp(0.0, self.container.width.max(0.0)),
            p.y.clamp(0.0, self.container.height.max(0.0)),
        )
    }
}
