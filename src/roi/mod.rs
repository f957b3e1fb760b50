//! Region-of-interest geometry.
//!
//! A [`Roi`] lives in on-screen (viewport) coordinates. [`RoiEngine`] turns
//! pointer input into committed rectangles; [`Roi::to_pixel_rect`] maps a
//! committed rectangle onto the source frame's native resolution for cropping.

mod engine;

pub use engine::{Interaction, RoiEngine};

use serde::{Deserialize, Serialize};

/// A pointer position in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Viewport size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Roi {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Roi {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalised rectangle spanning two opposite corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Inclusive point-in-rectangle test.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// At least `min_size` on both sides and fully inside `container`.
    pub fn is_valid(&self, min_size: f64, container: Size) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width >= min_size
            && self.height >= min_size
            && self.x >= 0.0
            && self.y >= 0.0
            && self.right() <= container.width
            && self.bottom() <= container.height
    }

    /// The handle whose square hit area contains `p`, corners first.
    pub fn handle_at(&self, p: Point, radius: f64) -> Option<Handle> {
        Handle::ALL.into_iter().find(|h| {
            let c = h.position(self);
            (p.x - c.x).abs() < radius && (p.y - c.y).abs() < radius
        })
    }

    /// Map onto a `source_width` x `source_height` frame shown in `container`.
    ///
    /// Coordinates are scaled by `source / container`, rounded, and clipped to
    /// the frame. A degenerate container is treated as a 1:1 mapping.
    pub fn to_pixel_rect(&self, container: Size, source_width: u32, source_height: u32) -> PixelRect {
        let scale = |src: u32, view: f64| {
            if view > 0.0 {
                f64::from(src) / view
            } else {
                1.0
            }
        };
        let sx = scale(source_width, container.width);
        let sy = scale(source_height, container.height);

        let to_px = |v: f64, limit: u32| (v.round().max(0.0) as u32).min(limit);
        let x = to_px(self.x * sx, source_width);
        let y = to_px(self.y * sy, source_height);
        PixelRect {
            x,
            y,
            width: to_px(self.width * sx, source_width - x),
            height: to_px(self.height * sy, source_height - y),
        }
    }
}

/// Integer rectangle in source-frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Resize grip: four corners and four edge midpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Handle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Bottom,
    Left,
    Right,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
        Self::Top,
        Self::Bottom,
        Self::Left,
        Self::Right,
    ];

    /// Where this handle sits on `roi`.
    pub fn position(self, roi: &Roi) -> Point {
        let cx = roi.x + roi.width / 2.0;
        let cy = roi.y + roi.height / 2.0;
        match self {
            Self::TopLeft => Point::new(roi.x, roi.y),
            Self::TopRight => Point::new(roi.right(), roi.y),
            Self::BottomLeft => Point::new(roi.x, roi.bottom()),
            Self::BottomRight => Point::new(roi.right(), roi.bottom()),
            Self::Top => Point::new(cx, roi.y),
            Self::Bottom => Point::new(cx, roi.bottom()),
            Self::Left => Point::new(roi.x, cy),
            Self::Right => Point::new(roi.right(), cy),
        }
    }

    /// Move the edges this handle controls to `p`, keeping the opposite edges.
    ///
    /// Dragging past the opposite edge yields a negative width or height,
    /// which the caller rejects.
    pub fn drag(self, roi: &Roi, p: Point) -> Roi {
        let mut out = *roi;
        let moves_left = matches!(self, Self::TopLeft | Self::BottomLeft | Self::Left);
        let moves_right = matches!(self, Self::TopRight | Self::BottomRight | Self::Right);
        let moves_top = matches!(self, Self::TopLeft | Self::TopRight | Self::Top);
        let moves_bottom = matches!(self, Self::BottomLeft | Self::BottomRight | Self::Bottom);

        if moves_left {
            out.x = p.x;
            out.width = roi.right() - p.x;
        } else if moves_right {
            out.width = p.x - roi.x;
        }
        if moves_top {
            out.y = p.y;
            out.height = roi.bottom() - p.y;
        } else if moves_bottom {
            out.height = p.y - roi.y;
        }
        out
    }
}
