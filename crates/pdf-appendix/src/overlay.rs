//! Placement of small overlays on existing pages
//!
//! A page's `/Rotate` entry turns the raw content clockwise when the page is
//! displayed. Anything drawn into the raw content stream is turned with it, so
//! an overlay meant for a *visual* corner has to be placed at the raw corner
//! that ends up there and counter-rotated so its glyphs stay upright.
//!
//! Coordinates used below:
//! - raw `(x, y)`: the page's own content space, origin at the MediaBox corner
//! - visual `(u, v)`: the page as a viewer shows it after applying `/Rotate`

/// Stored page rotation, clockwise on display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageRotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl PageRotation {
    /// Interpret a raw `/Rotate` value.
    ///
    /// Multiples of 90 (negative ones included) are normalized into 0..360.
    /// Missing or malformed values are treated as no rotation.
    pub fn from_raw(value: Option<i64>) -> Self {
        match value.map(|v| v.rem_euclid(360)) {
            Some(90) => PageRotation::Clockwise90,
            Some(180) => PageRotation::Clockwise180,
            Some(270) => PageRotation::Clockwise270,
            _ => PageRotation::None,
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            PageRotation::None => 0,
            PageRotation::Clockwise90 => 90,
            PageRotation::Clockwise180 => 180,
            PageRotation::Clockwise270 => 270,
        }
    }

    /// True when the visual frame swaps width and height
    pub fn is_quarter_turn(self) -> bool {
        matches!(
            self,
            PageRotation::Clockwise90 | PageRotation::Clockwise270
        )
    }
}

/// Geometry of one physical page before any overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    /// Lower-left corner of the MediaBox
    pub origin_x: f32,
    pub origin_y: f32,
    /// Raw MediaBox size
    pub width: f32,
    pub height: f32,
    pub rotation: PageRotation,
}

impl PageFrame {
    pub fn new(width: f32, height: f32, rotation: PageRotation) -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            width,
            height,
            rotation,
        }
    }

    pub fn with_origin(mut self, origin_x: f32, origin_y: f32) -> Self {
        self.origin_x = origin_x;
        self.origin_y = origin_y;
        self
    }

    /// Size of the page as displayed
    pub fn visual_size(&self) -> (f32, f32) {
        if self.rotation.is_quarter_turn() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }

    /// Map a raw content-space point into the visual frame
    pub fn to_visual(&self, x: f32, y: f32) -> (f32, f32) {
        let x = x - self.origin_x;
        let y = y - self.origin_y;
        match self.rotation {
            PageRotation::None => (x, y),
            PageRotation::Clockwise90 => (y, self.width - x),
            PageRotation::Clockwise180 => (self.width - x, self.height - y),
            PageRotation::Clockwise270 => (self.height - y, x),
        }
    }
}

/// Corner of the page as the reader sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Where and how to draw an overlay box in raw page space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayPlacement {
    /// Lower-left corner of the raw-space rectangle the box covers
    pub draw_x: f32,
    pub draw_y: f32,
    /// Raw-space size of that rectangle (swapped for quarter turns)
    pub width: f32,
    pub height: f32,
    /// Counter-rotation applied to the content, counter-clockwise degrees
    pub extra_rotation: i32,
    /// `cm` matrix taking box-local upright coordinates to raw page space
    pub matrix: [f32; 6],
}

/// Place a `content` sized box at the visual `corner` of `frame`, inset by
/// `inset` (horizontal, vertical) in the visual frame.
pub fn place(
    frame: &PageFrame,
    content: (f32, f32),
    corner: Corner,
    inset: (f32, f32),
) -> OverlayPlacement {
    let (w, h) = content;
    let (visual_w, visual_h) = frame.visual_size();
    let (dx, dy) = inset;

    // Lower-left corner of the box in the visual frame
    let u0 = match corner {
        Corner::TopLeft | Corner::BottomLeft => dx,
        Corner::TopRight | Corner::BottomRight => visual_w - w - dx,
    };
    let v0 = match corner {
        Corner::BottomLeft | Corner::BottomRight => dy,
        Corner::TopLeft | Corner::TopRight => visual_h - h - dy,
    };

    let (pw, ph) = (frame.width, frame.height);
    let (ox, oy) = (frame.origin_x, frame.origin_y);

    let (matrix, extra_rotation, draw_x, draw_y, width, height) = match frame.rotation {
        PageRotation::None => ([1.0, 0.0, 0.0, 1.0, u0, v0], 0, u0, v0, w, h),
        PageRotation::Clockwise90 => (
            [0.0, 1.0, -1.0, 0.0, pw - v0, u0],
            90,
            pw - v0 - h,
            u0,
            h,
            w,
        ),
        PageRotation::Clockwise180 => (
            [-1.0, 0.0, 0.0, -1.0, pw - u0, ph - v0],
            180,
            pw - u0 - w,
            ph - v0 - h,
            w,
            h,
        ),
        PageRotation::Clockwise270 => (
            [0.0, -1.0, 1.0, 0.0, v0, ph - u0],
            270,
            v0,
            ph - u0 - w,
            h,
            w,
        ),
    };

    let mut matrix = matrix;
    matrix[4] += ox;
    matrix[5] += oy;

    OverlayPlacement {
        draw_x: draw_x + ox,
        draw_y: draw_y + oy,
        width,
        height,
        extra_rotation,
        matrix,
    }
}

impl OverlayPlacement {
    /// Apply the placement matrix to a box-local point
    pub fn transform(&self, a: f32, b: f32) -> (f32, f32) {
        let [m0, m1, m2, m3, m4, m5] = self.matrix;
        (m0 * a + m2 * b + m4, m1 * a + m3 * b + m5)
    }
}
