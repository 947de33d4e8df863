use crate::csg::contour::{Contour, Point};

/// Pen state behind `draw` blocks. Heading is in degrees, 0 along +x,
/// increasing counter-clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Turtle {
    position: Point,
    heading: f64,
    pen_down: bool,
    current: Contour,
    paths: Vec<Contour>,
}

impl Default for Turtle {
    fn default() -> Self {
        Self::new()
    }
}

impl Turtle {
    pub fn new() -> Self {
        Self {
            position: (0.0, 0.0),
            heading: 0.0,
            pen_down: true,
            current: vec![(0.0, 0.0)],
            paths: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn position(&self) -> Point { self.position }
    pub fn heading(&self) -> f64 { self.heading }
    pub fn is_pen_down(&self) -> bool { self.pen_down }

    pub fn forward(&mut self, distance: f64) {
        let (sin, cos) = self.heading.to_radians().sin_cos();
        let (x, y) = self.position;
        self.move_to((x + distance * cos, y + distance * sin));
    }

    pub fn backward(&mut self, distance: f64) {
        self.forward(-distance);
    }

    pub fn right(&mut self, degrees: f64) {
        self.heading = normalize(self.heading - degrees);
    }

    pub fn left(&mut self, degrees: f64) {
        self.heading = normalize(self.heading + degrees);
    }

    pub fn goto(&mut self, point: Point) {
        self.move_to(point);
    }

    /// Close the current polyline (if it has a segment) and lift the pen.
    pub fn penup(&mut self) {
        if self.current.len() >= 2 {
            self.paths.push(std::mem::take(&mut self.current));
        }
        self.current = vec![self.position];
        self.pen_down = false;
    }

    pub fn pendown(&mut self) {
        if !self.pen_down {
            self.current = vec![self.position];
        }
        self.pen_down = true;
    }

    /// Finished polylines plus the one in progress, if it has a segment.
    pub fn drawing_paths(&self) -> Vec<Contour> {
        let mut paths = self.paths.clone();
        if self.current.len() >= 2 {
            paths.push(self.current.clone());
        }
        paths
    }

    fn move_to(&mut self, point: Point) {
        self.position = point;
        if self.pen_down {
            self.current.push(point);
        }
    }
}

/// Into `[0, 360)`. `rem_euclid` rounds tiny negative inputs up to 360.
fn normalize(degrees: f64) -> f64 {
    let h = degrees.rem_euclid(360.0);
    if h >= 360.0 { 0.0 } else { h }
}
