//! Directional hit-testing for keyboard-driven drags.
//!
//! Arrow keys have no pointer position, so the controller picks the nearest
//! droppable container that lies in the pressed direction relative to the
//! rectangle currently standing in for the pointer.

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    fn center_distance(&self, other: &Rect) -> f64 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Whether `candidate` lies entirely past `current` in this direction.
    /// A rect that encloses or overlaps `current` on that axis never does.
    pub fn admits(&self, current: &Rect, candidate: &Rect) -> bool {
        match self {
            Self::Up => candidate.bottom() <= current.top,
            Self::Down => candidate.top >= current.bottom(),
            Self::Left => candidate.right() <= current.left,
            Self::Right => candidate.left >= current.right(),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    /// Parses DOM `KeyboardEvent.code` values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ArrowUp" => Ok(Self::Up),
            "ArrowDown" => Ok(Self::Down),
            "ArrowLeft" => Ok(Self::Left),
            "ArrowRight" => Ok(Self::Right),
            _ => Err(format!("Not a navigation key: {}", s)),
        }
    }
}

/// A container that can accept a drop, with its on-screen bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Droppable {
    pub container_id: String,
    pub rect: Rect,
}

impl Droppable {
    pub fn new(container_id: impl Into<String>, rect: Rect) -> Self {
        Self {
            container_id: container_id.into(),
            rect,
        }
    }
}

/// Nearest droppable (by centre distance) in `direction` from `current`.
pub fn nearest_in_direction<'a>(
    current: &Rect,
    direction: Direction,
    droppables: &'a [Droppable],
) -> Option<&'a Droppable> {
    droppables
        .iter()
        .filter(|d| direction.admits(current, &d.rect))
        .min_by(|a, b| {
            current
                .center_distance(&a.rect)
                .total_cmp(&current.center_distance(&b.rect))
        })
}
