use egui::{Pos2, Vec2};

/// Axis-aligned Bounding Box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AaBB {
    pub min: Pos2,
    pub max: Pos2,
}

impl AaBB {
    pub fn from_min_size(min: Pos2, size: Vec2) -> Self {
        AaBB {
            min,
            max: min + size,
        }
    }

    pub fn center(&self) -> Pos2 {
        Pos2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn len_x(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn translate(&self, value: Vec2) -> Self {
        AaBB {
            min: self.min + value,
            max: self.max + value,
        }
    }

    /// strict interior test; points on the boundary do not count as contained
    pub fn contains_open(&self, pos: Pos2) -> bool {
        self.min.x < pos.x && pos.x < self.max.x && self.min.y < pos.y && pos.y < self.max.y
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Pos2,
    pub radius: f32,
}
