use serde::{Deserialize, Serialize};

/// A point in world space. Plain data — all arithmetic lives in
/// `evo_core`'s vector utilities, which operate on these by value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
