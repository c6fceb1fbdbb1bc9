//! Mode settings the evaluator consults but never changes on its own
//! (the user or an embedding program flips them via `State`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AngleUnit {
    Radian,
    Degree,
    Gradian,
}

impl Default for AngleUnit {
    fn default() -> Self {
        AngleUnit::Radian
    }
}

impl AngleUnit {
    pub fn to_radians(self, v: f64) -> f64 {
        match self {
            AngleUnit::Radian => v,
            AngleUnit::Degree => v.to_radians(),
            AngleUnit::Gradian => v * std::f64::consts::PI / 200.0,
        }
    }

    pub fn from_radians(self, v: f64) -> f64 {
        match self {
            AngleUnit::Radian => v,
            AngleUnit::Degree => v.to_degrees(),
            AngleUnit::Gradian => v * 200.0 / std::f64::consts::PI,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumberFormat {
    Float,
    Fixed(u8),
    Scientific,
}

impl Default for NumberFormat {
    fn default() -> Self {
        NumberFormat::Float
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplexFormat {
    Real,
    Rectangular,
    Polar,
}

impl Default for ComplexFormat {
    fn default() -> Self {
        ComplexFormat::Real
    }
}

/// Bundled mode settings, analogous to the teacher's `CompileOptions`: one
/// struct with a sensible `Default`, read by the evaluator, written only by
/// the embedding caller.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Modes {
    pub angle: AngleUnit,
    pub number_format: NumberFormat,
    pub complex_format: ComplexFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphWindow {
    pub x_min: i64,
    pub x_max: i64,
    pub y_min: i64,
    pub y_max: i64,
    pub x_scl: i64,
    pub y_scl: i64,
    pub x_res: i64,
}

impl Default for GraphWindow {
    fn default() -> Self {
        // Not meaningfully representable as pure integers; stored as fixed-point
        // tenths so `Eq`/`Serialize` stay simple. Defaults match the common
        // [-10, 10] x [-10, 10] calculator window, scl=1, xres=1.
        Self {
            x_min: -100,
            x_max: 100,
            y_min: -100,
            y_max: 100,
            x_scl: 10,
            y_scl: 10,
            x_res: 1,
        }
    }
}

impl GraphWindow {
    pub fn x_min_f(&self) -> f64 {
        self.x_min as f64 / 10.0
    }
    pub fn x_max_f(&self) -> f64 {
        self.x_max as f64 / 10.0
    }
    pub fn y_min_f(&self) -> f64 {
        self.y_min as f64 / 10.0
    }
    pub fn y_max_f(&self) -> f64 {
        self.y_max as f64 / 10.0
    }
}
