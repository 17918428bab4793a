//! Thermocouple calibration table
//!
//! Ten (voltage, temperature) control points linearise the thermocouple.
//! Conversions interpolate between the bracketing pair and extrapolate
//! through the outermost pairs outside the table.

/// Number of control points per channel
pub const TABLE_SIZE: usize = 10;

/// Highest temperature covered by a generated default table (°C)
pub const DEFAULT_SPAN_C: f32 = 450.0;

/// A single calibration point
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationPoint {
    /// Thermocouple voltage in µV
    pub voltage_uv: f32,
    /// Temperature in °C
    pub temperature_c: f32,
}

impl CalibrationPoint {
    /// Create a point
    pub const fn new(voltage_uv: f32, temperature_c: f32) -> Self {
        Self {
            voltage_uv,
            temperature_c,
        }
    }
}

/// Conversion failure
///
/// The table produced a non-finite result, typically because two points
/// share a coordinate or the points are not ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DegenerateTable;

/// Per-channel calibration table
///
/// Points are expected to increase in both coordinates. This is not
/// enforced on edit; a table that breaks it makes conversions fail with
/// [`DegenerateTable`] instead of returning garbage.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationTable {
    points: [CalibrationPoint; TABLE_SIZE],
}

impl Default for CalibrationTable {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl CalibrationTable {
    /// Table with every point at the origin
    pub const fn zeroed() -> Self {
        Self {
            points: [CalibrationPoint::new(0.0, 0.0); TABLE_SIZE],
        }
    }

    /// Create a table from explicit points
    pub const fn from_points(points: [CalibrationPoint; TABLE_SIZE]) -> Self {
        Self { points }
    }

    /// Linear table from 0 °C to [`DEFAULT_SPAN_C`]
    ///
    /// # Arguments
    /// - `sensitivity_uv_per_k`: thermocouple Seebeck coefficient
    pub fn linear(sensitivity_uv_per_k: f32) -> Self {
        let mut points = [CalibrationPoint::default(); TABLE_SIZE];
        for (i, point) in points.iter_mut().enumerate() {
            let temperature = DEFAULT_SPAN_C * i as f32 / (TABLE_SIZE - 1) as f32;
            *point = CalibrationPoint::new(temperature * sensitivity_uv_per_k, temperature);
        }
        Self { points }
    }

    /// All points in index order
    pub fn points(&self) -> &[CalibrationPoint; TABLE_SIZE] {
        &self.points
    }

    /// Point at `index`
    pub fn point(&self, index: usize) -> Option<CalibrationPoint> {
        self.points.get(index).copied()
    }

    /// Mutable access for in-place edits and storage decoding
    pub fn points_mut(&mut self) -> &mut [CalibrationPoint; TABLE_SIZE] {
        &mut self.points
    }

    /// Replace the point at `index`
    ///
    /// Returns `false` if the index is outside the table.
    pub fn set_point(&mut self, index: usize, point: CalibrationPoint) -> bool {
        match self.points.get_mut(index) {
            Some(slot) => {
                *slot = point;
                true
            }
            None => false,
        }
    }

    /// Convert a thermocouple voltage (µV) to a temperature (°C)
    pub fn voltage_to_temperature(&self, voltage_uv: f32) -> Result<f32, DegenerateTable> {
        interpolate(&self.points, voltage_uv, |p| (p.voltage_uv, p.temperature_c))
    }

    /// Convert a temperature (°C) to a thermocouple voltage (µV)
    pub fn temperature_to_voltage(&self, temperature_c: f32) -> Result<f32, DegenerateTable> {
        interpolate(&self.points, temperature_c, |p| (p.temperature_c, p.voltage_uv))
    }
}

/// Piecewise-linear lookup over `axes(point) = (x, y)`
fn interpolate(
    points: &[CalibrationPoint; TABLE_SIZE],
    x: f32,
    axes: impl Fn(&CalibrationPoint) -> (f32, f32),
) -> Result<f32, DegenerateTable> {
    let line = |a: &CalibrationPoint, b: &CalibrationPoint| {
        let (x1, y1) = axes(a);
        let (x2, y2) = axes(b);
        let slope = (y2 - y1) / (x2 - x1);
        y1 + slope * (x - x1)
    };

    let first = &points[0];
    let last = &points[TABLE_SIZE - 1];

    let y = if x <= axes(first).0 {
        line(first, &points[1])
    } else if x >= axes(last).0 {
        line(&points[TABLE_SIZE - 2], last)
    } else {
        points
            .windows(2)
            .find(|pair| x < axes(&pair[1]).0)
            .map(|pair| line(&pair[0], &pair[1]))
            .unwrap_or(f32::NAN)
    };

    if y.is_finite() {
        Ok(y)
    } else {
        Err(DegenerateTable)
    }
}
