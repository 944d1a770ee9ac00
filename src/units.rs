use serde::{Deserialize, Serialize};

// Canonical storage units everywhere in the crate: wave and sea-level heights
// in meters, wind/current speeds in km/h, temperatures in °C. Display
// conversion happens at the edge, and a missing value stays missing.

const FEET_PER_METER: f64 = 3.28084;
const MPH_PER_KMH: f64 = 0.621371;
const KNOTS_PER_KMH: f64 = 0.539957;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum WaveUnit {
    #[serde(rename = "m")]
    Meters,
    #[serde(rename = "ft")]
    Feet,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SpeedUnit {
    #[serde(rename = "kmh")]
    Kmh,
    #[serde(rename = "mph")]
    Mph,
    #[serde(rename = "kts")]
    Knots,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TempUnit {
    #[serde(rename = "c")]
    Celsius,
    #[serde(rename = "f")]
    Fahrenheit,
}

/// A value converted for display, tagged with its unit label. `value` is None
/// when the canonical input was missing.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DisplayValue {
    pub value: Option<f64>,
    pub unit: &'static str,
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

impl WaveUnit {
    fn factor(self) -> f64 {
        match self {
            WaveUnit::Meters => 1.0,
            WaveUnit::Feet => FEET_PER_METER,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WaveUnit::Meters => "m",
            WaveUnit::Feet => "ft",
        }
    }

    pub fn to_display(self, meters: Option<f64>) -> Option<f64> {
        finite(meters).map(|m| m * self.factor())
    }

    pub fn from_display(self, value: Option<f64>) -> Option<f64> {
        finite(value).map(|v| v / self.factor())
    }

    pub fn display(self, meters: Option<f64>) -> DisplayValue {
        DisplayValue {
            value: self.to_display(meters),
            unit: self.label(),
        }
    }
}

impl SpeedUnit {
    fn factor(self) -> f64 {
        match self {
            SpeedUnit::Kmh => 1.0,
            SpeedUnit::Mph => MPH_PER_KMH,
            SpeedUnit::Knots => KNOTS_PER_KMH,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SpeedUnit::Kmh => "km/h",
            SpeedUnit::Mph => "mph",
            SpeedUnit::Knots => "kts",
        }
    }

    pub fn to_display(self, kmh: Option<f64>) -> Option<f64> {
        finite(kmh).map(|v| v * self.factor())
    }

    pub fn from_display(self, value: Option<f64>) -> Option<f64> {
        finite(value).map(|v| v / self.factor())
    }

    pub fn display(self, kmh: Option<f64>) -> DisplayValue {
        DisplayValue {
            value: self.to_display(kmh),
            unit: self.label(),
        }
    }
}

impl TempUnit {
    pub fn label(self) -> &'static str {
        match self {
            TempUnit::Celsius => "°C",
            TempUnit::Fahrenheit => "°F",
        }
    }

    pub fn to_display(self, celsius: Option<f64>) -> Option<f64> {
        finite(celsius).map(|c| match self {
            TempUnit::Celsius => c,
            TempUnit::Fahrenheit => c * 9.0 / 5.0 + 32.0,
        })
    }

    pub fn from_display(self, value: Option<f64>) -> Option<f64> {
        finite(value).map(|v| match self {
            TempUnit::Celsius => v,
            TempUnit::Fahrenheit => (v - 32.0) * 5.0 / 9.0,
        })
    }

    pub fn display(self, celsius: Option<f64>) -> DisplayValue {
        DisplayValue {
            value: self.to_display(celsius),
            unit: self.label(),
        }
    }
}
