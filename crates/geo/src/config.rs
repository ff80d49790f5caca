//! Thresholds and limits for the validation checks.

use crate::models::types::{GeoError, Result};
use crate::spatial::bbox::DEFAULT_SAFETY_FACTOR;

/// Two trees closer than this (meters) count as the same planting
pub const DEFAULT_DUPLICATE_RADIUS_M: f64 = 5.0;

/// Growth photos must be taken within this distance (meters) of their tree
pub const DEFAULT_PHOTO_MAX_DISTANCE_M: f64 = 50.0;

/// Largest photo the GPS extractor will look at
pub const DEFAULT_MAX_PHOTO_BYTES: u64 = 20 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ValidationConfig {
    pub duplicate_radius_m: f64,
    pub photo_max_distance_m: f64,
    pub bbox_safety_factor: f64,
    pub max_photo_bytes: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            duplicate_radius_m: DEFAULT_DUPLICATE_RADIUS_M,
            photo_max_distance_m: DEFAULT_PHOTO_MAX_DISTANCE_M,
            bbox_safety_factor: DEFAULT_SAFETY_FACTOR,
            max_photo_bytes: DEFAULT_MAX_PHOTO_BYTES,
        }
    }
}

impl ValidationConfig {
    pub fn validate(&self) -> Result<()> {
        let distances = [
            ("duplicate_radius_m", self.duplicate_radius_m),
            ("photo_max_distance_m", self.photo_max_distance_m),
        ];

        for (name, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(GeoError::InvalidConfig(format!(
                    "{} must be a non-negative distance, got {}",
                    name, value
                )));
            }
        }

        if !self.bbox_safety_factor.is_finite() || self.bbox_safety_factor < 1.0 {
            return Err(GeoError::InvalidConfig(format!(
                "bbox_safety_factor must be >= 1, got {}",
                self.bbox_safety_factor
            )));
        }

        Ok(())
    }
}
