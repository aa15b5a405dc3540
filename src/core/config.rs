//! Configuration system for the geofenced nearby map
//!
//! This module provides a hierarchical configuration system: a handful of
//! presets for common situations plus fully custom options that can be
//! loaded from JSON.

use crate::core::clamp::RegionPolicy;
use crate::core::constants::*;
use crate::core::geo::LatLng;
use crate::core::viewport::Region;
use crate::{PostmapError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum GeofenceProfile {
    Standard,
    /// Tighter fence for users moving on foot
    Walking,
    /// Looser fence and larger batches
    Explorer,
    Custom(NearbyMapOptions),
}

impl GeofenceProfile {
    pub fn resolve(&self) -> NearbyMapOptions {
        match self {
            Self::Standard => NearbyMapOptions::default(),
            Self::Walking => NearbyMapOptions {
                geofence: GeofenceConfig {
                    min_span: MIN_SPAN_DEGREES,
                    max_span: 0.05,
                    max_pan_distance: 2_000.0,
                },
                tracking: TrackingConfig {
                    fix_span: 0.02,
                    distance_filter: 100.0,
                    ..TrackingConfig::default()
                },
                refresh: RefreshConfig {
                    batch_size: 3,
                    jitter_degrees: 0.015,
                    ..RefreshConfig::default()
                },
            },
            Self::Explorer => NearbyMapOptions {
                geofence: GeofenceConfig {
                    min_span: MIN_SPAN_DEGREES,
                    max_span: 0.5,
                    max_pan_distance: 20_000.0,
                },
                tracking: TrackingConfig {
                    fix_span: 0.1,
                    distance_filter: 1_000.0,
                    ..TrackingConfig::default()
                },
                refresh: RefreshConfig {
                    batch_size: 12,
                    jitter_degrees: 0.15,
                    ..RefreshConfig::default()
                },
            },
            Self::Custom(options) => options.clone(),
        }
    }
}

impl Default for GeofenceProfile {
    fn default() -> Self {
        Self::Standard
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NearbyMapOptions {
    pub geofence: GeofenceConfig,
    pub tracking: TrackingConfig,
    pub refresh: RefreshConfig,
}

impl NearbyMapOptions {
    /// Parses options from JSON; missing sections fall back to defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let options: NearbyMapOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.geofence.validate()?;
        self.tracking.validate()?;
        self.refresh.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeofenceConfig {
    pub min_span: f64,
    pub max_span: f64,
    /// Meters
    pub max_pan_distance: f64,
}

impl GeofenceConfig {
    pub fn policy(&self) -> RegionPolicy {
        RegionPolicy::new(self.min_span, self.max_span, self.max_pan_distance)
    }

    fn validate(&self) -> Result<()> {
        if !(self.min_span > 0.0 && self.min_span.is_finite()) {
            return Err(PostmapError::Config(format!(
                "min_span must be positive, got {}",
                self.min_span
            )));
        }
        if !(self.max_span >= self.min_span && self.max_span.is_finite()) {
            return Err(PostmapError::Config(format!(
                "max_span {} must be finite and >= min_span {}",
                self.max_span, self.min_span
            )));
        }
        if !(self.max_pan_distance >= 0.0 && self.max_pan_distance.is_finite()) {
            return Err(PostmapError::Config(format!(
                "max_pan_distance must be non-negative, got {}",
                self.max_pan_distance
            )));
        }
        Ok(())
    }
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        Self {
            min_span: MIN_SPAN_DEGREES,
            max_span: MAX_SPAN_DEGREES,
            max_pan_distance: MAX_PAN_DISTANCE_METERS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Span of the region built around each fix
    pub fix_span: f64,
    /// Forwarded to the location provider
    pub distance_filter: f64,
    pub initial_center: LatLng,
    pub initial_span: f64,
}

impl TrackingConfig {
    pub fn initial_region(&self) -> Region {
        Region::around(self.initial_center, self.initial_span)
    }

    fn validate(&self) -> Result<()> {
        if !self.initial_center.is_valid() {
            return Err(PostmapError::InvalidCoordinates(format!(
                "initial center {:?} is out of range",
                self.initial_center
            )));
        }
        if !(self.fix_span > 0.0 && self.initial_span > 0.0) {
            return Err(PostmapError::Config("spans must be positive".to_string()));
        }
        if !(self.distance_filter >= 0.0 && self.distance_filter.is_finite()) {
            return Err(PostmapError::Config(format!(
                "distance_filter must be non-negative, got {}",
                self.distance_filter
            )));
        }
        Ok(())
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            fix_span: FIX_SPAN_DEGREES,
            distance_filter: DISTANCE_FILTER_METERS,
            initial_center: LatLng::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1),
            initial_span: DEFAULT_SPAN_DEGREES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub batch_size: usize,
    pub jitter_degrees: f64,
    pub max_items: usize,
    pub label: String,
    pub image_url: String,
}

impl RefreshConfig {
    fn validate(&self) -> Result<()> {
        if self.max_items == 0 {
            return Err(PostmapError::Config("max_items must be at least 1".to_string()));
        }
        if !(self.jitter_degrees >= 0.0 && self.jitter_degrees.is_finite()) {
            return Err(PostmapError::Config(format!(
                "jitter_degrees must be non-negative, got {}",
                self.jitter_degrees
            )));
        }
        Ok(())
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            batch_size: NEARBY_BATCH_SIZE,
            jitter_degrees: NEARBY_JITTER_DEGREES,
            max_items: NEARBY_MAX_ITEMS,
            label: NEARBY_LABEL.to_string(),
            image_url: NEARBY_IMAGE_URL.to_string(),
        }
    }
}
