//! Geometry envelopes and spatial references.
//!
//! The pipeline never inspects polygon topology itself; it carries each
//! feature's shape as an opaque value with an extent, an area, and a
//! perimeter length. Overlay and projection mathematics belong to the
//! geoprocessing engine behind the `Geoprocessor` trait.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("envelope extents are inverted: ({xmin}, {ymin}) .. ({xmax}, {ymax})")]
    InvertedEnvelope {
        xmin: f64,
        ymin: f64,
        xmax: f64,
        ymax: f64,
    },
}

/// Axis-aligned bounding extent of a shape.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Envelope {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Envelope {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Result<Self, GeometryError> {
        if xmin > xmax || ymin > ymax {
            return Err(GeometryError::InvertedEnvelope {
                xmin,
                ymin,
                xmax,
                ymax,
            });
        }
        Ok(Self {
            xmin,
            ymin,
            xmax,
            ymax,
        })
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Whether the two extents overlap (touching edges count as overlap).
    pub fn intersects(&self, other: &Envelope) -> bool {
        self.xmin <= other.xmax
            && other.xmin <= self.xmax
            && self.ymin <= other.ymax
            && other.ymin <= self.ymax
    }

    /// The corner used by the upper-right spatial ordering heuristic.
    pub fn upper_right(&self) -> (f64, f64) {
        (self.xmax, self.ymax)
    }
}

/// An opaque shape: extent plus derived measures.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Geometry {
    pub envelope: Envelope,
    pub area: f64,
    pub length: f64,
}

impl Geometry {
    /// Builds a shape whose area and perimeter are derived from its extent.
    pub fn from_extent(
        xmin: f64,
        ymin: f64,
        xmax: f64,
        ymax: f64,
    ) -> Result<Self, GeometryError> {
        let envelope = Envelope::new(xmin, ymin, xmax, ymax)?;
        Ok(Self {
            area: envelope.width() * envelope.height(),
            length: 2.0 * (envelope.width() + envelope.height()),
            envelope,
        })
    }
}

/// A well-known spatial reference identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SpatialRef(pub u32);

impl SpatialRef {
    /// GDA94 / Vicgrid94, the common reference all outputs converge to.
    pub const VICGRID94: SpatialRef = SpatialRef(3111);
    /// GDA94 geographic.
    pub const GDA94: SpatialRef = SpatialRef(4283);

    pub fn wkid(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SpatialRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_rejects_inverted_extents() {
        assert!(Envelope::new(10.0, 0.0, 0.0, 10.0).is_err());
        assert!(Envelope::new(0.0, 0.0, 10.0, 10.0).is_ok());
    }

    #[test]
    fn intersection_includes_touching_edges() {
        let a = Envelope::new(0.0, 0.0, 10.0, 10.0).unwrap();
        let b = Envelope::new(10.0, 10.0, 20.0, 20.0).unwrap();
        let c = Envelope::new(11.0, 11.0, 20.0, 20.0).unwrap();
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn derived_measures() {
        let shape = Geometry::from_extent(0.0, 0.0, 4.0, 3.0).unwrap();
        assert_eq!(shape.area, 12.0);
        assert_eq!(shape.length, 14.0);
        assert_eq!(shape.envelope.upper_right(), (4.0, 3.0));
    }
}
