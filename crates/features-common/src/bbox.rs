//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A 2-D axis-aligned bounding box.
///
/// Coordinate units depend on the CRS of the data; the box itself does not
/// interpret them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Parse a comma-separated bbox parameter: `minx,miny,maxx,maxy` or
    /// `minx,miny,minz,maxx,maxy,maxz`.
    ///
    /// Every value must be a finite number; anything else (including a
    /// coordinate count other than 4 or 6) is a parse error.
    pub fn parse_coordinates(s: &str) -> Result<Vec<f64>, BboxParseError> {
        let coords: Vec<f64> = s
            .split(',')
            .map(|part| {
                let part = part.trim();
                part.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| BboxParseError::InvalidNumber(part.to_string()))
            })
            .collect::<Result<_, _>>()?;

        if coords.len() != 4 && coords.len() != 6 {
            return Err(BboxParseError::InvalidCoordinateCount(coords.len()));
        }

        Ok(coords)
    }

    /// Build the 2-D box from a parsed 4- or 6-coordinate list.
    ///
    /// For 6 coordinates the vertical component is ignored.
    pub fn from_coordinates(coords: &[f64]) -> Result<Self, BboxParseError> {
        match coords.len() {
            4 => Ok(Self::new(coords[0], coords[1], coords[2], coords[3])),
            6 => Ok(Self::new(coords[0], coords[1], coords[3], coords[4])),
            n => Err(BboxParseError::InvalidCoordinateCount(n)),
        }
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check whether this box and another share at least one point.
    ///
    /// Edges count: two boxes that merely touch are not disjoint.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Check if a point is contained within this bbox (boundary inclusive).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Grow this box to cover a position.
    pub fn extend(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// A degenerate box covering a single position.
    pub fn from_point(x: f64, y: f64) -> Self {
        Self::new(x, y, x, y)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Illegal entry in bounding box: {0}")]
    InvalidNumber(String),

    #[error("Bounding box must have 4 or 6 coordinates, got {0}")]
    InvalidCoordinateCount(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_four_coordinates() {
        let coords = BoundingBox::parse_coordinates("-125.0,24.0,-66.0,50.0").unwrap();
        assert_eq!(coords, vec![-125.0, 24.0, -66.0, 50.0]);

        let bbox = BoundingBox::from_coordinates(&coords).unwrap();
        assert_eq!(bbox.min_x, -125.0);
        assert_eq!(bbox.min_y, 24.0);
        assert_eq!(bbox.max_x, -66.0);
        assert_eq!(bbox.max_y, 50.0);
    }

    #[test]
    fn test_parse_six_coordinates_ignores_vertical() {
        let coords = BoundingBox::parse_coordinates("1,2,0,3,4,100").unwrap();
        assert_eq!(coords.len(), 6);

        let bbox = BoundingBox::from_coordinates(&coords).unwrap();
        assert_eq!(bbox.min_x, 1.0);
        assert_eq!(bbox.min_y, 2.0);
        assert_eq!(bbox.max_x, 3.0);
        assert_eq!(bbox.max_y, 4.0);
    }

    #[test]
    fn test_parse_rejects_wrong_arity() {
        assert!(matches!(
            BoundingBox::parse_coordinates("1,2,3"),
            Err(BboxParseError::InvalidCoordinateCount(3))
        ));
        assert!(matches!(
            BoundingBox::parse_coordinates("1,2,3,4,5"),
            Err(BboxParseError::InvalidCoordinateCount(5))
        ));
    }

    #[test]
    fn test_parse_rejects_non_numeric_and_non_finite() {
        assert!(BoundingBox::parse_coordinates("1,2,three,4").is_err());
        assert!(BoundingBox::parse_coordinates("1,2,inf,4").is_err());
        assert!(BoundingBox::parse_coordinates("1,2,NaN,4").is_err());
        assert!(BoundingBox::parse_coordinates("1,2,,4").is_err());
    }

    #[test]
    fn test_intersects_is_boundary_inclusive() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(10.0, 10.0, 20.0, 20.0);
        let c = BoundingBox::new(10.5, 10.5, 20.0, 20.0);

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_contains_point() {
        let bbox = BoundingBox::new(1.0, 1.0, 2.0, 2.0);
        assert!(bbox.contains_point(1.5, 1.5));
        assert!(bbox.contains_point(1.0, 2.0));
        assert!(!bbox.contains_point(3.5, 1.5));
    }

    #[test]
    fn test_extend() {
        let mut bbox = BoundingBox::from_point(5.0, 5.0);
        bbox.extend(1.0, 8.0);
        assert_eq!(bbox.min_x, 1.0);
        assert_eq!(bbox.min_y, 5.0);
        assert_eq!(bbox.max_x, 5.0);
        assert_eq!(bbox.max_y, 8.0);
    }
}
