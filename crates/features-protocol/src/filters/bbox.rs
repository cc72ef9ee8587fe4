//! Bounding-box filter.

use features_common::{BboxParseError, BoundingBox, Feature};

use crate::collections::CollectionInfo;
use crate::query::RequestParameters;

use super::{Filter, FilterParseError, FilterProvider, FilterRef};

/// Rudimentary 2-D bbox filter that assumes bbox and feature share a CRS.
///
/// The optional `bbox-crs` parameter is carried through to the canonical
/// serialization but not otherwise interpreted here.
#[derive(Debug, Clone)]
pub struct BboxFilter {
    coordinates: Vec<f64>,
    bounds: BoundingBox,
    bbox_crs: Option<String>,
}

impl BboxFilter {
    /// Parse a comma-separated 4- or 6-coordinate bbox parameter.
    pub fn parse(param: &str, bbox_crs: Option<&str>) -> Result<Self, BboxParseError> {
        let coordinates = BoundingBox::parse_coordinates(param)?;
        let bounds = BoundingBox::from_coordinates(&coordinates)?;
        Ok(Self {
            coordinates,
            bounds,
            bbox_crs: bbox_crs.map(str::to_string),
        })
    }

    /// The parsed coordinates, 4 or 6 of them.
    pub fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }

    /// The 2-D box the acceptance test runs against.
    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }
}

impl Filter for BboxFilter {
    fn kind(&self) -> &'static str {
        "bbox"
    }

    fn query_parameters(&self) -> Vec<(String, String)> {
        let coords = self
            .coordinates
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let mut params = vec![("bbox".to_string(), coords)];
        if let Some(crs) = &self.bbox_crs {
            params.push(("bbox-crs".to_string(), crs.clone()));
        }
        params
    }

    fn accept(&self, feature: &Feature) -> bool {
        match feature.geometry.bounds() {
            Some(bounds) => self.bounds.intersects(&bounds),
            None => false,
        }
    }
}

/// Produces a [`BboxFilter`] from the `bbox` parameter.
pub struct BboxFilterProvider;

impl FilterProvider for BboxFilterProvider {
    fn parse_filter(
        &self,
        params: &RequestParameters,
        _collection: &CollectionInfo,
    ) -> Result<Option<FilterRef>, FilterParseError> {
        match params.get_ci("bbox") {
            Some(param) => {
                let filter = BboxFilter::parse(param, params.get_ci("bbox-crs"))?;
                Ok(Some(std::sync::Arc::new(filter)))
            }
            None => Ok(None),
        }
    }
}
