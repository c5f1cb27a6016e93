//! Geographic bounding boxes

use serde::{Deserialize, Serialize};

/// Axis-aligned lon/lat box (south-west and north-east corners)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLatBounds {
    pub sw: [f64; 2],
    pub ne: [f64; 2],
}

impl LngLatBounds {
    /// Degenerate box around a single point
    pub fn from_point(lng_lat: [f64; 2]) -> Self {
        Self {
            sw: lng_lat,
            ne: lng_lat,
        }
    }

    /// Grow to include `lng_lat`
    pub fn extend(&mut self, lng_lat: [f64; 2]) {
        self.sw[0] = self.sw[0].min(lng_lat[0]);
        self.sw[1] = self.sw[1].min(lng_lat[1]);
        self.ne[0] = self.ne[0].max(lng_lat[0]);
        self.ne[1] = self.ne[1].max(lng_lat[1]);
    }

    /// Box covering every coordinate, `None` when there are none
    pub fn from_coordinates<I>(coordinates: I) -> Option<Self>
    where
        I: IntoIterator<Item = [f64; 2]>,
    {
        let mut iter = coordinates.into_iter();
        let mut bounds = Self::from_point(iter.next()?);
        for c in iter {
            bounds.extend(c);
        }
        Some(bounds)
    }

    /// `[[west, south], [east, north]]`, the array form map widgets accept
    pub fn to_array(&self) -> [[f64; 2]; 2] {
        [self.sw, self.ne]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_cover_all_points() {
        let points = [[-81.2, 27.5], [-80.1, 25.7], [-82.6, 28.9]];
        let bounds = LngLatBounds::from_coordinates(points).unwrap();

        assert_eq!(bounds.sw, [-82.6, 25.7]);
        assert_eq!(bounds.ne, [-80.1, 28.9]);
        for [lng, lat] in points {
            assert!(lng >= bounds.sw[0] && lng <= bounds.ne[0]);
            assert!(lat >= bounds.sw[1] && lat <= bounds.ne[1]);
        }
    }

    #[test]
    fn test_single_point_bounds() {
        let bounds = LngLatBounds::from_coordinates([[-81.2, 27.5]]).unwrap();
        assert_eq!(bounds.to_array(), [[-81.2, 27.5], [-81.2, 27.5]]);
    }

    #[test]
    fn test_no_points_no_bounds() {
        assert!(LngLatBounds::from_coordinates(Vec::<[f64; 2]>::new()).is_none());
    }
}
