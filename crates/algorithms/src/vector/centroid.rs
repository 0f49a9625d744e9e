//! Representative points for features
//!
//! Centroids here are plain vertex averages, not area-weighted centres of
//! mass. Polygons use their exterior ring only; holes are ignored.

use geo_types::{Coord, Geometry, MultiPoint, MultiPolygon, Point, Polygon};

/// Representative 2-D point of a geometry.
///
/// - Point: the point itself
/// - Polygon: mean of the exterior ring vertices
/// - MultiPoint: mean of all points
/// - MultiPolygon: mean of all exterior ring vertices, pooled
///
/// Returns `None` for every other geometry type and for empty shapes.
pub fn centroid(geom: &Geometry<f64>) -> Option<Point<f64>> {
    match geom {
        Geometry::Point(p) => Some(*p),
        Geometry::Polygon(p) => polygon_vertex_mean(p),
        Geometry::MultiPoint(mp) => multipoint_mean(mp),
        Geometry::MultiPolygon(mp) => multipolygon_vertex_mean(mp),
        _ => None,
    }
}

fn polygon_vertex_mean(poly: &Polygon<f64>) -> Option<Point<f64>> {
    mean_of(poly.exterior().0.iter().copied())
}

fn multipoint_mean(mp: &MultiPoint<f64>) -> Option<Point<f64>> {
    mean_of(mp.0.iter().map(|p| p.0))
}

fn multipolygon_vertex_mean(mp: &MultiPolygon<f64>) -> Option<Point<f64>> {
    mean_of(mp.0.iter().flat_map(|p| p.exterior().0.iter().copied()))
}

fn mean_of(coords: impl Iterator<Item = Coord<f64>>) -> Option<Point<f64>> {
    let (mut sx, mut sy, mut n) = (0.0, 0.0, 0usize);
    for c in coords {
        sx += c.x;
        sy += c.y;
        n += 1;
    }
    if n == 0 {
        return None;
    }
    Some(Point::new(sx / n as f64, sy / n as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo_types::{line_string, LineString};

    fn square(x0: f64, y0: f64, size: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (x0, y0),
                (x0 + size, y0),
                (x0 + size, y0 + size),
                (x0, y0 + size),
                (x0, y0),
            ]),
            vec![],
        )
    }

    #[test]
    fn test_centroid_point() {
        let c = centroid(&Geometry::Point(Point::new(3.0, 7.0))).unwrap();
        assert_eq!(c.x(), 3.0);
        assert_eq!(c.y(), 7.0);
    }

    #[test]
    fn test_polygon_is_vertex_mean() {
        // Closed ring of 5 stored vertices: (0+10+10+0+0)/5 = 4
        let c = centroid(&Geometry::Polygon(square(0.0, 0.0, 10.0))).unwrap();
        assert_relative_eq!(c.x(), 4.0, epsilon = 1e-12);
        assert_relative_eq!(c.y(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_polygon_ignores_holes() {
        let hole = LineString::from(vec![(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 1.0)]);
        let mut poly = square(0.0, 0.0, 10.0);
        poly.interiors_push(hole);
        let c = centroid(&Geometry::Polygon(poly)).unwrap();
        assert_relative_eq!(c.x(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_multipoint_mean() {
        let mp = MultiPoint::from(vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(4.0, 6.0),
        ]);
        let c = centroid(&Geometry::MultiPoint(mp)).unwrap();
        assert_relative_eq!(c.x(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(c.y(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_multipolygon_pools_vertices() {
        let mp = MultiPolygon::new(vec![square(0.0, 0.0, 10.0), square(100.0, 0.0, 10.0)]);
        let c = centroid(&Geometry::MultiPolygon(mp)).unwrap();
        // 10 pooled vertices, x sum = 20 + 520
        assert_relative_eq!(c.x(), 54.0, epsilon = 1e-12);
        assert_relative_eq!(c.y(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_and_unsupported() {
        assert!(centroid(&Geometry::MultiPoint(MultiPoint::new(vec![]))).is_none());
        assert!(centroid(&Geometry::MultiPolygon(MultiPolygon::new(vec![]))).is_none());
        let ls = line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)];
        assert!(centroid(&Geometry::LineString(ls)).is_none());
    }
}
