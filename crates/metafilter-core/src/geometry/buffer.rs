//! Circle and line-buffer approximations on the sphere.

use geo::{Coord, HaversineBearing, HaversineDestination, LineString, MultiPolygon, Point, Polygon};

/// Polygon with `steps` vertices approximating the circle of `radius_m`
/// meters around `center`.
pub fn circle(center: Point<f64>, radius_m: f64, steps: usize) -> Polygon<f64> {
    let steps = steps.max(3);
    let ring: Vec<Coord<f64>> = (0..=steps)
        .map(|i| {
            let bearing = (i % steps) as f64 * 360.0 / steps as f64;
            center.haversine_destination(bearing, radius_m).0
        })
        .collect();
    Polygon::new(LineString::new(ring), vec![])
}

/// Area within `width_m` meters of `line`, as one quad per segment plus one
/// circle per vertex.
///
/// Returns `None` for an empty line or a non-positive width.
pub fn buffer_line(line: &LineString<f64>, width_m: f64, steps: usize) -> Option<MultiPolygon<f64>> {
    if width_m.is_nan() || width_m <= 0.0 || line.0.is_empty() {
        return None;
    }

    let points: Vec<Point<f64>> = line.points().collect();
    let mut polygons = Vec::with_capacity(points.len() * 2);

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a == b {
            continue;
        }
        let bearing = a.haversine_bearing(b);
        let left = bearing - 90.0;
        let right = bearing + 90.0;
        let a_left = a.haversine_destination(left, width_m);
        let ring = vec![
            a_left,
            b.haversine_destination(left, width_m),
            b.haversine_destination(right, width_m),
            a.haversine_destination(right, width_m),
            a_left,
        ];
        polygons.push(Polygon::new(LineString::from(ring), vec![]));
    }

    for point in points {
        polygons.push(circle(point, width_m, steps));
    }

    Some(MultiPolygon::new(polygons))
}
