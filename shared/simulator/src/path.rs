use nalgebra::{Point3, UnitQuaternion, Vector3};

/// A course the race follows, parameterized in path units.
pub trait PathEvaluator {
    fn waypoint_count(&self) -> usize;

    /// Converts a waypoint index to a path position.
    fn from_path_units(&self, index: usize) -> f64 {
        index as f64
    }

    fn evaluate_position(&self, pos: f64) -> Point3<f64>;

    fn evaluate_orientation(&self, pos: f64) -> UnitQuaternion<f64>;
}

/// Catmull-Rom spline through a list of waypoints. One path unit per
/// waypoint; the curve passes through waypoint `i` at position `i`.
#[derive(Clone, Debug)]
pub struct RacePath {
    waypoints: Vec<Point3<f64>>,
    looped: bool,
}

impl RacePath {
    pub fn new(waypoints: Vec<Point3<f64>>, looped: bool) -> Self {
        assert!(!waypoints.is_empty(), "Race path has no waypoints");
        Self { waypoints, looped }
    }

    pub fn looped(waypoints: Vec<Point3<f64>>) -> Self {
        Self::new(waypoints, true)
    }

    pub fn open(waypoints: Vec<Point3<f64>>) -> Self {
        Self::new(waypoints, false)
    }

    pub fn waypoints(&self) -> &[Point3<f64>] {
        &self.waypoints
    }

    pub fn is_looped(&self) -> bool {
        self.looped
    }

    fn point(&self, index: isize) -> Vector3<f64> {
        let n = self.waypoints.len() as isize;
        let i = if self.looped {
            index.rem_euclid(n)
        } else {
            index.clamp(0, n - 1)
        };
        self.waypoints[i as usize].coords
    }

    fn segment(&self, pos: f64) -> (isize, f64) {
        let n = self.waypoints.len() as f64;
        let pos = if self.looped {
            pos.rem_euclid(n)
        } else {
            pos.clamp(0.0, n - 1.0)
        };
        let i = pos.floor();
        (i as isize, pos - i)
    }

    fn control_points(&self, i: isize) -> [Vector3<f64>; 4] {
        [
            self.point(i - 1),
            self.point(i),
            self.point(i + 1),
            self.point(i + 2),
        ]
    }

    pub fn tangent(&self, pos: f64) -> Vector3<f64> {
        let (i, t) = self.segment(pos);
        let [p0, p1, p2, p3] = self.control_points(i);
        ((p2 - p0)
            + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * (2.0 * t)
            + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * (3.0 * t * t))
            * 0.5
    }
}

impl PathEvaluator for RacePath {
    fn waypoint_count(&self) -> usize {
        self.waypoints.len()
    }

    fn evaluate_position(&self, pos: f64) -> Point3<f64> {
        let (i, t) = self.segment(pos);
        let [p0, p1, p2, p3] = self.control_points(i);
        let t2 = t * t;
        let t3 = t2 * t;
        let v = (2.0 * p1
            + (p2 - p0) * t
            + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
            + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
            * 0.5;
        Point3::from(v)
    }

    /// Faces along the curve with world up as the up hint.
    fn evaluate_orientation(&self, pos: f64) -> UnitQuaternion<f64> {
        let tangent = self.tangent(pos);
        if tangent.norm_squared() < 1e-12 {
            return UnitQuaternion::identity();
        }
        let up = if tangent.normalize().y.abs() > 0.999 {
            Vector3::z()
        } else {
            Vector3::y()
        };
        UnitQuaternion::face_towards(&tangent, &up)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::point;
    use test_log::test;

    fn square() -> RacePath {
        RacePath::looped(vec![
            point![0.0, 0.0, 0.0],
            point![100.0, 0.0, 0.0],
            point![100.0, 0.0, 100.0],
            point![0.0, 0.0, 100.0],
        ])
    }

    #[test]
    fn test_passes_through_waypoints() {
        let path = square();
        for (i, waypoint) in path.waypoints().iter().enumerate() {
            let p = path.evaluate_position(path.from_path_units(i));
            assert_abs_diff_eq!(p, *waypoint, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_looped_wraps() {
        let path = square();
        assert_abs_diff_eq!(
            path.evaluate_position(4.5),
            path.evaluate_position(0.5),
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            path.evaluate_position(-0.5),
            path.evaluate_position(3.5),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_open_clamps() {
        let path = RacePath::open(vec![point![0.0, 0.0, 0.0], point![0.0, 0.0, 100.0]]);
        assert_abs_diff_eq!(
            path.evaluate_position(5.0),
            point![0.0, 0.0, 100.0],
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            path.evaluate_position(-1.0),
            point![0.0, 0.0, 0.0],
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_orientation_faces_along_path() {
        let path = RacePath::open(vec![
            point![0.0, 0.0, 0.0],
            point![0.0, 0.0, 100.0],
            point![0.0, 0.0, 200.0],
        ]);
        let forward = path.evaluate_orientation(1.0) * Vector3::z();
        assert_abs_diff_eq!(forward, Vector3::z(), epsilon = 1e-9);
        let up = path.evaluate_orientation(1.0) * Vector3::y();
        assert_abs_diff_eq!(up, Vector3::y(), epsilon = 1e-9);
    }

    #[test]
    fn test_single_waypoint() {
        let path = RacePath::looped(vec![point![5.0, 6.0, 7.0]]);
        assert_abs_diff_eq!(path.evaluate_position(0.3), point![5.0, 6.0, 7.0]);
        assert_eq!(path.evaluate_orientation(0.0), UnitQuaternion::identity());
    }
}
