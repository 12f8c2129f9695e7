//! Operations on lists of planar and sky coordinates.
//!
//! Provides:
//! - Euclidean and great-circle (haversine) metrics
//! - Condensed pairwise distance matrices
//! - Rectangular subregion selection
//! - Reprojection of sky positions so their centre of mass sits at (0, 0)

use std::f64::consts::PI;

use crate::error::{ClusterError, Result, check_lengths};

/// Degrees to radians.
pub const DTOR: f64 = PI / 180.0;

/// Radians to degrees.
pub const RTOD: f64 = 180.0 / PI;

/// A distance function `d = f(x1, y1, x2, y2)`.
pub type Metric = fn(f64, f64, f64, f64) -> f64;

#[inline]
fn hav(x: f64) -> f64 {
    (x / 2.0).sin().powi(2)
}

/// Euclidean distance between two points in the plane.
pub fn euclidean_metric(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    (x2 - x1).hypot(y2 - y1)
}

/// Great-circle distance on the unit sphere. Angles in radians.
pub fn haversine_metric(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let h = hav(lat2 - lat1) + lat1.cos() * lat2.cos() * hav(lon2 - lon1);
    // Rounding can push h a hair above 1 for antipodal points.
    2.0 * h.sqrt().min(1.0).asin()
}

/// Great-circle distance with inputs and output in degrees.
pub fn haversine_metric_deg(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    haversine_metric(lon1 * DTOR, lat1 * DTOR, lon2 * DTOR, lat2 * DTOR) * RTOD
}

/// Condensed distance matrix: `n(n-1)/2` distances ordered (0,1), (0,2), ...,
/// (0,n-1), (1,2), ... like `scipy.spatial.distance.pdist`.
///
/// Memory is quadratic in the number of points; intended for small sets.
pub fn distance_matrix(x: &[f64], y: &[f64], metric: Metric) -> Result<Vec<f64>> {
    check_lengths(x, y)?;
    let n = x.len();
    let mut dist = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in i + 1..n {
            dist.push(metric(x[i], y[i], x[j], y[j]));
        }
    }
    Ok(dist)
}

/// Open rectangle `(xmin, xmax) x (ymin, ymax)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Region {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    /// True if the point lies strictly inside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x > self.xmin && x < self.xmax && y > self.ymin && y < self.ymax
    }
}

/// Points of a catalog falling inside a region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subregion {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Index of each selected point in the original sequences.
    pub indices: Vec<usize>,
}

/// Selects the points strictly inside `region`, keeping their original indices.
pub fn subregion(x: &[f64], y: &[f64], region: &Region) -> Result<Subregion> {
    check_lengths(x, y)?;
    let mut out = Subregion::default();
    for (i, (&px, &py)) in x.iter().zip(y).enumerate() {
        if region.contains(px, py) {
            out.x.push(px);
            out.y.push(py);
            out.indices.push(i);
        }
    }
    Ok(out)
}

/// Rotates sky positions (degrees) so their centre of mass lies at (0, 0).
///
/// Great-circle separations are preserved. Returned right ascensions are in
/// `[-180, 180)`.
///
/// # Errors
/// `InvalidArgument` on mismatched lengths or empty input.
pub fn reproject_to_equator(ras: &[f64], decs: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
    check_lengths(ras, decs)?;
    if ras.is_empty() {
        return Err(ClusterError::invalid("cannot reproject an empty set of points"));
    }
    let n = ras.len() as f64;

    // Centre of mass seen from above the pole, in Cartesian coordinates.
    let (sx, sy) = ras.iter().zip(decs).fold((0.0, 0.0), |(sx, sy), (&ra, &dec)| {
        let c = (dec * DTOR).cos();
        (sx + c * (ra * DTOR).cos(), sy + c * (ra * DTOR).sin())
    });
    let xc = sx / n;
    let yc = sy / n;
    let ra_c = yc.atan2(xc) * RTOD;

    let mean_dec = decs.iter().sum::<f64>() / n;
    let dec_c = if mean_dec.abs() < 45.0 {
        mean_dec
    } else {
        // Near the pole the mean dec is biased; use the projected radius instead.
        let d = xc.hypot(yc).min(1.0).acos() * RTOD;
        if mean_dec < 0.0 { -d } else { d }
    };

    let (sin_c, cos_c) = (dec_c * DTOR).sin_cos();
    let mut out_ra = Vec::with_capacity(ras.len());
    let mut out_dec = Vec::with_capacity(decs.len());
    for (&ra, &dec) in ras.iter().zip(decs) {
        let ra = wrap_degrees(ra - ra_c);

        let (sin_ra, cos_ra) = (ra * DTOR).sin_cos();
        let (sin_dec, cos_dec) = (dec * DTOR).sin_cos();
        let x = cos_ra * cos_dec;
        let y = sin_ra * cos_dec;
        let z = sin_dec;

        // Rotate clockwise in the x-z plane by dec_c.
        let xp = x * cos_c + z * sin_c;
        let zp = -x * sin_c + z * cos_c;

        out_dec.push(zp.clamp(-1.0, 1.0).asin() * RTOD);
        // atan2 can land on +180 exactly.
        out_ra.push(wrap_degrees(y.atan2(xp) * RTOD));
    }
    Ok((out_ra, out_dec))
}

/// Wraps an angle in degrees into `[-180, 180)`.
fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid may round up to the modulus itself.
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot_metric(lon0: f64, lat0: f64, lon1: f64, lat1: f64) -> f64 {
        let a = (lat0.cos() * lon0.cos(), lat0.cos() * lon0.sin(), lat0.sin());
        let b = (lat1.cos() * lon1.cos(), lat1.cos() * lon1.sin(), lat1.sin());
        (a.0 * b.0 + a.1 * b.1 + a.2 * b.2).clamp(-1.0, 1.0).acos()
    }

    #[test]
    fn wrapped_angles_exclude_plus_180() {
        assert_eq!(wrap_degrees(180.0), -180.0);
        assert_eq!(wrap_degrees(-180.0), -180.0);
        assert_eq!(wrap_degrees(540.0), -180.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(45.0), 45.0);
    }

    #[test]
    fn haversine_matches_dot_product_form() {
        let pairs = [
            (0.1, 0.2, 1.3, -0.4),
            (3.0, 1.2, 5.9, -1.5),
            (0.0, PI / 2.0, 2.0, 0.3),
            (6.0, -0.7, 0.2, 0.7),
        ];
        for (lon0, lat0, lon1, lat1) in pairs {
            let d = haversine_metric(lon0, lat0, lon1, lat1);
            assert!((d - dot_metric(lon0, lat0, lon1, lat1)).abs() < 1e-9);
            assert!((d - haversine_metric(lon1, lat1, lon0, lat0)).abs() < 1e-12);
        }
    }

    #[test]
    fn antipodes_are_pi_apart() {
        let d = haversine_metric(0.3, 0.5, 0.3 + PI, -0.5);
        assert!((d - PI).abs() < 1e-9);
        assert!((haversine_metric_deg(10.0, 20.0, 190.0, -20.0) - 180.0).abs() < 1e-7);
    }

    #[test]
    fn distance_matrix_is_condensed_in_pdist_order() {
        let x = [0.0, 3.0, 0.0];
        let y = [0.0, 4.0, 1.0];
        let d = distance_matrix(&x, &y, euclidean_metric).unwrap();
        assert_eq!(d.len(), 3);
        assert_eq!(d[0], 5.0);
        assert_eq!(d[1], 1.0);
        assert!((d[2] - 18f64.sqrt()).abs() < 1e-12);
        assert!(distance_matrix(&[], &[], euclidean_metric).unwrap().is_empty());
    }

    #[test]
    fn subregion_is_exclusive_and_keeps_indices() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 1.0, 2.0, 3.0];
        let sub = subregion(&x, &y, &Region::new(0.0, 3.0, 0.5, 2.5)).unwrap();
        assert_eq!(sub.indices, vec![1, 2]);
        assert_eq!(sub.x, vec![1.0, 2.0]);
        assert_eq!(sub.y, vec![1.0, 2.0]);
    }

    #[test]
    fn reprojection_centres_points_on_equator() {
        let ras = [150.0, 150.2, 149.8, 150.1];
        let decs = [30.0, 30.1, 29.9, 29.95];
        let (new_ra, new_dec) = reproject_to_equator(&ras, &decs).unwrap();
        let mean_ra = new_ra.iter().sum::<f64>() / 4.0;
        let mean_dec = new_dec.iter().sum::<f64>() / 4.0;
        assert!(mean_ra.abs() < 1e-3, "mean ra {mean_ra}");
        assert!(mean_dec.abs() < 1e-3, "mean dec {mean_dec}");

        let before = distance_matrix(&ras, &decs, haversine_metric_deg).unwrap();
        let after = distance_matrix(&new_ra, &new_dec, haversine_metric_deg).unwrap();
        for (a, b) in before.iter().zip(&after) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn reprojection_near_pole_preserves_distances() {
        let ras = [0.0, 90.0, 180.0, 270.0, 45.0];
        let decs = [88.0, 88.5, 88.2, 88.8, 89.0];
        let (new_ra, new_dec) = reproject_to_equator(&ras, &decs).unwrap();
        let before = distance_matrix(&ras, &decs, haversine_metric_deg).unwrap();
        let after = distance_matrix(&new_ra, &new_dec, haversine_metric_deg).unwrap();
        for (a, b) in before.iter().zip(&after) {
            assert!((a - b).abs() < 1e-9);
        }
        assert!(new_dec.iter().all(|d| d.abs() < 5.0));
    }

    #[test]
    fn reprojection_rejects_empty_input() {
        assert!(reproject_to_equator(&[], &[]).is_err());
    }
}
