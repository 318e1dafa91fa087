//! Point of maximum derivative magnitude

use thermocurve_core::{Curve, Sample};

/// Sample with the largest |dy/dx| in a derivative sequence
///
/// The first occurrence wins on ties; NaN values are skipped. Returns `None`
/// for an empty sequence (or one made only of NaN).
pub fn find_max_derivative_point(derivative: &Curve) -> Option<Sample> {
    derivative
        .samples()
        .filter(|s| !s.y.is_nan())
        .fold(None, |best: Option<Sample>, s| match best {
            Some(b) if b.y.abs() >= s.y.abs() => Some(b),
            _ => Some(s),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_largest_magnitude() {
        let derivative = Curve::from_xy(vec![0.0, 1.0, 2.0], vec![1.0, 5.0, -9.0]).unwrap();
        assert_eq!(find_max_derivative_point(&derivative), Some(Sample::new(2.0, -9.0)));
    }

    #[test]
    fn test_empty_sequence() {
        assert_eq!(find_max_derivative_point(&Curve::new()), None);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let derivative = Curve::from_xy(vec![0.0, 1.0, 2.0], vec![3.0, -3.0, 1.0]).unwrap();
        assert_eq!(find_max_derivative_point(&derivative), Some(Sample::new(0.0, 3.0)));
    }
}
