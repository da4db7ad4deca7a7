use crate::errors::IpolError;

/// Linear interpolation of `y` at `x` between the points `(x0, y0)` and `(x1, y1)`.
///
/// Fails when `x1 - x0` is not a strictly positive, finite width.
pub fn interpolate_linear(x: f64, x0: f64, x1: f64, y0: f64, y1: f64) -> Result<f64, IpolError> {
    let dx = x1 - x0;
    if !(dx > 0.0) || !dx.is_finite() {
        return Err(IpolError::DegenerateInterval {
            lower: x0,
            upper: x1,
        });
    }
    Ok(y0 + (x - x0) * (y1 - y0) / dx)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn interpolate_between_points() {
        assert_eq!(interpolate_linear(1.0, 0.0, 2.0, 10.0, 20.0).unwrap(), 15.0);
        assert_eq!(interpolate_linear(3.5, 2.0, 5.0, 20.0, 50.0).unwrap(), 35.0);
        assert!((interpolate_linear(97.3, 97.0, 98.0, 0.818, 0.792).unwrap() - 0.8102).abs() < 1e-12);
    }

    #[test]
    fn interpolate_decreasing_values() {
        assert_eq!(interpolate_linear(0.5, 0.0, 1.0, 4.0, -4.0).unwrap(), 0.0);
    }

    #[test]
    fn zero_width_interval_fails() {
        assert_eq!(
            interpolate_linear(1.0, 1.0, 1.0, 2.0, 3.0),
            Err(IpolError::DegenerateInterval {
                lower: 1.0,
                upper: 1.0
            })
        );
        assert!(interpolate_linear(1.0, 2.0, 1.0, 2.0, 3.0).is_err());
        assert!(interpolate_linear(1.0, 0.0, std::f64::NAN, 2.0, 3.0).is_err());
        assert!(interpolate_linear(1.0, 0.0, std::f64::INFINITY, 2.0, 3.0).is_err());
    }

    #[test]
    fn missing_value_propagates() {
        assert!(interpolate_linear(1.0, 0.0, 2.0, std::f64::NAN, 3.0)
            .unwrap()
            .is_nan());
    }
}
