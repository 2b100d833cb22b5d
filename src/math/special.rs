//! Special functions used by outlier scoring.

use num_traits::Float;

/// Error function, Abramowitz & Stegun 7.1.26 (absolute error below 1.5e-7).
pub fn erf<T: Float>(x: T) -> T {
    let c = |v: f64| T::from(v).unwrap_or_else(T::zero);
    let sign = if x < T::zero() { -T::one() } else { T::one() };
    let x = x.abs();

    let t = T::one() / (T::one() + c(0.327_591_1) * x);
    let poly = t
        * (c(0.254_829_592)
            + t * (c(-0.284_496_736)
                + t * (c(1.421_413_741) + t * (c(-1.453_152_027) + t * c(1.061_405_429)))));
    sign * (T::one() - poly * (-x * x).exp())
}
