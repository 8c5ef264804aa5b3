use num_traits::Float;

/// Arithmetic mean, `None` for an empty slice.
pub fn mean<F: Float>(values: &[F]) -> Option<F> {
    if values.is_empty() {
        return None;
    }

    let sum = values.iter().fold(F::zero(), |acc, &v| acc + v);

    Some(sum / F::from(values.len())?)
}

pub fn gauss(x: f32, c: f32) -> f32 {
    (-((x * x) / (2.0 * c * c))).exp()
}
