//! Numeric helpers shared by the detectors.
//!
//! Every function returns a neutral value instead of dividing by zero, so a
//! degenerate input silences a detector rather than failing the query.

/// Relative difference `|a - b| / (|a| + |b|)`, 0 when both are 0.
pub fn relation(a: f64, b: f64) -> f64 {
    let denominator = a.abs() + b.abs();
    if denominator == 0.0 {
        0.0
    } else {
        (a - b).abs() / denominator
    }
}

/// `1 - relation(a, b)`.
pub fn similarity(a: f64, b: f64) -> f64 {
    1.0 - relation(a, b)
}

/// Population standard deviation; 0 for an empty slice.
pub fn pstdev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n).sqrt()
}

/// Adjusted Fisher-Pearson skewness with a population standard deviation.
///
/// `n / ((n - 1)(n - 2)) * Σ((x - μ) / σ)³`, or 0 when `n <= 2` or `σ = 0`.
pub fn skew(values: &[f64]) -> f64 {
    let size = values.len();
    if size <= 2 {
        return 0.0;
    }
    let sigma = pstdev(values);
    if sigma == 0.0 {
        return 0.0;
    }
    let n = size as f64;
    let mean = values.iter().sum::<f64>() / n;
    let cubes: f64 = values.iter().map(|x| ((x - mean) / sigma).powi(3)).sum();
    cubes * n / ((n - 1.0) * (n - 2.0))
}

/// Cosine similarity of two equally long vectors, clamped to `[-1, 1]`.
///
/// Returns `None` when either vector has zero magnitude.
pub fn cosine(a: &[f64], b: &[f64]) -> Option<f64> {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        None
    } else {
        Some((dot / (norm_a * norm_b)).clamp(-1.0, 1.0))
    }
}

/// Angle between two vectors in degrees; 0 for a zero-magnitude vector.
pub fn angle_degrees(a: &[f64], b: &[f64]) -> f64 {
    cosine(a, b).map_or(0.0, |c| c.acos().to_degrees())
}

/// Pearson correlation coefficient; `None` below two points or with no variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;
    let centered_x: Vec<f64> = xs.iter().map(|x| x - mean_x).collect();
    let centered_y: Vec<f64> = ys.iter().map(|y| y - mean_y).collect();
    cosine(&centered_x, &centered_y)
}
