/// Arithmetic mean, `None` for an empty slice.
pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Share of `part` in `whole` as a rounded percentage, `None` for an empty whole.
pub fn percent(part: usize, whole: usize) -> Option<u32> {
    match whole {
        0 => None,
        w => Some((part as f64 / w as f64 * 100.0).round() as u32),
    }
}
