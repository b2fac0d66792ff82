//! Small numeric helpers shared by the engine stages. All of them skip missing
//! observations and return `None` when there is not enough data.

use core_types::Series;

/// Arithmetic mean of the given values.
pub(crate) fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Sample standard deviation (n - 1 denominator). Needs at least two values.
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mu = mean(values.iter().copied())?;
    let ss: f64 = values.iter().map(|v| (v - mu) * (v - mu)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Pearson correlation over the rows where both series are present.
///
/// Returns `None` for fewer than two overlapping rows or when either side is constant
/// over the overlap.
pub(crate) fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Applies `f(previous, current)` to each pair of consecutive rows. The first row is
/// always missing, as is any row where either side is missing or the result is not finite.
pub(crate) fn lagged<F>(column: &[Option<f64>], f: F) -> Series
where
    F: Fn(f64, f64) -> f64,
{
    let mut out = Vec::with_capacity(column.len());
    if column.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(column.windows(2).map(|w| match (w[0], w[1]) {
        (Some(prev), Some(cur)) => Some(f(prev, cur)).filter(|v| v.is_finite()),
        _ => None,
    }));
    out
}
