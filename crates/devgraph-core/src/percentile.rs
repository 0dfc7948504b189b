use std::cmp::Ordering;

/// Share of the population at or above `value`, as a whole percentage
///
/// Sorts a private copy, so the caller's slice keeps its order. A value above
/// every member (or an empty population) ranks 100.
pub fn compute_percentile_rank<T>(value: T, population: &[T]) -> u32
where
    T: PartialOrd + Copy,
{
    let mut sorted = population.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    match sorted.iter().position(|v| *v >= value) {
        Some(index) => {
            let len = sorted.len() as f64;
            (((len - index as f64) / len) * 100.0).round() as u32
        }
        None => 100,
    }
}
