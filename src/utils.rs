/// Borrows two adjacent elements mutably: `(items[i], items[i + 1])`.
///
/// Panics if `i + 1` is out of bounds.
pub fn pair_mut<T>(items: &mut [T], i: usize) -> (&mut T, &mut T) {
    let (before, after) = items[i..].split_at_mut(1);
    (&mut before[0], &mut after[0])
}

/// Computes the dot product of two equal-length slices.
pub fn dot(lhs: &[f64], rhs: &[f64]) -> f64 {
    debug_assert_eq!(lhs.len(), rhs.len());
    lhs.iter().zip(rhs).map(|(l, r)| l * r).sum()
}
