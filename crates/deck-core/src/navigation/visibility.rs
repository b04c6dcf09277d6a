/// Which slides stay displayed around `current`.
///
/// Slide `x` is displayed iff `|current - x| < view_distance`. Hidden slides
/// still take part in navigation, they are only skipped when rendering.
pub fn compute_visibility_window(current: usize, view_distance: usize, len: usize) -> Vec<bool> {
    (0..len)
        .map(|x| current.abs_diff(x) < view_distance)
        .collect()
}
