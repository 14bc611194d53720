/// Keeps smoothed group markers inside the visible range.
///
/// Order matters: the last position is clamped to `max`, interior positions
/// move forward by half an interval, and the first is clamped to `min`.
pub fn smooth_positions(x: &mut [f64], min: f64, max: f64, interval: f64) {
    let Some(last) = x.len().checked_sub(1) else {
        return;
    };

    x[last] = x[last].min(max);
    if last > 1 {
        for value in &mut x[1..last] {
            *value += interval / 2.0;
        }
    }
    x[0] = x[0].max(min);
}
