//! Five-sample least-squares trend.

/// Number of most-recent samples the slope is fitted over.
pub const TREND_WINDOW: usize = 5;

/// A slope only counts when it exceeds this share of the window mean.
const SIGNIFICANCE: f32 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

/// Classify the trend of the last [`TREND_WINDOW`] values of `values`
/// (oldest first).
pub fn trend<I>(values: I) -> Trend
where
    I: IntoIterator<Item = f32>,
{
    let mut window: heapless::Deque<f32, TREND_WINDOW> = heapless::Deque::new();
    for v in values {
        if window.is_full() {
            let _ = window.pop_front();
        }
        let _ = window.push_back(v);
    }
    if !window.is_full() {
        return Trend::InsufficientData;
    }

    let n = TREND_WINDOW as f32;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = window.iter().sum::<f32>() / n;

    let (mut num, mut den) = (0.0f32, 0.0f32);
    for (i, y) in window.iter().enumerate() {
        let dx = i as f32 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }
    let slope = num / den;

    if slope.abs() > SIGNIFICANCE * y_mean.abs() {
        if slope > 0.0 { Trend::Increasing } else { Trend::Decreasing }
    } else {
        Trend::Stable
    }
}
