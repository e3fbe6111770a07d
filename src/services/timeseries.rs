use chrono::{Duration, NaiveDate};

/// One day of an averaged price series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl DailyPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Complete a sparse daily series into a dense one.
///
/// Walks every calendar day from the first to the last observed date and
/// carries the most recent observed value into gap days. Input order does
/// not matter; output is ascending by date. Empty input stays empty, and a
/// series with no gaps comes back unchanged.
pub fn forward_fill(mut points: Vec<DailyPoint>) -> Vec<DailyPoint> {
    if points.is_empty() {
        return points;
    }
    points.sort_by_key(|p| p.date);

    let first = points[0];
    let last_date = points[points.len() - 1].date;

    let mut filled = Vec::with_capacity(points.len());
    let mut observed = points.iter().peekable();
    let mut carried = first.value;
    let mut current_date = first.date;

    while current_date <= last_date {
        while let Some(point) = observed.peek() {
            if point.date > current_date {
                break;
            }
            carried = point.value;
            observed.next();
        }
        filled.push(DailyPoint::new(current_date, carried));
        current_date += Duration::days(1);
    }

    filled
}
