// Interval domain model - a fetched, extendable window of one metric
use super::telemetry::{DataPoint, TimeFilter};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub id: String,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub points: Vec<DataPoint>,
}

impl Interval {
    /// An interval with no points yet.
    pub fn new(id: String, name: String, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            start,
            end,
            points: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn initial_filter(&self) -> TimeFilter {
        TimeFilter::Between {
            after: self.start,
            before: self.end,
        }
    }

    /// Query for points before the current window, down to `start` if given.
    pub fn left_filter(&self, start: Option<DateTime<Utc>>) -> TimeFilter {
        match start {
            Some(after) => TimeFilter::Between {
                after,
                before: self.start,
            },
            None => TimeFilter::Before(self.start),
        }
    }

    /// Query for points after the current window, up to `end` if given.
    pub fn right_filter(&self, end: Option<DateTime<Utc>>) -> TimeFilter {
        match end {
            Some(before) => TimeFilter::Between {
                after: self.end,
                before,
            },
            None => TimeFilter::After(self.end),
        }
    }

    /// Append the initial batch in the order received.
    pub fn apply_initial(&mut self, batch: Vec<DataPoint>) {
        self.points.extend(batch);
    }

    /// Put points strictly before `start` in front of the current points and
    /// move `start` to the earliest point. Returns how many were kept.
    pub fn apply_left(&mut self, batch: Vec<DataPoint>) -> usize {
        let start = self.start;
        let mut fresh: Vec<DataPoint> = batch.into_iter().filter(|p| p.timestamp < start).collect();
        let kept = fresh.len();
        if kept == 0 {
            return 0;
        }

        fresh.append(&mut self.points);
        self.points = fresh;
        if let Some(first) = self.points.first() {
            self.start = first.timestamp;
        }
        kept
    }

    /// Append points strictly after `end` and move `end` to the latest
    /// point. Returns how many were kept.
    pub fn apply_right(&mut self, batch: Vec<DataPoint>) -> usize {
        let end = self.end;
        let before = self.points.len();
        self.points.extend(batch.into_iter().filter(|p| p.timestamp > end));
        let kept = self.points.len() - before;

        if let Some(last) = self.points.last() {
            if last.timestamp > self.end {
                self.end = last.timestamp;
            }
        }
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2011, 6, 1, 12, 0, 0).unwrap() + Duration::minutes(minute)
    }

    fn points(minutes: &[i64]) -> Vec<DataPoint> {
        minutes.iter().map(|m| DataPoint::new(at(*m), *m as f64)).collect()
    }

    fn interval() -> Interval {
        let mut interval = Interval::new("0x402".into(), "Bus Voltage".into(), at(0), at(10));
        interval.apply_initial(points(&[0, 5, 10]));
        interval
    }

    #[test]
    fn test_filters() {
        let interval = interval();
        assert_eq!(
            interval.initial_filter(),
            TimeFilter::Between { after: at(0), before: at(10) }
        );
        assert_eq!(interval.left_filter(None), TimeFilter::Before(at(0)));
        assert_eq!(
            interval.left_filter(Some(at(-30))),
            TimeFilter::Between { after: at(-30), before: at(0) }
        );
        assert_eq!(interval.right_filter(None), TimeFilter::After(at(10)));
        assert_eq!(
            interval.right_filter(Some(at(40))),
            TimeFilter::Between { after: at(10), before: at(40) }
        );
    }

    #[test]
    fn test_apply_right_moves_end_to_last_point() {
        let mut interval = interval();
        assert_eq!(interval.apply_right(points(&[12, 17])), 2);
        assert_eq!(interval.end, at(17));
        assert_eq!(interval.points.len(), 5);
    }

    #[test]
    fn test_apply_right_empty_keeps_end() {
        let mut interval = interval();
        assert_eq!(interval.apply_right(Vec::new()), 0);
        assert_eq!(interval.end, at(10));
    }

    #[test]
    fn test_apply_right_end_never_decreases() {
        // window ends past the last point received so far
        let mut interval = Interval::new("0x402".into(), "Bus Voltage".into(), at(0), at(30));
        interval.apply_initial(points(&[0, 5]));
        interval.apply_right(points(&[31]));
        assert_eq!(interval.end, at(31));
    }

    #[test]
    fn test_apply_right_drops_overlap() {
        let mut interval = interval();
        // the endpoint bounds are inclusive, so the last known point comes back
        assert_eq!(interval.apply_right(points(&[10, 11])), 1);
        assert_eq!(interval.points.iter().filter(|p| p.timestamp == at(10)).count(), 1);
    }

    #[test]
    fn test_apply_left_keeps_time_order() {
        let mut interval = interval();
        assert_eq!(interval.apply_left(points(&[-8, -3, 0])), 2);
        assert_eq!(interval.start, at(-8));
        assert_eq!(interval.end, at(10));

        let times: Vec<_> = interval.points.iter().map(|p| p.timestamp).collect();
        let mut sorted = times.clone();
        sorted.sort();
        assert_eq!(times, sorted);
    }

    #[test]
    fn test_apply_left_empty_keeps_start() {
        let mut interval = interval();
        assert_eq!(interval.apply_left(Vec::new()), 0);
        assert_eq!(interval.start, at(0));
        assert_eq!(interval.points.len(), 3);
    }
}
