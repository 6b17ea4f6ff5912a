//! The fixed daily period catalog. Every booking occupies exactly one of
//! these eight teaching periods; there are no arbitrary time ranges.

pub const PERIOD_MIN: i16 = 1;
pub const PERIOD_MAX: i16 = 8;

/// Period number to display label, in period order.
pub const PERIODS: [(i16, &str); 8] = [
    (1, "9:00 – 9:50"),
    (2, "9:50 – 10:40"),
    (3, "10:55 – 11:45"),
    (4, "11:45 – 12:35"),
    (5, "01:30 – 02:15"),
    (6, "02:15 – 03:00"),
    (7, "03:15 – 04:00"),
    (8, "04:00 – 04:45"),
];

pub fn is_valid_period(period: i64) -> bool {
    period >= PERIOD_MIN as i64 && period <= PERIOD_MAX as i64
}

pub fn period_label(period: i16) -> Option<&'static str> {
    PERIODS
        .iter()
        .find(|(number, _)| *number == period)
        .map(|(_, label)| *label)
}
