use chrono::NaiveDate;

use super::enums::PrescriptionStatus;

/// Query against a record source.
///
/// `start`/`end` only take effect when both are present; they then select
/// prescriptions whose active window overlaps `[start, end]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrescriptionFilter {
    pub patient_id: Option<i64>,
    pub status: Option<PrescriptionStatus>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl PrescriptionFilter {
    pub fn for_patient(patient_id: i64) -> Self {
        Self {
            patient_id: Some(patient_id),
            ..Self::default()
        }
    }

    /// The overlap window, if both bounds were supplied.
    pub fn window(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn window_requires_both_bounds() {
        let mut filter = PrescriptionFilter::for_patient(1);
        assert!(filter.window().is_none());

        filter.start = Some(date("2026-01-01"));
        assert!(filter.window().is_none());

        filter.end = Some(date("2026-01-31"));
        assert_eq!(filter.window(), Some((date("2026-01-01"), date("2026-01-31"))));
    }
}
