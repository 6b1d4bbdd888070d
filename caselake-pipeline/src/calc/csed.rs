//! Collection statute expiration date (CSED) with tolling

use crate::models::TollingEvent;
use chrono::{Duration, Months, NaiveDate};
use serde::Serialize;

/// Statutory collection period: ten years from the assessment date.
const STATUTE_MONTHS: u32 = 120;

/// Base-date policy when no return-filed transaction exists for the year.
///
/// The legacy system fell back to the evaluation date, which restarts an
/// unfiled year's statute clock on every run; `Unavailable` (the default)
/// declines to estimate instead, and `FallbackToToday` reproduces the legacy
/// behavior for comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum CsedFallback {
    #[default]
    Unavailable,
    FallbackToToday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CsedStatus {
    Active,
    ExpiringSoon,
    Expired,
}

/// One year's statute estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CsedEstimate {
    pub base_date: NaiveDate,
    /// Base date plus the ten-year statute, before tolling
    pub base_expiration: NaiveDate,
    pub tolling_days: i64,
    pub expiration_date: NaiveDate,
    pub status: CsedStatus,
}

/// Estimate the statute expiration for one case/year.
///
/// `return_filed` is the date of the return-filed transaction; without one
/// the fallback policy decides whether an estimate exists at all. Closed
/// tolling events contribute their recorded day counts; open events accrue
/// from their start to `today`.
pub fn csed_estimate(
    return_filed: Option<NaiveDate>,
    tolling: &[TollingEvent],
    today: NaiveDate,
    fallback: CsedFallback,
) -> Option<CsedEstimate> {
    let base_date = return_filed.or(match fallback {
        CsedFallback::FallbackToToday => Some(today),
        CsedFallback::Unavailable => None,
    })?;

    let base_expiration = base_date.checked_add_months(Months::new(STATUTE_MONTHS))?;

    let tolling_days: i64 = tolling
        .iter()
        .map(|event| {
            event
                .tolling_days
                .unwrap_or_else(|| (today - event.start_date).num_days().max(0))
        })
        .sum();

    let expiration_date = base_expiration.checked_add_signed(Duration::days(tolling_days))?;

    let status = if expiration_date < today {
        CsedStatus::Expired
    } else if expiration_date < today.checked_add_months(Months::new(12))? {
        CsedStatus::ExpiringSoon
    } else {
        CsedStatus::Active
    };

    Some(CsedEstimate {
        base_date,
        base_expiration,
        tolling_days,
        expiration_date,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(days: Option<i64>, start: NaiveDate) -> TollingEvent {
        TollingEvent {
            tax_year: 2014,
            category: "bankruptcy".to_string(),
            start_date: start,
            end_date: None,
            tolling_days: days,
        }
    }

    #[test]
    fn ten_years_from_filing_no_tolling() {
        let estimate = csed_estimate(
            Some(date(2015, 4, 15)),
            &[],
            date(2024, 1, 1),
            CsedFallback::Unavailable,
        )
        .unwrap();
        assert_eq!(estimate.base_expiration, date(2025, 4, 15));
        assert_eq!(estimate.expiration_date, date(2025, 4, 15));
        assert_eq!(estimate.tolling_days, 0);
    }

    #[test]
    fn expired_after_the_date_active_well_before() {
        let filed = Some(date(2015, 4, 15));
        let expired = csed_estimate(filed, &[], date(2025, 6, 1), CsedFallback::Unavailable);
        assert_eq!(expired.unwrap().status, CsedStatus::Expired);

        let active = csed_estimate(filed, &[], date(2020, 6, 1), CsedFallback::Unavailable);
        assert_eq!(active.unwrap().status, CsedStatus::Active);
    }

    #[test]
    fn expiring_soon_inside_one_year() {
        let estimate = csed_estimate(
            Some(date(2015, 4, 15)),
            &[],
            date(2024, 8, 1),
            CsedFallback::Unavailable,
        )
        .unwrap();
        assert_eq!(estimate.status, CsedStatus::ExpiringSoon);
    }

    #[test]
    fn closed_tolling_pushes_expiration_out() {
        let tolling = vec![event(Some(361), date(2018, 1, 10))];
        let estimate = csed_estimate(
            Some(date(2015, 4, 15)),
            &tolling,
            date(2024, 1, 1),
            CsedFallback::Unavailable,
        )
        .unwrap();
        assert_eq!(estimate.tolling_days, 361);
        assert_eq!(
            estimate.expiration_date,
            date(2025, 4, 15) + Duration::days(361)
        );
    }

    #[test]
    fn open_tolling_accrues_to_today() {
        let tolling = vec![event(None, date(2023, 12, 1))];
        let estimate = csed_estimate(
            Some(date(2015, 4, 15)),
            &tolling,
            date(2024, 1, 1),
            CsedFallback::Unavailable,
        )
        .unwrap();
        assert_eq!(estimate.tolling_days, 31);
    }

    #[test]
    fn unfiled_year_has_no_estimate_by_default() {
        assert!(csed_estimate(None, &[], date(2024, 1, 1), CsedFallback::Unavailable).is_none());
    }

    #[test]
    fn legacy_fallback_starts_the_clock_today() {
        let estimate =
            csed_estimate(None, &[], date(2024, 1, 1), CsedFallback::FallbackToToday).unwrap();
        assert_eq!(estimate.base_date, date(2024, 1, 1));
        assert_eq!(estimate.base_expiration, date(2034, 1, 1));
        assert_eq!(estimate.status, CsedStatus::Active);
    }
}
