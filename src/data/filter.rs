use std::num::ParseFloatError;

use chrono::NaiveDate;
use thiserror::Error;

use super::database::LinkedApproach;
use super::model::{TimestampError, parse_timestamp};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A query criterion that could not be turned into a filter.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid {criterion} '{value}': expected YYYY-Mon-DD HH:MM")]
    InvalidDate {
        criterion: &'static str,
        value: String,
        #[source]
        source: TimestampError,
    },

    #[error("invalid {criterion} '{value}': not a number")]
    InvalidNumber {
        criterion: &'static str,
        value: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("invalid {criterion} '{value}': must be a finite number")]
    NonFiniteNumber { criterion: &'static str, value: String },
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// How a filter compares an attribute against its operand. Bounds are
/// inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound<T> {
    Exactly(T),
    AtLeast(T),
    AtMost(T),
}

impl<T: PartialOrd> Bound<T> {
    /// NaN attributes never satisfy a numeric bound.
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Bound::Exactly(v) => value == v,
            Bound::AtLeast(v) => value >= v,
            Bound::AtMost(v) => value <= v,
        }
    }
}

/// A single predicate over one attribute of a close approach, or of the
/// object it is linked to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Filter {
    /// Calendar date of the approach time.
    Date(Bound<NaiveDate>),
    /// Approach distance in au.
    Distance(Bound<f64>),
    /// Relative velocity in km/s.
    Velocity(Bound<f64>),
    /// Diameter of the linked object in km.
    Diameter(Bound<f64>),
    /// Hazard flag of the linked object.
    Hazardous(bool),
}

impl Filter {
    pub fn matches(&self, approach: &LinkedApproach<'_>) -> bool {
        match self {
            Filter::Date(bound) => bound.admits(&approach.approach.time.date()),
            Filter::Distance(bound) => bound.admits(&approach.approach.distance),
            Filter::Velocity(bound) => bound.admits(&approach.approach.velocity),
            Filter::Diameter(bound) => bound.admits(&approach.neo.diameter),
            Filter::Hazardous(flag) => approach.neo.hazardous == *flag,
        }
    }

    /// Whether the predicate reads through the linked object.
    pub fn is_linked(&self) -> bool {
        matches!(self, Filter::Diameter(_) | Filter::Hazardous(_))
    }
}

// ---------------------------------------------------------------------------
// Criteria → filters
// ---------------------------------------------------------------------------

/// User-facing query criteria. Every field is optional; an absent criterion
/// produces no filter at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub distance_min: Option<String>,
    pub distance_max: Option<String>,
    pub velocity_min: Option<String>,
    pub velocity_max: Option<String>,
    pub diameter_min: Option<String>,
    pub diameter_max: Option<String>,
    /// `Some(false)` selects non-hazardous objects; `None` applies no filter.
    pub hazardous: Option<bool>,
}

/// Build one filter per present criterion.
///
/// Date criteria must match `YYYY-Mon-DD HH:MM` exactly; only the date part
/// takes part in comparisons. Scalar filters are placed before those that
/// read the linked object.
pub fn build_filters(criteria: &Criteria) -> Result<Vec<Filter>, FilterError> {
    let mut filters = Vec::new();

    let dates: [(&'static str, &Option<String>, fn(NaiveDate) -> Bound<NaiveDate>); 3] = [
        ("date", &criteria.date, Bound::Exactly),
        ("start_date", &criteria.start_date, Bound::AtLeast),
        ("end_date", &criteria.end_date, Bound::AtMost),
    ];
    for (criterion, value, bound) in dates {
        if let Some(value) = value {
            filters.push(Filter::Date(bound(parse_date(criterion, value)?)));
        }
    }

    let numbers: [(&'static str, &Option<String>, fn(Bound<f64>) -> Filter, bool); 6] = [
        ("distance_min", &criteria.distance_min, Filter::Distance, true),
        ("distance_max", &criteria.distance_max, Filter::Distance, false),
        ("velocity_min", &criteria.velocity_min, Filter::Velocity, true),
        ("velocity_max", &criteria.velocity_max, Filter::Velocity, false),
        ("diameter_min", &criteria.diameter_min, Filter::Diameter, true),
        ("diameter_max", &criteria.diameter_max, Filter::Diameter, false),
    ];
    for (criterion, value, filter, is_min) in numbers {
        if let Some(value) = value {
            let v = parse_number(criterion, value)?;
            filters.push(filter(if is_min { Bound::AtLeast(v) } else { Bound::AtMost(v) }));
        }
    }

    if let Some(flag) = criteria.hazardous {
        filters.push(Filter::Hazardous(flag));
    }

    // Stable: keeps criterion order within each group.
    filters.sort_by_key(Filter::is_linked);
    log::debug!("built {} filters: {filters:?}", filters.len());
    Ok(filters)
}

fn parse_date(criterion: &'static str, value: &str) -> Result<NaiveDate, FilterError> {
    parse_timestamp(value)
        .map(|t| t.date())
        .map_err(|source| FilterError::InvalidDate {
            criterion,
            value: value.to_string(),
            source,
        })
}

fn parse_number(criterion: &'static str, value: &str) -> Result<f64, FilterError> {
    let v = value
        .trim()
        .parse::<f64>()
        .map_err(|source| FilterError::InvalidNumber {
            criterion,
            value: value.to_string(),
            source,
        })?;
    if !v.is_finite() {
        return Err(FilterError::NonFiniteNumber {
            criterion,
            value: value.to_string(),
        });
    }
    Ok(v)
}

// ---------------------------------------------------------------------------
// Result limiting
// ---------------------------------------------------------------------------

/// Yield at most `n` items from the front of `iter`. `None` or `Some(0)`
/// leaves the sequence unlimited. Nothing past the limit is pulled upstream.
pub fn limit<I: Iterator>(iter: I, n: Option<usize>) -> std::iter::Take<I> {
    let n = match n {
        None | Some(0) => usize::MAX,
        Some(n) => n,
    };
    iter.take(n)
}
