//! Dashboard summaries over the cached orders and users.

use chrono::NaiveDate;

use tienda_core::Price;
use tienda_storefront::api::types::{Order, StoreUser};

use crate::error::AdminError;

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    /// Build a range.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` if `from` is after `to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, AdminError> {
        if from > to {
            return Err(AdminError::Validation(format!(
                "start date {from} is after end date {to}"
            )));
        }
        Ok(Self { from, to })
    }

    /// A range covering a single day.
    #[must_use]
    pub const fn day(day: NaiveDate) -> Self {
        Self { from: day, to: day }
    }

    #[must_use]
    pub const fn from(&self) -> NaiveDate {
        self.from
    }

    #[must_use]
    pub const fn to(&self) -> NaiveDate {
        self.to
    }

    /// Whether `day` falls inside the range, both ends included.
    #[must_use]
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.from <= day && day <= self.to
    }
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    /// Orders placed in the period.
    pub orders: usize,
    /// Sum of those orders' totals, cancelled orders included.
    pub revenue: Price,
    /// Registered users. Only reported for the default (today) view; the
    /// backend does not record when a user signed up.
    pub new_users: Option<usize>,
}

/// Summarize `orders` placed within `range`, or on `today` without one.
///
/// Orders whose date cannot be read are never counted.
#[must_use]
pub fn summarize(
    orders: &[Order],
    users: &[StoreUser],
    range: Option<DateRange>,
    today: NaiveDate,
) -> DashboardSummary {
    let period = range.unwrap_or_else(|| DateRange::day(today));
    let matched: Vec<&Order> = orders
        .iter()
        .filter(|o| o.placed_on().is_some_and(|d| period.contains(d)))
        .collect();

    DashboardSummary {
        orders: matched.len(),
        revenue: matched.iter().map(|o| o.total).sum(),
        new_users: range.is_none().then_some(users.len()),
    }
}

/// Orders recorded under a customer name.
#[must_use]
pub fn orders_for_customer<'a>(orders: &'a [Order], name: &str) -> Vec<&'a Order> {
    orders.iter().filter(|o| o.customer == name).collect()
}
