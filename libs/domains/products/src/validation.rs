//! The `sort` rule for product listings.
//!
//! Only the columns in [`SortColumn`] may be sorted on. A leading `-` asks for
//! descending order and is stripped before the column is checked, so `-price`
//! is accepted and `-secret` is rejected with the offending value in the
//! message.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::str::FromStr;

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use validator::ValidationError;

use crate::models::Product;

pub const DESCENDING_PREFIX: char = '-';

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum SortColumn {
    Name,
    Brand,
    Price,
    Stock,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Order two products by this spec. Equal keys compare equal so a stable
    /// sort keeps the incoming order.
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let ordering = match self.column {
            SortColumn::Name => a.name.cmp(&b.name),
            SortColumn::Brand => a.brand.cmp(&b.brand),
            SortColumn::Price => a.price.total_cmp(&b.price),
            SortColumn::Stock => a.stock.cmp(&b.stock),
        };

        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortSpec {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (direction, column) = match value.strip_prefix(DESCENDING_PREFIX) {
            Some(rest) => (SortDirection::Desc, rest),
            None => (SortDirection::Asc, value),
        };

        column
            .parse::<SortColumn>()
            .map(|column| Self::new(column, direction))
            .map_err(|_| invalid_sort(value))
    }
}

fn invalid_sort(value: &str) -> ValidationError {
    let allowed: Vec<String> = SortColumn::iter().map(|c| c.to_string()).collect();

    let mut error = ValidationError::new("sortable").with_message(Cow::Owned(format!(
        "The sort field must be one of {}, optionally prefixed with '{}'; got '{}'.",
        allowed.join(", "),
        DESCENDING_PREFIX,
        value
    )));
    error.add_param(Cow::Borrowed("value"), &value);
    error
}

/// `validator` hook for `#[validate(custom(function = "validate_sortable"))]`.
pub fn validate_sortable(value: &str) -> Result<(), ValidationError> {
    value.parse::<SortSpec>().map(|_| ())
}

/// Rejects `NaN` and the infinities, which `range` rules let through.
pub fn validate_finite(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("numeric"))
    }
}
