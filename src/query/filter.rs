//! # Search and Filtering Primitives
//!
//! The filtering logic is built from three concepts:
//!
//! -   _Operation_ ([`Op`]): the logical predicate.
//!     An [`Op`] defines *how* to compare data. It represents specific conditions like equality
//!     (`Eq`), ranges (`Between`), set membership (`In`), or existence (`Ex`).
//!
//! -   _Text query_ ([`super::TextQuery`]): a diacritic-insensitive substring search
//!     across the descriptive fields of a business.
//!
//! -   _Filter_ ([`BusinessFilter`]): the composite query.
//!     Every criterion is optional; a business matches when it satisfies all of the
//!     supplied ones.

use super::{TextQuery, fold};
use crate::types::BusinessView;

/// Floating point value type alias
pub type Float = f64;
/// Integer value type alias
pub type Integer = i64;
/// Literal type alias
pub type Text = String;

#[derive(Debug, thiserror::Error)]
pub enum OpError {
    /// Occurs when a field expects a specific type (e.g., String) but receives another (e.g., Numeric).
    #[error("wrong type")]
    WrongType,

    /// Unsupported operation
    #[error("unsupported operation")]
    UnsupportedOperation,

    /// Occurs when constructing a [`Range`] where `min > max`.
    #[error("empty range")]
    EmptyRange,
}

/// A trait that indicates which [`Op`]s are supported by an implementing type.
///
/// Each method corresponds to a capability check for a particular
/// operation. By default, all operations are unsupported (`false`).
///
/// These checks are performed at **runtime**.
pub trait IsSupportedOp {
    fn support_eq(&self) -> bool {
        false
    }
    fn support_ordering(&self) -> bool {
        false
    }
    fn support_in(&self) -> bool {
        false
    }
    fn support_match(&self) -> bool {
        false
    }

    /// Evaluates a [`Op::Match`] against `pattern`.
    fn matches_pattern(&self, _pattern: &Self) -> bool {
        false
    }
}

impl IsSupportedOp for bool {
    fn support_eq(&self) -> bool {
        true
    }
}

impl IsSupportedOp for Integer {
    fn support_eq(&self) -> bool {
        true
    }

    fn support_ordering(&self) -> bool {
        true
    }

    fn support_in(&self) -> bool {
        true
    }
}

impl IsSupportedOp for Float {
    fn support_ordering(&self) -> bool {
        true
    }
}

impl IsSupportedOp for Text {
    fn support_eq(&self) -> bool {
        true
    }

    fn support_in(&self) -> bool {
        true
    }

    fn support_match(&self) -> bool {
        true
    }

    fn matches_pattern(&self, pattern: &Self) -> bool {
        fold(self).contains(&fold(pattern))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

impl<T> Range<T>
where
    T: PartialOrd,
{
    pub fn try_new(min: T, max: T) -> Result<Self, OpError> {
        if min > max {
            return Err(OpError::EmptyRange);
        }
        Ok(Self { min, max })
    }
}

/// Represents the logical operator to apply to a field for filtering.
#[derive(Debug, Clone, PartialEq)]
pub enum Op<T> {
    /// Equal
    Eq(T),
    /// Not equal
    Neq(T),
    /// Less than or equal
    Leq(T),
    /// Greater then or equal
    Geq(T),
    /// Lower then
    Lt(T),
    /// Greater then
    Gt(T),
    /// Exists
    Ex,
    /// Not exists
    Nex,
    /// In between a two value range [a, b] with a <= b
    Between(Range<T>),
    /// Found in a set
    In(Vec<T>),
    /// Diacritic-insensitive substring match
    Match(T),
}

impl<T> Op<T>
where
    T: IsSupportedOp + PartialOrd,
{
    pub fn is_supported_op(&self) -> bool {
        match self {
            Self::Eq(v) => v.support_eq(),
            Op::Neq(v) => v.support_eq(),
            Op::Leq(v) => v.support_ordering(),
            Op::Geq(v) => v.support_ordering(),
            Op::Lt(v) => v.support_ordering(),
            Op::Gt(v) => v.support_ordering(),
            Op::Ex => true,
            Op::Nex => true,
            Op::Between(range) => range.min.support_ordering(),
            Op::In(items) => items.iter().all(|v| v.support_in()),
            Op::Match(v) => v.support_match(),
        }
    }

    /// Evaluates the operation on a possibly missing field value.
    ///
    /// A missing value only satisfies [`Op::Nex`].
    pub fn eval(&self, value: Option<&T>) -> bool {
        let Some(v) = value else {
            return matches!(self, Op::Nex);
        };

        match self {
            Op::Eq(x) => v == x,
            Op::Neq(x) => v != x,
            Op::Leq(x) => v <= x,
            Op::Geq(x) => v >= x,
            Op::Lt(x) => v < x,
            Op::Gt(x) => v > x,
            Op::Ex => true,
            Op::Nex => false,
            Op::Between(range) => &range.min <= v && v <= &range.max,
            Op::In(items) => items.contains(v),
            Op::Match(p) => v.matches_pattern(p),
        }
    }
}

/// The complete search query applied to joined business views.
///
/// All fields are optional; [`None`] implies no filtering on that field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BusinessFilter {
    /// Searched in name, category, region, location and amenities
    pub text: Option<TextQuery>,
    pub category: Option<Op<Text>>,
    pub region: Option<Op<Text>>,
    pub price_tier: Option<Op<Integer>>,
    pub rating: Option<Op<Float>>,
    pub featured: Option<bool>,
    /// Every listed amenity must be present (exact label)
    pub amenities: Option<Vec<String>>,
}

impl BusinessFilter {
    /// Returns true if there are no filters applied
    pub fn is_empty(&self) -> bool {
        self.text.as_ref().is_none_or(TextQuery::is_empty)
            && self.category.is_none()
            && self.region.is_none()
            && self.price_tier.is_none()
            && self.rating.is_none()
            && self.featured.is_none()
            && self.amenities.is_none()
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(TextQuery::new(text));
        self
    }

    pub fn with_category(mut self, op: Op<Text>) -> Self {
        self.category = Some(op);
        self
    }

    pub fn with_region(mut self, op: Op<Text>) -> Self {
        self.region = Some(op);
        self
    }

    pub fn matches(&self, view: &BusinessView) -> bool {
        let b = &view.business;

        if let Some(text) = &self.text
            && !text.matches_any(view.text_fields())
        {
            return false;
        }
        if let Some(op) = &self.category
            && !op.eval(b.category.as_ref())
        {
            return false;
        }
        if let Some(op) = &self.region
            && !op.eval(b.region.as_ref())
        {
            return false;
        }
        if let Some(op) = &self.price_tier
            && !op.eval(b.price_tier.map(Integer::from).as_ref())
        {
            return false;
        }
        if let Some(op) = &self.rating
            && !op.eval(b.rating.as_ref())
        {
            return false;
        }
        if let Some(featured) = self.featured
            && b.featured != featured
        {
            return false;
        }
        if let Some(required) = &self.amenities
            && !required.iter().all(|a| view.amenities.contains(a))
        {
            return false;
        }
        true
    }

    /// Keeps the views matching the filter, preserving their order.
    pub fn apply(&self, views: Vec<BusinessView>) -> Vec<BusinessView> {
        if self.is_empty() {
            return views;
        }
        views.into_iter().filter(|v| self.matches(v)).collect()
    }
}
