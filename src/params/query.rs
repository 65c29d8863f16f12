use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use serde::Serialize;

use super::core::{
    Inclusion, NameValuePair, OneDimParams, OneDimensional, PaginationKey, ParamFamily,
    SortDirection, TwoDimParams, TwoDimSingleParams, TwoDimensional, TwoDimensionalSingle,
};

/// Values found at one key of a parameter family.
///
/// Lookups never fail: a missing key yields an empty set.
#[derive(Debug)]
pub struct ValueSet<'a, T> {
    values: Values<'a, T>,
}

#[derive(Debug)]
enum Values<'a, T> {
    Empty,
    Single(&'a T),
    Many(&'a BTreeSet<T>),
}

impl<T> Clone for ValueSet<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ValueSet<'_, T> {}

impl<T> Clone for Values<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Values<'_, T> {}

impl<'a, T> ValueSet<'a, T> {
    fn empty() -> Self {
        Self {
            values: Values::Empty,
        }
    }

    fn single(value: Option<&'a T>) -> Self {
        Self {
            values: value.map_or(Values::Empty, Values::Single),
        }
    }

    fn many(values: Option<&'a BTreeSet<T>>) -> Self {
        Self {
            values: values.map_or(Values::Empty, Values::Many),
        }
    }

    /// The first value in the family's ordering, if any.
    #[must_use]
    pub fn one(&self) -> Option<&'a T> {
        match self.values {
            Values::Empty => None,
            Values::Single(value) => Some(value),
            Values::Many(set) => set.iter().next(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a T> {
        let (single, many) = match self.values {
            Values::Empty => (None, None),
            Values::Single(value) => (Some(value), None),
            Values::Many(set) => (None, Some(set)),
        };
        single.into_iter().chain(many.into_iter().flatten())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self.values {
            Values::Empty => 0,
            Values::Single(_) => 1,
            Values::Many(set) => set.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Ord + Clone> ValueSet<'_, T> {
    /// Every value, owned.
    #[must_use]
    pub fn all(&self) -> BTreeSet<T> {
        self.iter().cloned().collect()
    }
}

fn bracket_name(family: ParamFamily, dims: &[&str]) -> String {
    let mut name = String::from(family.as_str());
    for dim in dims {
        name.push('[');
        name.push_str(dim);
        name.push(']');
    }
    name
}

impl<T: Ord> OneDimParams<T> {
    pub(crate) fn insert(&mut self, dim1: &str, value: T) {
        self.entry(dim1, || OneDimensional(BTreeSet::new()))
            .0
            .insert(value);
    }

    /// Values under `family[dim1]`.
    #[must_use]
    pub fn get(&self, dim1: &str) -> ValueSet<'_, T> {
        ValueSet::many(self.second(dim1).map(OneDimensional::params))
    }
}

impl<T: Ord + Display> OneDimParams<T> {
    /// Every value as a `family[dim1]=value` pair.
    #[must_use]
    pub fn all(&self) -> BTreeSet<NameValuePair> {
        self.params()
            .iter()
            .flat_map(|(dim1, values)| {
                let name = bracket_name(self.family(), &[dim1.as_str()]);
                values
                    .params()
                    .iter()
                    .map(move |value| NameValuePair::new(name.clone(), value.to_string()))
            })
            .collect()
    }
}

impl<T: Ord> TwoDimParams<T> {
    pub(crate) fn insert(&mut self, dim1: &str, dim2: &str, value: T) {
        self.entry(dim1, || TwoDimensional(BTreeMap::new()))
            .0
            .entry(dim2.to_string())
            .or_default()
            .insert(value);
    }

    /// Values under `family[dim1][dim2]`.
    #[must_use]
    pub fn get(&self, dim1: &str, dim2: &str) -> ValueSet<'_, T> {
        match self.second(dim1) {
            Some(second) => ValueSet::many(second.params().get(dim2)),
            None => ValueSet::empty(),
        }
    }
}

impl<T: Ord + Display> TwoDimParams<T> {
    /// Every value as a `family[dim1][dim2]=value` pair.
    #[must_use]
    pub fn all(&self) -> BTreeSet<NameValuePair> {
        let mut pairs = BTreeSet::new();
        for (dim1, second) in self.params() {
            for (dim2, values) in second.params() {
                let name = bracket_name(self.family(), &[dim1.as_str(), dim2.as_str()]);
                pairs.extend(
                    values
                        .iter()
                        .map(|value| NameValuePair::new(name.clone(), value.to_string())),
                );
            }
        }
        pairs
    }
}

impl<T> TwoDimSingleParams<T> {
    pub(crate) fn set(&mut self, dim1: &str, dim2: &str, value: T) {
        self.entry(dim1, || TwoDimensionalSingle(BTreeMap::new()))
            .0
            .insert(dim2.to_string(), value);
    }

    /// The value under `family[dim1][dim2]`.
    #[must_use]
    pub fn get(&self, dim1: &str, dim2: &str) -> ValueSet<'_, T> {
        ValueSet::single(self.second(dim1).and_then(|second| second.params().get(dim2)))
    }
}

impl<T: Display> TwoDimSingleParams<T> {
    /// Every value as a `family[dim1][dim2]=value` pair.
    #[must_use]
    pub fn all(&self) -> BTreeSet<NameValuePair> {
        self.params()
            .iter()
            .flat_map(|(dim1, second)| {
                second.params().iter().map(move |(dim2, value)| {
                    NameValuePair::new(
                        bracket_name(self.family(), &[dim1.as_str(), dim2.as_str()]),
                        value.to_string(),
                    )
                })
            })
            .collect()
    }
}

/// `page[..]` values keyed by [`PaginationKey`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PageParams {
    values: BTreeMap<PaginationKey, i64>,
}

impl PageParams {
    pub(crate) fn set(&mut self, key: PaginationKey, value: i64) {
        self.values.insert(key, value);
    }

    #[must_use]
    pub fn get(&self, key: PaginationKey) -> Option<i64> {
        self.values.get(&key).copied()
    }

    #[must_use]
    pub fn number(&self) -> Option<i64> {
        self.get(PaginationKey::Number)
    }

    #[must_use]
    pub fn size(&self) -> Option<i64> {
        self.get(PaginationKey::Size)
    }

    #[must_use]
    pub fn limit(&self) -> Option<i64> {
        self.get(PaginationKey::Limit)
    }

    #[must_use]
    pub fn offset(&self) -> Option<i64> {
        self.get(PaginationKey::Offset)
    }

    #[must_use]
    pub fn params(&self) -> &BTreeMap<PaginationKey, i64> {
        &self.values
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Every value as a `page[key]=value` pair.
    #[must_use]
    pub fn all(&self) -> BTreeSet<NameValuePair> {
        self.values
            .iter()
            .map(|(key, value)| {
                NameValuePair::new(bracket_name(ParamFamily::Page, &[key.as_str()]), value.to_string())
            })
            .collect()
    }
}

/// Typed query parameters of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryParams {
    filters: TwoDimParams<String>,
    sorting: TwoDimSingleParams<SortDirection>,
    grouping: OneDimParams<String>,
    included_fields: OneDimParams<String>,
    included_relations: OneDimParams<Inclusion>,
    pagination: PageParams,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            filters: TwoDimParams::new(ParamFamily::Filter),
            sorting: TwoDimSingleParams::new(ParamFamily::Sort),
            grouping: OneDimParams::new(ParamFamily::Group),
            included_fields: OneDimParams::new(ParamFamily::Fields),
            included_relations: OneDimParams::new(ParamFamily::Include),
            pagination: PageParams::default(),
        }
    }
}

impl QueryParams {
    /// `filter[type][attribute]`
    #[must_use]
    pub fn filters(&self) -> &TwoDimParams<String> {
        &self.filters
    }

    /// `sort[type][attribute]`
    #[must_use]
    pub fn sortings(&self) -> &TwoDimSingleParams<SortDirection> {
        &self.sorting
    }

    /// `group[type]`
    #[must_use]
    pub fn grouping(&self) -> &OneDimParams<String> {
        &self.grouping
    }

    /// `fields[type]`
    #[must_use]
    pub fn included_fields(&self) -> &OneDimParams<String> {
        &self.included_fields
    }

    /// `include[type]`
    #[must_use]
    pub fn included_relations(&self) -> &OneDimParams<Inclusion> {
        &self.included_relations
    }

    /// `page[key]`
    #[must_use]
    pub fn page(&self) -> &PageParams {
        &self.pagination
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
            && self.sorting.is_empty()
            && self.grouping.is_empty()
            && self.included_fields.is_empty()
            && self.included_relations.is_empty()
            && self.pagination.is_empty()
    }

    /// Every parsed parameter as bracket-notation pairs.
    #[must_use]
    pub fn all(&self) -> BTreeSet<NameValuePair> {
        let mut pairs = self.filters.all();
        pairs.extend(self.sorting.all());
        pairs.extend(self.grouping.all());
        pairs.extend(self.included_fields.all());
        pairs.extend(self.included_relations.all());
        pairs.extend(self.pagination.all());
        pairs
    }

    pub(crate) fn filters_mut(&mut self) -> &mut TwoDimParams<String> {
        &mut self.filters
    }

    pub(crate) fn sorting_mut(&mut self) -> &mut TwoDimSingleParams<SortDirection> {
        &mut self.sorting
    }

    pub(crate) fn grouping_mut(&mut self) -> &mut OneDimParams<String> {
        &mut self.grouping
    }

    pub(crate) fn included_fields_mut(&mut self) -> &mut OneDimParams<String> {
        &mut self.included_fields
    }

    pub(crate) fn included_relations_mut(&mut self) -> &mut OneDimParams<Inclusion> {
        &mut self.included_relations
    }

    pub(crate) fn pagination_mut(&mut self) -> &mut PageParams {
        &mut self.pagination
    }
}
