use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// The recognised query parameter families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamFamily {
    Filter,
    Sort,
    Group,
    Include,
    Fields,
    Page,
}

impl ParamFamily {
    pub const ALL: [ParamFamily; 6] = [
        ParamFamily::Filter,
        ParamFamily::Sort,
        ParamFamily::Group,
        ParamFamily::Include,
        ParamFamily::Fields,
        ParamFamily::Page,
    ];

    /// Parameter name prefix (`filter`, `sort`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ParamFamily::Filter => "filter",
            ParamFamily::Sort => "sort",
            ParamFamily::Group => "group",
            ParamFamily::Include => "include",
            ParamFamily::Fields => "fields",
            ParamFamily::Page => "page",
        }
    }

    /// Number of bracket dimensions the family's keys carry.
    #[must_use]
    pub fn dimensions(self) -> usize {
        match self {
            ParamFamily::Filter | ParamFamily::Sort => 2,
            ParamFamily::Group | ParamFamily::Include | ParamFamily::Fields | ParamFamily::Page => 1,
        }
    }

    pub(crate) fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|family| family.as_str() == name)
    }
}

impl fmt::Display for ParamFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value domain of `sort[..][..]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(()),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        })
    }
}

/// Fixed keys accepted inside `page[..]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationKey {
    Number,
    Size,
    Limit,
    Offset,
}

impl PaginationKey {
    pub const ALL: [PaginationKey; 4] = [
        PaginationKey::Number,
        PaginationKey::Size,
        PaginationKey::Limit,
        PaginationKey::Offset,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PaginationKey::Number => "number",
            PaginationKey::Size => "size",
            PaginationKey::Limit => "limit",
            PaginationKey::Offset => "offset",
        }
    }

    pub(crate) fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

impl fmt::Display for PaginationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An included relation from `include[..]`, e.g. `tasks` or `tasks.project`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Inclusion {
    path: String,
}

impl Inclusion {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// The raw relation path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Relation names along a dotted include path.
    #[must_use]
    pub fn path_list(&self) -> Vec<&str> {
        self.path.split('.').filter(|part| !part.is_empty()).collect()
    }
}

impl fmt::Display for Inclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// A reconstructed `name=value` pair in bracket notation, e.g.
/// `filter[projects][name]=projectX`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NameValuePair {
    name: String,
    value: String,
}

impl NameValuePair {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for NameValuePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Second level of a one-dimensional family: the set of values under `family[dim1]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OneDimensional<T: Ord>(pub(crate) BTreeSet<T>);

/// Second level of a two-dimensional multi-value family: `family[dim1][dim2]` → set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TwoDimensional<T: Ord>(pub(crate) BTreeMap<String, BTreeSet<T>>);

/// Second level of a two-dimensional single-value family: `family[dim1][dim2]` → value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TwoDimensionalSingle<T>(pub(crate) BTreeMap<String, T>);

impl<T: Ord> OneDimensional<T> {
    #[must_use]
    pub fn params(&self) -> &BTreeSet<T> {
        &self.0
    }
}

impl<T: Ord> TwoDimensional<T> {
    #[must_use]
    pub fn params(&self) -> &BTreeMap<String, BTreeSet<T>> {
        &self.0
    }
}

impl<T> TwoDimensionalSingle<T> {
    #[must_use]
    pub fn params(&self) -> &BTreeMap<String, T> {
        &self.0
    }
}

/// One parameter family keyed by its first dimension.
///
/// `V` selects the access shape; see [`OneDimParams`], [`TwoDimParams`] and
/// [`TwoDimSingleParams`]. A dimension key is present only if at least one
/// value was parsed for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypedParams<V> {
    #[serde(skip)]
    family: ParamFamily,
    #[serde(flatten)]
    params: BTreeMap<String, V>,
}

/// `group[..]`, `fields[..]`, `include[..]`
pub type OneDimParams<T> = TypedParams<OneDimensional<T>>;
/// `filter[..][..]`
pub type TwoDimParams<T> = TypedParams<TwoDimensional<T>>;
/// `sort[..][..]`
pub type TwoDimSingleParams<T> = TypedParams<TwoDimensionalSingle<T>>;

impl<V> TypedParams<V> {
    #[must_use]
    pub fn new(family: ParamFamily) -> Self {
        Self {
            family,
            params: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn family(&self) -> ParamFamily {
        self.family
    }

    /// First-dimension keys mapped to their second level.
    #[must_use]
    pub fn params(&self) -> &BTreeMap<String, V> {
        &self.params
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub(crate) fn entry(&mut self, dim1: &str, empty: impl FnOnce() -> V) -> &mut V {
        self.params.entry(dim1.to_string()).or_insert_with(empty)
    }

    pub(crate) fn second(&self, dim1: &str) -> Option<&V> {
        self.params.get(dim1)
    }
}

/// Raw query parameters: each key mapped to the set of values it was sent with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParams {
    params: BTreeMap<String, BTreeSet<String>>,
}

impl RawParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an `application/x-www-form-urlencoded` query string. Repeated keys
    /// accumulate into one set.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Add one value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.entry(key.into()).or_default().insert(value.into());
    }

    /// Replace every value for `key`.
    pub fn set<I, S>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params
            .insert(key.into(), values.into_iter().map(Into::into).collect());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.params.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut raw = RawParams::new();
        for (k, v) in iter {
            raw.insert(k, v);
        }
        raw
    }
}

impl From<BTreeMap<String, BTreeSet<String>>> for RawParams {
    fn from(params: BTreeMap<String, BTreeSet<String>>) -> Self {
        Self { params }
    }
}

impl From<HashMap<String, HashSet<String>>> for RawParams {
    fn from(params: HashMap<String, HashSet<String>>) -> Self {
        Self {
            params: params
                .into_iter()
                .map(|(k, v)| (k, v.into_iter().collect()))
                .collect(),
        }
    }
}

/// Encode pairs as a query string, e.g. for pagination links.
pub fn to_query_string<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = &'a NameValuePair>,
{
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for pair in pairs {
        serializer.append_pair(pair.name(), pair.value());
    }
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_params_from_query_accumulates() {
        let raw = RawParams::from_query("?filter%5Busers%5D%5Bname%5D=John&filter[users][name]=John%20John&page[size]=2");
        let names = raw.get("filter[users][name]").expect("filter key");
        assert_eq!(names.len(), 2);
        assert!(names.contains("John John"));
        assert_eq!(raw.len(), 2);
    }

    #[test]
    fn test_inclusion_path_list() {
        assert_eq!(Inclusion::new("tasks.project").path_list(), ["tasks", "project"]);
        assert_eq!(Inclusion::new("owner").path_list(), ["owner"]);
    }

    #[test]
    fn test_sort_direction_domain() {
        assert_eq!("asc".parse::<SortDirection>(), Ok(SortDirection::Asc));
        assert_eq!("desc".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert!("ASC".parse::<SortDirection>().is_err());
    }

    #[test]
    fn test_name_value_pair_display_and_query() {
        let pair = NameValuePair::new("filter[users][name]", "John John");
        assert_eq!(pair.to_string(), "filter[users][name]=John John");
        assert_eq!(
            to_query_string([&pair]),
            "filter%5Busers%5D%5Bname%5D=John+John"
        );
    }
}
