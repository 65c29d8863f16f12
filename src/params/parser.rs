use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;
use tracing::debug;

use super::core::{Inclusion, PaginationKey, ParamFamily, RawParams, SortDirection};
use super::query::QueryParams;
use crate::error::JsonApiError;

/// `family[dim]` or `family[dim1][dim2]`; bracket contents may not be empty or
/// contain brackets.
static KEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<family>[a-z]+)(?P<dims>(?:\[[^\[\]]+\])+)$")
        .expect("Failed to compile query key regex")
});

static DIM_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\[\]]+)\]").expect("Failed to compile query dimension regex"));

/// A raw key split into its family and bracket dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey<'a> {
    pub family: ParamFamily,
    pub dims: SmallVec<[&'a str; 2]>,
}

/// Split a raw key into family and dimensions.
///
/// Returns `None` for keys outside the recognised families, or whose number of
/// dimensions does not match the family (`filter[tasks]`, `include[a][b]`).
#[must_use]
pub fn parse_key(key: &str) -> Option<ParsedKey<'_>> {
    let caps = KEY_PATTERN.captures(key)?;
    let family = ParamFamily::parse(caps.name("family")?.as_str())?;
    let dims_match = caps.name("dims")?;
    let dims: SmallVec<[&str; 2]> = DIM_PATTERN
        .captures_iter(dims_match.as_str())
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    if dims.len() != family.dimensions() {
        return None;
    }
    Some(ParsedKey { family, dims })
}

/// Parse raw key/value-set pairs into typed [`QueryParams`].
///
/// Keys are processed in order; unrecognised keys are skipped. For the
/// single-value families (`sort`, `page`) every raw value is validated and the
/// smallest one in lexicographic order is kept.
///
/// # Errors
///
/// - [`JsonApiError::InvalidSortDirection`] when a `sort` value is not exactly
///   `asc` or `desc`
/// - [`JsonApiError::InvalidPageValue`] when a `page` value for a recognised
///   pagination key is not an integer
pub fn parse_query_params(raw: &RawParams) -> Result<QueryParams, JsonApiError> {
    let mut params = QueryParams::default();
    let mut ignored = 0usize;

    for (key, values) in raw.iter() {
        let Some(parsed) = parse_key(key) else {
            debug!(key = %key, "Query parameter ignored");
            ignored += 1;
            continue;
        };
        let dims = &parsed.dims;

        match parsed.family {
            ParamFamily::Filter => {
                for value in values {
                    params.filters_mut().insert(dims[0], dims[1], value.clone());
                }
            }
            ParamFamily::Sort => {
                if let Some(direction) = parse_sort(key, values)? {
                    params.sorting_mut().set(dims[0], dims[1], direction);
                }
            }
            ParamFamily::Group => {
                for value in values {
                    params.grouping_mut().insert(dims[0], value.clone());
                }
            }
            ParamFamily::Fields => {
                for value in values {
                    params.included_fields_mut().insert(dims[0], value.clone());
                }
            }
            ParamFamily::Include => {
                for value in values {
                    params
                        .included_relations_mut()
                        .insert(dims[0], Inclusion::new(value.clone()));
                }
            }
            ParamFamily::Page => {
                let Some(page_key) = PaginationKey::parse(dims[0]) else {
                    debug!(key = %key, "Unknown pagination key ignored");
                    ignored += 1;
                    continue;
                };
                if let Some(value) = parse_page(key, values)? {
                    params.pagination_mut().set(page_key, value);
                }
            }
        }
    }

    debug!(
        raw_keys = raw.len(),
        ignored,
        filters = params.filters().params().len(),
        sorting = params.sortings().params().len(),
        includes = params.included_relations().params().len(),
        paginated = !params.page().is_empty(),
        "Query parameters parsed"
    );
    Ok(params)
}

fn parse_sort(key: &str, values: &BTreeSet<String>) -> Result<Option<SortDirection>, JsonApiError> {
    let mut chosen = None;
    for value in values {
        let direction = value
            .parse::<SortDirection>()
            .map_err(|()| JsonApiError::InvalidSortDirection {
                key: key.to_string(),
                value: value.clone(),
            })?;
        chosen.get_or_insert(direction);
    }
    Ok(chosen)
}

fn parse_page(key: &str, values: &BTreeSet<String>) -> Result<Option<i64>, JsonApiError> {
    let mut chosen = None;
    for value in values {
        let number = value
            .trim()
            .parse::<i64>()
            .map_err(|_| JsonApiError::InvalidPageValue {
                key: key.to_string(),
                value: value.clone(),
            })?;
        chosen.get_or_insert(number);
    }
    Ok(chosen)
}
