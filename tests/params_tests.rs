//! Integration tests for bracket-notation query parameters
//!
//! # Test Coverage
//!
//! - Multi-value accumulation for `filter`
//! - Single-value collapse and direction validation for `sort`
//! - Typed pagination accessors
//! - Null-safe lookups on families that were never supplied
//! - Canonical `name=value` reconstruction and re-encoding

use std::collections::{BTreeSet, HashMap, HashSet};

use jsonapi_router::error::JsonApiError;
use jsonapi_router::params::{
    parse_query_params, to_query_string, Inclusion, NameValuePair, PaginationKey, QueryParams,
    RawParams, SortDirection,
};

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn parse_query(query: &str) -> QueryParams {
    parse_query_params(&RawParams::from_query(query)).unwrap()
}

#[test]
fn test_filter_values_merge_across_occurrences() {
    let mut raw = RawParams::new();
    raw.set("filter[users][name]", ["John"]);
    raw.insert("filter[users][name]", "John");
    raw.insert("filter[users][name]", "John John");
    let params = parse_query_params(&raw).unwrap();

    assert_eq!(params.filters().get("users", "name").all(), set(&["John", "John John"]));

    let all = params.filters().all();
    assert!(all.contains(&NameValuePair::new("filter[users][name]", "John")));
    assert!(all.contains(&NameValuePair::new("filter[users][name]", "John John")));
    assert_eq!(all.len(), 2);
}

#[test]
fn test_sort_multiplicity_collapses() {
    let mut raw = RawParams::new();
    raw.set("sort[projects][name]", ["asc", "desc"]);
    let params = parse_query_params(&raw).unwrap();

    assert_eq!(params.sortings().all().len(), 1);
    assert_eq!(params.sortings().get("projects", "name").len(), 1);
    assert_eq!(params.sortings().get("projects", "name").one(), Some(&SortDirection::Asc));
}

#[test]
fn test_sort_tie_break_is_independent_of_insertion_order() {
    let forward: RawParams = [("sort[tasks][name]", "desc"), ("sort[tasks][name]", "asc")]
        .into_iter()
        .collect();
    let backward: RawParams = [("sort[tasks][name]", "asc"), ("sort[tasks][name]", "desc")]
        .into_iter()
        .collect();
    assert_eq!(
        parse_query_params(&forward).unwrap().sortings().all(),
        parse_query_params(&backward).unwrap().sortings().all()
    );
}

#[test]
fn test_invalid_sort_direction() {
    let raw = RawParams::from_query("sort[tasks][name]=ASC");
    let err = parse_query_params(&raw).unwrap_err();
    assert!(matches!(
        &err,
        JsonApiError::InvalidSortDirection { key, value } if key == "sort[tasks][name]" && value == "ASC"
    ));
    assert_eq!(err.http_status(), 400);
}

#[test]
fn test_page_absent() {
    let params = parse_query("filter[tasks][done]=true");
    let page = params.page();
    assert_eq!(page.number(), None);
    assert_eq!(page.size(), None);
    assert_eq!(page.limit(), None);
    assert_eq!(page.offset(), None);
    assert!(page.all().is_empty());
}

#[test]
fn test_page_all_keys() {
    let params = parse_query("page[size]=12&page[number]=11&page[offset]=3&page[limit]=8");
    let page = params.page();
    assert_eq!(page.size(), Some(12));
    assert_eq!(page.number(), Some(11));
    assert_eq!(page.offset(), Some(3));
    assert_eq!(page.limit(), Some(8));
    assert_eq!(page.get(PaginationKey::Limit), Some(8));
    assert_eq!(page.all().len(), 4);
    assert!(page.all().contains(&NameValuePair::new("page[size]", "12")));
}

#[test]
fn test_invalid_page_value() {
    let err = parse_query_params(&RawParams::from_query("page[number]=two")).unwrap_err();
    assert!(matches!(err, JsonApiError::InvalidPageValue { .. }));
}

#[test]
fn test_absent_families_are_empty() {
    let params = parse_query("");
    assert!(params.is_empty());
    assert!(params.filters().get("tasks", "name").is_empty());
    assert!(params.filters().get("tasks", "name").one().is_none());
    assert!(params.sortings().get("tasks", "name").all().is_empty());
    assert!(params.grouping().get("tasks").is_empty());
    assert!(params.included_fields().get("tasks").all().is_empty());
    assert!(params.included_relations().get("tasks").one().is_none());
    assert!(params.all().is_empty());
}

#[test]
fn test_include_values_are_inclusions() {
    let params = parse_query("include[tasks]=project.owner&include[tasks]=assignee");
    let includes = params.included_relations().get("tasks").all();
    assert!(includes.contains(&Inclusion::new("assignee")));
    let nested = includes
        .iter()
        .find(|inc| inc.path() == "project.owner")
        .unwrap();
    assert_eq!(nested.path_list(), ["project", "owner"]);
}

#[test]
fn test_unknown_keys_are_not_errors() {
    let params = parse_query("filter=x&foo[bar]=1&sort[tasks]=asc&page[cursor]=abc&fields[tasks]=name");
    assert_eq!(params.all().len(), 1);
    assert_eq!(params.included_fields().get("tasks").one().map(String::as_str), Some("name"));
}

#[test]
fn test_from_hash_map() {
    let mut raw: HashMap<String, HashSet<String>> = HashMap::new();
    raw.entry("group[tasks]".to_string())
        .or_default()
        .extend(["done".to_string(), "name".to_string()]);
    let params = parse_query_params(&RawParams::from(raw)).unwrap();
    assert_eq!(params.grouping().get("tasks").all(), set(&["done", "name"]));
}

#[test]
fn test_reencoded_pairs_parse_to_same_params() {
    let params = parse_query(
        "filter[tasks][name]=a%20b&sort[tasks][name]=desc&include[tasks]=project&page[size]=5&group[tasks]=done",
    );
    let query = to_query_string(&params.all());
    assert_eq!(parse_query(&query), params);
}
