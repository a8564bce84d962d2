//! Tests for pagination module

use super::*;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::json;

// ============================================================================
// PageToken / NextPage Tests
// ============================================================================

#[test]
fn test_page_token_param() {
    let token = PageToken::param("cursor", "abc");
    assert_eq!(token.query.get("cursor"), Some(&"abc".to_string()));
    assert!(token.url.is_none());
}

#[test]
fn test_page_token_url() {
    let token = PageToken::url("https://api.example.com/page2");
    assert!(token.query.is_empty());
    assert_eq!(token.url.as_deref(), Some("https://api.example.com/page2"));
}

#[test]
fn test_next_page_done() {
    let next = NextPage::Done;
    assert!(next.is_done());
    assert!(next.token().is_none());
}

// ============================================================================
// Stop Condition Tests
// ============================================================================

#[test]
fn test_stop_condition_empty_page() {
    let state = PaginationState::new();
    let body = json!({});
    assert!(StopCondition::EmptyPage.should_stop(&body, 0, &state));
    assert!(!StopCondition::EmptyPage.should_stop(&body, 5, &state));
}

#[test]
fn test_stop_condition_field() {
    let state = PaginationState::new();
    let condition = StopCondition::field("meta.has_more", false);

    assert!(condition.should_stop(&json!({"meta": {"has_more": false}}), 10, &state));
    assert!(!condition.should_stop(&json!({"meta": {"has_more": true}}), 10, &state));
    assert!(!condition.should_stop(&json!({}), 10, &state));
}

#[test]
fn test_stop_condition_total_count() {
    let condition = StopCondition::total_count("total");
    let mut state = PaginationState::new();
    state.record_page(50);
    assert!(!condition.should_stop(&json!({"total": 100}), 50, &state));

    state.record_page(50);
    assert!(condition.should_stop(&json!({"total": 100}), 50, &state));
}

// ============================================================================
// No Pagination Tests
// ============================================================================

#[test]
fn test_no_paginator_single_page() {
    let paginator = NoPaginator;
    let mut state = PaginationState::new();

    assert!(paginator.initial_token().is_none());
    let next = paginator.next_page(&json!([{"id": 1}]), &HeaderMap::new(), 1, &mut state);

    assert!(next.is_done());
    assert!(state.done);
    assert_eq!(state.pages, 1);
    assert_eq!(state.total_fetched, 1);
}

#[test]
fn test_no_paginator_even_when_link_header_present() {
    let mut headers = HeaderMap::new();
    headers.insert(
        "link",
        HeaderValue::from_static("<https://api.example.com/p2>; rel=\"next\""),
    );
    let mut state = PaginationState::new();
    assert!(NoPaginator
        .next_page(&json!([]), &headers, 0, &mut state)
        .is_done());
}

// ============================================================================
// Offset Pagination Tests
// ============================================================================

#[test]
fn test_offset_paginator_initial_token() {
    let paginator = OffsetPaginator::new("offset", "limit", 50, StopCondition::EmptyPage);
    let token = paginator.initial_token().unwrap();
    assert_eq!(token.query["offset"], "0");
    assert_eq!(token.query["limit"], "50");
}

#[test]
fn test_offset_paginator_continues() {
    let paginator = OffsetPaginator::new("offset", "limit", 2, StopCondition::EmptyPage);
    let mut state = PaginationState::new();

    let next = paginator.next_page(&json!([]), &HeaderMap::new(), 2, &mut state);
    assert_eq!(next.token().unwrap().query["offset"], "2");

    let next = paginator.next_page(&json!([]), &HeaderMap::new(), 2, &mut state);
    assert_eq!(next.token().unwrap().query["offset"], "4");
}

#[test]
fn test_offset_paginator_stops_on_partial_page() {
    let paginator = OffsetPaginator::new("offset", "limit", 50, StopCondition::EmptyPage);
    let mut state = PaginationState::new();

    let next = paginator.next_page(&json!([]), &HeaderMap::new(), 20, &mut state);
    assert!(next.is_done());
    assert!(state.done);
}

#[test]
fn test_offset_paginator_zero_limit_stops_after_first_page() {
    let paginator = OffsetPaginator::new("offset", "limit", 0, StopCondition::EmptyPage);
    let mut state = PaginationState::new();

    let next = paginator.next_page(&json!([1, 2, 3, 4, 5]), &HeaderMap::new(), 5, &mut state);
    assert!(next.is_done());
}

#[test]
fn test_offset_paginator_stops_on_total_count() {
    let paginator = OffsetPaginator::new("offset", "limit", 10, StopCondition::total_count("total"));
    let mut state = PaginationState::new();

    let body = json!({"total": 20});
    assert!(!paginator
        .next_page(&body, &HeaderMap::new(), 10, &mut state)
        .is_done());
    assert!(paginator
        .next_page(&body, &HeaderMap::new(), 10, &mut state)
        .is_done());
}

// ============================================================================
// Cursor Pagination Tests
// ============================================================================

#[test]
fn test_cursor_paginator_continues() {
    let paginator = CursorPaginator::new("cursor", "meta.next", StopCondition::EmptyPage);
    let mut state = PaginationState::new();

    let next = paginator.next_page(&json!({"meta": {"next": "abc"}}), &HeaderMap::new(), 3, &mut state);
    assert_eq!(next, NextPage::Next(PageToken::param("cursor", "abc")));
    assert_eq!(state.cursor.as_deref(), Some("abc"));
}

#[test]
fn test_cursor_paginator_stops_without_cursor() {
    let paginator = CursorPaginator::new("cursor", "meta.next", StopCondition::EmptyPage);
    let mut state = PaginationState::new();

    assert!(paginator
        .next_page(&json!({"meta": {"next": null}}), &HeaderMap::new(), 3, &mut state)
        .is_done());
    let mut state = PaginationState::new();
    assert!(paginator
        .next_page(&json!({"meta": {"next": ""}}), &HeaderMap::new(), 3, &mut state)
        .is_done());
}

#[test]
fn test_cursor_paginator_stops_on_empty() {
    let paginator = CursorPaginator::new("cursor", "next", StopCondition::EmptyPage);
    let mut state = PaginationState::new();

    assert!(paginator
        .next_page(&json!({"next": "abc"}), &HeaderMap::new(), 0, &mut state)
        .is_done());
}

#[test]
fn test_cursor_paginator_stops_on_repeated_cursor() {
    let paginator = CursorPaginator::new("cursor", "next", StopCondition::EmptyPage);
    let mut state = PaginationState::new();
    let body = json!({"next": "same"});

    assert!(!paginator.next_page(&body, &HeaderMap::new(), 1, &mut state).is_done());
    assert!(paginator.next_page(&body, &HeaderMap::new(), 1, &mut state).is_done());
}

#[test]
fn test_cursor_paginator_stops_on_field() {
    let paginator = CursorPaginator::new(
        "starting_after",
        "last_id",
        StopCondition::field("has_more", false),
    );
    let mut state = PaginationState::new();

    let next = paginator.next_page(
        &json!({"last_id": "obj_9", "has_more": false}),
        &HeaderMap::new(),
        10,
        &mut state,
    );
    assert!(next.is_done());
}

// ============================================================================
// Link Header Pagination Tests
// ============================================================================

#[test]
fn test_link_header_paginator_continues() {
    let paginator = LinkHeaderPaginator::default();
    let mut headers = HeaderMap::new();
    headers.insert(
        "link",
        HeaderValue::from_static(
            "<https://api.example.com/items?page=1>; rel=\"prev\", <https://api.example.com/items?page=3>; rel=\"next\"",
        ),
    );
    let mut state = PaginationState::new();

    let next = paginator.next_page(&json!([]), &headers, 10, &mut state);
    assert_eq!(
        next,
        NextPage::Next(PageToken::url("https://api.example.com/items?page=3"))
    );
}

#[test]
fn test_link_header_paginator_stops_without_header() {
    let paginator = LinkHeaderPaginator::new("next");
    let mut state = PaginationState::new();
    assert!(paginator
        .next_page(&json!([]), &HeaderMap::new(), 10, &mut state)
        .is_done());
}

#[test]
fn test_link_header_paginator_stops_without_rel() {
    let paginator = LinkHeaderPaginator::new("next");
    let mut headers = HeaderMap::new();
    headers.insert(
        "link",
        HeaderValue::from_static("<https://api.example.com/items?page=1>; rel=\"first\""),
    );
    let mut state = PaginationState::new();
    assert!(paginator.next_page(&json!([]), &headers, 10, &mut state).is_done());
}
