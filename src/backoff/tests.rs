//! Tests for classification and backoff

use super::*;
use crate::error::{Error, ErrorKind};
use crate::http::ResponsePage;
use reqwest::header::{HeaderMap, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use test_case::test_case;

fn page(status: u16) -> ResponsePage {
    ResponsePage::new(status, HeaderMap::new(), "body")
}

fn page_with_retry_after(status: u16, value: &'static str) -> ResponsePage {
    let mut headers = HeaderMap::new();
    headers.insert("retry-after", HeaderValue::from_static(value));
    ResponsePage::new(status, headers, "")
}

fn handler(secs: u64) -> ErrorHandler {
    ErrorHandler::new(Arc::new(ConstantBackoff::secs(secs)))
}

fn kind_of(classification: &Classification) -> Option<ErrorKind> {
    match classification {
        Classification::Success(_) => None,
        Classification::Retryable { error, .. } | Classification::Fatal(error) => {
            Some(error.kind())
        }
    }
}

// ============================================================================
// Classification Tests
// ============================================================================

#[test_case(200 ; "ok")]
#[test_case(201 ; "created")]
#[test_case(204 ; "no content")]
fn test_success_statuses(status: u16) {
    assert!(matches!(
        handler(60).classify(Ok(page(status))),
        Classification::Success(_)
    ));
}

#[test_case(429, ErrorKind::RateLimitOrServer ; "too many requests")]
#[test_case(500, ErrorKind::RateLimitOrServer ; "internal error")]
#[test_case(502, ErrorKind::RateLimitOrServer ; "bad gateway")]
#[test_case(503, ErrorKind::RateLimitOrServer ; "unavailable")]
fn test_retryable_statuses(status: u16, kind: ErrorKind) {
    let classification = handler(60).classify(Ok(page(status)));
    assert!(matches!(classification, Classification::Retryable { .. }));
    assert_eq!(kind_of(&classification), Some(kind));
}

#[test_case(401, ErrorKind::Authentication ; "unauthorized")]
#[test_case(403, ErrorKind::Authentication ; "forbidden")]
#[test_case(400, ErrorKind::Client ; "bad request")]
#[test_case(404, ErrorKind::Client ; "not found")]
#[test_case(422, ErrorKind::Client ; "unprocessable")]
fn test_fatal_statuses(status: u16, kind: ErrorKind) {
    let classification = handler(60).classify(Ok(page(status)));
    assert!(matches!(classification, Classification::Fatal(_)));
    assert_eq!(kind_of(&classification), Some(kind));
}

#[test]
fn test_transport_failures() {
    let h = handler(60);
    assert!(matches!(
        h.classify(Err(Error::network("connection reset"))),
        Classification::Retryable { response: None, .. }
    ));
    assert!(matches!(
        h.classify(Err(Error::Timeout { timeout_ms: 30_000 })),
        Classification::Retryable { .. }
    ));
    assert!(matches!(
        h.classify(Err(Error::config("bad url"))),
        Classification::Fatal(_)
    ));
}

#[test]
fn test_filters_override_defaults() {
    let h = handler(60)
        .with_filter(ResponseFilter::new(FilterAction::Retry, [404]))
        .with_filter(ResponseFilter::new(FilterAction::Fail, [503]));

    assert!(matches!(
        h.classify(Ok(page(404))),
        Classification::Retryable { .. }
    ));
    assert!(matches!(h.classify(Ok(page(503))), Classification::Fatal(_)));
    assert!(matches!(
        h.classify(Ok(page(500))),
        Classification::Retryable { .. }
    ));
}

#[test]
fn test_error_carries_body_excerpt() {
    let classification = handler(60).classify(Ok(ResponsePage::new(
        401,
        HeaderMap::new(),
        "invalid token",
    )));
    match classification {
        Classification::Fatal(err) => assert!(err.to_string().contains("invalid token")),
        other => panic!("expected fatal, got {other:?}"),
    }
}

// ============================================================================
// Decision Tests
// ============================================================================

#[test]
fn test_decide_constant_wait_then_exhaust() {
    let h = handler(60).with_bound(RetryBound {
        max_retries: 2,
        max_wait: None,
    });
    let mut state = RetryState::new();

    for _ in 0..2 {
        match h.decide(Ok(page(429)), &mut state) {
            BackoffDecision::Retry(wait) => assert_eq!(wait, Duration::from_secs(60)),
            other => panic!("expected retry, got {other:?}"),
        }
    }
    assert_eq!(state.retries, 2);
    assert_eq!(state.waited, Duration::from_secs(120));

    match h.decide(Ok(page(429)), &mut state) {
        BackoffDecision::Abort(err) => {
            assert_eq!(err.kind(), ErrorKind::RetryExhausted);
            assert!(err.to_string().contains("3 attempts"));
        }
        other => panic!("expected abort, got {other:?}"),
    }
}

#[test]
fn test_decide_max_wait_bound() {
    let h = handler(60).with_bound(RetryBound {
        max_retries: 10,
        max_wait: Some(Duration::from_secs(90)),
    });
    let mut state = RetryState::new();

    assert!(matches!(
        h.decide(Ok(page(503)), &mut state),
        BackoffDecision::Retry(_)
    ));
    match h.decide(Ok(page(503)), &mut state) {
        BackoffDecision::Abort(err) => assert_eq!(err.kind(), ErrorKind::RetryExhausted),
        other => panic!("expected abort, got {other:?}"),
    }
}

#[test]
fn test_decide_zero_retries_aborts_immediately() {
    let h = handler(60).with_bound(RetryBound {
        max_retries: 0,
        max_wait: None,
    });
    let mut state = RetryState::new();
    assert!(matches!(
        h.decide(Err(Error::network("down")), &mut state),
        BackoffDecision::Abort(_)
    ));
}

#[test]
fn test_decide_fatal_is_not_retried() {
    let mut state = RetryState::new();
    match handler(60).decide(Ok(page(401)), &mut state) {
        BackoffDecision::Abort(err) => assert_eq!(err.kind(), ErrorKind::Authentication),
        other => panic!("expected abort, got {other:?}"),
    }
    assert_eq!(state.retries, 0);
}

#[test]
fn test_decide_success_continues() {
    let mut state = RetryState::new();
    assert!(matches!(
        handler(60).decide(Ok(page(200)), &mut state),
        BackoffDecision::Continue(_)
    ));
}

#[test]
fn test_default_handler() {
    let h = ErrorHandler::default();
    assert_eq!(h.bound().max_retries, 5);
    assert_eq!(h.strategy().wait(1, None), Duration::from_secs(60));
}

// ============================================================================
// Strategy Tests
// ============================================================================

#[test]
fn test_constant_backoff_ignores_attempt() {
    let backoff = ConstantBackoff::secs(60);
    assert_eq!(backoff.wait(1, None), Duration::from_secs(60));
    assert_eq!(backoff.wait(5, None), Duration::from_secs(60));
}

#[test_case(1, 1 ; "first retry")]
#[test_case(2, 2 ; "second retry")]
#[test_case(3, 4 ; "third retry")]
#[test_case(6, 10 ; "capped")]
fn test_exponential_backoff(attempt: u32, expected_secs: u64) {
    let backoff = ExponentialBackoff::new(Duration::from_secs(1), 2.0, Duration::from_secs(10));
    assert_eq!(backoff.wait(attempt, None), Duration::from_secs(expected_secs));
}

#[test]
fn test_exponential_backoff_huge_attempt_is_capped() {
    let backoff = ExponentialBackoff::default();
    assert_eq!(backoff.wait(u32::MAX, None), Duration::from_secs(300));
}

#[test]
fn test_retry_after_backoff() {
    let backoff = RetryAfterBackoff::default();
    assert_eq!(
        backoff.wait(1, Some(&page_with_retry_after(429, "7"))),
        Duration::from_secs(7)
    );
    assert_eq!(
        backoff.wait(1, Some(&page_with_retry_after(429, "soon"))),
        Duration::from_secs(60)
    );
    assert_eq!(backoff.wait(1, None), Duration::from_secs(60));
}

#[test]
fn test_retry_after_backoff_capped() {
    let backoff = RetryAfterBackoff::default().with_max(Duration::from_secs(30));
    assert_eq!(
        backoff.wait(1, Some(&page_with_retry_after(429, "3600"))),
        Duration::from_secs(30)
    );
}

#[test]
fn test_handler_passes_response_to_strategy() {
    let h = ErrorHandler::new(Arc::new(RetryAfterBackoff::default()));
    let mut state = RetryState::new();
    match h.decide(Ok(page_with_retry_after(429, "2")), &mut state) {
        BackoffDecision::Retry(wait) => assert_eq!(wait, Duration::from_secs(2)),
        other => panic!("expected retry, got {other:?}"),
    }
}
