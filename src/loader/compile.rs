//! Manifest compilation
//!
//! Turns a parsed manifest plus a validated configuration into immutable
//! [`StreamDefinition`]s. Every tagged block picks its implementation
//! here, and every `{{ config.* }}` reference in auth and incremental
//! settings is resolved, so a missing value fails before any request.

use super::types::{
    AuthManifest, BackoffManifest, ConnectorManifest, ErrorHandlerManifest, IncrementalManifest,
    PaginatorManifest, StopConditionManifest, StreamManifest,
};
use crate::auth::{AuthConfig, Authenticator};
use crate::backoff::{
    BackoffStrategy, ConstantBackoff, ErrorHandler, ExponentialBackoff, ResponseFilter,
    RetryAfterBackoff, RetryBound,
};
use crate::config::SourceConfig;
use crate::cursor::{parse_duration, Granularity, WindowConfig};
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::pagination::{
    CursorPaginator, LinkHeaderPaginator, NoPaginator, OffsetPaginator, Paginator, StopCondition,
};
use crate::request::RequestTemplate;
use crate::stream::StreamDefinition;
use crate::template::{render, render_map, TemplateContext};
use crate::types::CursorFormat;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Start date used when neither the stream nor the connector sets one
pub const DEFAULT_START_DATE: &str = "{{ config.start_date }}";

/// Step used when neither the stream nor the connector sets one
pub const DEFAULT_STEP: &str = "{{ config.batch_size }}d";

/// Granularity used when neither the stream nor the connector sets one
pub const DEFAULT_GRANULARITY: &str = "1d";

/// Compile every stream of a manifest
pub fn compile(manifest: &ConnectorManifest, config: &SourceConfig) -> Result<Vec<StreamDefinition>> {
    let ctx = TemplateContext::with_config(config.to_template_value());
    manifest
        .streams
        .iter()
        .map(|stream| compile_stream(manifest, stream, &ctx))
        .collect()
}

/// Keep only the named streams, in the order given
///
/// An empty selection keeps every stream. Unknown names are a
/// configuration error.
pub fn select_streams(
    streams: Vec<StreamDefinition>,
    names: &[String],
) -> Result<Vec<StreamDefinition>> {
    if names.is_empty() {
        return Ok(streams);
    }

    let mut selected = Vec::with_capacity(names.len());
    for name in names {
        let stream = streams
            .iter()
            .find(|s| &s.name == name)
            .ok_or_else(|| {
                let known: Vec<&str> = streams.iter().map(|s| s.name.as_str()).collect();
                Error::config(format!(
                    "Unknown stream '{name}'. Available streams: {}",
                    known.join(", ")
                ))
            })?;
        selected.push(stream.clone());
    }
    Ok(selected)
}

/// HTTP client settings from the manifest's `http` block
pub fn http_client_config(manifest: &ConnectorManifest) -> HttpClientConfig {
    let mut builder =
        HttpClientConfig::builder().timeout(Duration::from_secs(manifest.http.timeout_secs));
    if let Some(rps) = manifest.http.rate_limit_rps {
        builder = builder.rate_limit(RateLimiterConfig::per_second(rps));
    }
    if let Some(agent) = &manifest.http.user_agent {
        builder = builder.user_agent(agent.clone());
    }
    builder.build()
}

fn compile_stream(
    manifest: &ConnectorManifest,
    stream: &StreamManifest,
    ctx: &TemplateContext,
) -> Result<StreamDefinition> {
    let for_stream = |e: Error| Error::config(format!("Stream '{}': {e}", stream.name));

    let window = window_config(&stream.incremental.or(&manifest.incremental), ctx)
        .map_err(for_stream)?;

    let mut headers = manifest.headers.clone();
    headers.extend(stream.request.headers.clone());

    let request = RequestTemplate {
        method: stream.request.method,
        base_url: manifest.base_url.clone(),
        path: stream.request.path.clone(),
        headers,
        query: stream.request.params.clone(),
        body: stream.request.body.clone(),
        start_param: stream.request.start_param.clone(),
        end_param: stream.request.end_param.clone(),
    };

    let auth = match stream.auth.as_ref().or(manifest.auth.as_ref()) {
        Some(auth) => auth_config(auth, ctx).map_err(for_stream)?,
        None => AuthConfig::None,
    };
    let auth = Authenticator::new(auth);
    auth.validate().map_err(for_stream)?;

    let error_handler = error_handler(
        stream
            .error_handler
            .as_ref()
            .unwrap_or(&manifest.error_handler),
    )
    .map_err(for_stream)?;

    let paginator = paginator(&stream.paginator).map_err(for_stream)?;

    let mut definition = StreamDefinition::new(stream.name.clone(), request, window)
        .with_primary_key(stream.primary_key.clone())
        .with_auth(auth)
        .with_paginator(paginator)
        .with_error_handler(error_handler);
    if let Some(field) = &stream.cursor_field {
        definition = definition.with_cursor_field(field.clone());
    }
    definition = definition.with_record_path(stream.records_path.clone());

    debug!(
        stream = %definition.name,
        start_date = %definition.window.start_date,
        step_ms = definition.window.step.num_milliseconds(),
        cursor_format = ?definition.window.cursor_format,
        "Compiled stream"
    );

    Ok(definition)
}

// ============================================================================
// Windows
// ============================================================================

fn window_config(incremental: &IncrementalManifest, ctx: &TemplateContext) -> Result<WindowConfig> {
    let start_date = render(
        incremental.start_date.as_deref().unwrap_or(DEFAULT_START_DATE),
        ctx,
    )?;
    let step = render(incremental.step.as_deref().unwrap_or(DEFAULT_STEP), ctx)?;
    let granularity = render(
        incremental.granularity.as_deref().unwrap_or(DEFAULT_GRANULARITY),
        ctx,
    )?;

    WindowConfig::new(
        parse_start_date(&start_date)?,
        parse_duration(&step).map_err(|e| Error::invalid_config("step", e.to_string()))?,
        Granularity::parse(&granularity)?,
        incremental.cursor_format.unwrap_or(CursorFormat::Date),
    )
}

/// Parse `YYYY-MM-DD` (midnight UTC) or an RFC 3339 timestamp
fn parse_start_date(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            Error::invalid_config("start_date", format!("'{s}' is neither YYYY-MM-DD nor RFC 3339"))
        })
}

// ============================================================================
// Auth
// ============================================================================

fn auth_config(auth: &AuthManifest, ctx: &TemplateContext) -> Result<AuthConfig> {
    Ok(match auth {
        AuthManifest::None => AuthConfig::None,
        AuthManifest::Bearer { token } => AuthConfig::Bearer {
            token: render(token, ctx)?,
        },
        AuthManifest::ApiKey {
            name,
            value,
            location,
            prefix,
        } => AuthConfig::ApiKey {
            location: *location,
            name: name.clone(),
            prefix: prefix.clone(),
            value: render(value, ctx)?,
        },
        AuthManifest::Basic { username, password } => AuthConfig::Basic {
            username: render(username, ctx)?,
            password: render(password, ctx)?,
        },
        AuthManifest::CustomHeaders { headers } => AuthConfig::CustomHeaders {
            headers: render_map(headers, ctx)?,
        },
    })
}

// ============================================================================
// Error Handling
// ============================================================================

fn error_handler(manifest: &ErrorHandlerManifest) -> Result<ErrorHandler> {
    let mut handler = ErrorHandler::new(backoff_strategy(&manifest.backoff)?).with_bound(
        RetryBound {
            max_retries: manifest.max_retries,
            max_wait: manifest.max_wait_secs.map(Duration::from_secs),
        },
    );
    for filter in &manifest.filters {
        handler = handler.with_filter(ResponseFilter::new(filter.action, filter.http_codes.clone()));
    }
    Ok(handler)
}

fn backoff_strategy(manifest: &BackoffManifest) -> Result<Arc<dyn BackoffStrategy>> {
    Ok(match manifest {
        BackoffManifest::Constant { backoff_secs } => {
            Arc::new(ConstantBackoff::new(seconds("backoff_secs", *backoff_secs)?))
        }
        BackoffManifest::Exponential {
            initial_secs,
            factor,
            max_secs,
        } => {
            if !factor.is_finite() || *factor < 1.0 {
                return Err(Error::invalid_config("factor", "must be at least 1"));
            }
            Arc::new(ExponentialBackoff::new(
                seconds("initial_secs", *initial_secs)?,
                *factor,
                seconds("max_secs", *max_secs)?,
            ))
        }
        BackoffManifest::WaitTimeFromHeader {
            header,
            fallback_secs,
            max_secs,
        } => {
            let mut strategy =
                RetryAfterBackoff::new(header.clone(), seconds("fallback_secs", *fallback_secs)?);
            if let Some(max) = max_secs {
                strategy = strategy.with_max(seconds("max_secs", *max)?);
            }
            Arc::new(strategy)
        }
    })
}

fn seconds(field: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| Error::invalid_config(field, format!("{secs} is not a valid number of seconds")))
}

// ============================================================================
// Pagination
// ============================================================================

fn paginator(manifest: &PaginatorManifest) -> Result<Arc<dyn Paginator>> {
    let paginator: Arc<dyn Paginator> = match manifest {
        PaginatorManifest::None => Arc::new(NoPaginator),
        PaginatorManifest::Offset {
            offset_param,
            limit_param,
            limit,
            stop,
        } => {
            // A zero limit never moves the offset
            if *limit == 0 {
                return Err(Error::invalid_config("limit", "must be greater than 0"));
            }
            Arc::new(OffsetPaginator::new(
                offset_param.clone(),
                limit_param.clone(),
                *limit,
                stop_condition(stop),
            ))
        }
        PaginatorManifest::Cursor {
            cursor_param,
            cursor_path,
            stop,
        } => Arc::new(CursorPaginator::new(
            cursor_param.clone(),
            cursor_path.clone(),
            stop_condition(stop),
        )),
        PaginatorManifest::LinkHeader { rel } => Arc::new(LinkHeaderPaginator::new(rel.clone())),
    };
    Ok(paginator)
}

fn stop_condition(manifest: &StopConditionManifest) -> StopCondition {
    match manifest {
        StopConditionManifest::EmptyPage => StopCondition::EmptyPage,
        StopConditionManifest::TotalCount { path } => StopCondition::total_count(path.clone()),
        StopConditionManifest::Field { path, value } => StopCondition::field(path.clone(), value.clone()),
    }
}
