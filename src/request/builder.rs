//! Pure request builder

use super::types::RequestSpec;
use crate::cursor::TimeWindow;
use crate::error::Result;
use crate::pagination::PageToken;
use crate::stream::StreamDefinition;
use crate::template::{render, render_map, render_value, TemplateContext};
use url::Url;

/// Build the request for one page of one window
///
/// Window bounds are formatted in the stream's cursor format and written
/// to the stream's start/end parameters. A page token's parameters are
/// applied last; a token URL replaces the stream URL and its query.
pub fn build_request(
    stream: &StreamDefinition,
    window: &TimeWindow,
    page: Option<&PageToken>,
    ctx: &TemplateContext,
) -> Result<RequestSpec> {
    let template = &stream.request;
    let (start, end) = window.formatted(stream.window.cursor_format);
    let ctx = ctx.clone().for_window(start.clone(), end.clone());

    let mut headers = render_map(&template.headers, &ctx)?;

    let (url, mut query) = match page.and_then(|p| p.url.as_deref()) {
        Some(next_url) => (Url::parse(next_url)?, Default::default()),
        None => {
            let base = render(&template.base_url, &ctx)?;
            let path = render(&template.path, &ctx)?;
            let url = join_url(&base, &path)?;

            let mut query = render_map(&template.query, &ctx)?;
            query.insert(template.start_param.clone(), start);
            query.insert(template.end_param.clone(), end);
            (url, query)
        }
    };

    if let Some(token) = page {
        for (key, value) in &token.query {
            query.insert(key.clone(), value.clone());
        }
    }

    stream.auth.apply(&mut headers, &mut query)?;

    let body = template
        .body
        .as_ref()
        .map(|b| render_value(b, &ctx))
        .transpose()?;

    Ok(RequestSpec {
        method: template.method,
        url,
        headers,
        query,
        body,
        page_token: page.cloned(),
    })
}

/// Build full URL from base and path
fn join_url(base: &str, path: &str) -> Result<Url> {
    if path.starts_with("http://") || path.starts_with("https://") {
        return Ok(Url::parse(path)?);
    }

    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return Ok(Url::parse(base)?);
    }
    Ok(Url::parse(&format!("{base}/{path}"))?)
}
