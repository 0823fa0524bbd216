//! What the client is allowed to put in logs.
use reqwest::header::HeaderMap;
use reqwest::Url;
use std::borrow::Cow;

const RAW_ENV: &str = "TALLY_HTTP_RAW";
pub(crate) const RAW_MAX_BODY: usize = 64 * 1024;
const SNIPPET_MAX: usize = 500;
const HIDDEN: &str = "<redacted>";

const SECRET_PARAMS: &[&str] = &["access_token", "api_key", "apikey", "key", "token", "secret"];

/// `TALLY_HTTP_RAW=1` turns on curl-style request lines and full bodies.
pub(crate) fn raw_enabled() -> bool {
    std::env::var(RAW_ENV)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn is_secret(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    SECRET_PARAMS.contains(&name.as_str()) || name.ends_with("_token") || name.ends_with("_secret")
}

pub(crate) fn query_pairs(query: Option<&[(&str, Cow<'_, str>)]>) -> Vec<(String, String)> {
    query
        .unwrap_or_default()
        .iter()
        .map(|(k, v)| {
            let shown = if is_secret(k) { HIDDEN } else { v.as_ref() };
            ((*k).to_string(), shown.to_string())
        })
        .collect()
}

pub(crate) fn headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(name, value)| {
            let key = name.as_str();
            let shown = if key.eq_ignore_ascii_case("authorization") || is_secret(key) {
                HIDDEN.to_string()
            } else {
                value.to_str().unwrap_or("<binary>").to_string()
            };
            (key.to_string(), shown)
        })
        .collect()
}

fn shown_url(url: &Url) -> String {
    if url.query().is_none() {
        return url.to_string();
    }
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if is_secret(&k) { HIDDEN.into() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// A pasteable curl line for the built request.
pub(crate) fn curl(req: &reqwest::Request) -> String {
    let mut line = format!("curl -X{}", req.method());
    for (name, value) in headers(req.headers()) {
        line.push_str(" -H ");
        line.push_str(&shell_quote(&format!("{name}: {value}")));
    }
    if let Some(bytes) = req.body().and_then(|b| b.as_bytes()) {
        match std::str::from_utf8(bytes) {
            Ok(text) => {
                let mut text = text.to_string();
                if text.len() > RAW_MAX_BODY {
                    truncate_at_char_boundary(&mut text, RAW_MAX_BODY);
                    text.push('…');
                }
                line.push_str(" -d ");
                line.push_str(&shell_quote(&text));
            }
            Err(_) => line.push_str(&format!(" --data-binary @- # ({} bytes)", bytes.len())),
        }
    }
    line.push(' ');
    line.push_str(&shell_quote(&shown_url(req.url())));
    line
}

pub(crate) fn truncate_at_char_boundary(s: &mut String, max: usize) {
    let mut end = max.min(s.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

/// Lossy, length-capped view of a body for log fields and error values.
pub(crate) fn snippet(body: &[u8]) -> String {
    let mut text = String::from_utf8_lossy(body).into_owned();
    if text.len() > SNIPPET_MAX {
        truncate_at_char_boundary(&mut text, SNIPPET_MAX);
        text.push_str("...");
    }
    text
}
