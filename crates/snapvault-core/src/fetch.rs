use std::io::Read;
use std::time::Duration;

use anyhow::{bail, Context};
use scraper::{Html, Selector};

/// Per-user profile page URL prefix.
pub const BASE_URL: &str = "https://story.snapchat.com/@";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

/// Shared HTTP agent for a whole run. Statuses are handled explicitly, not
/// as transport errors.
pub fn build_agent() -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(Some(Duration::from_secs(30)))
        .user_agent(USER_AGENT)
        .build();
    config.into()
}

/// Fetch a user's profile page and parse the embedded JSON payload out of it.
///
/// A non-200 response, a page without the embedded data element, or an
/// unparsable payload are all fetch failures for this user.
pub fn fetch_payload(agent: &ureq::Agent, username: &str) -> anyhow::Result<serde_json::Value> {
    let url = format!("{BASE_URL}{username}");
    let html = fetch_page(agent, &url)?;
    let raw = embedded_payload(&html)
        .with_context(|| format!("no embedded data element on {url}"))?;
    serde_json::from_str(&raw).with_context(|| format!("embedded payload on {url} is not valid JSON"))
}

fn fetch_page(agent: &ureq::Agent, url: &str) -> anyhow::Result<String> {
    let mut response = agent
        .get(url)
        .call()
        .with_context(|| format!("GET {url}"))?;
    let status = response.status().as_u16();
    if status != 200 {
        bail!("HTTP {status} fetching {url}");
    }

    let mut body = Vec::new();
    response
        .body_mut()
        .as_reader()
        .read_to_end(&mut body)
        .with_context(|| format!("reading body of {url}"))?;
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Pull the `<script id="__NEXT_DATA__">` text out of a profile page.
pub fn embedded_payload(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script#__NEXT_DATA__").expect("next-data selector");
    let element = document.select(&selector).next()?;
    let text: String = element.text().collect();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
