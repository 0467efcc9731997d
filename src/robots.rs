//! robots.txt resolution.
//!
//! Fetching is fail-open: a missing, broken or unreachable robots.txt yields
//! "allow, no sitemaps" and never blocks an audit. Group selection uses the
//! agent's product token with a fallback to `*`; the longest matching rule
//! wins and ties go to `Allow`.

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::options::AuditOptions;
use crate::url_utils;

/// Crawl permission and sitemap declarations for one origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotsInfo {
    /// Location of the robots.txt that was consulted.
    pub url: String,
    /// Whether the audit agent may fetch the target path.
    pub allow: bool,
    /// Rule that denied access, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disallow_reason: Option<String>,
    /// `Sitemap:` URLs in declaration order.
    pub sitemap_urls: Vec<String>,
    /// Body of robots.txt when it was retrieved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

impl RobotsInfo {
    /// Fail-open default used when robots.txt cannot be read.
    #[must_use]
    pub fn allow_all(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            allow: true,
            disallow_reason: None,
            sitemap_urls: Vec::new(),
            raw_text: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Group {
    agents: Vec<String>,
    rules: Vec<Rule>,
}

#[derive(Debug, Clone)]
struct Rule {
    allow: bool,
    pattern: String,
}

/// Parsed robots.txt document.
#[derive(Debug, Clone, Default)]
pub struct RobotsTxt {
    groups: Vec<Group>,
    sitemaps: Vec<String>,
}

impl RobotsTxt {
    /// Parse robots exclusion syntax. Unknown directives are ignored.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut parsed = Self::default();
        let mut current: Option<Group> = None;
        let mut group_has_rules = false;

        for raw_line in text.lines() {
            let line = raw_line.split('#').next().unwrap_or_default().trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if group_has_rules {
                        parsed.groups.extend(current.take());
                        group_has_rules = false;
                    }
                    current
                        .get_or_insert_with(Group::default)
                        .agents
                        .push(value.to_ascii_lowercase());
                }
                "allow" | "disallow" => {
                    let Some(group) = current.as_mut() else {
                        continue;
                    };
                    group_has_rules = true;
                    // An empty Disallow permits everything.
                    if value.is_empty() {
                        continue;
                    }
                    group.rules.push(Rule {
                        allow: key == "allow",
                        pattern: value.to_string(),
                    });
                }
                "sitemap" if !value.is_empty() => parsed.sitemaps.push(value.to_string()),
                _ => {}
            }
        }

        parsed.groups.extend(current);
        parsed
    }

    /// Declared sitemap URLs.
    #[must_use]
    pub fn sitemaps(&self) -> &[String] {
        &self.sitemaps
    }

    /// Decide whether `agent` may fetch `path` (path plus optional query).
    ///
    /// Returns the denying pattern when access is refused.
    #[must_use]
    pub fn check(&self, path: &str, agent: &str) -> Result<(), String> {
        let agent = agent.to_ascii_lowercase();
        let mut rules: Vec<&Rule> = self
            .groups
            .iter()
            .filter(|g| g.agents.iter().any(|a| *a == agent))
            .flat_map(|g| g.rules.iter())
            .collect();
        if rules.is_empty() && !self.groups.iter().any(|g| g.agents.contains(&agent)) {
            rules = self
                .groups
                .iter()
                .filter(|g| g.agents.iter().any(|a| a == "*"))
                .flat_map(|g| g.rules.iter())
                .collect();
        }

        let mut best: Option<&Rule> = None;
        for rule in rules {
            if !pattern_matches(&rule.pattern, path) {
                continue;
            }
            best = match best {
                None => Some(rule),
                Some(current) if rule.pattern.len() > current.pattern.len() => Some(rule),
                Some(current)
                    if rule.pattern.len() == current.pattern.len() && rule.allow && !current.allow =>
                {
                    Some(rule)
                }
                keep => keep,
            };
        }

        match best {
            Some(rule) if !rule.allow => Err(format!("Disallow: {}", rule.pattern)),
            _ => Ok(()),
        }
    }
}

/// Match a robots path pattern supporting `*` wildcards and a `$` end anchor.
fn pattern_matches(pattern: &str, path: &str) -> bool {
    let (pattern, anchored) = match pattern.strip_suffix('$') {
        Some(stripped) => (stripped, true),
        None => (pattern, false),
    };
    let parts: Vec<&str> = pattern.split('*').collect();
    let first = parts[0];
    if !path.starts_with(first) {
        return false;
    }
    if parts.len() == 1 {
        return !anchored || path.len() == first.len();
    }

    let mut pos = first.len();
    let last_index = parts.len() - 1;
    for (i, part) in parts.iter().enumerate().skip(1) {
        if i == last_index && anchored {
            return path.len() >= pos + part.len() && path.ends_with(part);
        }
        match path[pos..].find(part) {
            Some(idx) => pos += idx + part.len(),
            None => return false,
        }
    }
    true
}

/// Path and query of `url` as matched against robots rules.
fn robots_path(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    }
}

/// Fetch `{origin}/robots.txt` and evaluate it for `target`.
pub async fn fetch_robots_info(client: &Client, target: &Url, options: &AuditOptions) -> RobotsInfo {
    let Some(robots_url) = url_utils::origin_join(target, "/robots.txt") else {
        return RobotsInfo::allow_all(String::new());
    };

    let response = client
        .get(robots_url.clone())
        .header(ACCEPT, "text/plain")
        .timeout(options.request_timeout)
        .send()
        .await;

    let text = match response {
        Ok(resp) if resp.status().is_success() => match resp.text().await {
            Ok(text) => text,
            Err(err) => {
                warn!(url = %robots_url, error = %err, "robots.txt body unreadable; allowing");
                return RobotsInfo::allow_all(robots_url.as_str());
            }
        },
        Ok(resp) => {
            debug!(url = %robots_url, status = resp.status().as_u16(), "robots.txt not available; allowing");
            return RobotsInfo::allow_all(robots_url.as_str());
        }
        Err(err) => {
            warn!(url = %robots_url, error = %err, "robots.txt fetch failed; allowing");
            return RobotsInfo::allow_all(robots_url.as_str());
        }
    };

    evaluate_robots(robots_url.as_str(), &text, target, options.agent_token())
}

/// Evaluate a robots.txt body for `target` and `agent`.
#[must_use]
pub fn evaluate_robots(robots_url: &str, text: &str, target: &Url, agent: &str) -> RobotsInfo {
    let parsed = RobotsTxt::parse(text);
    let verdict = parsed.check(&robots_path(target), agent);
    RobotsInfo {
        url: robots_url.to_string(),
        allow: verdict.is_ok(),
        disallow_reason: verdict.err(),
        sitemap_urls: parsed.sitemaps().to_vec(),
        raw_text: Some(text.to_string()),
    }
}
