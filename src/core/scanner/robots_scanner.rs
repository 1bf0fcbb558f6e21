// src/core/scanner/robots_scanner.rs

use crate::core::models::{BotAccess, RobotsResults};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// AI crawlers whose access is evaluated, in report order.
pub const AI_BOTS: &[&str] = &[
    "GPTBot",            // OpenAI
    "ClaudeBot",         // Anthropic
    "PerplexityBot",     // Perplexity
    "GoogleOther",       // Google research / internal crawling
    "Applebot-Extended", // Apple Intelligence
];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Rule {
    allow: bool,
    pattern: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Group {
    /// Lower-cased user-agent tokens.
    agents: Vec<String>,
    rules: Vec<Rule>,
}

/// A parsed robots.txt file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsTxt {
    groups: Vec<Group>,
}

impl RobotsTxt {
    /// Parses robots.txt text. Unknown directives, comments and rules that
    /// appear before any `User-agent` line are ignored.
    pub fn parse(body: &str) -> Self {
        let mut groups: Vec<Group> = Vec::new();
        // True while consecutive User-agent lines are being collected.
        let mut collecting_agents = false;

        for raw_line in body.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if !collecting_agents || groups.is_empty() {
                        groups.push(Group::default());
                    }
                    collecting_agents = true;
                    let token = value.split('/').next().unwrap_or("").trim().to_ascii_lowercase();
                    if let Some(group) = groups.last_mut().filter(|_| !token.is_empty()) {
                        group.agents.push(token);
                    }
                }
                "allow" | "disallow" => {
                    collecting_agents = false;
                    let Some(group) = groups.last_mut() else {
                        continue;
                    };
                    if value.is_empty() {
                        continue;
                    }
                    group.rules.push(Rule {
                        allow: key == "allow",
                        pattern: normalize_pattern(value),
                    });
                }
                _ => {}
            }
        }

        Self { groups }
    }

    /// Whether `agent` may fetch `path` (path plus optional query).
    ///
    /// The group with the longest agent token contained in the agent name
    /// wins (groups with equal tokens are merged); the `*` group only applies
    /// when no specific group exists. Inside the group the longest matching
    /// pattern decides, with `Allow` winning ties.
    pub fn is_allowed(&self, agent: &str, path: &str) -> bool {
        let rules = self.rules_for(agent);
        let mut verdict: Option<(usize, bool)> = None;
        for rule in rules {
            if !pattern_matches(&rule.pattern, path) {
                continue;
            }
            let len = rule.pattern.len();
            verdict = match verdict {
                Some((best, _)) if len < best => verdict,
                Some((best, true)) if len == best => verdict,
                _ => Some((len, rule.allow)),
            };
        }
        verdict.is_none_or(|(_, allow)| allow)
    }

    fn rules_for(&self, agent: &str) -> Vec<&Rule> {
        let agent = agent.to_ascii_lowercase();
        let mut best_len = 0;
        let mut specific: Vec<&Rule> = Vec::new();
        let mut wildcard: Vec<&Rule> = Vec::new();

        for group in &self.groups {
            if group.agents.iter().any(|a| a == "*") {
                wildcard.extend(group.rules.iter());
            }
            let matched = group
                .agents
                .iter()
                .filter(|a| a.as_str() != "*" && agent.contains(a.as_str()))
                .map(|a| a.len())
                .max();
            match matched {
                Some(len) if len > best_len => {
                    best_len = len;
                    specific = group.rules.iter().collect();
                }
                Some(len) if len == best_len => specific.extend(group.rules.iter()),
                _ => {}
            }
        }

        if best_len > 0 { specific } else { wildcard }
    }
}

fn normalize_pattern(value: &str) -> String {
    if value.starts_with('/') || value.starts_with('*') {
        value.to_string()
    } else {
        format!("/{}", value)
    }
}

/// Robots pattern match: `*` matches any run of characters, a trailing `$`
/// anchors the pattern at the end of the path; otherwise prefix semantics.
fn pattern_matches(pattern: &str, path: &str) -> bool {
    let (pattern, anchored) = match pattern.strip_suffix('$') {
        Some(p) => (p, true),
        None => (pattern, false),
    };
    let parts: Vec<&str> = pattern.split('*').collect();
    let last = parts.len() - 1;
    let mut pos = 0;

    for (i, part) in parts.iter().enumerate() {
        if i == 0 {
            if !path.starts_with(part) {
                return false;
            }
            pos = part.len();
        } else if i == last && anchored {
            return path.len() >= pos + part.len() && path.ends_with(part);
        } else {
            match path[pos..].find(part) {
                Some(idx) => pos += idx + part.len(),
                None => return false,
            }
        }
    }

    !anchored || pos == path.len()
}

fn target_path(url: &Url) -> String {
    let mut path = url.path().to_string();
    if path.is_empty() {
        path.push('/');
    }
    if let Some(query) = url.query() {
        path.push('?');
        path.push_str(query);
    }
    path
}

pub fn robots_url_for(url: &Url) -> String {
    match url.port() {
        Some(port) => format!("{}://{}:{}/robots.txt", url.scheme(), url.host_str().unwrap_or(""), port),
        None => format!("{}://{}/robots.txt", url.scheme(), url.host_str().unwrap_or("")),
    }
}

/// Evaluates every registered AI bot against a parsed robots.txt.
pub fn evaluate_bots(robots: &RobotsTxt, url: &Url) -> Vec<BotAccess> {
    let path = target_path(url);
    AI_BOTS
        .iter()
        .map(|bot| {
            let allowed = robots.is_allowed(bot, &path);
            debug!(bot, path = %path, allowed, "Evaluated bot access.");
            BotAccess {
                bot: bot.to_string(),
                allowed,
            }
        })
        .collect()
}

/// Fetches `/robots.txt` for the target's origin and evaluates the AI bots.
///
/// A fetch failure or a non-200 answer yields an error finding and a zero score.
pub async fn run_robots_scan(client: &reqwest::Client, url: &Url, timeout: Duration) -> RobotsResults {
    let robots_url = robots_url_for(url);
    info!(robots_url = %robots_url, "Starting robots.txt scan.");

    let body = match client.get(&robots_url).timeout(timeout).send().await {
        Ok(response) if response.status() == reqwest::StatusCode::OK => match response.text().await {
            Ok(text) => text,
            Err(e) => return failed(robots_url, format!("Could not read robots.txt: {}", e)),
        },
        Ok(response) => {
            let status = response.status().as_u16();
            return failed(robots_url, format!("robots.txt returned {}", status));
        }
        Err(e) => {
            warn!(robots_url = %robots_url, error = %e, "robots.txt fetch failed.");
            return failed(robots_url, "Could not fetch robots.txt".to_string());
        }
    };

    let robots = RobotsTxt::parse(&body);
    let bots = evaluate_bots(&robots, url);
    let allowed = bots.iter().filter(|b| b.allowed).count();
    let issues = bots
        .iter()
        .filter(|b| !b.allowed)
        .map(|b| format!("{} is blocked", b.bot))
        .collect();

    info!(allowed, total = bots.len(), "robots.txt scan finished.");
    RobotsResults {
        robots_url,
        score_part: allowed as f64 / AI_BOTS.len() as f64 * 100.0,
        bots,
        error: None,
        issues,
    }
}

fn failed(robots_url: String, error: String) -> RobotsResults {
    warn!(robots_url = %robots_url, error = %error, "robots.txt unavailable.");
    RobotsResults {
        robots_url,
        bots: Vec::new(),
        issues: vec![error.clone()],
        error: Some(error),
        score_part: 0.0,
    }
}
