//! RSS 2.0 rendering of a status snapshot.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::health::{StatusRecord, Verdict};

/// Channel-level metadata of the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedMeta {
    pub title: String,
    pub description: String,
    pub link: String,
}

/// Text used for a verdict inside the feed.
pub fn verdict_label(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Unknown => "WAITING FOR STATUS",
        Verdict::Up => "UP",
        Verdict::Down => "DOWN",
    }
}

/// Render one `<item>` per channel. `link_for` maps a channel name to its item link.
pub fn render_rss<'a>(
    meta: &FeedMeta,
    record: &StatusRecord,
    link_for: impl Fn(&str) -> Option<&'a str>,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::with_capacity(512 + record.channels.len() * 256);

    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<rss version=\"2.0\">\n<channel>\n");
    let _ = writeln!(out, "  <title>{}</title>", escape(&meta.title));
    let _ = writeln!(out, "  <link>{}</link>", escape(&meta.link));
    let _ = writeln!(out, "  <description>{}</description>", escape(&meta.description));
    let _ = writeln!(out, "  <lastBuildDate>{}</lastBuildDate>", now.to_rfc2822());

    for status in &record.channels {
        let name = status.channel.as_str();
        let title = format!("{} Service is {}", name.to_uppercase(), verdict_label(status.verdict));

        out.push_str("  <item>\n");
        let _ = writeln!(out, "    <title>{}</title>", escape(&title));
        if let Some(link) = link_for(name) {
            let _ = writeln!(out, "    <link>{}</link>", escape(link));
        }
        let _ = writeln!(out, "    <guid isPermaLink=\"false\">{}</guid>", escape(&guid(name, status.since)));
        if let Some(since) = status.since {
            let _ = writeln!(out, "    <pubDate>{}</pubDate>", since.to_rfc2822());
        }
        out.push_str("  </item>\n");
    }

    out.push_str("</channel>\n</rss>\n");
    out
}

/// Stable per-change identifier so readers see each transition once.
fn guid(channel: &str, since: Option<DateTime<Utc>>) -> String {
    match since {
        Some(since) => format!("{}-{}", channel, since.timestamp_millis()),
        None => format!("{}-waiting", channel),
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
