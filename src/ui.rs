use crate::models::{FetchResult, UrlStats};
use crate::range::RangeKey;
use crate::table::{Column, SortSpec, sorted_rows};
use std::fmt::Write;

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Only web links are rendered as hrefs; anything else becomes inert.
fn safe_href(url: &str) -> String {
    let lower = url.trim_start().to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        escape_html(url)
    } else {
        "#".to_string()
    }
}

pub fn render_page(title: &str, body: &str) -> String {
    let (head, tail) = PAGE_HTML.split_once("{{BODY}}").unwrap_or((PAGE_HTML, ""));
    let mut page = head.replace("{{TITLE}}", &escape_html(title));
    page.push_str(body);
    page.push_str(tail);
    page
}

pub fn render_range_selector(selected: RangeKey) -> String {
    let mut links = String::new();
    for option in RangeKey::ALL {
        let title = if option == selected {
            format!("<b>{}</b>", option.title())
        } else {
            option.title().to_string()
        };
        let _ = write!(
            links,
            "<span><a href=\"?range={}\">{}</a>&nbsp;</span>",
            option.as_str(),
            title
        );
    }
    format!("<div class=\"ranges\">Date range: {links}</div>")
}

fn header_href(range: RangeKey, next: Option<SortSpec>) -> String {
    match next {
        Some(spec) => format!(
            "?range={}&amp;sort={}&amp;order={}",
            range.as_str(),
            spec.column.key(),
            spec.direction.as_str()
        ),
        None => format!("?range={}", range.as_str()),
    }
}

fn render_cell(column: Column, record: &UrlStats) -> String {
    match column {
        Column::Url => format!(
            "<a href=\"{}\">{}</a>",
            safe_href(&record.mentioned_url),
            escape_html(record.link_text())
        ),
        Column::Mentions => record.mentions_count.to_string(),
        Column::InfluencerMentions => record.influencer_mentions_count.to_string(),
        Column::Quotes => record.quote_count.to_string(),
        Column::Retweets => record.retweet_count.to_string(),
        Column::MentionedBy => {
            let mut profiles = String::new();
            for username in &record.mentioned_by_influencers {
                let username = escape_html(username);
                let _ = write!(
                    profiles,
                    "<span><a href=\"https://twitter.com/{username}\">@{username}</a>&nbsp;</span>"
                );
            }
            format!("<span>{profiles}</span>")
        }
        Column::Tweets => format!("<a href=\"/tweets/{}\">View</a>", record.index),
    }
}

pub fn render_table(records: &[UrlStats], sort: Option<SortSpec>, range: RangeKey) -> String {
    let mut html = String::from("<table class=\"urls\">\n<thead>\n<tr>");
    for column in Column::ALL {
        let indicator = SortSpec::direction_for(sort, column)
            .map(|direction| direction.indicator())
            .unwrap_or_default();
        let _ = write!(
            html,
            "<th data-column=\"{}\"><a href=\"{}\">{}</a><span>{}</span></th>",
            column.key(),
            header_href(range, SortSpec::toggled(sort, column)),
            column.header(),
            indicator
        );
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for record in sorted_rows(records, sort) {
        let _ = write!(html, "<tr data-index=\"{}\">", record.index);
        for column in Column::ALL {
            let _ = write!(html, "<td>{}</td>", render_cell(column, record));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>");
    html
}

pub fn render_index(range: RangeKey, result: &FetchResult, sort: Option<SortSpec>) -> String {
    let updated = result
        .updated_at
        .map(|at| format!("<p class=\"updated\">Updated {}</p>", at.format("%Y-%m-%d %H:%M UTC")))
        .unwrap_or_default();
    let body = format!(
        "<br/>\n{}\n<br/>\n{}\n{}",
        render_range_selector(range),
        render_table(&result.records, sort, range),
        updated
    );
    render_page("Popular URLs", &body)
}

/// Tweet list for one record, or the not-found notice echoing the requested
/// id.
pub fn render_tweets(url_id: &str, record: Option<&UrlStats>) -> String {
    let Some(record) = record else {
        let body = format!("<div>URL not found! {}</div>", escape_html(url_id));
        return render_page("URL not found", &body);
    };

    let mut tweets = String::new();
    for url in &record.tweet_urls {
        let _ = writeln!(
            tweets,
            "<div><a href=\"{}\">{}</a></div>",
            safe_href(url),
            escape_html(url)
        );
    }
    render_page(record.link_text(), &format!("<div class=\"tweets\">\n{tweets}</div>"))
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    :root {
      --ink: #212529;
      --muted: #6c757d;
      --line: #dee2e6;
      --stripe: rgba(0, 0, 0, 0.05);
      --hover: rgba(0, 0, 0, 0.075);
      --link: #0d6efd;
    }

    body {
      margin: 0;
      padding: 0 16px 32px;
      color: var(--ink);
      font-family: -apple-system, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
      font-size: 0.95rem;
    }

    a {
      color: var(--link);
      text-decoration: none;
    }

    a:hover {
      text-decoration: underline;
    }

    table.urls {
      width: 100%;
      border-collapse: collapse;
      margin-top: 8px;
    }

    table.urls th,
    table.urls td {
      border: 1px solid var(--line);
      padding: 4px 6px;
      text-align: left;
      vertical-align: top;
    }

    table.urls th a {
      color: var(--ink);
    }

    table.urls tbody tr:nth-of-type(odd) {
      background: var(--stripe);
    }

    table.urls tbody tr:hover {
      background: var(--hover);
    }

    .updated {
      color: var(--muted);
      font-size: 0.85rem;
    }
  </style>
</head>
<body>
  <main class="App">
{{BODY}}
  </main>
</body>
</html>
"#;
