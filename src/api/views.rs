//! HTML views for browser clients.

use crate::config::Config;
use crate::store::Page;

use chrono::{DateTime, Utc};

fn selector_label(selector: &str) -> String {
    match selector {
        "0" => "Never".to_string(),
        "1" => "1 day".to_string(),
        days => format!("{} days", days),
    }
}

fn expiration_select(config: &Config) -> String {
    config
        .retention_options
        .selectors()
        .map(|s| {
            let selected = if s == "7" { " selected" } else { "" };
            format!(
                r#"<option value="{value}"{selected}>{label}</option>"#,
                value = html_escape::encode_double_quoted_attribute(s),
                label = html_escape::encode_text(&selector_label(s)),
            )
        })
        .collect()
}

fn layout(body: &str) -> String {
    format!(
        r#"<!doctype html>
<html><head><meta charset="utf-8"><title>HTML Drop</title></head>
<body>{body}</body></html>"#
    )
}

fn upload_form(config: &Config) -> String {
    format!(
        r#"<h1>Share an HTML page</h1>
<form action="/upload" method="post" enctype="multipart/form-data">
<p><textarea name="html_content" rows="16" cols="80" placeholder="Paste HTML here"></textarea></p>
<p>or upload a file: <input type="file" name="html_file" accept=".html,.htm,text/html"></p>
<p>Expires after: <select name="expiration">{options}</select></p>
<p><small>Maximum size: {max:.1}MB</small></p>
<p><button type="submit">Upload</button></p>
</form>"#,
        options = expiration_select(config),
        max = config.max_upload_size_mb(),
    )
}

/// Upload form page.
pub fn index_page(config: &Config) -> String {
    layout(&upload_form(config))
}

/// Upload form page with the link of the page just created.
pub fn success_page(config: &Config, page: &Page, link: &str, now: DateTime<Utc>) -> String {
    let link = html_escape::encode_double_quoted_attribute(link);
    let expires = match page.expires_at {
        Some(at) => format!("Expires {}", at.format("%Y-%m-%d %H:%M UTC")),
        None => "Never expires".to_string(),
    };

    layout(&format!(
        r#"<section><h2>Your page is live</h2>
<p><a href="{link}">{link}</a></p>
<p>{expires} ({remaining})</p></section>
{form}"#,
        expires = html_escape::encode_text(&expires),
        remaining = html_escape::encode_text(&page.time_remaining(now)),
        form = upload_form(config),
    ))
}
