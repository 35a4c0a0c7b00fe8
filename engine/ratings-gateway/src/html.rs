//! Server-rendered ranked table
//!
//! Renders the same rows as `/api/power-rankings` into a single HTML page.
//! Each metric cell is shaded by its percentile.

use rating_engine::{format_rating, percentile_color, Metric, RankedTeam};
use std::fmt::Write;

const STYLE: &str = "body{font-family:-apple-system,Helvetica,Arial,sans-serif;margin:24px;color:#202124}\
table{border-collapse:collapse;min-width:640px}\
th,td{padding:6px 10px;border-bottom:1px solid #e0e0e0;text-align:center}\
th{background:#202124;color:#fff;font-weight:600}\
td.team{text-align:left;font-weight:600;white-space:nowrap}\
td.team img{width:24px;height:24px;vertical-align:middle;margin-right:8px}";

/// Escape text for use in element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Team label: the school, or the rating name when unmatched, in upper case
fn team_label(ranked: &RankedTeam) -> String {
    ranked.team.display_name().to_uppercase()
}

fn write_row(out: &mut String, ranked: &RankedTeam) {
    let meta = ranked.team.metadata.as_ref();
    let logo = match meta.and_then(|m| m.logo_url.as_deref()) {
        Some(url) => format!(
            "<img src=\"{}\" alt=\"{}\">",
            escape_html(url),
            escape_html(&ranked.team.rating.team_name)
        ),
        None => String::new(),
    };
    let conference = meta.and_then(|m| m.conference.as_deref()).unwrap_or("");

    let _ = write!(
        out,
        "<tr><td>{}</td><td class=\"team\">{}{}</td><td>{}</td>",
        ranked.rank,
        logo,
        escape_html(&team_label(ranked)),
        escape_html(conference)
    );
    for metric in Metric::ALL {
        let percentile = ranked.percentiles.get(metric);
        let _ = write!(
            out,
            "<td style=\"background:{}\" title=\"{} percentile\">{}</td>",
            percentile_color(percentile),
            percentile,
            format_rating(ranked.team.rating.metric(metric))
        );
    }
    out.push_str("</tr>");
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{}</title><style>{}</style></head><body>{}</body></html>",
        escape_html(title),
        STYLE,
        body
    )
}

/// Full page for one season's ranked table
pub fn render_rankings_page(season: i32, table: &[RankedTeam]) -> String {
    let title = format!("{season} Power Ratings");
    let mut body = format!("<h1>{}</h1>", escape_html(&title));

    if table.is_empty() {
        let _ = write!(body, "<p>No ratings available for {season}.</p>");
        return page(&title, &body);
    }

    body.push_str(
        "<table><thead><tr><th>RK</th><th>TEAM</th><th>CONF</th>\
         <th>PWR</th><th>OFF</th><th>DEF</th><th>SOS</th></tr></thead><tbody>",
    );
    for ranked in table {
        write_row(&mut body, ranked);
    }
    body.push_str("</tbody></table>");

    page(&title, &body)
}

/// Page shown when the ratings could not be loaded
pub fn render_error_page(message: &str) -> String {
    page("Error", &format!("<h1>Error</h1><p>{}</p>", escape_html(message)))
}
