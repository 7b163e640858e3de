//! Terminal rendering of a finished fetch

use crate::types::{ChannelRecord, SessionResult, VideoRow};
use colored::Colorize;

const TITLE_WIDTH: usize = 48;

/// Group digits in threes: 1234567 -> "1,234,567"
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Cut a title to `width` characters, marking the cut with an ellipsis
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Label shown for each channel attribute; `None` for the title line
fn attribute_label(key: &str) -> Option<&'static str> {
    match key {
        "subscribers" => Some("Subscribers:"),
        "video_count" => Some("Total Videos:"),
        "total_views" => Some("Total Views:"),
        "thumbnail" => Some("Thumbnail:"),
        _ => None,
    }
}

/// Header lines built from the channel attribute mapping
pub fn header_lines(channel: &ChannelRecord) -> Vec<String> {
    let mut title = String::new();
    let mut counts = Vec::new();
    let mut thumbnail = None;

    for (key, value) in channel.attributes() {
        match (key, attribute_label(key)) {
            ("title", _) => title = value,
            ("thumbnail", Some(label)) => {
                if !value.is_empty() {
                    thumbnail = Some(format!("{} {}", label.dimmed(), value));
                }
            }
            (_, Some(label)) => {
                let shown = value.parse().map(format_count).unwrap_or(value);
                counts.push(format!("{} {}", label.dimmed(), shown));
            }
            (_, None) => {}
        }
    }

    let mut lines = vec![title.bold().to_string(), counts.join(" | ")];
    lines.extend(thumbnail);
    lines
}

fn render_header(channel: &ChannelRecord) {
    for line in header_lines(channel) {
        println!("{}", line);
    }
}

/// One table line; rows without statistics show "n/a" instead of zeros
pub fn format_row(row: &VideoRow) -> String {
    let (views, likes, comments) = if row.stats_available {
        (
            format_count(row.views),
            format_count(row.likes),
            format_count(row.comments),
        )
    } else {
        ("n/a".into(), "n/a".into(), "n/a".into())
    };
    format!(
        "{:<10}  {:>12}  {:>9}  {:>8}  {:<width$}  {}",
        truncate(&row.published, 10),
        views,
        likes,
        comments,
        truncate(&row.title, TITLE_WIDTH),
        row.video_id,
        width = TITLE_WIDTH
    )
}

/// Print the channel header and the first `rows` videos
pub fn render(result: &SessionResult, rows: usize) {
    render_header(&result.channel);
    println!();

    if result.videos.is_empty() {
        println!("{}", "No videos found for this channel.".yellow());
        return;
    }

    println!(
        "{}",
        format!(
            "{:<10}  {:>12}  {:>9}  {:>8}  {:<width$}  {}",
            "Published",
            "Views",
            "Likes",
            "Comments",
            "Title",
            "Video ID",
            width = TITLE_WIDTH
        )
        .bold()
    );
    for row in result.videos.iter().take(rows) {
        println!("{}", format_row(row));
    }

    println!();
    println!(
        "{}",
        format!(
            "Showing {} of {} videos",
            rows.min(result.videos.len()),
            result.videos.len()
        )
        .dimmed()
    );

    let missing = result.videos.iter().filter(|v| !v.stats_available).count();
    if missing > 0 {
        println!(
            "{} {}",
            "Warning:".yellow(),
            format!(
                "statistics unavailable for {} videos. Try again or check API quota.",
                missing
            )
        );
    }
}
