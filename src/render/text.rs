use chrono::{DateTime, Utc};
use html_escape::decode_html_entities;

/// Turn an upstream HTML body into plain text.
///
/// Tags are dropped, `<p>` starts a new paragraph, `<br>` a new line, runs of
/// whitespace collapse to one space and entities are decoded last.
pub fn html_to_text(html: &str) -> String {
    let mut result = String::new();
    let mut tag = String::new();
    let mut in_tag = false;
    let mut last_was_space = false;

    for c in html.chars() {
        match c {
            '<' if !in_tag => {
                in_tag = true;
                tag.clear();
            }
            '>' if in_tag => {
                in_tag = false;
                match tag_name(&tag).as_str() {
                    "p" => {
                        trim_trailing_spaces(&mut result);
                        if !result.is_empty() {
                            result.push_str("\n\n");
                        }
                        last_was_space = true;
                    }
                    "br" => {
                        trim_trailing_spaces(&mut result);
                        result.push('\n');
                        last_was_space = true;
                    }
                    _ => {}
                }
            }
            _ if in_tag => tag.push(c),
            _ if c.is_whitespace() => {
                if !last_was_space {
                    result.push(' ');
                    last_was_space = true;
                }
            }
            _ => {
                result.push(c);
                last_was_space = false;
            }
        }
    }

    decode_html_entities(result.trim()).to_string()
}

fn tag_name(tag: &str) -> String {
    tag.trim()
        .trim_end_matches('/')
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_lowercase()
}

fn trim_trailing_spaces(s: &mut String) {
    while s.ends_with(' ') {
        s.pop();
    }
}

pub fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}
