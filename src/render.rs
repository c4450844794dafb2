//! Detail panel markup for a county record.

use crate::types::{Category, DemographicRecord, Grouping, Leaf, Metric};
use std::fmt::Write;

pub const PLACEHOLDER: &str = "Click on a county-equivalent to see demographic details.";

/// Full panel: name, population and the demographics block.
pub fn render_panel(record: &DemographicRecord) -> String {
    format!(
        "<b>{}</b><br>Population: {}<br>Demographics: <br>{}",
        escape(&record.name),
        record.population,
        render_demographics(&record.demographics)
    )
}

/// One heading and list per category, in input order.
pub fn render_demographics(demographics: &Grouping) -> String {
    let mut html = String::new();
    for (category, value) in demographics {
        let _ = write!(html, "<b>{}</b><ul>", escape(&heading(category)));
        let entries = match value {
            Category::Entries(entries) => entries,
            Category::Value(leaf) => {
                let _ = write!(html, "<li>{}</li></ul>", format_leaf(leaf));
                continue;
            }
        };
        for (key, metric) in entries {
            match metric {
                Metric::Nested(values) => {
                    let _ = write!(html, "<li>{}:<ul>", escape(key));
                    for (subkey, leaf) in values {
                        let _ = write!(html, "<li>{}: {}</li>", escape(subkey), format_leaf(leaf));
                    }
                    html.push_str("</ul></li>");
                }
                Metric::Value(leaf) => {
                    let _ = write!(html, "<li>{}: {}</li>", escape(key), format_leaf(leaf));
                }
            }
        }
        html.push_str("</ul>");
    }
    html
}

pub fn format_leaf(leaf: &Leaf) -> String {
    match leaf {
        Leaf::Number(n) => to_fixed(*n, 5),
        Leaf::Text(s) => escape(s),
    }
}

// Every finite f64 has an exact decimal expansion within this many fraction digits.
const EXACT_FRACTION_DIGITS: usize = 1074;

/// Fixed-point formatting that rounds exact ties away from zero and prints
/// negative zero without a sign.
pub fn to_fixed(n: f64, digits: usize) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let exact = format!("{:.*}", EXACT_FRACTION_DIGITS, n.abs());
    let (int_part, fraction) = exact.split_once('.').unwrap_or((exact.as_str(), ""));

    let mut kept: Vec<u8> = int_part
        .bytes()
        .chain(fraction.bytes().chain(std::iter::repeat(b'0')).take(digits))
        .collect();
    if fraction.as_bytes().get(digits).is_some_and(|d| *d >= b'5') {
        let mut carry = true;
        for d in kept.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            kept.insert(0, b'1');
        }
    }

    let split = kept.len() - digits;
    let mut out = String::with_capacity(kept.len() + 2);
    if n < 0.0 {
        out.push('-');
    }
    out.extend(kept[..split].iter().map(|&d| d as char));
    if digits > 0 {
        out.push('.');
        out.extend(kept[split..].iter().map(|&d| d as char));
    }
    out
}

/// Upper-cases the first letter of each whitespace-delimited word, lower-cases the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut word_start = true;
    for ch in s.chars() {
        if ch.is_whitespace() {
            out.push(ch);
            word_start = true;
        } else if word_start {
            out.extend(ch.to_uppercase());
            word_start = false;
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

fn heading(category: &str) -> String {
    title_case(category).replace('_', " ")
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
