//! Common post-processing for rendered prompts.
//!
//! A small recursive-descent segmenter splits a prompt into comma-separated
//! units while treating `(...)`, `[...]` and `{...}` groups as atomic, no
//! matter how deeply they nest. Backslash-escaped delimiters are literal
//! text. Parsing also balances groups: unclosed groups are closed at the end
//! and stray closers are dropped.

use std::collections::HashSet;
use std::iter::Peekable;
use std::str::Chars;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::prompt::budget::strip_weight_syntax;
use crate::core::prompt::lexicon::{is_filler, words};

static SPACE_BEFORE_STOP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+([.!?;:])").expect("static stop regex"));
static REPEATED_STOP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([.!?;])(?:\s*[.!?;])+").expect("static repeat regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Separator,
    Group {
        open: char,
        close: char,
        children: Vec<Node>,
    },
}

fn closer_for(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        _ => None,
    }
}

struct Segmenter<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Segmenter<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
        }
    }

    /// Parse until `closer` (or end of input when `None`).
    fn parse_sequence(&mut self, closer: Option<char>) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut buffer = String::new();

        let flush = |buffer: &mut String, nodes: &mut Vec<Node>| {
            if !buffer.is_empty() {
                nodes.push(Node::Text(std::mem::take(buffer)));
            }
        };

        while let Some(c) = self.chars.next() {
            match c {
                '\\' => {
                    buffer.push('\\');
                    if let Some(escaped) = self.chars.next() {
                        buffer.push(escaped);
                    }
                }
                c if Some(c) == closer => {
                    flush(&mut buffer, &mut nodes);
                    return nodes;
                }
                '(' | '[' | '{' => {
                    flush(&mut buffer, &mut nodes);
                    let close = closer_for(c).unwrap_or(c);
                    let children = self.parse_sequence(Some(close));
                    nodes.push(Node::Group {
                        open: c,
                        close,
                        children,
                    });
                }
                // Stray closer with no matching opener at this depth.
                ')' | ']' | '}' => {}
                ',' => {
                    flush(&mut buffer, &mut nodes);
                    nodes.push(Node::Separator);
                }
                c => buffer.push(c),
            }
        }

        flush(&mut buffer, &mut nodes);
        nodes
    }
}

fn parse(text: &str) -> Vec<Node> {
    Segmenter::new(text).parse_sequence(None)
}

/// Split a node sequence at top-level separators.
fn units(nodes: &[Node]) -> Vec<&[Node]> {
    nodes.split(|node| *node == Node::Separator).collect()
}

fn render_unit(unit: &[Node]) -> String {
    let mut out = String::new();
    for node in unit {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Group {
                open,
                close,
                children,
            } => {
                let inner = render_sequence(children);
                if inner.chars().any(char::is_alphanumeric) {
                    out.push(*open);
                    out.push_str(&inner);
                    out.push(*close);
                }
            }
            Node::Separator => {}
        }
    }
    tidy(&out)
}

fn render_sequence(nodes: &[Node]) -> String {
    units(nodes)
        .into_iter()
        .map(render_unit)
        .filter(|unit| unit.chars().any(char::is_alphanumeric))
        .collect::<Vec<_>>()
        .join(", ")
}

fn tidy(unit: &str) -> String {
    let collapsed = unit.split_whitespace().collect::<Vec<_>>().join(" ");
    let collapsed = SPACE_BEFORE_STOP_RE.replace_all(&collapsed, "$1");
    let collapsed = REPEATED_STOP_RE.replace_all(&collapsed, "$1");
    collapsed
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ';' | ':'))
        .trim_end()
        .to_string()
}

/// Collapse repeated separators and spaces, balance bracket groups and drop
/// empty ones.
pub fn normalize_punctuation(text: &str) -> String {
    render_sequence(&parse(text))
}

fn significant_words(unit: &str) -> HashSet<String> {
    words(&strip_weight_syntax(unit))
        .filter(|w| w.chars().count() > 3 && !is_filler(w))
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit() || c == '.'))
        .collect()
}

/// Remove duplicate units. Bracketed groups are compared as whole units. A
/// unit is also dropped when every significant word in it (longer than three
/// characters, not filler) was already introduced by an earlier unit.
pub fn remove_duplicates(text: &str) -> String {
    let nodes = parse(text);
    let mut seen_units: HashSet<String> = HashSet::new();
    let mut seen_words: HashSet<String> = HashSet::new();
    let mut kept: Vec<String> = Vec::new();

    for unit in units(&nodes) {
        let rendered = render_unit(unit);
        if !rendered.chars().any(char::is_alphanumeric) {
            continue;
        }
        let key = rendered.to_lowercase();
        if !seen_units.insert(key) {
            continue;
        }
        let significant = significant_words(&rendered);
        if !significant.is_empty() && significant.is_subset(&seen_words) {
            continue;
        }
        seen_words.extend(significant);
        kept.push(rendered);
    }

    kept.join(", ")
}

/// Normalization followed by duplicate removal.
pub fn finalize(text: &str) -> String {
    remove_duplicates(&normalize_punctuation(text))
}
