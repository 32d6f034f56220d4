//! Lightweight inline markdown for chat bubbles.
//!
//! Handles the inline subset assistant replies use:
//! - `**bold**` and `__bold__`
//! - `*italic*` and `_italic_`
//! - `` `inline code` ``
//!
//! Text is scanned once, left to right. At each position the delimiters are
//! tried in the order above (bold, italic, code, alternate bold, alternate
//! italic); the first one that closes later on the same line with at least one
//! character of content wins, and scanning resumes after its closing
//! delimiter. A delimiter closed immediately (`****`, ``` `` ```) is kept as
//! plain text and skipped whole. Anything else is plain text.

use eframe::egui;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Plain(String),
    Bold(String),
    Italic(String),
    Code(String),
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Segment::Plain(t) | Segment::Bold(t) | Segment::Italic(t) | Segment::Code(t) => t,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MarkerKind {
    Bold,
    Italic,
    Code,
}

impl MarkerKind {
    fn segment(self, content: &str) -> Segment {
        let content = content.to_string();
        match self {
            MarkerKind::Bold => Segment::Bold(content),
            MarkerKind::Italic => Segment::Italic(content),
            MarkerKind::Code => Segment::Code(content),
        }
    }
}

const MARKERS: [(&str, MarkerKind); 5] = [
    ("**", MarkerKind::Bold),
    ("*", MarkerKind::Italic),
    ("`", MarkerKind::Code),
    ("__", MarkerKind::Bold),
    ("_", MarkerKind::Italic),
];

/// Split `text` into classified segments.
pub fn render(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut pos = 0;

    while pos < text.len() {
        match match_at(text, pos) {
            Some(Match::Styled(kind, content, end)) => {
                if plain_start < pos {
                    segments.push(Segment::Plain(text[plain_start..pos].to_string()));
                }
                segments.push(kind.segment(content));
                pos = end;
                plain_start = end;
            }
            Some(Match::Empty(end)) => pos = end,
            None => {
                pos += text[pos..].chars().next().map_or(1, char::len_utf8);
            }
        }
    }

    if plain_start < text.len() {
        segments.push(Segment::Plain(text[plain_start..].to_string()));
    }
    segments
}

enum Match<'a> {
    /// Kind, inner content and the byte offset just past the closing delimiter
    Styled(MarkerKind, &'a str, usize),
    /// Opening delimiter directly followed by its close; plain up to the offset
    Empty(usize),
}

/// Try every delimiter at `pos`, in priority order.
fn match_at(text: &str, pos: usize) -> Option<Match<'_>> {
    let rest = &text[pos..];
    MARKERS.iter().find_map(|&(delim, kind)| {
        let body = rest.strip_prefix(delim)?;
        if body.starts_with(delim) {
            return Some(Match::Empty(pos + 2 * delim.len()));
        }
        let line = &body[..body.find('\n').unwrap_or(body.len())];
        // Content must be non-empty, so the close is searched after its first char
        let first = line.chars().next()?;
        let skip = first.len_utf8();
        let close = line[skip..].find(delim)? + skip;
        Some(Match::Styled(
            kind,
            &body[..close],
            pos + delim.len() + close + delim.len(),
        ))
    })
}

/// Lay out rendered segments inside a wrapping row.
pub fn show_segments(
    ui: &mut egui::Ui,
    segments: &[Segment],
    base_color: egui::Color32,
    code_bg: egui::Color32,
) {
    let base_size = 14.0;
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        for segment in segments {
            // Explicit newlines start a new row
            for (i, piece) in segment.text().split('\n').enumerate() {
                if i > 0 {
                    ui.end_row();
                }
                if piece.is_empty() {
                    continue;
                }
                let rich = egui::RichText::new(piece).size(base_size).color(base_color);
                let rich = match segment {
                    Segment::Plain(_) => rich,
                    Segment::Bold(_) => rich.strong(),
                    Segment::Italic(_) => rich.italics(),
                    Segment::Code(_) => rich.monospace().background_color(code_bg),
                };
                ui.label(rich);
            }
        }
    });
}
