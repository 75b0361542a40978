//! Markdown subset renderer for assistant messages.
//!
//! The backend answers use a small markdown dialect: `#`/`##`/`###`
//! headings, `**bold**`, `*italic*`, numbered lists, a labeled
//! "[자세히 보기] <url>" link form, and bare URLs. Instead of a chain of
//! string substitutions, the input is parsed into an intermediate
//! representation once; spans that already became links are never
//! rescanned, so the transforms cannot corrupt each other's output.
//!
//! Transform order matters and is fixed:
//! headings (longest prefix first), bold, italic, line breaks,
//! numbered list items, labeled links, then bare-URL autolinks.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Literal label that collapses with a following URL into one anchor.
const DETAIL_LINK_LABEL: &str = "자세히 보기";
const DETAIL_LINK_MARKER: &str = "[자세히 보기]";

/// A parsed assistant message.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// `#`..`###` heading line.
    Heading { level: u8, spans: Vec<Inline> },
    /// `N. ` list entry; continuation lines stay attached to the entry.
    ListItem { number: String, lines: Vec<Vec<Inline>> },
    /// Any other line. Newlines in the input become separate blocks.
    Line(Vec<Inline>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Strong(String),
    Em(String),
    Link { label: String, url: String },
}

/// Parse a message into its display representation. Pure and deterministic.
pub fn render(input: &str) -> Document {
    let mut blocks: Vec<Block> = Vec::new();

    for line in input.split('\n') {
        let trimmed = line.trim_start();

        // Longest prefix first so "### x" is not taken as a level-1 heading.
        if let Some((level, rest)) = heading_line(trimmed) {
            blocks.push(Block::Heading {
                level,
                spans: parse_inline(rest),
            });
            continue;
        }

        if let Some((number, rest)) = list_item_line(trimmed) {
            blocks.push(Block::ListItem {
                number,
                lines: vec![parse_inline(rest)],
            });
            continue;
        }

        // A non-empty line right after a list entry continues that entry;
        // the entry stops at the next marker, heading, or blank line.
        if !trimmed.is_empty() {
            if let Some(Block::ListItem { lines, .. }) = blocks.last_mut() {
                lines.push(parse_inline(trimmed));
                continue;
            }
        }

        blocks.push(Block::Line(parse_inline(line)));
    }

    Document { blocks }
}

fn heading_line(trimmed: &str) -> Option<(u8, &str)> {
    for (marker, level) in [("###", 3u8), ("##", 2), ("#", 1)] {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            if rest.starts_with(char::is_whitespace) {
                return Some((level, rest.trim_start()));
            }
        }
    }
    None
}

fn list_item_line(trimmed: &str) -> Option<(String, &str)> {
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    if digits_end == 0 {
        return None;
    }
    let rest = trimmed[digits_end..].strip_prefix('.')?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some((trimmed[..digits_end].to_string(), rest.trim_start()))
}

/// Inline transforms applied in order over plain-text segments only.
fn parse_inline(text: &str) -> Vec<Inline> {
    let mut spans = vec![Inline::Text(text.to_string())];
    spans = split_pass(spans, split_bold);
    spans = split_pass(spans, split_italic);
    spans = split_pass(spans, split_labeled_link);
    spans = split_pass(spans, split_bare_url);
    spans.retain(|s| !matches!(s, Inline::Text(t) if t.is_empty()));
    spans
}

fn split_pass(spans: Vec<Inline>, f: fn(&str) -> Vec<Inline>) -> Vec<Inline> {
    let mut out = Vec::new();
    for span in spans {
        match span {
            Inline::Text(text) => out.extend(f(&text)),
            other => out.push(other),
        }
    }
    out
}

fn split_bold(text: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("**") {
        match rest[start + 2..].find("**") {
            Some(inner_len) => {
                out.push(Inline::Text(rest[..start].to_string()));
                out.push(Inline::Strong(rest[start + 2..start + 2 + inner_len].to_string()));
                rest = &rest[start + 4 + inner_len..];
            }
            // unmatched marker stays literal
            None => break,
        }
    }
    out.push(Inline::Text(rest.to_string()));
    out
}

fn split_italic(text: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find('*') {
        match rest[start + 1..].find('*') {
            Some(inner_len) => {
                out.push(Inline::Text(rest[..start].to_string()));
                out.push(Inline::Em(rest[start + 1..start + 1 + inner_len].to_string()));
                rest = &rest[start + 2 + inner_len..];
            }
            None => break,
        }
    }
    out.push(Inline::Text(rest.to_string()));
    out
}

fn split_labeled_link(text: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find(DETAIL_LINK_MARKER) {
        let after_label = &rest[start + DETAIL_LINK_MARKER.len()..];
        let url_start = after_label.len() - after_label.trim_start().len();
        match absolute_url_at(&after_label[url_start..]) {
            Some(url_len) => {
                let url = &after_label[url_start..url_start + url_len];
                out.push(Inline::Text(rest[..start].to_string()));
                out.push(Inline::Link {
                    label: DETAIL_LINK_LABEL.to_string(),
                    url: url.to_string(),
                });
                rest = &after_label[url_start + url_len..];
            }
            None => {
                // label without a URL stays literal text
                out.push(Inline::Text(
                    rest[..start + DETAIL_LINK_MARKER.len()].to_string(),
                ));
                rest = after_label;
            }
        }
    }
    out.push(Inline::Text(rest.to_string()));
    out
}

fn split_bare_url(text: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(start) = find_url_start(rest) {
        let url_len = absolute_url_at(&rest[start..]).unwrap_or(0);
        let url = rest[start..start + url_len].to_string();
        out.push(Inline::Text(rest[..start].to_string()));
        out.push(Inline::Link {
            label: url.clone(),
            url,
        });
        rest = &rest[start + url_len..];
    }
    out.push(Inline::Text(rest.to_string()));
    out
}

fn find_url_start(text: &str) -> Option<usize> {
    let http = text.find("http://");
    let https = text.find("https://");
    match (http, https) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

/// Length of the absolute http(s) URL at the start of `text`, if any.
fn absolute_url_at(text: &str) -> Option<usize> {
    if !text.starts_with("http://") && !text.starts_with("https://") {
        return None;
    }
    let end = text
        .find(char::is_whitespace)
        .unwrap_or(text.len());
    Some(end)
}

impl Document {
    /// Every anchor target, in document order. The order matches the
    /// indices assigned during [`Document::to_lines`].
    pub fn links(&self) -> Vec<String> {
        let mut links = Vec::new();
        let mut collect = |spans: &[Inline]| {
            for span in spans {
                if let Inline::Link { url, .. } = span {
                    links.push(url.clone());
                }
            }
        };
        for block in &self.blocks {
            match block {
                Block::Heading { spans, .. } => collect(spans),
                Block::Line(spans) => collect(spans),
                Block::ListItem { lines, .. } => {
                    for line in lines {
                        collect(line);
                    }
                }
            }
        }
        links
    }

    /// Project to styled terminal lines. Links get consecutive indices
    /// starting at `link_base`; the one matching `selected` is highlighted.
    pub fn to_lines(&self, link_base: usize, selected: Option<usize>) -> Vec<Line<'static>> {
        let mut next_link = link_base;
        let mut lines = Vec::new();

        for block in &self.blocks {
            match block {
                Block::Heading { level, spans } => {
                    let style = heading_style(*level);
                    lines.push(Line::from(spans_to_ratatui(
                        spans,
                        style,
                        &mut next_link,
                        selected,
                    )));
                }
                Block::Line(spans) => {
                    lines.push(Line::from(spans_to_ratatui(
                        spans,
                        Style::default().fg(Color::White),
                        &mut next_link,
                        selected,
                    )));
                }
                Block::ListItem { number, lines: item_lines } => {
                    for (i, item_line) in item_lines.iter().enumerate() {
                        let mut spans = Vec::new();
                        if i == 0 {
                            spans.push(Span::styled(
                                format!("  {}. ", number),
                                Style::default().fg(Color::White),
                            ));
                        } else {
                            spans.push(Span::raw("     "));
                        }
                        spans.extend(spans_to_ratatui(
                            item_line,
                            Style::default().fg(Color::White),
                            &mut next_link,
                            selected,
                        ));
                        lines.push(Line::from(spans));
                    }
                }
            }
        }

        lines
    }
}

fn heading_style(level: u8) -> Style {
    let color = match level {
        1 => Color::LightGreen,
        2 => Color::LightCyan,
        _ => Color::Cyan,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn spans_to_ratatui(
    spans: &[Inline],
    base: Style,
    next_link: &mut usize,
    selected: Option<usize>,
) -> Vec<Span<'static>> {
    let mut out = Vec::new();
    for span in spans {
        match span {
            Inline::Text(text) => out.push(Span::styled(text.clone(), base)),
            Inline::Strong(text) => {
                out.push(Span::styled(text.clone(), base.add_modifier(Modifier::BOLD)))
            }
            Inline::Em(text) => {
                out.push(Span::styled(text.clone(), base.add_modifier(Modifier::ITALIC)))
            }
            Inline::Link { label, .. } => {
                let index = *next_link;
                *next_link += 1;
                let style = if selected == Some(index) {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED)
                };
                out.push(Span::styled(label.clone(), style));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_text(doc: &Document) -> String {
        let mut out = String::new();
        let mut push_spans = |spans: &[Inline]| {
            for span in spans {
                match span {
                    Inline::Text(t) | Inline::Strong(t) | Inline::Em(t) => out.push_str(t),
                    Inline::Link { label, .. } => out.push_str(label),
                }
            }
        };
        for block in &doc.blocks {
            match block {
                Block::Heading { spans, .. } | Block::Line(spans) => push_spans(spans),
                Block::ListItem { lines, .. } => {
                    for line in lines {
                        push_spans(line);
                    }
                }
            }
        }
        out
    }

    #[test]
    fn bold_and_italic_leave_no_markers() {
        let doc = render("**bold** and *italic*");
        assert_eq!(
            doc.blocks,
            vec![Block::Line(vec![
                Inline::Strong("bold".into()),
                Inline::Text(" and ".into()),
                Inline::Em("italic".into()),
            ])]
        );
        assert!(!plain_text(&doc).contains('*'));
    }

    #[test]
    fn level_three_heading_not_misread_as_level_one() {
        let doc = render("### Title");
        assert_eq!(
            doc.blocks,
            vec![Block::Heading {
                level: 3,
                spans: vec![Inline::Text("Title".into())],
            }]
        );

        let doc = render("## 소개");
        assert!(matches!(doc.blocks[0], Block::Heading { level: 2, .. }));
        let doc = render("# 소개");
        assert!(matches!(doc.blocks[0], Block::Heading { level: 1, .. }));
    }

    #[test]
    fn hash_without_following_whitespace_is_not_a_heading() {
        let doc = render("#태그");
        assert!(matches!(doc.blocks[0], Block::Line(_)));
    }

    #[test]
    fn consecutive_numbered_lines_stay_separate_entries() {
        let doc = render("1. a\n2. b");
        assert_eq!(
            doc.blocks,
            vec![
                Block::ListItem {
                    number: "1".into(),
                    lines: vec![vec![Inline::Text("a".into())]],
                },
                Block::ListItem {
                    number: "2".into(),
                    lines: vec![vec![Inline::Text("b".into())]],
                },
            ]
        );
    }

    #[test]
    fn list_entry_consumes_continuation_until_next_marker() {
        let doc = render("1. 첫째\n내용 계속\n2. 둘째");
        assert_eq!(doc.blocks.len(), 2);
        match &doc.blocks[0] {
            Block::ListItem { lines, .. } => assert_eq!(lines.len(), 2),
            other => panic!("expected list item, got {other:?}"),
        }
    }

    #[test]
    fn labeled_link_collapses_label_and_url() {
        let doc = render("[자세히 보기] https://youth.seoul.go.kr/x");
        assert_eq!(
            doc.blocks,
            vec![Block::Line(vec![Inline::Link {
                label: "자세히 보기".into(),
                url: "https://youth.seoul.go.kr/x".into(),
            }])]
        );
        // the raw URL must not survive outside the anchor
        assert_eq!(plain_text(&doc), "자세히 보기");
        assert_eq!(doc.links(), vec!["https://youth.seoul.go.kr/x".to_string()]);
    }

    #[test]
    fn labeled_link_without_url_stays_literal() {
        let doc = render("[자세히 보기] 링크 없음");
        assert_eq!(plain_text(&doc), "[자세히 보기] 링크 없음");
        assert!(doc.links().is_empty());
    }

    #[test]
    fn bare_url_becomes_self_labeled_link() {
        let doc = render("참고: https://youth.seoul.go.kr/policy/1 입니다");
        assert_eq!(
            doc.blocks,
            vec![Block::Line(vec![
                Inline::Text("참고: ".into()),
                Inline::Link {
                    label: "https://youth.seoul.go.kr/policy/1".into(),
                    url: "https://youth.seoul.go.kr/policy/1".into(),
                },
                Inline::Text(" 입니다".into()),
            ])]
        );
    }

    #[test]
    fn labeled_link_url_is_not_autolinked_twice() {
        let doc = render("[자세히 보기] https://youth.seoul.go.kr/x 그리고 https://example.com");
        assert_eq!(
            doc.links(),
            vec![
                "https://youth.seoul.go.kr/x".to_string(),
                "https://example.com".to_string(),
            ]
        );
    }

    #[test]
    fn newlines_become_separate_lines() {
        let doc = render("첫 줄\n둘째 줄");
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.to_lines(0, None).len(), 2);
    }

    #[test]
    fn bold_inside_heading_is_styled() {
        let doc = render("### **중요** 안내");
        match &doc.blocks[0] {
            Block::Heading { level: 3, spans } => {
                assert_eq!(spans[0], Inline::Strong("중요".into()));
            }
            other => panic!("expected heading, got {other:?}"),
        }
    }

    #[test]
    fn link_indices_follow_document_order() {
        let doc = render("https://a.example/1\nhttps://a.example/2");
        let lines = doc.to_lines(3, Some(4));
        // second link (index 4) is the selected, yellow one
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].spans[0].style.fg, Some(Color::Yellow));
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::Blue));
    }
}
