//! Terminal rendering for comment and message bodies.

use console::Style;
use pulldown_cmark::{Event, HeadingLevel, Options as MarkdownOptions, Parser, Tag, TagEnd};
use regex::Regex;
use std::sync::LazyLock;

const MENTION_SCHEME: &str = "twist-mention://";

static MENTION_LINK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\((twist-mention://\d+)\)").ok());

/// Turns `[Name](twist-mention://1)` into `[@Name](twist-mention://1)`.
pub fn preprocess_mentions(content: &str) -> String {
    match MENTION_LINK.as_ref() {
        Some(re) => re.replace_all(content, "[@$1]($2)").into_owned(),
        None => content.to_string(),
    }
}

pub fn render_markdown(content: &str) -> String {
    let processed = preprocess_mentions(content);
    let mut options = MarkdownOptions::empty();
    options.insert(MarkdownOptions::ENABLE_STRIKETHROUGH);
    options.insert(MarkdownOptions::ENABLE_TASKLISTS);

    let mut renderer = Renderer::default();
    for event in Parser::new_ext(&processed, options) {
        renderer.event(event);
    }
    renderer.out.trim_end().to_string()
}

#[derive(Default)]
struct Renderer {
    out: String,
    bold: usize,
    italic: usize,
    strike: usize,
    heading: Option<HeadingLevel>,
    quote_depth: usize,
    lists: Vec<Option<u64>>,
    link: Option<String>,
    in_code_block: bool,
}

impl Renderer {
    fn style(&self) -> Style {
        let mut style = Style::new();
        if self.bold > 0 || self.heading.is_some() {
            style = style.bold();
        }
        if self.italic > 0 {
            style = style.italic();
        }
        if self.strike > 0 {
            style = style.strikethrough();
        }
        if matches!(self.heading, Some(HeadingLevel::H1 | HeadingLevel::H2)) {
            style = style.underlined();
        }
        if let Some(dest) = &self.link {
            style = if dest.starts_with(MENTION_SCHEME) {
                style.cyan().bold()
            } else {
                style.blue()
            };
        }
        if self.quote_depth > 0 {
            style = style.dim();
        }
        style
    }

    fn line_start(&mut self) {
        if self.out.ends_with('\n') || self.out.is_empty() {
            for _ in 0..self.quote_depth {
                self.out.push_str("│ ");
            }
        }
    }

    fn block_break(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            if !self.out.ends_with('\n') {
                self.out.push('\n');
            }
            if self.lists.is_empty() {
                self.out.push('\n');
            }
        }
    }

    fn text(&mut self, text: &str) {
        self.line_start();
        let styled = self.style().apply_to(text).to_string();
        self.out.push_str(&styled);
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if self.in_code_block {
                    for line in text.split_inclusive('\n') {
                        self.line_start();
                        self.out.push_str("    ");
                        self.out
                            .push_str(&Style::new().yellow().apply_to(line).to_string());
                    }
                } else {
                    self.text(&text);
                }
            }
            Event::Code(code) => {
                self.line_start();
                self.out
                    .push_str(&Style::new().yellow().apply_to(code.as_ref()).to_string());
            }
            Event::SoftBreak | Event::HardBreak => self.out.push('\n'),
            Event::Rule => {
                self.block_break();
                self.out.push_str(&Style::new().dim().apply_to("─".repeat(40)).to_string());
                self.out.push('\n');
            }
            Event::TaskListMarker(done) => {
                self.out.push_str(if done { "[x] " } else { "[ ] " });
            }
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.block_break(),
            Tag::Heading { level, .. } => {
                self.block_break();
                self.heading = Some(level);
            }
            Tag::BlockQuote(_) => {
                self.block_break();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(_) => {
                self.block_break();
                self.in_code_block = true;
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.block_break();
                } else if !self.out.ends_with('\n') {
                    self.out.push('\n');
                }
                self.lists.push(start);
            }
            Tag::Item => {
                if !self.out.is_empty() && !self.out.ends_with('\n') {
                    self.out.push('\n');
                }
                self.line_start();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}.");
                        *n += 1;
                        marker
                    }
                    _ => "•".to_string(),
                };
                self.out.push_str(&format!("{indent}{marker} "));
            }
            Tag::Emphasis => self.italic += 1,
            Tag::Strong => self.bold += 1,
            Tag::Strikethrough => self.strike += 1,
            Tag::Link { dest_url, .. } => self.link = Some(dest_url.to_string()),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.out.push('\n'),
            TagEnd::Heading(_) => {
                self.heading = None;
                self.out.push('\n');
            }
            TagEnd::BlockQuote(_) => self.quote_depth = self.quote_depth.saturating_sub(1),
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                if !self.out.ends_with('\n') {
                    self.out.push('\n');
                }
            }
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() && !self.out.ends_with('\n') {
                    self.out.push('\n');
                }
            }
            TagEnd::Emphasis => self.italic = self.italic.saturating_sub(1),
            TagEnd::Strong => self.bold = self.bold.saturating_sub(1),
            TagEnd::Strikethrough => self.strike = self.strike.saturating_sub(1),
            TagEnd::Link => {
                if let Some(dest) = self.link.take()
                    && !dest.starts_with(MENTION_SCHEME)
                {
                    self.out
                        .push_str(&Style::new().dim().apply_to(format!(" ({dest})")).to_string());
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_mentions() {
        assert_eq!(
            preprocess_mentions("hi [Ana](twist-mention://12) and [docs](https://x.y)"),
            "hi [@Ana](twist-mention://12) and [docs](https://x.y)"
        );
    }

    #[test]
    fn renders_plain_text_content() {
        let rendered = console::strip_ansi_codes(&render_markdown(
            "# Title\n\nSome **bold** text\n\n- one\n- two\n\n[Ana](twist-mention://3)",
        ))
        .to_string();
        assert!(rendered.contains("Title"));
        assert!(rendered.contains("Some bold text"));
        assert!(rendered.contains("• one"));
        assert!(rendered.contains("• two"));
        assert!(rendered.contains("@Ana"));
        assert!(!rendered.contains("twist-mention"));
    }

    #[test]
    fn shows_link_targets() {
        let rendered =
            console::strip_ansi_codes(&render_markdown("see [docs](https://example.com)")).to_string();
        assert_eq!(rendered, "see docs (https://example.com)");
    }
}
