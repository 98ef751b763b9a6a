//! Markdown to Typst markup transpiler
//!
//! Converts the markdown event stream into a Typst document carrying the
//! same cover page, table of contents and heading anchors as the composed
//! HTML. Raw HTML in the source has no Typst counterpart and is dropped.

use pressmark_core::markdown::markdown_options;
use pressmark_core::{slug, Cover};
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag};

/// Deepest heading level listed in the generated outline
const OUTLINE_DEPTH: u8 = 2;

/// Open markdown container
#[derive(Debug)]
enum Frame {
    Paragraph,
    Heading { text: String },
    Quote,
    Code { lang: String, text: String },
    List { next: Option<u64> },
    Item,
    Footnote,
    Table,
    TableHead,
    TableRow,
    TableCell,
    Strong,
    Emphasis,
    Strikethrough,
    Link { external: bool },
    Image,
    Html,
    Other,
}

/// Transpiler for converting markdown to Typst markup
#[derive(Debug, Default)]
pub struct Transpiler {
    out: String,
    stack: Vec<Frame>,
}

impl Transpiler {
    /// Transpile a full document: settings, cover, outline and body
    pub fn transpile(source: &str, cover: &Cover) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "#set document(title: \"{}\")\n",
            escape_string(&cover.title)
        ));
        output.push_str("#set page(paper: \"a4\", margin: 2cm)\n");
        output.push_str("#set text(size: 11pt)\n");
        output.push_str("#set par(justify: true)\n\n");

        output.push_str(&Self::transpile_cover(cover));
        output.push_str("#pagebreak()\n\n");
        output.push_str(&format!(
            "#outline(title: [Table of Contents], depth: {})\n",
            OUTLINE_DEPTH
        ));
        output.push_str("#pagebreak()\n\n");

        output.push_str(&Self::transpile_body(source));
        output
    }

    /// Transpile the cover page block
    pub fn transpile_cover(cover: &Cover) -> String {
        let mut output = String::from("#align(center + horizon)[\n");
        output.push_str(&format!(
            "  #text(size: 28pt, weight: \"bold\")[{}]\n",
            escape_markup(&cover.title, false)
        ));
        if let Some(subtitle) = &cover.subtitle {
            output.push_str("  #v(1em)\n");
            output.push_str(&format!(
                "  #text(size: 16pt)[{}]\n",
                escape_markup(subtitle, false)
            ));
        }
        output.push_str("  #v(2em)\n");
        output.push_str(&format!(
            "  #text(size: 11pt, fill: luma(100))[Generated on {}]\n",
            escape_markup(&cover.date_label(), false)
        ));
        output.push_str("]\n");
        output
    }

    /// Transpile markdown body content
    pub fn transpile_body(source: &str) -> String {
        let mut transpiler = Self::default();
        for event in Parser::new_ext(source, markdown_options()) {
            transpiler.event(event);
        }
        transpiler.out
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(_) => self.close(),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                self.capture_heading_text(&code);
                self.out
                    .push_str(&format!("#raw(\"{}\");", escape_string(&code)));
            }
            Event::SoftBreak => self.text(" "),
            Event::HardBreak => self.out.push_str("#linebreak();"),
            Event::Rule => {
                self.ensure_blank_line();
                self.out.push_str("#line(length: 100%)\n\n");
            }
            Event::FootnoteReference(label) => {
                self.out
                    .push_str(&format!("#super[{}];", escape_markup(&label, false)));
            }
            Event::TaskListMarker(checked) => {
                self.out.push_str(if checked { "☑ " } else { "☐ " });
            }
            Event::Html(_) | Event::InlineHtml(_) => {
                tracing::debug!("dropping raw HTML from typst output");
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph => Frame::Paragraph,
            Tag::Heading { level, .. } => {
                self.ensure_blank_line();
                self.out.push_str(&"=".repeat(level as usize));
                self.out.push(' ');
                Frame::Heading {
                    text: String::new(),
                }
            }
            Tag::BlockQuote(..) => {
                self.out.push_str("#quote(block: true)[\n");
                Frame::Quote
            }
            Tag::CodeBlock(kind) => Frame::Code {
                lang: match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split(|c: char| c.is_whitespace() || c == ',')
                        .next()
                        .unwrap_or("")
                        .to_string(),
                    CodeBlockKind::Indented => String::new(),
                },
                text: String::new(),
            },
            Tag::List(start) => {
                if !self.in_item() {
                    self.ensure_blank_line();
                }
                Frame::List { next: start }
            }
            Tag::Item => {
                self.ensure_line_start();
                let depth = self.list_depth();
                self.out.push_str(&"  ".repeat(depth.saturating_sub(1)));
                let marker = match self.current_list() {
                    Some(Some(n)) => {
                        let marker = format!("{}. ", n);
                        self.advance_list();
                        marker
                    }
                    _ => "- ".to_string(),
                };
                self.out.push_str(&marker);
                Frame::Item
            }
            Tag::FootnoteDefinition(label) => {
                self.ensure_blank_line();
                self.out
                    .push_str(&format!("#super[{}]; ", escape_markup(&label, false)));
                Frame::Footnote
            }
            Tag::Table(alignments) => {
                self.ensure_blank_line();
                self.out
                    .push_str(&format!("#table(\n  columns: {},\n", alignments.len().max(1)));
                Frame::Table
            }
            Tag::TableHead => {
                self.out.push_str("  table.header(");
                Frame::TableHead
            }
            Tag::TableRow => {
                self.out.push_str("  ");
                Frame::TableRow
            }
            Tag::TableCell => {
                self.out.push('[');
                Frame::TableCell
            }
            Tag::Strong => {
                self.out.push_str("#strong[");
                Frame::Strong
            }
            Tag::Emphasis => {
                self.out.push_str("#emph[");
                Frame::Emphasis
            }
            Tag::Strikethrough => {
                self.out.push_str("#strike[");
                Frame::Strikethrough
            }
            Tag::Link { dest_url, .. } => {
                // In-document links would need a matching label; keep the text only
                let external = !dest_url.starts_with('#');
                if external {
                    self.out
                        .push_str(&format!("#link(\"{}\")[", escape_string(&dest_url)));
                }
                Frame::Link { external }
            }
            Tag::Image { .. } => Frame::Image,
            Tag::HtmlBlock => Frame::Html,
            _ => Frame::Other,
        };
        self.stack.push(frame);
    }

    fn close(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        match frame {
            Frame::Paragraph => {
                if self.in_item() {
                    self.out.push(' ');
                } else {
                    self.out.push_str("\n\n");
                }
            }
            Frame::Heading { text } => {
                let anchor = slug(&text);
                if !anchor.is_empty() {
                    self.out.push_str(&format!(" <{}>", anchor));
                }
                self.out.push_str("\n\n");
            }
            Frame::Quote => {
                trim_trailing_newlines(&mut self.out);
                self.out.push_str("\n]\n\n");
            }
            Frame::Code { lang, text } => {
                let text = text.strip_suffix('\n').unwrap_or(&text);
                if lang.is_empty() {
                    self.out.push_str(&format!(
                        "#raw(block: true, \"{}\");",
                        escape_string(text)
                    ));
                } else {
                    self.out.push_str(&format!(
                        "#raw(block: true, lang: \"{}\", \"{}\");",
                        escape_string(&lang),
                        escape_string(text)
                    ));
                }
                if !self.in_item() {
                    self.out.push_str("\n\n");
                }
            }
            Frame::List { .. } => {
                if !self.in_item() {
                    self.ensure_line_start();
                    self.out.push('\n');
                }
            }
            Frame::Item => {
                let trimmed = self.out.trim_end_matches(' ').len();
                self.out.truncate(trimmed);
                self.ensure_line_start();
            }
            Frame::Footnote => {
                trim_trailing_newlines(&mut self.out);
                self.out.push_str("\n\n");
            }
            Frame::Table => self.out.push_str(")\n\n"),
            Frame::TableHead => self.out.push_str("),\n"),
            Frame::TableRow => self.out.push('\n'),
            Frame::TableCell => self.out.push_str("], "),
            Frame::Strong | Frame::Emphasis | Frame::Strikethrough => self.out.push_str("];"),
            Frame::Link { external } => {
                if external {
                    self.out.push_str("];");
                }
            }
            Frame::Image | Frame::Html | Frame::Other => {}
        }
    }

    fn text(&mut self, text: &str) {
        match self.stack.last_mut() {
            Some(Frame::Code { text: code, .. }) => {
                code.push_str(text);
                return;
            }
            Some(Frame::Html) => return,
            _ => {}
        }
        self.capture_heading_text(text);
        let at_line_start = self.out.is_empty() || self.out.ends_with('\n');
        self.out.push_str(&escape_markup(text, at_line_start));
    }

    fn capture_heading_text(&mut self, text: &str) {
        for frame in self.stack.iter_mut().rev() {
            if let Frame::Heading { text: heading } = frame {
                heading.push_str(text);
                return;
            }
        }
    }

    fn in_item(&self) -> bool {
        self.stack.iter().any(|f| matches!(f, Frame::Item))
    }

    fn list_depth(&self) -> usize {
        self.stack
            .iter()
            .filter(|f| matches!(f, Frame::List { .. }))
            .count()
    }

    fn current_list(&self) -> Option<Option<u64>> {
        self.stack.iter().rev().find_map(|f| match f {
            Frame::List { next } => Some(*next),
            _ => None,
        })
    }

    fn advance_list(&mut self) {
        for frame in self.stack.iter_mut().rev() {
            if let Frame::List { next: Some(n) } = frame {
                *n += 1;
                return;
            }
        }
    }

    fn ensure_line_start(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn ensure_blank_line(&mut self) {
        if self.out.is_empty() || self.out.ends_with("\n\n") {
            return;
        }
        self.ensure_line_start();
        self.out.push('\n');
    }
}

fn trim_trailing_newlines(out: &mut String) {
    let trimmed = out.trim_end_matches('\n').len();
    out.truncate(trimmed);
}

/// Escape text for Typst markup mode
///
/// `at_line_start` additionally escapes the characters that open a list,
/// an enumeration or a heading when they begin a line.
pub fn escape_markup(text: &str, at_line_start: bool) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut prev: Option<char> = None;
    for (i, ch) in text.chars().enumerate() {
        let needs_escape = match ch {
            '\\' | '#' | '*' | '_' | '`' | '$' | '<' | '@' | '[' | ']' | '~' | '/' => true,
            '=' | '-' | '+' => i == 0 && at_line_start,
            '.' => prev.is_some_and(|p| p.is_ascii_digit()),
            _ => false,
        };
        if needs_escape {
            out.push('\\');
        }
        out.push(ch);
        prev = Some(ch);
    }
    out
}

/// Escape special characters in Typst string literals
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}
