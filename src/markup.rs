//! Line-oriented markup interpretation.
//!
//! The markup language is deliberately small. Leading colons select the kind
//! of line:
//!
//! - `:::directive` — document setup. `page-<NAME>[-h...]` closes the
//!   current page and switches to the named page size (a modifier starting
//!   with `h` requests landscape); `margin-<tblr>-<value>` and
//!   `margin-<value>` adjust margins. Several directives can share a line,
//!   separated by `:`; anything after the first space is ignored.
//! - `::kind` — opens a named block (`header`, `footer`, `table`); body
//!   lines are style-parsed like `:`-lines (no leading colon needed) until
//!   a line starting with `::`.
//! - `:style content` — a styled content line. Style tokens are separated
//!   by `:` — `left`, `center`, `right` select alignment, `<N>%` scales the
//!   font size for this line only. A line with no space after the tokens is
//!   plain content, not style.
//! - anything else — a plain content line, word-wrapped at the left margin.
//!
//! Blank lines separate statements and are not rendered. A content line that
//! must start with a literal colon can be written with an explicit alignment
//! prefix: `:left :foo` renders `:foo`.

use log::{debug, info};

use crate::cursor::TextCursor;
use crate::engine::LayoutEngine;
use crate::margins::Margins;
use crate::metrics::FontMetrics;
use crate::pagesize::{self, PageOrientation};
use crate::sink::PageSink;
use crate::units::Pt;
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alignment {
    Left,
    Center,
    Right,
}

/// Interprets markup text against a [LayoutEngine]
pub struct MarkupInterpreter<'a, M: FontMetrics, S: PageSink> {
    engine: &'a mut LayoutEngine<M, S>,
}

impl<'a, M: FontMetrics, S: PageSink> MarkupInterpreter<'a, M, S> {
    pub fn new(engine: &'a mut LayoutEngine<M, S>) -> MarkupInterpreter<'a, M, S> {
        MarkupInterpreter { engine }
    }

    /// Interpret `text` from start to finish, driving the engine. The caller
    /// finalizes the engine afterwards; rendering the same text into a fresh
    /// engine always produces the same placements.
    pub fn render(&mut self, text: &str) -> Result<(), Error> {
        let mut cursor = TextCursor::new(text);

        loop {
            // tolerate whitespace ahead of the line's leading colons; blank
            // lines separate statements and are not rendered
            if cursor.skip(&[' ', '\t', '\r', '\n']).is_err() {
                return Ok(());
            }

            match leading_colons(&mut cursor, 3) {
                3 => {
                    let line = cursor.next_line().unwrap_or_default();
                    self.setup(&line)?;
                }
                2 => {
                    let kind = cursor.next_line().unwrap_or_default();
                    self.block(&mut cursor, kind.trim())?;
                }
                1 => {
                    let line = cursor.next_line().unwrap_or_default();
                    self.styled_line(&line)?;
                }
                _ => {
                    match cursor.next_line() {
                        Ok(line) => self.content_line(&line)?,
                        Err(_) => return Ok(()),
                    };
                }
            }
        }
    }

    /// Apply the colon-separated clauses of a `:::` setup line. Only the
    /// first whitespace-delimited token is the directive; anything after it
    /// is a human-readable note and is ignored.
    fn setup(&mut self, line: &str) -> Result<(), Error> {
        let directive = line.split_whitespace().next().unwrap_or_default();
        for clause in directive.split(':') {
            let mut parts = clause.split('-');
            match parts.next().unwrap_or_default() {
                "page" => {
                    let name = parts.next().unwrap_or_default();
                    let mut size = pagesize::from_name(name)?;
                    // any modifier starting with `h`/`H` requests landscape
                    if parts
                        .next()
                        .map(|s| s.to_ascii_lowercase().starts_with('h'))
                        .unwrap_or(false)
                    {
                        size = size.landscape();
                    }
                    info!("page size: {} ({} x {})", name, size.0, size.1);
                    // close the current page first so the size change only
                    // affects pages from here on
                    self.engine.new_page();
                    self.engine.set_page_size(size);
                }
                "margin" => {
                    let second = parts.next().unwrap_or_default();
                    if let Ok(value) = second.parse::<f32>() {
                        info!("margin: {}", value);
                        self.engine.set_margins(Margins::all(Pt(value)));
                        continue;
                    }
                    let value = match parts.next().map(str::parse::<f32>) {
                        Some(Ok(value)) => Pt(value),
                        _ => {
                            debug!("ignoring malformed margin clause {:?}", clause);
                            continue;
                        }
                    };
                    let mut margins = self.engine.margins();
                    for side in second.chars() {
                        match side.to_ascii_lowercase() {
                            't' => {
                                info!("margin top: {}", value);
                                margins.top = value;
                            }
                            'b' => {
                                info!("margin bottom: {}", value);
                                margins.bottom = value;
                            }
                            'l' => {
                                info!("margin left: {}", value);
                                margins.left = value;
                            }
                            'r' => {
                                info!("margin right: {}", value);
                                margins.right = value;
                            }
                            other => debug!("ignoring margin side {:?}", other),
                        }
                    }
                    self.engine.set_margins(margins);
                }
                other => debug!("ignoring directive {:?}", other),
            }
        }
        Ok(())
    }

    /// Render block body lines until a `::` terminator line. The block kind
    /// is the first space-delimited token of the opening line; every body
    /// line is style-parsed, whether or not it carries a leading colon.
    fn block(&mut self, cursor: &mut TextCursor, kind: &str) -> Result<(), Error> {
        let kind = kind.split(' ').next().unwrap_or_default();
        match kind {
            "header" | "footer" | "table" => info!("{} block", kind),
            other => debug!("unrecognized block kind {:?}", other),
        }

        loop {
            if cursor.skip(&[' ', '\t', '\r', '\n']).is_err() {
                return Ok(());
            }
            match cursor.eat("::") {
                Ok(true) => {
                    let _ = cursor.next_line();
                    return Ok(());
                }
                Ok(false) => {
                    let line = cursor.next_line().unwrap_or_default();
                    self.styled_line(&line)?;
                }
                Err(_) => {
                    match cursor.next_line() {
                        Ok(line) => self.styled_line(&line)?,
                        Err(_) => {}
                    };
                    return Ok(());
                }
            }
        }
    }

    /// Render one styled line: tokens up to the first space select alignment
    /// and scale, the rest (with the separating space run removed) is the
    /// content. A line with no space at all is plain content, not style.
    fn styled_line(&mut self, line: &str) -> Result<(), Error> {
        let (style, content) = match line.find(' ') {
            Some(space) => (&line[..space], line[space + 1..].trim_start_matches(' ')),
            None => return self.content_line(line),
        };
        let (alignment, zoom) = parse_style(style);

        let saved = self.engine.font_size();
        if zoom != 100 {
            self.engine.set_font_size(saved * (zoom as f32 / 100.0));
        }

        let outcome = match alignment {
            Alignment::Left => self.engine.print(content),
            Alignment::Center => self.engine.print_center(content),
            Alignment::Right => self.engine.print_right(content),
        }
        .and_then(|_| self.engine.new_line());

        if zoom != 100 {
            self.engine.set_font_size(saved);
        }
        outcome
    }

    fn content_line(&mut self, line: &str) -> Result<(), Error> {
        self.engine.print(line)?;
        self.engine.new_line()
    }
}

/// Count and consume up to `max` leading colons. Near the end of the buffer
/// the scanner may run out mid-count; the colons consumed so far stand.
fn leading_colons(cursor: &mut TextCursor, max: usize) -> usize {
    let mut count = 0;
    while count < max {
        match cursor.eat(":") {
            Ok(true) => count += 1,
            _ => break,
        }
    }
    count
}

/// Parse the style tokens of a `:`-prefixed line. Unknown tokens are
/// ignored; an unparseable percentage means no scaling.
fn parse_style(style: &str) -> (Alignment, u32) {
    let mut alignment = Alignment::Left;
    let mut zoom = 100;
    for token in style.split(':') {
        let token = token.split('-').next().unwrap_or_default();
        match token {
            "left" => alignment = Alignment::Left,
            "center" => alignment = Alignment::Center,
            "right" => alignment = Alignment::Right,
            "" => {}
            other => {
                if let Some(percent) = other.strip_suffix('%') {
                    zoom = percent.parse::<u32>().unwrap_or(100);
                } else {
                    debug!("ignoring style token {:?}", other);
                }
            }
        }
    }
    (alignment, zoom)
}
