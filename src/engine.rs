use log::debug;

use crate::margins::Margins;
use crate::metrics::FontMetrics;
use crate::pagesize::{self, PageSize};
use crate::rect::Rect;
use crate::sink::PageSink;
use crate::units::Pt;
use crate::Error;

/// Horizontal alignment of one printed line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
    Right,
}

/// Stateful pagination and layout engine.
///
/// The engine tracks a cursor in top-down page coordinates (`y` grows toward
/// the bottom of the page) and converts to PDF coordinates only when handing
/// placements to the sink. Pages are opened lazily: nothing is emitted until
/// the first placement, so size and margin changes made before any output
/// apply cleanly to the first page.
pub struct LayoutEngine<M: FontMetrics, S: PageSink> {
    metrics: M,
    sink: S,
    page_size: PageSize,
    font_size: Pt,
    margins: Margins,
    line_space: Pt,
    x: Pt,
    y: Pt,
    page_open: bool,
    draw_margin_box: bool,
    draw_debug_marks: bool,
    stops: Vec<Pt>,
}

impl<M: FontMetrics, S: PageSink> LayoutEngine<M, S> {
    pub fn new(metrics: M, sink: S) -> LayoutEngine<M, S> {
        LayoutEngine {
            metrics,
            sink,
            page_size: pagesize::A4,
            font_size: Pt(10.0),
            margins: Margins::all(Pt(15.0)),
            line_space: Pt(5.0),
            x: Pt(0.0),
            y: Pt(0.0),
            page_open: false,
            draw_margin_box: false,
            draw_debug_marks: false,
            stops: Vec::new(),
        }
    }

    /// The size applied to subsequently opened pages
    pub fn set_page_size(&mut self, size: PageSize) {
        self.page_size = size;
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Change the font size. Takes effect immediately: if a page is open the
    /// sink is re-announced so subsequent runs render at the new size.
    pub fn set_font_size(&mut self, size: Pt) {
        self.font_size = size;
        if self.page_open {
            self.sink.set_font_size(size);
        }
    }

    pub fn font_size(&self) -> Pt {
        self.font_size
    }

    pub fn set_margins(&mut self, margins: Margins) {
        self.margins = margins;
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    /// Extra vertical space between lines, beyond the font size
    pub fn set_line_space(&mut self, space: Pt) {
        self.line_space = space;
    }

    /// Stroke a dashed rectangle around the margin box of each page
    pub fn set_draw_margin_box(&mut self, draw: bool) {
        self.draw_margin_box = draw;
    }

    /// Stroke tick marks at the recorded horizontal stops of each page
    pub fn set_draw_debug_marks(&mut self, draw: bool) {
        self.draw_debug_marks = draw;
    }

    /// The cursor in top-down coordinates, or [None] when no page is open
    pub fn position(&self) -> Option<(Pt, Pt)> {
        if self.page_open {
            Some((self.x, self.y))
        } else {
            None
        }
    }

    /// Print text at the left cursor position, wrapping to further lines and
    /// pages as needed. Embedded newlines force line breaks.
    pub fn print(&mut self, text: &str) -> Result<(), Error> {
        self.print_aligned(text, Align::Left)
    }

    /// Print text centered between the cursor and the margins. Centering is
    /// computed per wrapped line around the midpoint of the space remaining
    /// on that line.
    pub fn print_center(&mut self, text: &str) -> Result<(), Error> {
        self.print_aligned(text, Align::Center)
    }

    /// Print text flush against the right margin, per wrapped line
    pub fn print_right(&mut self, text: &str) -> Result<(), Error> {
        self.print_aligned(text, Align::Right)
    }

    fn print_aligned(&mut self, text: &str, align: Align) -> Result<(), Error> {
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.new_line()?;
            }
            let line = line.strip_suffix('\r').unwrap_or(line);
            self.print_segment(line, align)?;
        }
        Ok(())
    }

    /// Wrap and place one newline-free segment
    fn print_segment(&mut self, segment: &str, align: Align) -> Result<(), Error> {
        let chars: Vec<char> = segment.chars().collect();
        let mut from = 0;

        while from < chars.len() {
            self.ensure_page();

            let remaining = self.page_size.0 - self.margins.right - self.x;
            let inner = self.page_size.0 - self.margins.right - self.margins.left;
            let available = match align {
                Align::Left | Align::Right => remaining,
                // centering happens around the midpoint of the remaining
                // space, so the usable width is twice the remainder, capped
                // at the full content width
                Align::Center => inner.min(remaining * 2.0),
            };

            let mut count = self.fit_index(&chars[from..], available)?;
            if count == 0 {
                if self.x > self.margins.left {
                    self.new_line()?;
                    continue;
                }
                // a single character wider than the whole content width:
                // force-place it so the loop always makes progress
                count = 1;
            }

            let head: String = chars[from..from + count].iter().collect();
            let measured = self.metrics.measure(&head, self.font_size)?;
            let offset = match align {
                Align::Left => Pt(0.0),
                Align::Center => ((available - measured) / 2.0).max(Pt(0.0)),
                Align::Right => (available - measured).max(Pt(0.0)),
            };

            self.x += offset;
            self.stops.push(self.x);
            // the line box spans [y, y + font_size] top-down; the baseline
            // sits a descent above its bottom edge
            let baseline =
                self.page_size.1 - self.y - self.font_size + self.metrics.descent(self.font_size);
            self.sink.place(&head, self.x, baseline);
            self.x += measured;

            from += count;
            if from < chars.len() {
                self.new_line()?;
            }
        }

        Ok(())
    }

    /// The largest count of leading characters of `chars` that measures
    /// within `available`, found by binary search so long inputs cost
    /// O(log n) measurements rather than one per character.
    fn fit_index(&self, chars: &[char], available: Pt) -> Result<usize, Error> {
        let whole: String = chars.iter().collect();
        if self.metrics.measure(&whole, self.font_size)? <= available {
            return Ok(chars.len());
        }

        // invariant: prefixes of length lo fit, prefixes of length hi do not
        let mut lo = 0;
        let mut hi = chars.len();
        while lo + 1 < hi {
            let mid = lo + (hi - lo) / 2;
            let prefix: String = chars[..mid].iter().collect();
            if self.metrics.measure(&prefix, self.font_size)? <= available {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Ok(lo)
    }

    /// Move the cursor to the start of the next line, breaking to a new page
    /// when the next line's text would cross the bottom margin. A line
    /// ending exactly on the margin still fits.
    pub fn new_line(&mut self) -> Result<(), Error> {
        self.ensure_page();
        self.x = self.margins.left;
        self.y += self.font_size + self.line_space;
        if self.font_size > self.page_size.1 - self.margins.bottom - self.y {
            self.new_page();
        }
        Ok(())
    }

    /// Close the current page, if one is open. The next placement opens a
    /// fresh page using the then-current page size and margins.
    pub fn new_page(&mut self) {
        if !self.page_open {
            return;
        }

        let (width, height) = self.page_size;
        if self.draw_margin_box {
            self.sink.stroke_rect(Rect {
                x1: self.margins.left,
                y1: self.margins.bottom,
                x2: width - self.margins.right,
                y2: height - self.margins.top,
            });
        }
        if self.draw_debug_marks {
            for &stop in self.stops.iter() {
                self.sink
                    .stroke_line((stop, height - self.margins.top), (stop, height));
            }
        }

        debug!("closing page at y = {}", self.y);
        self.sink.close_page();
        self.page_open = false;
        self.stops.clear();
    }

    /// Close any open page and persist the document. A run that never placed
    /// anything produces an empty document.
    pub fn finish(mut self, out: &mut dyn std::io::Write) -> Result<(), Error> {
        self.new_page();
        self.sink.finish(out)
    }

    fn ensure_page(&mut self) {
        if !self.page_open {
            debug!(
                "opening page {} x {}",
                self.page_size.0, self.page_size.1
            );
            self.sink.open_page(self.page_size, self.font_size);
            self.x = self.margins.left;
            self.y = self.margins.top;
            self.page_open = true;
        }
    }
}
