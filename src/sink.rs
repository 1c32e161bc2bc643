use std::io::Write;
use std::rc::Rc;

use crate::document::Document;
use crate::font::Font;
use crate::info::Info;
use crate::page::{Page, SpanLayout};
use crate::rect::Rect;
use crate::units::Pt;
use crate::Error;

/// Receives placement commands from the layout engine and accumulates them
/// into an output document.
///
/// All placement methods are infallible: implementations buffer in memory and
/// surface failures from [PageSink::finish], which consumes the sink and
/// persists the document exactly once. Coordinates arrive in PDF space
/// (origin at the lower-left corner, y increasing upward); the engine does
/// the top-down conversion before calling in.
pub trait PageSink {
    /// Open a fresh page of the given size; placements go to it until
    /// [PageSink::close_page]
    fn open_page(&mut self, size: (Pt, Pt), font_size: Pt);

    /// Change the size used for subsequent placements on the open page
    fn set_font_size(&mut self, size: Pt);

    /// Place a run of text with its baseline starting at `(x, y)`
    fn place(&mut self, text: &str, x: Pt, y: Pt);

    /// Stroke a thin dashed rectangle (margin box visualization)
    fn stroke_rect(&mut self, rect: Rect);

    /// Stroke a thin line (horizontal-stop tick marks)
    fn stroke_line(&mut self, from: (Pt, Pt), to: (Pt, Pt));

    /// Close the open page, appending it to the document
    fn close_page(&mut self);

    /// Persist the document. A document on which nothing was ever placed is
    /// written with zero pages.
    fn finish(self, out: &mut dyn Write) -> Result<(), Error>
    where
        Self: Sized;
}

/// The production [PageSink]: buffers pages and writes a PDF through
/// [Document] on finish.
pub struct PdfSink {
    document: Document,
    current: Option<Page>,
    font_size: Pt,
}

impl PdfSink {
    /// Create a sink that embeds `font` and stamps `info` into the output.
    /// The font is shared via [Rc] so the same face can serve as the
    /// engine's [FontMetrics](crate::FontMetrics) implementation.
    pub fn new(font: Rc<Font>, info: Info) -> PdfSink {
        PdfSink {
            document: Document::new(info, font),
            current: None,
            font_size: Pt(0.0),
        }
    }
}

impl PageSink for PdfSink {
    fn open_page(&mut self, size: (Pt, Pt), font_size: Pt) {
        self.current = Some(Page::new(size));
        self.font_size = font_size;
    }

    fn set_font_size(&mut self, size: Pt) {
        self.font_size = size;
    }

    fn place(&mut self, text: &str, x: Pt, y: Pt) {
        if let Some(page) = self.current.as_mut() {
            page.add_span(SpanLayout {
                text: text.to_string(),
                size: self.font_size,
                coords: (x, y),
            });
        }
    }

    fn stroke_rect(&mut self, rect: Rect) {
        if let Some(page) = self.current.as_mut() {
            page.add_outline(rect);
        }
    }

    fn stroke_line(&mut self, from: (Pt, Pt), to: (Pt, Pt)) {
        if let Some(page) = self.current.as_mut() {
            page.add_tick(from, to);
        }
    }

    fn close_page(&mut self) {
        if let Some(page) = self.current.take() {
            self.document.add_page(page);
        }
    }

    fn finish(mut self, out: &mut dyn Write) -> Result<(), Error> {
        self.close_page();
        self.document.write(out)
    }
}
