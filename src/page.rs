use crate::font::Font;
use crate::rect::Rect;
use crate::refs::{ObjectReferences, RefType};
use crate::{Error, Pt};
use pdf_writer::{Finish, Name, Pdf};

/// A run of text placed at an absolute baseline position, in PDF coordinates
/// (origin at the lower-left corner of the page)
#[derive(Clone, PartialEq, Debug)]
pub struct SpanLayout {
    pub text: String,
    pub size: Pt,
    pub coords: (Pt, Pt),
}

/// One placed item on a page, in placement order
#[derive(Clone, PartialEq, Debug)]
pub enum PageItem {
    /// A run of text
    Run(SpanLayout),
    /// A thin dashed rectangle (used to visualize the margin box)
    Outline(Rect),
    /// A thin solid line (used to visualize recorded horizontal stops)
    Tick { from: (Pt, Pt), to: (Pt, Pt) },
}

/// A single page: its size plus everything placed on it. Pages are built by
/// the sink while open and never re-read after they are closed into the
/// document.
pub struct Page {
    /// The size of the page as (width, height)
    pub media_box: (Pt, Pt),
    /// The placed contents, in placement order
    pub contents: Vec<PageItem>,
}

impl Page {
    pub fn new(size: (Pt, Pt)) -> Page {
        Page {
            media_box: size,
            contents: Vec::default(),
        }
    }

    pub fn add_span(&mut self, span: SpanLayout) {
        self.contents.push(PageItem::Run(span));
    }

    pub fn add_outline(&mut self, rect: Rect) {
        self.contents.push(PageItem::Outline(rect));
    }

    pub fn add_tick(&mut self, from: (Pt, Pt), to: (Pt, Pt)) {
        self.contents.push(PageItem::Tick { from, to });
    }

    /// Render the page contents to a raw content stream. Text is emitted as
    /// hex-encoded glyph ids for the single embedded font.
    fn render(&self, font: &Font) -> Result<Vec<u8>, Error> {
        let mut content = String::new();

        for item in self.contents.iter() {
            match item {
                PageItem::Run(span) => {
                    content.push_str("BT\n");
                    content.push_str(&format!("/F0 {} Tf\n", span.size.0));
                    content.push_str(&format!("{} {} Td\n", span.coords.0.0, span.coords.1.0));
                    content.push('<');
                    for ch in span.text.chars() {
                        content.push_str(&format!("{:04x}", font.glyph_id(ch)?));
                    }
                    content.push_str("> Tj\nET\n");
                }
                PageItem::Outline(rect) => {
                    content.push_str("q\n0.1 w\n[3 1] 0 d\n");
                    content.push_str(&format!(
                        "{} {} {} {} re\nS\nQ\n",
                        rect.x1.0,
                        rect.y1.0,
                        (rect.x2 - rect.x1).0,
                        (rect.y2 - rect.y1).0,
                    ));
                }
                PageItem::Tick { from, to } => {
                    content.push_str("q\n0.1 w\n");
                    content.push_str(&format!(
                        "{} {} m\n{} {} l\nS\nQ\n",
                        from.0.0, from.1.0, to.0.0, to.1.0,
                    ));
                }
            }
        }

        Ok(content.into_bytes())
    }

    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        page_index: usize,
        font: &Font,
        writer: &mut Pdf,
    ) -> Result<(), Error> {
        let media_box = pdf_writer::Rect {
            x1: 0.0,
            y1: 0.0,
            x2: self.media_box.0.into(),
            y2: self.media_box.1.into(),
        };

        // page refs are pre-generated by the document so the page tree can
        // list its kids before any page is written
        let id = match refs.get(RefType::Page(page_index)) {
            Some(id) => id,
            None => refs.gen(RefType::Page(page_index)),
        };
        let mut page = writer.page(id);
        page.media_box(media_box);
        if let Some(parent) = refs.get(RefType::PageTree) {
            page.parent(parent);
        }

        let mut resources = page.resources();
        let mut resource_fonts = resources.fonts();
        if let Some(font_ref) = refs.get(RefType::Font) {
            resource_fonts.pair(Name(b"F0"), font_ref);
        }
        resource_fonts.finish();
        resources.finish();

        let content_id = refs.gen(RefType::ContentForPage(page_index));
        page.contents(content_id);
        page.finish();

        let rendered = self.render(font)?;
        writer.stream(content_id, rendered.as_slice());
        Ok(())
    }
}
