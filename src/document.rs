use crate::{
    font::Font,
    info::Info,
    page::Page,
    refs::{ObjectReferences, RefType},
    Error,
};
use pdf_writer::{Finish, Pdf, Ref};
use std::{io::Write, rc::Rc};

/// A document collects finished pages and renders them out with a call to
/// [Document::write]. It carries exactly one embedded font, shared with the
/// layout side through an [Rc] so measurement and rendering use the same
/// face.
pub struct Document {
    pub info: Info,
    pub font: Rc<Font>,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(info: Info, font: Rc<Font>) -> Document {
        Document {
            info,
            font,
            pages: Vec::default(),
        }
    }

    /// Add a finished page to the end of the document
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Write the entire document to the writer. The document is rendered in
    /// memory first, so very large documents allocate proportionally.
    pub fn write<W: Write>(self, mut w: W) -> Result<(), Error> {
        let Document { info, font, pages } = self;

        let mut refs = ObjectReferences::new();

        let catalog_id = refs.gen(RefType::Catalog);
        let page_tree_id = refs.gen(RefType::PageTree);

        let mut writer = Pdf::new();
        info.write(&mut refs, &mut writer);

        let page_refs: Vec<Ref> = (0..pages.len())
            .map(|i| refs.gen(RefType::Page(i)))
            .collect();

        writer
            .pages(page_tree_id)
            .count(page_refs.len() as i32)
            .kids(page_refs);

        font.write(&mut refs, &mut writer);

        for (page_index, page) in pages.iter().enumerate() {
            page.write(&mut refs, page_index, &font, &mut writer)?;
        }

        let mut catalog = writer.catalog(catalog_id);
        catalog.pages(page_tree_id);
        catalog.finish();

        w.write_all(writer.finish().as_slice()).map_err(Into::into)
    }
}
