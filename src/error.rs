use thiserror::Error;

/// All errors that the crate can generate
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    /// An I/O error occurred while persisting a page or document
    Io(#[from] std::io::Error),

    #[error(transparent)]
    /// [owned_ttf_parser] failed to parse the font
    FaceParsing(#[from] owned_ttf_parser::FaceParsingError),

    /// A page directive named a page size that is not in the standard table.
    /// Fatal for the current document: no sane size can be assumed.
    #[error("unknown page size: {0:?}")]
    UnknownPageSize(String),

    /// The active font has no glyph (and no replacement glyph) for a
    /// character in a run. Propagated rather than skipped so that wrap-width
    /// accounting never silently drifts.
    #[error("no glyph available for {0:?}")]
    MissingGlyph(char),
}
