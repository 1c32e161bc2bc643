//! Pre-defined page sizes for common paper formats.
//!
//! All sizes are provided in portrait orientation (width, height) where
//! width ≤ height. Use the [`PageOrientation`](crate::pagesize::PageOrientation)
//! trait to convert between portrait and landscape. Markup `page-` directives
//! resolve their size name through [from_name].
//!
//! # Example
//!
//! ```
//! use presswork::pagesize::{LETTER, A4, PageOrientation};
//!
//! // use a standard size
//! let page_size = LETTER;
//!
//! // convert to landscape
//! let landscape = A4.landscape();
//! ```

use crate::error::Error;
use crate::units::*;

/// Page dimensions as (width, height) in points.
pub type PageSize = (Pt, Pt);

// north american sizes
pub const LETTER: PageSize = (Pt(8.5 * 72.0), Pt(11.0 * 72.0));
pub const HALF_LETTER: PageSize = (Pt(5.5 * 72.0), Pt(8.5 * 72.0));
pub const LEGAL: PageSize = (Pt(8.5 * 72.0), Pt(13.0 * 72.0));
pub const TABLOID: PageSize = (Pt(11.0 * 72.0), Pt(17.0 * 72.0));
pub const LEDGER: PageSize = (Pt(11.0 * 72.0), Pt(17.0 * 72.0));

// iso a-series (converted from mm to points)
pub const A0: PageSize = (Pt(841.0 * 72.0 / 25.4), Pt(1189.0 * 72.0 / 25.4));
pub const A1: PageSize = (Pt(594.0 * 72.0 / 25.4), Pt(841.0 * 72.0 / 25.4));
pub const A2: PageSize = (Pt(420.0 * 72.0 / 25.4), Pt(594.0 * 72.0 / 25.4));
pub const A3: PageSize = (Pt(297.0 * 72.0 / 25.4), Pt(420.0 * 72.0 / 25.4));
pub const A4: PageSize = (Pt(210.0 * 72.0 / 25.4), Pt(297.0 * 72.0 / 25.4));
pub const A5: PageSize = (Pt(148.0 * 72.0 / 25.4), Pt(210.0 * 72.0 / 25.4));
pub const A6: PageSize = (Pt(105.0 * 72.0 / 25.4), Pt(148.0 * 72.0 / 25.4));

/// Look a page size up by name, case-insensitively. Returns
/// [Error::UnknownPageSize] when the name is not in the table.
pub fn from_name(name: &str) -> Result<PageSize, Error> {
    match name.to_ascii_uppercase().as_str() {
        "LETTER" => Ok(LETTER),
        "HALF_LETTER" | "HALFLETTER" => Ok(HALF_LETTER),
        "LEGAL" => Ok(LEGAL),
        "TABLOID" => Ok(TABLOID),
        "LEDGER" => Ok(LEDGER),
        "A0" => Ok(A0),
        "A1" => Ok(A1),
        "A2" => Ok(A2),
        "A3" => Ok(A3),
        "A4" => Ok(A4),
        "A5" => Ok(A5),
        "A6" => Ok(A6),
        _ => Err(Error::UnknownPageSize(name.to_string())),
    }
}

/// Convert page sizes between portrait and landscape orientations.
pub trait PageOrientation {
    /// Returns the size in portrait orientation (width ≤ height).
    fn portrait(self) -> Self;
    /// Returns the size in landscape orientation (width ≥ height).
    fn landscape(self) -> Self;
}

impl PageOrientation for PageSize {
    fn portrait(self) -> Self {
        if self.0 <= self.1 {
            self
        } else {
            (self.1, self.0)
        }
    }

    fn landscape(self) -> PageSize {
        if self.0 >= self.1 {
            self
        } else {
            (self.1, self.0)
        }
    }
}
