use std::rc::Rc;

use crate::error::Error;
use crate::units::Pt;

/// Width and descent measurement for text at a given font size. The layout
/// engine performs all wrap and alignment decisions through this trait; the
/// crate's [Font](crate::Font) implements it over a parsed TTF/OTF face.
///
/// Implementations must be deterministic and monotonic in string length, or
/// the engine's wrap probe cannot terminate correctly.
pub trait FontMetrics {
    /// The advance width of `text` rendered at `size`, in points.
    ///
    /// Fails with [Error::MissingGlyph] when a character has no glyph and no
    /// replacement glyph; measurement never silently skips characters, or
    /// wrap accounting would drift from what gets placed.
    fn measure(&self, text: &str, size: Pt) -> Result<Pt, Error>;

    /// The descent below the baseline at `size`, in points (non-negative)
    fn descent(&self, size: Pt) -> Pt;
}

impl<M: FontMetrics + ?Sized> FontMetrics for &M {
    fn measure(&self, text: &str, size: Pt) -> Result<Pt, Error> {
        (**self).measure(text, size)
    }

    fn descent(&self, size: Pt) -> Pt {
        (**self).descent(size)
    }
}

impl<M: FontMetrics + ?Sized> FontMetrics for Rc<M> {
    fn measure(&self, text: &str, size: Pt) -> Result<Pt, Error> {
        (**self).measure(text, size)
    }

    fn descent(&self, size: Pt) -> Pt {
        (**self).descent(size)
    }
}
