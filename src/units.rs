use derive_more::{Add, AddAssign, Display, From, Into, Sub, SubAssign};

/// A measurement in PDF points (1/72 of an inch). All layout arithmetic in
/// the crate is carried out in points.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, PartialOrd, Add, AddAssign, Sub, SubAssign, Display,
    From, Into,
)]
pub struct Pt(pub f32);

impl Pt {
    /// The smaller of two measurements
    pub fn min(self, other: Pt) -> Pt {
        if self <= other {
            self
        } else {
            other
        }
    }

    /// The larger of two measurements
    pub fn max(self, other: Pt) -> Pt {
        if self >= other {
            self
        } else {
            other
        }
    }
}

impl std::ops::Mul<f32> for Pt {
    type Output = Pt;

    fn mul(self, rhs: f32) -> Pt {
        Pt(self.0 * rhs)
    }
}

impl std::ops::Div<f32> for Pt {
    type Output = Pt;

    fn div(self, rhs: f32) -> Pt {
        Pt(self.0 / rhs)
    }
}
