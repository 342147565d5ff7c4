#![warn(missing_docs)]
//! Standard spectral lines used for dispersion bookkeeping.
//!
//! Refractive index models and the default color set of an
//! [`OpticalTrain`](crate::train::OpticalTrain) refer to the classic Fraunhofer
//! lines. The d (helium), C and F (hydrogen) lines in particular define the
//! Abbe number of a glass.
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use uom::si::{f64::Length, length::nanometer};

/// The common Fraunhofer spectral lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter)]
pub enum FraunhoferLine {
    /// i line (mercury, 365.0146 nm)
    #[strum(serialize = "i")]
    I,
    /// h line (mercury, 404.6561 nm)
    #[strum(serialize = "h")]
    H,
    /// g line (mercury, 435.8343 nm)
    #[strum(serialize = "g")]
    G,
    /// F' line (cadmium, 479.9914 nm)
    #[strum(serialize = "F'")]
    FPrime,
    /// F line (hydrogen, 486.1327 nm)
    #[strum(serialize = "F")]
    F,
    /// e line (mercury, 546.074 nm)
    #[strum(serialize = "e")]
    E,
    /// d line (helium, 587.5618 nm). The reference line for `nd`.
    #[strum(serialize = "d")]
    D,
    /// D line (sodium doublet center, 589.2938 nm)
    #[strum(serialize = "D")]
    SodiumD,
    /// C' line (cadmium, 643.8469 nm)
    #[strum(serialize = "C'")]
    CPrime,
    /// C line (hydrogen, 656.2725 nm)
    #[strum(serialize = "C")]
    C,
    /// r line (helium, 706.5188 nm)
    #[strum(serialize = "r")]
    R,
    /// A' line (potassium, 768.2 nm)
    #[strum(serialize = "A'")]
    APrime,
    /// s line (cesium, 852.11 nm)
    #[strum(serialize = "s")]
    S,
    /// t line (mercury, 1013.98 nm)
    #[strum(serialize = "t")]
    T,
}

impl FraunhoferLine {
    /// Vacuum wavelength of the spectral line.
    #[must_use]
    pub fn wavelength(&self) -> Length {
        let nanometers = match self {
            Self::I => 365.0146,
            Self::H => 404.6561,
            Self::G => 435.8343,
            Self::FPrime => 479.9914,
            Self::F => 486.1327,
            Self::E => 546.074,
            Self::D => 587.5618,
            Self::SodiumD => 589.2938,
            Self::CPrime => 643.8469,
            Self::C => 656.2725,
            Self::R => 706.5188,
            Self::APrime => 768.2,
            Self::S => 852.11,
            Self::T => 1013.98,
        };
        Length::new::<nanometer>(nanometers)
    }
}

/// The default color set of a train: the d, C and F lines.
///
/// This triple spans the visible range and is the conventional basis for
/// first-order chromatic evaluation.
#[must_use]
pub fn default_wavelengths() -> Vec<Length> {
    vec![
        FraunhoferLine::D.wavelength(),
        FraunhoferLine::C.wavelength(),
        FraunhoferLine::F.wavelength(),
    ]
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use strum::IntoEnumIterator;
    #[test]
    fn d_line() {
        assert_relative_eq!(
            FraunhoferLine::D.wavelength().get::<nanometer>(),
            587.5618
        );
    }
    #[test]
    fn display() {
        assert_eq!(format!("{}", FraunhoferLine::D), "d");
        assert_eq!(format!("{}", FraunhoferLine::SodiumD), "D");
        assert_eq!(format!("{}", FraunhoferLine::FPrime), "F'");
    }
    #[test]
    fn ordering() {
        let mut last = 0.0;
        for line in FraunhoferLine::iter() {
            let wavelength = line.wavelength().get::<nanometer>();
            assert!(wavelength > last);
            last = wavelength;
        }
    }
    #[test]
    fn default_triple() {
        let wavelengths = default_wavelengths();
        assert_eq!(wavelengths.len(), 3);
        assert_eq!(wavelengths[0], FraunhoferLine::D.wavelength());
    }
}
