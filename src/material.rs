#![warn(missing_docs)]
//! Optical materials and their dispersion models.
//!
//! A [`Material`] combines a dispersion model with the `solid` flag that the
//! structural algorithms of an [`OpticalTrain`](crate::train::OpticalTrain)
//! care about: a solid material occupies the space behind its owning surface
//! and therefore needs a mechanically closed surface pair.
//!
//! ```rust
//! use parax::material::Material;
//! use parax::wavelengths::FraunhoferLine;
//!
//! let glass = Material::nbk7();
//! let nd = glass.refractive_index(FraunhoferLine::D.wavelength()).unwrap();
//! assert!((nd - 1.5168).abs() < 1e-3);
//! ```
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use uom::si::{f64::Length, length::micrometer};

use crate::{
    error::{ParaxError, ParaxResult},
    wavelengths::FraunhoferLine,
};

/// Available dispersion models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IndexModel {
    /// Trivial model returning a wavelength-independent constant.
    Constant(f64),
    /// Sellmeier equation with three resonance terms (coefficients for
    /// wavelengths in micrometers).
    Sellmeier1 {
        /// oscillator strengths K1..K3
        k: [f64; 3],
        /// resonance wavelengths squared L1..L3 (µm²)
        l: [f64; 3],
    },
    /// Two-term Cauchy fit through a given d-line index and Abbe number.
    ///
    /// Useful for glasses only specified by their `nd`/`vd` catalog values.
    Abbe {
        /// refractive index at the d line
        nd: f64,
        /// Abbe number
        vd: f64,
    },
}

impl IndexModel {
    fn index_at(&self, wavelength: Length) -> ParaxResult<f64> {
        let lambda = wavelength.get::<micrometer>();
        if lambda <= 0.0 || !lambda.is_finite() {
            return Err(ParaxError::Material("wavelength must be >0".into()));
        }
        let n = match self {
            Self::Constant(n) => *n,
            Self::Sellmeier1 { k, l } => {
                let l_sq = lambda * lambda;
                let mut n_sq = 1.0;
                for i in 0..3 {
                    let denominator = l_sq - l[i];
                    if denominator == 0.0 {
                        return Err(ParaxError::Material(format!(
                            "wavelength {lambda} µm hits Sellmeier resonance"
                        )));
                    }
                    n_sq += k[i] * l_sq / denominator;
                }
                if n_sq < 0.0 {
                    return Err(ParaxError::Material(format!(
                        "Sellmeier model undefined at {lambda} µm"
                    )));
                }
                n_sq.sqrt()
            }
            Self::Abbe { nd, vd } => {
                let (a, b) = cauchy_coefficients(*nd, *vd);
                a + b / (lambda * lambda)
            }
        };
        if n < 1.0 || !n.is_finite() {
            return Err(ParaxError::Material(
                "refractive index calculated by model is <1.0 or not finite".into(),
            ));
        }
        Ok(n)
    }
}

/// Fit n(λ) = A + B/λ² through the d line and the Abbe number definition.
fn cauchy_coefficients(nd: f64, vd: f64) -> (f64, f64) {
    let lambda_d = FraunhoferLine::D.wavelength().get::<micrometer>();
    let lambda_f = FraunhoferLine::F.wavelength().get::<micrometer>();
    let lambda_c = FraunhoferLine::C.wavelength().get::<micrometer>();
    let dispersion = lambda_f.powi(-2) - lambda_c.powi(-2);
    let b = (nd - 1.0) / (vd * dispersion);
    let a = nd - b / (lambda_d * lambda_d);
    (a, b)
}

/// An optical material: a named dispersion model plus the `solid` flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    name: String,
    solid: bool,
    model: IndexModel,
}

impl Material {
    /// Create a new [`Material`] from a dispersion model.
    ///
    /// # Errors
    ///
    /// This function returns an error if a constant or Abbe model is given
    /// with an index below 1.0, a non-finite index or a non-positive Abbe
    /// number.
    pub fn new(name: &str, solid: bool, model: IndexModel) -> ParaxResult<Self> {
        match &model {
            IndexModel::Constant(n) => {
                if *n < 1.0 || !n.is_finite() {
                    return Err(ParaxError::Material(
                        "refractive index must be >=1.0 and finite".into(),
                    ));
                }
            }
            IndexModel::Abbe { nd, vd } => {
                if *nd < 1.0 || !nd.is_finite() {
                    return Err(ParaxError::Material(
                        "refractive index must be >=1.0 and finite".into(),
                    ));
                }
                if *vd <= 0.0 || !vd.is_finite() {
                    return Err(ParaxError::Material(
                        "Abbe number must be positive and finite".into(),
                    ));
                }
            }
            IndexModel::Sellmeier1 { .. } => {}
        }
        Ok(Self {
            name: name.to_string(),
            solid,
            model,
        })
    }
    /// Vacuum (n = 1).
    #[must_use]
    pub fn vacuum() -> Self {
        Self {
            name: "vacuum".to_string(),
            solid: false,
            model: IndexModel::Constant(1.0),
        }
    }
    /// Standard air at visible wavelengths.
    #[must_use]
    pub fn air() -> Self {
        Self {
            name: "air".to_string(),
            solid: false,
            model: IndexModel::Constant(1.000293),
        }
    }
    /// Schott N-BK7 crown glass (Sellmeier coefficients).
    #[must_use]
    pub fn nbk7() -> Self {
        Self {
            name: "N-BK7".to_string(),
            solid: true,
            model: IndexModel::Sellmeier1 {
                k: [1.039_612_12, 0.231_792_344, 1.010_469_45],
                l: [0.006_000_698_67, 0.020_017_914_4, 103.560_653],
            },
        }
    }
    /// Schott F2 flint glass (Sellmeier coefficients).
    #[must_use]
    pub fn f2() -> Self {
        Self {
            name: "F2".to_string(),
            solid: true,
            model: IndexModel::Sellmeier1 {
                k: [1.345_333_59, 0.209_073_176, 0.937_357_162],
                l: [0.009_977_438_71, 0.047_045_076_7, 111.886_764],
            },
        }
    }
    /// A solid glass specified by its catalog `nd`/`vd` values only.
    ///
    /// # Errors
    ///
    /// This function returns an error if `nd` is below 1.0 or `vd` is not
    /// positive.
    pub fn basic(name: &str, nd: f64, vd: f64) -> ParaxResult<Self> {
        Self::new(name, true, IndexModel::Abbe { nd, vd })
    }
    /// Returns the name of this [`Material`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Returns whether this material occupies physical space.
    ///
    /// A solid material between two surfaces requires the surface pair to be
    /// mechanically closed (see
    /// [`OpticalTrain::fix_sizes`](crate::train::OpticalTrain::fix_sizes)).
    #[must_use]
    pub const fn is_solid(&self) -> bool {
        self.solid
    }
    /// Refractive index at the given wavelength.
    ///
    /// # Errors
    ///
    /// This function returns an error if the model is undefined at the given
    /// wavelength or yields an index below 1.0 or not finite.
    pub fn refractive_index(&self, wavelength: Length) -> ParaxResult<f64> {
        self.model.index_at(wavelength)
    }
    /// Refractive index at the helium d line.
    ///
    /// # Errors
    ///
    /// This function returns an error if the model is undefined at the d line.
    pub fn nd(&self) -> ParaxResult<f64> {
        self.refractive_index(FraunhoferLine::D.wavelength())
    }
    /// Abbe number (nd - 1) / (nF - nC).
    ///
    /// Returns infinity for dispersionless models.
    ///
    /// # Errors
    ///
    /// This function returns an error if the model is undefined at one of the
    /// d, F or C lines.
    pub fn vd(&self) -> ParaxResult<f64> {
        let nd = self.nd()?;
        let nf = self.refractive_index(FraunhoferLine::F.wavelength())?;
        let nc = self.refractive_index(FraunhoferLine::C.wavelength())?;
        let principal_dispersion = nf - nc;
        if principal_dispersion.abs() < f64::EPSILON {
            return Ok(f64::INFINITY);
        }
        Ok((nd - 1.0) / principal_dispersion)
    }
}

impl Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
