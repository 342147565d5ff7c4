//! **parax** — paraxial modeling of sequential optical imaging systems.
//!
//! An optical system is described as an [`OpticalTrain`]: an ordered sequence
//! of [`Element`]s running from object space to image space. The train keeps
//! the structural invariants of a sequential system (object at the head,
//! image at the tail, one aperture stop) and provides the first-order
//! algorithms that depend on that ordering:
//!
//! * direction reversal ([`OpticalTrain::reverse`]),
//! * unit-consistent rescaling ([`OpticalTrain::rescale`]),
//! * mechanical clear-aperture fixing ([`OpticalTrain::fix_sizes`]),
//! * cross-section outline extraction ([`OpticalTrain::surfaces_cut`]),
//! * the chained 2×2 paraxial transfer matrix
//!   ([`OpticalTrain::paraxial_matrix`]).
//!
//! Wavelengths are `uom` lengths; dispersion comes from the [`Material`]
//! models in [`material`]. Transfer matrices act on the reduced ray state
//! (height, refractive index × angle).
#![allow(clippy::module_name_repetitions)]

pub mod cut;
pub mod element;
pub mod error;
pub mod material;
pub mod train;
pub mod wavelengths;

pub use cut::{CutAxis, Outline};
pub use element::Element;
pub use material::Material;
pub use train::OpticalTrain;
