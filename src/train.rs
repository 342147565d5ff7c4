#![warn(missing_docs)]
//! The ordered optical train and its structural algorithms.
//!
//! An [`OpticalTrain`] is an ordered, mutable sequence of [`Element`]s; index
//! 0 points toward object space, the last index toward image space. The train
//! owns the structural invariants (object at the head, image at the tail, a
//! single aperture stop somewhere in between) and the algorithms that must
//! stay consistent with the ordering: direction reversal, unit rescaling,
//! mechanical clear-aperture fixing, cross-section outline extraction and the
//! paraxial transfer-matrix chain.
//!
//! ```rust
//! use parax::element::{Element, Image, Object, Surface};
//! use parax::material::Material;
//! use parax::train::OpticalTrain;
//! use parax::wavelengths::FraunhoferLine;
//!
//! let mut train = OpticalTrain::new(
//!     "singlet",
//!     vec![
//!         Object::default().into(),
//!         Element::from(Surface::new(5.0, 0.02, 10.0, Some(Material::nbk7())).unwrap()),
//!         Element::from(Surface::new(3.0, -0.02, 10.0, Some(Material::air())).unwrap()),
//!         Element::from(Image::new(95.0, 8.0).unwrap()),
//!     ],
//! );
//! train.fix_sizes();
//! let m = train
//!     .paraxial_matrix(FraunhoferLine::D.wavelength(), 1, None)
//!     .unwrap();
//! assert!(m[(1, 0)] < 0.0); // positive focusing power
//! ```
use std::fmt::Display;
use std::ops::{Index, IndexMut};

use itertools::Itertools;
use log::{info, warn};
use nalgebra::{Matrix2, Point2};
use serde::{Deserialize, Serialize};
use uom::si::{f64::Length, length::nanometer};

use crate::{
    cut::{CutAxis, Outline},
    element::{Aperture, Element, Image, Object},
    error::{ParaxError, ParaxResult},
    wavelengths::default_wavelengths,
};

/// An ordered train of optical elements from object space to image space.
///
/// The train carries a linear `scale` factor converting its internal length
/// unit to meters (the default of `1e-3` means all distances, radii and
/// reciprocal curvatures are in millimeters) and an ordered wavelength list
/// whose first entry is the primary color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpticalTrain {
    elements: Vec<Element>,
    description: String,
    scale: f64,
    wavelengths: Vec<Length>,
}

impl Default for OpticalTrain {
    /// A minimal train: object at infinity, aperture stop, image plane.
    fn default() -> Self {
        Self {
            elements: vec![
                Element::Object(Object::default()),
                Element::Aperture(Aperture::default()),
                Element::Image(Image::default()),
            ],
            description: String::new(),
            scale: 1e-3,
            wavelengths: default_wavelengths(),
        }
    }
}

impl OpticalTrain {
    /// Create a new train from an ordered element list.
    ///
    /// The scale defaults to `1e-3` (millimeters) and the wavelengths to the
    /// d, C and F Fraunhofer lines.
    #[must_use]
    pub fn new(description: &str, elements: Vec<Element>) -> Self {
        Self {
            elements,
            description: description.to_string(),
            scale: 1e-3,
            wavelengths: default_wavelengths(),
        }
    }
    /// Set the linear scale factor (train unit in meters).
    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
    /// Set the wavelength list used for default color evaluation.
    #[must_use]
    pub fn with_wavelengths(mut self, wavelengths: Vec<Length>) -> Self {
        self.wavelengths = wavelengths;
        self
    }
    /// Returns the description of this train.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
    /// Returns the linear scale factor (train unit in meters).
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }
    /// Returns the wavelength list; the first entry is the primary color.
    #[must_use]
    pub fn wavelengths(&self) -> &[Length] {
        &self.wavelengths
    }
    /// Returns the elements in axial order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }
    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }
    /// Returns `true` if the train has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
    /// Iterate over the elements in axial order.
    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.elements.iter()
    }
    /// Iterate mutably over the elements in axial order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Element> {
        self.elements.iter_mut()
    }
    /// Append an element on the image side.
    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }
    /// Returns the object terminating the train on its light-source side.
    ///
    /// # Errors
    ///
    /// This function returns an error if the first element is not an
    /// [`Object`] (a structural invariant broken by direct index mutation).
    pub fn object(&self) -> ParaxResult<&Object> {
        match self.elements.first() {
            Some(Element::Object(object)) => Ok(object),
            _ => Err(ParaxError::InvariantViolation(
                "the first element of the train is not an object".into(),
            )),
        }
    }
    /// Returns a mutable reference to the object.
    ///
    /// # Errors
    ///
    /// Same contract as [`OpticalTrain::object`].
    pub fn object_mut(&mut self) -> ParaxResult<&mut Object> {
        match self.elements.first_mut() {
            Some(Element::Object(object)) => Ok(object),
            _ => Err(ParaxError::InvariantViolation(
                "the first element of the train is not an object".into(),
            )),
        }
    }
    /// Replace the object, or insert one at the head if the train does not
    /// start with an object yet (the train grows by one element).
    pub fn set_object(&mut self, object: Object) {
        if matches!(self.elements.first(), Some(Element::Object(_))) {
            self.elements[0] = Element::Object(object);
        } else {
            self.elements.insert(0, Element::Object(object));
        }
    }
    /// Returns the image plane terminating the train on its detector side.
    ///
    /// # Errors
    ///
    /// This function returns an error if the last element is not an
    /// [`Image`].
    pub fn image(&self) -> ParaxResult<&Image> {
        match self.elements.last() {
            Some(Element::Image(image)) => Ok(image),
            _ => Err(ParaxError::InvariantViolation(
                "the last element of the train is not an image".into(),
            )),
        }
    }
    /// Returns a mutable reference to the image plane.
    ///
    /// # Errors
    ///
    /// Same contract as [`OpticalTrain::image`].
    pub fn image_mut(&mut self) -> ParaxResult<&mut Image> {
        match self.elements.last_mut() {
            Some(Element::Image(image)) => Ok(image),
            _ => Err(ParaxError::InvariantViolation(
                "the last element of the train is not an image".into(),
            )),
        }
    }
    /// Replace the image plane, or append one if the train does not end with
    /// an image yet (the train grows by one element).
    pub fn set_image(&mut self, image: Image) {
        if matches!(self.elements.last(), Some(Element::Image(_))) {
            let last = self.elements.len() - 1;
            self.elements[last] = Element::Image(image);
        } else {
            self.elements.push(Element::Image(image));
        }
    }
    /// Returns the aperture stop: the first [`Aperture`] element in axial
    /// order, or `None` if the train has no stop.
    ///
    /// Trains are expected to contain a single stop; if more than one exists
    /// the first one wins and a warning is logged.
    #[must_use]
    pub fn aperture(&self) -> Option<&Aperture> {
        let mut found = None;
        for element in &self.elements {
            if let Element::Aperture(aperture) = element {
                if found.is_none() {
                    found = Some(aperture);
                } else {
                    warn!("train contains more than one aperture stop, using the first one");
                    break;
                }
            }
        }
        found
    }
    /// Index of the aperture stop.
    ///
    /// # Errors
    ///
    /// This function returns an error if the train has no aperture stop.
    pub fn aperture_index(&self) -> ParaxResult<usize> {
        self.elements
            .iter()
            .position(|element| matches!(element, Element::Aperture(_)))
            .ok_or_else(|| {
                ParaxError::MissingElement("the train does not contain an aperture stop".into())
            })
    }
    /// Total axial length of the train (sum of all element distances).
    #[must_use]
    pub fn track_length(&self) -> f64 {
        self.elements.iter().map(Element::distance).sum()
    }
    /// Reverse the train in place so that it models light traveling in the
    /// opposite axial direction.
    ///
    /// Beyond reversing the element order this flips every element's local
    /// orientation sense, shifts the inter-element distances forward through
    /// the new order and shifts the material ownership backward through it
    /// (each surface owns the material *behind* it, so the association must
    /// move against the distance shift). Calling `reverse` twice restores an
    /// operationally equivalent train.
    pub fn reverse(&mut self) {
        self.elements.reverse();
        for element in &mut self.elements {
            element.reverse();
        }
        // every element takes over the distance of its predecessor in the
        // new order
        let mut running_distance = 0.0;
        for element in &mut self.elements {
            let old = element.distance();
            element.set_distance(running_distance);
            running_distance = old;
        }
        // the material between two surfaces moves to the other one of the
        // pair, walking opposite to the distance shift
        let mut running_material = None;
        for element in self.elements.iter_mut().rev() {
            if let Element::Surface(surface) = element {
                std::mem::swap(&mut running_material, &mut surface.material);
            }
        }
    }
    /// Re-express the train in a different base unit, preserving physical
    /// geometry.
    ///
    /// Divides the train scale by `factor` and scales every element's
    /// length-valued attributes by it in the same operation. With
    /// `factor: None` the train is brought back to millimeters
    /// (`factor = scale / 1e-3`).
    ///
    /// # Errors
    ///
    /// This function returns an error if the factor is not positive and
    /// finite; the train is left untouched in that case.
    pub fn rescale(&mut self, factor: Option<f64>) -> ParaxResult<()> {
        let factor = factor.unwrap_or(self.scale / 1e-3);
        if !(factor.is_normal() && factor.is_sign_positive()) {
            return Err(ParaxError::Other(
                "rescale factor must be positive and finite".into(),
            ));
        }
        self.scale /= factor;
        for element in &mut self.elements {
            element.rescale(factor);
        }
        Ok(())
    }
    /// Enforce mechanical consistency of the clear apertures.
    ///
    /// Currently this grows convex lens surfaces so that no surface is
    /// mechanically smaller than the closing surface it must seal against,
    /// capped at the hemisphere of each surface's curvature. Radii only ever
    /// grow; repeated calls are idempotent.
    pub fn fix_sizes(&mut self) {
        self.resize_convex();
    }
    /// Single forward pass growing convex surfaces to the size of their
    /// closing partner. Interior surfaces with a material participate; the
    /// most recent solid surface is carried as the pending one until its
    /// closing surface is met.
    fn resize_convex(&mut self) {
        if self.elements.len() < 3 {
            return;
        }
        let mut pending: Option<(usize, f64)> = None;
        for index in 1..self.elements.len() - 1 {
            let (curvature, solid) = match &self.elements[index] {
                Element::Surface(surface) => match &surface.material {
                    Some(material) => (surface.curvature, material.is_solid()),
                    None => continue,
                },
                _ => continue,
            };
            if let Some((pending_index, pending_curvature)) = pending.take() {
                if curvature < 0.0 {
                    // concave toward the pending surface, must be at least
                    // as large to seal the block
                    let closing_radius = self.elements[pending_index].radius();
                    self.grow_surface_radius(index, closing_radius);
                }
                if pending_curvature > 0.0 {
                    let closing_radius = self.elements[index].radius();
                    self.grow_surface_radius(pending_index, closing_radius);
                }
            }
            if solid {
                pending = Some((index, curvature));
            }
        }
    }
    fn grow_surface_radius(&mut self, index: usize, radius: f64) {
        if let Element::Surface(surface) = &mut self.elements[index] {
            // the clear aperture must stay within the hemisphere of the
            // surface's curvature (see [`Surface::new`])
            let radius = if surface.curvature == 0.0 {
                radius
            } else {
                radius.min(1.0 / surface.curvature.abs())
            };
            if radius > surface.radius {
                info!(
                    "growing radius of surface {index} from {} to {radius}",
                    surface.radius
                );
                surface.radius = radius;
            }
        }
    }
    /// Extract the cross-section outlines of all elements along `axis`.
    ///
    /// Yields one open curve per marker or transparent surface and one closed
    /// polygon per solid material block (the block's two bounding surface
    /// cuts joined at their radial extremes). The iterator is a pure function
    /// of the current train state and can be restarted by calling this method
    /// again.
    #[must_use]
    pub fn surfaces_cut(&self, axis: CutAxis, n_points: usize) -> SurfacesCut<'_> {
        SurfacesCut {
            train: self,
            axis,
            n_points,
            index: 0,
            z0: 0.0,
            pending: None,
        }
    }
    /// Per-element paraxial matrices over the element range `start..stop`
    /// (`stop: None` meaning the end of the train).
    ///
    /// The running refractive index is seeded from the element *before*
    /// `start`; every yielded item carries the index behind the respective
    /// element along with its transfer matrix.
    ///
    /// # Errors
    ///
    /// This function returns an error if the range is invalid (`start` must
    /// be at least 1) or the seeding element's material model fails at the
    /// given wavelength.
    pub fn paraxial_matrices(
        &self,
        wavelength: Length,
        start: usize,
        stop: Option<usize>,
    ) -> ParaxResult<ParaxialMatrices<'_>> {
        let stop = stop.unwrap_or(self.elements.len());
        if start < 1 || start > self.elements.len() || stop < start || stop > self.elements.len()
        {
            return Err(ParaxError::InvariantViolation(format!(
                "invalid element range {start}..{stop} for a train of {} elements",
                self.elements.len()
            )));
        }
        let n = self.elements[start - 1].refractive_index(wavelength)?;
        Ok(ParaxialMatrices {
            elements: &self.elements[start..stop],
            wavelength,
            n,
            index: 0,
            failed: false,
        })
    }
    /// Composed paraxial transfer matrix over the element range
    /// `start..stop`, mapping a ray state entering at `start` to the state
    /// leaving at `stop`.
    ///
    /// Later elements are applied on the left; transfer matrices do not
    /// commute in general, so the composition order is load-bearing.
    ///
    /// # Errors
    ///
    /// This function returns an error if the range is invalid or a material
    /// model fails at the given wavelength.
    pub fn paraxial_matrix(
        &self,
        wavelength: Length,
        start: usize,
        stop: Option<usize>,
    ) -> ParaxResult<Matrix2<f64>> {
        let mut composed = Matrix2::identity();
        for item in self.paraxial_matrices(wavelength, start, stop)? {
            let (_, matrix) = item?;
            composed = matrix * composed;
        }
        Ok(composed)
    }
}

impl Index<usize> for OpticalTrain {
    type Output = Element;
    fn index(&self, index: usize) -> &Self::Output {
        &self.elements[index]
    }
}
impl IndexMut<usize> for OpticalTrain {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.elements[index]
    }
}
impl<'a> IntoIterator for &'a OpticalTrain {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;
    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl Display for OpticalTrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "System: {}", self.description)?;
        writeln!(f, "Scale: {} mm", self.scale / 1e-3)?;
        writeln!(
            f,
            "Wavelengths: {} nm",
            self.wavelengths
                .iter()
                .map(|w| format!("{:.0}", w.get::<nanometer>()))
                .join(", ")
        )?;
        writeln!(f, "Track length: {:.5}", self.track_length())?;
        writeln!(
            f,
            "{:>2} {:1} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "#", "T", "Distance", "Rad Curv", "Diameter", "Material", "n", "nd", "Vd"
        )?;
        for (index, element) in self.elements.iter().enumerate() {
            let curvature = element.curvature();
            let radius_of_curvature = if curvature == 0.0 {
                f64::INFINITY
            } else {
                1.0 / curvature
            };
            let material = element.material();
            let material_name = material.map_or_else(String::new, ToString::to_string);
            let nd = material.and_then(|m| m.nd().ok()).unwrap_or(f64::NAN);
            let vd = material.and_then(|m| m.vd().ok()).unwrap_or(f64::NAN);
            // presentation only: fall back to nd if the primary color cannot
            // be evaluated
            let n = match (material, self.wavelengths.first()) {
                (Some(material), Some(wavelength)) => {
                    material.refractive_index(*wavelength).unwrap_or(nd)
                }
                _ => nd,
            };
            writeln!(
                f,
                "{index:2} {:1} {:10.5} {:10.4} {:10.5} {material_name:>10} {n:10.3} {nd:10.3} {vd:10.2}",
                element.element_type(),
                element.distance(),
                radius_of_curvature,
                element.radius() * 2.0,
            )?;
        }
        Ok(())
    }
}

/// Iterator over the cross-section outlines of a train.
///
/// Created by [`OpticalTrain::surfaces_cut`].
#[derive(Debug, Clone)]
pub struct SurfacesCut<'a> {
    train: &'a OpticalTrain,
    axis: CutAxis,
    n_points: usize,
    index: usize,
    z0: f64,
    pending: Option<Vec<Point2<f64>>>,
}

impl Iterator for SurfacesCut<'_> {
    type Item = Outline;
    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.train.elements.len() {
            let element = &self.train.elements[self.index];
            self.index += 1;
            self.z0 += element.distance();
            let local = element.transform_from(element.surface_cut(self.axis, self.n_points));
            let mut outline: Vec<Point2<f64>> =
                local.iter().map(|point| self.axis.project(point)).collect();
            for point in &mut outline {
                point.y += self.z0;
            }
            // markers and virtual surfaces stay open and do not interact
            // with a pending solid
            let Some(material) = element.material() else {
                return Some(Outline::open(outline));
            };
            let solid = material.is_solid();
            let ready = if let Some(pending) = self.pending.take() {
                Some(Outline::closed(close_block(&pending, &outline)))
            } else if solid {
                // first surface of a block, waits for its closing partner
                None
            } else {
                Some(Outline::open(outline.clone()))
            };
            if solid {
                self.pending = Some(outline);
            }
            if ready.is_some() {
                return ready;
            }
        }
        None
    }
}

/// Join the cuts of two bounding surfaces of a solid block into one closed
/// polygon. At each end of the cut the corner extending further radially
/// wins, so the block edge always reaches the larger of the two surfaces.
fn close_block(pending: &[Point2<f64>], current: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let pending_first = pending[0];
    let pending_last = pending[pending.len() - 1];
    let current_first = current[0];
    let current_last = current[current.len() - 1];
    let lower = if current_first.x < pending_first.x {
        Point2::new(current_first.x, pending_first.y)
    } else {
        Point2::new(pending_first.x, current_first.y)
    };
    let upper = if current_last.x > pending_last.x {
        Point2::new(current_last.x, pending_last.y)
    } else {
        Point2::new(pending_last.x, current_last.y)
    };
    let mut ring = Vec::with_capacity(pending.len() + current.len() + 3);
    ring.extend_from_slice(pending);
    ring.push(upper);
    ring.extend(current.iter().rev().copied());
    ring.push(lower);
    ring.push(pending_first);
    ring
}

/// Iterator over the per-element paraxial matrices of a train range.
///
/// Created by [`OpticalTrain::paraxial_matrices`]; carries the running
/// refractive index through the chain. After the first error the iterator is
/// exhausted.
#[derive(Debug, Clone)]
pub struct ParaxialMatrices<'a> {
    elements: &'a [Element],
    wavelength: Length,
    n: f64,
    index: usize,
    failed: bool,
}

impl Iterator for ParaxialMatrices<'_> {
    type Item = ParaxResult<(f64, Matrix2<f64>)>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.index >= self.elements.len() {
            return None;
        }
        let element = &self.elements[self.index];
        self.index += 1;
        match element.paraxial_matrix(self.n, self.wavelength) {
            Ok((n, matrix)) => {
                self.n = n;
                Some(Ok((n, matrix)))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}
