#![warn(missing_docs)]
//! Optical train elements.
//!
//! An [`Element`] is one entry of an [`OpticalTrain`](crate::train::OpticalTrain):
//! either a structural marker ([`Object`], [`Aperture`], [`Image`]) or a
//! refractive/reflective [`Surface`]. The variants form a closed sum type so
//! that the structural algorithms of the train can match on element roles
//! exhaustively instead of probing for capabilities.
//!
//! All axial distances, radii and curvatures are expressed in the owning
//! train's current scale unit. An element's `distance` is the axial
//! separation from the element immediately preceding it.
use nalgebra::{Matrix2, Point3, Vector2};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use uom::si::f64::Length;

use crate::{
    error::{ParaxError, ParaxResult},
    cut::CutAxis,
    material::Material,
};

/// Role tag of an [`Element`], used by text rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter)]
pub enum ElementType {
    /// object plane marker
    #[strum(serialize = "O")]
    Object,
    /// aperture stop marker
    #[strum(serialize = "A")]
    Aperture,
    /// refractive or reflective surface
    #[strum(serialize = "S")]
    Surface,
    /// image plane marker
    #[strum(serialize = "I")]
    Image,
}

/// The object plane terminating the train on its light-source side.
///
/// An object is either at a finite distance (sized by `radius`) or at
/// infinity (sized by `angular_radius`, in radians).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub(crate) distance: f64,
    pub(crate) finite: bool,
    pub(crate) radius: f64,
    pub(crate) angular_radius: f64,
}
impl Object {
    /// Create an object at infinity with the given angular half-size.
    ///
    /// # Errors
    ///
    /// This function returns an error if the angular radius is negative or not
    /// finite.
    pub fn at_infinity(angular_radius: f64) -> ParaxResult<Self> {
        if angular_radius.is_sign_negative() || !angular_radius.is_finite() {
            return Err(ParaxError::Other(
                "angular radius must be non-negative and finite".into(),
            ));
        }
        Ok(Self {
            distance: 0.0,
            finite: false,
            radius: 0.0,
            angular_radius,
        })
    }
    /// Create an object at a finite distance with the given half-size.
    ///
    /// # Errors
    ///
    /// This function returns an error if the radius is negative or not finite.
    pub fn at_distance(distance: f64, radius: f64) -> ParaxResult<Self> {
        if radius.is_sign_negative() || !radius.is_finite() {
            return Err(ParaxError::Other(
                "radius must be non-negative and finite".into(),
            ));
        }
        if !distance.is_finite() {
            return Err(ParaxError::Other("distance must be finite".into()));
        }
        Ok(Self {
            distance,
            finite: true,
            radius,
            angular_radius: 0.0,
        })
    }
    /// Returns whether the object sits at a finite distance.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.finite
    }
    /// Axial separation from the preceding element.
    #[must_use]
    pub const fn distance(&self) -> f64 {
        self.distance
    }
    /// Object half-size, meaningful for objects at a finite distance.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }
    /// Angular half-size, meaningful for objects at infinity.
    #[must_use]
    pub const fn angular_radius(&self) -> f64 {
        self.angular_radius
    }
}
impl Default for Object {
    fn default() -> Self {
        Self {
            distance: 0.0,
            finite: false,
            radius: 0.0,
            angular_radius: 0.0,
        }
    }
}

/// The aperture stop marker limiting the axial ray bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aperture {
    pub(crate) distance: f64,
    pub(crate) radius: f64,
}
impl Aperture {
    /// Create a new aperture stop with the given clear half-diameter.
    ///
    /// # Errors
    ///
    /// This function returns an error if the radius is not positive and
    /// finite.
    pub fn new(distance: f64, radius: f64) -> ParaxResult<Self> {
        if !(radius.is_normal() && radius.is_sign_positive()) {
            return Err(ParaxError::Other("radius must be positive".into()));
        }
        if !distance.is_finite() {
            return Err(ParaxError::Other("distance must be finite".into()));
        }
        Ok(Self { distance, radius })
    }
    /// Axial separation from the preceding element.
    #[must_use]
    pub const fn distance(&self) -> f64 {
        self.distance
    }
    /// Clear half-diameter of the stop.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }
}
impl Default for Aperture {
    fn default() -> Self {
        Self {
            distance: 0.0,
            radius: 1.0,
        }
    }
}

/// The image plane terminating the train on its detector side.
///
/// Like an [`Object`], an image is either at a finite distance (sized by
/// `radius`) or at infinity (sized by `angular_radius`, in radians), the
/// latter describing the exit side of an afocal system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub(crate) distance: f64,
    pub(crate) finite: bool,
    pub(crate) radius: f64,
    pub(crate) angular_radius: f64,
}
impl Image {
    /// Create a new image plane at a finite distance with the given half-size.
    ///
    /// # Errors
    ///
    /// This function returns an error if the radius is negative or not finite.
    pub fn new(distance: f64, radius: f64) -> ParaxResult<Self> {
        if radius.is_sign_negative() || !radius.is_finite() {
            return Err(ParaxError::Other(
                "radius must be non-negative and finite".into(),
            ));
        }
        if !distance.is_finite() {
            return Err(ParaxError::Other("distance must be finite".into()));
        }
        Ok(Self {
            distance,
            finite: true,
            radius,
            angular_radius: 0.0,
        })
    }
    /// Create an image at infinity with the given angular half-size.
    ///
    /// # Errors
    ///
    /// This function returns an error if the angular radius is negative or not
    /// finite.
    pub fn at_infinity(angular_radius: f64) -> ParaxResult<Self> {
        if angular_radius.is_sign_negative() || !angular_radius.is_finite() {
            return Err(ParaxError::Other(
                "angular radius must be non-negative and finite".into(),
            ));
        }
        Ok(Self {
            distance: 0.0,
            finite: false,
            radius: 0.0,
            angular_radius,
        })
    }
    /// Returns whether the image sits at a finite distance.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.finite
    }
    /// Axial separation from the preceding element.
    #[must_use]
    pub const fn distance(&self) -> f64 {
        self.distance
    }
    /// Image half-size, meaningful for images at a finite distance.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }
    /// Angular half-size, meaningful for images at infinity.
    #[must_use]
    pub const fn angular_radius(&self) -> f64 {
        self.angular_radius
    }
}
impl Default for Image {
    fn default() -> Self {
        Self {
            distance: 0.0,
            finite: true,
            radius: 0.0,
            angular_radius: 0.0,
        }
    }
}

/// A refractive or reflective optical surface.
///
/// The surface owns the material occupying the space *behind* it (between it
/// and the next element); `material: None` models a virtual interface back to
/// vacuum. Curvature is the reciprocal radius of curvature, positive when the
/// center of curvature lies behind the surface; `0.0` is flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub(crate) distance: f64,
    pub(crate) curvature: f64,
    pub(crate) radius: f64,
    pub(crate) material: Option<Material>,
    pub(crate) mirror: bool,
    pub(crate) decenter: Vector2<f64>,
}
impl Surface {
    /// Create a new refractive surface.
    ///
    /// # Errors
    ///
    /// This function returns an error if
    ///  - the radius is not positive and finite,
    ///  - the curvature is not finite,
    ///  - the clear aperture extends beyond the hemisphere of the given
    ///    curvature (`|curvature| * radius > 1`).
    pub fn new(
        distance: f64,
        curvature: f64,
        radius: f64,
        material: Option<Material>,
    ) -> ParaxResult<Self> {
        Self::validate(distance, curvature, radius)?;
        Ok(Self {
            distance,
            curvature,
            radius,
            material,
            mirror: false,
            decenter: Vector2::zeros(),
        })
    }
    /// Create a new reflective surface.
    ///
    /// A mirror reverses the propagation direction; the running refractive
    /// index of the paraxial chain is negated on reflection.
    ///
    /// # Errors
    ///
    /// Same validity conditions as [`Surface::new`].
    pub fn mirror(distance: f64, curvature: f64, radius: f64) -> ParaxResult<Self> {
        Self::validate(distance, curvature, radius)?;
        Ok(Self {
            distance,
            curvature,
            radius,
            material: None,
            mirror: true,
            decenter: Vector2::zeros(),
        })
    }
    fn validate(distance: f64, curvature: f64, radius: f64) -> ParaxResult<()> {
        if !(radius.is_normal() && radius.is_sign_positive()) {
            return Err(ParaxError::Other("radius must be positive".into()));
        }
        if !distance.is_finite() {
            return Err(ParaxError::Other("distance must be finite".into()));
        }
        if !curvature.is_finite() {
            return Err(ParaxError::Other("curvature must be finite".into()));
        }
        if curvature.abs() * radius > 1.0 {
            return Err(ParaxError::Other(
                "clear aperture extends beyond the hemisphere of this curvature".into(),
            ));
        }
        Ok(())
    }
    /// Set a transverse decenter of the surface vertex.
    #[must_use]
    pub fn with_decenter(mut self, x: f64, y: f64) -> Self {
        self.decenter = Vector2::new(x, y);
        self
    }
    /// Returns the curvature (reciprocal radius of curvature).
    #[must_use]
    pub const fn curvature(&self) -> f64 {
        self.curvature
    }
    /// Axial separation from the preceding element.
    #[must_use]
    pub const fn distance(&self) -> f64 {
        self.distance
    }
    /// Mechanical clear half-diameter.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }
    /// Returns the material behind this surface, if any.
    #[must_use]
    pub const fn material(&self) -> Option<&Material> {
        self.material.as_ref()
    }
    /// Returns whether this surface is reflective.
    #[must_use]
    pub const fn is_mirror(&self) -> bool {
        self.mirror
    }
    /// Surface sag at transverse height `t`.
    ///
    /// Valid for `|t| <= radius`, guaranteed by the constructor invariant
    /// `|curvature| * radius <= 1`.
    fn sag(&self, t: f64) -> f64 {
        let c = self.curvature;
        // rounding may push the radicand a few ulp below zero when the
        // aperture touches the hemisphere exactly
        c * t * t / (1.0 + (1.0 - c * c * t * t).max(0.0).sqrt())
    }
}

/// One entry of an optical train.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Element {
    /// object plane marker
    Object(Object),
    /// aperture stop marker
    Aperture(Aperture),
    /// image plane marker
    Image(Image),
    /// refractive or reflective surface
    Surface(Surface),
}

impl Element {
    /// Returns the role tag of this [`Element`].
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        match self {
            Self::Object(_) => ElementType::Object,
            Self::Aperture(_) => ElementType::Aperture,
            Self::Image(_) => ElementType::Image,
            Self::Surface(_) => ElementType::Surface,
        }
    }
    /// Axial separation from the preceding element.
    #[must_use]
    pub const fn distance(&self) -> f64 {
        match self {
            Self::Object(e) => e.distance,
            Self::Aperture(e) => e.distance,
            Self::Image(e) => e.distance,
            Self::Surface(e) => e.distance,
        }
    }
    /// Set the axial separation from the preceding element.
    pub fn set_distance(&mut self, distance: f64) {
        match self {
            Self::Object(e) => e.distance = distance,
            Self::Aperture(e) => e.distance = distance,
            Self::Image(e) => e.distance = distance,
            Self::Surface(e) => e.distance = distance,
        }
    }
    /// Returns the material behind this element, if it can own one.
    #[must_use]
    pub const fn material(&self) -> Option<&Material> {
        match self {
            Self::Surface(s) => s.material.as_ref(),
            _ => None,
        }
    }
    /// Returns the curvature; markers are flat.
    #[must_use]
    pub const fn curvature(&self) -> f64 {
        match self {
            Self::Surface(s) => s.curvature,
            _ => 0.0,
        }
    }
    /// Mechanical (or angular, for objects at infinity) clear half-size.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        match self {
            Self::Object(o) => {
                if o.finite {
                    o.radius
                } else {
                    o.angular_radius
                }
            }
            Self::Aperture(a) => a.radius,
            Self::Image(i) => {
                if i.finite {
                    i.radius
                } else {
                    i.angular_radius
                }
            }
            Self::Surface(s) => s.radius,
        }
    }
    /// Returns whether the element sits at a finite conjugate distance.
    #[must_use]
    pub const fn finite(&self) -> bool {
        match self {
            Self::Object(o) => o.finite,
            Self::Image(i) => i.finite,
            _ => true,
        }
    }
    /// Flip the element-local orientation sense for a direction-reversed
    /// train: the curvature changes sign. Involutive.
    pub fn reverse(&mut self) {
        if let Self::Surface(s) = self {
            s.curvature = -s.curvature;
        }
    }
    /// Scale all length-valued attributes by `factor`.
    ///
    /// Curvature is a reciprocal length and scales by `1 / factor`; angular
    /// sizes are unaffected.
    pub fn rescale(&mut self, factor: f64) {
        match self {
            Self::Object(o) => {
                o.distance *= factor;
                o.radius *= factor;
            }
            Self::Aperture(a) => {
                a.distance *= factor;
                a.radius *= factor;
            }
            Self::Image(i) => {
                i.distance *= factor;
                i.radius *= factor;
            }
            Self::Surface(s) => {
                s.distance *= factor;
                s.radius *= factor;
                s.curvature /= factor;
                s.decenter *= factor;
            }
        }
    }
    /// Refractive index of the medium behind this element.
    ///
    /// Elements without a material (markers, virtual surfaces, mirrors)
    /// border vacuum.
    ///
    /// # Errors
    ///
    /// This function returns an error if the material model fails at the
    /// given wavelength.
    pub fn refractive_index(&self, wavelength: Length) -> ParaxResult<f64> {
        match self.material() {
            Some(material) => material.refractive_index(wavelength),
            None => Ok(1.0),
        }
    }
    /// Paraxial transfer matrix of this element.
    ///
    /// Maps the ray state (height, index × angle) entering the element to the
    /// state leaving it and returns the refractive index behind the element
    /// along with the matrix. Markers and flat zero-power surfaces contribute
    /// the identity; a mirror negates the running index.
    ///
    /// # Errors
    ///
    /// This function returns an error if the material model fails at the
    /// given wavelength.
    pub fn paraxial_matrix(
        &self,
        n0: f64,
        wavelength: Length,
    ) -> ParaxResult<(f64, Matrix2<f64>)> {
        match self {
            Self::Surface(s) => {
                let n1 = if s.mirror {
                    -n0
                } else {
                    self.refractive_index(wavelength)?
                };
                let power = s.curvature * (n1 - n0);
                Ok((n1, Matrix2::new(1.0, 0.0, -power, 1.0)))
            }
            _ => Ok((n0, Matrix2::identity())),
        }
    }
    /// Sample the element's cross-section outline in element-local
    /// coordinates.
    ///
    /// Returns `n_points` (at least 2) points spanning the clear aperture
    /// along the chosen transverse axis; the z coordinate carries the surface
    /// sag. Markers produce a flat chord.
    #[must_use]
    pub fn surface_cut(&self, axis: CutAxis, n_points: usize) -> Vec<Point3<f64>> {
        let n_points = n_points.max(2);
        let radius = self.radius();
        let mut points = Vec::with_capacity(n_points);
        for i in 0..n_points {
            #[allow(clippy::cast_precision_loss)]
            let t = radius * (2.0 * (i as f64) / ((n_points - 1) as f64) - 1.0);
            let z = match self {
                Self::Surface(s) => s.sag(t),
                _ => 0.0,
            };
            let point = match axis {
                CutAxis::X => Point3::new(t, 0.0, z),
                CutAxis::Y => Point3::new(0.0, t, z),
            };
            points.push(point);
        }
        points
    }
    /// Map element-local cut points into train coordinates (still relative to
    /// the element's axial position).
    #[must_use]
    pub fn transform_from(&self, mut points: Vec<Point3<f64>>) -> Vec<Point3<f64>> {
        if let Self::Surface(s) = self {
            for point in &mut points {
                point.x += s.decenter.x;
                point.y += s.decenter.y;
            }
        }
        points
    }
}

impl From<Object> for Element {
    fn from(value: Object) -> Self {
        Self::Object(value)
    }
}
impl From<Aperture> for Element {
    fn from(value: Aperture) -> Self {
        Self::Aperture(value)
    }
}
impl From<Image> for Element {
    fn from(value: Image) -> Self {
        Self::Image(value)
    }
}
impl From<Surface> for Element {
    fn from(value: Surface) -> Self {
        Self::Surface(value)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::wavelengths::FraunhoferLine;
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;

    #[test]
    fn surface_new_invalid() {
        assert_matches!(
            Surface::new(0.0, 0.0, -1.0, None),
            Err(ParaxError::Other(_))
        );
        assert!(Surface::new(0.0, 0.0, 0.0, None).is_err());
        assert!(Surface::new(0.0, 0.0, f64::NAN, None).is_err());
        assert!(Surface::new(0.0, f64::INFINITY, 1.0, None).is_err());
        assert!(Surface::new(f64::NAN, 0.0, 1.0, None).is_err());
        // clear aperture larger than the hemisphere
        assert!(Surface::new(0.0, 0.2, 6.0, None).is_err());
        assert!(Surface::new(0.0, 0.2, 5.0, None).is_ok());
    }
    #[test]
    fn element_type_display() {
        let element = Element::from(Object::default());
        assert_eq!(format!("{}", element.element_type()), "O");
        let element = Element::from(Surface::new(0.0, 0.0, 1.0, None).unwrap());
        assert_eq!(format!("{}", element.element_type()), "S");
    }
    #[test]
    fn sag() {
        let surface = Surface::new(0.0, 0.1, 5.0, None).unwrap();
        assert_relative_eq!(surface.sag(0.0), 0.0);
        // exact sphere: z = R - sqrt(R^2 - t^2) with R = 10
        assert_relative_eq!(
            surface.sag(5.0),
            10.0 - (100.0_f64 - 25.0).sqrt(),
            epsilon = 1e-12
        );
        assert_relative_eq!(surface.sag(-5.0), surface.sag(5.0), epsilon = 1e-12);
    }
    #[test]
    fn reverse_involutive() {
        let mut element = Element::from(Surface::new(0.0, 0.1, 5.0, None).unwrap());
        element.reverse();
        assert_relative_eq!(element.curvature(), -0.1);
        element.reverse();
        assert_relative_eq!(element.curvature(), 0.1);
    }
    #[test]
    fn rescale() {
        let surface = Surface::new(2.0, 0.1, 5.0, None)
            .unwrap()
            .with_decenter(1.0, 0.0);
        let mut element = Element::from(surface);
        element.rescale(10.0);
        assert_relative_eq!(element.distance(), 20.0);
        assert_relative_eq!(element.radius(), 50.0);
        assert_relative_eq!(element.curvature(), 0.01);
        let Element::Surface(s) = &element else {
            panic!("element is not a surface")
        };
        assert_relative_eq!(s.decenter.x, 10.0);
    }
    #[test]
    fn image_at_infinity() {
        let image = Image::at_infinity(0.05).unwrap();
        assert!(!image.is_finite());
        assert_relative_eq!(image.angular_radius(), 0.05);
        let mut element = Element::from(image);
        assert!(!element.finite());
        // the afocal image is sized by its angular radius
        assert_relative_eq!(element.radius(), 0.05);
        element.rescale(10.0);
        assert_relative_eq!(element.radius(), 0.05);

        let element = Element::from(Image::new(10.0, 2.0).unwrap());
        assert!(element.finite());
        assert_relative_eq!(element.radius(), 2.0);
        assert!(Image::at_infinity(-0.1).is_err());
        assert!(Image::at_infinity(f64::NAN).is_err());
    }
    #[test]
    fn rescale_object_angular() {
        let mut element = Element::from(Object::at_infinity(0.1).unwrap());
        element.rescale(10.0);
        // angular sizes are dimensionless
        assert_relative_eq!(element.radius(), 0.1);
    }
    #[test]
    fn marker_matrix_is_identity() {
        let element = Element::from(Aperture::default());
        let (n, matrix) = element
            .paraxial_matrix(1.5, FraunhoferLine::D.wavelength())
            .unwrap();
        assert_relative_eq!(n, 1.5);
        assert_relative_eq!(matrix, Matrix2::identity());
    }
    #[test]
    fn surface_matrix_power() {
        let glass = Material::new("glass", true, crate::material::IndexModel::Constant(1.5))
            .unwrap();
        let element = Element::from(Surface::new(0.0, 0.01, 5.0, Some(glass)).unwrap());
        let (n, matrix) = element
            .paraxial_matrix(1.0, FraunhoferLine::D.wavelength())
            .unwrap();
        assert_relative_eq!(n, 1.5);
        assert_relative_eq!(matrix[(1, 0)], -0.01 * 0.5);
        assert_relative_eq!(matrix[(0, 0)], 1.0);
        assert_relative_eq!(matrix[(0, 1)], 0.0);
        assert_relative_eq!(matrix[(1, 1)], 1.0);
    }
    #[test]
    fn mirror_negates_index() {
        let element = Element::from(Surface::mirror(0.0, 0.0, 5.0).unwrap());
        let (n, matrix) = element
            .paraxial_matrix(1.0, FraunhoferLine::D.wavelength())
            .unwrap();
        assert_relative_eq!(n, -1.0);
        assert_relative_eq!(matrix, Matrix2::identity());
    }
    #[test]
    fn curved_mirror_power() {
        let element = Element::from(Surface::mirror(0.0, 0.05, 5.0).unwrap());
        let (n, matrix) = element
            .paraxial_matrix(1.0, FraunhoferLine::D.wavelength())
            .unwrap();
        assert_relative_eq!(n, -1.0);
        // p = c (n1 - n0) = -2 c for reflection in vacuum
        assert_relative_eq!(matrix[(1, 0)], 0.1);
    }
    #[test]
    fn surface_cut_flat_marker() {
        let element = Element::from(Aperture::new(0.0, 2.0).unwrap());
        let points = element.surface_cut(CutAxis::Y, 3);
        assert_eq!(points.len(), 3);
        assert_relative_eq!(points[0].y, -2.0);
        assert_relative_eq!(points[2].y, 2.0);
        assert_relative_eq!(points[1].z, 0.0);
    }
    #[test]
    fn surface_cut_sag_and_decenter() {
        let surface = Surface::new(0.0, 0.1, 5.0, None)
            .unwrap()
            .with_decenter(0.0, 1.0);
        let element = Element::from(surface.clone());
        let points = element.transform_from(element.surface_cut(CutAxis::Y, 3));
        assert_relative_eq!(points[0].y, -4.0);
        assert_relative_eq!(points[1].y, 1.0);
        assert_relative_eq!(points[0].z, surface.sag(-5.0));
    }
    #[test]
    fn surface_cut_minimum_points() {
        let element = Element::from(Image::new(0.0, 1.0).unwrap());
        assert_eq!(element.surface_cut(CutAxis::Y, 0).len(), 2);
    }
    #[test]
    fn refractive_index_defaults_to_vacuum() {
        let element = Element::from(Surface::new(0.0, 0.0, 1.0, None).unwrap());
        assert_relative_eq!(
            element
                .refractive_index(FraunhoferLine::D.wavelength())
                .unwrap(),
            1.0
        );
    }
}
