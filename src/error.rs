#![warn(missing_docs)]
//! Parax specific error structures
use std::{error::Error, fmt::Display};

/// Parax specific Result type
pub type ParaxResult<T> = std::result::Result<T, ParaxError>;

/// Errors that can be returned by various parax functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParaxError {
    /// a structural invariant of an [`OpticalTrain`](crate::train::OpticalTrain) is violated
    /// (e.g. the first element is not an object or the last element is not an image)
    InvariantViolation(String),
    /// an operation needs an element (e.g. the aperture stop) which does not exist in the train
    MissingElement(String),
    /// errors while evaluating a material model (e.g. a wavelength outside the valid range)
    Material(String),
    /// errors not falling in one of the categories above
    Other(String),
}

impl Display for ParaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvariantViolation(m) => {
                write!(f, "InvariantViolation:{m}")
            }
            Self::MissingElement(m) => {
                write!(f, "MissingElement:{m}")
            }
            Self::Material(m) => {
                write!(f, "Material:{m}")
            }
            Self::Other(m) => write!(f, "Parax Error:Other:{m}"),
        }
    }
}
impl Error for ParaxError {}

impl std::convert::From<String> for ParaxError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}
#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn from() {
        let error = ParaxError::from("test".to_string());
        assert_eq!(error, ParaxError::Other("test".to_string()));
    }
    #[test]
    fn display() {
        assert_eq!(
            format!("{}", ParaxError::InvariantViolation("test".to_string())),
            "InvariantViolation:test"
        );
        assert_eq!(
            format!("{}", ParaxError::MissingElement("test".to_string())),
            "MissingElement:test"
        );
        assert_eq!(
            format!("{}", ParaxError::Material("test".to_string())),
            "Material:test"
        );
        assert_eq!(
            format!("{}", ParaxError::Other("test".to_string())),
            "Parax Error:Other:test"
        );
    }
    #[test]
    fn debug() {
        assert_eq!(
            format!("{:?}", ParaxError::InvariantViolation("test".to_string())),
            "InvariantViolation(\"test\")"
        );
    }
}
