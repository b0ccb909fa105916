use thiserror::Error;

use crate::domain::requisition::{RequisitionId, RequisitionStatus};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Missing required fields")]
    MissingRequiredFields,
    #[error("Requisition is already {status}")]
    AlreadyDecided { status: RequisitionStatus },
    #[error("unknown requisition status `{0}`")]
    UnknownStatus(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Requisition {0} not found")]
    NotFound(RequisitionId),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

/// Coarse classification shared by the HTTP surface and the operator CLI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    NotFound,
    Conflict,
    Unavailable,
    Internal,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Unavailable => "unavailable",
            Self::Internal => "internal",
        }
    }
}

impl ApplicationError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Domain(DomainError::MissingRequiredFields) => ErrorClass::Validation,
            Self::Domain(DomainError::AlreadyDecided { .. }) => ErrorClass::Conflict,
            Self::Domain(DomainError::UnknownStatus(_)) => ErrorClass::Internal,
            Self::NotFound(_) => ErrorClass::NotFound,
            Self::Persistence(_) => ErrorClass::Unavailable,
            Self::Configuration(_) => ErrorClass::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::requisition::{RequisitionId, RequisitionStatus};
    use crate::errors::{ApplicationError, DomainError, ErrorClass};

    #[test]
    fn missing_fields_classify_as_validation() {
        let error = ApplicationError::from(DomainError::MissingRequiredFields);

        assert_eq!(error.class(), ErrorClass::Validation);
        assert_eq!(error.to_string(), "Missing required fields");
    }

    #[test]
    fn already_decided_names_current_status() {
        let error = ApplicationError::from(DomainError::AlreadyDecided {
            status: RequisitionStatus::Approved,
        });

        assert_eq!(error.class(), ErrorClass::Conflict);
        assert_eq!(error.to_string(), "Requisition is already Approved");
    }

    #[test]
    fn not_found_names_identifier() {
        let error = ApplicationError::NotFound(RequisitionId(42));

        assert_eq!(error.class(), ErrorClass::NotFound);
        assert_eq!(error.to_string(), "Requisition 42 not found");
    }

    #[test]
    fn persistence_error_maps_to_unavailable() {
        let error = ApplicationError::Persistence("database lock timeout".to_owned());

        assert_eq!(error.class(), ErrorClass::Unavailable);
        assert_eq!(error.class().as_str(), "unavailable");
    }

    #[test]
    fn corrupt_status_is_internal() {
        let error = ApplicationError::from(DomainError::UnknownStatus("Limbo".to_owned()));
        assert_eq!(error.class(), ErrorClass::Internal);
    }
}
