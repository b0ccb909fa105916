pub mod config;
pub mod domain;
pub mod errors;

pub use domain::requisition::{
    NewRequisition, Requisition, RequisitionDraft, RequisitionId, RequisitionStatus,
    DEFAULT_APPROVER,
};
pub use errors::{ApplicationError, DomainError, ErrorClass};
