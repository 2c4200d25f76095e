//! OpenAPI 3.x / Swagger 2.0 document handling
//!
//! Loading, local reference inlining, operation enumeration and the
//! per-operation catalog built on top of them.

mod catalog;
mod document;
mod operations;
mod resolve;

pub(crate) use catalog::attach_form;
pub use catalog::{build_catalog, normalize_schema, sample_body, sample_path_params, ApiItem, SampleBody, CATALOG_MEDIA_TYPES};
pub use document::{declared_base_url, load_document, parse_document, DocumentVersion};
pub use operations::{
    find_operation, list_operations, MediaTypeEntry, Operation, OperationBody, Parameter, ParameterLocation,
    HTTP_METHODS,
};
pub use resolve::{resolve_refs, MAX_RESOLVED_NODES};
