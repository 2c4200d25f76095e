//! Request descriptors and the compiler that produces them

mod builder;
mod descriptor;
mod encode;

pub use builder::{build_request, build_request_with, supports_media_type, BuildOptions, REQUEST_MEDIA_TYPES};
pub use descriptor::{FileRef, FormValue, RequestBody, RequestDescriptor};
pub use encode::{encode_component, encode_form};
