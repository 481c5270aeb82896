//! Descriptor catalog and shared types for the Colleague metadata engine.
//!
//! The catalog is the static stand-in for the live route table: routes,
//! the controller actions behind them, the DTO types they exchange and the
//! extensible configurations of specification-based resources. The
//! [`version`] helpers resolve media type versions and pick the latest one.
//!
//! Most users depend on `colleague-metadata-openapi` or the
//! `colleague-metadata` service rather than on this crate directly.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod api;
mod catalog;
mod error;
mod extensible;
mod route;
mod types;
pub mod version;

pub use api::{module_domain_code, source_domain_name, ApiDomain, ApiType, PublishStatus, ReleaseStatus};
pub use catalog::{ApiConfigurationSource, Catalog, ColumnDefault, ConfiguredResource};
pub use error::{Error, Result};
pub use extensible::{
    ApiConfiguration, DeprecatedRepresentation, DeprecatedResource, DeprecationNotice,
    Enumeration, ExtensibleData, ExtensibleDataRow, FilterRow, SupportedMethod,
    DEFAULT_PAGE_LIMIT, STRING_LIST_TITLE, SUB_VALUE_MARK, VALUE_MARK,
};
pub use route::{
    api_name, route_parameters, ActionDescriptor, ActionDocs, ActionFilter, ArgumentDoc,
    ControllerDescriptor, ControllerDocs, HeaderVersion, MethodKind, QueryFilters,
    RouteDescriptor,
};
pub use types::{BaseType, EnumMember, FieldType, PropertyDescriptor, TypeDescriptor};
