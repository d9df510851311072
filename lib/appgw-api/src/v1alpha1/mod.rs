/// API version v1alpha1 for Application Connector CRDs

pub mod application;

pub use application::{
    Application, ApplicationSpec, ApplicationStatus, CompassMetadata, Credentials, CsrfInfo,
    Entry, InstallationStatus, Service, API_ENTRY_TYPE, EVENTS_ENTRY_TYPE,
};

/// API group for Application Connector resources
pub const API_GROUP: &str = "applicationconnector.kyma-project.io";
/// API version for Application Connector resources
pub const API_VERSION: &str = "v1alpha1";
