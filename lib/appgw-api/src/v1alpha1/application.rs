use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Entry type of an entry that describes a callable API
pub const API_ENTRY_TYPE: &str = "API";
/// Entry type of an entry that describes an event catalog
pub const EVENTS_ENTRY_TYPE: &str = "Events";

/// Application describes an external system and the services it exposes
/// to the cluster. Every API-typed entry of a service is routable through
/// the application gateway.
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "applicationconnector.kyma-project.io",
    version = "v1alpha1",
    kind = "Application",
    plural = "applications",
    shortname = "app",
    derive = "Default",
    status = "ApplicationStatus",
)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSpec {
    /// Free-form description of the application
    #[serde(default)]
    pub description: String,

    /// Skip installation of the per-application gateway resources
    #[serde(default)]
    pub skip_installation: bool,

    /// Services exposed by the application, in declaration order
    #[serde(default)]
    pub services: Vec<Service>,

    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    #[serde(default)]
    pub tenant: String,

    #[serde(default)]
    pub group: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub compass_metadata: Option<CompassMetadata>,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub provider_display_name: String,

    #[serde(default)]
    pub long_description: String,

    /// Skip TLS verification for every API of this application
    #[serde(default)]
    pub skip_verify: bool,

    /// Encode the request path before forwarding to any API of this application
    #[serde(default)]
    pub encode_url: bool,
}

/// Metadata of an application registered through Compass
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompassMetadata {
    /// Identifier of the application in Compass
    pub application_id: String,

    #[serde(default)]
    pub authentication: CompassAuthentication,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompassAuthentication {
    #[serde(default)]
    pub client_ids: Vec<String>,
}

/// A service groups one or more entries of an application
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,

    #[serde(default)]
    pub identifier: String,

    #[serde(default)]
    pub name: String,

    /// Human readable name; its normalized form is used for routing
    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub long_description: String,

    #[serde(default)]
    pub provider_display_name: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_create_parameter_schema: Option<String>,

    /// Entries of this service, in declaration order
    #[serde(default)]
    pub entries: Vec<Entry>,
}

/// A single API or event catalog of a service
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Entry type, "API" or "Events"
    #[serde(rename = "type")]
    pub entry_type: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub id: String,

    /// URL the gateway forwards requests to
    #[serde(default)]
    pub target_url: String,

    #[serde(default)]
    pub specification_url: String,

    #[serde(default)]
    pub api_type: String,

    #[serde(default)]
    pub credentials: Credentials,

    /// Secret holding additional headers and query parameters for requests
    #[serde(default)]
    pub request_parameters_secret_name: String,

    #[serde(default)]
    pub central_gateway_url: String,

    #[serde(default)]
    pub access_label: String,

    #[serde(default)]
    pub gateway_url: String,
}

impl Entry {
    /// Whether this entry describes a callable API
    pub fn is_api(&self) -> bool {
        self.entry_type == API_ENTRY_TYPE
    }
}

/// Reference to the credentials needed to call an entry's target
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Credential type, e.g. "OAuth" or "BasicAuth"
    #[serde(default, rename = "type")]
    pub credential_type: String,

    /// Name of the Secret holding the credential material
    #[serde(default)]
    pub secret_name: String,

    #[serde(default)]
    pub authentication_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub csrf_info: Option<CsrfInfo>,
}

impl Credentials {
    /// A credentials block with every field unset carries no credentials
    pub fn is_empty(&self) -> bool {
        *self == Credentials::default()
    }
}

/// CSRF token endpoint configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CsrfInfo {
    #[serde(rename = "tokenEndpointURL")]
    pub token_endpoint_url: String,
}

/// Status of an Application
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatus {
    #[serde(default)]
    pub installation_status: InstallationStatus,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct InstallationStatus {
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub description: String,
}
