//! Routable API descriptors produced by the resolver
use appgw_api::{Application, Entry};
use serde::{Deserialize, Serialize};

/// Everything needed to call one API entry of an application
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDescriptor {
    pub target_url: String,
    pub credentials: Option<Credentials>,
    /// Name of the Secret with additional request headers and query parameters
    pub request_parameters_secret_name: String,
    pub skip_verify: bool,
    pub encode_url: bool,
}

/// Credentials needed to call an API
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(rename = "type")]
    pub credential_type: String,
    /// Name of the Secret holding the credential material
    pub secret_name: String,
    pub url: String,
    pub csrf_token_endpoint_url: String,
}

impl ApiDescriptor {
    /// Project an API entry of `app` into a descriptor, inheriting the
    /// application-wide TLS and URL encoding flags
    pub fn from_entry(app: &Application, entry: &Entry) -> Self {
        Self {
            target_url: entry.target_url.clone(),
            credentials: Credentials::from_entry(entry),
            request_parameters_secret_name: entry.request_parameters_secret_name.clone(),
            skip_verify: app.spec.skip_verify,
            encode_url: app.spec.encode_url,
        }
    }
}

impl Credentials {
    /// `None` when the entry's credentials block is entirely unset
    fn from_entry(entry: &Entry) -> Option<Self> {
        let credentials = &entry.credentials;
        if credentials.is_empty() {
            return None;
        }

        Some(Self {
            credential_type: credentials.credential_type.clone(),
            secret_name: credentials.secret_name.clone(),
            url: credentials.authentication_url.clone(),
            csrf_token_endpoint_url: credentials
                .csrf_info
                .as_ref()
                .map(|csrf| csrf.token_endpoint_url.clone())
                .unwrap_or_default(),
        })
    }
}
