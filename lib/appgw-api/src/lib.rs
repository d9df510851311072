//! Application Connector API types for Kubernetes integration
//!
//! This library defines the custom resources read by the application gateway:
//! - Application: an external system and the services/entries it exposes

pub mod v1alpha1;

pub use v1alpha1::{Application, ApplicationSpec, Credentials, CsrfInfo, Entry, Service};
