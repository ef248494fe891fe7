//! Project configuration: wire candidate, validation and starter files
//!
//! This module provides:
//! - The decoded payload shape ([`RawConfigCandidate`])
//! - The validated record ([`ResolvedConfig`]) and [`RemovalPolicy`]
//! - Starter configuration file generation

pub mod starter;

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use starter::create_starter;

/// Configuration as reported by the script; every field is optional on the wire
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfigCandidate {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub profile: Option<String>,

    #[serde(default)]
    pub stage: Option<String>,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub removal_policy: Option<String>,
}

impl RawConfigCandidate {
    /// Decode a payload body; unknown keys are ignored
    pub fn decode(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }
}

/// What happens to resources when the stage is removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemovalPolicy {
    Remove,
    #[default]
    Retain,
    RetainAll,
}

impl RemovalPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemovalPolicy::Remove => "remove",
            RemovalPolicy::Retain => "retain",
            RemovalPolicy::RetainAll => "retain-all",
        }
    }
}

impl fmt::Display for RemovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RemovalPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "remove" => Ok(RemovalPolicy::Remove),
            "retain" => Ok(RemovalPolicy::Retain),
            "retain-all" => Ok(RemovalPolicy::RetainAll),
            other => Err(ValidationError::InvalidRemovalPolicy(other.to_string())),
        }
    }
}

/// A fully validated project configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    name: String,
    region: String,
    profile: String,
    stage: String,
    removal_policy: RemovalPolicy,
}

impl ResolvedConfig {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Empty means the ambient default profile
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Empty means the caller must supply a stage later
    pub fn stage(&self) -> &str {
        &self.stage
    }

    pub fn removal_policy(&self) -> RemovalPolicy {
        self.removal_policy
    }
}

/// Validate a candidate. Name is checked before region, region before policy.
pub fn validate(candidate: RawConfigCandidate) -> Result<ResolvedConfig, ValidationError> {
    let name = candidate.name.unwrap_or_default();
    if name.is_empty() {
        return Err(ValidationError::MissingName);
    }

    let region = candidate.region.unwrap_or_default();
    if region.is_empty() {
        return Err(ValidationError::MissingRegion);
    }

    let removal_policy = match candidate.removal_policy.as_deref() {
        None | Some("") => RemovalPolicy::default(),
        Some(value) => value.parse()?,
    };

    Ok(ResolvedConfig {
        name,
        region,
        profile: candidate.profile.unwrap_or_default(),
        stage: candidate.stage.unwrap_or_default(),
        removal_policy,
    })
}
