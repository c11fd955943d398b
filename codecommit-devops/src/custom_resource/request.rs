// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// A CloudFormation custom resource lifecycle request. Properties default to
/// raw JSON; providers narrow them to their own record with
/// [`LifecycleEvent::parse_properties`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CustomResourceRequest<P = Value> {
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    #[serde(rename = "StackId")]
    pub stack_id: String,
    #[serde(rename = "RequestId")]
    pub request_id: String,
    #[serde(rename = "ResourceType", default)]
    pub resource_type: String,
    #[serde(rename = "LogicalResourceId")]
    pub logical_resource_id: String,
    #[serde(flatten)]
    pub event: LifecycleEvent<P>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "RequestType")]
pub enum LifecycleEvent<P = Value> {
    Create {
        #[serde(rename = "ResourceProperties")]
        properties: P,
    },
    Update {
        #[serde(rename = "PhysicalResourceId")]
        physical_resource_id: String,
        #[serde(rename = "ResourceProperties")]
        properties: P,
        #[serde(rename = "OldResourceProperties")]
        old_properties: P,
    },
    Delete {
        #[serde(rename = "PhysicalResourceId")]
        physical_resource_id: String,
        #[serde(rename = "ResourceProperties")]
        properties: P,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

impl Display for RequestType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestType::Create => f.write_str("Create"),
            RequestType::Update => f.write_str("Update"),
            RequestType::Delete => f.write_str("Delete"),
        }
    }
}

impl<P> LifecycleEvent<P> {
    pub fn request_type(&self) -> RequestType {
        match self {
            LifecycleEvent::Create { .. } => RequestType::Create,
            LifecycleEvent::Update { .. } => RequestType::Update,
            LifecycleEvent::Delete { .. } => RequestType::Delete,
        }
    }

    /// `None` for `Create`, which has no identity yet.
    pub fn physical_resource_id(&self) -> Option<&str> {
        match self {
            LifecycleEvent::Create { .. } => None,
            LifecycleEvent::Update {
                physical_resource_id,
                ..
            }
            | LifecycleEvent::Delete {
                physical_resource_id,
                ..
            } => Some(physical_resource_id),
        }
    }
}

impl LifecycleEvent<Value> {
    /// Validates both property bags against `T`, failing on the first missing
    /// or mistyped field.
    pub fn parse_properties<T: DeserializeOwned>(&self) -> serde_json::Result<LifecycleEvent<T>> {
        let event = match self {
            LifecycleEvent::Create { properties } => LifecycleEvent::Create {
                properties: T::deserialize(properties)?,
            },
            LifecycleEvent::Update {
                physical_resource_id,
                properties,
                old_properties,
            } => LifecycleEvent::Update {
                physical_resource_id: physical_resource_id.clone(),
                properties: T::deserialize(properties)?,
                old_properties: T::deserialize(old_properties)?,
            },
            LifecycleEvent::Delete {
                physical_resource_id,
                properties,
            } => LifecycleEvent::Delete {
                physical_resource_id: physical_resource_id.clone(),
                properties: T::deserialize(properties)?,
            },
        };
        Ok(event)
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod request_tests;
