// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::constants::{
    DESTINATION_COMMIT, PULL_REQUEST_ID, REPOSITORY_NAME, REVISION_ID, SOURCE_COMMIT,
};
use crate::{Error, Result};

/// `CodeBuild Build State Change` as delivered by EventBridge. Only the
/// fields the bridge reads are modelled.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BuildStateChangeEvent {
    #[serde(rename = "detail-type", default)]
    pub detail_type: String,
    #[serde(default)]
    pub source: String,
    pub detail: BuildStateChangeDetail,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildStateChangeDetail {
    pub build_status: String,
    #[serde(default)]
    pub project_name: String,
    pub build_id: String,
    pub additional_information: AdditionalInformation,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdditionalInformation {
    pub environment: BuildEnvironment,
    #[serde(default)]
    pub build_complete: bool,
    #[serde(default)]
    pub initiator: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildEnvironment {
    #[serde(default)]
    pub environment_variables: Vec<EnvironmentVariable>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EnvironmentVariable {
    pub name: String,
    #[serde(rename = "type", default)]
    pub variable_type: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    InProgress,
    Succeeded,
    Failed,
    Other(String),
}

impl From<&str> for BuildStatus {
    fn from(status: &str) -> Self {
        match status {
            "IN_PROGRESS" => BuildStatus::InProgress,
            "SUCCEEDED" => BuildStatus::Succeeded,
            "FAILED" => BuildStatus::Failed,
            other => BuildStatus::Other(other.to_string()),
        }
    }
}

impl Display for BuildStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildStatus::InProgress => f.write_str("IN_PROGRESS"),
            BuildStatus::Succeeded => f.write_str("SUCCEEDED"),
            BuildStatus::Failed => f.write_str("FAILED"),
            BuildStatus::Other(status) => f.write_str(status),
        }
    }
}

impl BuildStateChangeEvent {
    pub fn build_status(&self) -> BuildStatus {
        BuildStatus::from(self.detail.build_status.as_str())
    }

    pub fn environment_variables(&self) -> &[EnvironmentVariable] {
        &self
            .detail
            .additional_information
            .environment
            .environment_variables
    }
}

pub fn find_environment_by_name<'a>(
    envs: &'a [EnvironmentVariable],
    name: &str,
) -> Result<&'a str> {
    envs.iter()
        .find(|env| env.name == name)
        .map(|env| env.value.as_str())
        .ok_or_else(|| Error::MissingEnvironmentVariable(name.to_string()))
}

/// Identifies the pull request a build ran for. The PR build project sets
/// these as build environment overrides when it starts the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestBuildContext {
    pub pull_request_id: String,
    pub repository_name: String,
    pub before_commit_id: String,
    pub after_commit_id: String,
}

impl PullRequestBuildContext {
    pub fn from_environment(envs: &[EnvironmentVariable]) -> Result<Self> {
        Ok(PullRequestBuildContext {
            pull_request_id: find_environment_by_name(envs, PULL_REQUEST_ID)?.to_string(),
            repository_name: find_environment_by_name(envs, REPOSITORY_NAME)?.to_string(),
            before_commit_id: find_environment_by_name(envs, SOURCE_COMMIT)?.to_string(),
            after_commit_id: find_environment_by_name(envs, DESTINATION_COMMIT)?.to_string(),
        })
    }

    pub fn revision_id(envs: &[EnvironmentVariable]) -> Result<String> {
        find_environment_by_name(envs, REVISION_ID).map(str::to_string)
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod event_tests;
