// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Display is the bare service message, which is what ends up in a
    /// custom resource `Reason`.
    #[error("{message}")]
    CodeCommit {
        operation: &'static str,
        code: Option<String>,
        message: String,
    },
    #[error("Error parsing incoming JSON context {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Env with '{0}' can not be found.")]
    MissingEnvironmentVariable(String),
    #[error("Received pr build state changed event with unrecognized status '{0}'.")]
    UnrecognizedBuildStatus(String),
    #[error("{0} response did not include `{1}`")]
    MissingResponseField(&'static str, &'static str),
    #[error("Could not deliver custom resource response: {0}")]
    ResponseDelivery(String),
    #[error("{0}")]
    Configuration(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::ResponseDelivery(err.to_string())
    }
}
