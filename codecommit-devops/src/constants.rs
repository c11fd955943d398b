// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

pub const APPROVAL_RULE_CONTENT_VERSION: &str = "2018-11-08";
pub const APPROVERS_STATEMENT_TYPE: &str = "Approvers";
pub const REPOSITORY_ASSOCIATION_SUFFIX: &str = "-repos";

pub const PULL_REQUEST_ID: &str = "pullRequestId";
pub const REPOSITORY_NAME: &str = "repositoryName";
pub const SOURCE_COMMIT: &str = "sourceCommit";
pub const DESTINATION_COMMIT: &str = "destinationCommit";
pub const REVISION_ID: &str = "revisionId";

pub const HANDLER_ENV: &str = "_HANDLER";
pub const LOG_STREAM_ENV: &str = "AWS_LAMBDA_LOG_STREAM_NAME";
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
pub const DEFAULT_LOG_STREAM: &str = "unknown-log-stream";
