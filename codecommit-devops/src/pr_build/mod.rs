// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

pub mod event;

pub use event::{BuildStateChangeEvent, BuildStatus, EnvironmentVariable, PullRequestBuildContext};

use log::{debug, error, info};
use std::sync::Arc;

use crate::codecommit::{ApprovalState, CodeCommitApi, PullRequestComment};
use crate::{Error, Result};

/// Turns CodeBuild state changes of pull request builds into pull request
/// comments, and approves the revision once its build succeeded.
///
/// There is nobody to answer to: every failure is returned to the runtime
/// and only shows up in the function's logs.
pub struct PullRequestBuildBridge {
    codecommit: Arc<dyn CodeCommitApi>,
}

impl PullRequestBuildBridge {
    pub fn new(codecommit: Arc<dyn CodeCommitApi>) -> Self {
        PullRequestBuildBridge { codecommit }
    }

    pub async fn handle(&self, event: &BuildStateChangeEvent) -> Result<()> {
        info!(
            "Receiving Build State Changed event of PR Build {} with status {}",
            &event.detail.build_id, &event.detail.build_status
        );
        if let Ok(payload) = serde_json::to_string_pretty(event) {
            debug!("{}", payload);
        }

        let envs = event.environment_variables();
        let context = PullRequestBuildContext::from_environment(envs)?;
        let build_id = &event.detail.build_id;

        match event.build_status() {
            BuildStatus::InProgress => {
                let content = format!(
                    "Started CI build {} on commit '{}' for this PR.",
                    build_id, &context.after_commit_id
                );
                self.comment(&context, content).await?;
            }
            BuildStatus::Succeeded => {
                let revision_id = PullRequestBuildContext::revision_id(envs)?;
                let content = format!(
                    "CI build '{}' on commit '{}' succeeded.",
                    build_id, &context.after_commit_id
                );
                let (commented, approved) = tokio::join!(
                    self.comment(&context, content),
                    self.codecommit.update_pull_request_approval_state(
                        &context.pull_request_id,
                        &revision_id,
                        ApprovalState::Approve,
                    )
                );
                commented?;
                approved?;
                info!(
                    "Approved revision {} of pull request {}.",
                    &revision_id, &context.pull_request_id
                );
            }
            BuildStatus::Failed => {
                let content = format!(
                    "CI build '{}' on commit '{}' failed.",
                    build_id, &context.after_commit_id
                );
                self.comment(&context, content).await?;
            }
            BuildStatus::Other(status) => {
                let err = Error::UnrecognizedBuildStatus(status);
                error!("{}", err);
                return Err(err);
            }
        }
        Ok(())
    }

    async fn comment(&self, context: &PullRequestBuildContext, content: String) -> Result<()> {
        let comment = PullRequestComment {
            pull_request_id: context.pull_request_id.clone(),
            repository_name: context.repository_name.clone(),
            before_commit_id: context.before_commit_id.clone(),
            after_commit_id: context.after_commit_id.clone(),
            content,
        };
        self.codecommit
            .post_comment_for_pull_request(&comment)
            .await?;
        info!(
            "Commented on pull request {} of {}.",
            &context.pull_request_id, &context.repository_name
        );
        Ok(())
    }
}
