// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use aws_sdk_codecommit::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_codecommit::types;
use serde::Serialize;

use crate::{Error, Result};

/// Attributes of an approval rule template as CodeCommit reports them. The
/// field names follow the service so they line up with `Fn::GetAtt`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRuleTemplate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_rule_template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_rule_template_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_rule_template_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_rule_template_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_content_sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_user: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedApprovalRuleTemplate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_rule_template_id: Option<String>,
}

/// Outcome of a batch (dis)association. Repositories that could not be
/// processed do not fail the call, they are listed in `errors`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepositoryBatchResult {
    pub repository_names: Vec<String>,
    pub errors: Vec<RepositoryBatchError>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepositoryBatchError {
    pub repository_name: Option<String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PullRequestComment {
    pub pull_request_id: String,
    pub repository_name: String,
    pub before_commit_id: String,
    pub after_commit_id: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalState {
    Approve,
    Revoke,
}

impl From<ApprovalState> for types::ApprovalState {
    fn from(state: ApprovalState) -> Self {
        match state {
            ApprovalState::Approve => types::ApprovalState::Approve,
            ApprovalState::Revoke => types::ApprovalState::Revoke,
        }
    }
}

/// The CodeCommit operations the handlers are allowed to call. Handlers get
/// an instance injected so tests can stand in a recording fake.
#[async_trait]
pub trait CodeCommitApi: Send + Sync {
    async fn create_approval_rule_template(
        &self,
        name: &str,
        description: &str,
        content: &str,
    ) -> Result<ApprovalRuleTemplate>;

    async fn update_approval_rule_template_content(
        &self,
        name: &str,
        content: &str,
    ) -> Result<ApprovalRuleTemplate>;

    async fn update_approval_rule_template_description(
        &self,
        name: &str,
        description: &str,
    ) -> Result<ApprovalRuleTemplate>;

    async fn update_approval_rule_template_name(
        &self,
        old_name: &str,
        new_name: &str,
    ) -> Result<ApprovalRuleTemplate>;

    async fn delete_approval_rule_template(
        &self,
        name: &str,
    ) -> Result<DeletedApprovalRuleTemplate>;

    async fn batch_associate_approval_rule_template_with_repositories(
        &self,
        name: &str,
        repository_names: &[String],
    ) -> Result<RepositoryBatchResult>;

    async fn batch_disassociate_approval_rule_template_from_repositories(
        &self,
        name: &str,
        repository_names: &[String],
    ) -> Result<RepositoryBatchResult>;

    async fn post_comment_for_pull_request(&self, comment: &PullRequestComment) -> Result<()>;

    async fn update_pull_request_approval_state(
        &self,
        pull_request_id: &str,
        revision_id: &str,
        state: ApprovalState,
    ) -> Result<()>;
}

pub struct SdkCodeCommit {
    client: aws_sdk_codecommit::Client,
}

impl SdkCodeCommit {
    pub fn new(client: aws_sdk_codecommit::Client) -> Self {
        SdkCodeCommit { client }
    }

    /// No extra configuration is needed as long as the function role carries
    /// the CodeCommit permissions.
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(aws_sdk_codecommit::Client::new(&config))
    }
}

fn upstream<E, R>(operation: &'static str) -> impl FnOnce(SdkError<E, R>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    move |err| {
        let code = err.code().map(str::to_string);
        let message = match err.message() {
            Some(message) => message.to_string(),
            None => DisplayErrorContext(&err).to_string(),
        };
        Error::CodeCommit {
            operation,
            code,
            message,
        }
    }
}

fn owned<'a>(value: impl Into<Option<&'a str>>) -> Option<String> {
    value.into().map(str::to_string)
}

impl From<&types::ApprovalRuleTemplate> for ApprovalRuleTemplate {
    fn from(template: &types::ApprovalRuleTemplate) -> Self {
        ApprovalRuleTemplate {
            approval_rule_template_id: owned(template.approval_rule_template_id()),
            approval_rule_template_name: owned(template.approval_rule_template_name()),
            approval_rule_template_description: owned(
                template.approval_rule_template_description(),
            ),
            approval_rule_template_content: owned(template.approval_rule_template_content()),
            rule_content_sha256: owned(template.rule_content_sha256()),
            last_modified_user: owned(template.last_modified_user()),
        }
    }
}

fn template_of(
    operation: &'static str,
    template: Option<&types::ApprovalRuleTemplate>,
) -> Result<ApprovalRuleTemplate> {
    template
        .map(ApprovalRuleTemplate::from)
        .ok_or(Error::MissingResponseField(operation, "approvalRuleTemplate"))
}

#[async_trait]
impl CodeCommitApi for SdkCodeCommit {
    async fn create_approval_rule_template(
        &self,
        name: &str,
        description: &str,
        content: &str,
    ) -> Result<ApprovalRuleTemplate> {
        const OPERATION: &str = "CreateApprovalRuleTemplate";
        let output = self
            .client
            .create_approval_rule_template()
            .approval_rule_template_name(name)
            .approval_rule_template_description(description)
            .approval_rule_template_content(content)
            .send()
            .await
            .map_err(upstream(OPERATION))?;
        template_of(OPERATION, output.approval_rule_template().into())
    }

    async fn update_approval_rule_template_content(
        &self,
        name: &str,
        content: &str,
    ) -> Result<ApprovalRuleTemplate> {
        const OPERATION: &str = "UpdateApprovalRuleTemplateContent";
        let output = self
            .client
            .update_approval_rule_template_content()
            .approval_rule_template_name(name)
            .new_rule_content(content)
            .send()
            .await
            .map_err(upstream(OPERATION))?;
        template_of(OPERATION, output.approval_rule_template().into())
    }

    async fn update_approval_rule_template_description(
        &self,
        name: &str,
        description: &str,
    ) -> Result<ApprovalRuleTemplate> {
        const OPERATION: &str = "UpdateApprovalRuleTemplateDescription";
        let output = self
            .client
            .update_approval_rule_template_description()
            .approval_rule_template_name(name)
            .approval_rule_template_description(description)
            .send()
            .await
            .map_err(upstream(OPERATION))?;
        template_of(OPERATION, output.approval_rule_template().into())
    }

    async fn update_approval_rule_template_name(
        &self,
        old_name: &str,
        new_name: &str,
    ) -> Result<ApprovalRuleTemplate> {
        const OPERATION: &str = "UpdateApprovalRuleTemplateName";
        let output = self
            .client
            .update_approval_rule_template_name()
            .old_approval_rule_template_name(old_name)
            .new_approval_rule_template_name(new_name)
            .send()
            .await
            .map_err(upstream(OPERATION))?;
        template_of(OPERATION, output.approval_rule_template().into())
    }

    async fn delete_approval_rule_template(
        &self,
        name: &str,
    ) -> Result<DeletedApprovalRuleTemplate> {
        let output = self
            .client
            .delete_approval_rule_template()
            .approval_rule_template_name(name)
            .send()
            .await
            .map_err(upstream("DeleteApprovalRuleTemplate"))?;
        Ok(DeletedApprovalRuleTemplate {
            approval_rule_template_id: owned(output.approval_rule_template_id()),
        })
    }

    async fn batch_associate_approval_rule_template_with_repositories(
        &self,
        name: &str,
        repository_names: &[String],
    ) -> Result<RepositoryBatchResult> {
        let output = self
            .client
            .batch_associate_approval_rule_template_with_repositories()
            .approval_rule_template_name(name)
            .set_repository_names(Some(repository_names.to_vec()))
            .send()
            .await
            .map_err(upstream("BatchAssociateApprovalRuleTemplateWithRepositories"))?;
        let errors = output
            .errors()
            .iter()
            .map(|e| RepositoryBatchError {
                repository_name: owned(e.repository_name()),
                error_code: owned(e.error_code()),
                error_message: owned(e.error_message()),
            })
            .collect();
        Ok(RepositoryBatchResult {
            repository_names: output.associated_repository_names().to_vec(),
            errors,
        })
    }

    async fn batch_disassociate_approval_rule_template_from_repositories(
        &self,
        name: &str,
        repository_names: &[String],
    ) -> Result<RepositoryBatchResult> {
        let output = self
            .client
            .batch_disassociate_approval_rule_template_from_repositories()
            .approval_rule_template_name(name)
            .set_repository_names(Some(repository_names.to_vec()))
            .send()
            .await
            .map_err(upstream("BatchDisassociateApprovalRuleTemplateFromRepositories"))?;
        let errors = output
            .errors()
            .iter()
            .map(|e| RepositoryBatchError {
                repository_name: owned(e.repository_name()),
                error_code: owned(e.error_code()),
                error_message: owned(e.error_message()),
            })
            .collect();
        Ok(RepositoryBatchResult {
            repository_names: output.disassociated_repository_names().to_vec(),
            errors,
        })
    }

    async fn post_comment_for_pull_request(&self, comment: &PullRequestComment) -> Result<()> {
        self.client
            .post_comment_for_pull_request()
            .pull_request_id(&comment.pull_request_id)
            .repository_name(&comment.repository_name)
            .before_commit_id(&comment.before_commit_id)
            .after_commit_id(&comment.after_commit_id)
            .content(&comment.content)
            .send()
            .await
            .map_err(upstream("PostCommentForPullRequest"))?;
        Ok(())
    }

    async fn update_pull_request_approval_state(
        &self,
        pull_request_id: &str,
        revision_id: &str,
        state: ApprovalState,
    ) -> Result<()> {
        self.client
            .update_pull_request_approval_state()
            .pull_request_id(pull_request_id)
            .revision_id(revision_id)
            .approval_state(types::ApprovalState::from(state))
            .send()
            .await
            .map_err(upstream("UpdatePullRequestApprovalState"))?;
        Ok(())
    }
}
