// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use async_trait::async_trait;
use codecommit_devops::codecommit::{
    ApprovalRuleTemplate, ApprovalState, CodeCommitApi, DeletedApprovalRuleTemplate,
    PullRequestComment, RepositoryBatchResult,
};
use codecommit_devops::custom_resource::{
    CustomResourceRequest, CustomResourceResponse, ResponseSender,
};
use codecommit_devops::{Error, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

pub const LOG_STREAM: &str = "2020/02/03/[$LATEST]0123456789abcdef";
pub const TEMPLATE_ID: &str = "e4b2a3c1-0000-4e0d-9a59-ffeeddccbbaa";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateTemplate {
        name: String,
        description: String,
        content: String,
    },
    UpdateContent {
        name: String,
        content: String,
    },
    UpdateDescription {
        name: String,
        description: String,
    },
    UpdateName {
        old_name: String,
        new_name: String,
    },
    DeleteTemplate {
        name: String,
    },
    Associate {
        name: String,
        repositories: Vec<String>,
    },
    Disassociate {
        name: String,
        repositories: Vec<String>,
    },
    PostComment(PullRequestComment),
    UpdateApprovalState {
        pull_request_id: String,
        revision_id: String,
        state: ApprovalState,
    },
}

/// Records every call and fails the operations it was told to fail.
#[derive(Default)]
pub struct FakeCodeCommit {
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<&'static str, String>>,
}

impl FakeCodeCommit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(self, operation: &'static str, message: &str) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(operation, message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().get(operation) {
            Some(message) => Err(Error::CodeCommit {
                operation,
                code: Some("ServiceException".to_string()),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn template(name: &str, description: Option<&str>) -> ApprovalRuleTemplate {
        ApprovalRuleTemplate {
            approval_rule_template_id: Some(TEMPLATE_ID.to_string()),
            approval_rule_template_name: Some(name.to_string()),
            approval_rule_template_description: description.map(str::to_string),
            ..Default::default()
        }
    }
}

#[async_trait]
impl CodeCommitApi for FakeCodeCommit {
    async fn create_approval_rule_template(
        &self,
        name: &str,
        description: &str,
        content: &str,
    ) -> Result<ApprovalRuleTemplate> {
        self.record(
            "CreateApprovalRuleTemplate",
            Call::CreateTemplate {
                name: name.to_string(),
                description: description.to_string(),
                content: content.to_string(),
            },
        )?;
        Ok(Self::template(name, Some(description)))
    }

    async fn update_approval_rule_template_content(
        &self,
        name: &str,
        content: &str,
    ) -> Result<ApprovalRuleTemplate> {
        self.record(
            "UpdateApprovalRuleTemplateContent",
            Call::UpdateContent {
                name: name.to_string(),
                content: content.to_string(),
            },
        )?;
        Ok(ApprovalRuleTemplate {
            approval_rule_template_content: Some(content.to_string()),
            ..Self::template(name, None)
        })
    }

    async fn update_approval_rule_template_description(
        &self,
        name: &str,
        description: &str,
    ) -> Result<ApprovalRuleTemplate> {
        self.record(
            "UpdateApprovalRuleTemplateDescription",
            Call::UpdateDescription {
                name: name.to_string(),
                description: description.to_string(),
            },
        )?;
        Ok(Self::template(name, Some(description)))
    }

    async fn update_approval_rule_template_name(
        &self,
        old_name: &str,
        new_name: &str,
    ) -> Result<ApprovalRuleTemplate> {
        self.record(
            "UpdateApprovalRuleTemplateName",
            Call::UpdateName {
                old_name: old_name.to_string(),
                new_name: new_name.to_string(),
            },
        )?;
        Ok(Self::template(new_name, None))
    }

    async fn delete_approval_rule_template(
        &self,
        name: &str,
    ) -> Result<DeletedApprovalRuleTemplate> {
        self.record(
            "DeleteApprovalRuleTemplate",
            Call::DeleteTemplate {
                name: name.to_string(),
            },
        )?;
        Ok(DeletedApprovalRuleTemplate {
            approval_rule_template_id: Some(TEMPLATE_ID.to_string()),
        })
    }

    async fn batch_associate_approval_rule_template_with_repositories(
        &self,
        name: &str,
        repository_names: &[String],
    ) -> Result<RepositoryBatchResult> {
        self.record(
            "BatchAssociateApprovalRuleTemplateWithRepositories",
            Call::Associate {
                name: name.to_string(),
                repositories: repository_names.to_vec(),
            },
        )?;
        Ok(RepositoryBatchResult {
            repository_names: repository_names.to_vec(),
            errors: vec![],
        })
    }

    async fn batch_disassociate_approval_rule_template_from_repositories(
        &self,
        name: &str,
        repository_names: &[String],
    ) -> Result<RepositoryBatchResult> {
        self.record(
            "BatchDisassociateApprovalRuleTemplateFromRepositories",
            Call::Disassociate {
                name: name.to_string(),
                repositories: repository_names.to_vec(),
            },
        )?;
        Ok(RepositoryBatchResult {
            repository_names: repository_names.to_vec(),
            errors: vec![],
        })
    }

    async fn post_comment_for_pull_request(&self, comment: &PullRequestComment) -> Result<()> {
        self.record("PostCommentForPullRequest", Call::PostComment(comment.clone()))
    }

    async fn update_pull_request_approval_state(
        &self,
        pull_request_id: &str,
        revision_id: &str,
        state: ApprovalState,
    ) -> Result<()> {
        self.record(
            "UpdatePullRequestApprovalState",
            Call::UpdateApprovalState {
                pull_request_id: pull_request_id.to_string(),
                revision_id: revision_id.to_string(),
                state,
            },
        )
    }
}

#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(String, CustomResourceResponse)>>,
    fail: bool,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unreachable() -> Self {
        RecordingSender {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, CustomResourceResponse)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResponseSender for RecordingSender {
    async fn send(&self, response_url: &str, response: &CustomResourceResponse) -> Result<()> {
        if self.fail {
            return Err(Error::ResponseDelivery("403 Forbidden: expired".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((response_url.to_string(), response.clone()));
        Ok(())
    }
}

pub fn envelope(request_type: &str, logical_resource_id: &str) -> Value {
    json!({
        "RequestType": request_type,
        "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:provider",
        "ResponseURL": "https://cloudformation-custom-resource-response-useast1.s3.amazonaws.com/signed",
        "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/devops/guid",
        "RequestId": "5d478078-13e9-baf0-464a-7ef285ecc786",
        "LogicalResourceId": logical_resource_id,
        "ResourceType": format!("Custom::{logical_resource_id}"),
    })
}

fn with(mut base: Value, extra: Value) -> CustomResourceRequest {
    if let (Value::Object(base), Value::Object(extra)) = (&mut base, extra) {
        base.extend(extra);
    }
    serde_json::from_value(base).unwrap()
}

pub fn create_request(logical_resource_id: &str, properties: Value) -> CustomResourceRequest {
    with(
        envelope("Create", logical_resource_id),
        json!({ "ResourceProperties": properties }),
    )
}

pub fn update_request(
    logical_resource_id: &str,
    physical_resource_id: &str,
    properties: Value,
    old_properties: Value,
) -> CustomResourceRequest {
    with(
        envelope("Update", logical_resource_id),
        json!({
            "PhysicalResourceId": physical_resource_id,
            "ResourceProperties": properties,
            "OldResourceProperties": old_properties,
        }),
    )
}

pub fn delete_request(
    logical_resource_id: &str,
    physical_resource_id: &str,
    properties: Value,
) -> CustomResourceRequest {
    with(
        envelope("Delete", logical_resource_id),
        json!({
            "PhysicalResourceId": physical_resource_id,
            "ResourceProperties": properties,
        }),
    )
}
