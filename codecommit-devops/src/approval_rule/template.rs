// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::content::{build_template_content, TemplateProperties};
use crate::codecommit::{ApprovalRuleTemplate, CodeCommitApi};
use crate::custom_resource::{Completion, ResourceProvider};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApprovalRuleTemplateProperties {
    pub approval_rule_template_name: String,
    #[serde(default)]
    pub approval_rule_template_description: Option<String>,
    pub template: TemplateProperties,
}

impl ApprovalRuleTemplateProperties {
    fn description(&self) -> &str {
        self.approval_rule_template_description
            .as_deref()
            .unwrap_or_default()
    }
}

/// Backs `Custom::ApprovalRuleTemplate`. The physical id is the template id
/// CodeCommit assigns on create, it survives renames.
pub struct ApprovalRuleTemplateProvider {
    codecommit: Arc<dyn CodeCommitApi>,
}

impl ApprovalRuleTemplateProvider {
    pub fn new(codecommit: Arc<dyn CodeCommitApi>) -> Self {
        ApprovalRuleTemplateProvider { codecommit }
    }

    async fn create_template(
        &self,
        properties: &ApprovalRuleTemplateProperties,
    ) -> Result<ApprovalRuleTemplate> {
        let content = build_template_content(&properties.template)?;
        self.codecommit
            .create_approval_rule_template(
                &properties.approval_rule_template_name,
                properties.description(),
                &content,
            )
            .await
    }

    async fn apply_update(
        &self,
        new: &ApprovalRuleTemplateProperties,
        old: &ApprovalRuleTemplateProperties,
    ) -> Result<Option<Value>> {
        let old_name = old.approval_rule_template_name.as_str();
        let content = if new.template != old.template {
            Some(build_template_content(&new.template)?)
        } else {
            None
        };
        let description_changed =
            new.approval_rule_template_description != old.approval_rule_template_description;
        let description = new.description();

        // Content and description are independent; both address the template
        // by its old name, so the rename below must wait for them.
        let (content_update, description_update) = tokio::join!(
            async {
                match &content {
                    Some(content) => Some(
                        self.codecommit
                            .update_approval_rule_template_content(old_name, content)
                            .await,
                    ),
                    None => None,
                }
            },
            async {
                if description_changed {
                    Some(
                        self.codecommit
                            .update_approval_rule_template_description(old_name, description)
                            .await,
                    )
                } else {
                    None
                }
            }
        );

        // Errors surface in issue order; the content response is the one
        // reported when both ran.
        let mut updated = None;
        for result in [content_update, description_update].into_iter().flatten() {
            let template = result?;
            updated.get_or_insert(template);
        }
        if updated.is_some() {
            info!(
                "Updated approval rule '{}' description and template content.",
                old_name
            );
        }

        if new.approval_rule_template_name != old.approval_rule_template_name {
            let renamed = self
                .codecommit
                .update_approval_rule_template_name(old_name, &new.approval_rule_template_name)
                .await?;
            info!(
                "Updated approval rule name from '{}' to '{}'.",
                old_name, &new.approval_rule_template_name
            );
            updated = Some(renamed);
        }

        Ok(updated.map(serde_json::to_value).transpose()?)
    }
}

#[async_trait]
impl ResourceProvider for ApprovalRuleTemplateProvider {
    type Properties = ApprovalRuleTemplateProperties;

    fn resource_name(&self) -> &'static str {
        "approval rule template"
    }

    async fn create(&self, properties: ApprovalRuleTemplateProperties) -> Completion {
        match self.create_template(&properties).await {
            Ok(template) => {
                info!(
                    "Created approval rule template '{}' with id {:?}.",
                    &properties.approval_rule_template_name, &template.approval_rule_template_id
                );
                let data = serde_json::to_value(&template).map(Some).map_err(Into::into);
                Completion::new(template.approval_rule_template_id).settle(data)
            }
            Err(err) => Completion::new(None).failed(err),
        }
    }

    async fn update(
        &self,
        physical_resource_id: String,
        properties: ApprovalRuleTemplateProperties,
        old_properties: ApprovalRuleTemplateProperties,
    ) -> Completion {
        let result = self.apply_update(&properties, &old_properties).await;
        Completion::new(Some(physical_resource_id)).settle(result)
    }

    async fn delete(
        &self,
        physical_resource_id: String,
        properties: ApprovalRuleTemplateProperties,
    ) -> Completion {
        let result = self
            .codecommit
            .delete_approval_rule_template(&properties.approval_rule_template_name)
            .await
            .and_then(|deleted| {
                info!(
                    "Deleted approval rule template '{}'.",
                    &properties.approval_rule_template_name
                );
                Ok(Some(serde_json::to_value(deleted)?))
            });
        Completion::new(Some(physical_resource_id)).settle(result)
    }
}
