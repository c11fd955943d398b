// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::constants::{APPROVAL_RULE_CONTENT_VERSION, APPROVERS_STATEMENT_TYPE};
use crate::utils::number_or_string;
use crate::Result;

/// The `Template` property of the custom resource.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateProperties {
    #[serde(default)]
    pub destination_references: Option<Vec<String>>,
    pub approvers: Approvers,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Approvers {
    #[serde(deserialize_with = "number_or_string")]
    pub number_of_approvals_needed: u32,
    #[serde(default)]
    pub approval_pool_members: Option<Vec<String>>,
}

/// Approval rule content document as CodeCommit expects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RuleContent {
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_references: Option<Vec<String>>,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    #[serde(rename = "Type")]
    pub statement_type: &'static str,
    pub number_of_approvals_needed: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_pool_members: Option<Vec<String>>,
}

impl From<&TemplateProperties> for RuleContent {
    fn from(template: &TemplateProperties) -> Self {
        RuleContent {
            version: APPROVAL_RULE_CONTENT_VERSION,
            destination_references: template.destination_references.clone(),
            statements: vec![Statement {
                statement_type: APPROVERS_STATEMENT_TYPE,
                number_of_approvals_needed: template.approvers.number_of_approvals_needed,
                approval_pool_members: template.approvers.approval_pool_members.clone(),
            }],
        }
    }
}

impl RuleContent {
    pub fn render(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn build_template_content(template: &TemplateProperties) -> Result<String> {
    RuleContent::from(template).render()
}

#[cfg(test)]
#[path = "content_tests.rs"]
mod content_tests;
