// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

pub mod association;
pub mod content;
pub mod template;

pub use association::{
    RepositoryAssociationProperties, RepositoryAssociationProvider, RepositoryChanges,
};
pub use content::{build_template_content, Approvers, RuleContent, TemplateProperties};
pub use template::{ApprovalRuleTemplateProperties, ApprovalRuleTemplateProvider};

use crate::Error;
use std::str::FromStr;

/// Which custom resource an approval rule function serves, taken from the
/// Lambda handler setting, e.g. `codecommit.approvalRuleTemplate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalRuleHandler {
    Template,
    RepoAssociation,
}

impl FromStr for ApprovalRuleHandler {
    type Err = Error;

    fn from_str(handler: &str) -> Result<Self, Self::Err> {
        let name = handler.rsplit('.').next().unwrap_or(handler).trim();
        match name {
            "approvalRuleTemplate" => Ok(ApprovalRuleHandler::Template),
            "approvalRuleRepoAssociation" => Ok(ApprovalRuleHandler::RepoAssociation),
            _ => Err(Error::Configuration(format!(
                "Unknown approval rule handler '{handler}'"
            ))),
        }
    }
}
