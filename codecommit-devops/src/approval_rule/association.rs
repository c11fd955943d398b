// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::codecommit::{CodeCommitApi, RepositoryBatchResult};
use crate::constants::REPOSITORY_ASSOCIATION_SUFFIX;
use crate::custom_resource::{Completion, ResourceProvider};
use crate::utils::difference;

const ASSOCIATED_KEY: &str = "AssociatedRepoNames";
const DISASSOCIATED_KEY: &str = "DisAssociatedRepoNames";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RepositoryAssociationProperties {
    pub approval_rule_template_name: String,
    pub repository_names: Vec<String>,
}

impl RepositoryAssociationProperties {
    pub fn physical_resource_id(&self) -> String {
        format!(
            "{}{}",
            self.approval_rule_template_name, REPOSITORY_ASSOCIATION_SUFFIX
        )
    }
}

/// Repositories to attach to the new template and to detach from the old one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryChanges {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl RepositoryChanges {
    /// A renamed template leaves nothing to diff against, so the whole new
    /// list is associated and the whole old list is disassociated.
    pub fn between(
        old: &RepositoryAssociationProperties,
        new: &RepositoryAssociationProperties,
    ) -> Self {
        if old.approval_rule_template_name == new.approval_rule_template_name {
            RepositoryChanges {
                added: difference(&new.repository_names, &old.repository_names),
                removed: difference(&old.repository_names, &new.repository_names),
            }
        } else {
            RepositoryChanges {
                added: new.repository_names.clone(),
                removed: old.repository_names.clone(),
            }
        }
    }
}

fn report_batch_errors(action: &str, template_name: &str, result: &RepositoryBatchResult) {
    for err in &result.errors {
        warn!(
            "Could not {} repository {:?} with '{}': {} {}",
            action,
            err.repository_name.as_deref().unwrap_or("<unknown>"),
            template_name,
            err.error_code.as_deref().unwrap_or_default(),
            err.error_message.as_deref().unwrap_or_default()
        );
    }
}

/// Backs `Custom::ApprovalRuleRepoAssociation`. The association has no
/// service-side identity, so the id is synthesized as `<template>-repos`.
pub struct RepositoryAssociationProvider {
    codecommit: Arc<dyn CodeCommitApi>,
}

impl RepositoryAssociationProvider {
    pub fn new(codecommit: Arc<dyn CodeCommitApi>) -> Self {
        RepositoryAssociationProvider { codecommit }
    }
}

#[async_trait]
impl ResourceProvider for RepositoryAssociationProvider {
    type Properties = RepositoryAssociationProperties;

    fn resource_name(&self) -> &'static str {
        "approval rule repository association"
    }

    async fn create(&self, properties: RepositoryAssociationProperties) -> Completion {
        let name = &properties.approval_rule_template_name;
        match self
            .codecommit
            .batch_associate_approval_rule_template_with_repositories(
                name,
                &properties.repository_names,
            )
            .await
        {
            Ok(associated) => {
                info!(
                    "Associated {:?} with {}.",
                    &associated.repository_names, name
                );
                report_batch_errors("associate", name, &associated);
                let mut data = Map::new();
                data.insert(
                    ASSOCIATED_KEY.to_string(),
                    Value::from(associated.repository_names),
                );
                Completion::new(Some(properties.physical_resource_id()))
                    .with_data(Some(Value::Object(data)))
            }
            Err(err) => Completion::new(None).failed(err),
        }
    }

    async fn update(
        &self,
        _physical_resource_id: String,
        properties: RepositoryAssociationProperties,
        old_properties: RepositoryAssociationProperties,
    ) -> Completion {
        let completion = Completion::new(Some(properties.physical_resource_id()));
        let changes = RepositoryChanges::between(&old_properties, &properties);
        let new_name = properties.approval_rule_template_name.as_str();
        let old_name = old_properties.approval_rule_template_name.as_str();

        // Both calls run to completion even when the other fails.
        let (association, disassociation) = tokio::join!(
            async {
                if changes.added.is_empty() {
                    None
                } else {
                    Some(
                        self.codecommit
                            .batch_associate_approval_rule_template_with_repositories(
                                new_name,
                                &changes.added,
                            )
                            .await,
                    )
                }
            },
            async {
                if changes.removed.is_empty() {
                    None
                } else {
                    Some(
                        self.codecommit
                            .batch_disassociate_approval_rule_template_from_repositories(
                                old_name,
                                &changes.removed,
                            )
                            .await,
                    )
                }
            }
        );

        let mut data = Map::new();
        let mut failure = None;
        match association {
            Some(Ok(associated)) => {
                info!(
                    "Associated {:?} with {}.",
                    &associated.repository_names, new_name
                );
                report_batch_errors("associate", new_name, &associated);
                data.insert(
                    ASSOCIATED_KEY.to_string(),
                    Value::from(associated.repository_names),
                );
            }
            Some(Err(err)) => failure = Some(err),
            None => {}
        }
        match disassociation {
            Some(Ok(disassociated)) => {
                info!(
                    "DisAssociated {:?} with {}.",
                    &disassociated.repository_names, old_name
                );
                report_batch_errors("disassociate", old_name, &disassociated);
                data.insert(
                    DISASSOCIATED_KEY.to_string(),
                    Value::from(disassociated.repository_names),
                );
            }
            Some(Err(err)) => {
                failure.get_or_insert(err);
            }
            None => {}
        }

        match failure {
            // Whatever half succeeded is still reported next to the failure.
            Some(err) if !data.is_empty() => {
                completion.failed_with_partial(err, Value::Object(data))
            }
            Some(err) => completion.failed(err),
            None if data.is_empty() => completion,
            None => completion.with_data(Some(Value::Object(data))),
        }
    }

    async fn delete(
        &self,
        physical_resource_id: String,
        properties: RepositoryAssociationProperties,
    ) -> Completion {
        let name = &properties.approval_rule_template_name;
        let completion = Completion::new(Some(physical_resource_id));
        match self
            .codecommit
            .batch_disassociate_approval_rule_template_from_repositories(
                name,
                &properties.repository_names,
            )
            .await
        {
            Ok(disassociated) => {
                info!(
                    "Disassociated {:?} with {}.",
                    &disassociated.repository_names, name
                );
                report_batch_errors("disassociate", name, &disassociated);
                let mut data = Map::new();
                data.insert(
                    DISASSOCIATED_KEY.to_string(),
                    Value::from(disassociated.repository_names),
                );
                completion.with_data(Some(Value::Object(data)))
            }
            Err(err) => completion.failed(err),
        }
    }
}

#[cfg(test)]
#[path = "association_tests.rs"]
mod association_tests;
