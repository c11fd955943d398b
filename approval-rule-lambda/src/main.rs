// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use codecommit_devops::approval_rule::{
    ApprovalRuleHandler, ApprovalRuleTemplateProvider, RepositoryAssociationProvider,
};
use codecommit_devops::codecommit::{CodeCommitApi, SdkCodeCommit};
use codecommit_devops::custom_resource::{self, HttpResponseSender, ResourceProvider};
use codecommit_devops::settings::Settings;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use log::info;
use serde_json::Value;
use simple_logger::SimpleLogger;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let settings = Settings::from_env();
    SimpleLogger::new().with_level(settings.log_level).init()?;

    let handler: ApprovalRuleHandler = settings.handler()?.parse()?;
    info!("Serving {:?} from log stream {}", handler, &settings.log_stream_name);

    let codecommit: Arc<dyn CodeCommitApi> = Arc::new(SdkCodeCommit::from_env().await);
    match handler {
        ApprovalRuleHandler::Template => {
            serve(ApprovalRuleTemplateProvider::new(codecommit), settings).await
        }
        ApprovalRuleHandler::RepoAssociation => {
            serve(RepositoryAssociationProvider::new(codecommit), settings).await
        }
    }
}

async fn serve<P>(provider: P, settings: Settings) -> Result<(), Error>
where
    P: ResourceProvider + 'static,
{
    let provider = Arc::new(provider);
    let sender = Arc::new(HttpResponseSender::default());
    let log_stream_name = Arc::new(settings.log_stream_name);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let provider = provider.clone();
        let sender = sender.clone();
        let log_stream_name = log_stream_name.clone();
        async move {
            let response = custom_resource::process_event(
                provider.as_ref(),
                sender.as_ref(),
                event.payload,
                &log_stream_name,
            )
            .await?;
            Ok::<_, Error>(serde_json::to_value(response)?)
        }
    }))
    .await
}
