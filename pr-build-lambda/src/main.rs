// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use codecommit_devops::codecommit::SdkCodeCommit;
use codecommit_devops::pr_build::{BuildStateChangeEvent, PullRequestBuildBridge};
use codecommit_devops::settings::Settings;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use log::info;
use simple_logger::SimpleLogger;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let settings = Settings::from_env();
    SimpleLogger::new().with_level(settings.log_level).init()?;
    info!(
        "Serving pr build state changes from log stream {}",
        &settings.log_stream_name
    );

    let codecommit = Arc::new(SdkCodeCommit::from_env().await);
    let bridge = Arc::new(PullRequestBuildBridge::new(codecommit));
    lambda_runtime::run(service_fn(move |event: LambdaEvent<BuildStateChangeEvent>| {
        let bridge = bridge.clone();
        async move {
            bridge.handle(&event.payload).await?;
            Ok::<(), Error>(())
        }
    }))
    .await
}
