// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

pub mod request;
pub mod response;

pub use request::{CustomResourceRequest, LifecycleEvent, RequestType};
pub use response::{CustomResourceResponse, HttpResponseSender, ResponseSender, ResponseStatus};

use async_trait::async_trait;
use log::{debug, error, info};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Error, Result};

/// What a provider resolved for one lifecycle request: the physical id (if
/// one was determined), the data payload and the failure, if any.
#[derive(Debug, Default)]
pub struct Completion {
    pub physical_resource_id: Option<String>,
    pub data: Option<Value>,
    pub error: Option<Error>,
}

impl Completion {
    pub fn new(physical_resource_id: Option<String>) -> Self {
        Completion {
            physical_resource_id,
            ..Default::default()
        }
    }

    pub fn with_data(mut self, data: Option<Value>) -> Self {
        self.data = data;
        self
    }

    /// Drops any data gathered so far, the failure message takes its place.
    pub fn failed(mut self, error: Error) -> Self {
        self.data = None;
        self.error = Some(error);
        self
    }

    pub fn failed_with_partial(mut self, error: Error, partial: Value) -> Self {
        self.data = Some(partial);
        self.error = Some(error);
        self
    }

    pub fn settle(self, result: Result<Option<Value>>) -> Self {
        match result {
            Ok(data) => self.with_data(data),
            Err(err) => self.failed(err),
        }
    }
}

#[async_trait]
pub trait ResourceProvider: Send + Sync {
    type Properties: DeserializeOwned + Send + Sync;

    /// Used in log lines only.
    fn resource_name(&self) -> &'static str;

    async fn create(&self, properties: Self::Properties) -> Completion;

    async fn update(
        &self,
        physical_resource_id: String,
        properties: Self::Properties,
        old_properties: Self::Properties,
    ) -> Completion;

    async fn delete(
        &self,
        physical_resource_id: String,
        properties: Self::Properties,
    ) -> Completion;
}

/// Runs one lifecycle request through `provider` and reports the outcome to
/// CloudFormation exactly once. Provider failures become a `FAILED` response;
/// only a failed delivery of that response is returned as an error.
pub async fn process<P, S>(
    provider: &P,
    sender: &S,
    request: CustomResourceRequest,
    log_stream_name: &str,
) -> Result<CustomResourceResponse>
where
    P: ResourceProvider + ?Sized,
    S: ResponseSender + ?Sized,
{
    info!(
        "Receiving {} event of {} for {}",
        request.event.request_type(),
        provider.resource_name(),
        &request.logical_resource_id
    );
    if let Ok(payload) = serde_json::to_string_pretty(&request) {
        debug!("{}", payload);
    }

    let completion = match request.event.parse_properties::<P::Properties>() {
        Ok(LifecycleEvent::Create { properties }) => provider.create(properties).await,
        Ok(LifecycleEvent::Update {
            physical_resource_id,
            properties,
            old_properties,
        }) => {
            provider
                .update(physical_resource_id, properties, old_properties)
                .await
        }
        Ok(LifecycleEvent::Delete {
            physical_resource_id,
            properties,
        }) => provider.delete(physical_resource_id, properties).await,
        Err(err) => Completion::new(request.event.physical_resource_id().map(str::to_string))
            .failed(Error::from(err)),
    };

    if let Some(err) = &completion.error {
        error!(
            "Failed to {} {} due to {}.",
            request.event.request_type(),
            provider.resource_name(),
            err
        );
    }

    let response = CustomResourceResponse::new(&request, completion, log_stream_name);
    sender.send(&request.response_url, &response).await?;
    Ok(response)
}

/// Entry point for raw lifecycle events. An envelope that does not parse is
/// still answered with `FAILED` as long as it carries a `ResponseURL`,
/// otherwise the parse error is returned and nothing is sent.
pub async fn process_event<P, S>(
    provider: &P,
    sender: &S,
    event: Value,
    log_stream_name: &str,
) -> Result<CustomResourceResponse>
where
    P: ResourceProvider + ?Sized,
    S: ResponseSender + ?Sized,
{
    let err = match serde_json::from_value::<CustomResourceRequest>(event.clone()) {
        Ok(request) => return process(provider, sender, request, log_stream_name).await,
        Err(err) => Error::from(err),
    };
    let Some(response_url) = event.get("ResponseURL").and_then(Value::as_str) else {
        error!(
            "Dropping {} event without a response URL: {}",
            provider.resource_name(),
            err
        );
        return Err(err);
    };
    error!(
        "Rejecting malformed {} event: {}",
        provider.resource_name(),
        err
    );

    let response = CustomResourceResponse::rejected(&event, &err, log_stream_name);
    sender.send(response_url, &response).await?;
    Ok(response)
}
