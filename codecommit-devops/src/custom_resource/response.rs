// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;

use super::request::CustomResourceRequest;
use super::Completion;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

/// The single completion signal CloudFormation waits for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceResponse {
    pub status: ResponseStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl CustomResourceResponse {
    pub fn new<P>(
        request: &CustomResourceRequest<P>,
        completion: Completion,
        log_stream_name: &str,
    ) -> Self {
        let physical_resource_id = completion
            .physical_resource_id
            .unwrap_or_else(|| log_stream_name.to_string());
        let (status, reason, data) = match completion.error {
            None => (ResponseStatus::Success, String::new(), completion.data),
            Some(err) => {
                let reason = err.to_string();
                let data = completion
                    .data
                    .unwrap_or_else(|| Value::String(reason.clone()));
                (ResponseStatus::Failed, reason, Some(data))
            }
        };
        CustomResourceResponse {
            status,
            reason,
            physical_resource_id,
            stack_id: request.stack_id.clone(),
            request_id: request.request_id.clone(),
            logical_resource_id: request.logical_resource_id.clone(),
            data,
        }
    }

    /// `FAILED` answer to an event that never parsed into a request. Whatever
    /// envelope fields are present are echoed back.
    pub fn rejected(envelope: &Value, error: &Error, log_stream_name: &str) -> Self {
        let field = |name: &str| {
            envelope
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        let reason = error.to_string();
        CustomResourceResponse {
            status: ResponseStatus::Failed,
            physical_resource_id: field("PhysicalResourceId")
                .unwrap_or_else(|| log_stream_name.to_string()),
            stack_id: field("StackId").unwrap_or_default(),
            request_id: field("RequestId").unwrap_or_default(),
            logical_resource_id: field("LogicalResourceId").unwrap_or_default(),
            data: Some(Value::String(reason.clone())),
            reason,
        }
    }
}

#[async_trait]
pub trait ResponseSender: Send + Sync {
    async fn send(&self, response_url: &str, response: &CustomResourceResponse) -> Result<()>;
}

/// PUTs the response to the pre-signed S3 URL CloudFormation handed out.
#[derive(Debug, Clone, Default)]
pub struct HttpResponseSender {
    client: reqwest::Client,
}

impl HttpResponseSender {
    pub fn new(client: reqwest::Client) -> Self {
        HttpResponseSender { client }
    }
}

#[async_trait]
impl ResponseSender for HttpResponseSender {
    async fn send(&self, response_url: &str, response: &CustomResourceResponse) -> Result<()> {
        let body = serde_json::to_string(response)?;
        debug!("Response body: {}", &body);
        // The URL is signed without a content type, any other value is rejected.
        let reply = self
            .client
            .put(response_url)
            .header(CONTENT_TYPE, "")
            .body(body)
            .send()
            .await?;
        let status = reply.status();
        if !status.is_success() {
            let text = reply.text().await.unwrap_or_default();
            return Err(Error::ResponseDelivery(format!("{status}: {text}")));
        }
        info!(
            "Sent {:?} response for {} with status code {}",
            response.status, &response.logical_resource_id, status
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custom_resource::request::LifecycleEvent;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn request() -> CustomResourceRequest {
        CustomResourceRequest {
            response_url: "https://example.com/signed".to_string(),
            stack_id: "stack".to_string(),
            request_id: "request".to_string(),
            resource_type: "Custom::Test".to_string(),
            logical_resource_id: "Resource".to_string(),
            event: LifecycleEvent::Create {
                properties: json!({}),
            },
        }
    }

    #[test]
    fn test_success_without_data_omits_data_key() {
        let response = CustomResourceResponse::new(
            &request(),
            Completion::new(Some("physical".to_string())),
            "log-stream",
        );
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "Status": "SUCCESS",
                "Reason": "",
                "PhysicalResourceId": "physical",
                "StackId": "stack",
                "RequestId": "request",
                "LogicalResourceId": "Resource"
            })
        );
    }

    #[test]
    fn test_failure_reports_message_as_reason_and_data() {
        let completion = Completion::new(None).failed(Error::CodeCommit {
            operation: "CreateApprovalRuleTemplate",
            code: Some("ApprovalRuleTemplateNameAlreadyExistsException".to_string()),
            message: "already exists".to_string(),
        });
        let response = CustomResourceResponse::new(&request(), completion, "log-stream");
        assert_eq!(response.status, ResponseStatus::Failed);
        assert_eq!(response.reason, "already exists");
        assert_eq!(response.data, Some(json!("already exists")));
        assert_eq!(response.physical_resource_id, "log-stream");
    }

    #[test]
    fn test_failure_keeps_partial_data() {
        let completion = Completion::new(Some("rule-repos".to_string())).failed_with_partial(
            Error::ResponseDelivery("boom".to_string()),
            json!({ "AssociatedRepoNames": ["c"] }),
        );
        let response = CustomResourceResponse::new(&request(), completion, "log-stream");
        assert_eq!(response.status, ResponseStatus::Failed);
        assert_eq!(response.data, Some(json!({ "AssociatedRepoNames": ["c"] })));
        assert_eq!(response.physical_resource_id, "rule-repos");
    }

    #[test]
    fn test_rejected_echoes_envelope_fields() {
        let envelope = json!({
            "RequestType": "Replace",
            "ResponseURL": "https://example.com/signed",
            "StackId": "stack",
            "RequestId": "request",
            "LogicalResourceId": "Resource",
            "PhysicalResourceId": "physical"
        });
        let error = Error::Configuration("unsupported".to_string());
        let response = CustomResourceResponse::rejected(&envelope, &error, "log-stream");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "Status": "FAILED",
                "Reason": "unsupported",
                "PhysicalResourceId": "physical",
                "StackId": "stack",
                "RequestId": "request",
                "LogicalResourceId": "Resource",
                "Data": "unsupported"
            })
        );
    }

    #[test]
    fn test_rejected_without_physical_id_uses_log_stream() {
        let envelope = json!({ "ResponseURL": "https://example.com/signed" });
        let error = Error::Configuration("unsupported".to_string());
        let response = CustomResourceResponse::rejected(&envelope, &error, "log-stream");
        assert_eq!(response.physical_resource_id, "log-stream");
        assert_eq!(response.stack_id, "");
    }

    /// Accepts one connection on loopback, answers it with `reply` and hands
    /// back the raw request head and body.
    async fn serve_once(reply: &'static str) -> (String, JoinHandle<(String, String)>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!(
            "http://{}/signed?X-Amz-Signature=abc",
            listener.local_addr().unwrap()
        );
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut chunk = [0u8; 1024];
            let (head, body) = loop {
                let read = socket.read(&mut chunk).await.unwrap();
                assert!(read > 0, "connection closed before the request was complete");
                received.extend_from_slice(&chunk[..read]);
                let text = String::from_utf8_lossy(&received).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let head = text[..end].to_string();
                    let length = head
                        .lines()
                        .filter_map(|line| line.split_once(':'))
                        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                        .map(|(_, value)| value.trim().parse::<usize>().unwrap())
                        .unwrap_or(0);
                    let body = &text[end + 4..];
                    if body.len() >= length {
                        break (head, body.to_string());
                    }
                }
            };
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            (head, body)
        });
        (url, handle)
    }

    #[tokio::test]
    async fn test_http_sender_puts_json_with_empty_content_type() {
        let (url, server) = serve_once("HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n").await;
        let response = CustomResourceResponse::new(
            &request(),
            Completion::new(Some("physical".to_string())),
            "log-stream",
        );

        HttpResponseSender::default()
            .send(&url, &response)
            .await
            .unwrap();

        let (head, body) = server.await.unwrap();
        assert!(
            head.starts_with("PUT /signed?X-Amz-Signature=abc HTTP/1.1\r\n"),
            "{head}"
        );
        let content_type = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.trim().to_string());
        assert_eq!(content_type, Some(String::new()));
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body, serde_json::to_value(&response).unwrap());
        assert_eq!(body["Status"], json!("SUCCESS"));
    }

    #[tokio::test]
    async fn test_http_sender_rejected_upload_is_delivery_error() {
        let (url, server) = serve_once(
            "HTTP/1.1 403 Forbidden\r\ncontent-length: 21\r\n\r\nSignature has expired",
        )
        .await;
        let response = CustomResourceResponse::new(
            &request(),
            Completion::new(None).failed(Error::Configuration("boom".to_string())),
            "log-stream",
        );

        let result = HttpResponseSender::default().send(&url, &response).await;

        server.await.unwrap();
        match result {
            Err(Error::ResponseDelivery(message)) => {
                assert!(message.starts_with("403"), "{message}");
                assert!(message.contains("Signature has expired"), "{message}");
            }
            other => panic!("expected a delivery error, got {other:?}"),
        }
    }
}
