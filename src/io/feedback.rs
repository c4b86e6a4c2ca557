// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Remote feedback submission.
//!
//! [`HttpFeedbackEndpoint`] posts a review as a multipart form with a
//! bearer token. [`spawn_submission`] runs any endpoint on a background
//! thread and hands the result back through a channel so the UI thread
//! never blocks on the network.

use crate::config::EndpointConfig;
use crate::models::review::Submission;
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

/// HTTP request timeout for a single submission.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for feedback submission failures.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Feedback endpoint returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No feedback endpoint configured")]
    NotConfigured,

    #[error("Submission worker stopped before reporting a result")]
    WorkerGone,
}

/// Confirmation returned by a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub status: u16,
    pub body: String,
}

/// Destination for finished reviews.
pub trait FeedbackEndpoint: Send {
    fn submit(
        &self,
        video_id: &str,
        comment: &str,
        annotations_json: &str,
    ) -> Result<Receipt, SubmitError>;
}

/// Feedback endpoint reached over HTTP.
pub struct HttpFeedbackEndpoint {
    client: reqwest::blocking::Client,
    url: String,
    token: Option<String>,
}

impl HttpFeedbackEndpoint {
    pub fn new(config: &EndpointConfig) -> Result<Self, SubmitError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            token: config.token.clone(),
        })
    }
}

impl FeedbackEndpoint for HttpFeedbackEndpoint {
    fn submit(
        &self,
        video_id: &str,
        comment: &str,
        annotations_json: &str,
    ) -> Result<Receipt, SubmitError> {
        let form = reqwest::blocking::multipart::Form::new()
            .text("video_id", video_id.to_string())
            .text("comment", comment.to_string())
            .text("annotations", annotations_json.to_string());

        let mut request = self.client.post(&self.url).multipart(form);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::HttpStatus(status.as_u16()));
        }

        Ok(Receipt {
            status: status.as_u16(),
            body: response.text().unwrap_or_default(),
        })
    }
}

/// Send a submission snapshot through `endpoint`.
pub fn deliver(endpoint: &dyn FeedbackEndpoint, submission: &Submission) -> Result<Receipt, SubmitError> {
    let payload = serde_json::to_string(&submission.annotations)?;
    endpoint.submit(&submission.video_id, &submission.comment, &payload)
}

/// In-flight background submission.
pub struct PendingSubmission {
    pub revision: u64,
    receiver: Receiver<Result<Receipt, SubmitError>>,
}

impl PendingSubmission {
    /// Non-blocking check for the worker's result.
    pub fn poll(&self) -> Option<Result<Receipt, SubmitError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(std::sync::mpsc::TryRecvError::Empty) => None,
            Err(std::sync::mpsc::TryRecvError::Disconnected) => Some(Err(SubmitError::WorkerGone)),
        }
    }
}

/// Deliver `submission` on a background thread.
///
/// The snapshot is owned by the worker, so later edits to the session never
/// reach an in-flight request.
pub fn spawn_submission(
    endpoint: std::sync::Arc<dyn FeedbackEndpoint + Sync>,
    submission: Submission,
) -> PendingSubmission {
    let (sender, receiver) = channel();
    let revision = submission.revision;

    std::thread::spawn(move || {
        let result = deliver(endpoint.as_ref(), &submission);
        match result {
            Ok(ref receipt) => log::info!(
                "Submitted feedback for {} (HTTP {})",
                submission.video_id,
                receipt.status
            ),
            Err(ref e) => log::error!("Failed to submit feedback for {}: {}", submission.video_id, e),
        }
        let _ = sender.send(result);
    });

    PendingSubmission { revision, receiver }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::AnnotationSet;
    use std::sync::{Arc, Mutex};

    struct RecordingEndpoint {
        calls: Mutex<Vec<(String, String, String)>>,
    }

    impl FeedbackEndpoint for RecordingEndpoint {
        fn submit(&self, video_id: &str, comment: &str, annotations_json: &str) -> Result<Receipt, SubmitError> {
            self.calls.lock().unwrap().push((
                video_id.to_string(),
                comment.to_string(),
                annotations_json.to_string(),
            ));
            Ok(Receipt {
                status: 201,
                body: String::new(),
            })
        }
    }

    fn submission() -> Submission {
        let mut annotations = AnnotationSet::new();
        annotations.entry(1).comment = "high elbow".to_string();
        Submission {
            video_id: "clip-7".to_string(),
            comment: "good session".to_string(),
            annotations,
            revision: 3,
        }
    }

    #[test]
    fn test_deliver_serializes_annotations() {
        let endpoint = RecordingEndpoint {
            calls: Mutex::new(Vec::new()),
        };
        let receipt = deliver(&endpoint, &submission()).unwrap();
        assert_eq!(receipt.status, 201);

        let calls = endpoint.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "clip-7");
        assert_eq!(calls[0].1, "good session");
        assert_eq!(calls[0].2, r#"[null,{"drawings":[],"comment":"high elbow"}]"#);
    }

    #[test]
    fn test_spawn_submission_reports_through_channel() {
        let endpoint = Arc::new(RecordingEndpoint {
            calls: Mutex::new(Vec::new()),
        });
        let pending = spawn_submission(endpoint.clone(), submission());
        assert_eq!(pending.revision, 3);

        let result = loop {
            if let Some(result) = pending.poll() {
                break result;
            }
            std::thread::sleep(Duration::from_millis(5));
        };
        assert!(result.is_ok());
        assert_eq!(endpoint.calls.lock().unwrap().len(), 1);
    }
}
