//! Integration tests for the generate / retry / reset cycle.
//!
//! A scripted [`MetadataService`] stands in for Gemini and records every
//! image it was asked to analyze, so retries can be checked for identical
//! requests.

use async_trait::async_trait;
use shuttergen_core::metadata::{NO_RESPONSE_MESSAGE, parse_reply};
use shuttergen_core::session::{generate_with, retry_with};
use shuttergen_core::{
    AppError, CopyTarget, EncodedImage, GeneratedMetadata, MetadataService, RequestStatus, Result,
    Session,
};
use std::collections::VecDeque;
use std::sync::Mutex;

/// What the scripted service does on its next call.
enum Reply {
    /// Raw model text, run through the real reply parser.
    Text(Option<&'static str>),
    /// A transport-level failure.
    Fail(&'static str),
}

struct ScriptedService {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<EncodedImage>>,
}

impl ScriptedService {
    fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<EncodedImage> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataService for ScriptedService {
    async fn generate(&self, image: &EncodedImage) -> Result<GeneratedMetadata> {
        self.requests.lock().unwrap().push(image.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected request");

        match reply {
            Reply::Text(text) => parse_reply(text),
            Reply::Fail(message) => Err(AppError::generation(message)),
        }
    }
}

const SAMPLE_REPLY: &str = r#"{"title":"T","description":"D","keywords":["a","b"]}"#;

fn photo() -> EncodedImage {
    EncodedImage::new(&[0xff, 0xd8, 0xff, 0xe0, 1, 2, 3], "image/jpeg", Some("photo.jpg".to_string()))
}

#[tokio::test]
async fn successful_reply_populates_result() {
    let service = ScriptedService::new(vec![Reply::Text(Some(SAMPLE_REPLY))]);
    let mut session = Session::new();
    session.select_image(photo());

    assert!(generate_with(&mut session, &service).await);

    let metadata = session.status().metadata().expect("metadata");
    assert_eq!(metadata.title, "T");
    assert_eq!(metadata.description, "D");
    assert_eq!(metadata.keywords, vec!["a", "b"]);
    assert_eq!(metadata.copy_text(CopyTarget::Keywords), "a, b");
}

#[tokio::test]
async fn failure_offers_retry_with_identical_request() {
    let service = ScriptedService::new(vec![
        Reply::Fail("Request to Gemini failed: connection reset"),
        Reply::Text(Some(SAMPLE_REPLY)),
    ]);
    let mut session = Session::new();
    session.select_image(photo());

    generate_with(&mut session, &service).await;
    let message = session.status().error().expect("failed state");
    assert!(!message.is_empty());

    assert!(retry_with(&mut session, &service).await);
    assert!(session.status().metadata().is_some());

    let requests = service.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], requests[1]);
    assert_eq!(requests[0].payload(), photo().payload());
}

#[tokio::test]
async fn empty_payload_reports_no_response() {
    let service = ScriptedService::new(vec![Reply::Text(None), Reply::Text(Some(""))]);
    let mut session = Session::new();
    session.select_image(photo());

    generate_with(&mut session, &service).await;
    assert_eq!(session.status(), &RequestStatus::Failed(NO_RESPONSE_MESSAGE.to_string()));

    retry_with(&mut session, &service).await;
    assert_eq!(session.status().error(), Some("No response received from the AI."));
}

#[tokio::test]
async fn malformed_payload_fails_without_fallback() {
    let service = ScriptedService::new(vec![Reply::Text(Some("title: T"))]);
    let mut session = Session::new();
    session.select_image(photo());

    generate_with(&mut session, &service).await;
    assert!(session.status().error().is_some());
    assert!(session.status().metadata().is_none());
}

#[tokio::test]
async fn no_request_is_made_without_image() {
    let service = ScriptedService::new(vec![]);
    let mut session = Session::new();

    assert!(!generate_with(&mut session, &service).await);
    assert!(!retry_with(&mut session, &service).await);
    assert!(service.requests().is_empty());
    assert_eq!(session.status(), &RequestStatus::Idle);
}

#[tokio::test]
async fn retry_is_ignored_unless_failed() {
    let service = ScriptedService::new(vec![Reply::Text(Some(SAMPLE_REPLY))]);
    let mut session = Session::new();
    session.select_image(photo());

    generate_with(&mut session, &service).await;
    assert!(!retry_with(&mut session, &service).await);
    assert_eq!(service.requests().len(), 1);
}

#[tokio::test]
async fn new_pick_discards_previous_result() {
    let service = ScriptedService::new(vec![Reply::Text(Some(SAMPLE_REPLY))]);
    let mut session = Session::new();
    session.select_image(photo());
    generate_with(&mut session, &service).await;
    assert!(session.status().metadata().is_some());

    let other = EncodedImage::new(&[0x89, b'P', b'N', b'G'], "image/png", None);
    session.select_image(other.clone());
    assert_eq!(session.status(), &RequestStatus::Idle);
    assert_eq!(session.image(), Some(&other));
}
