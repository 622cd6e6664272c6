//! Request status and the user-action state machine.
//!
//! A [`Session`] owns the selected image and the single [`RequestStatus`]
//! that decides which view is shown. Every transition is triggered by a
//! user action:
//!
//! ```text
//! Idle ──generate──> Loading ──ok──> Succeeded
//!                       │
//!                       └──err──> Failed ──retry──> Loading
//!
//! any ──pick file / remove / reset──> Idle
//! ```
//!
//! Starting a request hands out a [`GenerationTicket`]. Completions are
//! matched against the ticket id, so a reply that lands after the user has
//! moved on (new file, removal, reset) is dropped instead of overwriting
//! the fresh state.

use crate::error::Result;
use crate::gemini::MetadataService;
use crate::image_loader::EncodedImage;
use crate::metadata::GeneratedMetadata;

/// Shown when a failure carries no message of its own.
pub const FALLBACK_FAILURE_MESSAGE: &str = "Failed to generate metadata. Please try again.";

/// Which of the four views is active.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Succeeded(GeneratedMetadata),
    Failed(String),
}

impl RequestStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn metadata(&self) -> Option<&GeneratedMetadata> {
        match self {
            Self::Succeeded(metadata) => Some(metadata),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Handle for one in-flight request.
#[derive(Clone, Debug)]
pub struct GenerationTicket {
    id: u64,
    image: EncodedImage,
}

impl GenerationTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Snapshot of the image the request was issued for.
    pub fn image(&self) -> &EncodedImage {
        &self.image
    }
}

#[derive(Debug, Default)]
pub struct Session {
    image: Option<EncodedImage>,
    status: RequestStatus,
    in_flight: Option<u64>,
    next_ticket: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&self) -> Option<&EncodedImage> {
        self.image.as_ref()
    }

    pub fn status(&self) -> &RequestStatus {
        &self.status
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Whether the "Generate Metadata" action is currently allowed.
    pub fn can_generate(&self) -> bool {
        self.image.is_some() && !self.status.is_loading()
    }

    /// Replaces the image and discards any result, error or pending request.
    pub fn select_image(&mut self, image: EncodedImage) {
        tracing::debug!(
            file = image.file_name().unwrap_or("<unnamed>"),
            bytes = image.byte_len(),
            "image selected"
        );
        self.image = Some(image);
        self.clear_status();
    }

    /// Drops the image and returns to the empty state.
    pub fn remove_image(&mut self) {
        self.image = None;
        self.clear_status();
    }

    /// Full reset ("Reset & Upload New").
    pub fn reset(&mut self) {
        self.remove_image();
    }

    /// Starts a request for the current image.
    ///
    /// Returns `None` (and changes nothing) when there is no image or a
    /// request is already loading.
    pub fn begin_generation(&mut self) -> Option<GenerationTicket> {
        if !self.can_generate() {
            return None;
        }
        let image = self.image.clone()?;

        let id = self.next_ticket;
        self.next_ticket += 1;
        self.in_flight = Some(id);
        self.status = RequestStatus::Loading;

        Some(GenerationTicket { id, image })
    }

    /// "Try Again": only valid after a failure.
    pub fn retry(&mut self) -> Option<GenerationTicket> {
        match self.status {
            RequestStatus::Failed(_) => self.begin_generation(),
            _ => None,
        }
    }

    /// Applies the outcome of a request.
    ///
    /// Returns `false` if the ticket is stale and the outcome was ignored.
    pub fn complete(&mut self, ticket_id: u64, outcome: Result<GeneratedMetadata>) -> bool {
        if self.in_flight != Some(ticket_id) {
            tracing::debug!(ticket_id, "ignoring stale generation result");
            return false;
        }
        self.in_flight = None;

        self.status = match outcome {
            Ok(metadata) => RequestStatus::Succeeded(metadata),
            Err(e) => {
                tracing::warn!(error = %e, "metadata generation failed");
                RequestStatus::Failed(failure_message(&e.to_string()))
            }
        };
        true
    }

    fn clear_status(&mut self) {
        self.status = RequestStatus::Idle;
        self.in_flight = None;
    }
}

fn failure_message(message: &str) -> String {
    if message.trim().is_empty() {
        FALLBACK_FAILURE_MESSAGE.to_string()
    } else {
        message.to_string()
    }
}

/// Runs a full generate cycle against `service`.
///
/// Returns `false` if generation was not allowed.
pub async fn generate_with<S>(session: &mut Session, service: &S) -> bool
where
    S: MetadataService + ?Sized,
{
    match session.begin_generation() {
        Some(ticket) => run_ticket(session, service, ticket).await,
        None => false,
    }
}

/// Runs a "Try Again" cycle against `service`.
///
/// Returns `false` if the session was not in the failed state.
pub async fn retry_with<S>(session: &mut Session, service: &S) -> bool
where
    S: MetadataService + ?Sized,
{
    match session.retry() {
        Some(ticket) => run_ticket(session, service, ticket).await,
        None => false,
    }
}

async fn run_ticket<S>(session: &mut Session, service: &S, ticket: GenerationTicket) -> bool
where
    S: MetadataService + ?Sized,
{
    let outcome = service.generate(ticket.image()).await;
    session.complete(ticket.id(), outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn image(tag: &str) -> EncodedImage {
        EncodedImage::new(tag.as_bytes(), "image/png", Some(format!("{}.png", tag)))
    }

    fn metadata() -> GeneratedMetadata {
        GeneratedMetadata {
            title: "T".to_string(),
            description: "D".to_string(),
            keywords: vec!["a".to_string(), "b".to_string()],
        }
    }

    #[test]
    fn generate_is_a_no_op_without_image() {
        let mut session = Session::new();
        assert!(!session.can_generate());
        assert!(session.begin_generation().is_none());
        assert_eq!(session.status(), &RequestStatus::Idle);
    }

    #[test]
    fn generate_is_refused_while_loading() {
        let mut session = Session::new();
        session.select_image(image("a"));
        let first = session.begin_generation().unwrap();

        assert!(session.status().is_loading());
        assert!(!session.can_generate());
        assert!(session.begin_generation().is_none());

        assert!(session.complete(first.id(), Ok(metadata())));
        assert!(session.can_generate());
    }

    #[test]
    fn success_and_failure_are_exclusive() {
        let mut session = Session::new();
        session.select_image(image("a"));

        let ticket = session.begin_generation().unwrap();
        session.complete(ticket.id(), Ok(metadata()));
        assert_eq!(session.status().metadata(), Some(&metadata()));
        assert!(session.status().error().is_none());
        assert!(!session.status().is_loading());

        let ticket = session.begin_generation().unwrap();
        assert!(session.status().metadata().is_none());
        session.complete(ticket.id(), Err(AppError::generation("boom")));
        assert_eq!(session.status().error(), Some("boom"));
        assert!(session.status().metadata().is_none());
    }

    #[test]
    fn picking_a_file_resets_from_every_state() {
        let mut session = Session::new();
        session.select_image(image("a"));
        let ticket = session.begin_generation().unwrap();
        session.complete(ticket.id(), Ok(metadata()));

        session.select_image(image("b"));
        assert_eq!(session.status(), &RequestStatus::Idle);
        assert_eq!(session.image().and_then(|i| i.file_name()), Some("b.png"));

        session.begin_generation().unwrap();
        session.select_image(image("c"));
        assert_eq!(session.status(), &RequestStatus::Idle);

        let ticket = session.begin_generation().unwrap();
        session.complete(ticket.id(), Err(AppError::generation("boom")));
        session.select_image(image("d"));
        assert_eq!(session.status(), &RequestStatus::Idle);
    }

    #[test]
    fn late_result_after_reset_is_ignored() {
        let mut session = Session::new();
        session.select_image(image("a"));
        let ticket = session.begin_generation().unwrap();

        session.reset();
        assert!(!session.has_image());
        assert!(!session.complete(ticket.id(), Ok(metadata())));
        assert_eq!(session.status(), &RequestStatus::Idle);
    }

    #[test]
    fn late_result_after_new_pick_is_ignored() {
        let mut session = Session::new();
        session.select_image(image("a"));
        let stale = session.begin_generation().unwrap();

        session.select_image(image("b"));
        let fresh = session.begin_generation().unwrap();
        assert_ne!(stale.id(), fresh.id());

        assert!(!session.complete(stale.id(), Ok(metadata())));
        assert!(session.status().is_loading());
        assert!(session.complete(fresh.id(), Err(AppError::generation("boom"))));
    }

    #[test]
    fn retry_only_applies_after_failure() {
        let mut session = Session::new();
        session.select_image(image("a"));
        assert!(session.retry().is_none());

        let ticket = session.begin_generation().unwrap();
        assert!(session.retry().is_none());
        session.complete(ticket.id(), Err(AppError::generation("boom")));

        let retry = session.retry().unwrap();
        assert_eq!(retry.image(), &image("a"));
        assert!(session.status().is_loading());
    }

    #[test]
    fn empty_failure_message_gets_fallback() {
        let mut session = Session::new();
        session.select_image(image("a"));
        let ticket = session.begin_generation().unwrap();
        session.complete(ticket.id(), Err(AppError::generation("")));
        assert_eq!(session.status().error(), Some(FALLBACK_FAILURE_MESSAGE));
    }

    #[test]
    fn removing_the_image_returns_to_idle() {
        let mut session = Session::new();
        session.select_image(image("a"));
        let ticket = session.begin_generation().unwrap();
        session.complete(ticket.id(), Err(AppError::generation("boom")));

        session.remove_image();
        assert!(!session.has_image());
        assert_eq!(session.status(), &RequestStatus::Idle);
        assert!(session.retry().is_none());
    }
}
