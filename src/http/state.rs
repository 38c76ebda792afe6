use crate::capture::{FrameEncoder, FramePusher};
use crate::clients::SimilarityClient;
use crate::session::SessionController;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The one practice session this server drives
    pub controller: Arc<SessionController>,

    /// Upload handle when capture frames come from the browser
    pub pusher: Option<FramePusher>,

    /// Look-alike analysis, independent of the session
    pub similarity: Arc<dyn SimilarityClient>,

    /// Encoder for similarity uploads
    pub encoder: FrameEncoder,
}

impl AppState {
    pub fn new(
        controller: Arc<SessionController>,
        pusher: Option<FramePusher>,
        similarity: Arc<dyn SimilarityClient>,
        encoder: FrameEncoder,
    ) -> Self {
        Self {
            controller,
            pusher,
            similarity,
            encoder,
        }
    }
}
