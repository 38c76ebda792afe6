pub mod capture;
pub mod clients;
pub mod config;
pub mod emotion;
pub mod error;
pub mod http;
pub mod report;
pub mod session;

pub use capture::{
    CaptureConfig, CaptureSource, CaptureSourceFactory, EncodedFrame, Frame, FrameEncoder,
    FramePusher, PushedFrameSource, StillImageSource,
};
pub use clients::{
    ChartReference, Classification, ClassificationClient, ClientFactory, ClientsConfig,
    ReportClient, ServiceClients, SimilarityClient, SimilarityResult,
};
pub use config::Config;
pub use emotion::{Emotion, EmotionDistribution};
pub use error::{ClientError, SessionError};
pub use http::{create_router, AppState};
pub use report::{Report, ReportConfig, ReportSummary, Rubric, RubricBand, Synthesizer, TipBook};
pub use session::{
    History, Sample, SessionConfig, SessionController, SessionEvent, SessionState, SessionStatus,
};
