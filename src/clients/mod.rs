//! Boundary clients for the external analysis services
//!
//! The core only sees the traits; transports are picked by `ClientFactory`.

pub mod http;
pub mod messages;
pub mod nats;
pub mod service;

pub use http::HttpServiceClient;
pub use messages::{Classification, Personality, SimilarAnimal};
pub use nats::NatsServiceClient;
pub use service::{
    ChartReference, ClassificationClient, ClientFactory, ClientsConfig, ReportClient,
    ServiceClients, SimilarityClient, SimilarityResult, Transport,
};
