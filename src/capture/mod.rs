pub mod encode;
pub mod pushed;
pub mod source;
pub mod still;

pub use encode::{EncodedFrame, FrameEncoder};
pub use pushed::{decode_data_url, FramePusher, PushedFrameSource};
pub use source::{CaptureConfig, CaptureHandles, CaptureKind, CaptureSource, CaptureSourceFactory, Frame};
pub use still::StillImageSource;
