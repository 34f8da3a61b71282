//! Core data types for scaleplan.
//!
//! This crate provides the message and request types exchanged with the
//! remote completion service, plus the layered settings and logging setup
//! shared by the server and the command-line binary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod input;
mod logging;
mod media;
mod message;
mod output;
mod request;
mod role;
mod settings;

pub use input::Input;
pub use logging::init_logging;
pub use media::{EncodedImage, MediaSource};
pub use message::{Message, MessageBuilder};
pub use output::Output;
pub use request::{
    GenerateRequest, GenerateRequestBuilder, GenerateRequestBuilderError, GenerateResponse,
};
pub use role::Role;
pub use settings::{
    LoggingSettings, ProviderSettings, ServerSettings, Settings, StageOptions, StageSettings,
};
