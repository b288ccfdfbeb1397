//! Reply classifier for the Bluejay bot engine.
//!
//! [`OpenAiClassifier`] talks to any OpenAI-compatible chat-completions
//! endpoint and implements [`bluejay_interface::Classifier`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod dto;
mod openai;

pub use config::{DEFAULT_SYSTEM_PROMPT, OpenAiClassifierConfig};
pub use dto::{ChatMessage, ChatRequest, ChatRequestBuilder, ChatRole};
pub use openai::{OpenAiClassifier, parse_classification};
