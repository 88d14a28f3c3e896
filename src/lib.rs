//! Report-generation service for speech-language pathologists: turns a
//! template plus session observations into report text via a hosted
//! chat-completion API, and persists finished reports per user in a hosted
//! document store.

pub mod dataset;
pub mod error;
pub mod openai;
pub mod pages;
pub mod report;
pub mod routes;
pub mod timer;
