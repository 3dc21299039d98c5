//! AI Adapter - External Text-Generation Service Client

pub mod client;

pub use client::TextGenClient;
