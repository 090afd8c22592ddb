//! # chat-markup
//!
//! Rendering core for a desktop chat client: turns model output declared as
//! text, markdown, code or JSON into display markup while keeping the raw
//! content as the system of record, plus the chat history store the UI uses
//! to persist and re-render conversations.

pub mod core;
