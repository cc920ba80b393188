//! Payload template engine for kafka-pusher.
//!
//! A template file holds two mappings: `substitution`, whose values may carry
//! a function call such as `{{@uuid}}`, and `template`, the message body whose
//! strings reference substitutions as `{{.name}}`. Each generation evaluates
//! the substitutions afresh and renders the body to JSON bytes.
//!
//! # Architecture
//!
//! ```text
//! template file (YAML / JSON)
//!        │
//!        ▼
//! ┌─────────────────┐
//! │    Template     │  loaded once, immutable
//! └────────┬────────┘
//!          │  Generator::generate()  (per call, lock-free)
//!          ▼
//! ┌─────────────────┐      ┌─────────────────┐
//! │   generators    │ ───▶ │     render      │
//! │ {{@fn}} → value │      │ {{.name}} → text│
//! └─────────────────┘      └────────┬────────┘
//!                                   ▼
//!                              JSON bytes
//! ```
//!
//! # Example
//!
//! ```rust
//! use payload_template::{Format, Generator};
//!
//! let generator = Generator::from_slice(br#"
//! substitution:
//!   id: "{{@guid}}"
//!   at: "{{@now|UnixMilli}}"
//! template:
//!   id: "{{.id}}"
//!   sentAt: "{{.at}}"
//! "#, Format::Yaml).unwrap();
//!
//! let message = generator.generate().unwrap();
//! let parsed: serde_json::Value = serde_json::from_slice(&message).unwrap();
//! assert_eq!(parsed["id"].as_str().unwrap().len(), 36);
//! ```
//!
//! # Functions
//!
//! - `{{@guid}}` - 16 random bytes as `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`
//! - `{{@uuid}}` - RFC 4122 version 4 UUID
//! - `{{@now|FORMAT}}` - current UTC time (RFC3339 by default)
//! - `{{@rnd|N}}` - zero-padded random number with N digits (6 by default)

pub mod dsl;
pub mod error;
pub mod generator;
pub mod generators;
pub mod render;
pub mod template;

// Re-exports for convenience
pub use error::{DslError, EvaluationError, GenerateError, LoadError, RenderError};
pub use generator::{Generator, Messages};
pub use template::{Format, Template};
