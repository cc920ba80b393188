//! Thread-safe message generator.

use crate::error::{GenerateError, LoadError};
use crate::generators::evaluate_substitutions;
use crate::render::render;
use crate::template::{Format, Template};
use std::path::Path;

/// Generates messages from an immutable [`Template`].
///
/// Every call to [`Generator::generate`] evaluates the substitutions afresh
/// and renders a new message. The generator holds no mutable state, so it can
/// be shared across threads (for example behind an `Arc`) and called
/// concurrently without locking.
#[derive(Debug, Clone)]
pub struct Generator {
    template: Template,
}

impl Generator {
    /// Create a generator from an already loaded template.
    pub fn new(template: Template) -> Self {
        Self { template }
    }

    /// Load a template file (format chosen by extension) and build a generator.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        Template::from_path(path).map(Self::new)
    }

    /// Parse template bytes in the given format and build a generator.
    pub fn from_slice(data: &[u8], format: Format) -> Result<Self, LoadError> {
        Template::from_slice(data, format).map(Self::new)
    }

    /// The template this generator renders.
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Generate one message.
    pub fn generate(&self) -> Result<Vec<u8>, GenerateError> {
        let values = evaluate_substitutions(&self.template.substitution)?;
        let message = render(&self.template.template, &values)?;
        Ok(message)
    }

    /// Lazily generate `count` independent messages.
    pub fn messages(&self, count: usize) -> Messages<'_> {
        Messages {
            generator: self,
            remaining: count,
        }
    }

    /// Generate `count` messages, stopping at the first failure.
    ///
    /// Messages produced before the failure are discarded; there is no
    /// all-or-nothing guarantee beyond that.
    pub fn generate_batch(&self, count: usize) -> Result<Vec<Vec<u8>>, GenerateError> {
        self.messages(count).collect()
    }
}

/// Iterator that lazily generates messages.
pub struct Messages<'a> {
    generator: &'a Generator,
    remaining: usize,
}

impl Iterator for Messages<'_> {
    type Item = Result<Vec<u8>, GenerateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.generator.generate())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Messages<'_> {}
