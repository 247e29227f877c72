//! Renderer hooks.
//!
//! Graphics objects are backend independent. A [`Renderer`] turns them into
//! display state (`compile`) and draws that state (`execute`). [`RecordingRenderer`]
//! keeps a log of calls and is useful for headless use and tests.

use crate::error::{RenderError, RenderResult};
use crate::graphics_object::GraphicsObject;

/// A rendering backend.
pub trait Renderer {
    /// Prepares display state for `object`.
    fn compile(&mut self, object: &GraphicsObject) -> RenderResult<()>;

    /// Draws previously compiled `object`, tagging it with `pick_name`.
    fn execute(&mut self, object: &GraphicsObject, pick_name: i32) -> RenderResult<()>;
}

/// One call received by a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCall {
    /// `compile` for the named object with its primitive count.
    Compile {
        /// Object name.
        object: String,
        /// Number of primitives.
        primitives: usize,
    },
    /// `execute` for the named object.
    Execute {
        /// Object name.
        object: String,
        /// Picking name.
        pick_name: i32,
    },
}

/// A renderer that records calls instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Vec<RenderCall>,
    compiled: Vec<String>,
}

impl RecordingRenderer {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls received so far.
    #[must_use]
    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    /// Clears the call log.
    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Renderer for RecordingRenderer {
    fn compile(&mut self, object: &GraphicsObject) -> RenderResult<()> {
        self.calls.push(RenderCall::Compile {
            object: object.name().to_string(),
            primitives: object.number_of_primitives(),
        });
        if !self.compiled.iter().any(|n| n == object.name()) {
            self.compiled.push(object.name().to_string());
        }
        Ok(())
    }

    fn execute(&mut self, object: &GraphicsObject, pick_name: i32) -> RenderResult<()> {
        if !self.compiled.iter().any(|n| n == object.name()) {
            return Err(RenderError::ExecuteFailed(object.name().to_string()));
        }
        self.calls.push(RenderCall::Execute {
            object: object.name().to_string(),
            pick_name,
        });
        Ok(())
    }
}
