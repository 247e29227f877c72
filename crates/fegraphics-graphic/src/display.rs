//! Compile and execute hooks for visible graphics.

use fegraphics_render::{Bounds, RenderResult, Renderer};

use crate::graphic::Graphic;
use crate::list::GraphicList;

impl Graphic {
    /// Compiles the graphics object if the graphic is visible and it changed.
    pub fn compile_visible(&mut self, renderer: &mut dyn Renderer) -> RenderResult<()> {
        if !self.visibility_flag {
            return Ok(());
        }
        if let Some(object) = &mut self.graphics_object {
            if object.needs_compile() {
                renderer.compile(object)?;
                object.mark_compiled();
            }
        }
        Ok(())
    }

    /// Draws the graphics object of a visible graphic, picked by its position.
    pub fn execute_visible(&self, renderer: &mut dyn Renderer) -> RenderResult<()> {
        match &self.graphics_object {
            Some(object) if self.visibility_flag => {
                renderer.execute(object, i32::try_from(self.position).unwrap_or(i32::MAX))
            }
            _ => Ok(()),
        }
    }

    /// Grows `bounds` by the generated geometry of a visible graphic.
    pub fn visible_graphics_object_range(&self, bounds: &mut Option<Bounds>) {
        if !self.visibility_flag {
            return;
        }
        let Some(object_bounds) = self.graphics_object.as_ref().and_then(|o| o.bounds()) else {
            return;
        };
        match bounds {
            Some(bounds) => bounds.union(&object_bounds),
            None => *bounds = Some(object_bounds),
        }
    }
}

impl GraphicList {
    /// Compiles every visible graphic in draw order.
    pub fn compile_visible(&mut self, renderer: &mut dyn Renderer) -> RenderResult<()> {
        for graphic in self.iter_mut() {
            graphic.compile_visible(renderer)?;
        }
        Ok(())
    }

    /// Draws every visible graphic in draw order.
    pub fn execute_visible(&self, renderer: &mut dyn Renderer) -> RenderResult<()> {
        for graphic in self {
            graphic.execute_visible(renderer)?;
        }
        Ok(())
    }

    /// Bounding box of the geometry of every visible graphic.
    #[must_use]
    pub fn visible_range(&self) -> Option<Bounds> {
        let mut bounds = None;
        for graphic in self {
            graphic.visible_graphics_object_range(&mut bounds);
        }
        bounds
    }
}
