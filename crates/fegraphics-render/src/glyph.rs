//! Glyphs: shapes instanced at sample points.
//!
//! A [`Glyph`] is shared between graphics. Graphics that draw a glyph hold a
//! [`GlyphSubscription`], which reports whether the glyph changed since it was
//! last polled. Dropping the subscription unregisters it.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// The geometric shape of a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GlyphShape {
    /// A single point.
    #[default]
    Point,
    /// A line along the first axis.
    Line,
    /// A solid arrow along the first axis.
    Arrow,
    /// A unit-diameter sphere.
    Sphere,
    /// A unit cube centred on the origin.
    Cube,
    /// Three lines along the glyph axes.
    Axes,
}

#[derive(Debug)]
struct GlyphState {
    shape: GlyphShape,
    time_varying: bool,
}

#[derive(Debug)]
struct GlyphInner {
    name: String,
    state: RwLock<GlyphState>,
    generation: AtomicU64,
    subscribers: AtomicUsize,
}

/// A shared, named glyph.
///
/// Clones refer to the same glyph; equality is identity.
#[derive(Clone)]
pub struct Glyph(Arc<GlyphInner>);

impl Glyph {
    /// Creates a glyph.
    pub fn new(name: impl Into<String>, shape: GlyphShape) -> Self {
        Self(Arc::new(GlyphInner {
            name: name.into(),
            state: RwLock::new(GlyphState {
                shape,
                time_varying: false,
            }),
            generation: AtomicU64::new(0),
            subscribers: AtomicUsize::new(0),
        }))
    }

    /// Glyph name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Current shape.
    #[must_use]
    pub fn shape(&self) -> GlyphShape {
        self.0
            .state
            .read()
            .map(|state| state.shape)
            .unwrap_or_default()
    }

    /// Changes the shape and notifies subscribers.
    pub fn set_shape(&self, shape: GlyphShape) {
        if let Ok(mut state) = self.0.state.write() {
            state.shape = shape;
        }
        self.notify_changed();
    }

    /// Returns true if the glyph geometry varies with time.
    #[must_use]
    pub fn is_time_varying(&self) -> bool {
        self.0
            .state
            .read()
            .map(|state| state.time_varying)
            .unwrap_or(false)
    }

    /// Sets time variance and notifies subscribers.
    pub fn set_time_varying(&self, time_varying: bool) {
        if let Ok(mut state) = self.0.state.write() {
            state.time_varying = time_varying;
        }
        self.notify_changed();
    }

    /// Marks the glyph as changed.
    pub fn notify_changed(&self) {
        self.0.generation.fetch_add(1, Ordering::Release);
    }

    /// Starts watching the glyph for changes.
    #[must_use]
    pub fn subscribe(&self) -> GlyphSubscription {
        self.0.subscribers.fetch_add(1, Ordering::AcqRel);
        GlyphSubscription {
            glyph: self.clone(),
            seen: self.0.generation.load(Ordering::Acquire),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.0.subscribers.load(Ordering::Acquire)
    }
}

impl PartialEq for Glyph {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Glyph {}

impl fmt::Debug for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Glyph")
            .field("name", &self.0.name)
            .field("shape", &self.shape())
            .finish()
    }
}

/// A scoped change subscription on a glyph.
#[derive(Debug)]
pub struct GlyphSubscription {
    glyph: Glyph,
    seen: u64,
}

impl GlyphSubscription {
    /// The watched glyph.
    #[must_use]
    pub fn glyph(&self) -> &Glyph {
        &self.glyph
    }

    /// Returns true once for each batch of changes since the last poll.
    pub fn poll(&mut self) -> bool {
        let current = self.glyph.0.generation.load(Ordering::Acquire);
        if current == self.seen {
            false
        } else {
            self.seen = current;
            true
        }
    }
}

impl Drop for GlyphSubscription {
    fn drop(&mut self) {
        self.glyph.0.subscribers.fetch_sub(1, Ordering::AcqRel);
    }
}
