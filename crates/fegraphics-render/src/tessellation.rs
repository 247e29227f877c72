//! Shared tessellation settings.

use std::fmt;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, PartialEq, Eq)]
struct TessellationSettings {
    minimum_divisions: [u32; 3],
    refinement_factors: [u32; 3],
    circle_divisions: u32,
}

/// Describes what a tessellation edit changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TessellationChange {
    /// Name of the edited tessellation.
    pub name: String,
    /// Element divisions changed.
    pub element_divisions_changed: bool,
    /// Circle divisions changed.
    pub circle_divisions_changed: bool,
}

/// Element and circle subdivision shared by many graphics.
///
/// Clones refer to the same tessellation; equality is identity.
#[derive(Clone)]
pub struct Tessellation {
    name: Arc<str>,
    settings: Arc<RwLock<TessellationSettings>>,
}

impl Tessellation {
    /// Creates a tessellation with minimum divisions and no refinement.
    pub fn new(name: impl AsRef<str>, minimum_divisions: [u32; 3], circle_divisions: u32) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            settings: Arc::new(RwLock::new(TessellationSettings {
                minimum_divisions: minimum_divisions.map(|d| d.max(1)),
                refinement_factors: [1, 1, 1],
                circle_divisions: circle_divisions.max(3),
            })),
        }
    }

    /// Tessellation name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn settings(&self) -> TessellationSettings {
        self.settings.read().map(|s| s.clone()).unwrap_or(TessellationSettings {
            minimum_divisions: [1, 1, 1],
            refinement_factors: [1, 1, 1],
            circle_divisions: 3,
        })
    }

    /// Minimum divisions per xi direction.
    #[must_use]
    pub fn minimum_divisions(&self) -> [u32; 3] {
        self.settings().minimum_divisions
    }

    /// Refinement applied to native element discretization.
    #[must_use]
    pub fn refinement_factors(&self) -> [u32; 3] {
        self.settings().refinement_factors
    }

    /// Divisions around circles of cylinders and extruded streamlines.
    #[must_use]
    pub fn circle_divisions(&self) -> u32 {
        self.settings().circle_divisions
    }

    fn edit(&self, edit: impl FnOnce(&mut TessellationSettings)) -> TessellationChange {
        let mut change = TessellationChange {
            name: self.name.to_string(),
            element_divisions_changed: false,
            circle_divisions_changed: false,
        };
        if let Ok(mut settings) = self.settings.write() {
            let before = settings.clone();
            edit(&mut settings);
            change.element_divisions_changed = before.minimum_divisions != settings.minimum_divisions
                || before.refinement_factors != settings.refinement_factors;
            change.circle_divisions_changed = before.circle_divisions != settings.circle_divisions;
        }
        change
    }

    /// Sets minimum divisions, clamped to at least 1.
    pub fn set_minimum_divisions(&self, divisions: [u32; 3]) -> TessellationChange {
        self.edit(|s| s.minimum_divisions = divisions.map(|d| d.max(1)))
    }

    /// Sets refinement factors, clamped to at least 1.
    pub fn set_refinement_factors(&self, factors: [u32; 3]) -> TessellationChange {
        self.edit(|s| s.refinement_factors = factors.map(|f| f.max(1)))
    }

    /// Sets circle divisions, clamped to at least 3.
    pub fn set_circle_divisions(&self, divisions: u32) -> TessellationChange {
        self.edit(|s| s.circle_divisions = divisions.max(3))
    }

    /// Element divisions given an optional native discretization.
    ///
    /// With a native discretization the result is native times refinement,
    /// never below the minimum; otherwise the minimum.
    #[must_use]
    pub fn element_divisions(&self, native: Option<[u32; 3]>) -> [u32; 3] {
        let settings = self.settings();
        match native {
            Some(native) => std::array::from_fn(|i| {
                (native[i].max(1) * settings.refinement_factors[i]).max(settings.minimum_divisions[i])
            }),
            None => settings.minimum_divisions,
        }
    }
}

impl PartialEq for Tessellation {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.settings, &other.settings)
    }
}

impl Eq for Tessellation {}

impl fmt::Debug for Tessellation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tessellation")
            .field("name", &self.name)
            .field("settings", &self.settings())
            .finish()
    }
}
