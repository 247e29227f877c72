//! Spectra mapping data values to colours.

use std::collections::HashMap;
use std::sync::Arc;

use fegraphics_core::{ChangeFlags, ChangeLog};
use glam::Vec3;

/// A colour ramp over a data range.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    /// Spectrum name.
    pub name: String,
    /// Data value mapped to the first colour.
    pub minimum: f32,
    /// Data value mapped to the last colour.
    pub maximum: f32,
    /// Colour samples, evenly spaced over the range.
    pub colours: Vec<Vec3>,
}

impl Spectrum {
    /// Creates a spectrum over `[minimum, maximum]`.
    pub fn new(name: impl Into<String>, minimum: f32, maximum: f32, colours: Vec<Vec3>) -> Self {
        Self {
            name: name.into(),
            minimum,
            maximum,
            colours,
        }
    }

    /// Blue through green to red over `[0, 1]`.
    #[must_use]
    pub fn rainbow() -> Self {
        Self::new(
            "default",
            0.0,
            1.0,
            vec![
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(0.0, 1.0, 1.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
            ],
        )
    }

    /// Black to white over `[0, 1]`.
    #[must_use]
    pub fn grey_scale() -> Self {
        Self::new("grey", 0.0, 1.0, vec![Vec3::ZERO, Vec3::ONE])
    }

    /// Maps a data value to a colour, clamping outside the range.
    #[must_use]
    pub fn value_to_colour(&self, value: f32) -> Vec3 {
        let Some(first) = self.colours.first() else {
            return Vec3::ZERO;
        };
        if self.colours.len() == 1 {
            return *first;
        }
        let span = self.maximum - self.minimum;
        let t = if span.abs() > f32::EPSILON {
            ((value - self.minimum) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let n = self.colours.len() - 1;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = ((t * n as f32).floor() as usize).min(n - 1);
        let frac = t * n as f32 - index as f32;
        self.colours[index].lerp(self.colours[index + 1], frac)
    }

    /// Sets the data range, e.g. to autorange over generated values.
    pub fn set_range(&mut self, minimum: f32, maximum: f32) {
        self.minimum = minimum;
        self.maximum = maximum;
    }
}

/// Named spectra with change tracking.
#[derive(Debug)]
pub struct SpectrumRegistry {
    spectra: HashMap<String, Arc<Spectrum>>,
    changes: ChangeLog<String>,
}

impl Default for SpectrumRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectrumRegistry {
    /// Creates a registry holding the default spectra.
    pub fn new() -> Self {
        let mut spectra = HashMap::new();
        for spectrum in [Spectrum::rainbow(), Spectrum::grey_scale()] {
            spectra.insert(spectrum.name.clone(), Arc::new(spectrum));
        }
        Self {
            spectra,
            changes: ChangeLog::new(),
        }
    }

    /// Registers a spectrum, recording an add or a redefinition.
    pub fn register(&mut self, spectrum: Spectrum) -> Arc<Spectrum> {
        let name = spectrum.name.clone();
        let flags = if self.spectra.contains_key(&name) {
            ChangeFlags::DEFINITION
        } else {
            ChangeFlags::ADD
        };
        let spectrum = Arc::new(spectrum);
        self.spectra.insert(name.clone(), Arc::clone(&spectrum));
        self.changes.record(name, flags);
        spectrum
    }

    /// Gets a spectrum by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Spectrum>> {
        self.spectra.get(name).cloned()
    }

    /// Edits a registered spectrum; returns false if it is unknown.
    pub fn update(&mut self, name: &str, edit: impl FnOnce(&mut Spectrum)) -> bool {
        let Some(existing) = self.spectra.get(name) else {
            return false;
        };
        let mut spectrum = Spectrum::clone(existing);
        edit(&mut spectrum);
        spectrum.name = name.to_string();
        self.spectra.insert(name.to_string(), Arc::new(spectrum));
        self.changes.record(name.to_string(), ChangeFlags::DEFINITION);
        true
    }

    /// Returns and clears the accumulated change log.
    pub fn take_changes(&mut self) -> ChangeLog<String> {
        std::mem::take(&mut self.changes)
    }
}
