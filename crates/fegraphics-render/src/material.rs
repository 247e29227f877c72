//! Materials for graphics objects.
//!
//! A material sets the lighting response of drawn geometry. Graphics hold
//! shared handles into a [`MaterialRegistry`]; editing a registered material
//! records a change that the owning graphics pick up on their next update.

use std::collections::HashMap;
use std::sync::Arc;

use fegraphics_core::{ChangeFlags, ChangeLog};
use glam::Vec3;

/// A material definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material name.
    pub name: String,
    /// Ambient colour.
    pub ambient: Vec3,
    /// Diffuse colour.
    pub diffuse: Vec3,
    /// Emitted colour.
    pub emission: Vec3,
    /// Specular colour.
    pub specular: Vec3,
    /// Specular exponent in 0..1, scaled by the renderer.
    pub shininess: f32,
    /// Opacity (0 transparent, 1 opaque).
    pub alpha: f32,
}

impl Material {
    /// Creates a grey material.
    pub fn new(name: impl Into<String>) -> Self {
        Self::coloured(name, Vec3::splat(0.75))
    }

    /// Creates a material whose ambient and diffuse colours are `colour`.
    pub fn coloured(name: impl Into<String>, colour: Vec3) -> Self {
        Self {
            name: name.into(),
            ambient: colour,
            diffuse: colour,
            emission: Vec3::ZERO,
            specular: Vec3::ZERO,
            shininess: 0.0,
            alpha: 1.0,
        }
    }

    /// The material used for unselected geometry when none is set.
    #[must_use]
    pub fn default_material() -> Self {
        Self::new("default")
    }

    /// The material used for selected geometry when none is set.
    #[must_use]
    pub fn default_selected() -> Self {
        Self {
            emission: Vec3::new(0.3, 0.0, 0.0),
            ..Self::coloured("default_selected", Vec3::new(1.0, 0.0, 0.0))
        }
    }

    /// Glossy bronze.
    #[must_use]
    pub fn bronze() -> Self {
        Self {
            specular: Vec3::new(0.6, 0.5, 0.3),
            shininess: 0.3,
            ..Self::coloured("bronze", Vec3::new(0.7, 0.4, 0.1))
        }
    }

    /// Matte muscle tissue.
    #[must_use]
    pub fn muscle() -> Self {
        Self {
            ambient: Vec3::new(0.4, 0.14, 0.11),
            specular: Vec3::new(0.3, 0.3, 0.3),
            shininess: 0.2,
            ..Self::coloured("muscle", Vec3::new(0.5, 0.12, 0.1))
        }
    }

    /// Returns true if the material is not fully opaque.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.alpha < 1.0
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::default_material()
    }
}

/// Named materials with change tracking.
#[derive(Debug)]
pub struct MaterialRegistry {
    materials: HashMap<String, Arc<Material>>,
    changes: ChangeLog<String>,
}

impl Default for MaterialRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialRegistry {
    /// Creates a registry holding the default materials.
    pub fn new() -> Self {
        let mut registry = Self {
            materials: HashMap::new(),
            changes: ChangeLog::new(),
        };
        for material in [
            Material::default_material(),
            Material::default_selected(),
            Material::bronze(),
            Material::muscle(),
        ] {
            registry.materials.insert(material.name.clone(), Arc::new(material));
        }
        registry
    }

    /// Registers a material, replacing and recording a change for any existing one.
    pub fn register(&mut self, material: Material) -> Arc<Material> {
        let name = material.name.clone();
        let material = Arc::new(material);
        let flags = if self.materials.contains_key(&name) {
            ChangeFlags::DEFINITION
        } else {
            ChangeFlags::ADD
        };
        self.materials.insert(name.clone(), Arc::clone(&material));
        self.changes.record(name, flags);
        material
    }

    /// Gets a material by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Material>> {
        self.materials.get(name).cloned()
    }

    /// Edits a registered material in place; returns false if it is unknown.
    pub fn update(&mut self, name: &str, edit: impl FnOnce(&mut Material)) -> bool {
        let Some(existing) = self.materials.get(name) else {
            return false;
        };
        let mut material = Material::clone(existing);
        edit(&mut material);
        material.name = name.to_string();
        self.materials.insert(name.to_string(), Arc::new(material));
        self.changes.record(name.to_string(), ChangeFlags::DEFINITION);
        true
    }

    /// Returns all material names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.materials.keys().map(String::as_str)
    }

    /// Returns and clears the accumulated change log.
    pub fn take_changes(&mut self) -> ChangeLog<String> {
        std::mem::take(&mut self.changes)
    }
}
