//! Ordered graphic lists.
//!
//! A [`GraphicList`] owns its graphics in draw order. Positions are 1-based
//! and always dense: inserting shifts later graphics down, removing shifts
//! them up.

use fegraphics_core::{GraphicsError, Result};

use crate::graphic::Graphic;
use crate::types::GraphicChange;

/// Graphics of one rendition in draw order.
#[derive(Debug, Default)]
pub struct GraphicList {
    graphics: Vec<Graphic>,
}

impl GraphicList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `graphic` at a 1-based position and returns the position used.
    ///
    /// Position 0 or any position past the end appends.
    pub fn add(&mut self, mut graphic: Graphic, position: u32) -> u32 {
        let index = match position as usize {
            0 => self.graphics.len(),
            p => (p - 1).min(self.graphics.len()),
        };
        graphic.position = index as u32 + 1;
        self.graphics.insert(index, graphic);
        self.renumber(index + 1);
        log::debug!("added graphic at position {}", index + 1);
        index as u32 + 1
    }

    /// Removes the graphic at `position` and returns it.
    pub fn remove(&mut self, position: u32) -> Result<Graphic> {
        let index = self.index_of(position)?;
        let mut graphic = self.graphics.remove(index);
        graphic.position = 0;
        self.renumber(index);
        Ok(graphic)
    }

    /// Replaces the settings of the graphic at `position` with those of `source`.
    ///
    /// The graphic keeps its position and rendition. A graphic of another type
    /// replaces the entry entirely.
    pub fn modify(&mut self, position: u32, source: &Graphic) -> Result<()> {
        let index = self.index_of(position)?;
        let target = &mut self.graphics[index];
        if target.graphic_type() == source.graphic_type() {
            return target.copy_from(source);
        }
        let mut replacement = source.duplicate();
        replacement.position = target.position;
        replacement.rendition = target.rendition;
        *target = replacement;
        Ok(())
    }

    /// Graphic at a 1-based position.
    #[must_use]
    pub fn get(&self, position: u32) -> Option<&Graphic> {
        self.graphics.get((position as usize).checked_sub(1)?)
    }

    /// Mutable graphic at a 1-based position.
    pub fn get_mut(&mut self, position: u32) -> Option<&mut Graphic> {
        self.graphics.get_mut((position as usize).checked_sub(1)?)
    }

    /// First graphic answering to `name`; see [`Graphic::has_name`].
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Graphic> {
        self.graphics.iter().find(|g| g.has_name(name))
    }

    /// Iterates in draw order.
    pub fn iter(&self) -> std::slice::Iter<'_, Graphic> {
        self.graphics.iter()
    }

    /// Iterates mutably in draw order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Graphic> {
        self.graphics.iter_mut()
    }

    /// Number of graphics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graphics.len()
    }

    /// Returns true if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graphics.is_empty()
    }

    /// Copies every graphic, without graphics objects, into a new list.
    #[must_use]
    pub fn copy_and_put_in_list(&self) -> GraphicList {
        let mut copy = GraphicList::new();
        for graphic in &self.graphics {
            let mut duplicate = graphic.duplicate();
            duplicate.rendition = graphic.rendition;
            copy.graphics.push(duplicate);
        }
        copy
    }

    fn index_of(&self, position: u32) -> Result<usize> {
        match position as usize {
            p if (1..=self.graphics.len()).contains(&p) => Ok(p - 1),
            _ => Err(GraphicsError::NotInList(position.to_string())),
        }
    }

    fn renumber(&mut self, from: usize) {
        for (index, graphic) in self.graphics.iter_mut().enumerate().skip(from) {
            graphic.position = index as u32 + 1;
        }
    }
}

impl<'a> IntoIterator for &'a GraphicList {
    type Item = &'a Graphic;
    type IntoIter = std::slice::Iter<'a, Graphic>;

    fn into_iter(self) -> Self::IntoIter {
        self.graphics.iter()
    }
}

impl Graphic {
    /// Takes over the graphics object of an equivalent graphic in `list`.
    ///
    /// Only applies if this graphic has no graphics object. The first entry
    /// that generates the same primitives and owns an object gives it up
    /// together with its dirty state and is left needing a full rebuild.
    /// Returns true if an object was transferred.
    pub fn extract_graphics_object_from_list(&mut self, list: &mut GraphicList) -> bool {
        if self.graphics_object.is_some() {
            return false;
        }
        let Some(donor) = list
            .iter_mut()
            .find(|other| other.graphics_object.is_some() && self.same_non_trivial(other))
        else {
            return false;
        };
        self.graphics_object = donor.graphics_object.take();
        self.graphics_changed = donor.graphics_changed;
        self.selected_graphics_changed = donor.selected_graphics_changed;
        self.reuse_allowed = donor.reuse_allowed;
        donor.changed(GraphicChange::FullRebuild);
        log::debug!(
            "graphic at position {} took the graphics object of position {}",
            self.position,
            donor.position
        );
        self.update_graphics_object_trivial();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GraphicType;
    use fegraphics_render::{GraphicsObject, GraphicsObjectKind};
    use proptest::prelude::*;

    fn positions(list: &GraphicList) -> Vec<u32> {
        list.iter().map(Graphic::position).collect()
    }

    #[test]
    fn test_add_and_remove_keep_positions_dense() {
        let mut list = GraphicList::new();
        assert_eq!(list.add(Graphic::create(GraphicType::Lines), 0), 1);
        assert_eq!(list.add(Graphic::create(GraphicType::Surfaces), 0), 2);
        assert_eq!(list.add(Graphic::create(GraphicType::NodePoints), 1), 1);
        assert_eq!(positions(&list), vec![1, 2, 3]);
        assert_eq!(list.get(2).unwrap().graphic_type(), GraphicType::Lines);
        let removed = list.remove(1).unwrap();
        assert_eq!(removed.graphic_type(), GraphicType::NodePoints);
        assert_eq!(positions(&list), vec![1, 2]);
        assert!(matches!(list.remove(5), Err(GraphicsError::NotInList(_))));
        assert_eq!(list.add(Graphic::create(GraphicType::Static), 99), 3);
    }

    #[test]
    fn test_modify_keeps_position() {
        let mut list = GraphicList::new();
        list.add(Graphic::create(GraphicType::Lines), 0);
        list.add(Graphic::create(GraphicType::Lines), 0);
        let mut edited = Graphic::create(GraphicType::Lines);
        edited.set_name(Some("edges"));
        list.modify(2, &edited).unwrap();
        assert_eq!(list.get(2).unwrap().name(), Some("edges"));
        assert_eq!(list.get(2).unwrap().position(), 2);

        let surfaces = Graphic::create(GraphicType::Surfaces);
        list.modify(1, &surfaces).unwrap();
        assert_eq!(list.get(1).unwrap().graphic_type(), GraphicType::Surfaces);
        assert_eq!(list.get(1).unwrap().position(), 1);
        assert!(list.find_by_name("edges").is_some());
        assert!(list.find_by_name("1").is_some());
    }

    #[test]
    fn test_extract_transfers_object() {
        let mut old = Graphic::create(GraphicType::Lines);
        old.graphics_object = Some(GraphicsObject::new(
            "region.1",
            GraphicsObjectKind::PolylineVertexBuffers,
        ));
        old.graphics_changed = false;
        old.selected_graphics_changed = false;
        let mut list = GraphicList::new();
        list.add(old, 0);

        let mut replacement = Graphic::create(GraphicType::Lines);
        assert!(replacement.extract_graphics_object_from_list(&mut list));
        assert_eq!(replacement.graphics_object().unwrap().name(), "region.1");
        assert!(!replacement.graphics_changed());
        let donor = list.get(1).unwrap();
        assert!(donor.graphics_object().is_none());
        assert!(donor.graphics_changed());
        assert!(!replacement.extract_graphics_object_from_list(&mut list));
    }

    #[test]
    fn test_extract_requires_equivalent_graphic() {
        let mut old = Graphic::create(GraphicType::Lines);
        old.graphics_object = Some(GraphicsObject::new(
            "region.1",
            GraphicsObjectKind::PolylineVertexBuffers,
        ));
        let mut list = GraphicList::new();
        list.add(old, 0);
        let mut other = Graphic::create(GraphicType::Lines);
        other.set_discretization([3, 1, 1]).unwrap();
        assert!(!other.extract_graphics_object_from_list(&mut list));
        assert!(list.get(1).unwrap().graphics_object().is_some());
    }

    #[test]
    fn test_copy_and_put_in_list() {
        let mut list = GraphicList::new();
        list.add(Graphic::create(GraphicType::Lines), 0);
        list.add(Graphic::create(GraphicType::Surfaces), 0);
        let copy = list.copy_and_put_in_list();
        assert_eq!(positions(&copy), vec![1, 2]);
        assert!(copy.iter().zip(&list).all(|(a, b)| a.matches(b)));
        assert!(copy.iter().all(|g| g.graphics_object().is_none()));
    }

    proptest! {
        #[test]
        fn test_positions_stay_dense(ops in prop::collection::vec((any::<bool>(), 0_u32..8), 0..40)) {
            let mut list = GraphicList::new();
            for (insert, position) in ops {
                if insert || list.is_empty() {
                    list.add(Graphic::create(GraphicType::Lines), position);
                } else {
                    let _ = list.remove(position);
                }
                let expected: Vec<u32> = (1..=list.len() as u32).collect();
                prop_assert_eq!(positions(&list), expected);
            }
        }
    }
}
