// entity_store.rs: fixed-size sprite slot table owned by the game state

use crate::error::{S6Error, S6Result};
use crate::sprite::{Entity, MAX_SPRITES};

/// One optional entity per sprite index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityStore {
    slots: Vec<Option<Entity>>,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            slots: (0..MAX_SPRITES).map(|_| None).collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Entity> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Put `entity` at `index`, returning whatever was there.
    pub fn insert(&mut self, index: usize, entity: Entity) -> S6Result<Option<Entity>> {
        let Some(slot) = self.slots.get_mut(index) else {
            return Err(S6Error::TooManySprites {
                count: index + 1,
                limit: MAX_SPRITES,
            });
        };
        Ok(slot.replace(entity))
    }

    /// Put `entity` in the lowest free slot.
    pub fn add(&mut self, entity: Entity) -> S6Result<usize> {
        let Some(index) = self.slots.iter().position(Option::is_none) else {
            return Err(S6Error::TooManySprites {
                count: MAX_SPRITES + 1,
                limit: MAX_SPRITES,
            });
        };
        self.slots[index] = Some(entity);
        Ok(index)
    }

    pub fn remove(&mut self, index: usize) -> Option<Entity> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Occupied slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Entity)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|e| (i, e)))
    }

    /// Every slot, occupied or not.
    pub fn slots(&self) -> &[Option<Entity>] {
        &self.slots
    }
}
