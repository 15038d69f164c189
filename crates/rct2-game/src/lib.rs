// rct2-game: sprite entities and the S6 save-game sprite codec

#![allow(clippy::too_many_arguments, clippy::field_reassign_with_default)]

pub mod entity_store;
pub mod error;
pub mod object_index;
pub mod s6_entities;
pub mod s6_sprites;
pub mod sprite;

pub use entity_store::EntityStore;
pub use error::{S6Error, S6Result};
pub use object_index::{ObjectIndexTable, ObjectKind, RideEntryId, RideId};
pub use s6_entities::{
    entity_checksum, export_entities, import_entities, import_sealed, seal, verify,
    ImportOptions, ImportPolicy, ImportedEntities,
};
pub use s6_sprites::{decode_sprite, encode_sprite, SpriteLinks};
pub use sprite::Entity;
