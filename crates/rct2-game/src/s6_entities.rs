// s6_entities.rs: the S6 sprite table as a whole
//
// Layout: MAX_SPRITES records, then the six list heads and six list counts
// (u16 each). A sealed chunk carries the legacy checksum as a trailing u32.

use std::collections::HashMap;

use rct2_common::checksum::checksum_block;
use rct2_common::config::with_config;
use rct2_common::{ByteStream, StreamError};
use sha1::{Digest, Sha1};

use crate::entity_store::EntityStore;
use crate::error::{S6Error, S6Result};
use crate::object_index::ObjectIndexTable;
use crate::s6_sprites::{decode_sprite, encode_sprite, SpriteLinks, SPRITE_RECORD_SIZE};
use crate::sprite::{
    Entity, SpriteIdentifier, SpriteList, MAX_SPRITES, NUM_SPRITE_LISTS, SPRITE_INDEX_NULL,
    SPRITE_LOCATION_NULL,
};

pub const SPRITE_TABLE_SIZE: usize = MAX_SPRITES * SPRITE_RECORD_SIZE;
pub const SPRITE_CHUNK_SIZE: usize = SPRITE_TABLE_SIZE + NUM_SPRITE_LISTS * 2 * 2;

/// Spatial index slot for sprites that are not on the map.
pub const SPATIAL_INDEX_LOCATION_NULL: usize = 0x10000;

/// What to do with a record whose object references cannot be resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImportPolicy {
    /// Leave the slot empty and report the record.
    #[default]
    SkipUnresolved,
    /// Fail the whole import.
    AbortOnUnresolved,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportOptions {
    pub policy: ImportPolicy,
    pub allow_incorrect_checksum: bool,
}

impl ImportOptions {
    /// Options as set in the loaded config.
    pub fn from_config(policy: ImportPolicy) -> Self {
        Self {
            policy,
            allow_incorrect_checksum: with_config(|c| {
                c.general.allow_loading_with_incorrect_checksum
            }),
        }
    }
}

#[derive(Debug)]
pub struct SkippedRecord {
    pub index: usize,
    pub error: S6Error,
}

#[derive(Debug)]
pub struct ImportedEntities {
    pub store: EntityStore,
    pub skipped: Vec<SkippedRecord>,
    /// List heads and counts as stored in the file.
    pub list_heads: [u16; NUM_SPRITE_LISTS],
    pub list_counts: [u16; NUM_SPRITE_LISTS],
}

// ============================================================
// Import
// ============================================================

/// Decode a full sprite table from `stream`.
pub fn import_entities(
    stream: &mut ByteStream,
    objects: &ObjectIndexTable,
    policy: ImportPolicy,
) -> S6Result<ImportedEntities> {
    let mut store = EntityStore::new();
    let mut skipped = Vec::new();

    for index in 0..MAX_SPRITES {
        match decode_sprite(stream, objects) {
            Ok(Some(entity)) => {
                store.insert(index, entity)?;
            }
            Ok(None) => {}
            Err(S6Error::Stream(source)) => {
                return Err(S6Error::CorruptRecord { index, source });
            }
            Err(e @ S6Error::UnresolvedObjectReference { .. }) => match policy {
                ImportPolicy::SkipUnresolved => {
                    log::warn!("skipping sprite {}: {}", index, e);
                    skipped.push(SkippedRecord { index, error: e });
                }
                ImportPolicy::AbortOnUnresolved => {
                    return Err(S6Error::UnresolvedRecord {
                        index,
                        source: Box::new(e),
                    });
                }
            },
            Err(e) => return Err(e),
        }
    }

    let mut list_heads = [SPRITE_INDEX_NULL; NUM_SPRITE_LISTS];
    let mut list_counts = [0u16; NUM_SPRITE_LISTS];
    for head in list_heads.iter_mut() {
        *head = stream.read_u16()?;
    }
    for count in list_counts.iter_mut() {
        *count = stream.read_u16()?;
    }

    log::debug!(
        "imported {} sprites ({} skipped)",
        store.len(),
        skipped.len()
    );
    Ok(ImportedEntities {
        store,
        skipped,
        list_heads,
        list_counts,
    })
}

/// Check the trailing checksum of `data` and import the chunk before it.
pub fn import_sealed(
    data: &[u8],
    objects: &ObjectIndexTable,
    options: ImportOptions,
) -> S6Result<ImportedEntities> {
    let payload = match verify(data) {
        Ok(payload) => payload,
        Err(S6Error::ChecksumMismatch { expected, actual }) if options.allow_incorrect_checksum => {
            log::warn!(
                "checksum mismatch (stored {:#010x}, computed {:#010x}), loading anyway",
                expected,
                actual
            );
            &data[..data.len() - 4]
        }
        Err(e) => return Err(e),
    };
    let mut stream = ByteStream::from_bytes(payload.to_vec());
    import_entities(&mut stream, objects, options.policy)
}

// ============================================================
// Export
// ============================================================

/// Links for every slot plus list heads and counts, rebuilt from a store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpriteLinkTable {
    pub links: Vec<SpriteLinks>,
    pub list_heads: [u16; NUM_SPRITE_LISTS],
    pub list_counts: [u16; NUM_SPRITE_LISTS],
}

/// Spatial index slot for a sprite at `(x, y)`.
pub fn quadrant_index(x: i16, y: i16) -> usize {
    if x == SPRITE_LOCATION_NULL {
        return SPATIAL_INDEX_LOCATION_NULL;
    }
    let x = x.max(0) as usize;
    let y = y.max(0) as usize;
    ((x & 0x1FE0) << 3) | ((y >> 5) & 0xFF)
}

/// The first car of a train goes in the train list, the rest in the
/// vehicle list.
fn list_of(entity: Option<&Entity>) -> SpriteList {
    match entity {
        None => SpriteList::Null,
        Some(Entity::Vehicle(v)) if v.is_child => SpriteList::Vehicle,
        Some(Entity::Vehicle(_)) => SpriteList::Train,
        Some(Entity::Peep(_)) => SpriteList::Peep,
        Some(Entity::Litter(_)) => SpriteList::Litter,
        Some(_) => SpriteList::Misc,
    }
}

/// Chain every list in ascending slot order and every spatial quadrant with
/// the highest slot first.
pub fn build_links(store: &EntityStore) -> SpriteLinkTable {
    let mut links: Vec<SpriteLinks> = (0..MAX_SPRITES)
        .map(|i| SpriteLinks::unlinked(i as u16))
        .collect();
    let mut list_heads = [SPRITE_INDEX_NULL; NUM_SPRITE_LISTS];
    let mut list_counts = [0u16; NUM_SPRITE_LISTS];
    let mut list_tails = [SPRITE_INDEX_NULL; NUM_SPRITE_LISTS];
    let mut quadrants: HashMap<usize, u16> = HashMap::new();

    for (index, slot) in store.slots().iter().enumerate() {
        let list = list_of(slot.as_ref());
        let l = list as usize;
        let this = index as u16;

        links[index].list = list;
        links[index].previous = list_tails[l];
        if list_tails[l] == SPRITE_INDEX_NULL {
            list_heads[l] = this;
        } else {
            links[list_tails[l] as usize].next = this;
        }
        list_tails[l] = this;
        list_counts[l] += 1;

        if let Some(entity) = slot {
            let base = entity.base();
            let quadrant = quadrant_index(base.x, base.y);
            links[index].next_in_quadrant = quadrants
                .insert(quadrant, this)
                .unwrap_or(SPRITE_INDEX_NULL);
        }
    }

    SpriteLinkTable {
        links,
        list_heads,
        list_counts,
    }
}

/// Encode the whole store as a sprite table chunk.
///
/// `stream` is untouched when any record fails to encode.
pub fn export_entities(
    stream: &mut ByteStream,
    store: &EntityStore,
    objects: &ObjectIndexTable,
) -> S6Result<()> {
    let table = build_links(store);
    let mut chunk = ByteStream::with_capacity(SPRITE_CHUNK_SIZE);

    for (index, slot) in store.slots().iter().enumerate() {
        encode_sprite(&mut chunk, slot.as_ref(), &table.links[index], objects).map_err(|e| {
            let unresolved = matches!(e, S6Error::UnresolvedObjectReference { .. });
            let source = Box::new(e);
            if unresolved {
                S6Error::UnresolvedRecord { index, source }
            } else {
                S6Error::InvalidRecord { index, source }
            }
        })?;
    }
    for head in table.list_heads {
        chunk.write_u16(head);
    }
    for count in table.list_counts {
        chunk.write_u16(count);
    }

    stream.write(chunk.as_slice());
    log::debug!("exported {} sprites", store.len());
    Ok(())
}

// ============================================================
// Checksum and digest
// ============================================================

/// Append the legacy checksum of everything in `stream`.
pub fn seal(stream: &mut ByteStream) -> S6Result<u32> {
    let sum = checksum_block(stream.as_slice());
    stream.set_position(stream.len())?;
    stream.write_u32(sum);
    Ok(sum)
}

/// Check the trailing checksum and return the data it covers.
pub fn verify(data: &[u8]) -> S6Result<&[u8]> {
    if data.len() < 4 {
        return Err(StreamError::OutOfBounds {
            position: 0,
            requested: 4,
            length: data.len(),
        }
        .into());
    }
    let (payload, stored) = data.split_at(data.len() - 4);
    let expected = u32::from_le_bytes([stored[0], stored[1], stored[2], stored[3]]);
    let actual = checksum_block(payload);
    if expected != actual {
        return Err(S6Error::ChecksumMismatch { expected, actual });
    }
    Ok(payload)
}

fn hex_lower(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}

/// SHA-1 over the encoded records of a sprite table, skipping null and misc
/// sprites. Bounding boxes and the peep window-invalidate byte are zeroed
/// first since they do not affect game state.
pub fn records_checksum(table: &[u8]) -> String {
    let mut hasher = Sha1::new();
    for record in table.chunks_exact(SPRITE_RECORD_SIZE).take(MAX_SPRITES) {
        let identifier = record[0];
        if identifier == SpriteIdentifier::Null as u8 || identifier == SpriteIdentifier::Misc as u8
        {
            continue;
        }
        let mut copy = [0u8; SPRITE_RECORD_SIZE];
        copy.copy_from_slice(record);
        copy[0x16..0x1E].fill(0);
        if identifier == SpriteIdentifier::Peep as u8 {
            copy[0x45] = 0;
        }
        hasher.update(copy);
    }
    hex_lower(&hasher.finalize())
}

/// Digest of the store as it would be exported.
pub fn entity_checksum(store: &EntityStore, objects: &ObjectIndexTable) -> S6Result<String> {
    let mut stream = ByteStream::with_capacity(SPRITE_CHUNK_SIZE);
    export_entities(&mut stream, store, objects)?;
    Ok(records_checksum(stream.as_slice()))
}

// ============================================================
// Tests
// ============================================================
