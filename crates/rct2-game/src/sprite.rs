// sprite.rs: in-memory entity model for the legacy sprite table
//
// One Entity per occupied sprite slot. Fields mirror what the save format
// persists; link fields and bounding boxes are derived and live elsewhere.

use std::collections::BTreeSet;

use crate::object_index::{RideEntryId, RideId};

pub const MAX_SPRITES: usize = 10000;
pub const SPRITE_INDEX_NULL: u16 = 0xFFFF;
/// `x` value of a sprite that is not on the map.
pub const SPRITE_LOCATION_NULL: i16 = i16::MIN;

pub const NUM_SPRITE_LISTS: usize = 6;

/// Sprite identifier byte, the first byte of every record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SpriteIdentifier {
    Vehicle = 0,
    Peep = 1,
    Misc = 2,
    Litter = 3,
    Null = 255,
}

impl SpriteIdentifier {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Vehicle),
            1 => Some(Self::Peep),
            2 => Some(Self::Misc),
            3 => Some(Self::Litter),
            255 => Some(Self::Null),
            _ => None,
        }
    }
}

/// Sub-type byte of misc sprites.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MiscType {
    SteamParticle = 0,
    MoneyEffect = 1,
    CrashedVehicleParticle = 2,
    ExplosionCloud = 3,
    CrashSplash = 4,
    ExplosionFlare = 5,
    JumpingFountainWater = 6,
    Balloon = 7,
    Duck = 8,
    JumpingFountainSnow = 9,
}

impl MiscType {
    pub fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            0 => Self::SteamParticle,
            1 => Self::MoneyEffect,
            2 => Self::CrashedVehicleParticle,
            3 => Self::ExplosionCloud,
            4 => Self::CrashSplash,
            5 => Self::ExplosionFlare,
            6 => Self::JumpingFountainWater,
            7 => Self::Balloon,
            8 => Self::Duck,
            9 => Self::JumpingFountainSnow,
            _ => return None,
        })
    }
}

/// The linked list a sprite slot belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum SpriteList {
    Null = 0,
    Train = 1,
    Peep = 2,
    Misc = 3,
    Litter = 4,
    Vehicle = 5,
}

impl SpriteList {
    pub const ALL: [SpriteList; NUM_SPRITE_LISTS] = [
        SpriteList::Null,
        SpriteList::Train,
        SpriteList::Peep,
        SpriteList::Misc,
        SpriteList::Litter,
        SpriteList::Vehicle,
    ];

    /// The record stores twice the list number.
    pub fn offset(self) -> u8 {
        (self as u8) * 2
    }

    pub fn from_offset(offset: u8) -> Option<Self> {
        if offset % 2 != 0 {
            return None;
        }
        Self::ALL.get((offset / 2) as usize).copied()
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct SpriteFlags: u16 {
        const IS_CRASHED_VEHICLE_SPRITE = 1 << 7;
        const PEEP_VISIBLE              = 1 << 8;
        const PEEP_FLASHING             = 1 << 9;
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct PeepFlags: u32 {
        const LEAVING_PARK                       = 1 << 0;
        const SLOW_WALK                          = 1 << 1;
        const TRACKING                           = 1 << 3;
        const WAVING                             = 1 << 4;
        const HAS_PAID_FOR_PARK_ENTRY            = 1 << 5;
        const PHOTO                              = 1 << 6;
        const PAINTING                           = 1 << 7;
        const WOW                                = 1 << 8;
        const LITTER                             = 1 << 9;
        const LOST                               = 1 << 10;
        const HUNGER                             = 1 << 11;
        const BATHROOM                           = 1 << 12;
        const CROWDED                            = 1 << 13;
        const HAPPINESS                          = 1 << 14;
        const NAUSEA                             = 1 << 15;
        const PURPLE                             = 1 << 16;
        const PIZZA                              = 1 << 17;
        const EXPLODE                            = 1 << 18;
        const RIDE_SHOULD_BE_MARKED_AS_FAVOURITE = 1 << 19;
        const PARK_ENTRANCE_CHOSEN               = 1 << 20;
        const CONTAGIOUS                         = 1 << 22;
        const JOY                                = 1 << 23;
        const ANGRY                              = 1 << 24;
        const ICE_CREAM                          = 1 << 25;
        const HERE_WE_ARE                        = 1 << 28;
        const TWITCH                             = 1 << 31;
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct FountainFlags: u8 {
        const FAST      = 1 << 0;
        const GOTO_EDGE = 1 << 1;
        const SPLIT     = 1 << 2;
        const TERMINATE = 1 << 3;
        const BOUNCE    = 1 << 4;
        const SNOW      = 1 << 7;
    }
}

// ============================================================
// Common header
// ============================================================

/// Fields shared by every sprite kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpriteBase {
    pub sprite_height_negative: u8,
    pub flags: SpriteFlags,
    pub x: i16,
    pub y: i16,
    pub z: i16,
    pub sprite_width: u8,
    pub sprite_height_positive: u8,
    pub sprite_direction: u8,
}

impl SpriteBase {
    pub fn is_on_map(&self) -> bool {
        self.x != SPRITE_LOCATION_NULL
    }
}

// ============================================================
// Peeps
// ============================================================

pub const PEEP_STATE_FALLING: u8 = 0;
pub const PEEP_STATE_ON_RIDE: u8 = 3;
pub const PEEP_STATE_WALKING: u8 = 6;
pub const PEEP_STATE_SITTING: u8 = 8;
pub const PEEP_STATE_WATCHING: u8 = 18;
pub const PEEP_STATE_INSPECTING: u8 = 23;

pub const PEEP_MAX_THOUGHTS: usize = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PeepThought {
    pub thought_type: u8,
    pub item: u8,
    pub freshness: u8,
    pub fresh_timeout: u8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileXyzd {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub direction: u8,
}

/// Two bytes whose meaning depends on the peep state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeepStateSlot {
    /// Any state other than sitting or watching.
    Vehicle { current_car: u8, current_seat: u8 },
    Sitting { time_to_sitdown: u16 },
    Watching { time_to_stand: u8, standing_flags: u8 },
}

impl Default for PeepStateSlot {
    fn default() -> Self {
        PeepStateSlot::Vehicle {
            current_car: 0,
            current_seat: 0,
        }
    }
}

impl PeepStateSlot {
    /// The variant `state` selects, with zeroed contents.
    pub fn empty_for_state(state: u8) -> Self {
        match state {
            PEEP_STATE_SITTING => PeepStateSlot::Sitting { time_to_sitdown: 0 },
            PEEP_STATE_WATCHING => PeepStateSlot::Watching {
                time_to_stand: 0,
                standing_flags: 0,
            },
            _ => PeepStateSlot::default(),
        }
    }

    /// Whether this is the variant `state` selects. Encoding a mismatched
    /// pair is rejected.
    pub fn fits_state(&self, state: u8) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(&Self::empty_for_state(state))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GuestData {
    pub no_of_rides: u8,
    pub next_in_queue: u16,
    pub time_on_ride: u8,
    pub paid_to_enter: u16,
    pub paid_on_rides: u16,
    pub paid_on_food: u16,
    pub paid_on_souvenirs: u16,
    pub heading_to_ride_id: Option<RideId>,
    pub peep_is_lost_countdown: u8,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StaffData {
    pub staff_type: u8,
    pub mechanic_time_since_call: u16,
    pub mowing_timeout: u8,
    /// Per-staff-type work counters (lawns mown, rides fixed and so on).
    pub stats: [u16; 4],
    /// Shares its byte with a guest's heading-to ride, so it is never remapped.
    pub staff_id: u8,
    pub staff_orders: u8,
}

/// Guest/staff specific data, keyed by the peep type byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PeepKind {
    Guest(GuestData),
    Staff(StaffData),
}

impl Default for PeepKind {
    fn default() -> Self {
        PeepKind::Guest(GuestData::default())
    }
}

impl PeepKind {
    pub const GUEST: u8 = 0;
    pub const STAFF: u8 = 1;

    pub fn type_byte(&self) -> u8 {
        match self {
            PeepKind::Guest(_) => Self::GUEST,
            PeepKind::Staff(_) => Self::STAFF,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Peep {
    pub base: SpriteBase,
    pub kind: PeepKind,
    pub name_string_idx: u16,
    pub next_x: u16,
    pub next_y: u16,
    pub next_z: u8,
    pub next_flags: u8,
    pub outside_of_park: u8,
    pub state: u8,
    pub sub_state: u8,
    pub sprite_type: u8,
    pub tshirt_colour: u8,
    pub trousers_colour: u8,
    pub destination_x: u16,
    pub destination_y: u16,
    pub destination_tolerance: u8,
    pub var_37: u8,
    pub energy: u8,
    pub energy_target: u8,
    pub happiness: u8,
    pub happiness_target: u8,
    pub nausea: u8,
    pub nausea_target: u8,
    pub hunger: u8,
    pub thirst: u8,
    pub toilet: u8,
    pub mass: u8,
    pub time_to_consume: u8,
    pub intensity: u8,
    pub nausea_tolerance: u8,
    /// UI cache; excluded from the entity digest.
    pub window_invalidate_flags: u8,
    pub paid_on_drink: i16,
    pub ride_types_been_on: [u8; 16],
    pub item_extra_flags: u32,
    pub photo2_ride_ref: Option<RideId>,
    pub photo3_ride_ref: Option<RideId>,
    pub photo4_ride_ref: Option<RideId>,
    pub current_ride: Option<RideId>,
    pub current_ride_station: u8,
    pub current_train: u8,
    pub state_slot: PeepStateSlot,
    pub special_sprite: u8,
    pub action_sprite_type: u8,
    pub next_action_sprite_type: u8,
    pub action_sprite_image_offset: u8,
    pub action: u8,
    pub action_frame: u8,
    pub step_progress: u8,
    pub direction: u8,
    pub interaction_ride_index: Option<RideId>,
    pub time_in_queue: u16,
    pub rides_been_on: BTreeSet<RideId>,
    pub id: u32,
    pub cash_in_pocket: i32,
    pub cash_spent: i32,
    pub park_entry_time: i32,
    pub rejoin_queue_timeout: i8,
    pub previous_ride: Option<RideId>,
    pub previous_ride_time_out: u16,
    pub thoughts: [PeepThought; PEEP_MAX_THOUGHTS],
    pub path_check_optimisation: u8,
    pub photo1_ride_ref: Option<RideId>,
    pub peep_flags: PeepFlags,
    pub pathfind_goal: TileXyzd,
    pub pathfind_history: [TileXyzd; 4],
    pub no_action_frame_num: u8,
    pub litter_count: u8,
    pub disgusting_count: u8,
    pub no_of_food: u8,
    pub no_of_drinks: u8,
    pub no_of_souvenirs: u8,
    pub vandalism_seen: u8,
    pub voucher_type: u8,
    pub voucher_arguments: u8,
    pub surroundings_thought_timeout: u8,
    pub angriness: u8,
    pub time_lost: u8,
    pub days_in_queue: u8,
    pub balloon_colour: u8,
    pub umbrella_colour: u8,
    pub hat_colour: u8,
    pub favourite_ride: Option<RideId>,
    pub favourite_ride_rating: u8,
    pub item_standard_flags: u32,
}

// ============================================================
// Vehicles
// ============================================================

pub const VEHICLE_STATUS_CRASHING: u8 = 8;
pub const VEHICLE_STATUS_CRASHED: u8 = 9;

pub const VEHICLE_MAX_PEEPS: usize = 32;

/// Three words reused for the crash position once a car has crashed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VehicleMotion {
    Running {
        var_4e: u16,
        spin_speed: i16,
        var_c0: u16,
    },
    Crashed {
        crash_x: i16,
        crash_y: i16,
        crash_z: i16,
    },
}

impl Default for VehicleMotion {
    fn default() -> Self {
        VehicleMotion::Running {
            var_4e: 0,
            spin_speed: 0,
            var_c0: 0,
        }
    }
}

impl VehicleMotion {
    pub fn is_crash_status(status: u8) -> bool {
        status == VEHICLE_STATUS_CRASHING || status == VEHICLE_STATUS_CRASHED
    }

    /// Whether this is the variant `status` selects.
    pub fn fits_status(&self, status: u8) -> bool {
        matches!(self, VehicleMotion::Crashed { .. }) == Self::is_crash_status(status)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vehicle {
    pub base: SpriteBase,
    /// Stored in the sub-type byte: clear on the first car of a train.
    pub is_child: bool,
    pub vehicle_sprite_type: u8,
    pub bank_rotation: u8,
    pub remaining_distance: i32,
    pub velocity: i32,
    pub acceleration: i32,
    pub ride: Option<RideId>,
    pub vehicle_type: u8,
    pub body_colour: u8,
    pub trim_colour: u8,
    pub track_progress: u16,
    /// Track type and direction, or the boat location on boat hire.
    pub track_type_and_direction: u16,
    pub track_x: u16,
    pub track_y: u16,
    pub track_z: u16,
    pub next_vehicle_on_train: u16,
    pub prev_vehicle_on_ride: u16,
    pub next_vehicle_on_ride: u16,
    pub var_44: u16,
    pub mass: u16,
    pub update_flags: u16,
    pub swing_sprite: u8,
    pub current_station: u8,
    pub current_time: i16,
    pub motion: VehicleMotion,
    pub status: u8,
    pub sub_state: u8,
    pub peep: [u16; VEHICLE_MAX_PEEPS],
    pub peep_tshirt_colours: [u8; VEHICLE_MAX_PEEPS],
    pub num_seats: u8,
    pub num_peeps: u8,
    pub next_free_seat: u8,
    pub restraints_position: u8,
    pub sound2_flags: u16,
    pub spin_sprite: u8,
    pub sound1_id: u8,
    pub sound1_volume: u8,
    pub sound2_id: u8,
    pub sound2_volume: u8,
    pub sound_vector_factor: i8,
    pub speed: u8,
    pub powered_acceleration: u8,
    pub dodgems_collision_direction: u8,
    pub animation_frame: u8,
    pub var_c8: u16,
    pub var_ca: u16,
    pub scream_sound_id: u8,
    pub var_cd: u8,
    pub num_laps: u8,
    pub brake_speed: u8,
    pub lost_time_out: u16,
    pub vertical_drop_countdown: i8,
    pub var_d3: u8,
    pub mini_golf_current_animation: u8,
    pub mini_golf_flags: u8,
    pub ride_subtype: Option<RideEntryId>,
    pub colours_extended: u8,
    pub seat_rotation: u8,
    pub target_seat_rotation: u8,
}

impl Default for Vehicle {
    fn default() -> Self {
        Self {
            base: SpriteBase::default(),
            is_child: false,
            vehicle_sprite_type: 0,
            bank_rotation: 0,
            remaining_distance: 0,
            velocity: 0,
            acceleration: 0,
            ride: None,
            vehicle_type: 0,
            body_colour: 0,
            trim_colour: 0,
            track_progress: 0,
            track_type_and_direction: 0,
            track_x: 0,
            track_y: 0,
            track_z: 0,
            next_vehicle_on_train: SPRITE_INDEX_NULL,
            prev_vehicle_on_ride: SPRITE_INDEX_NULL,
            next_vehicle_on_ride: SPRITE_INDEX_NULL,
            var_44: 0,
            mass: 0,
            update_flags: 0,
            swing_sprite: 0,
            current_station: 0,
            current_time: 0,
            motion: VehicleMotion::default(),
            status: 0,
            sub_state: 0,
            peep: [SPRITE_INDEX_NULL; VEHICLE_MAX_PEEPS],
            peep_tshirt_colours: [0; VEHICLE_MAX_PEEPS],
            num_seats: 0,
            num_peeps: 0,
            next_free_seat: 0,
            restraints_position: 0,
            sound2_flags: 0,
            spin_sprite: 0,
            sound1_id: 0xFF,
            sound1_volume: 0,
            sound2_id: 0xFF,
            sound2_volume: 0,
            sound_vector_factor: 0,
            speed: 0,
            powered_acceleration: 0,
            dodgems_collision_direction: 0,
            animation_frame: 0,
            var_c8: 0,
            var_ca: 0,
            scream_sound_id: 0xFF,
            var_cd: 0,
            num_laps: 0,
            brake_speed: 0,
            lost_time_out: 0,
            vertical_drop_countdown: 0,
            var_d3: 0,
            mini_golf_current_animation: 0,
            mini_golf_flags: 0,
            ride_subtype: None,
            colours_extended: 0,
            seat_rotation: 0,
            target_seat_rotation: 0,
        }
    }
}

// ============================================================
// Litter and misc sprites
// ============================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Litter {
    pub base: SpriteBase,
    pub litter_type: u8,
    pub creation_tick: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SteamParticle {
    pub base: SpriteBase,
    pub time_to_move: u16,
    pub frame: u16,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoneyEffect {
    pub base: SpriteBase,
    pub move_delay: u16,
    pub num_movements: u8,
    pub vertical: u8,
    pub value: i32,
    pub offset_x: i16,
    pub wiggle: u16,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VehicleCrashParticle {
    pub base: SpriteBase,
    pub time_to_live: u16,
    pub frame: u16,
    pub colour: [u8; 2],
    pub crashed_sprite_base: u16,
    pub velocity_x: i16,
    pub velocity_y: i16,
    pub velocity_z: i16,
    pub acceleration_x: i32,
    pub acceleration_y: i32,
    pub acceleration_z: i32,
}

/// Explosion cloud, crash splash and explosion flare share this layout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnimatedEffect {
    pub base: SpriteBase,
    pub frame: u16,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FountainKind {
    #[default]
    Water,
    Snow,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JumpingFountain {
    pub base: SpriteBase,
    pub kind: FountainKind,
    pub num_ticks_alive: u8,
    pub frame: u8,
    pub fountain_flags: FountainFlags,
    pub target_x: i16,
    pub target_y: i16,
    pub iteration: u16,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Balloon {
    pub base: SpriteBase,
    pub popped: u16,
    pub time_to_move: u8,
    pub frame: u8,
    pub colour: u8,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Duck {
    pub base: SpriteBase,
    pub frame: u16,
    pub target_x: i16,
    pub target_y: i16,
    pub state: u8,
}

// ============================================================
// Entity
// ============================================================

/// An occupied sprite slot. Empty slots are `None` wherever entities are
/// stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entity {
    Vehicle(Box<Vehicle>),
    Peep(Box<Peep>),
    Litter(Litter),
    SteamParticle(SteamParticle),
    MoneyEffect(MoneyEffect),
    VehicleCrashParticle(VehicleCrashParticle),
    ExplosionCloud(AnimatedEffect),
    CrashSplash(AnimatedEffect),
    ExplosionFlare(AnimatedEffect),
    JumpingFountain(JumpingFountain),
    Balloon(Balloon),
    Duck(Duck),
}

impl Entity {
    pub fn identifier(&self) -> SpriteIdentifier {
        match self {
            Entity::Vehicle(_) => SpriteIdentifier::Vehicle,
            Entity::Peep(_) => SpriteIdentifier::Peep,
            Entity::Litter(_) => SpriteIdentifier::Litter,
            _ => SpriteIdentifier::Misc,
        }
    }

    /// Sub-type for misc sprites.
    pub fn misc_type(&self) -> Option<MiscType> {
        Some(match self {
            Entity::SteamParticle(_) => MiscType::SteamParticle,
            Entity::MoneyEffect(_) => MiscType::MoneyEffect,
            Entity::VehicleCrashParticle(_) => MiscType::CrashedVehicleParticle,
            Entity::ExplosionCloud(_) => MiscType::ExplosionCloud,
            Entity::CrashSplash(_) => MiscType::CrashSplash,
            Entity::ExplosionFlare(_) => MiscType::ExplosionFlare,
            Entity::JumpingFountain(f) => match f.kind {
                FountainKind::Water => MiscType::JumpingFountainWater,
                FountainKind::Snow => MiscType::JumpingFountainSnow,
            },
            Entity::Balloon(_) => MiscType::Balloon,
            Entity::Duck(_) => MiscType::Duck,
            Entity::Vehicle(_) | Entity::Peep(_) | Entity::Litter(_) => return None,
        })
    }

    pub fn base(&self) -> &SpriteBase {
        match self {
            Entity::Vehicle(v) => &v.base,
            Entity::Peep(p) => &p.base,
            Entity::Litter(l) => &l.base,
            Entity::SteamParticle(s) => &s.base,
            Entity::MoneyEffect(m) => &m.base,
            Entity::VehicleCrashParticle(c) => &c.base,
            Entity::ExplosionCloud(e) | Entity::CrashSplash(e) | Entity::ExplosionFlare(e) => {
                &e.base
            }
            Entity::JumpingFountain(f) => &f.base,
            Entity::Balloon(b) => &b.base,
            Entity::Duck(d) => &d.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut SpriteBase {
        match self {
            Entity::Vehicle(v) => &mut v.base,
            Entity::Peep(p) => &mut p.base,
            Entity::Litter(l) => &mut l.base,
            Entity::SteamParticle(s) => &mut s.base,
            Entity::MoneyEffect(m) => &mut m.base,
            Entity::VehicleCrashParticle(c) => &mut c.base,
            Entity::ExplosionCloud(e) | Entity::CrashSplash(e) | Entity::ExplosionFlare(e) => {
                &mut e.base
            }
            Entity::JumpingFountain(f) => &mut f.base,
            Entity::Balloon(b) => &mut b.base,
            Entity::Duck(d) => &mut d.base,
        }
    }

    pub fn as_peep(&self) -> Option<&Peep> {
        match self {
            Entity::Peep(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_vehicle(&self) -> Option<&Vehicle> {
        match self {
            Entity::Vehicle(v) => Some(v),
            _ => None,
        }
    }
}
