// config.rs: the game's config.ini model and process-wide config store

use std::path::Path;
use std::sync::OnceLock;

use parking_lot::RwLock;

use crate::config_enum::{ConfigEnum, ConfigEnumEntry, ConfigEnumLookup};
use crate::error::ConfigError;
use crate::ini_reader::IniReader;
use crate::ini_writer::IniWriter;

// ============================================================
// Enumerated values
// ============================================================

pub const MEASUREMENT_FORMAT_IMPERIAL: i32 = 0;
pub const MEASUREMENT_FORMAT_METRIC: i32 = 1;
pub const MEASUREMENT_FORMAT_SI: i32 = 2;

pub const CURRENCY_POUNDS: i32 = 0;
pub const CURRENCY_DOLLARS: i32 = 1;
pub const CURRENCY_FRANC: i32 = 2;
pub const CURRENCY_DEUTSCHMARK: i32 = 3;
pub const CURRENCY_YEN: i32 = 4;
pub const CURRENCY_PESETA: i32 = 5;
pub const CURRENCY_LIRA: i32 = 6;
pub const CURRENCY_GUILDERS: i32 = 7;
pub const CURRENCY_KRONA: i32 = 8;
pub const CURRENCY_EUROS: i32 = 9;
pub const CURRENCY_WON: i32 = 10;
pub const CURRENCY_ROUBLE: i32 = 11;
pub const CURRENCY_CZECH_KORUNA: i32 = 12;
pub const CURRENCY_HKD: i32 = 13;
pub const CURRENCY_TWD: i32 = 14;
pub const CURRENCY_YUAN: i32 = 15;
/// Has no symbolic name; written as a number.
pub const CURRENCY_CUSTOM: i32 = 16;

pub const CURRENCY_PREFIX: i32 = 0;
pub const CURRENCY_SUFFIX: i32 = 1;

pub const DATE_FORMAT_DMY: i32 = 0;
pub const DATE_FORMAT_MDY: i32 = 1;
pub const DATE_FORMAT_YMD: i32 = 2;
pub const DATE_FORMAT_YDM: i32 = 3;

pub const DRAWING_ENGINE_SOFTWARE: i32 = 0;
pub const DRAWING_ENGINE_SOFTWARE_WITH_HARDWARE_DISPLAY: i32 = 1;
pub const DRAWING_ENGINE_OPENGL: i32 = 2;

pub const TEMPERATURE_FORMAT_C: i32 = 0;
pub const TEMPERATURE_FORMAT_F: i32 = 1;

pub const AUTOSAVE_EVERY_MINUTE: i32 = 0;
pub const AUTOSAVE_EVERY_5MINUTES: i32 = 1;
pub const AUTOSAVE_NEVER: i32 = 5;

pub const SORT_NAME_ASCENDING: i32 = 0;
pub const SCENARIO_SELECT_MODE_ORIGIN: i32 = 1;
pub const WINDOW_LIMIT_MAX: i32 = 64;
pub const NETWORK_DEFAULT_PORT: i32 = 11753;

pub const LANGUAGE_UNDEFINED: i32 = 0;
pub const LANGUAGE_ENGLISH_UK: i32 = 1;

pub const ENUM_MEASUREMENT_FORMAT: ConfigEnum<i32> = ConfigEnum::new(&[
    ConfigEnumEntry::new("IMPERIAL", MEASUREMENT_FORMAT_IMPERIAL),
    ConfigEnumEntry::new("METRIC", MEASUREMENT_FORMAT_METRIC),
    ConfigEnumEntry::new("SI", MEASUREMENT_FORMAT_SI),
]);

pub const ENUM_CURRENCY: ConfigEnum<i32> = ConfigEnum::new(&[
    ConfigEnumEntry::new("GBP", CURRENCY_POUNDS),
    ConfigEnumEntry::new("USD", CURRENCY_DOLLARS),
    ConfigEnumEntry::new("FRF", CURRENCY_FRANC),
    ConfigEnumEntry::new("DEM", CURRENCY_DEUTSCHMARK),
    ConfigEnumEntry::new("JPY", CURRENCY_YEN),
    ConfigEnumEntry::new("ESP", CURRENCY_PESETA),
    ConfigEnumEntry::new("ITL", CURRENCY_LIRA),
    ConfigEnumEntry::new("NLG", CURRENCY_GUILDERS),
    ConfigEnumEntry::new("SEK", CURRENCY_KRONA),
    ConfigEnumEntry::new("EUR", CURRENCY_EUROS),
    ConfigEnumEntry::new("KRW", CURRENCY_WON),
    ConfigEnumEntry::new("RUB", CURRENCY_ROUBLE),
    ConfigEnumEntry::new("CZK", CURRENCY_CZECH_KORUNA),
    ConfigEnumEntry::new("HKD", CURRENCY_HKD),
    ConfigEnumEntry::new("TWD", CURRENCY_TWD),
    ConfigEnumEntry::new("CNY", CURRENCY_YUAN),
]);

pub const ENUM_CURRENCY_SYMBOL_AFFIX: ConfigEnum<i32> = ConfigEnum::new(&[
    ConfigEnumEntry::new("PREFIX", CURRENCY_PREFIX),
    ConfigEnumEntry::new("SUFFIX", CURRENCY_SUFFIX),
]);

pub const ENUM_DATE_FORMAT: ConfigEnum<i32> = ConfigEnum::new(&[
    ConfigEnumEntry::new("DD/MM/YY", DATE_FORMAT_DMY),
    ConfigEnumEntry::new("MM/DD/YY", DATE_FORMAT_MDY),
    ConfigEnumEntry::new("YY/MM/DD", DATE_FORMAT_YMD),
    ConfigEnumEntry::new("YY/DD/MM", DATE_FORMAT_YDM),
]);

pub const ENUM_DRAWING_ENGINE: ConfigEnum<i32> = ConfigEnum::new(&[
    ConfigEnumEntry::new("SOFTWARE", DRAWING_ENGINE_SOFTWARE),
    ConfigEnumEntry::new("SOFTWARE_HWD", DRAWING_ENGINE_SOFTWARE_WITH_HARDWARE_DISPLAY),
    ConfigEnumEntry::new("OPENGL", DRAWING_ENGINE_OPENGL),
]);

pub const ENUM_TEMPERATURE: ConfigEnum<i32> = ConfigEnum::new(&[
    ConfigEnumEntry::new("CELSIUS", TEMPERATURE_FORMAT_C),
    ConfigEnumEntry::new("FAHRENHEIT", TEMPERATURE_FORMAT_F),
]);

/// Locale identifiers indexed by language id.
pub const LANGUAGE_LOCALES: &[&str] = &[
    "", "en-GB", "en-US", "de-DE", "nl-NL", "fr-FR", "hu-HU", "pl-PL", "es-ES", "sv-SE",
    "it-IT", "pt-BR", "zh-TW", "zh-CN", "fi-FI", "ko-KR", "ru-RU", "cs-CZ", "ja-JP", "nb-NO",
];

/// Languages are named by their locale rather than by a fixed table.
pub struct LanguageConfigEnum;

impl ConfigEnumLookup<i32> for LanguageConfigEnum {
    fn name_of(&self, value: i32) -> Option<&str> {
        usize::try_from(value)
            .ok()
            .and_then(|i| LANGUAGE_LOCALES.get(i))
            .copied()
    }

    fn value_of(&self, key: &str, default: i32) -> i32 {
        LANGUAGE_LOCALES
            .iter()
            .position(|locale| locale.eq_ignore_ascii_case(key))
            .map_or(default, |i| i as i32)
    }
}

// ============================================================
// Sections
// ============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct GeneralConfig {
    pub always_show_gridlines: bool,
    pub autosave_frequency: i32,
    pub confirmation_prompt: bool,
    pub construction_marker_colour: bool,
    pub currency_format: i32,
    pub custom_currency_rate: i32,
    pub custom_currency_affix: i32,
    pub custom_currency_symbol: String,
    pub edge_scrolling: bool,
    pub fullscreen_mode: i32,
    pub fullscreen_height: i32,
    pub fullscreen_width: i32,
    pub rct1_path: Option<String>,
    pub rct2_path: Option<String>,
    pub landscape_smoothing: bool,
    pub language: i32,
    pub measurement_format: i32,
    pub play_intro: bool,
    pub save_plugin_data: bool,
    pub debugging_tools: bool,
    pub show_height_as_units: bool,
    pub temperature_format: i32,
    pub window_height: i32,
    pub window_snap_proximity: i32,
    pub window_width: i32,
    pub drawing_engine: i32,
    pub uncap_fps: bool,
    pub test_unfinished_tracks: bool,
    pub no_test_crashes: bool,
    pub date_format: i32,
    pub auto_staff_placement: bool,
    pub handymen_mow_default: bool,
    pub default_inspection_interval: i32,
    pub last_run_version: Option<String>,
    pub invert_viewport_drag: bool,
    pub load_save_sort: i32,
    pub minimize_fullscreen_focus_loss: bool,
    pub day_night_cycle: bool,
    pub enable_light_fx: bool,
    pub upper_case_banners: bool,
    pub disable_lightning_effect: bool,
    pub allow_loading_with_incorrect_checksum: bool,
    pub steam_overlay_pause: bool,
    pub window_scale: f32,
    pub scale_quality: i32,
    pub use_nn_at_integer_scales: bool,
    pub show_fps: bool,
    pub trap_cursor: bool,
    pub auto_open_shops: bool,
    pub scenario_select_mode: i32,
    pub scenario_unlocking_enabled: bool,
    pub scenario_hide_mega_park: bool,
    pub last_save_game_directory: Option<String>,
    pub last_save_landscape_directory: Option<String>,
    pub last_save_scenario_directory: Option<String>,
    pub last_save_track_directory: Option<String>,
    pub window_limit: i32,
    pub zoom_to_cursor: bool,
    pub render_weather_effects: bool,
    pub render_weather_gloom: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            always_show_gridlines: false,
            autosave_frequency: AUTOSAVE_EVERY_5MINUTES,
            confirmation_prompt: false,
            construction_marker_colour: false,
            currency_format: CURRENCY_POUNDS,
            custom_currency_rate: 10,
            custom_currency_affix: CURRENCY_SUFFIX,
            custom_currency_symbol: String::from("Ctm"),
            edge_scrolling: true,
            fullscreen_mode: 0,
            fullscreen_height: -1,
            fullscreen_width: -1,
            rct1_path: None,
            rct2_path: None,
            landscape_smoothing: true,
            language: LANGUAGE_ENGLISH_UK,
            measurement_format: MEASUREMENT_FORMAT_METRIC,
            play_intro: false,
            save_plugin_data: true,
            debugging_tools: false,
            show_height_as_units: false,
            temperature_format: TEMPERATURE_FORMAT_C,
            window_height: -1,
            window_snap_proximity: 5,
            window_width: -1,
            drawing_engine: DRAWING_ENGINE_SOFTWARE,
            uncap_fps: false,
            test_unfinished_tracks: false,
            no_test_crashes: false,
            date_format: DATE_FORMAT_DMY,
            auto_staff_placement: true,
            handymen_mow_default: false,
            default_inspection_interval: 2,
            last_run_version: None,
            invert_viewport_drag: false,
            load_save_sort: SORT_NAME_ASCENDING,
            minimize_fullscreen_focus_loss: true,
            day_night_cycle: false,
            enable_light_fx: false,
            upper_case_banners: false,
            disable_lightning_effect: false,
            allow_loading_with_incorrect_checksum: true,
            steam_overlay_pause: true,
            window_scale: 1.0,
            scale_quality: 1,
            use_nn_at_integer_scales: true,
            show_fps: false,
            trap_cursor: false,
            auto_open_shops: false,
            scenario_select_mode: SCENARIO_SELECT_MODE_ORIGIN,
            scenario_unlocking_enabled: true,
            scenario_hide_mega_park: true,
            last_save_game_directory: None,
            last_save_landscape_directory: None,
            last_save_scenario_directory: None,
            last_save_track_directory: None,
            window_limit: WINDOW_LIMIT_MAX,
            zoom_to_cursor: true,
            render_weather_effects: true,
            render_weather_gloom: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceConfig {
    pub toolbar_show_finances: bool,
    pub toolbar_show_research: bool,
    pub toolbar_show_cheats: bool,
    pub toolbar_show_news: bool,
    pub select_by_track_type: bool,
    pub console_small_font: bool,
    pub current_theme_preset: String,
    pub current_title_sequence_preset: String,
    pub object_selection_filter_flags: i32,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            toolbar_show_finances: true,
            toolbar_show_research: true,
            toolbar_show_cheats: false,
            toolbar_show_news: false,
            select_by_track_type: false,
            console_small_font: false,
            current_theme_preset: String::from("*RCT2"),
            current_title_sequence_preset: String::from("*OPENRCT2"),
            object_selection_filter_flags: 0x7EF,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SoundConfig {
    pub master_volume: i32,
    pub title_music: i32,
    pub sound_enabled: bool,
    pub sound_volume: i32,
    pub ride_music_enabled: bool,
    pub ride_music_volume: i32,
    pub audio_focus: bool,
    pub device: Option<String>,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            master_volume: 100,
            title_music: 2,
            sound_enabled: true,
            sound_volume: 100,
            ride_music_enabled: true,
            ride_music_volume: 100,
            audio_focus: false,
            device: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    pub player_name: String,
    pub default_port: i32,
    pub default_password: Option<String>,
    pub stay_connected: bool,
    pub advertise: bool,
    pub maxplayers: i32,
    pub server_name: String,
    pub server_description: Option<String>,
    pub server_greeting: Option<String>,
    pub master_server_url: Option<String>,
    pub provider_name: Option<String>,
    pub provider_email: Option<String>,
    pub provider_website: Option<String>,
    pub known_keys_only: bool,
    pub log_chat: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            player_name: String::from("Player"),
            default_port: NETWORK_DEFAULT_PORT,
            default_password: None,
            stay_connected: true,
            advertise: true,
            maxplayers: 16,
            server_name: String::from("Server"),
            server_description: None,
            server_greeting: None,
            master_server_url: None,
            provider_name: None,
            provider_email: None,
            provider_website: None,
            known_keys_only: false,
            log_chat: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationConfig {
    pub park_award: bool,
    pub park_marketing_campaign_finished: bool,
    pub park_warnings: bool,
    pub park_rating_warnings: bool,
    pub ride_broken_down: bool,
    pub ride_crashed: bool,
    pub ride_warnings: bool,
    pub ride_researched: bool,
    pub guest_warnings: bool,
    pub guest_lost: bool,
    pub guest_left_park: bool,
    pub guest_queuing_for_ride: bool,
    pub guest_on_ride: bool,
    pub guest_left_ride: bool,
    pub guest_bought_item: bool,
    pub guest_used_facility: bool,
    pub guest_died: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            park_award: true,
            park_marketing_campaign_finished: true,
            park_warnings: true,
            park_rating_warnings: true,
            ride_broken_down: true,
            ride_crashed: true,
            ride_warnings: true,
            ride_researched: true,
            guest_warnings: true,
            guest_lost: false,
            guest_left_park: true,
            guest_queuing_for_ride: true,
            guest_on_ride: true,
            guest_left_ride: true,
            guest_bought_item: true,
            guest_used_facility: true,
            guest_died: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TwitchConfig {
    pub channel: Option<String>,
    pub enable_follower_peep_names: bool,
    pub enable_follower_peep_tracking: bool,
    pub enable_chat_peep_names: bool,
    pub enable_chat_peep_tracking: bool,
    pub enable_news: bool,
}

impl Default for TwitchConfig {
    fn default() -> Self {
        Self {
            channel: None,
            enable_follower_peep_names: true,
            enable_follower_peep_tracking: false,
            enable_chat_peep_names: true,
            enable_chat_peep_tracking: true,
            enable_news: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontConfig {
    pub file_name: Option<String>,
    pub font_name: Option<String>,
    pub x_offset: i32,
    pub y_offset: i32,
    pub size_tiny: i32,
    pub size_small: i32,
    pub size_medium: i32,
    pub size_big: i32,
    pub height_tiny: i32,
    pub height_small: i32,
    pub height_medium: i32,
    pub height_big: i32,
}

/// The whole config.ini.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub general: GeneralConfig,
    pub interface: InterfaceConfig,
    pub sound: SoundConfig,
    pub network: NetworkConfig,
    pub notifications: NotificationConfig,
    pub twitch: TwitchConfig,
    pub font: FontConfig,
}

/// Empty values read back as absent.
fn read_optional_string(reader: &IniReader, name: &str) -> Option<String> {
    reader
        .get_optional_string(name)
        .filter(|value| !value.is_empty())
}

/// Absent optional strings are written as empty strings.
fn write_optional_string(writer: &mut IniWriter, name: &str, value: &Option<String>) {
    writer.write_string(name, value.as_deref().unwrap_or(""));
}

// ============================================================
// Per-section read/write
// ============================================================

impl Config {
    /// Apply every section present in `reader`. Missing sections keep their
    /// current values; missing keys inside a present section take defaults.
    pub fn read(&mut self, reader: &mut IniReader) {
        self.read_general(reader);
        self.read_interface(reader);
        self.read_sound(reader);
        self.read_network(reader);
        self.read_notifications(reader);
        self.read_twitch(reader);
        self.read_font(reader);
    }

    pub fn write(&self, writer: &mut IniWriter) {
        self.write_general(writer);
        self.write_interface(writer);
        self.write_sound(writer);
        self.write_network(writer);
        self.write_notifications(writer);
        self.write_twitch(writer);
        self.write_font(writer);
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut reader = IniReader::open(path)?;
        let mut config = Self::default();
        config.read(&mut reader);
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let mut writer = IniWriter::new();
        self.write(&mut writer);
        writer.save(path)
    }

    fn read_general(&mut self, reader: &mut IniReader) {
        if !reader.read_section("general") {
            return;
        }
        let d = GeneralConfig::default();
        let r = &*reader;
        self.general = GeneralConfig {
            always_show_gridlines: r.get_boolean("always_show_gridlines", d.always_show_gridlines),
            autosave_frequency: r.get_int32("autosave", d.autosave_frequency),
            confirmation_prompt: r.get_boolean("confirmation_prompt", d.confirmation_prompt),
            construction_marker_colour: r
                .get_boolean("construction_marker_colour", d.construction_marker_colour),
            currency_format: r.get_enum("currency_format", d.currency_format, &ENUM_CURRENCY),
            custom_currency_rate: r.get_int32("custom_currency_rate", d.custom_currency_rate),
            custom_currency_affix: r.get_enum(
                "custom_currency_affix",
                d.custom_currency_affix,
                &ENUM_CURRENCY_SYMBOL_AFFIX,
            ),
            custom_currency_symbol: r
                .get_string("custom_currency_symbol", &d.custom_currency_symbol),
            edge_scrolling: r.get_boolean("edge_scrolling", d.edge_scrolling),
            fullscreen_mode: r.get_int32("fullscreen_mode", d.fullscreen_mode),
            fullscreen_height: r.get_int32("fullscreen_height", d.fullscreen_height),
            fullscreen_width: r.get_int32("fullscreen_width", d.fullscreen_width),
            rct1_path: read_optional_string(r, "rct1_path"),
            rct2_path: read_optional_string(r, "game_path"),
            landscape_smoothing: r.get_boolean("landscape_smoothing", d.landscape_smoothing),
            language: r.get_enum("language", d.language, &LanguageConfigEnum),
            measurement_format: r.get_enum(
                "measurement_format",
                d.measurement_format,
                &ENUM_MEASUREMENT_FORMAT,
            ),
            play_intro: r.get_boolean("play_intro", d.play_intro),
            save_plugin_data: r.get_boolean("save_plugin_data", d.save_plugin_data),
            debugging_tools: r.get_boolean("debugging_tools", d.debugging_tools),
            show_height_as_units: r.get_boolean("show_height_as_units", d.show_height_as_units),
            temperature_format: r.get_enum(
                "temperature_format",
                d.temperature_format,
                &ENUM_TEMPERATURE,
            ),
            window_height: r.get_int32("window_height", d.window_height),
            window_snap_proximity: r.get_int32("window_snap_proximity", d.window_snap_proximity),
            window_width: r.get_int32("window_width", d.window_width),
            drawing_engine: r.get_enum("drawing_engine", d.drawing_engine, &ENUM_DRAWING_ENGINE),
            uncap_fps: r.get_boolean("uncap_fps", d.uncap_fps),
            test_unfinished_tracks: r
                .get_boolean("test_unfinished_tracks", d.test_unfinished_tracks),
            no_test_crashes: r.get_boolean("no_test_crashes", d.no_test_crashes),
            date_format: r.get_enum("date_format", d.date_format, &ENUM_DATE_FORMAT),
            auto_staff_placement: r.get_boolean("auto_staff", d.auto_staff_placement),
            handymen_mow_default: r.get_boolean("handymen_mow_default", d.handymen_mow_default),
            default_inspection_interval: r
                .get_int32("default_inspection_interval", d.default_inspection_interval),
            last_run_version: read_optional_string(r, "last_run_version"),
            invert_viewport_drag: r.get_boolean("invert_viewport_drag", d.invert_viewport_drag),
            load_save_sort: r.get_int32("load_save_sort", d.load_save_sort),
            minimize_fullscreen_focus_loss: r
                .get_boolean("minimize_fullscreen_focus_loss", d.minimize_fullscreen_focus_loss),
            day_night_cycle: r.get_boolean("day_night_cycle", d.day_night_cycle),
            enable_light_fx: r.get_boolean("enable_light_fx", d.enable_light_fx),
            upper_case_banners: r.get_boolean("upper_case_banners", d.upper_case_banners),
            disable_lightning_effect: r
                .get_boolean("disable_lightning_effect", d.disable_lightning_effect),
            allow_loading_with_incorrect_checksum: r.get_boolean(
                "allow_loading_with_incorrect_checksum",
                d.allow_loading_with_incorrect_checksum,
            ),
            steam_overlay_pause: r.get_boolean("steam_overlay_pause", d.steam_overlay_pause),
            window_scale: r.get_float("window_scale", d.window_scale),
            scale_quality: r.get_int32("scale_quality", d.scale_quality),
            use_nn_at_integer_scales: r
                .get_boolean("use_nn_at_integer_scales", d.use_nn_at_integer_scales),
            show_fps: r.get_boolean("show_fps", d.show_fps),
            trap_cursor: r.get_boolean("trap_cursor", d.trap_cursor),
            auto_open_shops: r.get_boolean("auto_open_shops", d.auto_open_shops),
            scenario_select_mode: r.get_int32("scenario_select_mode", d.scenario_select_mode),
            scenario_unlocking_enabled: r
                .get_boolean("scenario_unlocking_enabled", d.scenario_unlocking_enabled),
            scenario_hide_mega_park: r
                .get_boolean("scenario_hide_mega_park", d.scenario_hide_mega_park),
            last_save_game_directory: read_optional_string(r, "last_game_directory"),
            last_save_landscape_directory: read_optional_string(r, "last_landscape_directory"),
            last_save_scenario_directory: read_optional_string(r, "last_scenario_directory"),
            last_save_track_directory: read_optional_string(r, "last_track_directory"),
            window_limit: r.get_int32("window_limit", d.window_limit),
            zoom_to_cursor: r.get_boolean("zoom_to_cursor", d.zoom_to_cursor),
            render_weather_effects: r
                .get_boolean("render_weather_effects", d.render_weather_effects),
            render_weather_gloom: r.get_boolean("render_weather_gloom", d.render_weather_gloom),
        };
    }

    fn write_general(&self, w: &mut IniWriter) {
        let m = &self.general;
        w.write_section("general");
        w.write_boolean("always_show_gridlines", m.always_show_gridlines);
        w.write_int32("autosave", m.autosave_frequency);
        w.write_boolean("confirmation_prompt", m.confirmation_prompt);
        w.write_boolean("construction_marker_colour", m.construction_marker_colour);
        w.write_enum("currency_format", m.currency_format, &ENUM_CURRENCY);
        w.write_int32("custom_currency_rate", m.custom_currency_rate);
        w.write_enum("custom_currency_affix", m.custom_currency_affix, &ENUM_CURRENCY_SYMBOL_AFFIX);
        w.write_string("custom_currency_symbol", &m.custom_currency_symbol);
        w.write_boolean("edge_scrolling", m.edge_scrolling);
        w.write_int32("fullscreen_mode", m.fullscreen_mode);
        w.write_int32("fullscreen_height", m.fullscreen_height);
        w.write_int32("fullscreen_width", m.fullscreen_width);
        write_optional_string(w, "rct1_path", &m.rct1_path);
        write_optional_string(w, "game_path", &m.rct2_path);
        w.write_boolean("landscape_smoothing", m.landscape_smoothing);
        w.write_enum("language", m.language, &LanguageConfigEnum);
        w.write_enum("measurement_format", m.measurement_format, &ENUM_MEASUREMENT_FORMAT);
        w.write_boolean("play_intro", m.play_intro);
        w.write_boolean("save_plugin_data", m.save_plugin_data);
        w.write_boolean("debugging_tools", m.debugging_tools);
        w.write_boolean("show_height_as_units", m.show_height_as_units);
        w.write_enum("temperature_format", m.temperature_format, &ENUM_TEMPERATURE);
        w.write_int32("window_height", m.window_height);
        w.write_int32("window_snap_proximity", m.window_snap_proximity);
        w.write_int32("window_width", m.window_width);
        w.write_enum("drawing_engine", m.drawing_engine, &ENUM_DRAWING_ENGINE);
        w.write_boolean("uncap_fps", m.uncap_fps);
        w.write_boolean("test_unfinished_tracks", m.test_unfinished_tracks);
        w.write_boolean("no_test_crashes", m.no_test_crashes);
        w.write_enum("date_format", m.date_format, &ENUM_DATE_FORMAT);
        w.write_boolean("auto_staff", m.auto_staff_placement);
        w.write_boolean("handymen_mow_default", m.handymen_mow_default);
        w.write_int32("default_inspection_interval", m.default_inspection_interval);
        write_optional_string(w, "last_run_version", &m.last_run_version);
        w.write_boolean("invert_viewport_drag", m.invert_viewport_drag);
        w.write_int32("load_save_sort", m.load_save_sort);
        w.write_boolean("minimize_fullscreen_focus_loss", m.minimize_fullscreen_focus_loss);
        w.write_boolean("day_night_cycle", m.day_night_cycle);
        w.write_boolean("enable_light_fx", m.enable_light_fx);
        w.write_boolean("upper_case_banners", m.upper_case_banners);
        w.write_boolean("disable_lightning_effect", m.disable_lightning_effect);
        w.write_boolean(
            "allow_loading_with_incorrect_checksum",
            m.allow_loading_with_incorrect_checksum,
        );
        w.write_boolean("steam_overlay_pause", m.steam_overlay_pause);
        w.write_float("window_scale", m.window_scale);
        w.write_int32("scale_quality", m.scale_quality);
        w.write_boolean("use_nn_at_integer_scales", m.use_nn_at_integer_scales);
        w.write_boolean("show_fps", m.show_fps);
        w.write_boolean("trap_cursor", m.trap_cursor);
        w.write_boolean("auto_open_shops", m.auto_open_shops);
        w.write_int32("scenario_select_mode", m.scenario_select_mode);
        w.write_boolean("scenario_unlocking_enabled", m.scenario_unlocking_enabled);
        w.write_boolean("scenario_hide_mega_park", m.scenario_hide_mega_park);
        write_optional_string(w, "last_game_directory", &m.last_save_game_directory);
        write_optional_string(w, "last_landscape_directory", &m.last_save_landscape_directory);
        write_optional_string(w, "last_scenario_directory", &m.last_save_scenario_directory);
        write_optional_string(w, "last_track_directory", &m.last_save_track_directory);
        w.write_int32("window_limit", m.window_limit);
        w.write_boolean("zoom_to_cursor", m.zoom_to_cursor);
        w.write_boolean("render_weather_effects", m.render_weather_effects);
        w.write_boolean("render_weather_gloom", m.render_weather_gloom);
    }

    fn read_interface(&mut self, reader: &mut IniReader) {
        if !reader.read_section("interface") {
            return;
        }
        let d = InterfaceConfig::default();
        let r = &*reader;
        self.interface = InterfaceConfig {
            toolbar_show_finances: r.get_boolean("toolbar_show_finances", d.toolbar_show_finances),
            toolbar_show_research: r.get_boolean("toolbar_show_research", d.toolbar_show_research),
            toolbar_show_cheats: r.get_boolean("toolbar_show_cheats", d.toolbar_show_cheats),
            toolbar_show_news: r.get_boolean("toolbar_show_news", d.toolbar_show_news),
            select_by_track_type: r.get_boolean("select_by_track_type", d.select_by_track_type),
            console_small_font: r.get_boolean("console_small_font", d.console_small_font),
            current_theme_preset: r.get_string("current_theme", &d.current_theme_preset),
            current_title_sequence_preset: r
                .get_string("current_title_sequence", &d.current_title_sequence_preset),
            object_selection_filter_flags: r
                .get_int32("object_selection_filter_flags", d.object_selection_filter_flags),
        };
    }

    fn write_interface(&self, w: &mut IniWriter) {
        let m = &self.interface;
        w.write_section("interface");
        w.write_boolean("toolbar_show_finances", m.toolbar_show_finances);
        w.write_boolean("toolbar_show_research", m.toolbar_show_research);
        w.write_boolean("toolbar_show_cheats", m.toolbar_show_cheats);
        w.write_boolean("toolbar_show_news", m.toolbar_show_news);
        w.write_boolean("select_by_track_type", m.select_by_track_type);
        w.write_boolean("console_small_font", m.console_small_font);
        w.write_string("current_theme", &m.current_theme_preset);
        w.write_string("current_title_sequence", &m.current_title_sequence_preset);
        w.write_int32("object_selection_filter_flags", m.object_selection_filter_flags);
    }

    fn read_sound(&mut self, reader: &mut IniReader) {
        if !reader.read_section("sound") {
            return;
        }
        let d = SoundConfig::default();
        let r = &*reader;
        self.sound = SoundConfig {
            master_volume: r.get_int32("master_volume", d.master_volume),
            title_music: r.get_int32("title_music", d.title_music),
            sound_enabled: r.get_boolean("sound", d.sound_enabled),
            sound_volume: r.get_int32("sound_volume", d.sound_volume),
            ride_music_enabled: r.get_boolean("ride_music", d.ride_music_enabled),
            ride_music_volume: r.get_int32("ride_music_volume", d.ride_music_volume),
            audio_focus: r.get_boolean("audio_focus", d.audio_focus),
            device: read_optional_string(r, "audio_device"),
        };
    }

    fn write_sound(&self, w: &mut IniWriter) {
        let m = &self.sound;
        w.write_section("sound");
        w.write_int32("master_volume", m.master_volume);
        w.write_int32("title_music", m.title_music);
        w.write_boolean("sound", m.sound_enabled);
        w.write_int32("sound_volume", m.sound_volume);
        w.write_boolean("ride_music", m.ride_music_enabled);
        w.write_int32("ride_music_volume", m.ride_music_volume);
        w.write_boolean("audio_focus", m.audio_focus);
        write_optional_string(w, "audio_device", &m.device);
    }

    fn read_network(&mut self, reader: &mut IniReader) {
        if !reader.read_section("network") {
            return;
        }
        let d = NetworkConfig::default();
        let r = &*reader;
        self.network = NetworkConfig {
            player_name: r.get_string("player_name", &d.player_name),
            default_port: r.get_int32("default_port", d.default_port),
            default_password: read_optional_string(r, "default_password"),
            stay_connected: r.get_boolean("stay_connected", d.stay_connected),
            advertise: r.get_boolean("advertise", d.advertise),
            maxplayers: r.get_int32("maxplayers", d.maxplayers),
            server_name: r.get_string("server_name", &d.server_name),
            server_description: read_optional_string(r, "server_description"),
            server_greeting: read_optional_string(r, "server_greeting"),
            master_server_url: read_optional_string(r, "master_server_url"),
            provider_name: read_optional_string(r, "provider_name"),
            provider_email: read_optional_string(r, "provider_email"),
            provider_website: read_optional_string(r, "provider_website"),
            known_keys_only: r.get_boolean("known_keys_only", d.known_keys_only),
            log_chat: r.get_boolean("log_chat", d.log_chat),
        };
    }

    fn write_network(&self, w: &mut IniWriter) {
        let m = &self.network;
        w.write_section("network");
        w.write_string("player_name", &m.player_name);
        w.write_int32("default_port", m.default_port);
        write_optional_string(w, "default_password", &m.default_password);
        w.write_boolean("stay_connected", m.stay_connected);
        w.write_boolean("advertise", m.advertise);
        w.write_int32("maxplayers", m.maxplayers);
        w.write_string("server_name", &m.server_name);
        write_optional_string(w, "server_description", &m.server_description);
        write_optional_string(w, "server_greeting", &m.server_greeting);
        write_optional_string(w, "master_server_url", &m.master_server_url);
        write_optional_string(w, "provider_name", &m.provider_name);
        write_optional_string(w, "provider_email", &m.provider_email);
        write_optional_string(w, "provider_website", &m.provider_website);
        w.write_boolean("known_keys_only", m.known_keys_only);
        w.write_boolean("log_chat", m.log_chat);
    }

    fn read_notifications(&mut self, reader: &mut IniReader) {
        if !reader.read_section("notifications") {
            return;
        }
        let d = NotificationConfig::default();
        let r = &*reader;
        self.notifications = NotificationConfig {
            park_award: r.get_boolean("park_award", d.park_award),
            park_marketing_campaign_finished: r.get_boolean(
                "park_marketing_campaign_finished",
                d.park_marketing_campaign_finished,
            ),
            park_warnings: r.get_boolean("park_warnings", d.park_warnings),
            park_rating_warnings: r.get_boolean("park_rating_warnings", d.park_rating_warnings),
            ride_broken_down: r.get_boolean("ride_broken_down", d.ride_broken_down),
            ride_crashed: r.get_boolean("ride_crashed", d.ride_crashed),
            ride_warnings: r.get_boolean("ride_warnings", d.ride_warnings),
            ride_researched: r.get_boolean("ride_researched", d.ride_researched),
            guest_warnings: r.get_boolean("guest_warnings", d.guest_warnings),
            guest_lost: r.get_boolean("guest_lost", d.guest_lost),
            guest_left_park: r.get_boolean("guest_left_park", d.guest_left_park),
            guest_queuing_for_ride: r
                .get_boolean("guest_queuing_for_ride", d.guest_queuing_for_ride),
            guest_on_ride: r.get_boolean("guest_on_ride", d.guest_on_ride),
            guest_left_ride: r.get_boolean("guest_left_ride", d.guest_left_ride),
            guest_bought_item: r.get_boolean("guest_bought_item", d.guest_bought_item),
            guest_used_facility: r.get_boolean("guest_used_facility", d.guest_used_facility),
            guest_died: r.get_boolean("guest_died", d.guest_died),
        };
    }

    fn write_notifications(&self, w: &mut IniWriter) {
        let m = &self.notifications;
        w.write_section("notifications");
        w.write_boolean("park_award", m.park_award);
        w.write_boolean("park_marketing_campaign_finished", m.park_marketing_campaign_finished);
        w.write_boolean("park_warnings", m.park_warnings);
        w.write_boolean("park_rating_warnings", m.park_rating_warnings);
        w.write_boolean("ride_broken_down", m.ride_broken_down);
        w.write_boolean("ride_crashed", m.ride_crashed);
        w.write_boolean("ride_warnings", m.ride_warnings);
        w.write_boolean("ride_researched", m.ride_researched);
        w.write_boolean("guest_warnings", m.guest_warnings);
        w.write_boolean("guest_lost", m.guest_lost);
        w.write_boolean("guest_left_park", m.guest_left_park);
        w.write_boolean("guest_queuing_for_ride", m.guest_queuing_for_ride);
        w.write_boolean("guest_on_ride", m.guest_on_ride);
        w.write_boolean("guest_left_ride", m.guest_left_ride);
        w.write_boolean("guest_bought_item", m.guest_bought_item);
        w.write_boolean("guest_used_facility", m.guest_used_facility);
        w.write_boolean("guest_died", m.guest_died);
    }

    fn read_twitch(&mut self, reader: &mut IniReader) {
        if !reader.read_section("twitch") {
            return;
        }
        let d = TwitchConfig::default();
        let r = &*reader;
        self.twitch = TwitchConfig {
            channel: read_optional_string(r, "channel"),
            enable_follower_peep_names: r
                .get_boolean("follower_peep_names", d.enable_follower_peep_names),
            enable_follower_peep_tracking: r
                .get_boolean("follower_peep_tracking", d.enable_follower_peep_tracking),
            enable_chat_peep_names: r.get_boolean("chat_peep_names", d.enable_chat_peep_names),
            enable_chat_peep_tracking: r
                .get_boolean("chat_peep_tracking", d.enable_chat_peep_tracking),
            enable_news: r.get_boolean("news", d.enable_news),
        };
    }

    fn write_twitch(&self, w: &mut IniWriter) {
        let m = &self.twitch;
        w.write_section("twitch");
        write_optional_string(w, "channel", &m.channel);
        w.write_boolean("follower_peep_names", m.enable_follower_peep_names);
        w.write_boolean("follower_peep_tracking", m.enable_follower_peep_tracking);
        w.write_boolean("chat_peep_names", m.enable_chat_peep_names);
        w.write_boolean("chat_peep_tracking", m.enable_chat_peep_tracking);
        w.write_boolean("news", m.enable_news);
    }

    fn read_font(&mut self, reader: &mut IniReader) {
        if !reader.read_section("font") {
            return;
        }
        let d = FontConfig::default();
        let r = &*reader;
        self.font = FontConfig {
            file_name: read_optional_string(r, "file_name"),
            font_name: read_optional_string(r, "font_name"),
            x_offset: r.get_int32("x_offset", d.x_offset),
            y_offset: r.get_int32("y_offset", d.y_offset),
            size_tiny: r.get_int32("size_tiny", d.size_tiny),
            size_small: r.get_int32("size_small", d.size_small),
            size_medium: r.get_int32("size_medium", d.size_medium),
            size_big: r.get_int32("size_big", d.size_big),
            height_tiny: r.get_int32("height_tiny", d.height_tiny),
            height_small: r.get_int32("height_small", d.height_small),
            height_medium: r.get_int32("height_medium", d.height_medium),
            height_big: r.get_int32("height_big", d.height_big),
        };
    }

    fn write_font(&self, w: &mut IniWriter) {
        let m = &self.font;
        w.write_section("font");
        write_optional_string(w, "file_name", &m.file_name);
        write_optional_string(w, "font_name", &m.font_name);
        w.write_int32("x_offset", m.x_offset);
        w.write_int32("y_offset", m.y_offset);
        w.write_int32("size_tiny", m.size_tiny);
        w.write_int32("size_small", m.size_small);
        w.write_int32("size_medium", m.size_medium);
        w.write_int32("size_big", m.size_big);
        w.write_int32("height_tiny", m.height_tiny);
        w.write_int32("height_small", m.height_small);
        w.write_int32("height_medium", m.height_medium);
        w.write_int32("height_big", m.height_big);
    }
}

// ============================================================
// Global store and free-function wrappers
// ============================================================

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

fn global_config() -> &'static RwLock<Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::default()))
}

/// Load `path` into the global config. On failure the current values stay.
pub fn config_open(path: impl AsRef<Path>) -> bool {
    match Config::open(path) {
        Ok(config) => {
            *global_config().write() = config;
            true
        }
        Err(e) => {
            log::debug!("{}", e);
            false
        }
    }
}

pub fn config_save(path: impl AsRef<Path>) -> bool {
    match global_config().read().save(path) {
        Ok(()) => true,
        Err(e) => {
            log::error!("Error saving config: {}", e);
            false
        }
    }
}

/// Reset the global config to defaults.
pub fn config_set_defaults() {
    *global_config().write() = Config::default();
}

/// Read access to the global config.
pub fn with_config<F, R>(f: F) -> R
where
    F: FnOnce(&Config) -> R,
{
    f(&*global_config().read())
}

/// Write access to the global config.
pub fn with_config_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut Config) -> R,
{
    f(&mut *global_config().write())
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(config: &Config) -> Vec<u8> {
        let mut w = IniWriter::new();
        config.write(&mut w);
        w.into_bytes()
    }

    fn read_config(bytes: Vec<u8>) -> Config {
        let mut r = IniReader::new(bytes);
        let mut config = Config::default();
        config.read(&mut r);
        config
    }

    #[test]
    fn test_defaults_roundtrip() {
        let config = Config::default();
        assert_eq!(read_config(write_config(&config)), config);
    }

    #[test]
    fn test_modified_roundtrip() {
        let mut config = Config::default();
        config.general.currency_format = CURRENCY_EUROS;
        config.general.custom_currency_symbol = String::from("§ ");
        config.general.rct2_path = Some(String::from(r"C:\Program Files\RCT2"));
        config.general.language = 3;
        config.general.window_scale = 1.75;
        config.general.date_format = DATE_FORMAT_YDM;
        config.general.allow_loading_with_incorrect_checksum = false;
        config.sound.device = Some(String::from("Speakers (USB)"));
        config.network.player_name = String::from("Guest #42");
        config.twitch.channel = Some(String::from("park_live"));
        config.font.size_big = 14;
        assert_eq!(read_config(write_config(&config)), config);
    }

    #[test]
    fn test_enum_keys_written_symbolically() {
        let mut config = Config::default();
        config.general.measurement_format = MEASUREMENT_FORMAT_IMPERIAL;
        config.general.drawing_engine = DRAWING_ENGINE_OPENGL;
        let text = String::from_utf8(write_config(&config)).unwrap();
        assert!(text.contains("measurement_format = IMPERIAL"));
        assert!(text.contains("drawing_engine = OPENGL"));
        assert!(text.contains("currency_format = GBP"));
        assert!(text.contains("language = en-GB"));
        assert!(text.contains("date_format = DD/MM/YY"));
    }

    #[test]
    fn test_custom_currency_written_as_number() {
        let mut config = Config::default();
        config.general.currency_format = CURRENCY_CUSTOM;
        let text = String::from_utf8(write_config(&config)).unwrap();
        assert!(text.contains("currency_format = 16"));
        // Numbers are not symbolic keys, so reading falls back to the default.
        assert_eq!(read_config(text.into_bytes()).general.currency_format, CURRENCY_POUNDS);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let text = "[general]\nwindow_width = 1024\nlanguage = de-de\n[sound]\nmaster_volume = nope\n";
        let config = read_config(text.as_bytes().to_vec());
        assert_eq!(config.general.window_width, 1024);
        assert_eq!(config.general.language, 3);
        assert_eq!(config.general.window_height, -1);
        assert_eq!(config.sound.master_volume, 100);
        assert_eq!(config.network, NetworkConfig::default());
    }

    #[test]
    fn test_missing_section_keeps_current_values() {
        let mut config = Config::default();
        config.font.size_big = 99;
        let mut r = IniReader::new(b"[general]\nshow_fps = true\n".to_vec());
        config.read(&mut r);
        assert!(config.general.show_fps);
        assert_eq!(config.font.size_big, 99);
    }

    #[test]
    fn test_language_enum() {
        assert_eq!(LanguageConfigEnum.name_of(LANGUAGE_ENGLISH_UK), Some("en-GB"));
        assert_eq!(LanguageConfigEnum.name_of(-1), None);
        assert_eq!(LanguageConfigEnum.name_of(1000), None);
        assert_eq!(LanguageConfigEnum.value_of("ja-JP", 0), 18);
        assert_eq!(LanguageConfigEnum.value_of("xx-XX", 1), 1);
    }

    #[test]
    fn test_global_store() {
        with_config_mut(|c| c.general.show_fps = true);
        assert!(with_config(|c| c.general.show_fps));
        assert!(!config_open("/nonexistent/dir/config.ini"));
        assert!(with_config(|c| c.general.show_fps));
        config_set_defaults();
        assert!(!with_config(|c| c.general.show_fps));
    }
}
