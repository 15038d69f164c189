// rct2-common: byte streams, checksums and the config.ini layer

#![allow(clippy::field_reassign_with_default, clippy::too_many_arguments)]

pub mod checksum;
pub mod config;
pub mod config_enum;
pub mod error;
pub mod ini_lexer;
pub mod ini_reader;
pub mod ini_writer;
pub mod stream;

pub use config::Config;
pub use config_enum::{ConfigEnum, ConfigEnumEntry, ConfigEnumLookup};
pub use error::{ConfigError, StreamError, StreamResult};
pub use ini_reader::IniReader;
pub use ini_writer::IniWriter;
pub use stream::ByteStream;
