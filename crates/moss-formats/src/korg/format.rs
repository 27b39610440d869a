//! Wire constants of the korgmultisample encoding.

/// File magic.
pub const TAG_KORG: &[u8] = b"Korg";
/// Fixed bytes following the magic.
pub const HEADER_BYTES: [u8; 8] = [0x27, 0x00, 0x00, 0x00, 0x08, 0x01, 0x12, 0x12];

/// First framing tag.
pub const TAG_EXTENDED_FILE_INFO: &str = "ExtendedFileInfo";
/// Bytes following the first framing tag.
pub const EXTENDED_FILE_INFO_BYTES: [u8; 2] = [0x12, 0x0F];
/// Second framing tag.
pub const TAG_MULTI_SAMPLE: &str = "MultiSample";
/// Bytes following the second framing tag.
pub const MULTI_SAMPLE_BYTES: [u8; 6] = [0x18, 0x01, 0x25, 0x00, 0x00, 0x00];
/// Third framing tag.
pub const TAG_SINGLE_ITEM: &str = "SingleItem";
/// Byte between the third framing tag and the application name.
pub const SINGLE_ITEM_BYTE: u8 = 0x12;
/// Name of the writing application.
pub const APPLICATION_NAME: &str = "Sample Builder";

/// Creation time block: 8 little-endian bytes of Unix seconds.
pub const ID_TIME: u8 = 0x21;

/// Body block: a nested sample block.
pub const ID_SAMPLE_BLOCK: u8 = 0x0A;
/// Body block: author string.
pub const ID_AUTHOR: u8 = 0x12;
/// Body block: category string.
pub const ID_CATEGORY: u8 = 0x1A;
/// Body block: comment string.
pub const ID_COMMENT: u8 = 0x22;
/// Body block: multisample name string.
pub const ID_SAMPLE: u8 = 0x2A;
/// Body block: 16 random bytes identifying the file.
pub const ID_UUID: u8 = 0x3A;

/// Sample parameter: start frame as a 7-bit varint.
pub const ID_START: u8 = 0x10;
/// Sample parameter: loop start frame as a 7-bit varint.
pub const ID_LOOP_START: u8 = 0x18;
/// Sample parameter: end frame as a 7-bit varint.
pub const ID_END: u8 = 0x20;
/// Sample parameter: loop tune, 4 bytes, unused.
pub const ID_LOOP_TUNE: u8 = 0x45;
/// Sample parameter: one-shot marker, present only without a loop.
pub const ID_ONE_SHOT: u8 = 0x48;
/// Sample parameter: 12 dB boost marker.
pub const ID_BOOST_12DB: u8 = 0x50;

/// Key-zone parameter: bottom key.
pub const ID_KEY_BOTTOM: u8 = 0x10;
/// Key-zone parameter: top key.
pub const ID_KEY_TOP: u8 = 0x18;
/// Key-zone parameter: original (root) key.
pub const ID_KEY_ORIGINAL: u8 = 0x20;
/// Key-zone parameter: fixed pitch marker, present iff key tracking is 0.
pub const ID_FIXED_PITCH: u8 = 0x28;
/// Key-zone parameter: tune as float32, -999..999 is tune * 1000.
pub const ID_TUNE: u8 = 0x35;
/// Key-zone parameter: left level as float32, -1000..1000 is gain * 1000.
pub const ID_LEVEL_LEFT: u8 = 0x3D;
/// Key-zone parameter: right level as float32.
pub const ID_LEVEL_RIGHT: u8 = 0x45;
/// Key-zone parameter: zone color.
pub const ID_COLOR: u8 = 0x50;
/// The fixed color bytes.
pub const COLOR_BYTES: [u8; 5] = [0xFF, 0xFF, 0xFF, 0xFF, 0x0F];

/// Linear factor of the 12 dB boost.
pub const BOOST_12DB_FACTOR: f64 = 3.9810717055349722;

/// File extension including the dot.
pub const FILE_ENDING: &str = ".korgmultisample";
