//! SFZ opcode names shared by reader and writer.

pub const SAMPLE: &str = "sample";
pub const DEFAULT_PATH: &str = "default_path";
pub const GROUP_LABEL: &str = "group_label";

pub const KEY: &str = "key";
pub const LOKEY: &str = "lokey";
pub const HIKEY: &str = "hikey";
pub const PITCH_KEYCENTER: &str = "pitch_keycenter";
pub const LOVEL: &str = "lovel";
pub const HIVEL: &str = "hivel";

pub const XFIN_LOKEY: &str = "xfin_lokey";
pub const XFIN_HIKEY: &str = "xfin_hikey";
pub const XFOUT_LOKEY: &str = "xfout_lokey";
pub const XFOUT_HIKEY: &str = "xfout_hikey";
pub const XFIN_LOVEL: &str = "xfin_lovel";
pub const XFIN_HIVEL: &str = "xfin_hivel";
pub const XFOUT_LOVEL: &str = "xfout_lovel";
pub const XFOUT_HIVEL: &str = "xfout_hivel";

pub const VOLUME: &str = "volume";
pub const PAN: &str = "pan";
pub const TUNE: &str = "tune";
pub const TRANSPOSE: &str = "transpose";
pub const PITCH_KEYTRACK: &str = "pitch_keytrack";
pub const BEND_UP: &str = "bend_up";
pub const BEND_DOWN: &str = "bend_down";
pub const AMP_VELTRACK: &str = "amp_veltrack";

pub const OFFSET: &str = "offset";
pub const END: &str = "end";
pub const DIRECTION: &str = "direction";
pub const TRIGGER: &str = "trigger";
pub const SEQ_LENGTH: &str = "seq_length";
pub const SEQ_POSITION: &str = "seq_position";

pub const LOOP_MODE: &str = "loop_mode";
pub const LOOP_TYPE: &str = "loop_type";
pub const LOOP_START: &str = "loop_start";
pub const LOOP_END: &str = "loop_end";
pub const LOOP_CROSSFADE: &str = "loop_crossfade";

pub const AMPEG_DELAY: &str = "ampeg_delay";
pub const AMPEG_START: &str = "ampeg_start";
pub const AMPEG_ATTACK: &str = "ampeg_attack";
pub const AMPEG_HOLD: &str = "ampeg_hold";
pub const AMPEG_DECAY: &str = "ampeg_decay";
pub const AMPEG_SUSTAIN: &str = "ampeg_sustain";
pub const AMPEG_RELEASE: &str = "ampeg_release";

pub const PITCHEG_DEPTH: &str = "pitcheg_depth";
pub const PITCHEG_DELAY: &str = "pitcheg_delay";
pub const PITCHEG_ATTACK: &str = "pitcheg_attack";
pub const PITCHEG_HOLD: &str = "pitcheg_hold";
pub const PITCHEG_DECAY: &str = "pitcheg_decay";
pub const PITCHEG_SUSTAIN: &str = "pitcheg_sustain";
pub const PITCHEG_RELEASE: &str = "pitcheg_release";

pub const FIL_TYPE: &str = "fil_type";
pub const CUTOFF: &str = "cutoff";
pub const RESONANCE: &str = "resonance";
pub const FIL_VELTRACK: &str = "fil_veltrack";
pub const FILEG_DEPTH: &str = "fileg_depth";
pub const FILEG_DELAY: &str = "fileg_delay";
pub const FILEG_ATTACK: &str = "fileg_attack";
pub const FILEG_HOLD: &str = "fileg_hold";
pub const FILEG_DECAY: &str = "fileg_decay";
pub const FILEG_SUSTAIN: &str = "fileg_sustain";
pub const FILEG_RELEASE: &str = "fileg_release";

/// Range of the `fileg_depth` opcode in cents.
pub const FILTER_ENVELOPE_DEPTH_CENTS: f64 = 12_000.0;
/// Range of the `fil_veltrack` opcode in cents.
pub const FILTER_VELOCITY_DEPTH_CENTS: f64 = 9_600.0;
/// Range of the `pitcheg_depth` opcode in cents.
pub const PITCH_ENVELOPE_DEPTH_CENTS: f64 = 48_000.0;
