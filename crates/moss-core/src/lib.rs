//! Domain model for multi-sample instruments.
//!
//! This crate provides the normalized representation that every format
//! reader and writer converts through: a [`MultisampleSource`] is a tree of
//! [`Group`]s containing [`SampleZone`]s, each zone referencing shared
//! [`SampleData`] plus playback parameters (envelopes, filters, loops).
//!
//! # Overview
//!
//! - [`multisample`]: instrument and performance source types
//! - [`group`]: zone groups, trigger types, round-robin logic
//! - [`zone`]: the fundamental key/velocity mapping record
//! - [`envelope`]: DAHDSR envelopes and envelope/velocity modulators
//! - [`filter`]: filter types and cutoff modulation
//! - [`sample_loop`]: sample loops with crossfade conversions
//! - [`sample_data`]: the audio-data abstraction shared by all backings
//! - [`metadata`]: descriptive instrument metadata
//! - [`math`]: dB/frequency/time normalization curves, signed-complement coding
//! - [`note`]: MIDI note parsing and formatting
//! - [`naming`]: filesystem-safe and unique name policies
//! - [`reduce`]: coverage-preserving zone reduction
//! - [`validation`]: model invariant checks

pub mod envelope;
pub mod filter;
pub mod group;
pub mod math;
pub mod metadata;
pub mod multisample;
pub mod naming;
pub mod note;
pub mod reduce;
pub mod sample_data;
pub mod sample_loop;
pub mod validation;
pub mod zone;

pub use envelope::{Envelope, EnvelopeModulator};
pub use filter::{Filter, FilterType};
pub use group::{Group, PlayLogic, Trigger};
pub use metadata::Metadata;
pub use multisample::{InstrumentSource, MultisampleSource, PerformanceSource};
pub use sample_data::{AudioMetadata, SampleData, SampleError};
pub use sample_loop::{LoopType, SampleLoop};
pub use validation::{ValidationError, ValidationResult};
pub use zone::SampleZone;
