//! Codec descriptions for ISO base media and QuickTime files.
//!
//! Sample descriptions are built from a media-independent [`Summary`] and read back into one.
//! Codec specific data travels either as a typed record or as the literal bytes of its box, and
//! [`specific::CodecSpecific::convert`] moves between the two.

pub mod codec;
pub mod description;
pub mod entry;
pub mod extension;
pub mod marshal;
pub mod rational;
pub mod specific;
pub mod summary;

pub use description::{
    audio_summary_from_entry, build_audio_description, build_visual_description,
    summary_from_description, video_summary_from_entry,
};
pub use entry::TrackContext;
pub use marshal::{locate_child_box, Error, FourCC, Result};
pub use summary::{AudioSummary, Summary, VideoSummary};
