//! Sample description builders and their reverse mappers.
//!
//! A builder turns a [`Summary`](crate::summary::Summary) into a sample entry and appends it to
//! the track's `stsd`; a reverse mapper reads an entry back into a summary. Codec specific data
//! that has a dedicated child box is materialized as that box, everything else travels as the
//! literal bytes it was given.

use crate::{
    entry::{SampleEntry, TrackContext},
    extension::{Extension, ExtensionBox},
    marshal::Result,
    specific::{CodecSpecific, CodecSpecificDataType, CodecSpecificFormat, QtAudioChannelLayout, StructuredData},
    summary::Summary,
};

pub mod audio;
pub mod video;

pub use audio::{audio_summary_from_entry, build_audio_description};
pub use video::{build_visual_description, video_summary_from_entry};

/// Summary of sample description `number`, counting from 1.
pub fn summary_from_description(context: &TrackContext, number: usize) -> Result<Option<Summary>> {
    let Some(entry) = number
        .checked_sub(1)
        .and_then(|index| context.description.entries.get(index))
    else {
        return Ok(None);
    };
    Ok(Some(match entry {
        SampleEntry::Visual(visual) => Summary::Video(video_summary_from_entry(visual)?),
        SampleEntry::Audio(audio) => {
            Summary::Audio(audio_summary_from_entry(audio, context.qt_compatible)?)
        }
    }))
}

/// The child box a structured record is written as, for kinds the builders materialize.
fn typed_extension(data: StructuredData) -> Option<ExtensionBox> {
    Some(match data {
        StructuredData::SampleScale(stsl) => ExtensionBox::SampleScale(stsl),
        StructuredData::H264Bitrate(btrt) => ExtensionBox::BitRate(btrt),
        StructuredData::QtVideoFieldInfo(fiel) => ExtensionBox::FieldInfo(fiel),
        StructuredData::QtVideoPixelFormat(cspc) => ExtensionBox::ColorSpace(cspc),
        StructuredData::QtVideoSignificantBits(sgbt) => ExtensionBox::SignificantBits(sgbt),
        StructuredData::QtVideoGammaLevel(gama) => ExtensionBox::GammaLevel(gama),
        StructuredData::CodecGlobalHeader(glbl) => ExtensionBox::GlobalHeader(glbl),
        _ => return None,
    })
}

/// Inverse of [`typed_extension`], plus the channel layout.
fn structured_data(typed: &ExtensionBox) -> Option<StructuredData> {
    Some(match typed {
        ExtensionBox::SampleScale(stsl) => StructuredData::SampleScale(*stsl),
        ExtensionBox::BitRate(btrt) => StructuredData::H264Bitrate(*btrt),
        ExtensionBox::FieldInfo(fiel) => StructuredData::QtVideoFieldInfo(*fiel),
        ExtensionBox::ColorSpace(cspc) => StructuredData::QtVideoPixelFormat(*cspc),
        ExtensionBox::SignificantBits(sgbt) => StructuredData::QtVideoSignificantBits(*sgbt),
        ExtensionBox::GammaLevel(gama) => StructuredData::QtVideoGammaLevel(*gama),
        ExtensionBox::GlobalHeader(glbl) => StructuredData::CodecGlobalHeader(glbl.clone()),
        ExtensionBox::ChannelLayout(chan) => {
            StructuredData::QtAudioChannelLayout(QtAudioChannelLayout {
                channel_layout_tag: chan.channel_layout_tag,
                channel_bitmap: chan.channel_bitmap,
            })
        }
        _ => return None,
    })
}

/// Structured form of `specific` as a child box, if its kind has one the builders emit.
fn materialize(specific: &CodecSpecific) -> Result<Option<ExtensionBox>> {
    Ok(specific
        .convert(CodecSpecificFormat::Structured)?
        .into_structured()
        .and_then(typed_extension))
}

/// Box bytes of `specific`, converted to the unstructured form if needed.
fn box_bytes(specific: &CodecSpecific) -> Result<Vec<u8>> {
    Ok(specific
        .convert(CodecSpecificFormat::Unstructured)?
        .into_unstructured()
        .unwrap_or_default())
}

/// Codec specific data for a child box carried as raw bytes.
fn opaque_binary(extension: &Extension) -> Option<CodecSpecific> {
    match extension {
        Extension::Binary { box_type, data } => Some(CodecSpecific::unstructured(
            CodecSpecificDataType::from_box_type(*box_type),
            data.clone(),
        )),
        Extension::Typed(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        codec::{audio, video},
        summary::{AudioSummary, VideoSummary},
        specific::LpcmFormatFlags,
    };

    #[test]
    fn summaries_by_number() {
        let mut context = TrackContext::quicktime();
        build_visual_description(&mut context, &VideoSummary::new(video::APCN, 720, 486)).unwrap();
        let mut sound = AudioSummary::new(audio::TWOS, 48000, 2, 16);
        sound.opaque.add(CodecSpecific::structured(
            StructuredData::QtAudioFormatSpecificFlags(
                LpcmFormatFlags::BIG_ENDIAN | LpcmFormatFlags::SIGNED_INTEGER,
            ),
        ));
        build_audio_description(&mut context, &sound).unwrap();

        assert!(summary_from_description(&context, 0).unwrap().is_none());
        assert!(summary_from_description(&context, 3).unwrap().is_none());
        let Some(Summary::Video(video)) = summary_from_description(&context, 1).unwrap() else {
            panic!("expected a video summary");
        };
        assert_eq!((video.width, video.height), (720, 486));
        let Some(Summary::Audio(sound)) = summary_from_description(&context, 2).unwrap() else {
            panic!("expected an audio summary");
        };
        assert_eq!(sound.frequency, 48000);
    }

    #[test]
    fn typed_extensions_map_back() {
        use crate::marshal::qt::{BitRateBox, GammaLevelBox};
        use fixed::types::U16F16;

        for data in [
            StructuredData::H264Bitrate(BitRateBox {
                buffer_size_db: 0,
                max_bitrate: 8_000_000,
                avg_bitrate: 5_000_000,
            }),
            StructuredData::QtVideoGammaLevel(GammaLevelBox {
                level: U16F16::from_num(2.2),
            }),
        ] {
            let typed = typed_extension(data.clone()).unwrap();
            assert_eq!(structured_data(&typed), Some(data));
        }
        assert!(typed_extension(StructuredData::Unknown).is_none());
    }
}
