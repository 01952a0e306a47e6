use fixed::types::U16F16;
use fixed_macro::types::U16F16;

use crate::{
    codec::{
        self,
        audio::{ALAC, FL32, FL64, IN24, IN32, LPCM, MP4A, NONE, NOT_SPECIFIED, RAW, SOWT, TWOS, _23NI},
    },
    description::{box_bytes, materialize, opaque_binary, structured_data},
    entry::{
        AudioSampleEntry, SampleEntry, TrackContext, COMPRESSION_ID_FIXED_COMPRESSION,
        COMPRESSION_ID_NOT_COMPRESSED, COMPRESSION_ID_VARIABLE_COMPRESSION,
    },
    extension::{Extension, ExtensionBox},
    marshal::{
        box_type_of, decode_box, encode_to_vec, locate_child_box,
        mp4sys::{
            object_type, AudioSpecificConfig, DecoderConfigDescriptor,
            ElementaryStreamDescriptorBox, EsDescriptor,
        },
        qt::{
            ChannelLayoutBox, DecompressionParamBox, EndiannessBox, Mp4aAtom, OriginalFormatBox,
            TerminatorBox, CHANNEL_BIT_FULL, CHANNEL_LAYOUT_UNKNOWN,
            CHANNEL_LAYOUT_USE_CHANNEL_BITMAP, CHANNEL_LAYOUT_USE_CHANNEL_DESCRIPTIONS,
        },
        BoxHeader, BoxType, Error, FourCC, Result, BASEBOX_COMMON_SIZE,
    },
    specific::{
        CodecSpecific, CodecSpecificData, CodecSpecificDataType, CodecSpecificFormat,
        LpcmFormatFlags, QtAudioCommon, StructuredData,
    },
    summary::{self, AudioSummary},
};

/// `(source bit depth, formatSpecificFlags)` of ALAC sound descriptions.
const ALAC_FORMAT_FLAGS: [(u32, u32); 4] = [(16, 1), (20, 2), (24, 3), (32, 4)];

/// Size of a version 2 sound description up to its extensions.
const SIZE_OF_STRUCT_ONLY: u32 = 72;

/// Builds a sound sample entry from `summary` and appends it to the track's sample descriptions,
/// returning its number.
///
/// How the fixed fields are laid out depends on the codec and on the file's dialect:
///
/// * `mp4a` in a QuickTime file wraps its `esds` in a `wave`, elsewhere it carries the `esds`
///   directly and fills the template fields with their ISO defaults.
/// * LPCM picks the oldest sound description version that can express the format, switching
///   the type to `lpcm` when the requested one cannot.
/// * DTS rounds the sample rate to its base family.
/// * Anything else uses the QuickTime template under QuickTime compatibility, the ISO one
///   otherwise.
pub fn build_audio_description(context: &mut TrackContext, summary: &AudioSummary) -> Result<usize> {
    let sample_type = summary.sample_type;
    if !summary::is_valid(sample_type, true, &summary.opaque) {
        return Err(Error::InvalidSummary(sample_type));
    }

    let mut audio = AudioSampleEntry::new(sample_type);
    match sample_type {
        MP4A if context.major_brand == TrackContext::BRAND_QT => set_qtff_mp4a(&mut audio, summary)?,
        MP4A => set_isom_mp4a(&mut audio, summary)?,
        _ if codec::is_lpcm_audio(sample_type) => set_qtff_lpcm(&mut audio, summary)?,
        _ if codec::is_dts_audio(sample_type) => set_isom_dts(&mut audio, summary),
        _ if context.qt_compatible => set_qtff_template(&mut audio, summary)?,
        _ => set_isom_template(&mut audio, summary),
    }
    for specific in &summary.opaque {
        apply_codec_specific(&mut audio, specific, context.qt_compatible, summary.channels)?;
    }
    match audio.version {
        0 => audio.compression_id = COMPRESSION_ID_NOT_COMPRESSED,
        2 => audio.compression_id = COMPRESSION_ID_VARIABLE_COMPRESSION,
        _ => {}
    }

    tracing::debug!(
        r#type = ?audio.r#type,
        version = audio.version,
        qt_compatible = context.qt_compatible,
        "sound description built"
    );
    context.description.entries.push(SampleEntry::Audio(audio));
    Ok(context.description.entries.len())
}

fn apply_codec_specific(
    audio: &mut AudioSampleEntry,
    specific: &CodecSpecific,
    qt_compatible: bool,
    channels: u32,
) -> Result<()> {
    use CodecSpecificDataType as Kind;

    match (specific.data_type(), specific.data()) {
        (Kind::Unknown, CodecSpecificData::Structured(_)) => {
            tracing::debug!("skipping structured codec specific data of unknown kind");
        }
        (
            Kind::QtAudioCommon,
            CodecSpecificData::Structured(StructuredData::QtAudioCommon(common)),
        ) => {
            audio.revision_level = common.revision_level;
            audio.vendor = common.vendor;
            audio.compression_id = common.compression_id;
        }
        (Kind::QtAudioCommon, _) => {
            tracing::debug!("skipping unstructured QuickTime audio common fields");
        }
        (Kind::QtAudioChannelLayout, _) => {
            if !qt_compatible && audio.r#type != ALAC {
                return Ok(());
            }
            let Some(StructuredData::QtAudioChannelLayout(layout)) = specific
                .convert(CodecSpecificFormat::Structured)?
                .into_structured()
            else {
                return Ok(());
            };
            let (mut channel_layout_tag, mut channel_bitmap) =
                (layout.channel_layout_tag, layout.channel_bitmap);
            // Channel descriptions are not supported.
            if channel_layout_tag == CHANNEL_LAYOUT_USE_CHANNEL_DESCRIPTIONS
                || (channel_layout_tag == CHANNEL_LAYOUT_USE_CHANNEL_BITMAP
                    && (channel_bitmap == 0 || channel_bitmap > CHANNEL_BIT_FULL))
            {
                channel_layout_tag = CHANNEL_LAYOUT_UNKNOWN | channels;
                channel_bitmap = 0;
            }
            if (channel_layout_tag ^ CHANNEL_LAYOUT_UNKNOWN) >> 16 != 0 {
                audio.extensions.append(ExtensionBox::ChannelLayout(ChannelLayoutBox {
                    channel_layout_tag,
                    channel_bitmap,
                    descriptions: vec![],
                }));
            }
        }
        (Kind::CodecGlobalHeader, _) => {
            if let Some(typed) = materialize(specific)? {
                audio.extensions.append(typed);
            }
        }
        // Consumed by the layout strategies.
        (Kind::QtAudioFormatSpecificFlags | Kind::Mp4sysDecoderConfig, _) => {}
        _ => {
            let data = box_bytes(specific)?;
            if data.len() < BASEBOX_COMMON_SIZE {
                return Ok(());
            }
            // Codec specific data inside a `wave` is already placed by the strategy.
            if box_type_of(&data) == Some(DecompressionParamBox::TYPE) {
                tracing::debug!("wave already placed");
                return Ok(());
            }
            audio.extensions.push(Extension::binary(data)?);
        }
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// Layout strategies
////////////////////////////////////////////////////////////////////////////////////////////////////

fn set_qtff_mp4a(audio: &mut AudioSampleEntry, summary: &AudioSummary) -> Result<()> {
    let mut wave = DecompressionParamBox {
        original_format: Some(OriginalFormatBox {
            data_format: audio.r#type,
        }),
        mp4a: Some(Mp4aAtom::default()),
        terminator: Some(TerminatorBox),
        ..Default::default()
    };
    wave.extensions
        .append(ExtensionBox::ElementaryStreamDescriptor(es_descriptor_box(summary)?));
    audio.extensions.append(ExtensionBox::DecompressionParam(wave));

    audio.samplesize = 16;
    audio.compression_id = COMPRESSION_ID_VARIABLE_COMPRESSION;
    audio.packet_size = 0;
    if needs_extended_layout(summary) {
        set_extended_layout(audio, summary, 0, summary.samples_in_frame);
    } else {
        audio.version = 1;
        audio.channelcount = summary.channels.min(2) as u16;
        audio.samplerate = U16F16::from_bits(summary.frequency << 16);
        audio.samples_per_packet = summary.samples_in_frame;
        audio.bytes_per_packet = 1;
        audio.bytes_per_frame = summary.channels;
        audio.bytes_per_sample = 2;
    }
    Ok(())
}

fn set_isom_mp4a(audio: &mut AudioSampleEntry, summary: &AudioSummary) -> Result<()> {
    match decoder_config(summary)?.object_type_indication {
        object_type::AUDIO_ISO_14496_3
        | object_type::AUDIO_ISO_13818_7_MAIN
        | object_type::AUDIO_ISO_13818_7_LC
        | object_type::AUDIO_ISO_13818_7_SSR
        | object_type::AUDIO_ISO_13818_3
        | object_type::AUDIO_ISO_11172_3 => {}
        object_type_indication => {
            return Err(Error::UnsupportedObjectType(object_type_indication));
        }
    }
    audio
        .extensions
        .append(ExtensionBox::ElementaryStreamDescriptor(es_descriptor_box(summary)?));

    // ISO/IEC 14496-14 template fields
    audio.channelcount = 2;
    audio.samplesize = 16;
    audio.samplerate = iso_sample_rate(summary.frequency);
    Ok(())
}

fn set_qtff_lpcm(audio: &mut AudioSampleEntry, summary: &AudioSummary) -> Result<()> {
    let sample_type = audio.r#type;
    let flags = format_specific_flags(summary).ok_or(Error::InvalidSummary(sample_type))?;
    let sample_size = summary.sample_size;
    let float = flags.contains(LpcmFormatFlags::FLOAT);
    let big_endian = flags.contains(LpcmFormatFlags::BIG_ENDIAN);

    // Types whose name fixes the format must agree with the summary.
    let mismatched = match sample_type {
        RAW => sample_size != 8 || float,
        FL32 => sample_size != 32 || !float,
        FL64 => sample_size != 64 || !float,
        IN24 => sample_size != 24 || float,
        IN32 => sample_size != 32 || float,
        _23NI => sample_size != 32 || float || big_endian,
        SOWT => sample_size != 16 || float || big_endian,
        TWOS | NONE | NOT_SPECIFIED => {
            (sample_size != 16 && sample_size != 8) || float || !big_endian
        }
        _ => false,
    };
    if mismatched || needs_extended_layout(summary) || sample_size % 8 != 0 {
        audio.r#type = LPCM;
        audio.version = 2;
    } else if sample_type == LPCM {
        audio.version = 2;
    } else if sample_size > 16 || !matches!(sample_type, RAW | TWOS | NONE | NOT_SPECIFIED) {
        audio.version = 1;
    }
    // Size of one LPCM frame, whatever the version.
    audio.const_bytes_per_audio_packet = sample_size.wrapping_mul(summary.channels) / 8;

    match audio.version {
        2 => {
            set_extended_layout(audio, summary, sample_size, 1);
            let mut flags = flags;
            if sample_type == TWOS && sample_size != 8 {
                flags |= LpcmFormatFlags::BIG_ENDIAN;
            }
            audio.format_specific_flags = sanitize_flags(flags).bits();
        }
        1 => {
            audio.channelcount = summary.channels as u16;
            audio.samplesize = 16;
            // Everything but `raw ` and `twos` counts as compressed.
            audio.compression_id = if matches!(sample_type, RAW | TWOS) {
                COMPRESSION_ID_NOT_COMPRESSED
            } else {
                COMPRESSION_ID_FIXED_COMPRESSION
            };
            audio.samplerate = U16F16::from_bits(summary.frequency << 16);
            audio.samples_per_packet = 1;
            audio.bytes_per_packet = sample_size / 8;
            audio.bytes_per_frame = audio.bytes_per_packet.wrapping_mul(summary.channels);
            audio.bytes_per_sample = 1 + (sample_size != 8) as u32;
            if matches!(sample_type, FL32 | FL64 | IN24 | IN32) {
                audio
                    .extensions
                    .append(ExtensionBox::DecompressionParam(DecompressionParamBox {
                        original_format: Some(OriginalFormatBox {
                            data_format: sample_type,
                        }),
                        endianness: Some(EndiannessBox {
                            little_endian: !big_endian,
                        }),
                        terminator: Some(TerminatorBox),
                        ..Default::default()
                    }));
            }
        }
        _ => {
            audio.channelcount = summary.channels as u16;
            audio.samplesize = sample_size as u16;
            audio.compression_id = COMPRESSION_ID_NOT_COMPRESSED;
            audio.samplerate = U16F16::from_bits(summary.frequency << 16);
        }
    }
    Ok(())
}

fn set_isom_dts(audio: &mut AudioSampleEntry, summary: &AudioSummary) {
    audio.channelcount = summary.channels as u16;
    audio.samplesize = 16;
    let base = match summary.frequency {
        12000 | 24000 | 48000 | 96000 | 192000 | 384000 => 48000,
        22050 | 44100 | 88200 | 176400 | 352800 => 44100,
        8000 | 16000 | 32000 | 64000 | 128000 => 32000,
        _ => 0,
    };
    audio.samplerate = U16F16::from_bits(base << 16);
}

fn set_qtff_template(audio: &mut AudioSampleEntry, summary: &AudioSummary) -> Result<()> {
    let flags = format_specific_flags(summary);
    // An unstructured `wave` is carried as is, otherwise a minimal one is built.
    let mut reused = summary
        .opaque
        .find_by_box_type(DecompressionParamBox::TYPE)
        .and_then(CodecSpecific::as_unstructured)
        .map(<[u8]>::to_vec);
    let mut built = reused.is_none().then(|| DecompressionParamBox {
        original_format: Some(OriginalFormatBox {
            data_format: audio.r#type,
        }),
        terminator: Some(TerminatorBox),
        ..Default::default()
    });

    audio.samplesize = 16;
    audio.compression_id = COMPRESSION_ID_VARIABLE_COMPRESSION;
    audio.packet_size = 0;
    if needs_extended_layout(summary) {
        set_extended_layout(audio, summary, 0, summary.samples_in_frame);
        audio.const_bytes_per_audio_packet = 0;
        audio.format_specific_flags = if audio.r#type == ALAC {
            ALAC_FORMAT_FLAGS
                .iter()
                .find(|(sample_size, _)| *sample_size == summary.sample_size)
                .map_or(0, |(_, flags)| *flags)
        } else {
            flags.map_or(0, |flags| sanitize_flags(flags).bits())
        };
    } else {
        audio.version = 1;
        audio.channelcount = summary.channels.min(2) as u16;
        audio.samplerate = U16F16::from_bits(summary.frequency << 16);
        audio.samples_per_packet = summary.samples_in_frame;
        audio.bytes_per_packet = summary.sample_size / 8;
        audio.bytes_per_frame = audio.bytes_per_packet.wrapping_mul(summary.channels);
        audio.bytes_per_sample = 1 + (summary.sample_size != 8) as u32;
        if let Some(flags) = flags {
            let little_endian = !flags.contains(LpcmFormatFlags::BIG_ENDIAN);
            if let Some(wave) = &mut built {
                wave.endianness = Some(EndiannessBox { little_endian });
            }
            if let Some(data) = &mut reused {
                set_wave_endianness(data, little_endian)?;
            }
        }
    }

    match (built, reused) {
        (Some(wave), _) => audio.extensions.append(ExtensionBox::DecompressionParam(wave)),
        (None, Some(data)) => audio.extensions.push(Extension::binary(data)?),
        (None, None) => {}
    }
    Ok(())
}

fn set_isom_template(audio: &mut AudioSampleEntry, summary: &AudioSummary) {
    audio.channelcount = summary.channels as u16;
    audio.samplesize = 16;
    audio.samplerate = iso_sample_rate(summary.frequency);
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// Helpers
////////////////////////////////////////////////////////////////////////////////////////////////////

/// More than two channels or a sample rate beyond 16 bits need a version 2 description.
fn needs_extended_layout(summary: &AudioSummary) -> bool {
    summary.channels > 2 || summary.frequency > u16::MAX as u32
}

fn set_extended_layout(
    audio: &mut AudioSampleEntry,
    summary: &AudioSummary,
    const_bits_per_channel: u32,
    const_lpcm_frames_per_audio_packet: u32,
) {
    audio.version = 2;
    audio.channelcount = 3;
    audio.samplesize = 16;
    audio.compression_id = COMPRESSION_ID_VARIABLE_COMPRESSION;
    audio.samplerate = U16F16!(1);
    audio.size_of_struct_only = SIZE_OF_STRUCT_ONLY;
    audio.audio_sample_rate = summary.frequency as f64;
    audio.num_audio_channels = summary.channels;
    audio.always_7f000000 = 0x7F00_0000;
    audio.const_bits_per_channel = const_bits_per_channel;
    audio.const_lpcm_frames_per_audio_packet = const_lpcm_frames_per_audio_packet;
}

/// The 16.16 sample rate field cannot hold rates above 65535 Hz; those are written as 0.
fn iso_sample_rate(frequency: u32) -> U16F16 {
    if frequency <= u16::MAX as u32 {
        U16F16::from_bits(frequency << 16)
    } else {
        U16F16::ZERO
    }
}

fn format_specific_flags(summary: &AudioSummary) -> Option<LpcmFormatFlags> {
    summary
        .opaque
        .iter()
        .find_map(|specific| match specific.as_structured() {
            Some(StructuredData::QtAudioFormatSpecificFlags(flags)) => Some(*flags),
            _ => None,
        })
}

/// Floats are never signed integers, packed samples are never aligned.
fn sanitize_flags(mut flags: LpcmFormatFlags) -> LpcmFormatFlags {
    if flags.contains(LpcmFormatFlags::FLOAT) {
        flags.remove(LpcmFormatFlags::SIGNED_INTEGER);
    }
    if flags.contains(LpcmFormatFlags::PACKED) {
        flags.remove(LpcmFormatFlags::ALIGNED_HIGH);
    }
    flags
}

fn decoder_config(summary: &AudioSummary) -> Result<DecoderConfigDescriptor> {
    let specific = summary
        .opaque
        .find(CodecSpecificDataType::Mp4sysDecoderConfig)
        .ok_or(Error::MissingDecoderConfig)?;
    match specific
        .convert(CodecSpecificFormat::Structured)?
        .into_structured()
    {
        Some(StructuredData::Mp4sysDecoderConfig(config)) => Ok(config),
        _ => Err(Error::MissingDecoderConfig),
    }
}

/// The `esds` for an `mp4a` entry: from the decoder configuration, or lifted out of a `wave`.
fn es_descriptor_box(summary: &AudioSummary) -> Result<ElementaryStreamDescriptorBox> {
    if let Some(specific) = summary
        .opaque
        .find(CodecSpecificDataType::Mp4sysDecoderConfig)
    {
        return match specific.data() {
            CodecSpecificData::Unstructured(data) => decode_box(data),
            CodecSpecificData::Structured(StructuredData::Mp4sysDecoderConfig(config)) => {
                Ok(ElementaryStreamDescriptorBox {
                    es: EsDescriptor::new(config.clone()),
                })
            }
            CodecSpecificData::Structured(_) => Err(Error::MissingDecoderConfig),
        };
    }

    let wave = summary
        .opaque
        .find_by_box_type(DecompressionParamBox::TYPE)
        .and_then(CodecSpecific::as_unstructured)
        .ok_or(Error::MissingDecoderConfig)?;
    let esds = locate_child_box(wave, ElementaryStreamDescriptorBox::TYPE)?
        .ok_or(Error::MissingDecoderConfig)?;
    decode_box(esds.slice(wave))
}

/// Sets the little-endian flag of the `enda` inside a serialized `wave`, inserting one after the
/// `frma` when there is none.
fn set_wave_endianness(wave: &mut Vec<u8>, little_endian: bool) -> Result<()> {
    if let Some(enda) = locate_child_box(wave, EndiannessBox::TYPE)? {
        if enda.size < EndiannessBox::SIZE {
            return Err(Error::InvalidBoxSize {
                box_type: EndiannessBox::TYPE,
                size: enda.size as u64,
                expected: EndiannessBox::SIZE as u64,
            });
        }
        let flag = &mut wave[enda.offset + EndiannessBox::SIZE - 1];
        if little_endian {
            *flag |= 0x01;
        } else {
            *flag &= !0x01;
        }
        return Ok(());
    }

    let header = BoxHeader::read(wave)?;
    let position = match locate_child_box(wave, OriginalFormatBox::TYPE)? {
        Some(frma) => frma.offset + frma.size,
        None => header.header_size,
    };
    let enda = encode_to_vec(&EndiannessBox { little_endian })?;
    wave.splice(position..position, enda);

    let size = wave.len() as u64;
    if header.header_size == BASEBOX_COMMON_SIZE {
        let size = u32::try_from(size).map_err(|_| Error::InvalidBoxSize {
            box_type: header.r#type,
            size,
            expected: u32::MAX as u64,
        })?;
        wave[..4].copy_from_slice(&size.to_be_bytes());
    } else {
        wave[BASEBOX_COMMON_SIZE..BASEBOX_COMMON_SIZE + 8].copy_from_slice(&size.to_be_bytes());
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// Reverse mapping
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Reads a sound sample entry back into a summary. `qt_compatible` enables the QuickTime
/// interpretation of the version 1 and 2 fields.
pub fn audio_summary_from_entry(audio: &AudioSampleEntry, qt_compatible: bool) -> Result<AudioSummary> {
    let sample_type = audio.r#type;
    let mut summary = AudioSummary {
        sample_type,
        frequency: audio.samplerate.to_bits() >> 16,
        channels: audio.channelcount as u32,
        sample_size: audio.samplesize as u32,
        ..Default::default()
    };

    if qt_compatible && codec::is_qt_audio(sample_type) {
        match audio.version {
            1 => {
                summary.channels = audio
                    .bytes_per_frame
                    .checked_div(audio.bytes_per_packet)
                    .unwrap_or(summary.channels);
                summary.sample_size = audio.bytes_per_packet.wrapping_mul(8);
                summary.samples_in_frame = audio.samples_per_packet;
            }
            2 => {
                summary.frequency = audio.audio_sample_rate as u32;
                summary.channels = audio.num_audio_channels;
                summary.sample_size = audio.const_bits_per_channel;
                summary.samples_in_frame = audio.const_lpcm_frames_per_audio_packet;
            }
            _ => {}
        }
        summary
            .opaque
            .add(CodecSpecific::structured(StructuredData::QtAudioCommon(QtAudioCommon {
                revision_level: audio.revision_level,
                vendor: audio.vendor,
                compression_id: audio.compression_id,
            })));

        if codec::is_lpcm_audio(sample_type) {
            let mut flags = if audio.version == 2 {
                LpcmFormatFlags::from_bits_retain(audio.format_specific_flags)
            } else {
                // The samplesize field is trusted over the type here.
                match sample_type {
                    FL32 | FL64 => LpcmFormatFlags::FLOAT,
                    TWOS => LpcmFormatFlags::BIG_ENDIAN | LpcmFormatFlags::SIGNED_INTEGER,
                    NONE | NOT_SPECIFIED if summary.sample_size > 8 => LpcmFormatFlags::BIG_ENDIAN,
                    _ => LpcmFormatFlags::empty(),
                }
            };
            if let Some(ExtensionBox::DecompressionParam(wave)) =
                audio.extensions.find_box(DecompressionParamBox::TYPE)
            {
                if wave.endianness.is_some_and(|enda| !enda.little_endian) {
                    flags |= LpcmFormatFlags::BIG_ENDIAN;
                }
            }
            summary
                .opaque
                .add(CodecSpecific::structured(StructuredData::QtAudioFormatSpecificFlags(flags)));
        } else if sample_type == ALAC && audio.version == 2 {
            if let Some((sample_size, _)) = ALAC_FORMAT_FLAGS
                .iter()
                .find(|(_, flags)| *flags == audio.format_specific_flags)
            {
                summary.sample_size = *sample_size;
            }
        }
    }

    for extension in &audio.extensions {
        let Extension::Typed(typed) = extension else {
            let Some(specific) = opaque_binary(extension) else {
                continue;
            };
            if specific.data_type() == CodecSpecificDataType::Dts {
                if let Some(StructuredData::Dts(ddts)) = specific
                    .convert(CodecSpecificFormat::Structured)?
                    .into_structured()
                {
                    summary.frequency = ddts.sampling_frequency;
                    summary.sample_size = ddts.pcm_sample_depth as u32;
                    summary.samples_in_frame = ddts.samples_in_frame();
                }
            }
            summary.opaque.add(specific);
            continue;
        };
        match typed {
            ExtensionBox::ElementaryStreamDescriptor(esds) => {
                apply_es_descriptor(&mut summary, &esds.es)?;
                summary.opaque.add(CodecSpecific::unstructured(
                    CodecSpecificDataType::Mp4sysDecoderConfig,
                    encode_to_vec(esds)?,
                ));
            }
            ExtensionBox::DecompressionParam(wave) => {
                let wave = rebuild_wave(&mut summary, sample_type, wave)?;
                summary.opaque.add(CodecSpecific::unstructured(
                    CodecSpecificDataType::Unknown,
                    encode_to_vec(&wave)?,
                ));
            }
            _ => summary
                .opaque
                .extend(structured_data(typed).map(CodecSpecific::structured)),
        }
    }
    Ok(summary)
}

/// The `wave` as a builder would write it for `sample_type`, keeping its codec specific boxes.
fn rebuild_wave(
    summary: &mut AudioSummary,
    sample_type: FourCC,
    wave: &DecompressionParamBox,
) -> Result<DecompressionParamBox> {
    let mut rebuilt = DecompressionParamBox {
        original_format: Some(OriginalFormatBox {
            data_format: sample_type,
        }),
        endianness: wave.endianness,
        mp4a: (sample_type == MP4A).then(Mp4aAtom::default),
        terminator: Some(TerminatorBox),
        ..Default::default()
    };
    for extension in &wave.extensions {
        match extension {
            Extension::Typed(ExtensionBox::ElementaryStreamDescriptor(esds)) => {
                apply_es_descriptor(summary, &esds.es)?;
                // Also exposed on its own so the decoder configuration survives leaving QuickTime.
                summary.opaque.add(CodecSpecific::unstructured(
                    CodecSpecificDataType::Mp4sysDecoderConfig,
                    encode_to_vec(esds)?,
                ));
                rebuilt
                    .extensions
                    .append(ExtensionBox::ElementaryStreamDescriptor(esds.clone()));
            }
            Extension::Typed(_) => {}
            Extension::Binary { box_type, .. }
                if matches!(
                    *box_type,
                    OriginalFormatBox::TYPE | Mp4aAtom::TYPE | TerminatorBox::TYPE
                ) => {}
            Extension::Binary { .. } => rebuilt.extensions.push(extension.clone()),
        }
    }
    Ok(rebuilt)
}

/// Takes the stream parameters from an MPEG-4 Audio AudioSpecificConfig, when the descriptor
/// carries one.
fn apply_es_descriptor(summary: &mut AudioSummary, es: &EsDescriptor) -> Result<()> {
    let config = &es.decoder_config;
    if !matches!(
        config.object_type_indication,
        object_type::AUDIO_ISO_14496_3
            | object_type::AUDIO_ISO_13818_7_MAIN
            | object_type::AUDIO_ISO_13818_7_LC
            | object_type::AUDIO_ISO_13818_7_SSR
    ) {
        return Ok(());
    }
    let Some(info) = &config.decoder_specific_info else {
        return Ok(());
    };
    let asc = AudioSpecificConfig::parse(&info.0)?;
    summary.aot = asc.audio_object_type;
    summary.frequency = asc.frequency();
    if let Some(channels) = asc.channels() {
        summary.channels = channels;
    }
    summary.sample_size = 16;
    summary.samples_in_frame = asc.samples_in_frame();
    Ok(())
}
