use std::io::{Read, Seek, Write};

use bstringify::bstringify;
use byteorder::{ReadBytesExt, WriteBytesExt};
use fixed::types::U16F16;
use fixed_macro::types::U16F16;

use crate::{
    extension::{Extension, ExtensionBox, ExtensionList},
    marshal::{
        decode_full_box_header, encode_box_header, encode_full_box_header, next_box,
        qt::TrackApertureBox, update_box_header, BoxHeader, Decode, Encode, FourCC, Result,
        BASEBOX_COMMON_SIZE,
    },
};

/// Decodes the child boxes following the fixed fields of a sample entry. Listed types become
/// typed extensions, everything else is kept as it was read.
macro_rules! decode_extensions {(
    $input:ident,
    $extensions:ident,
    $(
        $type:ident $variant:ident
    ),* $(,)?
) => (
    while $input.len() >= BASEBOX_COMMON_SIZE {
        let (header, data) = next_box($input)?;
        #[allow(unused_mut)]
        let mut body = &data[header.header_size..];
        match &header.r#type.to_bytes() {
            $(
                bstringify!($type) => {
                    $extensions.append(ExtensionBox::$variant(Decode::decode(&mut body)?))
                }
            )*
            _ => $extensions.push(Extension::binary(data.to_vec())?),
        }
    }
    // Some writers pad the entry with a zero-sized terminator.
    *$input = &[];
)}

////////////////////////////////////////////////////////////////////////////////////////////////////
// ISO/IEC 14496-12:2012 8.5.2.2 / QTFF Video Sample Description
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq)]
pub struct VisualSampleEntry {
    pub r#type: FourCC,
    pub data_reference_index: u16,
    pub version: u16,
    pub revision_level: u16,
    pub vendor: u32,
    pub temporal_quality: u32,
    pub spatial_quality: u32,
    pub width: u16,
    pub height: u16,
    pub horizresolution: U16F16,
    pub vertresolution: U16F16,
    pub data_size: u32,
    pub frame_count: u16,
    /// Pascal string: length byte followed by up to 31 characters.
    pub compressorname: [u8; 32],
    pub depth: u16,
    pub color_table_id: i16,
    pub extensions: ExtensionList,
}

impl VisualSampleEntry {
    pub fn new(r#type: FourCC) -> Self {
        Self {
            r#type,
            data_reference_index: 1,
            version: 0,
            revision_level: 0,
            vendor: 0,
            temporal_quality: 0,
            spatial_quality: 0,
            width: 0,
            height: 0,
            horizresolution: U16F16!(72),
            vertresolution: U16F16!(72),
            data_size: 0,
            frame_count: 1,
            compressorname: [0; 32],
            depth: 0x0018,
            color_table_id: -1,
            extensions: Default::default(),
        }
    }

    /// Decodes a complete entry box.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let (header, mut body) = BoxHeader::split(data)?;
        Self::decode_body(header.r#type, &mut body)
    }

    fn decode_body(r#type: FourCC, input: &mut &[u8]) -> Result<Self> {
        let mut reserved = [0u8; 6];
        input.read_exact(&mut reserved)?;
        let data_reference_index = Decode::decode(input)?;
        let version = Decode::decode(input)?;
        let revision_level = Decode::decode(input)?;
        let vendor = Decode::decode(input)?;
        let temporal_quality = Decode::decode(input)?;
        let spatial_quality = Decode::decode(input)?;
        let width = Decode::decode(input)?;
        let height = Decode::decode(input)?;
        let horizresolution = Decode::decode(input)?;
        let vertresolution = Decode::decode(input)?;
        let data_size = Decode::decode(input)?;
        let frame_count = Decode::decode(input)?;
        let mut compressorname = [0u8; 32];
        input.read_exact(&mut compressorname)?;
        let depth = Decode::decode(input)?;
        let color_table_id = Decode::decode(input)?;

        let mut extensions = ExtensionList::default();
        decode_extensions! {
            input,
            extensions,
            clap CleanAperture,
            pasp PixelAspectRatio,
            colr ColorParameter,
            stsl SampleScale,
            btrt BitRate,
            fiel FieldInfo,
            cspc ColorSpace,
            sgbt SignificantBits,
            gama GammaLevel,
            glbl GlobalHeader,
        }

        Ok(Self {
            r#type,
            data_reference_index,
            version,
            revision_level,
            vendor,
            temporal_quality,
            spatial_quality,
            width,
            height,
            horizresolution,
            vertresolution,
            data_size,
            frame_count,
            compressorname,
            depth,
            color_table_id,
            extensions,
        })
    }
}

impl Encode for VisualSampleEntry {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        let begin = encode_box_header(output, self.r#type)?;
        output.write_all(&[0; 6])?; // reserved
        self.data_reference_index.encode(output)?;

        self.version.encode(output)?;
        self.revision_level.encode(output)?;
        self.vendor.encode(output)?;
        self.temporal_quality.encode(output)?;
        self.spatial_quality.encode(output)?;
        self.width.encode(output)?;
        self.height.encode(output)?;
        self.horizresolution.encode(output)?;
        self.vertresolution.encode(output)?;
        self.data_size.encode(output)?;
        self.frame_count.encode(output)?;
        output.write_all(&self.compressorname)?;
        self.depth.encode(output)?;
        self.color_table_id.encode(output)?;

        self.extensions.encode(output)?;
        update_box_header(output, begin)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// ISO/IEC 14496-12:2012 8.5.2.2 / QTFF Sound Sample Description (versions 0, 1 and 2)
////////////////////////////////////////////////////////////////////////////////////////////////////

pub const COMPRESSION_ID_NOT_COMPRESSED: i16 = 0;
pub const COMPRESSION_ID_FIXED_COMPRESSION: i16 = -1;
pub const COMPRESSION_ID_VARIABLE_COMPRESSION: i16 = -2;

#[derive(Debug, Clone, PartialEq)]
pub struct AudioSampleEntry {
    pub r#type: FourCC,
    pub data_reference_index: u16,
    pub version: u16,
    pub revision_level: u16,
    pub vendor: u32,
    pub channelcount: u16,
    pub samplesize: u16,
    pub compression_id: i16,
    pub packet_size: u16,
    pub samplerate: U16F16,

    // version 1
    pub samples_per_packet: u32,
    pub bytes_per_packet: u32,
    pub bytes_per_frame: u32,
    pub bytes_per_sample: u32,

    // version 2
    pub size_of_struct_only: u32,
    pub audio_sample_rate: f64,
    pub num_audio_channels: u32,
    pub always_7f000000: u32,
    pub const_bits_per_channel: u32,
    pub format_specific_flags: u32,
    pub const_bytes_per_audio_packet: u32,
    pub const_lpcm_frames_per_audio_packet: u32,

    pub extensions: ExtensionList,
}

impl AudioSampleEntry {
    pub fn new(r#type: FourCC) -> Self {
        Self {
            r#type,
            data_reference_index: 1,
            version: 0,
            revision_level: 0,
            vendor: 0,
            channelcount: 0,
            samplesize: 0,
            compression_id: 0,
            packet_size: 0,
            samplerate: U16F16::ZERO,
            samples_per_packet: 0,
            bytes_per_packet: 0,
            bytes_per_frame: 0,
            bytes_per_sample: 0,
            size_of_struct_only: 0,
            audio_sample_rate: 0.0,
            num_audio_channels: 0,
            always_7f000000: 0,
            const_bits_per_channel: 0,
            format_specific_flags: 0,
            const_bytes_per_audio_packet: 0,
            const_lpcm_frames_per_audio_packet: 0,
            extensions: Default::default(),
        }
    }

    /// Decodes a complete entry box.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let (header, mut body) = BoxHeader::split(data)?;
        Self::decode_body(header.r#type, &mut body)
    }

    fn decode_body(r#type: FourCC, input: &mut &[u8]) -> Result<Self> {
        let mut audio = Self::new(r#type);
        let mut reserved = [0u8; 6];
        input.read_exact(&mut reserved)?;
        audio.data_reference_index = Decode::decode(input)?;

        audio.version = Decode::decode(input)?;
        audio.revision_level = Decode::decode(input)?;
        audio.vendor = Decode::decode(input)?;
        audio.channelcount = Decode::decode(input)?;
        audio.samplesize = Decode::decode(input)?;
        audio.compression_id = Decode::decode(input)?;
        audio.packet_size = Decode::decode(input)?;
        audio.samplerate = Decode::decode(input)?;
        match audio.version {
            1 => {
                audio.samples_per_packet = Decode::decode(input)?;
                audio.bytes_per_packet = Decode::decode(input)?;
                audio.bytes_per_frame = Decode::decode(input)?;
                audio.bytes_per_sample = Decode::decode(input)?;
            }
            2 => {
                audio.size_of_struct_only = Decode::decode(input)?;
                audio.audio_sample_rate = Decode::decode(input)?;
                audio.num_audio_channels = Decode::decode(input)?;
                audio.always_7f000000 = Decode::decode(input)?;
                audio.const_bits_per_channel = Decode::decode(input)?;
                audio.format_specific_flags = Decode::decode(input)?;
                audio.const_bytes_per_audio_packet = Decode::decode(input)?;
                audio.const_lpcm_frames_per_audio_packet = Decode::decode(input)?;
            }
            _ => {}
        }

        let extensions = &mut audio.extensions;
        decode_extensions! {
            input,
            extensions,
            chan ChannelLayout,
            esds ElementaryStreamDescriptor,
            wave DecompressionParam,
            glbl GlobalHeader,
        }

        Ok(audio)
    }
}

impl Encode for AudioSampleEntry {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        let begin = encode_box_header(output, self.r#type)?;
        output.write_all(&[0; 6])?; // reserved
        self.data_reference_index.encode(output)?;

        self.version.encode(output)?;
        self.revision_level.encode(output)?;
        self.vendor.encode(output)?;
        self.channelcount.encode(output)?;
        self.samplesize.encode(output)?;
        self.compression_id.encode(output)?;
        self.packet_size.encode(output)?;
        self.samplerate.encode(output)?;
        match self.version {
            1 => {
                self.samples_per_packet.encode(output)?;
                self.bytes_per_packet.encode(output)?;
                self.bytes_per_frame.encode(output)?;
                self.bytes_per_sample.encode(output)?;
            }
            2 => {
                self.size_of_struct_only.encode(output)?;
                self.audio_sample_rate.encode(output)?;
                self.num_audio_channels.encode(output)?;
                self.always_7f000000.encode(output)?;
                self.const_bits_per_channel.encode(output)?;
                self.format_specific_flags.encode(output)?;
                self.const_bytes_per_audio_packet.encode(output)?;
                self.const_lpcm_frames_per_audio_packet.encode(output)?;
            }
            _ => {}
        }

        self.extensions.encode(output)?;
        update_box_header(output, begin)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// ISO/IEC 14496-12:2012 8.5.2
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq)]
pub enum SampleEntry {
    Visual(VisualSampleEntry),
    Audio(AudioSampleEntry),
}

impl SampleEntry {
    pub fn r#type(&self) -> FourCC {
        match self {
            Self::Visual(visual) => visual.r#type,
            Self::Audio(audio) => audio.r#type,
        }
    }
}

impl Encode for SampleEntry {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        match self {
            Self::Visual(visual) => visual.encode(output),
            Self::Audio(audio) => audio.encode(output),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Video,
    Audio,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleDescriptionBox {
    pub entries: Vec<SampleEntry>,
}

impl SampleDescriptionBox {
    pub const TYPE: FourCC = FourCC::new(b"stsd");

    /// Decodes an `stsd` body whose entries all belong to `media_type`.
    pub fn decode_as(input: &mut &[u8], media_type: MediaType) -> Result<Self> {
        decode_full_box_header(input)?;
        let entry_count = input.read_u32::<byteorder::BigEndian>()?;
        let mut entries = Vec::with_capacity(entry_count.min(16) as usize);
        for _ in 0..entry_count {
            let (header, data) = next_box(input)?;
            let mut body = &data[header.header_size..];
            entries.push(match media_type {
                MediaType::Video => {
                    SampleEntry::Visual(VisualSampleEntry::decode_body(header.r#type, &mut body)?)
                }
                MediaType::Audio => {
                    SampleEntry::Audio(AudioSampleEntry::decode_body(header.r#type, &mut body)?)
                }
            });
        }
        Ok(Self { entries })
    }
}

impl Encode for SampleDescriptionBox {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        let begin = encode_full_box_header(output, Self::TYPE, 0, 0)?;
        output.write_u32::<byteorder::BigEndian>(self.entries.len() as u32)?;
        for entry in &self.entries {
            entry.encode(output)?;
        }
        update_box_header(output, begin)
    }
}

/// The part of a track and its file a sample description builder looks at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackContext {
    /// Major brand of the file type box; `qt  ` selects QuickTime MPEG-4 audio.
    pub major_brand: FourCC,
    pub qt_compatible: bool,
    /// Track aperture mode dimensions.
    pub aperture: Option<TrackApertureBox>,
    pub description: SampleDescriptionBox,
}

impl TrackContext {
    pub const BRAND_QT: FourCC = FourCC::new(b"qt  ");

    pub fn new(major_brand: FourCC, qt_compatible: bool) -> Self {
        Self {
            major_brand,
            qt_compatible,
            ..Default::default()
        }
    }

    pub fn quicktime() -> Self {
        Self::new(Self::BRAND_QT, true)
    }
}
