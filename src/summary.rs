//! Container independent descriptions of a track's codec configuration.

use crate::{
    codec::{self, audio, video},
    marshal::{locate_child_box, mp4sys::ElementaryStreamDescriptorBox, qt::DecompressionParamBox},
    marshal::{BoxType, Error, FourCC, Result},
    rational::CleanAperture,
    specific::{CodecSpecific, CodecSpecificData, CodecSpecificDataType},
};

/// Codec specific data of a summary. Lookups return the first match.
#[derive(Debug, Default, PartialEq)]
pub struct CodecSpecificList(Vec<CodecSpecific>);

impl CodecSpecificList {
    pub fn add(&mut self, specific: CodecSpecific) {
        self.0.push(specific);
    }

    pub fn count(&self) -> usize {
        self.0.len()
    }

    /// `number` counts from 1.
    pub fn get(&self, number: usize) -> Option<&CodecSpecific> {
        self.0.get(number.checked_sub(1)?)
    }

    pub fn get_mut(&mut self, number: usize) -> Option<&mut CodecSpecific> {
        self.0.get_mut(number.checked_sub(1)?)
    }

    /// Removes and returns entry `number`, counting from 1.
    pub fn remove(&mut self, number: usize) -> Option<CodecSpecific> {
        let index = number.checked_sub(1).filter(|index| *index < self.0.len())?;
        Some(self.0.remove(index))
    }

    pub fn find(&self, data_type: CodecSpecificDataType) -> Option<&CodecSpecific> {
        self.0
            .iter()
            .find(|specific| specific.data_type() == data_type)
    }

    /// First entry whose box, structured or not, has type `box_type`.
    pub fn find_by_box_type(&self, box_type: FourCC) -> Option<&CodecSpecific> {
        self.0
            .iter()
            .find(|specific| specific.box_type() == Some(box_type))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CodecSpecific> {
        self.0.iter()
    }
}

impl Extend<CodecSpecific> for CodecSpecificList {
    fn extend<T: IntoIterator<Item = CodecSpecific>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl<'a> IntoIterator for &'a CodecSpecificList {
    type Item = &'a CodecSpecific;
    type IntoIter = std::slice::Iter<'a, CodecSpecific>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorSummary {
    pub primaries_index: u16,
    pub transfer_index: u16,
    pub matrix_index: u16,
}

#[derive(Debug, Default, PartialEq)]
pub struct VideoSummary {
    pub sample_type: FourCC,
    pub width: u32,
    pub height: u32,
    pub depth: u16,
    /// `compressorname` field as stored; a zero length byte selects the codec's default.
    pub compressorname: [u8; 32],
    pub clap: CleanAperture,
    pub par_h: u32,
    pub par_v: u32,
    pub color: ColorSummary,
    pub opaque: CodecSpecificList,
}

impl VideoSummary {
    pub fn new(sample_type: FourCC, width: u32, height: u32) -> Self {
        Self {
            sample_type,
            width,
            height,
            depth: 0x0018,
            ..Default::default()
        }
    }

    pub fn set_compressor_name(&mut self, name: &str) {
        self.compressorname = codec::compressor_name_field(name);
    }

    pub fn compressor_name(&self) -> String {
        let length = (self.compressorname[0] as usize).min(31);
        String::from_utf8_lossy(&self.compressorname[1..1 + length]).into_owned()
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct AudioSummary {
    pub sample_type: FourCC,
    /// MPEG-4 audio object type, when known.
    pub aot: u8,
    pub frequency: u32,
    pub channels: u32,
    pub sample_size: u32,
    pub samples_in_frame: u32,
    pub opaque: CodecSpecificList,
}

impl AudioSummary {
    pub fn new(sample_type: FourCC, frequency: u32, channels: u32, sample_size: u32) -> Self {
        Self {
            sample_type,
            frequency,
            channels,
            sample_size,
            ..Default::default()
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Summary {
    Video(VideoSummary),
    Audio(AudioSummary),
}

impl Summary {
    pub fn sample_type(&self) -> FourCC {
        match self {
            Self::Video(video) => video.sample_type,
            Self::Audio(audio) => audio.sample_type,
        }
    }

    pub fn opaque(&self) -> &CodecSpecificList {
        match self {
            Self::Video(video) => &video.opaque,
            Self::Audio(audio) => &audio.opaque,
        }
    }

    pub fn opaque_mut(&mut self) -> &mut CodecSpecificList {
        match self {
            Self::Video(video) => &mut video.opaque,
            Self::Audio(audio) => &mut audio.opaque,
        }
    }

    /// Whether the codec specific data the sample type depends on is present.
    pub fn is_valid(&self) -> bool {
        is_valid(self.sample_type(), matches!(self, Self::Audio(_)), self.opaque())
    }

    pub fn check_valid(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::InvalidSummary(self.sample_type()))
        }
    }
}

impl From<VideoSummary> for Summary {
    fn from(value: VideoSummary) -> Self {
        Self::Video(value)
    }
}

impl From<AudioSummary> for Summary {
    fn from(value: AudioSummary) -> Self {
        Self::Audio(value)
    }
}

pub(crate) fn is_valid(sample_type: FourCC, is_audio: bool, opaque: &CodecSpecificList) -> bool {
    use CodecSpecificDataType as Kind;

    let has = |data_type| opaque.find(data_type).is_some();
    if is_audio && codec::is_lpcm_audio(sample_type) {
        return has(Kind::QtAudioFormatSpecificFlags);
    }
    if codec::is_uncompressed_ycbcr(sample_type) {
        if !has(Kind::QtVideoFieldInfo) {
            return false;
        }
        if sample_type != video::V216 {
            return true;
        }
    }
    match sample_type {
        video::AVC1 => has(Kind::H264),
        video::VC_1 => has(Kind::Vc1),
        video::ULRA | video::ULRG | video::ULY0 | video::ULY2 => has(Kind::CodecGlobalHeader),
        video::V216 => has(Kind::QtVideoSignificantBits),
        video::MP4V => has(Kind::Mp4sysDecoderConfig),
        audio::MP4A => has(Kind::Mp4sysDecoderConfig) || has_wrapped_es_descriptor(opaque),
        audio::AC_3 => has(Kind::Ac3),
        audio::EC_3 => has(Kind::Eac3),
        audio::DTSC | audio::DTSE | audio::DTSH | audio::DTSL => has(Kind::Dts),
        _ => true,
    }
}

/// Looks for an `esds` inside a `wave` carried as codec specific data.
fn has_wrapped_es_descriptor(opaque: &CodecSpecificList) -> bool {
    let Some(wave) = opaque.find_by_box_type(DecompressionParamBox::TYPE) else {
        return false;
    };
    match wave.data() {
        CodecSpecificData::Unstructured(data) => matches!(
            locate_child_box(data, ElementaryStreamDescriptorBox::TYPE),
            Ok(Some(_))
        ),
        CodecSpecificData::Structured(_) => false,
    }
}
