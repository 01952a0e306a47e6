//! Codec specific data: per-codec configuration carried next to a sample description, either as a
//! typed record or as the literal bytes of the box that stores it.

use bitflags::bitflags;
use fixed::types::U16F16;
use fixed_macro::types::U16F16;

use crate::marshal::{
    ac3::{Ac3SpecificBox, Eac3SpecificBox},
    avc::AvcConfigurationBox,
    box_type_of, decode_box, encode_to_vec,
    dts::DtsSpecificBox,
    mp4sys::{DecoderConfigDescriptor, ElementaryStreamDescriptorBox, EsDescriptor},
    qt::{
        BitRateBox, ChannelLayoutBox, ColorSpaceBox, FieldInfoBox, GammaLevelBox, GlobalHeaderBox,
        SamplingScaleBox, SignificantBitsBox,
    },
    vc1::Vc1SpecificBox,
    BoxHeader, BoxType, Error, FourCC, Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecSpecificFormat {
    Structured,
    Unstructured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecSpecificDataType {
    Unknown,
    Mp4sysDecoderConfig,
    H264,
    Vc1,
    Ac3,
    Eac3,
    Dts,
    SampleScale,
    H264Bitrate,
    QtVideoCommon,
    QtAudioCommon,
    QtAudioFormatSpecificFlags,
    CodecGlobalHeader,
    QtVideoFieldInfo,
    QtVideoPixelFormat,
    QtVideoSignificantBits,
    QtVideoGammaLevel,
    QtAudioChannelLayout,
}

impl CodecSpecificDataType {
    /// The box that stores this kind on disk, if it has one.
    pub fn box_type(self) -> Option<FourCC> {
        use CodecSpecificDataType::*;
        Some(match self {
            Mp4sysDecoderConfig => ElementaryStreamDescriptorBox::TYPE,
            H264 => AvcConfigurationBox::TYPE,
            Vc1 => Vc1SpecificBox::TYPE,
            Ac3 => Ac3SpecificBox::TYPE,
            Eac3 => Eac3SpecificBox::TYPE,
            Dts => DtsSpecificBox::TYPE,
            SampleScale => SamplingScaleBox::TYPE,
            H264Bitrate => BitRateBox::TYPE,
            CodecGlobalHeader => GlobalHeaderBox::TYPE,
            QtVideoFieldInfo => FieldInfoBox::TYPE,
            QtVideoPixelFormat => ColorSpaceBox::TYPE,
            QtVideoSignificantBits => SignificantBitsBox::TYPE,
            QtVideoGammaLevel => GammaLevelBox::TYPE,
            QtAudioChannelLayout => ChannelLayoutBox::TYPE,
            Unknown | QtVideoCommon | QtAudioCommon | QtAudioFormatSpecificFlags => return None,
        })
    }

    /// Kind of the data stored in a box of type `box_type`.
    pub fn from_box_type(box_type: FourCC) -> Self {
        use CodecSpecificDataType::*;
        const KINDS: [CodecSpecificDataType; 14] = [
            Mp4sysDecoderConfig,
            H264,
            Vc1,
            Ac3,
            Eac3,
            Dts,
            SampleScale,
            H264Bitrate,
            CodecGlobalHeader,
            QtVideoFieldInfo,
            QtVideoPixelFormat,
            QtVideoSignificantBits,
            QtVideoGammaLevel,
            QtAudioChannelLayout,
        ];
        KINDS
            .into_iter()
            .find(|kind| kind.box_type() == Some(box_type))
            .unwrap_or(Unknown)
    }
}

bitflags! {
    /// `formatSpecificFlags` of LPCM sound descriptions.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct LpcmFormatFlags: u32 {
        const FLOAT = 1 << 0;
        const BIG_ENDIAN = 1 << 1;
        const SIGNED_INTEGER = 1 << 2;
        const PACKED = 1 << 3;
        const ALIGNED_HIGH = 1 << 4;
        const NON_INTERLEAVED = 1 << 5;
        const NON_MIXABLE = 1 << 6;
    }
}

/// Fields of a QuickTime video sample description that ISO leaves reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QtVideoCommon {
    pub revision_level: u16,
    pub vendor: u32,
    pub temporal_quality: u32,
    pub spatial_quality: u32,
    pub horizontal_resolution: U16F16,
    pub vertical_resolution: U16F16,
    pub data_size: u32,
    pub frame_count: u16,
    pub color_table_id: i16,
}

impl Default for QtVideoCommon {
    fn default() -> Self {
        Self {
            revision_level: 0,
            vendor: 0,
            temporal_quality: 0,
            spatial_quality: 0,
            horizontal_resolution: U16F16!(72),
            vertical_resolution: U16F16!(72),
            data_size: 0,
            frame_count: 1,
            color_table_id: -1,
        }
    }
}

/// Fields of a QuickTime sound description that ISO leaves reserved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QtAudioCommon {
    pub revision_level: u16,
    pub vendor: u32,
    pub compression_id: i16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QtAudioChannelLayout {
    pub channel_layout_tag: u32,
    pub channel_bitmap: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StructuredData {
    Unknown,
    Mp4sysDecoderConfig(DecoderConfigDescriptor),
    H264(AvcConfigurationBox),
    Vc1(Vc1SpecificBox),
    Ac3(Ac3SpecificBox),
    Eac3(Eac3SpecificBox),
    Dts(DtsSpecificBox),
    SampleScale(SamplingScaleBox),
    H264Bitrate(BitRateBox),
    QtVideoCommon(QtVideoCommon),
    QtAudioCommon(QtAudioCommon),
    QtAudioFormatSpecificFlags(LpcmFormatFlags),
    CodecGlobalHeader(GlobalHeaderBox),
    QtVideoFieldInfo(FieldInfoBox),
    QtVideoPixelFormat(ColorSpaceBox),
    QtVideoSignificantBits(SignificantBitsBox),
    QtVideoGammaLevel(GammaLevelBox),
    QtAudioChannelLayout(QtAudioChannelLayout),
}

impl StructuredData {
    /// Zeroed record for `data_type`.
    pub fn new(data_type: CodecSpecificDataType) -> Self {
        use CodecSpecificDataType as Kind;
        match data_type {
            Kind::Unknown => Self::Unknown,
            Kind::Mp4sysDecoderConfig => Self::Mp4sysDecoderConfig(Default::default()),
            Kind::H264 => Self::H264(Default::default()),
            Kind::Vc1 => Self::Vc1(Default::default()),
            Kind::Ac3 => Self::Ac3(Default::default()),
            Kind::Eac3 => Self::Eac3(Default::default()),
            Kind::Dts => Self::Dts(Default::default()),
            Kind::SampleScale => Self::SampleScale(Default::default()),
            Kind::H264Bitrate => Self::H264Bitrate(Default::default()),
            Kind::QtVideoCommon => Self::QtVideoCommon(Default::default()),
            Kind::QtAudioCommon => Self::QtAudioCommon(Default::default()),
            Kind::QtAudioFormatSpecificFlags => Self::QtAudioFormatSpecificFlags(Default::default()),
            Kind::CodecGlobalHeader => Self::CodecGlobalHeader(Default::default()),
            Kind::QtVideoFieldInfo => Self::QtVideoFieldInfo(Default::default()),
            Kind::QtVideoPixelFormat => Self::QtVideoPixelFormat(Default::default()),
            Kind::QtVideoSignificantBits => Self::QtVideoSignificantBits(Default::default()),
            Kind::QtVideoGammaLevel => Self::QtVideoGammaLevel(Default::default()),
            Kind::QtAudioChannelLayout => Self::QtAudioChannelLayout(Default::default()),
        }
    }

    pub fn data_type(&self) -> CodecSpecificDataType {
        use CodecSpecificDataType as Kind;
        match self {
            Self::Unknown => Kind::Unknown,
            Self::Mp4sysDecoderConfig(_) => Kind::Mp4sysDecoderConfig,
            Self::H264(_) => Kind::H264,
            Self::Vc1(_) => Kind::Vc1,
            Self::Ac3(_) => Kind::Ac3,
            Self::Eac3(_) => Kind::Eac3,
            Self::Dts(_) => Kind::Dts,
            Self::SampleScale(_) => Kind::SampleScale,
            Self::H264Bitrate(_) => Kind::H264Bitrate,
            Self::QtVideoCommon(_) => Kind::QtVideoCommon,
            Self::QtAudioCommon(_) => Kind::QtAudioCommon,
            Self::QtAudioFormatSpecificFlags(_) => Kind::QtAudioFormatSpecificFlags,
            Self::CodecGlobalHeader(_) => Kind::CodecGlobalHeader,
            Self::QtVideoFieldInfo(_) => Kind::QtVideoFieldInfo,
            Self::QtVideoPixelFormat(_) => Kind::QtVideoPixelFormat,
            Self::QtVideoSignificantBits(_) => Kind::QtVideoSignificantBits,
            Self::QtVideoGammaLevel(_) => Kind::QtVideoGammaLevel,
            Self::QtAudioChannelLayout(_) => Kind::QtAudioChannelLayout,
        }
    }

    /// Serializes the record as the box that stores it.
    fn to_box(&self) -> Result<Vec<u8>> {
        match self {
            Self::Mp4sysDecoderConfig(config) => encode_to_vec(&ElementaryStreamDescriptorBox {
                es: EsDescriptor::new(config.clone()),
            }),
            Self::H264(avcc) => encode_to_vec(avcc),
            Self::Vc1(dvc1) => encode_to_vec(dvc1),
            Self::Ac3(dac3) => encode_to_vec(dac3),
            Self::Eac3(dec3) => encode_to_vec(dec3),
            Self::Dts(ddts) => encode_to_vec(ddts),
            Self::SampleScale(stsl) => encode_to_vec(stsl),
            Self::H264Bitrate(btrt) => encode_to_vec(btrt),
            Self::CodecGlobalHeader(glbl) => encode_to_vec(glbl),
            Self::QtVideoFieldInfo(fiel) => encode_to_vec(fiel),
            Self::QtVideoPixelFormat(cspc) => encode_to_vec(cspc),
            Self::QtVideoSignificantBits(sgbt) => encode_to_vec(sgbt),
            Self::QtVideoGammaLevel(gama) => encode_to_vec(gama),
            Self::QtAudioChannelLayout(layout) => encode_to_vec(&ChannelLayoutBox {
                channel_layout_tag: layout.channel_layout_tag,
                channel_bitmap: layout.channel_bitmap,
                descriptions: vec![],
            }),
            Self::Unknown
            | Self::QtVideoCommon(_)
            | Self::QtAudioCommon(_)
            | Self::QtAudioFormatSpecificFlags(_) => Err(Error::UnsupportedConversion {
                data_type: self.data_type(),
                to: CodecSpecificFormat::Unstructured,
            }),
        }
    }

    /// Parses the box stored as `data` into a record of kind `data_type`.
    fn from_box(data_type: CodecSpecificDataType, data: &[u8]) -> Result<Self> {
        use CodecSpecificDataType as Kind;
        Ok(match data_type {
            Kind::Mp4sysDecoderConfig => Self::Mp4sysDecoderConfig(
                decode_box::<ElementaryStreamDescriptorBox>(data)?
                    .es
                    .decoder_config,
            ),
            Kind::H264 => Self::H264(decode_box(data)?),
            Kind::Vc1 => Self::Vc1(decode_box(data)?),
            Kind::Ac3 => Self::Ac3(decode_box(data)?),
            Kind::Eac3 => Self::Eac3(decode_box(data)?),
            Kind::Dts => Self::Dts(decode_box(data)?),
            Kind::SampleScale => Self::SampleScale(decode_box(data)?),
            Kind::H264Bitrate => Self::H264Bitrate(decode_box(data)?),
            Kind::CodecGlobalHeader => {
                // Any box type is accepted as long as its size is exact.
                let (_, header) = BoxHeader::split(data)?;
                Self::CodecGlobalHeader(GlobalHeaderBox {
                    header: header.to_vec(),
                })
            }
            Kind::QtVideoFieldInfo => Self::QtVideoFieldInfo(decode_box(data)?),
            Kind::QtVideoPixelFormat => Self::QtVideoPixelFormat(decode_box(data)?),
            Kind::QtVideoSignificantBits => Self::QtVideoSignificantBits(decode_box(data)?),
            Kind::QtVideoGammaLevel => Self::QtVideoGammaLevel(decode_box(data)?),
            Kind::QtAudioChannelLayout => {
                let chan = decode_box::<ChannelLayoutBox>(data)?;
                Self::QtAudioChannelLayout(QtAudioChannelLayout {
                    channel_layout_tag: chan.channel_layout_tag,
                    channel_bitmap: chan.channel_bitmap,
                })
            }
            Kind::Unknown
            | Kind::QtVideoCommon
            | Kind::QtAudioCommon
            | Kind::QtAudioFormatSpecificFlags => {
                return Err(Error::UnsupportedConversion {
                    data_type,
                    to: CodecSpecificFormat::Structured,
                })
            }
        })
    }
}

#[derive(Debug, PartialEq)]
pub enum CodecSpecificData {
    Structured(StructuredData),
    /// A complete box, header included.
    Unstructured(Vec<u8>),
}

/// One piece of codec specific data. The payload shape always matches the kind.
#[derive(Debug, PartialEq)]
pub struct CodecSpecific {
    data_type: CodecSpecificDataType,
    data: CodecSpecificData,
}

impl CodecSpecific {
    /// A zeroed structured record, or an empty byte buffer, of kind `data_type`.
    pub fn new(data_type: CodecSpecificDataType, format: CodecSpecificFormat) -> Self {
        let data = match format {
            CodecSpecificFormat::Structured => {
                CodecSpecificData::Structured(StructuredData::new(data_type))
            }
            CodecSpecificFormat::Unstructured => CodecSpecificData::Unstructured(vec![]),
        };
        Self { data_type, data }
    }

    pub fn structured(data: StructuredData) -> Self {
        Self {
            data_type: data.data_type(),
            data: CodecSpecificData::Structured(data),
        }
    }

    pub fn unstructured(data_type: CodecSpecificDataType, data: Vec<u8>) -> Self {
        Self {
            data_type,
            data: CodecSpecificData::Unstructured(data),
        }
    }

    pub fn data_type(&self) -> CodecSpecificDataType {
        self.data_type
    }

    pub fn format(&self) -> CodecSpecificFormat {
        match self.data {
            CodecSpecificData::Structured(_) => CodecSpecificFormat::Structured,
            CodecSpecificData::Unstructured(_) => CodecSpecificFormat::Unstructured,
        }
    }

    pub fn data(&self) -> &CodecSpecificData {
        &self.data
    }

    pub fn as_structured(&self) -> Option<&StructuredData> {
        match &self.data {
            CodecSpecificData::Structured(data) => Some(data),
            CodecSpecificData::Unstructured(_) => None,
        }
    }

    pub fn as_structured_mut(&mut self) -> Option<&mut StructuredData> {
        match &mut self.data {
            CodecSpecificData::Structured(data) => Some(data),
            CodecSpecificData::Unstructured(_) => None,
        }
    }

    pub fn as_unstructured(&self) -> Option<&[u8]> {
        match &self.data {
            CodecSpecificData::Structured(_) => None,
            CodecSpecificData::Unstructured(data) => Some(data),
        }
    }

    pub fn into_structured(self) -> Option<StructuredData> {
        match self.data {
            CodecSpecificData::Structured(data) => Some(data),
            CodecSpecificData::Unstructured(_) => None,
        }
    }

    pub fn into_unstructured(self) -> Option<Vec<u8>> {
        match self.data {
            CodecSpecificData::Structured(_) => None,
            CodecSpecificData::Unstructured(data) => Some(data),
        }
    }

    /// Replaces the bytes of an unstructured descriptor.
    pub fn set_unstructured(&mut self, data: Vec<u8>) {
        if let CodecSpecificData::Unstructured(bytes) = &mut self.data {
            *bytes = data;
        }
    }

    pub fn size(&self) -> usize {
        self.as_unstructured().map_or(0, <[u8]>::len)
    }

    /// Type of the box holding the data: read off the bytes when unstructured.
    pub fn box_type(&self) -> Option<FourCC> {
        match &self.data {
            CodecSpecificData::Structured(_) => self.data_type.box_type(),
            CodecSpecificData::Unstructured(data) => box_type_of(data),
        }
    }

    pub fn duplicate(&self) -> Result<Self> {
        let data = match &self.data {
            CodecSpecificData::Structured(StructuredData::Unknown) => {
                return Err(Error::UnsupportedDescriptor(self.data_type));
            }
            CodecSpecificData::Structured(data) => CodecSpecificData::Structured(data.clone()),
            CodecSpecificData::Unstructured(data) => CodecSpecificData::Unstructured(data.clone()),
        };
        Ok(Self {
            data_type: self.data_type,
            data,
        })
    }

    /// A new descriptor holding the same data in `format`.
    pub fn convert(&self, format: CodecSpecificFormat) -> Result<Self> {
        if format == self.format() {
            return self.duplicate();
        }
        let converted = match &self.data {
            CodecSpecificData::Structured(data) => data.to_box().map(|bytes| Self {
                data_type: self.data_type,
                data: CodecSpecificData::Unstructured(bytes),
            }),
            CodecSpecificData::Unstructured(bytes) => {
                StructuredData::from_box(self.data_type, bytes).map(Self::structured)
            }
        };
        if let Err(error) = &converted {
            tracing::debug!(data_type = ?self.data_type, ?format, %error, "conversion failed");
        }
        converted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::mp4sys::{object_type, DecoderSpecificInfo};

    const ALL_KINDS: [CodecSpecificDataType; 18] = [
        CodecSpecificDataType::Unknown,
        CodecSpecificDataType::Mp4sysDecoderConfig,
        CodecSpecificDataType::H264,
        CodecSpecificDataType::Vc1,
        CodecSpecificDataType::Ac3,
        CodecSpecificDataType::Eac3,
        CodecSpecificDataType::Dts,
        CodecSpecificDataType::SampleScale,
        CodecSpecificDataType::H264Bitrate,
        CodecSpecificDataType::QtVideoCommon,
        CodecSpecificDataType::QtAudioCommon,
        CodecSpecificDataType::QtAudioFormatSpecificFlags,
        CodecSpecificDataType::CodecGlobalHeader,
        CodecSpecificDataType::QtVideoFieldInfo,
        CodecSpecificDataType::QtVideoPixelFormat,
        CodecSpecificDataType::QtVideoSignificantBits,
        CodecSpecificDataType::QtVideoGammaLevel,
        CodecSpecificDataType::QtAudioChannelLayout,
    ];

    #[test]
    fn new_matches_kind() {
        for kind in ALL_KINDS {
            let structured = CodecSpecific::new(kind, CodecSpecificFormat::Structured);
            assert_eq!(structured.data_type(), kind);
            assert_eq!(structured.as_structured().unwrap().data_type(), kind);

            let unstructured = CodecSpecific::new(kind, CodecSpecificFormat::Unstructured);
            assert_eq!(unstructured.as_unstructured(), Some(&[][..]));
            assert_eq!(unstructured.size(), 0);
        }
    }

    #[test]
    fn duplicate_is_deep() {
        for kind in ALL_KINDS {
            for format in [CodecSpecificFormat::Structured, CodecSpecificFormat::Unstructured] {
                let original = CodecSpecific::new(kind, format);
                match original.duplicate() {
                    Ok(copy) => assert_eq!(copy, original),
                    Err(Error::UnsupportedDescriptor(CodecSpecificDataType::Unknown)) => {
                        assert_eq!(kind, CodecSpecificDataType::Unknown);
                        assert_eq!(format, CodecSpecificFormat::Structured);
                    }
                    Err(error) => panic!("{error}"),
                }
            }
        }

        let mut original = CodecSpecific::unstructured(
            CodecSpecificDataType::CodecGlobalHeader,
            vec![0, 0, 0, 10, b'g', b'l', b'b', b'l', 1, 2],
        );
        let copy = original.duplicate().unwrap();
        original.set_unstructured(vec![0, 0, 0, 8, b'g', b'l', b'b', b'l']);
        assert_eq!(copy.size(), 10);
        assert_eq!(original.size(), 8);
    }

    #[test]
    fn box_type_table() {
        for kind in ALL_KINDS {
            if let Some(box_type) = kind.box_type() {
                assert_eq!(CodecSpecificDataType::from_box_type(box_type), kind);
            }
        }
        assert_eq!(
            CodecSpecificDataType::from_box_type(FourCC::new(b"wave")),
            CodecSpecificDataType::Unknown
        );
    }

    #[test]
    fn global_header_conversion() {
        let structured = CodecSpecific::structured(StructuredData::CodecGlobalHeader(
            GlobalHeaderBox {
                header: vec![0xDE, 0xAD, 0xBE, 0xEF],
            },
        ));
        let unstructured = structured.convert(CodecSpecificFormat::Unstructured).unwrap();
        assert_eq!(
            unstructured.as_unstructured().unwrap(),
            &[0, 0, 0, 12, b'g', b'l', b'b', b'l', 0xDE, 0xAD, 0xBE, 0xEF]
        );
        assert_eq!(unstructured.box_type(), Some(GlobalHeaderBox::TYPE));

        let back = unstructured.convert(CodecSpecificFormat::Structured).unwrap();
        assert_eq!(back, structured);
    }

    #[test]
    fn global_header_with_large_size() {
        let mut data = 1u32.to_be_bytes().to_vec();
        data.extend_from_slice(b"glbl");
        data.extend_from_slice(&19u64.to_be_bytes());
        data.extend_from_slice(&[7, 8, 9]);
        let specific = CodecSpecific::unstructured(CodecSpecificDataType::CodecGlobalHeader, data);
        let structured = specific.convert(CodecSpecificFormat::Structured).unwrap();
        assert_eq!(
            structured.as_structured(),
            Some(&StructuredData::CodecGlobalHeader(GlobalHeaderBox {
                header: vec![7, 8, 9]
            }))
        );
    }

    #[test]
    fn global_header_size_must_be_exact() {
        let specific = CodecSpecific::unstructured(
            CodecSpecificDataType::CodecGlobalHeader,
            vec![0, 0, 0, 16, b'g', b'l', b'b', b'l', 1, 2],
        );
        assert!(matches!(
            specific.convert(CodecSpecificFormat::Structured),
            Err(Error::InvalidBoxSize { .. })
        ));
    }

    #[test]
    fn decoder_config_conversion_keeps_fields() {
        let config = DecoderConfigDescriptor {
            object_type_indication: object_type::AUDIO_ISO_14496_3,
            buffer_size_db: 6144,
            max_bitrate: 256000,
            avg_bitrate: 192000,
            decoder_specific_info: Some(DecoderSpecificInfo(vec![0x12, 0x10])),
            ..Default::default()
        };
        let structured = CodecSpecific::structured(StructuredData::Mp4sysDecoderConfig(config));
        let unstructured = structured.convert(CodecSpecificFormat::Unstructured).unwrap();
        assert_eq!(unstructured.box_type(), Some(FourCC::new(b"esds")));
        let back = unstructured.convert(CodecSpecificFormat::Structured).unwrap();
        assert_eq!(back, structured);
    }

    #[test]
    fn kinds_without_box_do_not_convert() {
        for kind in [
            CodecSpecificDataType::QtVideoCommon,
            CodecSpecificDataType::QtAudioCommon,
            CodecSpecificDataType::QtAudioFormatSpecificFlags,
            CodecSpecificDataType::Unknown,
        ] {
            let structured = CodecSpecific::new(kind, CodecSpecificFormat::Structured);
            assert!(matches!(
                structured.convert(CodecSpecificFormat::Unstructured),
                Err(Error::UnsupportedConversion { .. })
            ));
            let unstructured = CodecSpecific::unstructured(kind, vec![0, 0, 0, 8, 0, 0, 0, 0]);
            assert!(matches!(
                unstructured.convert(CodecSpecificFormat::Structured),
                Err(Error::UnsupportedConversion { .. })
            ));
        }
    }

    #[test]
    fn channel_layout_drops_descriptions() {
        let layout = QtAudioChannelLayout {
            channel_layout_tag: (101 << 16) | 2,
            channel_bitmap: 0,
        };
        let structured = CodecSpecific::structured(StructuredData::QtAudioChannelLayout(layout));
        let unstructured = structured.convert(CodecSpecificFormat::Unstructured).unwrap();
        assert_eq!(unstructured.size(), 24);
        assert_eq!(
            unstructured.convert(CodecSpecificFormat::Structured).unwrap(),
            structured
        );
    }
}
