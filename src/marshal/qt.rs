use std::io::{Seek, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use fixed::types::U16F16;

use crate::{
    extension::{Extension, ExtensionBox, ExtensionList},
    marshal::{
        decode_full_box_header, encode_box_header, encode_full_box_header, next_box,
        update_box_header, BoxType, Decode, Encode, FourCC, Result, BASEBOX_COMMON_SIZE,
    },
    rational::{CleanAperture, RationalS32, RationalU32},
};

////////////////////////////////////////////////////////////////////////////////////////////////////
// ISO/IEC 14496-12:2012 8.5.2.2
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitRateBox {
    pub buffer_size_db: u32,
    pub max_bitrate: u32,
    pub avg_bitrate: u32,
}

impl BoxType for BitRateBox {
    const TYPE: FourCC = FourCC::new(b"btrt");
}

impl Encode for BitRateBox {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        let begin = encode_box_header(output, Self::TYPE)?;
        self.buffer_size_db.encode(output)?;
        self.max_bitrate.encode(output)?;
        self.avg_bitrate.encode(output)?;
        update_box_header(output, begin)
    }
}

impl Decode for BitRateBox {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        Ok(Self {
            buffer_size_db: Decode::decode(input)?,
            max_bitrate: Decode::decode(input)?,
            avg_bitrate: Decode::decode(input)?,
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// ISO/IEC 14496-12:2012 12.1.4
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelAspectRatioBox {
    pub h_spacing: u32,
    pub v_spacing: u32,
}

impl BoxType for PixelAspectRatioBox {
    const TYPE: FourCC = FourCC::new(b"pasp");
}

impl Encode for PixelAspectRatioBox {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        let begin = encode_box_header(output, Self::TYPE)?;
        self.h_spacing.encode(output)?;
        self.v_spacing.encode(output)?;
        update_box_header(output, begin)
    }
}

impl Decode for PixelAspectRatioBox {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        Ok(Self {
            h_spacing: Decode::decode(input)?,
            v_spacing: Decode::decode(input)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanApertureBox(pub CleanAperture);

impl BoxType for CleanApertureBox {
    const TYPE: FourCC = FourCC::new(b"clap");
}

impl Encode for CleanApertureBox {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        let begin = encode_box_header(output, Self::TYPE)?;
        let clap = &self.0;
        clap.width.n.encode(output)?;
        clap.width.d.encode(output)?;
        clap.height.n.encode(output)?;
        clap.height.d.encode(output)?;
        clap.horizontal_offset.n.encode(output)?;
        clap.horizontal_offset.d.encode(output)?;
        clap.vertical_offset.n.encode(output)?;
        clap.vertical_offset.d.encode(output)?;
        update_box_header(output, begin)
    }
}

impl Decode for CleanApertureBox {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        Ok(Self(CleanAperture {
            width: RationalU32::new(Decode::decode(input)?, Decode::decode(input)?),
            height: RationalU32::new(Decode::decode(input)?, Decode::decode(input)?),
            horizontal_offset: RationalS32::new(Decode::decode(input)?, Decode::decode(input)?),
            vertical_offset: RationalS32::new(Decode::decode(input)?, Decode::decode(input)?),
        }))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// ISO/IEC 14496-12:2012 8.5.2.3 / QTFF Sample Description Extensions
////////////////////////////////////////////////////////////////////////////////////////////////////

pub const COLOR_TYPE_NCLC: FourCC = FourCC::new(b"nclc");
pub const COLOR_TYPE_NCLX: FourCC = FourCC::new(b"nclx");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorParameters {
    /// QuickTime video color parameters.
    Nclc {
        primaries_index: u16,
        transfer_function_index: u16,
        matrix_index: u16,
    },
    Nclx {
        primaries_index: u16,
        transfer_function_index: u16,
        matrix_index: u16,
        full_range: bool,
    },
    /// ICC profiles and anything else, kept verbatim.
    Other { color_type: FourCC, data: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParameterBox(pub ColorParameters);

impl ColorParameterBox {
    /// `(primaries, transfer, matrix)` when the box carries coded indices.
    pub fn indices(&self) -> Option<(u16, u16, u16)> {
        match self.0 {
            ColorParameters::Nclc {
                primaries_index,
                transfer_function_index,
                matrix_index,
            }
            | ColorParameters::Nclx {
                primaries_index,
                transfer_function_index,
                matrix_index,
                ..
            } => Some((primaries_index, transfer_function_index, matrix_index)),
            ColorParameters::Other { .. } => None,
        }
    }
}

impl BoxType for ColorParameterBox {
    const TYPE: FourCC = FourCC::new(b"colr");
}

impl Encode for ColorParameterBox {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        let begin = encode_box_header(output, Self::TYPE)?;
        match &self.0 {
            ColorParameters::Nclc {
                primaries_index,
                transfer_function_index,
                matrix_index,
            } => {
                COLOR_TYPE_NCLC.encode(output)?;
                primaries_index.encode(output)?;
                transfer_function_index.encode(output)?;
                matrix_index.encode(output)?;
            }
            ColorParameters::Nclx {
                primaries_index,
                transfer_function_index,
                matrix_index,
                full_range,
            } => {
                COLOR_TYPE_NCLX.encode(output)?;
                primaries_index.encode(output)?;
                transfer_function_index.encode(output)?;
                matrix_index.encode(output)?;
                output.write_u8((*full_range as u8) << 7)?;
            }
            ColorParameters::Other { color_type, data } => {
                color_type.encode(output)?;
                output.write_all(data)?;
            }
        }
        update_box_header(output, begin)
    }
}

impl Decode for ColorParameterBox {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        let color_type = FourCC::decode(input)?;
        Ok(Self(match color_type {
            COLOR_TYPE_NCLC => ColorParameters::Nclc {
                primaries_index: Decode::decode(input)?,
                transfer_function_index: Decode::decode(input)?,
                matrix_index: Decode::decode(input)?,
            },
            COLOR_TYPE_NCLX => ColorParameters::Nclx {
                primaries_index: Decode::decode(input)?,
                transfer_function_index: Decode::decode(input)?,
                matrix_index: Decode::decode(input)?,
                full_range: input.read_u8()? & 0x80 != 0,
            },
            _ => {
                let data = input.to_vec();
                *input = &[];
                ColorParameters::Other { color_type, data }
            }
        }))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// ISO/IEC 14496-12:2012 8.5.2.2 Sampling Scale
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SamplingScaleBox {
    pub constraint_flag: bool,
    pub scale_method: u8,
    pub display_center_x: i16,
    pub display_center_y: i16,
}

impl BoxType for SamplingScaleBox {
    const TYPE: FourCC = FourCC::new(b"stsl");
}

impl Encode for SamplingScaleBox {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        let begin = encode_full_box_header(output, Self::TYPE, 0, 0)?;
        output.write_u8(self.constraint_flag as u8)?; // reserved(7) constraint_flag(1)
        self.scale_method.encode(output)?;
        self.display_center_x.encode(output)?;
        self.display_center_y.encode(output)?;
        update_box_header(output, begin)
    }
}

impl Decode for SamplingScaleBox {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        decode_full_box_header(input)?;
        Ok(Self {
            constraint_flag: input.read_u8()? & 1 != 0,
            scale_method: Decode::decode(input)?,
            display_center_x: Decode::decode(input)?,
            display_center_y: Decode::decode(input)?,
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// QTFF Video Sample Description Extensions
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldInfoBox {
    pub fields: u8,
    pub detail: u8,
}

impl BoxType for FieldInfoBox {
    const TYPE: FourCC = FourCC::new(b"fiel");
}

impl Encode for FieldInfoBox {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        let begin = encode_box_header(output, Self::TYPE)?;
        self.fields.encode(output)?;
        self.detail.encode(output)?;
        update_box_header(output, begin)
    }
}

impl Decode for FieldInfoBox {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        Ok(Self {
            fields: Decode::decode(input)?,
            detail: Decode::decode(input)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorSpaceBox {
    pub pixel_format: u32,
}

impl BoxType for ColorSpaceBox {
    const TYPE: FourCC = FourCC::new(b"cspc");
}

impl Encode for ColorSpaceBox {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        let begin = encode_box_header(output, Self::TYPE)?;
        self.pixel_format.encode(output)?;
        update_box_header(output, begin)
    }
}

impl Decode for ColorSpaceBox {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        Ok(Self {
            pixel_format: Decode::decode(input)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignificantBitsBox {
    pub significant_bits: u8,
}

impl BoxType for SignificantBitsBox {
    const TYPE: FourCC = FourCC::new(b"sgbt");
}

impl Encode for SignificantBitsBox {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        let begin = encode_box_header(output, Self::TYPE)?;
        self.significant_bits.encode(output)?;
        update_box_header(output, begin)
    }
}

impl Decode for SignificantBitsBox {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        Ok(Self {
            significant_bits: Decode::decode(input)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GammaLevelBox {
    pub level: U16F16,
}

impl BoxType for GammaLevelBox {
    const TYPE: FourCC = FourCC::new(b"gama");
}

impl Encode for GammaLevelBox {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        let begin = encode_box_header(output, Self::TYPE)?;
        self.level.encode(output)?;
        update_box_header(output, begin)
    }
}

impl Decode for GammaLevelBox {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        Ok(Self {
            level: Decode::decode(input)?,
        })
    }
}

/// Out-of-band codec headers, e.g. Ut Video's extradata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalHeaderBox {
    pub header: Vec<u8>,
}

impl BoxType for GlobalHeaderBox {
    const TYPE: FourCC = FourCC::new(b"glbl");
}

impl Encode for GlobalHeaderBox {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        let begin = encode_box_header(output, Self::TYPE)?;
        output.write_all(&self.header)?;
        update_box_header(output, begin)
    }
}

impl Decode for GlobalHeaderBox {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        let header = input.to_vec();
        *input = &[];
        Ok(Self { header })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// QTFF Audio Channel Layout
////////////////////////////////////////////////////////////////////////////////////////////////////

pub const CHANNEL_LAYOUT_USE_CHANNEL_DESCRIPTIONS: u32 = 0;
pub const CHANNEL_LAYOUT_USE_CHANNEL_BITMAP: u32 = 1 << 16;
/// Combined with the channel count in the low 16 bits.
pub const CHANNEL_LAYOUT_UNKNOWN: u32 = 0xFFFF_0000;
pub const CHANNEL_BIT_FULL: u32 = 0x3FFFF;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelDescription {
    pub channel_label: u32,
    pub channel_flags: u32,
    pub coordinates: [f32; 3],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelLayoutBox {
    pub channel_layout_tag: u32,
    pub channel_bitmap: u32,
    pub descriptions: Vec<ChannelDescription>,
}

impl BoxType for ChannelLayoutBox {
    const TYPE: FourCC = FourCC::new(b"chan");
}

impl Encode for ChannelLayoutBox {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        let begin = encode_full_box_header(output, Self::TYPE, 0, 0)?;
        self.channel_layout_tag.encode(output)?;
        self.channel_bitmap.encode(output)?;
        (self.descriptions.len() as u32).encode(output)?;
        for description in &self.descriptions {
            description.channel_label.encode(output)?;
            description.channel_flags.encode(output)?;
            for coordinate in description.coordinates {
                output.write_f32::<BigEndian>(coordinate)?;
            }
        }
        update_box_header(output, begin)
    }
}

impl Decode for ChannelLayoutBox {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        decode_full_box_header(input)?;
        let channel_layout_tag = Decode::decode(input)?;
        let channel_bitmap = Decode::decode(input)?;
        let number_channel_descriptions = u32::decode(input)?;
        let mut descriptions = vec![];
        for _ in 0..number_channel_descriptions {
            descriptions.push(ChannelDescription {
                channel_label: Decode::decode(input)?,
                channel_flags: Decode::decode(input)?,
                coordinates: [
                    input.read_f32::<BigEndian>()?,
                    input.read_f32::<BigEndian>()?,
                    input.read_f32::<BigEndian>()?,
                ],
            });
        }
        Ok(Self {
            channel_layout_tag,
            channel_bitmap,
            descriptions,
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// QTFF Sound Sample Description Extensions (siDecompressionParam)
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginalFormatBox {
    pub data_format: FourCC,
}

impl BoxType for OriginalFormatBox {
    const TYPE: FourCC = FourCC::new(b"frma");
}

impl Encode for OriginalFormatBox {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        let begin = encode_box_header(output, Self::TYPE)?;
        self.data_format.encode(output)?;
        update_box_header(output, begin)
    }
}

impl Decode for OriginalFormatBox {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        Ok(Self {
            data_format: Decode::decode(input)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EndiannessBox {
    pub little_endian: bool,
}

impl EndiannessBox {
    pub const SIZE: usize = BASEBOX_COMMON_SIZE + 2;
}

impl BoxType for EndiannessBox {
    const TYPE: FourCC = FourCC::new(b"enda");
}

impl Encode for EndiannessBox {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        let begin = encode_box_header(output, Self::TYPE)?;
        (self.little_endian as u16).encode(output)?;
        update_box_header(output, begin)
    }
}

impl Decode for EndiannessBox {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        Ok(Self {
            little_endian: u16::decode(input)? & 0xFF != 0,
        })
    }
}

/// The `mp4a` atom nested in `wave`, not the sample entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mp4aAtom {
    pub unknown: u32,
}

impl BoxType for Mp4aAtom {
    const TYPE: FourCC = FourCC::new(b"mp4a");
}

impl Encode for Mp4aAtom {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        let begin = encode_box_header(output, Self::TYPE)?;
        self.unknown.encode(output)?;
        update_box_header(output, begin)
    }
}

impl Decode for Mp4aAtom {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        Ok(Self {
            unknown: Decode::decode(input)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerminatorBox;

impl BoxType for TerminatorBox {
    const TYPE: FourCC = FourCC(0);
}

impl Encode for TerminatorBox {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        let begin = encode_box_header(output, Self::TYPE)?;
        update_box_header(output, begin)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecompressionParamBox {
    pub original_format: Option<OriginalFormatBox>,
    pub endianness: Option<EndiannessBox>,
    pub mp4a: Option<Mp4aAtom>,
    /// Everything between the fixed atoms and the terminator, `esds` typed.
    pub extensions: ExtensionList,
    pub terminator: Option<TerminatorBox>,
}

impl BoxType for DecompressionParamBox {
    const TYPE: FourCC = FourCC::new(b"wave");
}

impl Encode for DecompressionParamBox {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        let begin = encode_box_header(output, Self::TYPE)?;
        if let Some(original_format) = &self.original_format {
            original_format.encode(output)?;
        }
        if let Some(endianness) = &self.endianness {
            endianness.encode(output)?;
        }
        if let Some(mp4a) = &self.mp4a {
            mp4a.encode(output)?;
        }
        self.extensions.encode(output)?;
        if let Some(terminator) = &self.terminator {
            terminator.encode(output)?;
        }
        update_box_header(output, begin)
    }
}

impl Decode for DecompressionParamBox {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        let mut wave = Self::default();
        while input.len() >= BASEBOX_COMMON_SIZE {
            let (header, data) = next_box(input)?;
            let mut body = &data[header.header_size..];
            match header.r#type {
                OriginalFormatBox::TYPE => {
                    wave.original_format = Some(Decode::decode(&mut body)?)
                }
                EndiannessBox::TYPE => wave.endianness = Some(Decode::decode(&mut body)?),
                Mp4aAtom::TYPE => wave.mp4a = Some(Decode::decode(&mut body)?),
                TerminatorBox::TYPE => wave.terminator = Some(TerminatorBox),
                crate::marshal::mp4sys::ElementaryStreamDescriptorBox::TYPE => wave
                    .extensions
                    .append(ExtensionBox::ElementaryStreamDescriptor(Decode::decode(
                        &mut body,
                    )?)),
                _ => wave.extensions.push(Extension::binary(data.to_vec())?),
            }
        }
        Ok(wave)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// QTFF Track Aperture Mode Dimensions
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApertureDimensions {
    pub width: U16F16,
    pub height: U16F16,
}

impl ApertureDimensions {
    fn encode_as(&self, output: &mut (impl Write + Seek), r#type: FourCC) -> Result<()> {
        let begin = encode_full_box_header(output, r#type, 0, 0)?;
        self.width.encode(output)?;
        self.height.encode(output)?;
        update_box_header(output, begin)
    }
}

impl Decode for ApertureDimensions {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        decode_full_box_header(input)?;
        Ok(Self {
            width: Decode::decode(input)?,
            height: Decode::decode(input)?,
        })
    }
}

/// `tapt` with its clean (`clef`), production (`prof`) and encoded pixels (`enof`) dimensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackApertureBox {
    pub clean: Option<ApertureDimensions>,
    pub production: Option<ApertureDimensions>,
    pub encoded_pixels: Option<ApertureDimensions>,
}

impl TrackApertureBox {
    const CLEF: FourCC = FourCC::new(b"clef");
    const PROF: FourCC = FourCC::new(b"prof");
    const ENOF: FourCC = FourCC::new(b"enof");

    pub fn is_complete(&self) -> bool {
        self.clean.is_some() && self.production.is_some() && self.encoded_pixels.is_some()
    }
}

impl BoxType for TrackApertureBox {
    const TYPE: FourCC = FourCC::new(b"tapt");
}

impl Encode for TrackApertureBox {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        let begin = encode_box_header(output, Self::TYPE)?;
        if let Some(clean) = &self.clean {
            clean.encode_as(output, Self::CLEF)?;
        }
        if let Some(production) = &self.production {
            production.encode_as(output, Self::PROF)?;
        }
        if let Some(encoded_pixels) = &self.encoded_pixels {
            encoded_pixels.encode_as(output, Self::ENOF)?;
        }
        update_box_header(output, begin)
    }
}

impl Decode for TrackApertureBox {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        let mut tapt = Self::default();
        while input.len() >= BASEBOX_COMMON_SIZE {
            let (header, data) = next_box(input)?;
            let mut body = &data[header.header_size..];
            match header.r#type {
                Self::CLEF => tapt.clean = Some(Decode::decode(&mut body)?),
                Self::PROF => tapt.production = Some(Decode::decode(&mut body)?),
                Self::ENOF => tapt.encoded_pixels = Some(Decode::decode(&mut body)?),
                _ => {}
            }
        }
        Ok(tapt)
    }
}

#[cfg(test)]
mod tests {
    use fixed_macro::types::U16F16;

    use super::*;
    use crate::marshal::{decode_box, encode_to_vec};

    #[test]
    fn sampling_scale_layout() {
        let stsl = SamplingScaleBox {
            constraint_flag: true,
            scale_method: 3,
            display_center_x: -2,
            display_center_y: 5,
        };
        let data = encode_to_vec(&stsl).unwrap();
        assert_eq!(
            data,
            [0, 0, 0, 18, b's', b't', b's', b'l', 0, 0, 0, 0, 1, 3, 0xFF, 0xFE, 0, 5]
        );
        assert_eq!(decode_box::<SamplingScaleBox>(&data).unwrap(), stsl);
    }

    #[test]
    fn nclc_color_parameters() {
        let colr = ColorParameterBox(ColorParameters::Nclc {
            primaries_index: 1,
            transfer_function_index: 1,
            matrix_index: 6,
        });
        let data = encode_to_vec(&colr).unwrap();
        assert_eq!(data.len(), 18);
        assert_eq!(&data[8..12], b"nclc");
        let decoded = decode_box::<ColorParameterBox>(&data).unwrap();
        assert_eq!(decoded.indices(), Some((1, 1, 6)));
    }

    #[test]
    fn unknown_color_type_is_kept_verbatim() {
        let colr = ColorParameterBox(ColorParameters::Other {
            color_type: FourCC::new(b"prof"),
            data: vec![1, 2, 3],
        });
        let data = encode_to_vec(&colr).unwrap();
        assert_eq!(decode_box::<ColorParameterBox>(&data).unwrap(), colr);
    }

    #[test]
    fn channel_layout_with_descriptions() {
        let chan = ChannelLayoutBox {
            channel_layout_tag: CHANNEL_LAYOUT_USE_CHANNEL_DESCRIPTIONS,
            channel_bitmap: 0,
            descriptions: vec![ChannelDescription {
                channel_label: 1,
                channel_flags: 0,
                coordinates: [0.0, 1.0, -1.0],
            }],
        };
        let data = encode_to_vec(&chan).unwrap();
        assert_eq!(data.len(), 12 + 12 + 20);
        assert_eq!(decode_box::<ChannelLayoutBox>(&data).unwrap(), chan);
    }

    #[test]
    fn wave_keeps_child_order() {
        let mut wave = DecompressionParamBox {
            original_format: Some(OriginalFormatBox {
                data_format: FourCC::new(b"fl32"),
            }),
            endianness: Some(EndiannessBox {
                little_endian: true,
            }),
            terminator: Some(TerminatorBox),
            ..Default::default()
        };
        wave.extensions
            .push(Extension::binary(vec![0, 0, 0, 9, b'x', b'x', b'x', b'x', 7]).unwrap());
        let data = encode_to_vec(&wave).unwrap();
        assert_eq!(data.len(), 8 + 12 + 10 + 9 + 8);
        assert_eq!(&data[12..16], b"frma");
        assert_eq!(&data[24..28], b"enda");
        assert_eq!(data[29], 1);
        assert_eq!(&data[34..38], b"xxxx");
        assert_eq!(&data[43..47], &[0; 4]);

        assert_eq!(decode_box::<DecompressionParamBox>(&data).unwrap(), wave);
    }

    #[test]
    fn track_aperture_dimensions() {
        let tapt = TrackApertureBox {
            clean: Some(ApertureDimensions {
                width: U16F16!(1920),
                height: U16F16!(1080),
            }),
            production: Some(ApertureDimensions {
                width: U16F16!(1920),
                height: U16F16!(1080),
            }),
            encoded_pixels: None,
        };
        assert!(!tapt.is_complete());
        let data = encode_to_vec(&tapt).unwrap();
        assert_eq!(data.len(), 8 + 20 + 20);
        assert_eq!(decode_box::<TrackApertureBox>(&data).unwrap(), tapt);
    }
}
