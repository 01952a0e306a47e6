use std::io::{Seek, Write};

use byteorder::ReadBytesExt;

use crate::marshal::{
    encode_box_header, update_box_header, BoxType, Decode, Encode, Error, FourCC, Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvcHighProfileFields {
    pub chroma_format: u8,
    pub bit_depth_luma_minus8: u8,
    pub bit_depth_chroma_minus8: u8,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// ISO/IEC 14496-15:2010 5.2.4.1
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvcConfigurationBox {
    pub profile_indication: u8,
    pub profile_compatibility: u8,
    pub level_indication: u8,
    pub length_size_minus_one: u8,
    pub sequence_parameter_sets: Vec<Vec<u8>>,
    pub picture_parameter_sets: Vec<Vec<u8>>,
    pub high_profile: Option<AvcHighProfileFields>,
    pub sequence_parameter_set_exts: Vec<Vec<u8>>,
}

impl Default for AvcConfigurationBox {
    fn default() -> Self {
        Self {
            profile_indication: 0,
            profile_compatibility: 0,
            level_indication: 0,
            length_size_minus_one: 3,
            sequence_parameter_sets: vec![],
            picture_parameter_sets: vec![],
            high_profile: None,
            sequence_parameter_set_exts: vec![],
        }
    }
}

impl AvcConfigurationBox {
    const CONFIGURATION_VERSION: u8 = 1;

    /// Profiles whose records carry chroma format and bit depth.
    pub fn requires_high_profile_fields(profile_indication: u8) -> bool {
        matches!(profile_indication, 100 | 110 | 122 | 144)
    }
}

impl BoxType for AvcConfigurationBox {
    const TYPE: FourCC = FourCC::new(b"avcC");
}

fn encode_parameter_sets(
    output: &mut (impl Write + Seek),
    parameter_sets: &[Vec<u8>],
) -> Result<()> {
    for parameter_set in parameter_sets {
        let length = u16::try_from(parameter_set.len()).map_err(|_| {
            Error::InvalidPayload(AvcConfigurationBox::TYPE, "parameter set too long")
        })?;
        length.encode(output)?;
        output.write_all(parameter_set)?;
    }
    Ok(())
}

fn decode_parameter_sets(input: &mut &[u8], count: usize) -> Result<Vec<Vec<u8>>> {
    let mut parameter_sets = Vec::with_capacity(count);
    for _ in 0..count {
        let length = u16::decode(input)? as usize;
        if length > input.len() {
            return Err(Error::InvalidPayload(
                AvcConfigurationBox::TYPE,
                "parameter set overruns the record",
            ));
        }
        let (parameter_set, remaining_data) = input.split_at(length);
        parameter_sets.push(parameter_set.to_vec());
        *input = remaining_data;
    }
    Ok(parameter_sets)
}

impl Encode for AvcConfigurationBox {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        let count_error = || Error::InvalidPayload(Self::TYPE, "too many parameter sets");

        let begin = encode_box_header(output, Self::TYPE)?;
        Self::CONFIGURATION_VERSION.encode(output)?;
        self.profile_indication.encode(output)?;
        self.profile_compatibility.encode(output)?;
        self.level_indication.encode(output)?;
        (0b1111_1100 | self.length_size_minus_one & 0b11).encode(output)?;

        let sps_count = u8::try_from(self.sequence_parameter_sets.len())
            .ok()
            .filter(|count| *count < 32)
            .ok_or_else(count_error)?;
        (0b1110_0000 | sps_count).encode(output)?;
        encode_parameter_sets(output, &self.sequence_parameter_sets)?;

        u8::try_from(self.picture_parameter_sets.len())
            .map_err(|_| count_error())?
            .encode(output)?;
        encode_parameter_sets(output, &self.picture_parameter_sets)?;

        if let Some(high_profile) = &self.high_profile {
            (0b1111_1100 | high_profile.chroma_format & 0b11).encode(output)?;
            (0b1111_1000 | high_profile.bit_depth_luma_minus8 & 0b111).encode(output)?;
            (0b1111_1000 | high_profile.bit_depth_chroma_minus8 & 0b111).encode(output)?;
            u8::try_from(self.sequence_parameter_set_exts.len())
                .map_err(|_| count_error())?
                .encode(output)?;
            encode_parameter_sets(output, &self.sequence_parameter_set_exts)?;
        }

        update_box_header(output, begin)
    }
}

impl Decode for AvcConfigurationBox {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        if input.read_u8()? != Self::CONFIGURATION_VERSION {
            return Err(Error::InvalidPayload(
                Self::TYPE,
                "unsupported configurationVersion",
            ));
        }
        let profile_indication = input.read_u8()?;
        let profile_compatibility = input.read_u8()?;
        let level_indication = input.read_u8()?;
        let length_size_minus_one = input.read_u8()? & 0b11;

        let sps_count = (input.read_u8()? & 0b1_1111) as usize;
        let sequence_parameter_sets = decode_parameter_sets(input, sps_count)?;
        let pps_count = input.read_u8()? as usize;
        let picture_parameter_sets = decode_parameter_sets(input, pps_count)?;

        // Older writers omit the trailing fields even for high profiles.
        let mut high_profile = None;
        let mut sequence_parameter_set_exts = vec![];
        if Self::requires_high_profile_fields(profile_indication) && input.len() >= 4 {
            high_profile = Some(AvcHighProfileFields {
                chroma_format: input.read_u8()? & 0b11,
                bit_depth_luma_minus8: input.read_u8()? & 0b111,
                bit_depth_chroma_minus8: input.read_u8()? & 0b111,
            });
            let sps_ext_count = input.read_u8()? as usize;
            sequence_parameter_set_exts = decode_parameter_sets(input, sps_ext_count)?;
        }

        Ok(Self {
            profile_indication,
            profile_compatibility,
            level_indication,
            length_size_minus_one,
            sequence_parameter_sets,
            picture_parameter_sets,
            high_profile,
            sequence_parameter_set_exts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::{decode_box, encode_to_vec};

    #[test]
    fn baseline_record() {
        let avcc = AvcConfigurationBox {
            profile_indication: 66,
            profile_compatibility: 0xC0,
            level_indication: 30,
            sequence_parameter_sets: vec![vec![0x67, 0x42, 0xC0, 0x1E]],
            picture_parameter_sets: vec![vec![0x68, 0xCE, 0x3C, 0x80]],
            ..Default::default()
        };
        let data = encode_to_vec(&avcc).unwrap();
        #[rustfmt::skip]
        let expected = [
            0, 0, 0, 27, b'a', b'v', b'c', b'C',
            1, 66, 0xC0, 30, 0xFF,
            0xE1, 0, 4, 0x67, 0x42, 0xC0, 0x1E,
            1, 0, 4, 0x68, 0xCE, 0x3C, 0x80,
        ];
        assert_eq!(data, expected);
        assert_eq!(decode_box::<AvcConfigurationBox>(&data).unwrap(), avcc);
    }

    #[test]
    fn high_profile_record() {
        let avcc = AvcConfigurationBox {
            profile_indication: 100,
            profile_compatibility: 0,
            level_indication: 40,
            sequence_parameter_sets: vec![vec![0x67, 0x64, 0x00, 0x28]],
            picture_parameter_sets: vec![vec![0x68, 0xEE]],
            high_profile: Some(AvcHighProfileFields {
                chroma_format: 1,
                bit_depth_luma_minus8: 0,
                bit_depth_chroma_minus8: 0,
            }),
            ..Default::default()
        };
        let data = encode_to_vec(&avcc).unwrap();
        assert_eq!(&data[data.len() - 4..], &[0xFD, 0xF8, 0xF8, 0]);
        assert_eq!(decode_box::<AvcConfigurationBox>(&data).unwrap(), avcc);
    }

    #[test]
    fn truncated_parameter_set() {
        let data = [0, 0, 0, 17, b'a', b'v', b'c', b'C', 1, 66, 0, 30, 0xFF, 0xE1, 0, 9, 0x67];
        assert!(matches!(
            decode_box::<AvcConfigurationBox>(&data),
            Err(Error::InvalidPayload(..))
        ));
    }
}
