use std::io::{Seek, Write};

use crate::marshal::{
    encode_box_header, update_box_header, BoxType, Decode, Encode, Error, FourCC, Result,
};

////////////////////////////////////////////////////////////////////////////////////////////////////
// ETSI TS 102 114 E.2.2
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DtsSpecificBox {
    pub sampling_frequency: u32,
    pub max_bitrate: u32,
    pub avg_bitrate: u32,
    pub pcm_sample_depth: u8,
    /// 512 << frame_duration samples per frame.
    pub frame_duration: u8,
    pub stream_construction: u8,
    pub core_lfe_present: bool,
    pub core_layout: u8,
    pub core_size: u16,
    pub stereo_downmix: bool,
    pub representation_type: u8,
    pub channel_layout: u16,
    pub multi_asset: bool,
    pub lbr_duration_mod: bool,
    /// A trailing box carried verbatim, header included.
    pub reserved_box: Option<Vec<u8>>,
}

impl DtsSpecificBox {
    pub fn samples_in_frame(&self) -> u32 {
        let samples = 512u32 << (self.frame_duration & 0x3);
        if self.lbr_duration_mod {
            samples * 3 / 2
        } else {
            samples
        }
    }
}

impl BoxType for DtsSpecificBox {
    const TYPE: FourCC = FourCC::new(b"ddts");
}

impl Encode for DtsSpecificBox {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        use bitstream_io::BitWrite as _;

        let mut fields = Vec::with_capacity(20);
        let mut writer = bitstream_io::BitWriter::endian(&mut fields, bitstream_io::BigEndian);
        writer.write(32, self.sampling_frequency)?;
        writer.write(32, self.max_bitrate)?;
        writer.write(32, self.avg_bitrate)?;
        writer.write(8, self.pcm_sample_depth)?;
        writer.write(2, self.frame_duration & 0x3)?;
        writer.write(5, self.stream_construction & 0x1F)?;
        writer.write_bit(self.core_lfe_present)?;
        writer.write(6, self.core_layout & 0x3F)?;
        writer.write(14, self.core_size & 0x3FFF)?;
        writer.write_bit(self.stereo_downmix)?;
        writer.write(3, self.representation_type & 0x7)?;
        writer.write(16, self.channel_layout)?;
        writer.write_bit(self.multi_asset)?;
        writer.write_bit(self.lbr_duration_mod)?;
        writer.write_bit(self.reserved_box.is_some())?;
        writer.write(5, 0u8)?; // reserved
        writer.byte_align()?;

        let begin = encode_box_header(output, Self::TYPE)?;
        output.write_all(&fields)?;
        if let Some(reserved_box) = &self.reserved_box {
            output.write_all(reserved_box)?;
        }
        update_box_header(output, begin)
    }
}

impl Decode for DtsSpecificBox {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        use bitstream_io::BitRead as _;

        if input.len() < 20 {
            return Err(Error::InvalidPayload(Self::TYPE, "truncated fields"));
        }
        let (fields, remaining_data) = input.split_at(20);
        *input = &[];

        let mut reader =
            bitstream_io::BitReader::endian(std::io::Cursor::new(fields), bitstream_io::BigEndian);
        let sampling_frequency = reader.read::<u32>(32)?;
        let max_bitrate = reader.read::<u32>(32)?;
        let avg_bitrate = reader.read::<u32>(32)?;
        let pcm_sample_depth = reader.read::<u8>(8)?;
        let frame_duration = reader.read::<u8>(2)?;
        let stream_construction = reader.read::<u8>(5)?;
        let core_lfe_present = reader.read_bit()?;
        let core_layout = reader.read::<u8>(6)?;
        let core_size = reader.read::<u16>(14)?;
        let stereo_downmix = reader.read_bit()?;
        let representation_type = reader.read::<u8>(3)?;
        let channel_layout = reader.read::<u16>(16)?;
        let multi_asset = reader.read_bit()?;
        let lbr_duration_mod = reader.read_bit()?;
        let reserved_box_present = reader.read_bit()?;

        Ok(Self {
            sampling_frequency,
            max_bitrate,
            avg_bitrate,
            pcm_sample_depth,
            frame_duration,
            stream_construction,
            core_lfe_present,
            core_layout,
            core_size,
            stereo_downmix,
            representation_type,
            channel_layout,
            multi_asset,
            lbr_duration_mod,
            reserved_box: (reserved_box_present && !remaining_data.is_empty())
                .then(|| remaining_data.to_vec()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::{decode_box, encode_to_vec};

    #[test]
    fn express_at_48khz() {
        let ddts = DtsSpecificBox {
            sampling_frequency: 48000,
            max_bitrate: 1_536_000,
            avg_bitrate: 1_536_000,
            pcm_sample_depth: 24,
            frame_duration: 1,
            stream_construction: 2,
            core_lfe_present: true,
            core_layout: 9,
            core_size: 2012,
            stereo_downmix: false,
            representation_type: 0,
            channel_layout: 0xF,
            multi_asset: false,
            lbr_duration_mod: true,
            reserved_box: None,
        };
        let data = encode_to_vec(&ddts).unwrap();
        assert_eq!(data.len(), 28);
        assert_eq!(&data[8..12], &48000u32.to_be_bytes());
        assert_eq!(data[20], 24);
        assert_eq!(ddts.samples_in_frame(), 1536);
        assert_eq!(decode_box::<DtsSpecificBox>(&data).unwrap(), ddts);
    }

    #[test]
    fn reserved_box_is_kept() {
        let ddts = DtsSpecificBox {
            sampling_frequency: 44100,
            reserved_box: Some(vec![0, 0, 0, 9, b'x', b'x', b'x', b'x', 1]),
            ..Default::default()
        };
        let data = encode_to_vec(&ddts).unwrap();
        assert_eq!(data.len(), 37);
        assert_eq!(decode_box::<DtsSpecificBox>(&data).unwrap(), ddts);
    }
}
