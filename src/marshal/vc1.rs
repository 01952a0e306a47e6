use std::io::{Seek, Write};

use crate::marshal::{
    encode_box_header, update_box_header, BoxType, Decode, Encode, Error, FourCC, Result,
};

const ENTRY_POINT_START_CODE: [u8; 4] = [0x00, 0x00, 0x01, 0x0E];

////////////////////////////////////////////////////////////////////////////////////////////////////
// SMPTE RP 2025-2007 VC-1 decoder specific structure
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vc1SpecificBox {
    pub profile: u8,
    pub level: u8,
    pub cbr: bool,
    pub interlaced: bool,
    pub multiple_sequence: bool,
    pub multiple_entry: bool,
    pub slice_present: bool,
    pub bframe_present: bool,
    pub framerate: u32,
    /// Sequence header EBDU, start code included.
    pub sequence_header: Vec<u8>,
    /// Entry point header EBDU, start code included.
    pub entry_point_header: Vec<u8>,
}

impl Vc1SpecificBox {
    pub const ADVANCED_PROFILE: u8 = 12;
}

impl BoxType for Vc1SpecificBox {
    const TYPE: FourCC = FourCC::new(b"dvc1");
}

impl Encode for Vc1SpecificBox {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        use bitstream_io::BitWrite as _;

        let mut fields = Vec::with_capacity(7);
        let mut writer = bitstream_io::BitWriter::endian(&mut fields, bitstream_io::BigEndian);
        writer.write(4, self.profile & 0xF)?;
        writer.write(3, self.level & 0x7)?;
        writer.write(1, 0u8)?; // reserved
        writer.write(3, self.level & 0x7)?;
        writer.write_bit(self.cbr)?;
        writer.write(6, 0u8)?; // reserved
        writer.write_bit(!self.interlaced)?;
        writer.write_bit(!self.multiple_sequence)?;
        writer.write_bit(!self.multiple_entry)?;
        writer.write_bit(!self.slice_present)?;
        writer.write_bit(!self.bframe_present)?;
        writer.write(1, 0u8)?; // reserved
        writer.write(32, self.framerate)?;
        writer.byte_align()?;

        let begin = encode_box_header(output, Self::TYPE)?;
        output.write_all(&fields)?;
        output.write_all(&self.sequence_header)?;
        output.write_all(&self.entry_point_header)?;
        update_box_header(output, begin)
    }
}

impl Decode for Vc1SpecificBox {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        use bitstream_io::BitRead as _;

        if input.len() < 7 {
            return Err(Error::InvalidPayload(Self::TYPE, "truncated header"));
        }
        let (fields, headers) = input.split_at(7);
        *input = &[];

        let mut reader =
            bitstream_io::BitReader::endian(std::io::Cursor::new(fields), bitstream_io::BigEndian);
        let profile = reader.read::<u8>(4)?;
        reader.skip(3 + 1)?; // level, reserved
        let level = reader.read::<u8>(3)?;
        let cbr = reader.read_bit()?;
        reader.skip(6)?; // reserved
        let interlaced = !reader.read_bit()?;
        let multiple_sequence = !reader.read_bit()?;
        let multiple_entry = !reader.read_bit()?;
        let slice_present = !reader.read_bit()?;
        let bframe_present = !reader.read_bit()?;
        reader.skip(1)?; // reserved
        let framerate = reader.read::<u32>(32)?;

        let split = headers
            .windows(ENTRY_POINT_START_CODE.len())
            .position(|window| window == ENTRY_POINT_START_CODE)
            .unwrap_or(headers.len());
        let (sequence_header, entry_point_header) = headers.split_at(split);

        Ok(Self {
            profile,
            level,
            cbr,
            interlaced,
            multiple_sequence,
            multiple_entry,
            slice_present,
            bframe_present,
            framerate,
            sequence_header: sequence_header.to_vec(),
            entry_point_header: entry_point_header.to_vec(),
        })
    }
}
