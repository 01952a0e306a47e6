use std::io::{Seek, Write};

use crate::marshal::{
    encode_box_header, update_box_header, BoxType, Decode, Encode, Error, FourCC, Result,
};

////////////////////////////////////////////////////////////////////////////////////////////////////
// ETSI TS 102 366 F.4
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ac3SpecificBox {
    pub fscod: u8,
    pub bsid: u8,
    pub bsmod: u8,
    pub acmod: u8,
    pub lfeon: bool,
    pub bit_rate_code: u8,
}

impl BoxType for Ac3SpecificBox {
    const TYPE: FourCC = FourCC::new(b"dac3");
}

impl Encode for Ac3SpecificBox {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        use bitstream_io::BitWrite as _;

        let mut fields = Vec::with_capacity(3);
        let mut writer = bitstream_io::BitWriter::endian(&mut fields, bitstream_io::BigEndian);
        writer.write(2, self.fscod & 0x3)?;
        writer.write(5, self.bsid & 0x1F)?;
        writer.write(3, self.bsmod & 0x7)?;
        writer.write(3, self.acmod & 0x7)?;
        writer.write_bit(self.lfeon)?;
        writer.write(5, self.bit_rate_code & 0x1F)?;
        writer.write(5, 0u8)?; // reserved
        writer.byte_align()?;

        let begin = encode_box_header(output, Self::TYPE)?;
        output.write_all(&fields)?;
        update_box_header(output, begin)
    }
}

impl Decode for Ac3SpecificBox {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        use bitstream_io::BitRead as _;

        let mut reader = bitstream_io::BitReader::endian(&mut *input, bitstream_io::BigEndian);
        Ok(Self {
            fscod: reader.read(2)?,
            bsid: reader.read(5)?,
            bsmod: reader.read(3)?,
            acmod: reader.read(3)?,
            lfeon: reader.read_bit()?,
            bit_rate_code: reader.read(5)?,
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// ETSI TS 102 366 F.6
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Eac3Substream {
    pub fscod: u8,
    pub bsid: u8,
    pub asvc: bool,
    pub bsmod: u8,
    pub acmod: u8,
    pub lfeon: bool,
    pub num_dep_sub: u8,
    /// Only meaningful when `num_dep_sub` is non-zero.
    pub chan_loc: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Eac3SpecificBox {
    pub data_rate: u16,
    pub independent_substreams: Vec<Eac3Substream>,
}

impl BoxType for Eac3SpecificBox {
    const TYPE: FourCC = FourCC::new(b"dec3");
}

impl Encode for Eac3SpecificBox {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        use bitstream_io::BitWrite as _;

        let count = self.independent_substreams.len();
        if count == 0 || count > 8 {
            return Err(Error::InvalidPayload(
                Self::TYPE,
                "1 to 8 independent substreams required",
            ));
        }

        let mut fields = vec![];
        let mut writer = bitstream_io::BitWriter::endian(&mut fields, bitstream_io::BigEndian);
        writer.write(13, self.data_rate & 0x1FFF)?;
        writer.write(3, (count - 1) as u8)?;
        for substream in &self.independent_substreams {
            writer.write(2, substream.fscod & 0x3)?;
            writer.write(5, substream.bsid & 0x1F)?;
            writer.write(1, 0u8)?; // reserved
            writer.write_bit(substream.asvc)?;
            writer.write(3, substream.bsmod & 0x7)?;
            writer.write(3, substream.acmod & 0x7)?;
            writer.write_bit(substream.lfeon)?;
            writer.write(3, 0u8)?; // reserved
            writer.write(4, substream.num_dep_sub & 0xF)?;
            if substream.num_dep_sub > 0 {
                writer.write(9, substream.chan_loc & 0x1FF)?;
            } else {
                writer.write(1, 0u8)?; // reserved
            }
        }
        writer.byte_align()?;

        let begin = encode_box_header(output, Self::TYPE)?;
        output.write_all(&fields)?;
        update_box_header(output, begin)
    }
}

impl Decode for Eac3SpecificBox {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        use bitstream_io::BitRead as _;

        let mut reader = bitstream_io::BitReader::endian(&mut *input, bitstream_io::BigEndian);
        let data_rate = reader.read::<u16>(13)?;
        let count = reader.read::<u8>(3)? + 1;
        let mut independent_substreams = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let fscod = reader.read(2)?;
            let bsid = reader.read(5)?;
            reader.skip(1)?; // reserved
            let asvc = reader.read_bit()?;
            let bsmod = reader.read(3)?;
            let acmod = reader.read(3)?;
            let lfeon = reader.read_bit()?;
            reader.skip(3)?; // reserved
            let num_dep_sub = reader.read::<u8>(4)?;
            let chan_loc = if num_dep_sub > 0 {
                reader.read::<u16>(9)?
            } else {
                reader.skip(1)?; // reserved
                0
            };
            independent_substreams.push(Eac3Substream {
                fscod,
                bsid,
                asvc,
                bsmod,
                acmod,
                lfeon,
                num_dep_sub,
                chan_loc,
            });
        }
        Ok(Self {
            data_rate,
            independent_substreams,
        })
    }
}
