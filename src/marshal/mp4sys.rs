use std::io::{Seek, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::marshal::{
    decode_full_box_header, encode_full_box_header, update_box_header, BoxType, Decode, Encode,
    Error, FourCC, Result,
};

pub mod object_type {
    pub const FORBIDDEN: u8 = 0x00;
    pub const VISUAL_ISO_14496_2: u8 = 0x20;
    pub const AUDIO_ISO_14496_3: u8 = 0x40;
    pub const AUDIO_ISO_13818_7_MAIN: u8 = 0x66;
    pub const AUDIO_ISO_13818_7_LC: u8 = 0x67;
    pub const AUDIO_ISO_13818_7_SSR: u8 = 0x68;
    pub const AUDIO_ISO_13818_3: u8 = 0x69;
    pub const AUDIO_ISO_11172_3: u8 = 0x6B;
}

pub mod stream_type {
    pub const VISUAL: u8 = 0x04;
    pub const AUDIO: u8 = 0x05;
}

const ES_DESCRIPTOR_TAG: u8 = 0x03;
const DECODER_CONFIG_DESCRIPTOR_TAG: u8 = 0x04;
const DECODER_SPECIFIC_INFO_TAG: u8 = 0x05;
const SL_CONFIG_DESCRIPTOR_TAG: u8 = 0x06;

/// Splits one descriptor off `input`, accepting length fields of up to four bytes.
fn next_descriptor<'a>(input: &mut &'a [u8]) -> Result<(u8, &'a [u8])> {
    let tag = input.read_u8()?;
    let mut length = 0usize;
    for _ in 0..4 {
        let byte = input.read_u8()?;
        length = (length << 7) | (byte & 0x7F) as usize;
        if byte & 0x80 == 0 {
            break;
        }
    }
    if length > input.len() {
        return Err(Error::InvalidDescriptor("descriptor overruns its parent"));
    }
    let (payload, remaining_data) = input.split_at(length);
    *input = remaining_data;
    Ok((tag, payload))
}

fn expect_descriptor<'a>(input: &mut &'a [u8], expected: u8) -> Result<&'a [u8]> {
    let (tag, payload) = next_descriptor(input)?;
    if tag != expected {
        return Err(Error::InvalidDescriptor("unexpected descriptor tag"));
    }
    Ok(payload)
}

/// Writes tag and payload, with the length in its shortest form.
fn encode_descriptor(output: &mut impl Write, tag: u8, payload: &[u8]) -> Result<()> {
    let length = payload.len();
    if length >= 1 << 28 {
        return Err(Error::InvalidDescriptor("descriptor too large"));
    }
    output.write_u8(tag)?;
    let mut shift = 21;
    while shift > 0 && length >> shift == 0 {
        shift -= 7;
    }
    while shift > 0 {
        output.write_u8(0x80 | ((length >> shift) & 0x7F) as u8)?;
        shift -= 7;
    }
    output.write_u8((length & 0x7F) as u8)?;
    output.write_all(payload)?;
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// ISO/IEC 14496-1:2010 7.2.6.5
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecoderSpecificInfo(pub Vec<u8>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfigDescriptor {
    pub object_type_indication: u8,
    pub stream_type: u8,
    pub up_stream: bool,
    pub buffer_size_db: u32,
    pub max_bitrate: u32,
    pub avg_bitrate: u32,
    pub decoder_specific_info: Option<DecoderSpecificInfo>,
}

impl Default for DecoderConfigDescriptor {
    fn default() -> Self {
        Self {
            object_type_indication: object_type::FORBIDDEN,
            stream_type: stream_type::AUDIO,
            up_stream: false,
            buffer_size_db: 0,
            max_bitrate: 0,
            avg_bitrate: 0,
            decoder_specific_info: None,
        }
    }
}

impl DecoderConfigDescriptor {
    fn encode_payload(&self) -> Result<Vec<u8>> {
        let mut payload = vec![];
        payload.write_u8(self.object_type_indication)?;
        // streamType(6) upStream(1) reserved(1)
        payload.write_u8((self.stream_type << 2) | ((self.up_stream as u8) << 1) | 1)?;
        payload.write_u24::<BigEndian>(self.buffer_size_db & 0xFF_FFFF)?;
        payload.write_u32::<BigEndian>(self.max_bitrate)?;
        payload.write_u32::<BigEndian>(self.avg_bitrate)?;
        if let Some(info) = &self.decoder_specific_info {
            encode_descriptor(&mut payload, DECODER_SPECIFIC_INFO_TAG, &info.0)?;
        }
        Ok(payload)
    }

    fn decode_payload(mut input: &[u8]) -> Result<Self> {
        let object_type_indication = input.read_u8()?;
        let flags = input.read_u8()?;
        let buffer_size_db = input.read_u24::<BigEndian>()?;
        let max_bitrate = input.read_u32::<BigEndian>()?;
        let avg_bitrate = input.read_u32::<BigEndian>()?;
        let mut decoder_specific_info = None;
        while !input.is_empty() {
            let (tag, payload) = next_descriptor(&mut input)?;
            if tag == DECODER_SPECIFIC_INFO_TAG && decoder_specific_info.is_none() {
                decoder_specific_info = Some(DecoderSpecificInfo(payload.to_vec()));
            }
        }
        Ok(Self {
            object_type_indication,
            stream_type: flags >> 2,
            up_stream: flags & 0x02 != 0,
            buffer_size_db,
            max_bitrate,
            avg_bitrate,
            decoder_specific_info,
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// ISO/IEC 14496-1:2010 7.2.6.8
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlConfigDescriptor {
    pub predefined: u8,
    /// Custom fields following `predefined == 0`.
    pub custom: Vec<u8>,
}

impl Default for SlConfigDescriptor {
    fn default() -> Self {
        // Reserved for use in MP4 files
        Self {
            predefined: 2,
            custom: vec![],
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// ISO/IEC 14496-1:2010 7.2.6.5
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EsDescriptor {
    pub es_id: u16,
    pub stream_priority: u8,
    pub depends_on_es_id: Option<u16>,
    pub url: Option<String>,
    pub ocr_es_id: Option<u16>,
    pub decoder_config: DecoderConfigDescriptor,
    pub sl_config: SlConfigDescriptor,
}

impl EsDescriptor {
    pub fn new(decoder_config: DecoderConfigDescriptor) -> Self {
        Self {
            decoder_config,
            ..Default::default()
        }
    }
}

impl Encode for EsDescriptor {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        let mut payload = vec![];
        payload.write_u16::<BigEndian>(self.es_id)?;
        payload.write_u8(
            (self.depends_on_es_id.is_some() as u8) << 7
                | (self.url.is_some() as u8) << 6
                | (self.ocr_es_id.is_some() as u8) << 5
                | (self.stream_priority & 0x1F),
        )?;
        if let Some(depends_on_es_id) = self.depends_on_es_id {
            payload.write_u16::<BigEndian>(depends_on_es_id)?;
        }
        if let Some(url) = &self.url {
            let length = u8::try_from(url.len())
                .map_err(|_| Error::InvalidDescriptor("URL longer than 255 bytes"))?;
            payload.write_u8(length)?;
            payload.write_all(url.as_bytes())?;
        }
        if let Some(ocr_es_id) = self.ocr_es_id {
            payload.write_u16::<BigEndian>(ocr_es_id)?;
        }
        encode_descriptor(
            &mut payload,
            DECODER_CONFIG_DESCRIPTOR_TAG,
            &self.decoder_config.encode_payload()?,
        )?;
        let mut sl_config = vec![self.sl_config.predefined];
        sl_config.extend_from_slice(&self.sl_config.custom);
        encode_descriptor(&mut payload, SL_CONFIG_DESCRIPTOR_TAG, &sl_config)?;

        encode_descriptor(output, ES_DESCRIPTOR_TAG, &payload)
    }
}

impl Decode for EsDescriptor {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        let mut payload = expect_descriptor(input, ES_DESCRIPTOR_TAG)?;
        let es_id = payload.read_u16::<BigEndian>()?;
        let flags = payload.read_u8()?;
        let depends_on_es_id = if flags & 0x80 != 0 {
            Some(payload.read_u16::<BigEndian>()?)
        } else {
            None
        };
        let url = if flags & 0x40 != 0 {
            let length = payload.read_u8()? as usize;
            if length > payload.len() {
                return Err(Error::InvalidDescriptor("URL overruns ES_Descriptor"));
            }
            let (url, remaining_data) = payload.split_at(length);
            payload = remaining_data;
            Some(String::from_utf8(url.to_vec())?)
        } else {
            None
        };
        let ocr_es_id = if flags & 0x20 != 0 {
            Some(payload.read_u16::<BigEndian>()?)
        } else {
            None
        };

        let mut decoder_config = None;
        let mut sl_config = None;
        while !payload.is_empty() {
            let (tag, data) = next_descriptor(&mut payload)?;
            match tag {
                DECODER_CONFIG_DESCRIPTOR_TAG if decoder_config.is_none() => {
                    decoder_config = Some(DecoderConfigDescriptor::decode_payload(data)?)
                }
                SL_CONFIG_DESCRIPTOR_TAG if sl_config.is_none() => {
                    let (predefined, custom) = data
                        .split_first()
                        .ok_or(Error::InvalidDescriptor("empty SLConfigDescriptor"))?;
                    sl_config = Some(SlConfigDescriptor {
                        predefined: *predefined,
                        custom: custom.to_vec(),
                    })
                }
                _ => {}
            }
        }

        Ok(Self {
            es_id,
            stream_priority: flags & 0x1F,
            depends_on_es_id,
            url,
            ocr_es_id,
            decoder_config: decoder_config.ok_or(Error::MissingDecoderConfig)?,
            sl_config: sl_config.unwrap_or_default(),
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// ISO/IEC 14496-14:2003 5.6
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementaryStreamDescriptorBox {
    pub es: EsDescriptor,
}

impl BoxType for ElementaryStreamDescriptorBox {
    const TYPE: FourCC = FourCC::new(b"esds");
}

impl Encode for ElementaryStreamDescriptorBox {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        let begin = encode_full_box_header(output, Self::TYPE, 0, 0)?;
        self.es.encode(output)?;
        update_box_header(output, begin)
    }
}

impl Decode for ElementaryStreamDescriptorBox {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        decode_full_box_header(input)?;
        Ok(Self {
            es: Decode::decode(input)?,
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// ISO/IEC 14496-3:2009 1.6.2.1
////////////////////////////////////////////////////////////////////////////////////////////////////

pub mod audio_object_type {
    pub const AAC_MAIN: u8 = 1;
    pub const AAC_LC: u8 = 2;
    pub const AAC_SSR: u8 = 3;
    pub const AAC_LTP: u8 = 4;
    pub const SBR: u8 = 5;
    pub const AAC_SCALABLE: u8 = 6;
    pub const TWINVQ: u8 = 7;
    pub const ER_AAC_LC: u8 = 17;
    pub const ER_AAC_LTP: u8 = 19;
    pub const ER_AAC_SCALABLE: u8 = 20;
    pub const ER_TWINVQ: u8 = 21;
    pub const ER_BSAC: u8 = 22;
    pub const ER_AAC_LD: u8 = 23;
    pub const PS: u8 = 29;
    pub const ESCAPE: u8 = 31;
}

const SAMPLING_FREQUENCIES: [u32; 13] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350,
];

type BitReader<'a> = bitstream_io::BitReader<std::io::Cursor<&'a [u8]>, bitstream_io::BigEndian>;

fn read_object_type(reader: &mut BitReader) -> Result<u8> {
    use bitstream_io::BitRead as _;

    let object_type = reader.read::<u8>(5)?;
    Ok(if object_type == audio_object_type::ESCAPE {
        32 + reader.read::<u8>(6)?
    } else {
        object_type
    })
}

fn read_sampling_frequency(reader: &mut BitReader) -> Result<u32> {
    use bitstream_io::BitRead as _;

    let index = reader.read::<u8>(4)?;
    if index == 0xF {
        Ok(reader.read::<u32>(24)?)
    } else {
        SAMPLING_FREQUENCIES
            .get(index as usize)
            .copied()
            .ok_or(Error::InvalidDescriptor("reserved samplingFrequencyIndex"))
    }
}

/// The fields of an AudioSpecificConfig that describe the decoded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpecificConfig {
    pub audio_object_type: u8,
    pub sampling_frequency: u32,
    pub channel_configuration: u8,
    /// Output frequency when SBR or PS is explicitly signalled.
    pub extension_sampling_frequency: Option<u32>,
    pub frame_length_flag: bool,
}

impl AudioSpecificConfig {
    pub fn parse(data: &[u8]) -> Result<Self> {
        use bitstream_io::BitRead as _;

        let mut reader =
            bitstream_io::BitReader::endian(std::io::Cursor::new(data), bitstream_io::BigEndian);
        let mut audio_object_type = read_object_type(&mut reader)?;
        let sampling_frequency = read_sampling_frequency(&mut reader)?;
        let channel_configuration = reader.read::<u8>(4)?;
        let mut extension_sampling_frequency = None;
        if audio_object_type == audio_object_type::SBR || audio_object_type == audio_object_type::PS
        {
            extension_sampling_frequency = Some(read_sampling_frequency(&mut reader)?);
            audio_object_type = read_object_type(&mut reader)?;
        }

        let frame_length_flag = match audio_object_type {
            audio_object_type::AAC_MAIN
            | audio_object_type::AAC_LC
            | audio_object_type::AAC_SSR
            | audio_object_type::AAC_LTP
            | audio_object_type::AAC_SCALABLE
            | audio_object_type::TWINVQ
            | audio_object_type::ER_AAC_LC
            | audio_object_type::ER_AAC_LTP
            | audio_object_type::ER_AAC_SCALABLE
            | audio_object_type::ER_TWINVQ
            | audio_object_type::ER_BSAC
            | audio_object_type::ER_AAC_LD => reader.read_bit()?,
            _ => false,
        };

        Ok(Self {
            audio_object_type,
            sampling_frequency,
            channel_configuration,
            extension_sampling_frequency,
            frame_length_flag,
        })
    }

    pub fn frequency(&self) -> u32 {
        self.extension_sampling_frequency
            .unwrap_or(self.sampling_frequency)
    }

    /// Channel count, `None` when the layout lives in a program config element.
    pub fn channels(&self) -> Option<u32> {
        match self.channel_configuration {
            0 => None,
            7 => Some(8),
            channels => Some(channels as u32),
        }
    }

    pub fn samples_in_frame(&self) -> u32 {
        let core = if self.frame_length_flag { 960 } else { 1024 };
        match self.extension_sampling_frequency {
            Some(frequency) if frequency > self.sampling_frequency => core * 2,
            _ => core,
        }
    }
}
