use std::{
    fmt::{Debug, Display, Formatter},
    io::{Seek, SeekFrom, Write},
    str::FromStr,
};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use fixed::types::U16F16;
use thiserror::Error;

pub mod ac3;
pub mod avc;
pub mod dts;
pub mod mp4sys;
pub mod qt;
pub mod vc1;

/// size + type
pub const BASEBOX_COMMON_SIZE: usize = 8;
/// size + type + version + flags
pub const FULLBOX_COMMON_SIZE: usize = 12;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Invalid {box_type:?} box size: {size}, expected: {expected}")]
    InvalidBoxSize {
        box_type: FourCC,
        size: u64,
        expected: u64,
    },

    #[error("Corrupt box structure at offset {offset}")]
    CorruptBox { offset: usize },

    #[error("Unexpected box type: {actual:?}, expected: {expected:?}")]
    UnexpectedBoxType { actual: FourCC, expected: FourCC },

    #[error("No {to:?} conversion for {data_type:?}")]
    UnsupportedConversion {
        data_type: crate::specific::CodecSpecificDataType,
        to: crate::specific::CodecSpecificFormat,
    },

    #[error("Unsupported codec specific data: {0:?}")]
    UnsupportedDescriptor(crate::specific::CodecSpecificDataType),

    #[error("Summary for {0:?} lacks its required codec specific data")]
    InvalidSummary(FourCC),

    #[error("Frame size {width}x{height} does not fit a sample entry")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Unsupported objectTypeIndication: {0:#04x}")]
    UnsupportedObjectType(u8),

    #[error("Missing MPEG-4 systems decoder configuration")]
    MissingDecoderConfig,

    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(&'static str),

    #[error("Invalid {0:?} payload: {1}")]
    InvalidPayload(FourCC, &'static str),

    #[error("Zero denominator in rational")]
    ZeroDenominator,

    #[error("Rational out of range")]
    RationalOutOfRange,

    #[error("Invalid UTF-8 string")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, Error>;

pub trait Encode {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()>;
}

pub trait Decode: Sized {
    fn decode(input: &mut &[u8]) -> Result<Self>;
}

impl Encode for u8 {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        output.write_u8(*self)?;
        Ok(())
    }
}

impl Decode for u8 {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        Ok(input.read_u8()?)
    }
}

impl Encode for u16 {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        output.write_u16::<BigEndian>(*self)?;
        Ok(())
    }
}

impl Decode for u16 {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        Ok(input.read_u16::<BigEndian>()?)
    }
}

impl Encode for i16 {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        output.write_i16::<BigEndian>(*self)?;
        Ok(())
    }
}

impl Decode for i16 {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        Ok(input.read_i16::<BigEndian>()?)
    }
}

impl Encode for u32 {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        output.write_u32::<BigEndian>(*self)?;
        Ok(())
    }
}

impl Decode for u32 {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        Ok(input.read_u32::<BigEndian>()?)
    }
}

impl Encode for i32 {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        output.write_i32::<BigEndian>(*self)?;
        Ok(())
    }
}

impl Decode for i32 {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        Ok(input.read_i32::<BigEndian>()?)
    }
}

impl Encode for U16F16 {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        output.write_u32::<BigEndian>(self.to_bits())?;
        Ok(())
    }
}

impl Decode for U16F16 {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        Ok(Self::from_bits(input.read_u32::<BigEndian>()?))
    }
}

impl Encode for u64 {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        output.write_u64::<BigEndian>(*self)?;
        Ok(())
    }
}

impl Decode for u64 {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        Ok(input.read_u64::<BigEndian>()?)
    }
}

impl Encode for f64 {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        output.write_f64::<BigEndian>(*self)?;
        Ok(())
    }
}

impl Decode for f64 {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        Ok(input.read_f64::<BigEndian>()?)
    }
}

impl Encode for FourCC {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        self.0.encode(output)
    }
}

impl Decode for FourCC {
    fn decode(input: &mut &[u8]) -> Result<Self> {
        Ok(Self(Decode::decode(input)?))
    }
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FourCC(pub u32);

impl FourCC {
    pub const fn new(bytes: &[u8; 4]) -> Self {
        Self(u32::from_be_bytes(*bytes))
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl Debug for FourCC {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let bytes = self.to_bytes();
        if bytes.iter().all(|c| c.is_ascii_graphic() || *c == b' ') {
            f.write_str(&String::from_utf8_lossy(&bytes))
        } else {
            write!(f, "{:#010x}", self.0)
        }
    }
}

impl Display for FourCC {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl FromStr for FourCC {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let bytes: [u8; 4] = s.as_bytes().try_into().map_err(|_| ())?;
        Ok(Self::new(&bytes))
    }
}

pub fn encode_box_header(output: &mut (impl Write + Seek), r#type: FourCC) -> Result<u64> {
    let begin = output.stream_position()?;
    0u32.encode(output)?; // size
    r#type.encode(output)?;
    Ok(begin)
}

pub fn encode_full_box_header(
    output: &mut (impl Write + Seek),
    r#type: FourCC,
    version: u8,
    flags: u32,
) -> Result<u64> {
    let begin = encode_box_header(output, r#type)?;
    output.write_u8(version)?;
    output.write_u24::<BigEndian>(flags)?;
    Ok(begin)
}

pub fn update_box_header(output: &mut (impl Write + Seek), begin: u64) -> Result<()> {
    let end = output.stream_position()?;
    let size = end - begin;
    output.seek(SeekFrom::Start(begin))?;
    (size as u32).encode(output)?;
    output.seek(SeekFrom::Start(end))?;
    Ok(())
}

/// Reads version and flags of a full box body.
pub fn decode_full_box_header(input: &mut &[u8]) -> Result<(u8, u32)> {
    let version = input.read_u8()?;
    let flags = input.read_u24::<BigEndian>()?;
    Ok((version, flags))
}

/// A box with a fixed type whose [`Decode`] impl reads the body that follows the header.
pub trait BoxType {
    const TYPE: FourCC;
}

/// Decodes a complete serialized box, which must fill `data` exactly.
pub fn decode_box<T: BoxType + Decode>(data: &[u8]) -> Result<T> {
    let mut body = BoxHeader::split_expect(data, T::TYPE)?;
    T::decode(&mut body)
}

/// Encodes `value` into a fresh buffer holding exactly one box.
pub fn encode_to_vec(value: &impl Encode) -> Result<Vec<u8>> {
    let mut output = std::io::Cursor::new(Vec::new());
    value.encode(&mut output)?;
    Ok(output.into_inner())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxHeader {
    pub size: u64,
    pub r#type: FourCC,
    pub header_size: usize,
}

impl BoxHeader {
    /// Reads the header at the start of `data`, following the 64-bit size form when the 32-bit
    /// size field is 1.
    pub fn read(data: &[u8]) -> Result<Self> {
        let mut input = data;
        let size = u32::decode(&mut input)?;
        let r#type = FourCC::decode(&mut input)?;
        if size == 1 {
            let size = u64::decode(&mut input)?;
            Ok(Self {
                size,
                r#type,
                header_size: BASEBOX_COMMON_SIZE + 8,
            })
        } else {
            Ok(Self {
                size: size as u64,
                r#type,
                header_size: BASEBOX_COMMON_SIZE,
            })
        }
    }

    /// Reads the header of a box which must occupy `data` exactly, returning the header and body.
    pub fn split(data: &[u8]) -> Result<(Self, &[u8])> {
        let header = Self::read(data)?;
        if header.size != data.len() as u64 || header.size < header.header_size as u64 {
            return Err(Error::InvalidBoxSize {
                box_type: header.r#type,
                size: header.size,
                expected: data.len() as u64,
            });
        }
        Ok((header, &data[header.header_size..]))
    }

    /// Same as [`BoxHeader::split`] but also checks the box type.
    pub fn split_expect(data: &[u8], expected: FourCC) -> Result<&[u8]> {
        let (header, body) = Self::split(data)?;
        if header.r#type != expected {
            return Err(Error::UnexpectedBoxType {
                actual: header.r#type,
                expected,
            });
        }
        Ok(body)
    }
}

/// Takes the next complete box off the front of `input`, header included.
pub fn next_box<'a>(input: &mut &'a [u8]) -> Result<(BoxHeader, &'a [u8])> {
    let header = BoxHeader::read(input)?;
    if header.size < header.header_size as u64 || header.size > input.len() as u64 {
        return Err(Error::InvalidBoxSize {
            box_type: header.r#type,
            size: header.size,
            expected: input.len() as u64,
        });
    }
    let (data, remaining_data) = input.split_at(header.size as usize);
    *input = remaining_data;
    Ok((header, data))
}

/// Box type of a serialized box, if `data` is long enough to hold a header.
pub fn box_type_of(data: &[u8]) -> Option<FourCC> {
    let bytes: [u8; 4] = data.get(4..8)?.try_into().ok()?;
    Some(FourCC::new(&bytes))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildBox {
    pub offset: usize,
    pub size: usize,
}

impl ChildBox {
    pub fn slice<'a>(&self, parent: &'a [u8]) -> &'a [u8] {
        &parent[self.offset..self.offset + self.size]
    }
}

/// Finds the first direct child of type `child_type` inside the serialized box `parent`.
///
/// `Ok(None)` when no child matches or the parent's own header is truncated or mis-sized.
/// Children whose size cannot advance the walk or that overrun the parent are an error.
pub fn locate_child_box(parent: &[u8], child_type: FourCC) -> Result<Option<ChildBox>> {
    if parent.len() < BASEBOX_COMMON_SIZE {
        return Ok(None);
    }
    let Ok(header) = BoxHeader::read(parent) else {
        tracing::debug!(length = parent.len(), "parent box header truncated");
        return Ok(None);
    };
    if header.size != parent.len() as u64 {
        tracing::debug!(
            r#type = ?header.r#type,
            size = header.size,
            length = parent.len(),
            "parent box size mismatch"
        );
        return Ok(None);
    }

    let mut offset = header.header_size;
    while offset + BASEBOX_COMMON_SIZE <= parent.len() {
        let child = BoxHeader::read(&parent[offset..]).map_err(|_| Error::CorruptBox { offset })?;
        if child.size < child.header_size as u64
            || child.size > (parent.len() - offset) as u64
        {
            return Err(Error::CorruptBox { offset });
        }
        let size = child.size as usize;
        if child.r#type == child_type {
            return Ok(Some(ChildBox { offset, size }));
        }
        offset += size;
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_box(r#type: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut data = ((BASEBOX_COMMON_SIZE + body.len()) as u32).to_be_bytes().to_vec();
        data.extend_from_slice(r#type);
        data.extend_from_slice(body);
        data
    }

    #[test]
    fn read_large_header() {
        let mut data = 1u32.to_be_bytes().to_vec();
        data.extend_from_slice(b"glbl");
        data.extend_from_slice(&20u64.to_be_bytes());
        data.extend_from_slice(&[1, 2, 3, 4]);

        let (header, body) = BoxHeader::split(&data).unwrap();
        assert_eq!(header.size, 20);
        assert_eq!(header.header_size, 16);
        assert_eq!(header.r#type, FourCC::new(b"glbl"));
        assert_eq!(body, &[1, 2, 3, 4]);
    }

    #[test]
    fn split_rejects_size_mismatch() {
        let mut data = simple_box(b"glbl", &[0; 4]);
        data.push(0);
        assert!(matches!(
            BoxHeader::split(&data),
            Err(Error::InvalidBoxSize { .. })
        ));
    }

    #[test]
    fn locate_child_among_siblings() {
        let frma = simple_box(b"frma", b"mp4a");
        let unknown = simple_box(b"xxxx", &[9; 7]);
        let esds = simple_box(b"esds", &[0; 6]);
        let mut body = frma.clone();
        body.extend_from_slice(&unknown);
        body.extend_from_slice(&esds);
        let wave = simple_box(b"wave", &body);

        let child = locate_child_box(&wave, FourCC::new(b"esds")).unwrap().unwrap();
        assert_eq!(child.offset, 8 + frma.len() + unknown.len());
        assert_eq!(child.size, esds.len());
        assert_eq!(child.slice(&wave), esds.as_slice());

        assert_eq!(locate_child_box(&wave, FourCC::new(b"enda")).unwrap(), None);
    }

    #[test]
    fn locate_child_in_mismatched_parent() {
        let mut wave = simple_box(b"wave", &simple_box(b"esds", &[]));
        wave[3] += 1;
        assert_eq!(locate_child_box(&wave, FourCC::new(b"esds")).unwrap(), None);
    }

    #[test]
    fn locate_child_in_truncated_large_parent() {
        let mut wave = 1u32.to_be_bytes().to_vec();
        wave.extend_from_slice(b"wave");
        wave.extend_from_slice(&[0, 0, 0, 0]);
        assert_eq!(locate_child_box(&wave, FourCC::new(b"esds")).unwrap(), None);
    }

    #[test]
    fn locate_child_rejects_non_advancing_size() {
        let mut body = simple_box(b"frma", b"mp4a");
        body.extend_from_slice(&[0, 0, 0, 0]);
        body.extend_from_slice(b"zero");
        let wave = simple_box(b"wave", &body);
        assert!(matches!(
            locate_child_box(&wave, FourCC::new(b"esds")),
            Err(Error::CorruptBox { offset: 20 })
        ));
    }

    #[test]
    fn locate_child_rejects_overrun() {
        let mut body = 64u32.to_be_bytes().to_vec();
        body.extend_from_slice(b"esds");
        let wave = simple_box(b"wave", &body);
        assert!(matches!(
            locate_child_box(&wave, FourCC::new(b"esds")),
            Err(Error::CorruptBox { offset: 8 })
        ));
    }
}
