use std::io::{Seek, Write};

use crate::marshal::{
    box_type_of,
    mp4sys::ElementaryStreamDescriptorBox,
    qt::{
        BitRateBox, ChannelLayoutBox, CleanApertureBox, ColorParameterBox, ColorSpaceBox,
        DecompressionParamBox, FieldInfoBox, GammaLevelBox, GlobalHeaderBox, PixelAspectRatioBox,
        SamplingScaleBox, SignificantBitsBox,
    },
    BoxType, Encode, Error, FourCC, Result, BASEBOX_COMMON_SIZE,
};

/// A child box of a sample entry held in its typed form.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionBox {
    SampleScale(SamplingScaleBox),
    BitRate(BitRateBox),
    FieldInfo(FieldInfoBox),
    ColorSpace(ColorSpaceBox),
    SignificantBits(SignificantBitsBox),
    GammaLevel(GammaLevelBox),
    GlobalHeader(GlobalHeaderBox),
    CleanAperture(CleanApertureBox),
    PixelAspectRatio(PixelAspectRatioBox),
    ColorParameter(ColorParameterBox),
    ChannelLayout(ChannelLayoutBox),
    ElementaryStreamDescriptor(ElementaryStreamDescriptorBox),
    DecompressionParam(DecompressionParamBox),
}

impl ExtensionBox {
    pub fn box_type(&self) -> FourCC {
        match self {
            Self::SampleScale(_) => SamplingScaleBox::TYPE,
            Self::BitRate(_) => BitRateBox::TYPE,
            Self::FieldInfo(_) => FieldInfoBox::TYPE,
            Self::ColorSpace(_) => ColorSpaceBox::TYPE,
            Self::SignificantBits(_) => SignificantBitsBox::TYPE,
            Self::GammaLevel(_) => GammaLevelBox::TYPE,
            Self::GlobalHeader(_) => GlobalHeaderBox::TYPE,
            Self::CleanAperture(_) => CleanApertureBox::TYPE,
            Self::PixelAspectRatio(_) => PixelAspectRatioBox::TYPE,
            Self::ColorParameter(_) => ColorParameterBox::TYPE,
            Self::ChannelLayout(_) => ChannelLayoutBox::TYPE,
            Self::ElementaryStreamDescriptor(_) => ElementaryStreamDescriptorBox::TYPE,
            Self::DecompressionParam(_) => DecompressionParamBox::TYPE,
        }
    }
}

impl Encode for ExtensionBox {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        match self {
            Self::SampleScale(stsl) => stsl.encode(output),
            Self::BitRate(btrt) => btrt.encode(output),
            Self::FieldInfo(fiel) => fiel.encode(output),
            Self::ColorSpace(cspc) => cspc.encode(output),
            Self::SignificantBits(sgbt) => sgbt.encode(output),
            Self::GammaLevel(gama) => gama.encode(output),
            Self::GlobalHeader(glbl) => glbl.encode(output),
            Self::CleanAperture(clap) => clap.encode(output),
            Self::PixelAspectRatio(pasp) => pasp.encode(output),
            Self::ColorParameter(colr) => colr.encode(output),
            Self::ChannelLayout(chan) => chan.encode(output),
            Self::ElementaryStreamDescriptor(esds) => esds.encode(output),
            Self::DecompressionParam(wave) => wave.encode(output),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extension {
    Typed(ExtensionBox),
    /// A complete box, header included, that is carried without interpretation.
    Binary { box_type: FourCC, data: Vec<u8> },
}

impl Extension {
    /// Wraps the bytes of a serialized box, taking the type from its header.
    pub fn binary(data: Vec<u8>) -> Result<Self> {
        let box_type = box_type_of(&data).ok_or(Error::InvalidBoxSize {
            box_type: FourCC::default(),
            size: data.len() as u64,
            expected: BASEBOX_COMMON_SIZE as u64,
        })?;
        Ok(Self::Binary { box_type, data })
    }

    pub fn box_type(&self) -> FourCC {
        match self {
            Self::Typed(typed) => typed.box_type(),
            Self::Binary { box_type, .. } => *box_type,
        }
    }
}

impl Encode for Extension {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        match self {
            Self::Typed(typed) => typed.encode(output),
            Self::Binary { data, .. } => {
                output.write_all(data)?;
                Ok(())
            }
        }
    }
}

/// Child boxes of a sample entry in emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtensionList(Vec<Extension>);

impl ExtensionList {
    pub fn append(&mut self, typed: ExtensionBox) {
        self.0.push(Extension::Typed(typed));
    }

    pub fn push(&mut self, extension: Extension) {
        self.0.push(extension);
    }

    pub fn insert(&mut self, index: usize, extension: Extension) {
        self.0.insert(index, extension);
    }

    /// First extension of `box_type` in either form.
    pub fn find(&self, box_type: FourCC) -> Option<&Extension> {
        self.0.iter().find(|extension| extension.box_type() == box_type)
    }

    /// First typed extension of `box_type`; binary ones are skipped.
    pub fn find_box(&self, box_type: FourCC) -> Option<&ExtensionBox> {
        self.0.iter().find_map(|extension| match extension {
            Extension::Typed(typed) if typed.box_type() == box_type => Some(typed),
            _ => None,
        })
    }

    pub fn find_box_mut(&mut self, box_type: FourCC) -> Option<&mut ExtensionBox> {
        self.0.iter_mut().find_map(|extension| match extension {
            Extension::Typed(typed) if typed.box_type() == box_type => Some(typed),
            _ => None,
        })
    }

    pub fn find_binary(&self, box_type: FourCC) -> Option<&[u8]> {
        self.0.iter().find_map(|extension| match extension {
            Extension::Binary {
                box_type: binary_type,
                data,
            } if *binary_type == box_type => Some(data.as_slice()),
            _ => None,
        })
    }

    pub fn find_binary_mut(&mut self, box_type: FourCC) -> Option<&mut Vec<u8>> {
        self.0.iter_mut().find_map(|extension| match extension {
            Extension::Binary {
                box_type: binary_type,
                data,
            } if *binary_type == box_type => Some(data),
            _ => None,
        })
    }

    /// Removes the first extension of `box_type`, returning it.
    pub fn remove(&mut self, box_type: FourCC) -> Option<Extension> {
        let index = self
            .0
            .iter()
            .position(|extension| extension.box_type() == box_type)?;
        Some(self.0.remove(index))
    }

    pub fn remove_all(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Extension> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a ExtensionList {
    type Item = &'a Extension;
    type IntoIter = std::slice::Iter<'a, Extension>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Encode for ExtensionList {
    fn encode(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        for extension in &self.0 {
            extension.encode(output)?;
        }
        Ok(())
    }
}
