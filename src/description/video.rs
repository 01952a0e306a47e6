use fixed::types::U16F16;

use crate::{
    codec,
    description::{box_bytes, materialize, opaque_binary, structured_data},
    entry::{SampleEntry, TrackContext, VisualSampleEntry},
    extension::{Extension, ExtensionBox},
    marshal::{
        encode_to_vec,
        qt::{
            ApertureDimensions, CleanApertureBox, ColorParameterBox, ColorParameters,
            PixelAspectRatioBox, SamplingScaleBox, TrackApertureBox,
        },
        BoxType, Error, Result,
    },
    rational::{CleanAperture, RationalS32, RationalU32},
    specific::{
        CodecSpecific, CodecSpecificData, CodecSpecificDataType, QtVideoCommon, StructuredData,
    },
    summary::{self, ColorSummary, VideoSummary},
};

const PRIMARIES_INDEX_UNSPECIFIED: u16 = 2;
const TRANSFER_INDEX_UNSPECIFIED: u16 = 2;
const MATRIX_INDEX_UNSPECIFIED: u16 = 2;

/// Builds a visual sample entry from `summary` and appends it to the track's sample
/// descriptions, returning its number.
///
/// Under QuickTime the track aperture dimensions are filled in when the track already carries a
/// complete `tapt`, the entry is the first one and no scaling conflicts with it. Otherwise the
/// `tapt` is dropped.
pub fn build_visual_description(context: &mut TrackContext, summary: &VideoSummary) -> Result<usize> {
    let sample_type = summary.sample_type;
    if !summary::is_valid(sample_type, false, &summary.opaque) {
        return Err(Error::InvalidSummary(sample_type));
    }
    let (Ok(width), Ok(height)) = (u16::try_from(summary.width), u16::try_from(summary.height))
    else {
        return Err(Error::InvalidDimensions {
            width: summary.width,
            height: summary.height,
        });
    };

    let mut visual = VisualSampleEntry::new(sample_type);
    visual.width = width;
    visual.height = height;
    if codec::is_qt_video(sample_type) || codec::is_avc(sample_type) {
        visual.depth = summary.depth;
    }
    visual.compressorname = if summary.compressorname[0] == 0 {
        codec::default_compressor_name_field(sample_type)
    } else {
        summary.compressorname
    };
    for specific in &summary.opaque {
        apply_codec_specific(&mut visual, specific)?;
    }

    let qt_compatible = context.qt_compatible;
    let scaling_compatible = match visual.extensions.find_box(SamplingScaleBox::TYPE) {
        Some(ExtensionBox::SampleScale(stsl)) => stsl.scale_method == 0,
        _ => true,
    };
    let aperture_modes = qt_compatible
        && scaling_compatible
        && context
            .aperture
            .as_ref()
            .is_some_and(TrackApertureBox::is_complete)
        && context.description.entries.is_empty();
    let uncompressed_ycbcr = qt_compatible && codec::is_uncompressed_ycbcr(sample_type);

    let clap = if summary.clap.is_specified() {
        summary.clap
    } else {
        CleanAperture {
            width: RationalU32::new(summary.width, 1),
            height: RationalU32::new(summary.height, 1),
            horizontal_offset: RationalS32::new(0, 1),
            vertical_offset: RationalS32::new(0, 1),
        }
    };
    if aperture_modes || uncompressed_ycbcr || summary.clap.is_specified() {
        visual
            .extensions
            .append(ExtensionBox::CleanAperture(CleanApertureBox(clap)));
    }

    let pasp = PixelAspectRatioBox {
        h_spacing: summary.par_h.max(1),
        v_spacing: summary.par_v.max(1),
    };
    if aperture_modes || (summary.par_h != 0 && summary.par_v != 0) {
        visual.extensions.append(ExtensionBox::PixelAspectRatio(pasp));
    }

    let color = summary.color;
    if qt_compatible && (uncompressed_ycbcr || color != ColorSummary::default()) {
        visual
            .extensions
            .append(ExtensionBox::ColorParameter(ColorParameterBox(ColorParameters::Nclc {
                primaries_index: match color.primaries_index {
                    1 | 5 | 6 => color.primaries_index,
                    _ => PRIMARIES_INDEX_UNSPECIFIED,
                },
                transfer_function_index: match color.transfer_index {
                    1 | 7 => color.transfer_index,
                    _ => TRANSFER_INDEX_UNSPECIFIED,
                },
                matrix_index: match color.matrix_index {
                    1 | 6 | 7 => color.matrix_index,
                    _ => MATRIX_INDEX_UNSPECIFIED,
                },
            })));
    }

    if aperture_modes {
        context.aperture = Some(track_aperture(width, height, &clap, &pasp));
    } else if context.aperture.take().is_some() {
        tracing::debug!(%sample_type, "track aperture modes disabled, removing tapt");
    }
    context.description.entries.push(SampleEntry::Visual(visual));
    Ok(context.description.entries.len())
}

fn apply_codec_specific(visual: &mut VisualSampleEntry, specific: &CodecSpecific) -> Result<()> {
    use CodecSpecificDataType as Kind;

    match (specific.data_type(), specific.data()) {
        (Kind::Unknown, CodecSpecificData::Structured(_)) => {
            tracing::debug!("skipping structured codec specific data of unknown kind");
        }
        (
            Kind::QtVideoCommon,
            CodecSpecificData::Structured(StructuredData::QtVideoCommon(common)),
        ) => {
            visual.revision_level = common.revision_level;
            visual.vendor = common.vendor;
            visual.temporal_quality = common.temporal_quality;
            visual.spatial_quality = common.spatial_quality;
            visual.horizresolution = common.horizontal_resolution;
            visual.vertresolution = common.vertical_resolution;
            visual.data_size = common.data_size;
            visual.frame_count = common.frame_count;
            visual.color_table_id = common.color_table_id;
        }
        (Kind::QtVideoCommon, _) => {}
        (
            Kind::SampleScale
            | Kind::H264Bitrate
            | Kind::QtVideoFieldInfo
            | Kind::QtVideoPixelFormat
            | Kind::QtVideoSignificantBits
            | Kind::QtVideoGammaLevel
            | Kind::CodecGlobalHeader,
            _,
        ) => {
            if let Some(typed) = materialize(specific)? {
                visual.extensions.append(typed);
            }
        }
        _ => visual.extensions.push(Extension::binary(box_bytes(specific)?)?),
    }
    Ok(())
}

fn track_aperture(
    width: u16,
    height: u16,
    clap: &CleanAperture,
    pasp: &PixelAspectRatioBox,
) -> TrackApertureBox {
    let width = ((width as u32) << 16) as f64;
    let height = ((height as u32) << 16) as f64;
    // The ratio is rounded before scaling; outputs must stay bit-identical.
    let clap_width = (clap.width.n as f64 / clap.width.d as f64) * 65536.0;
    let clap_height = (clap.height.n as f64 / clap.height.d as f64) * 65536.0;
    let par = pasp.h_spacing as f64 / pasp.v_spacing as f64;

    let dimensions = |width: f64, height: f64| ApertureDimensions {
        width: U16F16::from_bits(width as u32),
        height: U16F16::from_bits(height as u32),
    };
    let (clean, production) = if par >= 1.0 {
        (
            dimensions(clap_width * par, clap_height),
            dimensions(width * par, height),
        )
    } else {
        (
            dimensions(clap_width, clap_height / par),
            dimensions(width, height / par),
        )
    };
    TrackApertureBox {
        clean: Some(clean),
        production: Some(production),
        encoded_pixels: Some(dimensions(width, height)),
    }
}

/// Reads a visual sample entry back into a summary.
pub fn video_summary_from_entry(visual: &VisualSampleEntry) -> Result<VideoSummary> {
    let mut summary = VideoSummary {
        sample_type: visual.r#type,
        width: visual.width as u32,
        height: visual.height as u32,
        depth: visual.depth,
        compressorname: visual.compressorname,
        ..Default::default()
    };
    if codec::is_qt_video(visual.r#type) {
        summary
            .opaque
            .add(CodecSpecific::structured(StructuredData::QtVideoCommon(QtVideoCommon {
                revision_level: visual.revision_level,
                vendor: visual.vendor,
                temporal_quality: visual.temporal_quality,
                spatial_quality: visual.spatial_quality,
                horizontal_resolution: visual.horizresolution,
                vertical_resolution: visual.vertresolution,
                data_size: visual.data_size,
                frame_count: visual.frame_count,
                color_table_id: visual.color_table_id,
            })));
    }

    for extension in &visual.extensions {
        let Extension::Typed(typed) = extension else {
            summary.opaque.extend(opaque_binary(extension));
            continue;
        };
        match typed {
            ExtensionBox::CleanAperture(clap) => summary.clap = clap.0,
            ExtensionBox::PixelAspectRatio(pasp) => {
                summary.par_h = pasp.h_spacing;
                summary.par_v = pasp.v_spacing;
            }
            ExtensionBox::ColorParameter(colr) => match colr.indices() {
                Some((primaries_index, transfer_index, matrix_index)) => {
                    summary.color = ColorSummary {
                        primaries_index,
                        transfer_index,
                        matrix_index,
                    }
                }
                // ICC profiles have no summary field.
                None => summary.opaque.add(CodecSpecific::unstructured(
                    CodecSpecificDataType::Unknown,
                    encode_to_vec(colr)?,
                )),
            },
            _ => summary
                .opaque
                .extend(structured_data(typed).map(CodecSpecific::structured)),
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use fixed_macro::types::U16F16;

    use super::*;
    use crate::{
        codec::video,
        marshal::{
            qt::{FieldInfoBox, SignificantBitsBox},
            FourCC,
        },
        specific::CodecSpecificFormat,
    };

    fn avc_summary() -> VideoSummary {
        let mut summary = VideoSummary::new(video::AVC1, 1920, 1080);
        summary.opaque.add(CodecSpecific::unstructured(
            CodecSpecificDataType::H264,
            vec![0, 0, 0, 11, b'a', b'v', b'c', b'C', 1, 0x64, 0],
        ));
        summary
    }

    #[test]
    fn rejects_invalid_summary() {
        let mut context = TrackContext::default();
        let summary = VideoSummary::new(video::AVC1, 1920, 1080);
        assert!(matches!(
            build_visual_description(&mut context, &summary),
            Err(Error::InvalidSummary(video::AVC1))
        ));
        assert!(context.description.entries.is_empty());
    }

    #[test]
    fn rejects_oversized_frame() {
        let mut context = TrackContext::default();
        let mut summary = avc_summary();
        summary.width = 70000;
        assert!(matches!(
            build_visual_description(&mut context, &summary),
            Err(Error::InvalidDimensions { width: 70000, .. })
        ));
    }

    #[test]
    fn iso_avc_entry() {
        let mut context = TrackContext::default();
        let mut summary = avc_summary();
        summary.depth = 0x20;
        summary.par_h = 4;
        summary.par_v = 3;
        assert_eq!(build_visual_description(&mut context, &summary).unwrap(), 1);

        let SampleEntry::Visual(visual) = &context.description.entries[0] else {
            panic!("expected a visual entry");
        };
        assert_eq!(visual.depth, 0x20);
        assert_eq!(&visual.compressorname[..11], b"\x0aAVC Coding");
        let types: Vec<_> = visual.extensions.iter().map(Extension::box_type).collect();
        assert_eq!(types, [FourCC::new(b"avcC"), FourCC::new(b"pasp")]);
        assert!(visual.extensions.find_box(ColorParameterBox::TYPE).is_none());
    }

    #[test]
    fn quicktime_uncompressed_ycbcr_gets_clap_and_colr() {
        let mut context = TrackContext::quicktime();
        let mut summary = VideoSummary::new(video::V210, 1920, 1080);
        summary.depth = 0x18;
        summary.color = ColorSummary {
            primaries_index: 1,
            transfer_index: 4,
            matrix_index: 6,
        };
        summary.opaque.add(CodecSpecific::structured(StructuredData::QtVideoFieldInfo(
            FieldInfoBox {
                fields: 2,
                detail: 9,
            },
        )));
        build_visual_description(&mut context, &summary).unwrap();

        let SampleEntry::Visual(visual) = &context.description.entries[0] else {
            panic!("expected a visual entry");
        };
        assert_eq!(
            visual.extensions.find_box(CleanApertureBox::TYPE),
            Some(&ExtensionBox::CleanAperture(CleanApertureBox(CleanAperture {
                width: RationalU32::new(1920, 1),
                height: RationalU32::new(1080, 1),
                horizontal_offset: RationalS32::new(0, 1),
                vertical_offset: RationalS32::new(0, 1),
            })))
        );
        assert_eq!(
            visual.extensions.find_box(ColorParameterBox::TYPE),
            Some(&ExtensionBox::ColorParameter(ColorParameterBox(ColorParameters::Nclc {
                primaries_index: 1,
                transfer_function_index: TRANSFER_INDEX_UNSPECIFIED,
                matrix_index: 6,
            })))
        );
        assert!(visual.extensions.find_box(PixelAspectRatioBox::TYPE).is_none());
    }

    #[test]
    fn track_aperture_modes() {
        let mut context = TrackContext::quicktime();
        context.aperture = Some(TrackApertureBox {
            clean: Some(Default::default()),
            production: Some(Default::default()),
            encoded_pixels: Some(Default::default()),
        });
        let mut summary = VideoSummary::new(video::APCH, 1440, 1080);
        summary.par_h = 4;
        summary.par_v = 3;
        build_visual_description(&mut context, &summary).unwrap();

        let tapt = context.aperture.clone().unwrap();
        assert_eq!(tapt.clean.unwrap().width, U16F16!(1920));
        assert_eq!(tapt.clean.unwrap().height, U16F16!(1080));
        assert_eq!(tapt.production.unwrap().width, U16F16!(1920));
        assert_eq!(tapt.encoded_pixels.unwrap().width, U16F16!(1440));
        assert_eq!(tapt.encoded_pixels.unwrap().height, U16F16!(1080));

        // A second description turns the mode off.
        build_visual_description(&mut context, &summary).unwrap();
        assert!(context.aperture.is_none());
    }

    #[test]
    fn track_aperture_with_fractional_pixel_aspect() {
        let aperture_for = |par_h, par_v| {
            let mut context = TrackContext::quicktime();
            context.aperture = Some(TrackApertureBox {
                clean: Some(Default::default()),
                production: Some(Default::default()),
                encoded_pixels: Some(Default::default()),
            });
            let mut summary = VideoSummary::new(video::APCN, 22, 16);
            summary.par_h = par_h;
            summary.par_v = par_v;
            build_visual_description(&mut context, &summary).unwrap();
            context.aperture.unwrap()
        };

        // 22 * 15 / 11 = 30 lands one bit short of 30.0 once the ratio is rounded.
        let wide = aperture_for(15, 11);
        assert_eq!(wide.production.unwrap().width.to_bits(), 1966079);
        assert_eq!(wide.production.unwrap().height.to_bits(), 16 << 16);
        assert_eq!(wide.clean.unwrap().width.to_bits(), 1966079);
        assert_eq!(wide.encoded_pixels.unwrap().width.to_bits(), 22 << 16);

        let tall = aperture_for(8, 9);
        assert_eq!(tall.production.unwrap().width.to_bits(), 22 << 16);
        assert_eq!(tall.production.unwrap().height.to_bits(), 18 << 16);
        assert_eq!(tall.clean.unwrap().height.to_bits(), 18 << 16);
        assert_eq!(tall.encoded_pixels.unwrap().height.to_bits(), 16 << 16);
    }

    #[test]
    fn scaling_disables_track_aperture_modes() {
        let mut context = TrackContext::quicktime();
        context.aperture = Some(TrackApertureBox {
            clean: Some(Default::default()),
            production: Some(Default::default()),
            encoded_pixels: Some(Default::default()),
        });
        let mut summary = VideoSummary::new(video::APCN, 720, 486);
        summary.opaque.add(CodecSpecific::structured(StructuredData::SampleScale(
            SamplingScaleBox {
                constraint_flag: true,
                scale_method: 3,
                display_center_x: 0,
                display_center_y: 0,
            },
        )));
        build_visual_description(&mut context, &summary).unwrap();
        assert!(context.aperture.is_none());
        let SampleEntry::Visual(visual) = &context.description.entries[0] else {
            panic!("expected a visual entry");
        };
        assert!(visual.extensions.find_box(CleanApertureBox::TYPE).is_none());
    }

    #[test]
    fn quicktime_common_fields_round_trip() {
        let mut context = TrackContext::quicktime();
        let mut summary = VideoSummary::new(video::APCH, 1280, 720);
        summary.set_compressor_name("Custom");
        let common = QtVideoCommon {
            vendor: u32::from_be_bytes(*b"appl"),
            temporal_quality: 512,
            spatial_quality: 1023,
            ..Default::default()
        };
        summary.opaque.add(CodecSpecific::structured(StructuredData::QtVideoCommon(common)));
        summary.opaque.add(CodecSpecific::new(
            CodecSpecificDataType::QtVideoCommon,
            CodecSpecificFormat::Unstructured,
        ));
        summary.opaque.add(CodecSpecific::structured(StructuredData::QtVideoFieldInfo(
            Default::default(),
        )));
        summary.opaque.add(CodecSpecific::structured(
            StructuredData::QtVideoSignificantBits(SignificantBitsBox {
                significant_bits: 16,
            }),
        ));
        summary.opaque.add(CodecSpecific::new(
            CodecSpecificDataType::Unknown,
            CodecSpecificFormat::Structured,
        ));
        build_visual_description(&mut context, &summary).unwrap();

        let SampleEntry::Visual(visual) = &context.description.entries[0] else {
            panic!("expected a visual entry");
        };
        assert_eq!(visual.vendor, common.vendor);
        assert_eq!(visual.extensions.len(), 2);
        let back = video_summary_from_entry(visual).unwrap();
        assert_eq!(back.compressor_name(), "Custom");
        assert_eq!(
            back.opaque.find(CodecSpecificDataType::QtVideoCommon).unwrap().as_structured(),
            Some(&StructuredData::QtVideoCommon(common))
        );
        assert_eq!(
            back.opaque
                .find(CodecSpecificDataType::QtVideoSignificantBits)
                .unwrap()
                .as_structured(),
            Some(&StructuredData::QtVideoSignificantBits(SignificantBitsBox {
                significant_bits: 16
            }))
        );
        assert!(!back.clap.is_specified());
    }

    #[test]
    fn binary_extensions_keep_their_kind() {
        let mut context = TrackContext::default();
        build_visual_description(&mut context, &avc_summary()).unwrap();
        let SampleEntry::Visual(visual) = &context.description.entries[0] else {
            panic!("expected a visual entry");
        };
        let back = video_summary_from_entry(visual).unwrap();
        assert_eq!(back.opaque.count(), 1);
        let avcc = back.opaque.get(1).unwrap();
        assert_eq!(avcc.data_type(), CodecSpecificDataType::H264);
        assert_eq!(avcc.size(), 11);
    }
}
