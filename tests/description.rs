use mp4_description::{
    codec::{audio, video},
    entry::{MediaType, SampleDescriptionBox, SampleEntry},
    extension::ExtensionBox,
    locate_child_box,
    marshal::{
        avc::AvcConfigurationBox,
        encode_to_vec,
        mp4sys::{object_type, DecoderConfigDescriptor, DecoderSpecificInfo},
        qt::DecompressionParamBox,
        BoxHeader, BoxType, BASEBOX_COMMON_SIZE,
    },
    specific::{
        CodecSpecific, CodecSpecificDataType, CodecSpecificFormat, LpcmFormatFlags,
        StructuredData,
    },
    AudioSummary, Error, FourCC, Summary, TrackContext, VideoSummary,
};
use proptest::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Writes the track's `stsd` and reads it back.
fn reread(context: &TrackContext, media_type: MediaType) -> SampleDescriptionBox {
    let data = encode_to_vec(&context.description).unwrap();
    let mut body = BoxHeader::split_expect(&data, SampleDescriptionBox::TYPE).unwrap();
    SampleDescriptionBox::decode_as(&mut body, media_type).unwrap()
}

fn reread_context(context: &TrackContext, media_type: MediaType) -> TrackContext {
    TrackContext {
        description: reread(context, media_type),
        ..TrackContext::new(context.major_brand, context.qt_compatible)
    }
}

#[test]
fn lpcm_round_trip() {
    init_tracing();

    let mut context = TrackContext::quicktime();
    let mut summary = AudioSummary::new(audio::SOWT, 44100, 2, 16);
    summary.opaque.add(CodecSpecific::structured(
        StructuredData::QtAudioFormatSpecificFlags(LpcmFormatFlags::SIGNED_INTEGER),
    ));
    assert_eq!(mp4_description::build_audio_description(&mut context, &summary).unwrap(), 1);

    let context = reread_context(&context, MediaType::Audio);
    let Some(SampleEntry::Audio(entry)) = context.description.entries.first() else {
        panic!("expected an audio entry");
    };
    assert_eq!(entry.version, 1);
    assert_eq!(entry.bytes_per_frame, 4);
    assert_eq!(entry.bytes_per_sample, 2);

    let Some(Summary::Audio(back)) = mp4_description::summary_from_description(&context, 1).unwrap()
    else {
        panic!("expected an audio summary");
    };
    assert_eq!(back.channels, 2);
    assert_eq!(back.sample_size, 16);
    assert_eq!(back.frequency, 44100);
    assert_eq!(
        back.opaque
            .find(CodecSpecificDataType::QtAudioFormatSpecificFlags)
            .and_then(CodecSpecific::as_structured),
        Some(&StructuredData::QtAudioFormatSpecificFlags(LpcmFormatFlags::empty()))
    );
}

#[test]
fn big_endian_lpcm_keeps_version_0() {
    init_tracing();

    let flags = LpcmFormatFlags::BIG_ENDIAN | LpcmFormatFlags::SIGNED_INTEGER;
    let mut context = TrackContext::quicktime();
    let mut summary = AudioSummary::new(audio::TWOS, 44100, 2, 16);
    summary
        .opaque
        .add(CodecSpecific::structured(StructuredData::QtAudioFormatSpecificFlags(flags)));
    mp4_description::build_audio_description(&mut context, &summary).unwrap();

    let context = reread_context(&context, MediaType::Audio);
    let Some(SampleEntry::Audio(entry)) = context.description.entries.first() else {
        panic!("expected an audio entry");
    };
    assert_eq!(entry.r#type, audio::TWOS);
    assert_eq!(entry.version, 0);
    assert_eq!(entry.channelcount, 2);
    assert_eq!(entry.samplesize, 16);
    assert_eq!(entry.compression_id, 0);

    let Some(Summary::Audio(back)) = mp4_description::summary_from_description(&context, 1).unwrap()
    else {
        panic!("expected an audio summary");
    };
    assert_eq!((back.channels, back.sample_size, back.frequency), (2, 16, 44100));
    assert_eq!(
        back.opaque
            .find(CodecSpecificDataType::QtAudioFormatSpecificFlags)
            .and_then(CodecSpecific::as_structured),
        Some(&StructuredData::QtAudioFormatSpecificFlags(flags))
    );
}

#[test]
fn quicktime_aac_round_trip() {
    init_tracing();

    let config = DecoderConfigDescriptor {
        object_type_indication: object_type::AUDIO_ISO_14496_3,
        max_bitrate: 192_000,
        avg_bitrate: 128_000,
        decoder_specific_info: Some(DecoderSpecificInfo(vec![0x12, 0x10])),
        ..Default::default()
    };
    let mut summary = AudioSummary::new(audio::MP4A, 44100, 2, 16);
    summary.samples_in_frame = 1024;
    summary
        .opaque
        .add(CodecSpecific::structured(StructuredData::Mp4sysDecoderConfig(config.clone())));
    let mut context = TrackContext::quicktime();
    mp4_description::build_audio_description(&mut context, &summary).unwrap();

    let context = reread_context(&context, MediaType::Audio);
    let Some(SampleEntry::Audio(entry)) = context.description.entries.first() else {
        panic!("expected an audio entry");
    };
    let Some(ExtensionBox::DecompressionParam(wave)) =
        entry.extensions.find_box(DecompressionParamBox::TYPE)
    else {
        panic!("expected a wave");
    };
    assert_eq!(wave.original_format.map(|frma| frma.data_format), Some(audio::MP4A));
    assert!(wave.terminator.is_some());

    let back = mp4_description::audio_summary_from_entry(entry, true).unwrap();
    assert_eq!(back.aot, 2);
    assert_eq!((back.frequency, back.channels), (44100, 2));
    let recovered = back
        .opaque
        .find(CodecSpecificDataType::Mp4sysDecoderConfig)
        .unwrap()
        .convert(CodecSpecificFormat::Structured)
        .unwrap();
    assert_eq!(
        recovered.into_structured(),
        Some(StructuredData::Mp4sysDecoderConfig(config))
    );

    // The recovered summary builds the same entry again.
    let mut rebuilt = TrackContext::quicktime();
    mp4_description::build_audio_description(&mut rebuilt, &back).unwrap();
    let Some(SampleEntry::Audio(again)) = rebuilt.description.entries.first() else {
        panic!("expected an audio entry");
    };
    assert_eq!(again.version, entry.version);
    assert_eq!(again.samples_per_packet, 1024);
    assert!(again.extensions.find_box(DecompressionParamBox::TYPE).is_some());
}

#[test]
fn missing_codec_configuration_leaves_track_untouched() {
    let mut context = TrackContext::default();
    let summary = VideoSummary::new(video::AVC1, 1920, 1080);
    assert!(matches!(
        mp4_description::build_visual_description(&mut context, &summary),
        Err(Error::InvalidSummary(video::AVC1))
    ));
    assert!(context.description.entries.is_empty());
}

#[test]
fn avc_round_trip() {
    init_tracing();

    let avcc = AvcConfigurationBox {
        profile_indication: 66,
        profile_compatibility: 0xC0,
        level_indication: 30,
        sequence_parameter_sets: vec![vec![0x67, 0x42, 0xC0, 0x1E]],
        picture_parameter_sets: vec![vec![0x68, 0xCE, 0x3C, 0x80]],
        ..Default::default()
    };
    let mut summary = VideoSummary::new(video::AVC1, 1280, 720);
    summary.par_h = 1;
    summary.par_v = 1;
    summary
        .opaque
        .add(CodecSpecific::structured(StructuredData::H264(avcc.clone())));
    let mut context = TrackContext::default();
    mp4_description::build_visual_description(&mut context, &summary).unwrap();

    let context = reread_context(&context, MediaType::Video);
    let Some(Summary::Video(back)) = mp4_description::summary_from_description(&context, 1).unwrap()
    else {
        panic!("expected a video summary");
    };
    assert_eq!((back.width, back.height), (1280, 720));
    assert_eq!((back.par_h, back.par_v), (1, 1));
    assert_eq!(back.compressor_name(), "AVC Coding");
    let h264 = back.opaque.find(CodecSpecificDataType::H264).unwrap();
    assert_eq!(h264.format(), CodecSpecificFormat::Unstructured);
    assert_eq!(
        h264.convert(CodecSpecificFormat::Structured).unwrap().into_structured(),
        Some(StructuredData::H264(avcc))
    );
    assert!(Summary::Video(back).is_valid());
}

#[test]
fn numbering_counts_from_one() {
    let mut context = TrackContext::quicktime();
    for sample_type in [video::APCH, video::APCN] {
        let number = mp4_description::build_visual_description(
            &mut context,
            &VideoSummary::new(sample_type, 1920, 1080),
        )
        .unwrap();
        assert_eq!(number, context.description.entries.len());
    }
    assert!(mp4_description::summary_from_description(&context, 0).unwrap().is_none());
    let Some(summary) = mp4_description::summary_from_description(&context, 2).unwrap() else {
        panic!("expected a summary");
    };
    assert_eq!(summary.sample_type(), video::APCN);
}

fn with_header(r#type: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut data = ((BASEBOX_COMMON_SIZE + body.len()) as u32).to_be_bytes().to_vec();
    data.extend_from_slice(r#type);
    data.extend_from_slice(body);
    data
}

proptest! {
    #[test]
    fn locate_child_box_stays_inside_parent(
        body in prop::collection::vec(any::<u8>(), 0..256),
        child_type in any::<u32>(),
    ) {
        let parent = with_header(b"wave", &body);
        if let Ok(Some(child)) = locate_child_box(&parent, FourCC(child_type)) {
            prop_assert!(child.offset >= BASEBOX_COMMON_SIZE);
            prop_assert!(child.offset + child.size <= parent.len());
            prop_assert_eq!(&child.slice(&parent)[4..8], &child_type.to_be_bytes());
        }
    }

    #[test]
    fn locate_child_box_finds_among_siblings(
        siblings in prop::collection::vec(("[a-z]{4}", prop::collection::vec(any::<u8>(), 0..32)), 0..8),
        payload in prop::collection::vec(any::<u8>(), 0..32),
    ) {
        let mut body = vec![];
        for (r#type, sibling) in &siblings {
            let r#type: [u8; 4] = r#type.as_bytes().try_into().unwrap();
            body.extend_from_slice(&with_header(&r#type, sibling));
        }
        let offset = BASEBOX_COMMON_SIZE + body.len();
        let target = with_header(b"ESDS", &payload);
        body.extend_from_slice(&target);
        let parent = with_header(b"wave", &body);

        let child = locate_child_box(&parent, FourCC::new(b"ESDS")).unwrap().unwrap();
        prop_assert_eq!(child.offset, offset);
        prop_assert_eq!(child.size, target.len());
    }
}
