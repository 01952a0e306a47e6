//! Sample entry types and the codec families the description rules branch on.

use crate::marshal::FourCC;

pub mod video {
    use crate::marshal::FourCC;

    pub const AVC1: FourCC = FourCC::new(b"avc1");
    pub const AVC2: FourCC = FourCC::new(b"avc2");
    pub const AVCP: FourCC = FourCC::new(b"avcp");
    pub const SVC1: FourCC = FourCC::new(b"svc1");
    pub const MVC1: FourCC = FourCC::new(b"mvc1");
    pub const MVC2: FourCC = FourCC::new(b"mvc2");
    pub const MP4V: FourCC = FourCC::new(b"mp4v");
    pub const VC_1: FourCC = FourCC::new(b"vc-1");

    pub const APCH: FourCC = FourCC::new(b"apch");
    pub const APCN: FourCC = FourCC::new(b"apcn");
    pub const APCS: FourCC = FourCC::new(b"apcs");
    pub const APCO: FourCC = FourCC::new(b"apco");
    pub const AP4H: FourCC = FourCC::new(b"ap4h");
    pub const DVC: FourCC = FourCC::new(b"dvc ");
    pub const DVCP: FourCC = FourCC::new(b"dvcp");
    pub const DVPP: FourCC = FourCC::new(b"dvpp");
    pub const DV5N: FourCC = FourCC::new(b"dv5n");
    pub const DV5P: FourCC = FourCC::new(b"dv5p");
    pub const DVH2: FourCC = FourCC::new(b"dvh2");
    pub const DVH3: FourCC = FourCC::new(b"dvh3");
    pub const DVH5: FourCC = FourCC::new(b"dvh5");
    pub const DVH6: FourCC = FourCC::new(b"dvh6");
    pub const DVHP: FourCC = FourCC::new(b"dvhp");
    pub const DVHQ: FourCC = FourCC::new(b"dvhq");
    pub const ULRA: FourCC = FourCC::new(b"ULRA");
    pub const ULRG: FourCC = FourCC::new(b"ULRG");
    pub const ULY0: FourCC = FourCC::new(b"ULY0");
    pub const ULY2: FourCC = FourCC::new(b"ULY2");
    pub const _2VUY: FourCC = FourCC::new(b"2vuy");
    pub const V210: FourCC = FourCC::new(b"v210");
    pub const V216: FourCC = FourCC::new(b"v216");
    pub const V308: FourCC = FourCC::new(b"v308");
    pub const V408: FourCC = FourCC::new(b"v408");
    pub const V410: FourCC = FourCC::new(b"v410");
    pub const YUV2: FourCC = FourCC::new(b"yuv2");
}

pub mod audio {
    use crate::marshal::FourCC;

    pub const MP4A: FourCC = FourCC::new(b"mp4a");
    pub const AC_3: FourCC = FourCC::new(b"ac-3");
    pub const EC_3: FourCC = FourCC::new(b"ec-3");
    pub const DTSC: FourCC = FourCC::new(b"dtsc");
    pub const DTSE: FourCC = FourCC::new(b"dtse");
    pub const DTSH: FourCC = FourCC::new(b"dtsh");
    pub const DTSL: FourCC = FourCC::new(b"dtsl");
    pub const SAMR: FourCC = FourCC::new(b"samr");
    pub const SAWB: FourCC = FourCC::new(b"sawb");
    pub const ALAC: FourCC = FourCC::new(b"alac");

    pub const _23NI: FourCC = FourCC::new(b"23ni");
    pub const MAC3: FourCC = FourCC::new(b"MAC3");
    pub const MAC6: FourCC = FourCC::new(b"MAC6");
    pub const NONE: FourCC = FourCC::new(b"NONE");
    pub const QDM2: FourCC = FourCC::new(b"QDM2");
    pub const QDMC: FourCC = FourCC::new(b"QDMC");
    pub const QCLP: FourCC = FourCC::new(b"Qclp");
    pub const AGSM: FourCC = FourCC::new(b"agsm");
    pub const ALAW: FourCC = FourCC::new(b"alaw");
    pub const CDX2: FourCC = FourCC::new(b"cdx2");
    pub const CDX4: FourCC = FourCC::new(b"cdx4");
    pub const DVCA: FourCC = FourCC::new(b"dvca");
    pub const DVI: FourCC = FourCC::new(b"dvi ");
    pub const FL32: FourCC = FourCC::new(b"fl32");
    pub const FL64: FourCC = FourCC::new(b"fl64");
    pub const IMA4: FourCC = FourCC::new(b"ima4");
    pub const IN24: FourCC = FourCC::new(b"in24");
    pub const IN32: FourCC = FourCC::new(b"in32");
    pub const LPCM: FourCC = FourCC::new(b"lpcm");
    pub const RAW: FourCC = FourCC::new(b"raw ");
    pub const SOWT: FourCC = FourCC::new(b"sowt");
    pub const TWOS: FourCC = FourCC::new(b"twos");
    pub const ULAW: FourCC = FourCC::new(b"ulaw");
    pub const VDVA: FourCC = FourCC::new(b"vdva");
    pub const MP3: FourCC = FourCC::new(b".mp3");
    // Windows WAVE format tags mapped into QuickTime 'ms' codes
    pub const FULL_MP3: FourCC = FourCC(0x6D73_0055);
    pub const ADPCM2: FourCC = FourCC(0x6D73_0002);
    pub const ADPCM17: FourCC = FourCC(0x6D73_0011);
    pub const GSM49: FourCC = FourCC(0x6D73_0031);
    pub const NOT_SPECIFIED: FourCC = FourCC(0);
}

pub fn is_qt_video(r#type: FourCC) -> bool {
    use video::*;
    matches!(
        r#type,
        APCH | APCN
            | APCS
            | APCO
            | AP4H
            | DVC
            | DVCP
            | DVPP
            | DV5N
            | DV5P
            | DVH2
            | DVH3
            | DVH5
            | DVH6
            | DVHP
            | DVHQ
            | ULRA
            | ULRG
            | ULY2
            | ULY0
            | V210
            | V216
            | V308
            | V408
            | V410
            | YUV2
    )
}

pub fn is_qt_audio(r#type: FourCC) -> bool {
    use audio::*;
    matches!(
        r#type,
        _23NI
            | MAC3
            | MAC6
            | NONE
            | QDM2
            | QDMC
            | QCLP
            | AC_3
            | AGSM
            | ALAC
            | ALAW
            | CDX2
            | CDX4
            | DVCA
            | DVI
            | FL32
            | FL64
            | IMA4
            | IN24
            | IN32
            | LPCM
            | MP4A
            | RAW
            | SOWT
            | TWOS
            | ULAW
            | VDVA
            | FULL_MP3
            | MP3
            | ADPCM2
            | ADPCM17
            | GSM49
            | NOT_SPECIFIED
    )
}

pub fn is_avc(r#type: FourCC) -> bool {
    matches!(r#type, video::AVC1 | video::AVC2 | video::AVCP)
}

/// Audio types whose samples are plain PCM and whose layout derives from format flags.
pub fn is_lpcm_audio(r#type: FourCC) -> bool {
    use audio::*;
    matches!(
        r#type,
        _23NI | NONE | LPCM | SOWT | TWOS | FL32 | FL64 | IN24 | IN32 | NOT_SPECIFIED | RAW
    )
}

pub fn is_dts_audio(r#type: FourCC) -> bool {
    use audio::*;
    matches!(r#type, DTSC | DTSE | DTSH | DTSL)
}

pub fn is_uncompressed_ycbcr(r#type: FourCC) -> bool {
    use video::*;
    matches!(r#type, _2VUY | V210 | V216 | V308 | V408 | V410 | YUV2)
}

fn default_compressor_name(r#type: FourCC) -> Option<&'static str> {
    use video::*;
    Some(match r#type {
        AVC1 | AVC2 => "AVC Coding",
        AVCP => "AVC Parameters",
        SVC1 => "SVC Coding",
        MVC1 | MVC2 => "MVC Coding",
        APCH => "Apple ProRes 422 (HQ)",
        APCN => "Apple ProRes 422 (SD)",
        APCS => "Apple ProRes 422 (LT)",
        APCO => "Apple ProRes 422 (Proxy)",
        AP4H => "Apple ProRes 4444",
        DVPP => "DVCPRO - PAL",
        DV5N => "DVCPRO50 - NTSC",
        DV5P => "DVCPRO50 - PAL",
        DVH2 => "DVCPRO HD 1080p25",
        DVH3 => "DVCPRO HD 1080p30",
        DVH5 => "DVCPRO HD 1080i50",
        DVH6 => "DVCPRO HD 1080i60",
        DVHP => "DVCPRO HD 720p60",
        DVHQ => "DVCPRO HD 720p50",
        ULRA => "Ut Video (ULRA)",
        ULRG => "Ut Video (ULRG)",
        ULY0 => "Ut Video (ULY0)",
        ULY2 => "Ut Video (ULY2)",
        _ => return None,
    })
}

/// Pascal-style `compressorname` field: length byte, name, zero padding.
pub fn compressor_name_field(name: &str) -> [u8; 32] {
    let mut field = [0u8; 32];
    let length = name.len().min(31);
    field[0] = length as u8;
    field[1..1 + length].copy_from_slice(&name.as_bytes()[..length]);
    field
}

/// The `compressorname` field written for `r#type` when the summary carries none.
pub fn default_compressor_name_field(r#type: FourCC) -> [u8; 32] {
    default_compressor_name(r#type).map_or([0; 32], compressor_name_field)
}
