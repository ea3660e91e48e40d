//! VideoMD technical metadata for video files and streams.

use mets_types::{vocabulary, MetadataType, OtherOr, Vocabulary};
use mets_xml::{Namespace, XmlElement};

use crate::audio::{compression, CodecQuality, DataRateMode};
use crate::error::MetadataResult;
use crate::metadata::{IntoMetadata, Metadata, MetadataHeader, MetadataOptions, Payload};

vocabulary! {
    pub enum Color ("Color", "color") {
        BAndW => "B&W",
        Color => "Color",
        Grayscale => "Grayscale",
        BAndWWithGrayscaleSequences => "B&W with grayscale sequences",
        BAndWWithColorSequences => "B&W with color sequences",
        GrayscaleWithBAndWSequences => "Grayscale with B&W sequences",
        GrayscaleWithColorSequences => "Grayscale with color sequences",
        ColorWithBAndWSequences => "Color with B&W sequences",
        ColorWithGrayscaleSequences => "Color with grayscale sequences",
    }
}

vocabulary! {
    /// Whether the video carries sound. `Yes` should come with AudioMD.
    pub enum Sound ("Sound", "sound") {
        Yes => "Yes",
        No => "No",
    }
}

/// VideoMD 2.0 technical metadata.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TechnicalVideoMetadata {
    pub duration: String,
    /// Mbps.
    pub data_rate: String,
    pub bits_per_sample: String,
    pub color: Color,
    pub codec_creator_app: String,
    pub codec_creator_app_version: String,
    pub codec_name: String,
    pub codec_quality: CodecQuality,
    pub data_rate_mode: DataRateMode,
    /// A ratio such as `30000/1001` or a decimal such as `29.970`.
    pub frame_rate: String,
    pub pixels_horizontal: String,
    pub pixels_vertical: String,
    /// Pixel aspect ratio.
    pub par: String,
    /// Display aspect ratio.
    pub dar: String,
    /// Chroma subsampling, e.g. `4:2:0`.
    pub sampling: String,
    /// e.g. `PAL`.
    pub signal_format: String,
    pub sound: Sound,
}

impl TechnicalVideoMetadata {
    pub(crate) fn render(&self) -> XmlElement {
        let ns = Namespace::VIDEOMD;
        let text = |local: &str, value: &str| XmlElement::text_element(ns.qualify(local), value);

        let frame = XmlElement::new(ns.qualify("frame"))
            .with_child(text("pixelsHorizontal", &self.pixels_horizontal))
            .with_child(text("pixelsVertical", &self.pixels_vertical))
            .with_child(text("PAR", &self.par))
            .with_child(text("DAR", &self.dar));

        let file_data = XmlElement::new(ns.qualify("fileData"))
            .with_child(text("duration", &self.duration))
            .with_child(text("dataRate", &self.data_rate))
            .with_child(text("bitsPerSample", &self.bits_per_sample))
            .with_child(text("color", self.color.as_str()))
            .with_child(compression(
                ns,
                &self.codec_creator_app,
                &self.codec_creator_app_version,
                &self.codec_name,
                self.codec_quality,
            ))
            .with_child(text("dataRateMode", self.data_rate_mode.as_str()))
            .with_child(text("frameRate", &self.frame_rate))
            .with_child(frame)
            .with_child(text("sampling", &self.sampling))
            .with_child(text("signalFormat", &self.signal_format))
            .with_child(text("sound", self.sound.as_str()));

        XmlElement::new(ns.qualify("VIDEOMD"))
            .with_attr("ANALOGDIGITALFLAG", "FileDigital")
            .with_child(file_data)
    }
}

impl IntoMetadata for TechnicalVideoMetadata {
    fn into_metadata_with(self, options: MetadataOptions) -> MetadataResult<Metadata> {
        let header = MetadataHeader::new(
            MetadataType::Technical,
            OtherOr::other("VideoMD")?,
            "2.0",
            options,
        );
        Ok(Metadata::from_parts(header, Payload::Video(self)))
    }
}
