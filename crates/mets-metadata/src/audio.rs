//! AudioMD technical metadata for audio files and streams.

use mets_types::{vocabulary, MetadataType, OtherOr, Vocabulary};
use mets_xml::{Namespace, XmlElement};

use crate::error::{MetadataError, MetadataResult};
use crate::metadata::{IntoMetadata, Metadata, MetadataHeader, MetadataOptions, Payload};

vocabulary! {
    pub enum CodecQuality ("CodecQuality", "codec_quality") {
        Lossless => "lossless",
        Lossy => "lossy",
    }
}

vocabulary! {
    pub enum DataRateMode ("DataRateMode", "data_rate_mode") {
        Fixed => "Fixed",
        Variable => "Variable",
    }
}

/// AudioMD 2.0 technical metadata.
///
/// Unknown values are given as `(:unav)` for text fields and `0` for
/// numeric ones; `(:unap)` marks codec fields of uncompressed audio.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TechnicalAudioMetadata {
    pub codec_quality: CodecQuality,
    pub data_rate_mode: DataRateMode,
    pub audio_data_encoding: String,
    pub bits_per_sample: String,
    pub codec_creator_app: String,
    pub codec_creator_app_version: String,
    pub codec_name: String,
    /// kbps. Rounded to an integer when frozen.
    pub data_rate: String,
    /// kHz.
    pub sampling_frequency: String,
    pub duration: String,
    pub num_channels: String,
}

/// Round a decimal string to the nearest integer, ties to even.
pub(crate) fn round_to_integer(field: &'static str, value: &str) -> MetadataResult<String> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| MetadataError::InvalidNumber {
            field,
            value: value.to_string(),
        })?;
    if !parsed.is_finite() {
        return Err(MetadataError::InvalidNumber {
            field,
            value: value.to_string(),
        });
    }
    Ok(format!("{}", parsed.round_ties_even() as i64))
}

pub(crate) fn compression(
    ns: Namespace,
    app: &str,
    app_version: &str,
    name: &str,
    quality: CodecQuality,
) -> XmlElement {
    XmlElement::new(ns.qualify("compression"))
        .with_child(XmlElement::text_element(ns.qualify("codecCreatorApp"), app))
        .with_child(XmlElement::text_element(
            ns.qualify("codecCreatorAppVersion"),
            app_version,
        ))
        .with_child(XmlElement::text_element(ns.qualify("codecName"), name))
        .with_child(XmlElement::text_element(
            ns.qualify("codecQuality"),
            quality.as_str(),
        ))
}

impl TechnicalAudioMetadata {
    pub(crate) fn render(&self) -> XmlElement {
        let ns = Namespace::AUDIOMD;
        let text = |local: &str, value: &str| XmlElement::text_element(ns.qualify(local), value);

        let file_data = XmlElement::new(ns.qualify("fileData"))
            .with_child(text("audioDataEncoding", &self.audio_data_encoding))
            .with_child(text("bitsPerSample", &self.bits_per_sample))
            .with_child(compression(
                ns,
                &self.codec_creator_app,
                &self.codec_creator_app_version,
                &self.codec_name,
                self.codec_quality,
            ))
            .with_child(text("dataRate", &self.data_rate))
            .with_child(text("dataRateMode", self.data_rate_mode.as_str()))
            .with_child(text("samplingFrequency", &self.sampling_frequency));

        let audio_info = XmlElement::new(ns.qualify("audioInfo"))
            .with_child(text("duration", &self.duration))
            .with_child(text("numChannels", &self.num_channels));

        XmlElement::new(ns.qualify("AUDIOMD"))
            .with_attr("ANALOGDIGITALFLAG", "FileDigital")
            .with_child(file_data)
            .with_child(audio_info)
    }
}

impl IntoMetadata for TechnicalAudioMetadata {
    fn into_metadata_with(mut self, options: MetadataOptions) -> MetadataResult<Metadata> {
        self.data_rate = round_to_integer("data_rate", &self.data_rate)?;
        let header = MetadataHeader::new(
            MetadataType::Technical,
            OtherOr::other("AudioMD")?,
            "2.0",
            options,
        );
        Ok(Metadata::from_parts(header, Payload::Audio(self)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SerializerState;

    fn audio(data_rate: &str) -> TechnicalAudioMetadata {
        TechnicalAudioMetadata {
            codec_quality: CodecQuality::Lossy,
            data_rate_mode: DataRateMode::Fixed,
            audio_data_encoding: "AAC".into(),
            bits_per_sample: "0".into(),
            codec_creator_app: "(:unav)".into(),
            codec_creator_app_version: "(:unav)".into(),
            codec_name: "AAC".into(),
            data_rate: data_rate.into(),
            sampling_frequency: "44.1".into(),
            duration: "PT1M".into(),
            num_channels: "2".into(),
        }
    }

    #[test]
    fn data_rate_is_rounded() {
        let md = audio("127.6").into_metadata().unwrap();
        match md.payload() {
            Payload::Audio(audio) => assert_eq!(audio.data_rate, "128"),
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn rounding_ties_to_even() {
        assert_eq!(round_to_integer("data_rate", "2.5").unwrap(), "2");
        assert_eq!(round_to_integer("data_rate", "3.5").unwrap(), "4");
        assert_eq!(round_to_integer("data_rate", "256").unwrap(), "256");
    }

    #[test]
    fn non_numeric_data_rate_is_rejected() {
        assert!(matches!(
            audio("fast").into_metadata(),
            Err(MetadataError::InvalidNumber { field: "data_rate", .. })
        ));
    }

    #[test]
    fn format_is_other_audiomd() {
        let md = audio("128").into_metadata().unwrap();
        assert_eq!(md.format().as_str(), "OTHER");
        assert_eq!(md.format().other_value(), Some("AudioMD"));
    }

    #[test]
    fn renders_audiomd() {
        let el = audio("128").into_metadata().unwrap().render(&mut SerializerState::new());
        assert_eq!(el.name(), "audiomd:AUDIOMD");
        assert_eq!(
            el.find_path(&["audiomd:fileData", "audiomd:compression", "audiomd:codecQuality"])
                .unwrap()
                .text(),
            "lossy"
        );
        assert_eq!(
            el.find_path(&["audiomd:audioInfo", "audiomd:numChannels"]).unwrap().text(),
            "2"
        );
    }

    #[test]
    fn vocabularies_parse_wire_values() {
        assert_eq!("Variable".parse::<DataRateMode>().unwrap(), DataRateMode::Variable);
        assert!("variable".parse::<DataRateMode>().is_err());
    }
}
