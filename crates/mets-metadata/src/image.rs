//! MIX technical metadata for still images.

use mets_types::{MetadataFormat, MetadataType, OtherOr, UNAV};
use mets_xml::{Namespace, XmlElement};

use crate::error::{MetadataError, MetadataResult};
use crate::metadata::{IntoMetadata, Metadata, MetadataHeader, MetadataOptions, Payload};

/// MIX 2.0 technical metadata for still images.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TechnicalImageMetadata {
    pub compression: String,
    pub colorspace: String,
    pub width: String,
    pub height: String,
    /// Bits per sample, e.g. `8,8,8`.
    pub bps_value: String,
    pub bps_unit: String,
    pub samples_per_pixel: String,
    pub mimetype: Option<String>,
    /// Required for `image/tiff`.
    pub byte_order: Option<String>,
    pub icc_profile_name: Option<String>,
}

impl TechnicalImageMetadata {
    fn validate(&self) -> MetadataResult<()> {
        let required = [
            ("compression", &self.compression),
            ("colorspace", &self.colorspace),
            ("width", &self.width),
            ("height", &self.height),
            ("bps_value", &self.bps_value),
            ("bps_unit", &self.bps_unit),
            ("samples_per_pixel", &self.samples_per_pixel),
        ];
        for (field, value) in required {
            if value.is_empty() || value == UNAV {
                return Err(MetadataError::MissingValue {
                    field,
                    value: value.clone(),
                });
            }
        }

        let is_tiff = self.mimetype.as_deref() == Some("image/tiff");
        let has_byte_order = self
            .byte_order
            .as_deref()
            .is_some_and(|order| !order.is_empty() && order != UNAV);
        if is_tiff && !has_byte_order {
            return Err(MetadataError::MissingByteOrder);
        }
        Ok(())
    }

    pub(crate) fn render(&self) -> XmlElement {
        let mut basic_info = mix("BasicDigitalObjectInformation");
        if let Some(order) = &self.byte_order {
            basic_info.push_child(text("byteOrder", order));
        }
        let compression = text("compressionScheme", &self.compression);
        basic_info.push_child(mix("Compression").with_child(compression));

        let mut photometric =
            mix("PhotometricInterpretation").with_child(text("colorSpace", &self.colorspace));
        if let Some(icc) = self.icc_profile_name.as_deref().filter(|icc| *icc != UNAV) {
            let profile = mix("IccProfile").with_child(text("iccProfileName", icc));
            photometric.push_child(mix("ColorProfile").with_child(profile));
        }

        let image_info = mix("BasicImageInformation").with_child(
            mix("BasicImageCharacteristics")
                .with_child(text("imageWidth", &self.width))
                .with_child(text("imageHeight", &self.height))
                .with_child(photometric),
        );

        let assessment = mix("ImageAssessmentMetadata").with_child(
            mix("ImageColorEncoding")
                .with_child(
                    mix("BitsPerSample")
                        .with_child(text("bitsPerSampleValue", &self.bps_value))
                        .with_child(text("bitsPerSampleUnit", &self.bps_unit)),
                )
                .with_child(text("samplesPerPixel", &self.samples_per_pixel)),
        );

        mix("mix")
            .with_child(basic_info)
            .with_child(image_info)
            .with_child(assessment)
    }
}

fn mix(local: &str) -> XmlElement {
    XmlElement::new(Namespace::MIX.qualify(local))
}

fn text(local: &str, value: &str) -> XmlElement {
    XmlElement::text_element(Namespace::MIX.qualify(local), value)
}

impl IntoMetadata for TechnicalImageMetadata {
    fn into_metadata_with(self, options: MetadataOptions) -> MetadataResult<Metadata> {
        self.validate()?;
        let header = MetadataHeader::new(
            MetadataType::Technical,
            OtherOr::Known(MetadataFormat::NisoImg),
            "2.0",
            options,
        );
        Ok(Metadata::from_parts(header, Payload::Image(self)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SerializerState;

    fn jpeg() -> TechnicalImageMetadata {
        TechnicalImageMetadata {
            compression: "jpeg".into(),
            colorspace: "srgb".into(),
            width: "640".into(),
            height: "480".into(),
            bps_value: "8".into(),
            bps_unit: "integer".into(),
            samples_per_pixel: "3".into(),
            mimetype: Some("image/jpeg".into()),
            ..Default::default()
        }
    }

    #[test]
    fn unavailable_required_value_is_rejected() {
        let mut image = jpeg();
        image.width = UNAV.into();
        match image.into_metadata() {
            Err(MetadataError::MissingValue { field, value }) => {
                assert_eq!(field, "width");
                assert_eq!(value, UNAV);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn tiff_requires_byte_order() {
        let mut image = jpeg();
        image.mimetype = Some("image/tiff".into());
        assert!(matches!(image.clone().into_metadata(), Err(MetadataError::MissingByteOrder)));

        image.byte_order = Some("little endian".into());
        assert!(image.into_metadata().is_ok());
    }

    #[test]
    fn renders_mix() {
        let mut image = jpeg();
        image.icc_profile_name = Some("sRGB IEC61966-2.1".into());
        let md = image.into_metadata().unwrap();
        assert_eq!(md.format().as_str(), "NISOIMG");

        let el = md.render(&mut SerializerState::new());
        assert_eq!(el.name(), "mix:mix");
        assert_eq!(
            el.find_path(&[
                "mix:BasicImageInformation",
                "mix:BasicImageCharacteristics",
                "mix:imageWidth"
            ])
            .unwrap()
            .text(),
            "640"
        );
        assert!(el
            .find_path(&[
                "mix:BasicImageInformation",
                "mix:BasicImageCharacteristics",
                "mix:PhotometricInterpretation",
                "mix:ColorProfile"
            ])
            .is_some());
    }
}
