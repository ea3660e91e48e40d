//! Controlled vocabularies used throughout METS and PREMIS.
//!
//! Every vocabulary is a closed enum that parses from its wire value and
//! reports the exact rejected string on failure. Vocabularies that carry an
//! `OTHER` member are paired with a free-text value through [`OtherOr`].

use std::str::FromStr;

use crate::error::{TypeError, TypeResult};

/// A closed set of allowed string values.
pub trait Vocabulary: Copy + FromStr<Err = TypeError> {
    /// Human-readable name of the vocabulary, used in error messages.
    const KIND: &'static str;
    /// Name of the field the vocabulary is stored in.
    const FIELD: &'static str;

    /// The wire value of this member.
    fn as_str(&self) -> &'static str;

    /// Whether this member is the `OTHER` placeholder.
    fn is_other(&self) -> bool {
        self.as_str() == "OTHER"
    }
}

/// Declare a vocabulary enum together with its wire values.
///
/// Generates the enum, [`Vocabulary`], `FromStr` and `Display`.
#[macro_export]
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($kind:literal, $field:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $value:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// All members in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
        }

        impl $crate::Vocabulary for $name {
            const KIND: &'static str = $kind;
            const FIELD: &'static str = $field;

            fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $value, )+
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::TypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $value => Ok(Self::$variant), )+
                    _ => Err($crate::TypeError::InvalidValue {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::Vocabulary::as_str(self))
            }
        }
    };
}

vocabulary! {
    /// The kind of a metadata record. Decides the METS section it lands in.
    pub enum MetadataType ("MetadataType", "metadata_type") {
        Technical => "technical",
        Descriptive => "descriptive",
        DigitalProvenance => "digital provenance",
        /// Intellectual property rights metadata.
        Rights => "rights",
        Source => "source",
    }
}

impl MetadataType {
    /// Descriptive metadata lives in `dmdSec`.
    pub fn is_descriptive(&self) -> bool {
        *self == Self::Descriptive
    }

    /// Everything that is not descriptive lives in `amdSec`.
    pub fn is_administrative(&self) -> bool {
        !self.is_descriptive()
    }
}

vocabulary! {
    /// Metadata formats recognised by the METS `MDTYPE` attribute.
    pub enum MetadataFormat ("MetadataFormat", "format") {
        Marc => "MARC",
        Mods => "MODS",
        Dc => "DC",
        Ead => "EAD",
        EacCpf => "EAC-CPF",
        Lido => "LIDO",
        Vra => "VRA",
        Ddi => "DDI",
        PremisObject => "PREMIS:OBJECT",
        NisoImg => "NISOIMG",
        PremisAgent => "PREMIS:AGENT",
        PremisEvent => "PREMIS:EVENT",
        /// Placeholder; the actual format is carried as free text.
        Other => "OTHER",
    }
}

vocabulary! {
    pub enum ChecksumAlgorithm ("ChecksumAlgorithm", "checksum_algorithm") {
        Md5 => "MD5",
        Sha1 => "SHA-1",
        Sha224 => "SHA-224",
        Sha256 => "SHA-256",
        Sha384 => "SHA-384",
        Sha512 => "SHA-512",
    }
}

vocabulary! {
    pub enum Charset ("Charset", "charset") {
        Iso8859_15 => "ISO-8859-15",
        Utf8 => "UTF-8",
        Utf16 => "UTF-16",
        Utf32 => "UTF-32",
    }
}

vocabulary! {
    pub enum PremisObjectType ("PremisObjectType", "object_type") {
        /// A stand-alone file.
        File => "file",
        /// Non stand-alone data within a file.
        Bitstream => "bitstream",
        Representation => "representation",
    }
}

vocabulary! {
    /// Overall result of a digital provenance event.
    pub enum EventOutcome ("EventOutcome", "outcome") {
        Success => "success",
        Failure => "failure",
        /// Temporarily inaccessible.
        Unaccessible => "(:unac)",
        /// Suppressed intentionally.
        Unallowed => "(:unal)",
        Unapplicable => "(:unap)",
        Unavailable => "(:unav)",
        /// Known to be unknown.
        Unknown => "(:unkn)",
        /// Never had a value, never will.
        None => "(:none)",
        /// Explicitly and meaningfully empty.
        Null => "(:null)",
        ToBeAnnounced => "(:tba)",
        /// Too numerous to list.
        EtAlia => "(:etal)",
    }
}

vocabulary! {
    pub enum DigitalProvenanceAgentType ("DigitalProvenanceAgentType", "agent_type") {
        Software => "software",
        Hardware => "hardware",
        Person => "person",
        Organization => "organization",
    }
}

impl DigitalProvenanceAgentType {
    /// Only software and hardware agents carry a version.
    pub fn is_versioned(&self) -> bool {
        matches!(self, Self::Software | Self::Hardware)
    }
}

vocabulary! {
    pub enum MetsProfile ("MetsProfile", "mets_profile") {
        CulturalHeritage => "https://digitalpreservation.fi/mets-profiles/cultural-heritage",
        ResearchData => "https://digitalpreservation.fi/mets-profiles/research-data",
    }
}

vocabulary! {
    /// `RECORDSTATUS` of the METS header.
    pub enum RecordStatus ("MetsRecordStatus", "record_status") {
        /// A new submission information package.
        Submission => "submission",
        /// An updated version of an earlier package.
        Update => "update",
        /// A dissemination information package.
        Dissemination => "dissemination",
    }
}

vocabulary! {
    /// Role of an agent in the METS header.
    pub enum AgentRole ("AgentRole", "role") {
        Creator => "CREATOR",
        Editor => "EDITOR",
        Archivist => "ARCHIVIST",
        Preservation => "PRESERVATION",
        Disseminator => "DISSEMINATOR",
        Custodian => "CUSTODIAN",
        /// Intellectual property owner.
        IpOwner => "IPOWNER",
        Other => "OTHER",
    }
}

vocabulary! {
    /// Type of an agent in the METS header.
    pub enum AgentType ("AgentType", "type") {
        Individual => "INDIVIDUAL",
        Organization => "ORGANIZATION",
        Other => "OTHER",
    }
}

// ---------------------------------------------------------------------------
// OTHER resolution
// ---------------------------------------------------------------------------

/// A vocabulary member, or free text standing in for `OTHER`.
///
/// A resolved value is never `Known(OTHER)`: the placeholder always travels
/// with its free-text replacement.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OtherOr<T> {
    Known(T),
    Other(String),
}

impl<T: Vocabulary> OtherOr<T> {
    /// Resolve a vocabulary value against an optional free-text override.
    ///
    /// A non-empty `other` always wins. Otherwise `value` must be set and
    /// must not be the `OTHER` placeholder.
    pub fn resolve(value: Option<T>, other: Option<&str>) -> TypeResult<Self> {
        match (value, other.filter(|o| !o.is_empty())) {
            (_, Some(other)) => Ok(Self::Other(other.to_string())),
            (Some(value), None) if value.is_other() => {
                Err(TypeError::OtherWithoutValue { field: T::FIELD })
            }
            (Some(value), None) => Ok(Self::Known(value)),
            (None, None) => Err(TypeError::Unresolved { field: T::FIELD }),
        }
    }

    /// Resolve a plain vocabulary member.
    pub fn known(value: T) -> TypeResult<Self> {
        Self::resolve(Some(value), None)
    }

    /// Wrap free text as the `OTHER` replacement.
    pub fn other(value: impl Into<String>) -> TypeResult<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(TypeError::EmptyValue {
                field: T::FIELD,
            });
        }
        Ok(Self::Other(value))
    }

    /// The value of the main attribute (`OTHER` for free text).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(value) => value.as_str(),
            Self::Other(_) => "OTHER",
        }
    }

    /// The free-text replacement, if any.
    pub fn other_value(&self) -> Option<&str> {
        match self {
            Self::Known(_) => None,
            Self::Other(value) => Some(value),
        }
    }
}
