//! Namespaces declared on every METS document.

/// An XML namespace with its conventional prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub prefix: &'static str,
    pub uri: &'static str,
}

impl Namespace {
    pub const METS: Namespace = Namespace::new("mets", "http://www.loc.gov/METS/");
    pub const XSI: Namespace =
        Namespace::new("xsi", "http://www.w3.org/2001/XMLSchema-instance");
    pub const PREMIS: Namespace = Namespace::new("premis", "info:lc/xmlns/premis-v2");
    pub const FI: Namespace = Namespace::new(
        "fi",
        "http://digitalpreservation.fi/schemas/mets/fi-extensions",
    );
    pub const XLINK: Namespace = Namespace::new("xlink", "http://www.w3.org/1999/xlink");
    pub const MIX: Namespace = Namespace::new("mix", "http://www.loc.gov/mix/v20");
    pub const EAD3: Namespace = Namespace::new("ead3", "http://ead3.archivists.org/schema/");
    pub const ADDML: Namespace =
        Namespace::new("addml", "http://www.arkivverket.no/standarder/addml");
    pub const AUDIOMD: Namespace = Namespace::new("audiomd", "http://www.loc.gov/audioMD/");
    pub const VIDEOMD: Namespace = Namespace::new("videomd", "http://www.loc.gov/videoMD/");

    /// Every namespace declared on the document root, in declaration order.
    pub const ALL: &'static [Namespace] = &[
        Self::METS,
        Self::XSI,
        Self::PREMIS,
        Self::FI,
        Self::XLINK,
        Self::MIX,
        Self::EAD3,
        Self::ADDML,
        Self::AUDIOMD,
        Self::VIDEOMD,
    ];

    pub const fn new(prefix: &'static str, uri: &'static str) -> Self {
        Self { prefix, uri }
    }

    /// Prefixed name, e.g. `mets:file`.
    pub fn qualify(&self, local: &str) -> String {
        format!("{}:{}", self.prefix, local)
    }

    /// The `xmlns:prefix` attribute name declaring this namespace.
    pub fn declaration(&self) -> String {
        format!("xmlns:{}", self.prefix)
    }

    pub fn by_prefix(prefix: &str) -> Option<Namespace> {
        Self::ALL.iter().copied().find(|ns| ns.prefix == prefix)
    }
}
