//! Element helpers for PREMIS 2.3 payloads.

use mets_xml::{Namespace, XmlElement};

pub(crate) fn element(local: &str) -> XmlElement {
    XmlElement::new(Namespace::PREMIS.qualify(local))
}

pub(crate) fn text(local: &str, value: impl Into<String>) -> XmlElement {
    XmlElement::text_element(Namespace::PREMIS.qualify(local), value)
}

/// `<premis:{prefix}Identifier>` with type, value and optional role.
pub(crate) fn identifier(
    prefix: &str,
    identifier_type: &str,
    identifier_value: &str,
    role: Option<&str>,
) -> XmlElement {
    let mut el = element(&format!("{prefix}Identifier"))
        .with_child(text(&format!("{prefix}IdentifierType"), identifier_type))
        .with_child(text(&format!("{prefix}IdentifierValue"), identifier_value));
    if let Some(role) = role {
        el.push_child(text(&format!("{prefix}Role"), role));
    }
    el
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_with_role() {
        let el = identifier("linkingAgent", "UUID", "abc", Some("executing program"));
        assert_eq!(el.name(), "premis:linkingAgentIdentifier");
        assert_eq!(
            el.find("premis:linkingAgentIdentifierValue").unwrap().text(),
            "abc"
        );
        assert_eq!(
            el.find("premis:linkingAgentRole").unwrap().text(),
            "executing program"
        );
    }

    #[test]
    fn identifier_without_role() {
        let el = identifier("object", "UUID", "abc", None);
        assert_eq!(el.elements().count(), 2);
    }
}
