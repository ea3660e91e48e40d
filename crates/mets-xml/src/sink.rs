//! Streaming XML output.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::trace;

use crate::element::XmlElement;
use crate::error::{XmlError, XmlResult};

/// Incremental XML writer.
///
/// Elements are opened and closed one at a time so a large document never
/// has to exist as a tree in memory. The sink tracks open elements and
/// refuses to finish an unbalanced document.
pub struct XmlSink<W: Write> {
    writer: Writer<W>,
    open: Vec<String>,
}

impl<W: Write> XmlSink<W> {
    /// Create a sink. An `indent` of zero writes everything on one line.
    pub fn new(inner: W, indent: usize) -> Self {
        let writer = if indent == 0 {
            Writer::new(inner)
        } else {
            Writer::new_with_indent(inner, b' ', indent)
        };
        Self {
            writer,
            open: Vec::new(),
        }
    }

    /// Write `<?xml version="1.0" encoding="UTF-8"?>`.
    pub fn declaration(&mut self) -> XmlResult<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(())
    }

    /// Open an element. It stays open until the matching [`close`](Self::close).
    pub fn open<I, K, V>(&mut self, name: &str, attributes: I) -> XmlResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let start = start_tag(name, attributes);
        self.writer.write_event(Event::Start(start))?;
        self.open.push(name.to_string());
        trace!(element = name, depth = self.open.len(), "opened element");
        Ok(())
    }

    /// Close the most recently opened element.
    pub fn close(&mut self) -> XmlResult<()> {
        let name = self.open.pop().ok_or(XmlError::NothingToClose)?;
        self.writer
            .write_event(Event::End(BytesEnd::new(name.as_str())))?;
        Ok(())
    }

    /// Write a self-closing element.
    pub fn empty<I, K, V>(&mut self, name: &str, attributes: I) -> XmlResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let start = start_tag(name, attributes);
        self.writer.write_event(Event::Empty(start))?;
        Ok(())
    }

    /// Write an escaped text node inside the current element.
    pub fn text(&mut self, text: &str) -> XmlResult<()> {
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    /// Write a complete element subtree.
    pub fn element(&mut self, element: &XmlElement) -> XmlResult<()> {
        element.write_into(&mut self.writer)
    }

    /// Number of currently open elements.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Finish the document and hand back the underlying writer.
    pub fn finish(self) -> XmlResult<W> {
        if !self.open.is_empty() {
            return Err(XmlError::Unclosed(self.open));
        }
        Ok(self.writer.into_inner())
    }
}

fn start_tag<I, K, V>(name: &str, attributes: I) -> BytesStart<'static>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut start = BytesStart::new(name.to_string());
    for (key, value) in attributes {
        start.push_attribute((key.as_ref(), value.as_ref()));
    }
    start
}
