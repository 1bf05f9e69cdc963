//! Small XML helpers shared by the container and deck layers.
use crate::error::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Read an attribute value by its qualified key (e.g. `b"r:id"`),
/// unescaped.
pub fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    for a in e.attributes().flatten() {
        if a.key.as_ref() == key {
            return a.unescape_value().ok().map(|v| v.into_owned());
        }
    }
    None
}

/// A direct child element of some parent, located by its byte span in the
/// source document so the raw markup can be sliced out or replaced without
/// re-serialization.
#[derive(Debug, Clone)]
pub struct RawElement {
    /// Qualified element name (e.g. `p:sp`)
    pub name: Vec<u8>,
    /// Byte offset of the opening `<`
    pub start: usize,
    /// Byte offset one past the closing `>`
    pub end: usize,
}

impl RawElement {
    /// Local name (qualified name with any prefix stripped).
    pub fn local_name(&self) -> &[u8] {
        match self.name.iter().position(|&b| b == b':') {
            Some(pos) => &self.name[pos + 1..],
            None => &self.name,
        }
    }
}

/// Collect the direct child elements of the first element whose local name
/// matches `parent`, with exact byte spans into `xml`.
///
/// Text trimming stays off so byte positions line up with the source.
pub fn child_elements(xml: &[u8], parent: &[u8]) -> Result<Vec<RawElement>> {
    let mut reader = Reader::from_reader(xml);
    let mut children = Vec::new();

    // Depth relative to the parent element; None until the parent is seen.
    let mut depth: Option<usize> = None;
    let mut pending: Option<(Vec<u8>, usize)> = None;

    loop {
        let pos_before = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if depth.is_none() {
                    if e.local_name().as_ref() == parent {
                        depth = Some(0);
                    }
                } else if let Some(d) = depth {
                    if d == 0 && pending.is_none() {
                        pending = Some((e.name().as_ref().to_vec(), pos_before));
                    }
                    depth = Some(d + 1);
                }
            },
            Ok(Event::Empty(e)) => {
                if let Some(0) = depth {
                    children.push(RawElement {
                        name: e.name().as_ref().to_vec(),
                        start: pos_before,
                        end: reader.buffer_position() as usize,
                    });
                }
            },
            Ok(Event::End(_)) => {
                if let Some(d) = depth {
                    if d == 0 {
                        // Closing tag of the parent itself.
                        break;
                    }
                    depth = Some(d - 1);
                    if d == 1
                        && let Some((name, start)) = pending.take()
                    {
                        children.push(RawElement {
                            name,
                            start,
                            end: reader.buffer_position() as usize,
                        });
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {},
        }
    }

    Ok(children)
}
