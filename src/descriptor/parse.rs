//! Module descriptor XML parsing.
//!
//! ```xml
//! <module>
//!   <inherits name="com.google.gwt.user.User"/>
//!   <source path="client"/>
//!   <super-source path="jre"/>
//!   <public path="public"/>
//!   <stylesheet path="app.css"/>
//! </module>
//! ```
//!
//! Only direct children of the root are read; unknown elements are ignored.

use super::model::{ModuleDescriptor, PathCategory, PathElement};
use crate::log;
use quick_xml::{
    Reader,
    escape::unescape,
    events::{BytesStart, Event},
};
use thiserror::Error;

const ROOT_ELEMENT: &[u8] = b"module";

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("malformed descriptor for `{module}` at byte {position}: {message}")]
    Malformed {
        module: String,
        position: u64,
        message: String,
    },

    #[error("descriptor for `{module}` has root <{found}>, expected <module>")]
    WrongRoot { module: String, found: String },

    #[error("descriptor for `{0}` has no root element")]
    Empty(String),
}

/// Parse descriptor bytes for `module`.
pub fn parse_descriptor(module: &str, xml: &[u8]) -> Result<ModuleDescriptor, DescriptorError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut descriptor = ModuleDescriptor::new(module);
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(DescriptorError::Malformed {
                    module: module.to_string(),
                    position: reader.error_position() as u64,
                    message: e.to_string(),
                });
            }
        };

        match &event {
            Event::Start(elem) | Event::Empty(elem) => {
                if depth == 0 {
                    if seen_root {
                        return Err(malformed(module, &reader, "multiple root elements"));
                    }
                    let name = elem.local_name();
                    if name.as_ref() != ROOT_ELEMENT {
                        return Err(DescriptorError::WrongRoot {
                            module: module.to_string(),
                            found: String::from_utf8_lossy(name.as_ref()).into_owned(),
                        });
                    }
                    seen_root = true;
                } else if depth == 1 {
                    read_child(module, elem, &reader, &mut descriptor)?;
                }
                if matches!(event, Event::Start(_)) {
                    depth += 1;
                }
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(DescriptorError::Empty(module.to_string()));
    }
    Ok(descriptor)
}

fn read_child(
    module: &str,
    elem: &BytesStart<'_>,
    reader: &Reader<&[u8]>,
    descriptor: &mut ModuleDescriptor,
) -> Result<(), DescriptorError> {
    let name = elem.local_name();

    if name.as_ref() == b"inherits" {
        match attribute(module, elem, reader, b"name")? {
            Some(inherited) if !inherited.trim().is_empty() => {
                descriptor.inherits.push(inherited.trim().to_string());
            }
            _ => log!("module"; "ignoring <inherits> without a name in '{}'", module),
        }
        return Ok(());
    }

    if let Some(category) = PathCategory::from_element(name.as_ref()) {
        let path = attribute(module, elem, reader, b"path")?.unwrap_or_default();
        descriptor.paths_mut(category).push(PathElement::new(path));
    }

    Ok(())
}

fn attribute(
    module: &str,
    elem: &BytesStart<'_>,
    reader: &Reader<&[u8]>,
    key: &[u8],
) -> Result<Option<String>, DescriptorError> {
    for attr in elem.attributes() {
        let attr = attr.map_err(|e| malformed(module, reader, e))?;
        if attr.key.as_ref() != key {
            continue;
        }
        let raw = std::str::from_utf8(&attr.value).map_err(|e| malformed(module, reader, e))?;
        let value = unescape(raw).map_err(|e| malformed(module, reader, e))?;
        return Ok(Some(value.into_owned()));
    }
    Ok(None)
}

fn malformed(module: &str, reader: &Reader<&[u8]>, message: impl ToString) -> DescriptorError {
    DescriptorError::Malformed {
        module: module.to_string(),
        position: reader.buffer_position() as u64,
        message: message.to_string(),
    }
}
