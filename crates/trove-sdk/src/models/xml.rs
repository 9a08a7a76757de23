//! XML response decoding.
//!
//! Converts an `encoding=xml` response into the same JSON tree the API
//! returns for `encoding=json`, so both feed the same typed models:
//!
//! - attributes and child elements become object fields;
//! - repeated children become arrays (single children stay objects, which the
//!   lenient deserializers in [`super::de`] accept);
//! - text-only elements become strings; text next to attributes is stored
//!   under `value`;
//! - the root element is unwrapped.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};

use crate::error::{ClientError, ClientResult};

struct Frame {
    name: String,
    fields: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> ClientResult<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut fields = Map::new();

        for attr in start.attributes() {
            let attr = attr.map_err(ClientError::xml)?;
            if attr.key.as_ref().starts_with(b"xmlns") {
                continue;
            }
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value().map_err(ClientError::xml)?;
            fields.insert(key, Value::String(value.into_owned()));
        }

        Ok(Self { name, fields, text: String::new() })
    }

    fn close(self) -> (String, Value) {
        let text = self.text.trim();
        let value = if self.fields.is_empty() {
            if text.is_empty() { Value::Null } else { Value::String(text.to_string()) }
        } else {
            let mut fields = self.fields;
            if !text.is_empty() {
                fields.insert("value".to_string(), Value::String(text.to_string()));
            }
            Value::Object(fields)
        };
        (self.name, value)
    }
}

/// Decode an XML document into a JSON tree.
///
/// # Errors
///
/// Returns [`ClientError::Xml`] on malformed or empty documents.
pub fn xml_to_value(xml: &str) -> ClientResult<Value> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        match reader.read_event().map_err(ClientError::xml)? {
            Event::Start(start) => stack.push(Frame::open(&start)?),
            Event::Empty(start) => {
                let (name, value) = Frame::open(&start)?.close();
                place(&mut stack, &mut root, name, value);
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text.unescape().map_err(ClientError::xml)?);
                }
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                let frame = stack.pop().ok_or_else(|| ClientError::xml("unbalanced end tag"))?;
                let (name, value) = frame.close();
                place(&mut stack, &mut root, name, value);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(ClientError::xml("document ended inside an element"));
    }
    root.ok_or_else(|| ClientError::xml("empty document"))
}

fn place(stack: &mut [Frame], root: &mut Option<Value>, name: String, value: Value) {
    match stack.last_mut() {
        Some(parent) => attach(&mut parent.fields, name, value),
        None => *root = Some(value),
    }
}

fn attach(fields: &mut Map<String, Value>, key: String, value: Value) {
    match fields.get_mut(&key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            fields.insert(key, value);
        }
    }
}
