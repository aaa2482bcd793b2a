use serde_json::Value;

use crate::Error;

/// A disclosure after base64url and JSON decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedDisclosure {
    pub salt: String,
    pub kind: DisclosureKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisclosureKind {
    /// `[salt, name, value]`, referenced from an `_sd` array.
    Property { name: String, value: Value },
    /// `[salt, value]`, referenced from a `{"...": digest}` array element.
    ArrayItem(Value),
}

impl DecodedDisclosure {
    pub fn new(encoded: &str) -> Result<Self, Error> {
        let bytes = base64::decode_config(encoded, base64::URL_SAFE_NO_PAD)
            .map_err(|e| Error::InvalidDisclosure(format!("not base64url: {e}")))?;
        let json: Value = serde_json::from_slice(&bytes)
            .map_err(|e| Error::InvalidDisclosure(format!("not JSON: {e}")))?;

        let values = match json {
            Value::Array(values) => values,
            _ => return Err(Error::InvalidDisclosure("not a JSON array".to_string())),
        };
        let salt = match values.first() {
            Some(Value::String(salt)) => salt.clone(),
            _ => return Err(Error::InvalidDisclosure("salt must be a string".to_string())),
        };
        let kind = match values.as_slice() {
            [_, Value::String(name), value] => {
                if name == crate::SD_CLAIM_NAME || name == crate::ARRAY_CLAIM_ITEM_PROPERTY_NAME {
                    return Err(Error::InvalidDisclosure(format!(
                        "reserved claim name `{name}`"
                    )));
                }
                DisclosureKind::Property {
                    name: name.clone(),
                    value: value.clone(),
                }
            }
            [_, _, _] => {
                return Err(Error::InvalidDisclosure(
                    "claim name must be a string".to_string(),
                ))
            }
            [_, value] => DisclosureKind::ArrayItem(value.clone()),
            _ => {
                return Err(Error::InvalidDisclosure(format!(
                    "expected 2 or 3 elements, found {}",
                    values.len()
                )))
            }
        };
        Ok(Self { salt, kind })
    }
}
