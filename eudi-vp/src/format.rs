use serde_json::{Map, Value};

use crate::VpError;

/// Presentation formats recognised from the JOSE `typ` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VpFormat {
    /// SD-JWT VC with Key Binding.
    SdJwtVc,
    /// ISO mdoc. Recognised, not verifiable.
    MsoMdoc,
}

impl VpFormat {
    /// Case-insensitive `typ` lookup.
    pub fn from_typ(typ: &str) -> Option<Self> {
        match typ.to_ascii_lowercase().as_str() {
            "vc+sd-jwt" | "dc+sd-jwt" | "jwt" => Some(Self::SdJwtVc),
            "mso_mdoc" | "mdoc_cbor" => Some(Self::MsoMdoc),
            _ => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, Self::SdJwtVc)
    }
}

/// Header of the first JWS in a presentation; for SD-JWT that is the issuer JWT.
fn leading_header(token: &str) -> Result<Map<String, Value>, VpError> {
    let jws = token.split('~').next().unwrap_or_default();
    eudi_jws::decode_header_map(jws)
        .map_err(|e| VpError::MalformedToken(format!("undecodable header: {e}")))
}

fn leading_payload(token: &str) -> Result<Map<String, Value>, VpError> {
    let jws = token.split('~').next().unwrap_or_default();
    eudi_jws::decode_payload_unverified(jws)
        .map_err(|e| VpError::MalformedToken(format!("undecodable payload: {e}")))
}

/// Declared `typ` of a presentation.
pub fn infer_vp_typ(token: &str) -> Result<String, VpError> {
    match leading_header(token)?.get("typ") {
        Some(Value::String(typ)) => Ok(typ.clone()),
        _ => Err(VpError::MalformedToken("missing `typ` header".to_string())),
    }
}

/// `iss` claim of a presentation, signature unchecked.
pub fn infer_vp_iss(token: &str) -> Result<String, VpError> {
    match leading_payload(token)?.get("iss") {
        Some(Value::String(iss)) if !iss.is_empty() => Ok(iss.clone()),
        _ => Err(VpError::MissingIssuer),
    }
}

/// Pick the verifier for a presentation. Formats without a verifier are
/// refused with [`VpError::VPFormatNotSupported`].
pub fn select_parser(token: &str) -> Result<VpFormat, VpError> {
    let typ = infer_vp_typ(token)?;
    match VpFormat::from_typ(&typ) {
        Some(format) if format.is_supported() => Ok(format),
        Some(format) => {
            log::debug!("{:?} presentations cannot be verified", format);
            Err(VpError::VPFormatNotSupported(typ))
        }
        None => Err(VpError::VPFormatNotSupported(typ)),
    }
}
