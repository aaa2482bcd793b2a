use eudi_trust::TrustError;
use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum VpError {
    #[error("Unsupported presentation format: {0}")]
    VPFormatNotSupported(String),
    #[error("Malformed presentation: {0}")]
    MalformedToken(String),
    #[error("Missing issuer (`iss`) in the credential")]
    MissingIssuer,
    #[error("Invalid issuer signature: {0}")]
    SignatureInvalid(String),
    #[error("Invalid holder key binding: {0}")]
    HolderBindingInvalid(String),
    #[error("Presentation expired at {0}")]
    PresentationExpired(i64),
    #[error("Credential issued by {0} is revoked")]
    CredentialRevoked(String),
    #[error("Invalid disclosures: {0}")]
    Disclosure(#[source] eudi_sd_jwt::Error),
    #[error(transparent)]
    Trust(#[from] TrustError),
}

impl From<eudi_sd_jwt::Error> for VpError {
    fn from(e: eudi_sd_jwt::Error) -> Self {
        match e {
            eudi_sd_jwt::Error::MalformedToken(reason) => Self::MalformedToken(reason),
            eudi_sd_jwt::Error::HolderBindingInvalid(reason) => Self::HolderBindingInvalid(reason),
            eudi_sd_jwt::Error::JWS(e) => Self::MalformedToken(e.to_string()),
            eudi_sd_jwt::Error::Json(e) => Self::MalformedToken(e.to_string()),
            eudi_sd_jwt::Error::ClaimsWrongType => {
                Self::MalformedToken("issuer JWT claims are not an object".to_string())
            }
            e => Self::Disclosure(e),
        }
    }
}
