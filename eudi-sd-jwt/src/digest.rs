use sha2::Digest;

use crate::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum SdAlg {
    #[default]
    Sha256,
}

impl SdAlg {
    const SHA256_STR: &'static str = "sha-256";

    pub fn to_str(&self) -> &'static str {
        match self {
            SdAlg::Sha256 => Self::SHA256_STR,
        }
    }

    /// Base64url digest of `data`.
    pub fn hash(&self, data: &[u8]) -> String {
        match self {
            SdAlg::Sha256 => {
                let digest = sha2::Sha256::digest(data);
                base64::encode_config(digest, base64::URL_SAFE_NO_PAD)
            }
        }
    }
}

impl TryFrom<&str> for SdAlg {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            Self::SHA256_STR => Ok(SdAlg::Sha256),
            other => Err(Error::UnsupportedSdAlg(other.to_owned())),
        }
    }
}

impl From<SdAlg> for &'static str {
    fn from(value: SdAlg) -> Self {
        value.to_str()
    }
}

/// Digest under which a disclosure is referenced, computed over its encoded ASCII form.
pub fn hash_encoded_disclosure(digest_algo: SdAlg, disclosure: &str) -> String {
    digest_algo.hash(disclosure.as_bytes())
}
