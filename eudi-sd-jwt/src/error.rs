/// Errors reading or checking an SD-JWT presentation
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Not of the form `issuer-jwt~disclosure~...~kb-jwt`
    #[error("Malformed SD-JWT presentation: {0}")]
    MalformedToken(String),

    /// JWT payload claims were not a JSON object
    #[error("JWT payload claims were not a JSON object")]
    ClaimsWrongType,

    /// Value of `_sd_alg` is not a supported hash algorithm
    #[error("Unsupported value of _sd_alg: {0}")]
    UnsupportedSdAlg(String),

    /// A disclosure or a digest container is malformed
    #[error("Invalid disclosure: {0}")]
    InvalidDisclosure(String),

    /// Two disclosures hash to the same digest
    #[error("Multiple disclosures given with the same hash")]
    MultipleDisclosuresWithSameHash,

    /// A disclosure claim would collide with an existing JWT claim
    #[error("Disclosed claim `{0}` collides with an existing claim")]
    DisclosureClaimCollidesWithJwtClaim(String),

    /// A single disclosure digest was referenced more than once
    #[error("A single disclosure was used multiple times")]
    DisclosureUsedMultipleTimes,

    /// Found an array item disclosure when expecting a property
    #[error("Found an array item disclosure when expecting a property")]
    ArrayDisclosureWhenExpectingProperty,

    /// Found a property disclosure when expecting an array item
    #[error("Found a property disclosure when expecting an array item")]
    PropertyDisclosureWhenExpectingArray,

    /// A disclosure was not referenced by any digest
    #[error("A disclosure was not used during decoding")]
    UnusedDisclosure,

    /// Key Binding JWT missing, unsigned by the holder or bound to another challenge
    #[error("Holder binding invalid: {0}")]
    HolderBindingInvalid(String),

    #[error(transparent)]
    JWS(#[from] eudi_jws::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Errors in the issuance pathway
#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    /// The base claims did not serialize to a JSON object
    #[error("The base claims to encode did not become a JSON object")]
    EncodedAsNonObject,

    /// The base claims already contain `_sd` or `_sd_alg`
    #[error("The base claims to encode contained a property reserved by SD-JWT")]
    EncodedClaimsContainsReservedProperty,

    /// An array item disclosure targets a claim that is not an array
    #[error("A disclosure for an array item targets a claim that is not an array")]
    ExpectedArray,

    #[error(transparent)]
    JWS(#[from] eudi_jws::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
