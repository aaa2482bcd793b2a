use eudi_jwk::{parse_from_certificate_chain, Error, Params};

const EC_CERT: &str = "MIIC5jCCAm2gAwIBAgIUOKnEHhXwrcwd64puzZyfBJkcuIcwCgYIKoZIzj0EAwIwgagxODA2BgNVBAMML0RWViBEaWdpLUlEIE1vY2sgQXR0cmlidXRlIFNlYWxpbmcgQ2VydGlmaWNhdGVzMSYwJAYDVQQKDB1EaWdpLSBqYSB2w6Rlc3TDtnRpZXRvdmlyYXN0bzERMA8GA1UEBwwISGVsc2lua2kxCzAJBgNVBAYTAkZJMRAwDgYDVQQIDAdGaW5sYW5kMRIwEAYDVQQFEwkwMjQ1NDM3LTIwHhcNMjQwNTE2MDg0NzI3WhcNMjUwNTE2MDg0NzI3WjCBpzE3MDUGA1UEAwwuRFZWIERpZ2ktSUQgTW9jayBBdHRyaWJ1dGUgU2VhbGluZyBDZXJ0aWZpY2F0ZTEmMCQGA1UECgwdRGlnaS0gamEgdsOkZXN0w7Z0aWV0b3ZpcmFzdG8xETAPBgNVBAcMCEhlbHNpbmtpMQswCQYDVQQGEwJGSTEQMA4GA1UECAwHRmlubGFuZDESMBAGA1UEBRMJMDI0NTQzNy0yMFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEWSiinTNQYqYel/KKgb4sUvIA5BgFfw+urJZEmQhBZnVpz+SgXhkhk6OMgFzcHAQfCc0Hp8REg66BHfs6UKJo2qN0MHIwDwYDVR0TAQH/BAUwAwIBADAOBgNVHQ8BAf8EBAMCB4AwFQYDVR0lAQH/BAswCQYHKIGMXQUBAjAZBgNVHRIEEjAQhg5odHRwczovL2R2di5maTAdBgNVHREEFjAUghJxYS5pZC5jbG91ZC5kdnYuZmkwCgYIKoZIzj0EAwIDZwAwZAIwBzlyCtU/OtiZX9OxN+uaiEmH2m8+cmlE04w82zoIDM0mtn+MSHhHWL6LFrmzN2aXAjBs3HcVpBw2JsiNbwLV9Eu3LsakhABP4Jyiz9rvx2erLACnEJOW0B4k2ZJoGHfZpVQ=";

const RSA_CERT: &str = "MIIDEzCCAfugAwIBAgIULFrcrfZZVhofBAS8GFEQOazGIqEwDQYJKoZIhvcNAQELBQAwGTEXMBUGA1UEAwwOaXNzdWVyLmV4YW1wbGUwHhcNMjYxMDE4MjIyNjE0WhcNMzYxMDE1MjIyNjE0WjAZMRcwFQYDVQQDDA5pc3N1ZXIuZXhhbXBsZTCCASIwDQYJKoZIhvcNAQEBBQADggEPADCCAQoCggEBANHeOfT+tiL0ZaiJHoLJtuVHtyUNZs/dmPHw9ld76WkZriXF1Fj2lLMvVUhYHFCFRjMRBg0PVfy950HeRW0G3LP7hWNbKwzmg0IV84itM1RZNR8+CPQoWkVWmpxRK5XILvKdqLcW5QPPhlB6H69qkB50DuY6agRrX2rd2o4crjp8UmhyMLyzxDfp7e8xhImGQzaGergOEVVBHOLcVdEl9BrSyMDEV40OOYKGC40XHd5xHx2erHIf3XDnyN9OVW9s6z6p+TZ3TbYoMct+Org2L1l5bAPVZqKIYeqQdB5cA37pFgQbOgDTudVqKiCz+XV1g6J4eS11uVS5hIT1jUwf8vUCAwEAAaNTMFEwHQYDVR0OBBYEFIQQzZOgBtW8kfsIuYZYOPKMEDkzMB8GA1UdIwQYMBaAFIQQzZOgBtW8kfsIuYZYOPKMEDkzMA8GA1UdEwEB/wQFMAMBAf8wDQYJKoZIhvcNAQELBQADggEBAFwVWlrY+u78CEDaMBl/Vr03QuUwx8VP5WahQsHpd4JIT5m0QJoQFQLl48BniPHskOVMK/1yMF9bTnCOMEiFFPCYLnqcruqG5ujGBzFqFhKz4Xh83m9EqWUFiN4eBgEIYy/MWQVmtbSaptHQhDxMHN/Ot+Aban4WTzGi3sc/sLObKa6cvHRf+9IORJ+ZJmkN+cLZDjRRfUEwE6eZo1tt1QXrrlHk9YjrnT9jhL8LD1ih7gAiZgEB6ZqPX2cNToY0+eIcpS47ZwZxRxzcSRrXdAx7XZFICK5+1joOHtTI/BOz8+0pcEdqSyQMluu6myyFWEt66q4CKa06roM1SH9uddQ=";

#[test_log::test]
fn ec_key_from_certificate() {
    let chain = vec![EC_CERT.to_string()];
    let jwk = parse_from_certificate_chain(&chain).unwrap();
    let value = serde_json::to_value(&jwk).unwrap();
    assert_eq!(value["kty"], "EC");
    assert_eq!(value["crv"], "P-256");
    assert_eq!(value["x"], "WSiinTNQYqYel_KKgb4sUvIA5BgFfw-urJZEmQhBZnU");
    assert_eq!(value["y"], "ac_koF4ZIZOjjIBc3BwEHwnNB6fERIOugR37OlCiaNo");
    assert_eq!(jwk.x509_certificate_chain, Some(chain));
}

#[test_log::test]
fn rsa_key_from_certificate() {
    let jwk = parse_from_certificate_chain(&[RSA_CERT.to_string()]).unwrap();
    let value = serde_json::to_value(&jwk).unwrap();
    assert_eq!(value["kty"], "RSA");
    assert_eq!(value["e"], "AQAB");
    assert_eq!(
        value["n"],
        "0d459P62IvRlqIkegsm25Ue3JQ1mz92Y8fD2V3vpaRmuJcXUWPaUsy9VSFgcUIVGMxEGDQ9V_L3nQd5FbQbcs_uFY1srDOaDQhXziK0zVFk1Hz4I9ChaRVaanFErlcgu8p2otxblA8-GUHofr2qQHnQO5jpqBGtfat3ajhyuOnxSaHIwvLPEN-nt7zGEiYZDNoZ6uA4RVUEc4txV0SX0GtLIwMRXjQ45goYLjRcd3nEfHZ6sch_dcOfI305Vb2zrPqn5NndNtigxy346uDYvWXlsA9Vmoohh6pB0HlwDfukWBBs6ANO51WoqILP5dXWDonh5LXW5VLmEhPWNTB_y9Q"
    );
    assert!(matches!(jwk.params, Params::RSA(_)));
}

#[test_log::test]
fn garbage_chain_is_an_invalid_key() {
    for chain in [
        vec![],
        vec!["not base64 at all!".to_string()],
        vec![base64::encode([0x30, 0x03, 0x02, 0x01, 0x05])],
    ] {
        match parse_from_certificate_chain(&chain) {
            Err(Error::InvalidKey(_)) => {}
            other => panic!("expected InvalidKey, got {other:?}"),
        }
    }
}
