use axum::http::HeaderMap;

/// Header carrying the shared secret on every protected request.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Constant-time equality comparison for secret strings.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// True when `X-API-Key` is present and equals `expected`.
///
/// An empty `expected` never authenticates anything.
pub fn validate_api_key(headers: &HeaderMap, expected: &str) -> bool {
    if expected.is_empty() {
        return false;
    }

    headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|presented| constant_time_eq(presented, expected))
}

/// 128 random bits, hex encoded.
pub fn generate_api_key() -> String {
    use rand::RngCore;
    let mut buf = [0u8; 16];
    rand::rng().fill_bytes(&mut buf);
    hex::encode(buf)
}
