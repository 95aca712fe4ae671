//! Static payload corpora used across harnesses.
//!
//! Each corpus is a `&'static [&'static str]` of raw stream messages as an
//! upstream bot would publish them.

/// Well-formed payloads, each with a distinct id.
pub const PAYLOADS_VALID: &[&str] = &[
    r#"{"id":"p1","type":"TRADE","account":"user_8821","message":"Bought player Salah for 31000 coins.","amount":"-31000"}"#,
    r#"{"id":"p2","type":"SUCCESS","account":"user_9932","message":"Login successful."}"#,
    r#"{"id":"p3","type":"WARNING","account":"user_1102","message":"Rate limit approaching."}"#,
    r#"{"id":"p4","type":"ERROR","message":"Proxy connection timed out"}"#,
    r#"{"id":"p5","type":"INFO","account":"user_4451","message":"Market scan complete.","amount":120}"#,
];

/// Payloads the decoder must reject without affecting the subscription.
pub const PAYLOADS_MALFORMED: &[&str] = &[
    "not json at all",
    r#"["an","array"]"#,
    r#"{"id":"x1","type":"PANIC","message":"unknown type"}"#,
    r#"{"id":"x2","message":{"nested":true}}"#,
    "",
];

/// A payload with no id; the controller must mint one.
pub const PAYLOAD_WITHOUT_ID: &str = r#"{"type":"INFO","message":"heartbeat"}"#;

/// `n` distinct well-formed payloads with ids `bulk-0..n`.
pub fn bulk_payloads(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            format!(
                r#"{{"id":"bulk-{i}","type":"TRADE","account":"user_{}","message":"Fill {i}","amount":"+{}"}}"#,
                1000 + i % 7,
                i * 10
            )
        })
        .collect()
}
