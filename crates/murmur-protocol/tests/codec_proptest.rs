use proptest::prelude::*;
use murmur_protocol::{decode, encode, Decoded, Message, Scope};

/// Strategy for generating random message scopes.
fn arb_scope() -> impl Strategy<Value = Scope> {
    prop_oneof![
        Just(Scope::Chat),
        "[a-z]{1,12}".prop_map(|to| Scope::Direct { to }),
        "[a-z]{1,12}".prop_map(|room| Scope::Room { room }),
    ]
}

proptest! {
    /// decode is total: any string, however hostile, must come back as a
    /// structured message or a raw fallback — never a panic.
    #[test]
    fn decode_never_panics(payload in ".{0,512}") {
        let _ = decode(&payload);
    }

    /// Same for arbitrary byte-heavy strings that look nothing like JSON.
    #[test]
    fn decode_handles_near_json(payload in "\\{.{0,256}") {
        let _ = decode(&payload);
    }

    /// Any message should survive an encode/decode roundtrip intact,
    /// whatever the text content (unicode, quotes, braces, newlines).
    #[test]
    fn roundtrip_message(
        from in "[a-zA-Z0-9_-]{1,16}",
        text in ".{0,200}",
        scope in arb_scope(),
    ) {
        let mut message = match &scope {
            Scope::Chat => Message::chat(&from, &text),
            Scope::Direct { to } => Message::direct(&from, to, &text),
            Scope::Room { room } => Message::room(&from, room, &text),
        };
        message.id = "proptest-id".to_string();

        match decode(&encode(&message)) {
            Decoded::Message(decoded) => prop_assert_eq!(&message, &decoded),
            Decoded::Raw(raw) => prop_assert!(false, "fell back to raw: {}", raw),
        }
    }

    /// A forwarded payload re-encodes byte-identically: decode then encode
    /// is stable, so dedup ids match across hops.
    #[test]
    fn reencode_is_stable(
        from in "[a-zA-Z0-9_-]{1,16}",
        text in ".{0,200}",
        scope in arb_scope(),
    ) {
        let message = match &scope {
            Scope::Chat => Message::chat(&from, &text),
            Scope::Direct { to } => Message::direct(&from, to, &text),
            Scope::Room { room } => Message::room(&from, room, &text),
        };
        let wire = encode(&message);

        match decode(&wire) {
            Decoded::Message(decoded) => prop_assert_eq!(&encode(&decoded), &wire),
            Decoded::Raw(_) => prop_assert!(false, "structured payload fell back to raw"),
        }
    }
}
