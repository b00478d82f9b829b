//! Adapters that turn an outside event into a nickname for one copy run.

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::store::NickState;

pub const COPY_MESSAGE_TYPE: &str = "COPY_SWEA_STATS";

/// Nickname carried by an inbound message, or `None` for messages that are
/// not copy requests.
pub fn nick_from_message(raw: &str) -> Result<Option<String>> {
    let payload: Value = serde_json::from_str(raw).context("failed to decode inbound message")?;
    if payload.get("type").and_then(Value::as_str) != Some(COPY_MESSAGE_TYPE) {
        return Ok(None);
    }
    let nick = payload
        .get("nick")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Ok(Some(nick))
}

/// A key press with its modifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyPress {
    /// Parse chords such as `ctrl+shift+y` or `Cmd+Shift+Y`.
    pub fn parse(chord: &str) -> Result<Self> {
        let mut press = Self::default();
        for part in chord.split('+').map(str::trim) {
            match part.to_ascii_lowercase().as_str() {
                "" => bail!("empty key in chord: {chord}"),
                "shift" => press.shift = true,
                "ctrl" | "control" => press.ctrl = true,
                "meta" | "cmd" | "command" | "super" => press.meta = true,
                _ => {
                    if !press.key.is_empty() {
                        bail!("chord has more than one key: {chord}");
                    }
                    press.key = part.to_string();
                }
            }
        }
        if press.key.is_empty() {
            bail!("chord has no key: {chord}");
        }
        Ok(press)
    }

    /// Ctrl+Shift+Y, or Cmd+Shift+Y on macOS.
    pub fn is_copy_shortcut(&self) -> bool {
        self.key.eq_ignore_ascii_case("y") && self.shift && (self.ctrl || self.meta)
    }
}

/// Nickname for a shortcut press, or `None` when the press is not bound.
pub fn nick_from_shortcut(press: &KeyPress, state: &NickState) -> Option<String> {
    press.is_copy_shortcut().then(|| state.shortcut_nick())
}

#[cfg(test)]
mod tests {
    use super::{KeyPress, nick_from_message, nick_from_shortcut};
    use crate::store::NickState;

    #[test]
    fn copy_message_yields_nick() {
        let nick = nick_from_message(r#"{"type":"COPY_SWEA_STATS","nick":"alice"}"#)
            .expect("decode");
        assert_eq!(nick.as_deref(), Some("alice"));
    }

    #[test]
    fn missing_or_non_string_nick_means_latest() {
        assert_eq!(
            nick_from_message(r#"{"type":"COPY_SWEA_STATS"}"#)
                .expect("decode")
                .as_deref(),
            Some("")
        );
        assert_eq!(
            nick_from_message(r#"{"type":"COPY_SWEA_STATS","nick":null}"#)
                .expect("decode")
                .as_deref(),
            Some("")
        );
    }

    #[test]
    fn other_messages_are_ignored() {
        assert!(nick_from_message(r#"{"type":"PING"}"#).expect("decode").is_none());
        assert!(nick_from_message("[]").expect("decode").is_none());
        assert!(nick_from_message("not json").is_err());
    }

    #[test]
    fn chord_parsing_and_binding() {
        assert!(KeyPress::parse("ctrl+shift+y").expect("parse").is_copy_shortcut());
        assert!(KeyPress::parse("Cmd+Shift+Y").expect("parse").is_copy_shortcut());
        assert!(!KeyPress::parse("ctrl+y").expect("parse").is_copy_shortcut());
        assert!(!KeyPress::parse("shift+y").expect("parse").is_copy_shortcut());
        assert!(!KeyPress::parse("ctrl+shift+u").expect("parse").is_copy_shortcut());
        assert!(KeyPress::parse("ctrl+shift").is_err());
        assert!(KeyPress::parse("ctrl+a+b").is_err());
    }

    #[test]
    fn shortcut_resolves_nick_from_state() {
        let state = NickState {
            favorites: vec!["fav".to_string()],
            last_nick: String::new(),
        };
        let press = KeyPress::parse("ctrl+shift+y").expect("parse");
        assert_eq!(nick_from_shortcut(&press, &state).as_deref(), Some("fav"));

        let unbound = KeyPress::parse("ctrl+shift+k").expect("parse");
        assert!(nick_from_shortcut(&unbound, &state).is_none());
    }
}
