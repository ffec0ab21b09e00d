//! Razones de fallo.
//!
//! Una `Reason` es un token opaco comparable. Puede ser un token plano
//! (`"foo"`) o una constante de una enumeración tipada (`Errors.foo = 1`). El
//! motor sólo necesita igualdad y una representación textual estable para
//! los diagnósticos; esa representación es el `Display` de este tipo.
use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};

/// Token de fallo declarado en un protocolo.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// Token plano. Se representa entre comillas: `'foo'`.
    Token(String),
    /// Constante de una enumeración. Se representa como `<Errors.foo: 1>`.
    Member { enumeration: String, name: String, value: i64 },
}

impl Reason {
    pub fn token(token: impl Into<String>) -> Self {
        Reason::Token(token.into())
    }

    pub fn member(enumeration: impl Into<String>, name: impl Into<String>, value: i64) -> Self {
        Reason::Member { enumeration: enumeration.into(),
                         name: name.into(),
                         value }
    }

    /// Nombre simbólico: el propio token o el nombre de la constante.
    pub fn name(&self) -> &str {
        match self {
            Reason::Token(token) => token,
            Reason::Member { name, .. } => name,
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Token(token) => f.write_str(&quoted(token)),
            Reason::Member { enumeration, name, value } => write!(f, "<{enumeration}.{name}: {value}>"),
        }
    }
}

impl From<&str> for Reason {
    fn from(token: &str) -> Self {
        Reason::Token(token.to_string())
    }
}

impl From<String> for Reason {
    fn from(token: String) -> Self {
        Reason::Token(token)
    }
}

impl From<&Reason> for Reason {
    fn from(reason: &Reason) -> Self {
        reason.clone()
    }
}

/// Entrecomilla un texto como lo hacen los mensajes de diagnóstico: comillas
/// simples, salvo que el texto contenga una comilla simple y ninguna doble.
pub(crate) fn quoted(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if !is_printable(c) => {
                let code = c as u32;
                let _ = match code {
                    0..=0xff => write!(out, "\\x{code:02x}"),
                    0x100..=0xffff => write!(out, "\\u{code:04x}"),
                    _ => write!(out, "\\U{code:08x}"),
                };
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Caracteres que se muestran tal cual dentro de una razón. Quedan fuera los
/// de control, los separadores distintos del espacio, los de formato, los de
/// uso privado y los no-caracteres.
fn is_printable(c: char) -> bool {
    let code = c as u32;
    if c.is_control() || code & 0xfffe == 0xfffe {
        return false;
    }
    !matches!(code,
              0xa0
              | 0xad
              | 0x600..=0x605
              | 0x61c
              | 0x6dd
              | 0x70f
              | 0x1680
              | 0x180e
              | 0x2000..=0x200f
              | 0x2028..=0x202f
              | 0x205f..=0x2064
              | 0x2066..=0x206f
              | 0x3000
              | 0xe000..=0xf8ff
              | 0xfdd0..=0xfdef
              | 0xfeff
              | 0xfff9..=0xfffb
              | 0x110bd
              | 0x1d173..=0x1d17a
              | 0xe0001
              | 0xe0020..=0xe007f
              | 0xf0000..)
}

/// Lista separada por comas, tal como aparece en "Available failures are: ...".
pub(crate) fn listing(reasons: &[Reason]) -> String {
    reasons.iter().map(Reason::to_string).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_use_single_quotes_by_default() {
        assert_eq!(Reason::from("foo").to_string(), "'foo'");
        assert_eq!(Reason::from("a\\b").to_string(), r"'a\\b'");
    }

    #[test]
    fn tokens_with_single_quote_switch_to_double_quotes() {
        assert_eq!(Reason::from("'foo' is too big").to_string(), "\"'foo' is too big\"");
    }

    #[test]
    fn tokens_with_both_quotes_escape_the_single_one() {
        assert_eq!(Reason::from("it's \"x\"").to_string(), r#"'it\'s "x"'"#);
    }

    #[test]
    fn invisible_characters_are_escaped_by_width() {
        assert_eq!(Reason::from("a\u{2028}b").to_string(), r"'a\u2028b'");
        assert_eq!(Reason::from("no\u{a0}space").to_string(), r"'no\xa0space'");
        assert_eq!(Reason::from("\u{feff}x\u{7f}").to_string(), r"'\ufeffx\x7f'");
        assert_eq!(Reason::from("tag\u{e0041}").to_string(), r"'tag\U000e0041'");
        assert_eq!(Reason::from("ñandú €").to_string(), "'ñandú €'");
    }

    #[test]
    fn members_render_with_enumeration_and_value() {
        assert_eq!(Reason::member("Errors", "foo", 1).to_string(), "<Errors.foo: 1>");
        assert_eq!(Reason::member("Errors", "foo", 1).name(), "foo");
    }

    #[test]
    fn token_and_member_with_same_name_are_different_reasons() {
        assert_ne!(Reason::from("foo"), Reason::member("Errors", "foo", 1));
    }

    #[test]
    fn listing_joins_with_comma() {
        let reasons = vec![Reason::from("foo"), Reason::from("bar")];
        assert_eq!(listing(&reasons), "'foo', 'bar'");
        assert_eq!(listing(&[]), "");
    }
}
