//! Macro para declarar enumeraciones tipadas de razones de fallo.
//!
//! Exportada en la raíz del crate:
//!   use story_core::failure_enum;

/// Declara un enum cuyas variantes se convierten en `Reason::Member`.
///
/// ```ignore
/// failure_enum! {
///     pub enum Errors {
///         Foo => "foo",
///         Bar => "bar",
///     }
/// }
/// // Reason::from(Errors::Foo) se representa como <Errors.foo: 1>
/// // Errors::protocol() es el protocolo ['foo', 'bar'] tipado
/// ```
#[macro_export]
macro_rules! failure_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name { $($variant),+ }

        impl $name {
            /// Variantes en orden de declaración.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Nombre simbólico de la constante.
            pub fn label(self) -> &'static str {
                match self { $($name::$variant => $label),+ }
            }

            /// Valor numérico (desde 1, en orden de declaración).
            pub fn value(self) -> i64 {
                Self::ALL.iter().position(|m| *m == self).map_or(0, |i| i as i64 + 1)
            }

            /// Protocolo de fallos formado por todas las variantes.
            pub fn protocol() -> $crate::protocol::FailureProtocol {
                $crate::protocol::FailureProtocol::list(Self::ALL.iter().copied())
            }
        }

        impl From<$name> for $crate::protocol::Reason {
            fn from(member: $name) -> Self {
                $crate::protocol::Reason::member(stringify!($name), member.label(), member.value())
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::protocol::{FailureProtocol, Reason};

    failure_enum! {
        enum Errors {
            Foo => "foo",
            Bar => "bar",
            Baz => "baz",
        }
    }

    #[test]
    fn variants_convert_to_members() {
        assert_eq!(Reason::from(Errors::Foo).to_string(), "<Errors.foo: 1>");
        assert_eq!(Reason::from(Errors::Baz), Reason::member("Errors", "baz", 3));
    }

    #[test]
    fn protocol_matches_untyped_enumeration() {
        assert_eq!(Errors::protocol(), FailureProtocol::enumeration("Errors", ["foo", "bar", "baz"]));
        assert!(Errors::protocol().contains(&Errors::Bar.into()));
    }
}
