//! Typed notation model
//!
//! Closed element variants produced by the schemas, plus the document
//! graph (parts, measures, events) the assembler builds from them.

/// A string-valued enumeration as it appears in MusicXML markup.
pub trait Keyword: Sized + Copy {
    /// Every accepted spelling, in declaration order.
    const ALLOWED: &'static [&'static str];

    fn from_keyword(text: &str) -> Option<Self>;

    fn as_keyword(self) -> &'static str;
}

/// Declares a keyword enum with serde names matching the markup spelling.
macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $crate::models::Keyword for $name {
            const ALLOWED: &'static [&'static str] = &[$($text),+];

            fn from_keyword(text: &str) -> Option<Self> {
                match text {
                    $( $text => Some(Self::$variant), )+
                    _ => None,
                }
            }

            fn as_keyword(self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::models::Keyword::as_keyword(*self))
            }
        }
    };
}

pub(crate) use keyword_enum;

pub mod elements;
pub mod score;

pub use elements::*;
pub use score::*;
