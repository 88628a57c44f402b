//! Flag types used by declaration nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

bitflags::bitflags! {
    /// Declaration modifiers, in source keyword order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Modifiers: u16 {
        const PUBLIC        = 1 << 0;
        const PROTECTED     = 1 << 1;
        const PRIVATE       = 1 << 2;
        const ABSTRACT      = 1 << 3;
        const STATIC        = 1 << 4;
        const FINAL         = 1 << 5;
        const TRANSIENT     = 1 << 6;
        const VOLATILE      = 1 << 7;
        const SYNCHRONIZED  = 1 << 8;
        const NATIVE        = 1 << 9;
        const STRICTFP      = 1 << 10;
        const DEFAULT       = 1 << 11;

        const ACCESS = Self::PUBLIC.bits() | Self::PROTECTED.bits() | Self::PRIVATE.bits();
    }
}

const KEYWORDS: &[(Modifiers, &str)] = &[
    (Modifiers::PUBLIC, "public"),
    (Modifiers::PROTECTED, "protected"),
    (Modifiers::PRIVATE, "private"),
    (Modifiers::ABSTRACT, "abstract"),
    (Modifiers::STATIC, "static"),
    (Modifiers::FINAL, "final"),
    (Modifiers::TRANSIENT, "transient"),
    (Modifiers::VOLATILE, "volatile"),
    (Modifiers::SYNCHRONIZED, "synchronized"),
    (Modifiers::NATIVE, "native"),
    (Modifiers::STRICTFP, "strictfp"),
    (Modifiers::DEFAULT, "default"),
];

impl Modifiers {
    /// The flag for a modifier keyword, or `None` for any other word.
    pub fn from_keyword(keyword: &str) -> Option<Modifiers> {
        KEYWORDS.iter().find(|(_, k)| *k == keyword).map(|(m, _)| *m)
    }

    /// Keywords of the set flags.
    pub fn keywords(self) -> impl Iterator<Item = &'static str> {
        KEYWORDS.iter().filter(move |(m, _)| self.contains(*m)).map(|(_, k)| *k)
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Modifiers::empty()
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for keyword in self.keywords() {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{}", keyword)?;
            first = false;
        }
        Ok(())
    }
}
