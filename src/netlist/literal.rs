use super::Literal;
use crate::data_structures::fits;
use crate::{BigUint, BuildError};
use num_enum::IntoPrimitive;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Radix of the digits in a [ConstLiteral].
#[repr(u32)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, IntoPrimitive)]
pub enum Radix {
    Binary = 2,
    Octal = 8,
    Decimal = 10,
    Hex = 16,
}

impl Radix {
    /// Returns the [Radix] for a tag letter, case insensitive.
    pub fn from_tag(tag: char) -> Option<Radix> {
        match tag.to_ascii_lowercase() {
            'b' => Some(Radix::Binary),
            'o' => Some(Radix::Octal),
            'd' => Some(Radix::Decimal),
            'h' => Some(Radix::Hex),
            _ => None,
        }
    }

    pub fn tag(&self) -> char {
        match self {
            Radix::Binary => 'b',
            Radix::Octal => 'o',
            Radix::Decimal => 'd',
            Radix::Hex => 'h',
        }
    }
}

/// Width qualified constant in `width'radix digits` notation, like `8'hff` or `4'b1010`.
///
/// Underscores between digits are ignored. The value is checked against the width when the
/// literal is built, never later.
///
/// # Example
/// ```
/// # use rtlsim::{ConstLiteral, Radix, BigUint};
/// let l: ConstLiteral = "12'h0_ff".parse().unwrap();
/// assert_eq!(l.width(), 12);
/// assert_eq!(l.radix(), Radix::Hex);
/// assert_eq!(l.value(), &BigUint::from(255u32));
///
/// assert!("2'd5".parse::<ConstLiteral>().is_err());
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ConstLiteral {
    width: usize,
    radix: Radix,
    digits: String,
    value: BigUint,
}

impl ConstLiteral {
    /// Returns a new [ConstLiteral] after checking that `digits` are valid in `radix`
    /// and that their value fits in `width` bits.
    pub fn new<S: Into<String>>(width: usize, radix: Radix, digits: S) -> Result<Self, BuildError> {
        let digits = digits.into();
        let literal = || format!("{}'{}{}", width, radix.tag(), digits);
        if width == 0 {
            return Err(BuildError::MalformedLiteral {
                literal: literal(),
                reason: "width must be positive",
            });
        }
        let cleaned: Vec<u8> = digits.bytes().filter(|b| *b != b'_').collect();
        if cleaned.is_empty() {
            return Err(BuildError::MalformedLiteral {
                literal: literal(),
                reason: "no digits",
            });
        }
        let value = BigUint::parse_bytes(&cleaned, radix.into()).ok_or_else(|| {
            BuildError::MalformedLiteral {
                literal: literal(),
                reason: "digits are not valid in the given radix",
            }
        })?;
        if !fits(&value, width) {
            return Err(BuildError::ConstantTooWide { value, width });
        }
        Ok(Self {
            width,
            radix,
            digits,
            value,
        })
    }

    /// Parses `width'radix digits`, the radix tag is one of `b`, `o`, `d` or `h`.
    pub fn parse(s: &str) -> Result<Self, BuildError> {
        let malformed = |reason| BuildError::MalformedLiteral {
            literal: s.to_string(),
            reason,
        };
        let (width, rest) = s
            .trim()
            .split_once('\'')
            .ok_or_else(|| malformed("expected width'radix digits"))?;
        let width: usize = width
            .trim()
            .parse()
            .map_err(|_| malformed("width is not a number"))?;
        let mut chars = rest.chars();
        let radix = chars
            .next()
            .and_then(Radix::from_tag)
            .ok_or_else(|| malformed("radix must be one of b, o, d, h"))?;
        Self::new(width, radix, chars.as_str())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn radix(&self) -> Radix {
        self.radix
    }

    pub fn digits(&self) -> &str {
        &self.digits
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }
}

impl FromStr for ConstLiteral {
    type Err = BuildError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for ConstLiteral {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}'{}{}", self.width, self.radix.tag(), self.digits)
    }
}

impl From<ConstLiteral> for Literal {
    fn from(l: ConstLiteral) -> Self {
        Literal::sized(l.value, l.width)
    }
}
