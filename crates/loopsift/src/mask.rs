//! Node visitation masks: bitsets over graph node indices of unbounded width.
//!
//! Purpose
//! - Record which graph nodes a route (or a drawn region) touches. Road graphs
//!   routinely have tens of thousands of nodes, so no machine word is wide enough.
//! - Provide the few set predicates the filter pipeline needs (union, intersection
//!   test, subset test, zero test) without allocating on the per-route path.
//!
//! Conventions
//! - The zero mask means "no constraint" wherever a mask acts as a constraint,
//!   never "match nothing".
//! - Text: rendered as decimal; parsed from decimal or `0x`-prefixed hex.
//! - Wire masks are decoded leniently through `WireMask`; only `NodeMask::from_str`
//!   reports errors.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::Zero;
use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Arbitrary-width bitset; bit `i` set iff node `i` is a member.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodeMask(BigUint);

/// Strict parse failure for mask text.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MaskParseError {
    #[error("empty mask text")]
    Empty,
    #[error("invalid {radix} digits in mask text {text:?}")]
    InvalidDigits { text: String, radix: &'static str },
}

impl NodeMask {
    #[inline]
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    /// Mask with bit `n` set for every node index `n`.
    pub fn from_nodes<I: IntoIterator<Item = u64>>(nodes: I) -> Self {
        let mut bits = BigUint::zero();
        for n in nodes {
            bits.set_bit(n, true);
        }
        Self(bits)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn contains(&self, node: u64) -> bool {
        self.0.bit(node)
    }

    /// Number of member nodes.
    #[inline]
    pub fn count(&self) -> u64 {
        self.0.count_ones()
    }

    /// Index of the highest set bit plus one (0 for the zero mask).
    #[inline]
    pub fn bit_width(&self) -> u64 {
        self.0.bits()
    }

    pub fn union(&self, other: &NodeMask) -> NodeMask {
        Self(&self.0 | &other.0)
    }

    pub fn union_in_place(&mut self, other: &NodeMask) {
        self.0 |= &other.0;
    }

    /// `self AND other != 0`, word by word.
    pub fn intersects(&self, other: &NodeMask) -> bool {
        self.0
            .iter_u64_digits()
            .zip(other.0.iter_u64_digits())
            .any(|(a, b)| a & b != 0)
    }

    /// Every bit of `self` is also set in `other`.
    ///
    /// `BigUint` is normalized (no high zero words), so a word of `self` past the
    /// end of `other` is nonzero and correctly fails the test.
    pub fn is_subset_of(&self, other: &NodeMask) -> bool {
        let mut theirs = other.0.iter_u64_digits();
        self.0.iter_u64_digits().all(|a| {
            let b = theirs.next().unwrap_or(0);
            a & !b == 0
        })
    }

    /// `|a ∩ b| / |a ∪ b|`; 0 when both masks are empty.
    pub fn jaccard(&self, other: &NodeMask) -> f64 {
        let inter: u64 = self
            .0
            .iter_u64_digits()
            .zip(other.0.iter_u64_digits())
            .map(|(a, b)| u64::from((a & b).count_ones()))
            .sum();
        let union = self.union(other).count();
        if union == 0 {
            0.0
        } else {
            inter as f64 / union as f64
        }
    }

    /// Lowercase hex with `0x` prefix (the generator's rendering).
    pub fn to_hex(&self) -> String {
        format!("0x{:x}", self.0)
    }
}

impl FromStr for NodeMask {
    type Err = MaskParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.is_empty() {
            return Err(MaskParseError::Empty);
        }
        let (digits, radix, radix_name) = match t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
            Some(hex) => (hex, 16, "hex"),
            None => (t, 10, "decimal"),
        };
        // parse_bytes would accept a sign or separators; masks are bare digits.
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return Err(MaskParseError::InvalidDigits {
                text: s.to_string(),
                radix: radix_name,
            });
        }
        BigUint::parse_bytes(digits.as_bytes(), radix)
            .map(NodeMask)
            .ok_or_else(|| MaskParseError::InvalidDigits {
                text: s.to_string(),
                radix: radix_name,
            })
    }
}

impl fmt::Display for NodeMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeMask {
    fn from(v: u64) -> Self {
        Self(BigUint::from(v))
    }
}

impl Serialize for NodeMask {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NodeMask {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StrictVisitor;

        impl<'de> Visitor<'de> for StrictVisitor {
            type Value = NodeMask;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal or 0x-hex mask string, or a non-negative integer")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<NodeMask, E> {
                Ok(NodeMask::from(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<NodeMask, E> {
                u64::try_from(v)
                    .map(NodeMask::from)
                    .map_err(|_| E::custom("negative mask"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<NodeMask, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(StrictVisitor)
    }
}

/// A mask field as it arrived on the wire, decoded without failing.
///
/// Producers are untrusted; a bad mask must degrade to "no constraint" rather than
/// reject the whole event. Callers inspect `is_malformed` for diagnostics, then
/// take the mask with `into_mask`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum WireMask {
    #[default]
    Missing,
    Valid(NodeMask),
    Malformed(String),
}

impl WireMask {
    #[inline]
    pub fn is_malformed(&self) -> bool {
        matches!(self, WireMask::Malformed(_))
    }

    pub fn into_mask(self) -> NodeMask {
        match self {
            WireMask::Valid(mask) => mask,
            WireMask::Missing => NodeMask::zero(),
            WireMask::Malformed(text) => {
                tracing::warn!(text = %text, "malformed mask treated as zero");
                NodeMask::zero()
            }
        }
    }
}

impl From<NodeMask> for WireMask {
    fn from(mask: NodeMask) -> Self {
        WireMask::Valid(mask)
    }
}

impl Serialize for WireMask {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            WireMask::Missing => serializer.serialize_none(),
            WireMask::Valid(mask) => mask.serialize(serializer),
            WireMask::Malformed(text) => serializer.serialize_str(text),
        }
    }
}

impl<'de> Deserialize<'de> for WireMask {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LenientVisitor;

        impl<'de> Visitor<'de> for LenientVisitor {
            type Value = WireMask;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("any value (masks are decoded leniently)")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<WireMask, E> {
                Ok(WireMask::Valid(NodeMask::from(v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<WireMask, E> {
                Ok(match u64::try_from(v) {
                    Ok(u) => WireMask::Valid(NodeMask::from(u)),
                    Err(_) => WireMask::Malformed(v.to_string()),
                })
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<WireMask, E> {
                Ok(WireMask::Malformed(v.to_string()))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<WireMask, E> {
                Ok(WireMask::Malformed(v.to_string()))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<WireMask, E> {
                Ok(match v.parse() {
                    Ok(mask) => WireMask::Valid(mask),
                    Err(_) => WireMask::Malformed(v.to_string()),
                })
            }

            fn visit_none<E: de::Error>(self) -> Result<WireMask, E> {
                Ok(WireMask::Missing)
            }

            fn visit_unit<E: de::Error>(self) -> Result<WireMask, E> {
                Ok(WireMask::Missing)
            }

            fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<WireMask, D2::Error> {
                d.deserialize_any(LenientVisitor)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<WireMask, A::Error> {
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(WireMask::Malformed("<array>".to_string()))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<WireMask, A::Error> {
                while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
                Ok(WireMask::Malformed("<object>".to_string()))
            }
        }

        deserializer.deserialize_any(LenientVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(v: u64) -> NodeMask {
        NodeMask::from(v)
    }

    #[test]
    fn subset_and_intersection_small() {
        assert!(m(0b101).is_subset_of(&m(0b111)));
        assert!(m(0b101).is_subset_of(&m(0b101)));
        assert!(!m(0b101).is_subset_of(&m(0b010)));
        assert!(m(0b010).intersects(&m(0b110)));
        assert!(!m(0b010).intersects(&m(0b101)));
        // zero is a subset of everything and intersects nothing
        assert!(NodeMask::zero().is_subset_of(&m(0)));
        assert!(!NodeMask::zero().intersects(&m(u64::MAX)));
    }

    #[test]
    fn wide_masks_beyond_machine_words() {
        let wide = NodeMask::from_nodes([3, 70, 20_000]);
        let visited = NodeMask::from_nodes([1, 3, 70, 150, 20_000]);
        assert!(wide.contains(20_000));
        assert!(!wide.contains(20_001));
        assert_eq!(wide.count(), 3);
        assert_eq!(wide.bit_width(), 20_001);
        assert!(wide.is_subset_of(&visited));
        // Visited is shorter than the mask: high word must fail the subset test.
        let short = NodeMask::from_nodes([3, 70]);
        assert!(!wide.is_subset_of(&short));
        assert!(wide.intersects(&short));
        assert!(!NodeMask::from_nodes([20_000]).intersects(&short));
    }

    #[test]
    fn union_accumulates() {
        let mut acc = NodeMask::zero();
        acc.union_in_place(&m(0b100));
        acc.union_in_place(&NodeMask::from_nodes([200]));
        assert!(acc.contains(2) && acc.contains(200));
        assert_eq!(acc, m(0b100).union(&NodeMask::from_nodes([200])));
    }

    #[test]
    fn jaccard_matches_generator_definition() {
        assert_eq!(NodeMask::zero().jaccard(&NodeMask::zero()), 0.0);
        assert!((m(0b111).jaccard(&m(0b101)) - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(m(0b100).jaccard(&m(0b011)), 0.0);
    }

    #[test]
    fn parse_decimal_hex_and_errors() {
        let big = "340282366920938463463374607431768211457"; // 2^128 + 1
        let mask: NodeMask = big.parse().unwrap();
        assert!(mask.contains(128) && mask.contains(0));
        assert_eq!(mask.count(), 2);
        assert_eq!(mask.to_string(), big);
        assert_eq!("0x5".parse::<NodeMask>().unwrap(), m(5));
        assert_eq!(m(255).to_hex(), "0xff");
        assert_eq!("".parse::<NodeMask>(), Err(MaskParseError::Empty));
        assert!(matches!(
            "-5".parse::<NodeMask>(),
            Err(MaskParseError::InvalidDigits { .. })
        ));
        assert!("0x".parse::<NodeMask>().is_err());
        assert!("12ab".parse::<NodeMask>().is_err());
    }

    #[test]
    fn wire_mask_is_lenient() {
        let cases: Vec<(&str, WireMask)> = vec![
            (r#""5""#, WireMask::Valid(m(5))),
            (r#""0x10""#, WireMask::Valid(m(16))),
            ("7", WireMask::Valid(m(7))),
            ("null", WireMask::Missing),
            (r#""zz""#, WireMask::Malformed("zz".into())),
            ("-1", WireMask::Malformed("-1".into())),
            ("[1,2]", WireMask::Malformed("<array>".into())),
        ];
        for (json, want) in cases {
            let got: WireMask = serde_json::from_str(json).unwrap();
            assert_eq!(got, want, "{json}");
        }
        assert!(WireMask::Malformed("x".into()).is_malformed());
        assert!(WireMask::Malformed("x".into()).into_mask().is_zero());
    }

    #[test]
    fn serde_uses_decimal_strings() {
        let mask = NodeMask::from_nodes([0, 64]);
        let json = serde_json::to_string(&mask).unwrap();
        assert_eq!(json, "\"18446744073709551617\"");
        let back: NodeMask = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mask);
        assert!(serde_json::from_str::<NodeMask>("\"bad\"").is_err());
    }
}
