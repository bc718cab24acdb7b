//! Arbitrary-precision signed integers with modular helpers.
//!
//! Thin value type over `num_bigint::BigInt`. Every operation returns a new
//! value; `AddAssign`/`MulAssign` are the only in-place (accumulator) forms.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub};
use std::str::FromStr;

use num_bigint::{BigInt, Sign};
use num_integer::Integer as _;
use num_traits::{Num, One, Signed, ToPrimitive, Zero};

use crate::error::{range_err, FvError, Result};

/// Signed integer of unbounded precision.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Integer(BigInt);

impl Integer {
    pub fn zero() -> Self {
        Integer(BigInt::zero())
    }

    pub fn one() -> Self {
        Integer(BigInt::one())
    }

    /// Parse `s` in the given radix (2..=36). A leading `-` is accepted.
    pub fn from_str_radix(s: &str, radix: u32) -> Result<Self> {
        if !(2..=36).contains(&radix) {
            return Err(FvError::Parse(format!("radix {} not in 2..=36", radix)));
        }
        BigInt::from_str_radix(s.trim(), radix)
            .map(Integer)
            .map_err(|e| FvError::Parse(format!("{:?} (radix {}): {}", s, radix, e)))
    }

    pub fn to_str_radix(&self, radix: u32) -> String {
        self.0.to_str_radix(radix)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.sign() == Sign::Minus
    }

    pub fn abs(&self) -> Self {
        Integer(self.0.abs())
    }

    /// Number of bits of `|self|` (0 for zero).
    pub fn bits(&self) -> u64 {
        self.0.bits()
    }

    pub fn pow(&self, exp: u32) -> Self {
        Integer(num_traits::pow(self.0.clone(), exp as usize))
    }

    /// Reduce into `[0, modulus)`.
    pub fn reduce(&self, modulus: &Integer) -> Result<Self> {
        check_modulus(modulus)?;
        Ok(Integer(self.0.mod_floor(&modulus.0)))
    }

    pub fn mod_add(&self, other: &Integer, modulus: &Integer) -> Result<Self> {
        (self + other).reduce(modulus)
    }

    pub fn mod_sub(&self, other: &Integer, modulus: &Integer) -> Result<Self> {
        (self - other).reduce(modulus)
    }

    pub fn mod_mul(&self, other: &Integer, modulus: &Integer) -> Result<Self> {
        (self * other).reduce(modulus)
    }

    /// `self^exp mod modulus`; negative bases are reduced first.
    pub fn mod_pow(&self, exp: &Integer, modulus: &Integer) -> Result<Self> {
        if exp.is_negative() {
            return Err(range_err!("negative exponent {}", exp));
        }
        let base = self.reduce(modulus)?;
        Ok(Integer(base.0.modpow(&exp.0, &modulus.0)))
    }

    /// Representative of `self mod modulus` in `(-modulus/2, modulus/2]`.
    pub fn centered(&self, modulus: &Integer) -> Result<Self> {
        let r = self.reduce(modulus)?;
        let half = &modulus.0 >> 1;
        if r.0 > half {
            Ok(Integer(r.0 - &modulus.0))
        } else {
            Ok(r)
        }
    }

    /// Quotient rounded toward negative infinity.
    pub fn div_floor(&self, divisor: &Integer) -> Result<Self> {
        if divisor.is_zero() {
            return Err(range_err!("division by zero"));
        }
        Ok(Integer(self.0.div_floor(&divisor.0)))
    }

    /// Quotient rounded to nearest, ties away from zero.
    pub fn div_round(&self, divisor: &Integer) -> Result<Self> {
        if divisor.is_zero() {
            return Err(range_err!("division by zero"));
        }
        let (quo, rem) = self.0.div_rem(&divisor.0);
        let twice = rem.abs() << 1;
        if twice >= divisor.0.abs() {
            if self.0.sign() == divisor.0.sign() {
                return Ok(Integer(quo + BigInt::one()));
            }
            return Ok(Integer(quo - BigInt::one()));
        }
        Ok(Integer(quo))
    }

    pub fn to_i64(&self) -> Result<i64> {
        self.0
            .to_i64()
            .ok_or_else(|| range_err!("{} does not fit in i64", self))
    }

    pub fn to_u64(&self) -> Result<u64> {
        self.0
            .to_u64()
            .ok_or_else(|| range_err!("{} does not fit in u64", self))
    }
}

fn check_modulus(modulus: &Integer) -> Result<()> {
    if modulus.0.sign() != Sign::Plus {
        return Err(range_err!("modulus must be positive, got {}", modulus));
    }
    Ok(())
}

impl From<i64> for Integer {
    fn from(v: i64) -> Self {
        Integer(BigInt::from(v))
    }
}

impl From<u64> for Integer {
    fn from(v: u64) -> Self {
        Integer(BigInt::from(v))
    }
}

impl From<i128> for Integer {
    fn from(v: i128) -> Self {
        Integer(BigInt::from(v))
    }
}

impl FromStr for Integer {
    type Err = FvError;

    fn from_str(s: &str) -> Result<Self> {
        Integer::from_str_radix(s, 10)
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! forward_binop {
    ($trait:ident, $method:ident) => {
        impl $trait<&Integer> for &Integer {
            type Output = Integer;
            fn $method(self, rhs: &Integer) -> Integer {
                Integer((&self.0).$method(&rhs.0))
            }
        }

        impl $trait<Integer> for Integer {
            type Output = Integer;
            fn $method(self, rhs: Integer) -> Integer {
                Integer(self.0.$method(rhs.0))
            }
        }

        impl $trait<&Integer> for Integer {
            type Output = Integer;
            fn $method(self, rhs: &Integer) -> Integer {
                Integer(self.0.$method(&rhs.0))
            }
        }
    };
}

forward_binop!(Add, add);
forward_binop!(Sub, sub);
forward_binop!(Mul, mul);

impl Neg for Integer {
    type Output = Integer;
    fn neg(self) -> Integer {
        Integer(-self.0)
    }
}

impl Neg for &Integer {
    type Output = Integer;
    fn neg(self) -> Integer {
        Integer(-&self.0)
    }
}

impl AddAssign<&Integer> for Integer {
    fn add_assign(&mut self, rhs: &Integer) {
        self.0 += &rhs.0;
    }
}

impl MulAssign<&Integer> for Integer {
    fn mul_assign(&mut self, rhs: &Integer) {
        self.0 *= &rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(s: &str) -> Integer {
        s.parse().unwrap()
    }

    #[test]
    fn parse_and_display() {
        let big = int("4611686018326724609");
        assert_eq!(big.to_string(), "4611686018326724609");
        assert_eq!(big.to_u64().unwrap(), 4_611_686_018_326_724_609);
        assert_eq!(int("-42").to_i64().unwrap(), -42);
        assert!("12a".parse::<Integer>().is_err());
        assert_eq!(Integer::from_str_radix("ff", 16).unwrap(), Integer::from(255i64));
        assert_eq!(Integer::from(255i64).to_str_radix(2), "11111111");
    }

    #[test]
    fn reduce_is_non_negative() {
        let m = Integer::from(10i64);
        assert_eq!(Integer::from(-3i64).reduce(&m).unwrap(), Integer::from(7i64));
        assert_eq!(Integer::from(23i64).reduce(&m).unwrap(), Integer::from(3i64));
        assert!(Integer::from(5i64).reduce(&Integer::zero()).is_err());
        assert!(Integer::from(5i64).reduce(&Integer::from(-7i64)).is_err());
    }

    #[test]
    fn modular_arithmetic() {
        let q = Integer::from(8_380_417i64);
        let a = Integer::from(8_380_416i64);
        let b = Integer::from(5i64);
        assert_eq!(a.mod_add(&b, &q).unwrap(), Integer::from(4i64));
        assert_eq!(b.mod_sub(&a, &q).unwrap(), Integer::from(6i64));
        assert_eq!(a.mod_mul(&a, &q).unwrap(), Integer::one());
        assert_eq!(
            Integer::from(3i64).mod_pow(&Integer::from(4i64), &Integer::from(7i64)).unwrap(),
            Integer::from(4i64)
        );
    }

    #[test]
    fn products_do_not_truncate() {
        let q = int("8380417");
        let big_q = int("4611686018326724609");
        assert!(&q * &q < big_q);
        let sq = &big_q * &big_q;
        assert_eq!(sq.to_string(), "21267647931630198946230382894126202881");
        assert!(sq.to_i64().is_err());
    }

    #[test]
    fn centered_representative() {
        let m = Integer::from(10i64);
        assert_eq!(Integer::from(5i64).centered(&m).unwrap(), Integer::from(5i64));
        assert_eq!(Integer::from(6i64).centered(&m).unwrap(), Integer::from(-4i64));
        assert_eq!(Integer::from(-1i64).centered(&m).unwrap(), Integer::from(-1i64));
    }

    #[test]
    fn rounding_division() {
        let d = Integer::from(2i64);
        assert_eq!(Integer::from(5i64).div_round(&d).unwrap(), Integer::from(3i64));
        assert_eq!(Integer::from(-5i64).div_round(&d).unwrap(), Integer::from(-3i64));
        assert_eq!(Integer::from(7i64).div_round(&Integer::from(3i64)).unwrap(), Integer::from(2i64));
        assert_eq!(Integer::from(-7i64).div_floor(&d).unwrap(), Integer::from(-4i64));
        assert!(Integer::one().div_round(&Integer::zero()).is_err());
    }

    #[test]
    fn ordering_and_accumulators() {
        let mut acc = Integer::zero();
        for i in 1..=10i64 {
            acc += &Integer::from(i);
        }
        assert_eq!(acc, Integer::from(55i64));
        acc *= &Integer::from(-2i64);
        assert!(acc < Integer::zero());
        assert_eq!(-acc, Integer::from(110i64));
        assert_eq!(Integer::from(2i64).pow(64).bits(), 65);
    }
}
