/* Copyright © 2024-2025 Adam Train <adam@trainrelay.net>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */
use anyhow::{anyhow, bail, Error};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{CheckedDiv, One, Signed, Zero};
use regex::Regex;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::Sum;
use std::ops::{
	Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign,
};
use std::str::FromStr;
use std::sync::LazyLock;

/// Accepts `12`, `-12.345`, `.5` and an optional exponent such as `1.5e3`.
static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^([+-])?(\d*)(?:\.(\d*))?(?:[eE]([+-]?\d+))?$").unwrap()
});

/// Accepts `2/3` and `-1/3`.
static FRACTION: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^([+-]?\d+)/(\d+)$").unwrap());

/// A general-purpose rational number of unbounded size. Every quantity,
/// price, worth and return in this crate flows through this type, so that
/// chains of sales, scaling factors and ratios never accumulate drift.
///
/// The underlying fraction is always kept in lowest terms.
#[derive(Clone, Debug)]
pub struct Quant {
	value: BigRational,

	/// How many decimal places to render when asked to print. Has no effect
	/// on the underlying fraction.
	render_precision: u32,
}

impl Quant {
	pub fn zero() -> Self {
		Self {
			value: BigRational::zero(),
			render_precision: 0,
		}
	}

	/// Creates a new Quant with the given numerator and the denominator
	/// set at 10^exp. Render precision is set to the exponent value, as
	/// though a decimal point was inserted that many places from the right.
	pub fn new(numerator: i128, exp: u32) -> Self {
		Self {
			value: BigRational::new(
				BigInt::from(numerator),
				ten_pow(exp as usize),
			),
			render_precision: exp,
		}
	}

	pub fn from_frac(numerator: i128, denominator: i128) -> Self {
		if denominator == 0 {
			panic!("Denominator cannot be zero");
		}

		Self {
			value: BigRational::new(
				BigInt::from(numerator),
				BigInt::from(denominator),
			),
			render_precision: 0,
		}
	}

	pub fn from_i128(amount: i128) -> Self {
		Self {
			value: BigRational::from_integer(BigInt::from(amount)),
			render_precision: 0,
		}
	}

	/// Modifies the underlying fraction to represent a value that is rounded
	/// off to the given number of decimal places when rendered as a decimal.
	/// Uses Banker's rounding (rounds to nearest, ties to even).
	///
	/// Returns the rounding error, such that rounded + error == original.
	pub fn round(&mut self, decimal_places: u32) -> Self {
		let initial = self.clone();

		let scale = BigRational::from_integer(ten_pow(decimal_places as usize));
		let scaled = &self.value * &scale;
		let floor = scaled.floor();
		let remainder = &scaled - &floor;
		let half = BigRational::new(BigInt::one(), BigInt::from(2));

		let is_odd = !(floor.to_integer() % BigInt::from(2)).is_zero();
		let rounded = match remainder.cmp(&half) {
			Ordering::Greater => floor + BigRational::one(),
			Ordering::Equal if is_odd => floor + BigRational::one(),
			_ => floor,
		};

		self.value = rounded / scale;
		self.render_precision = decimal_places;

		initial - self.clone()
	}

	pub fn render_precision(&self) -> u32 {
		self.render_precision
	}

	pub fn set_render_precision(&mut self, precision: u32, can_decrease: bool) {
		if self.render_precision < precision || can_decrease {
			self.render_precision = precision;
		}
	}

	pub fn is_zero(&self) -> bool {
		self.value.is_zero()
	}

	pub fn is_negative(&self) -> bool {
		self.value.is_negative()
	}

	pub fn is_positive(&self) -> bool {
		self.value.is_positive()
	}

	pub fn abs(&self) -> Self {
		Self {
			value: self.value.abs(),
			render_precision: self.render_precision,
		}
	}

	/// Division that reports a zero divisor instead of panicking.
	pub fn checked_div(&self, rhs: &Quant) -> Option<Self> {
		self.value.checked_div(&rhs.value).map(|value| Self {
			value,
			render_precision: self.render_precision.max(rhs.render_precision),
		})
	}

	/// Exact representation as `numerator/denominator`, or just the
	/// numerator for integers. Parses back into an identical value.
	pub fn to_fraction_string(&self) -> String {
		if self.value.is_integer() {
			self.value.numer().to_string()
		} else {
			format!("{}/{}", self.value.numer(), self.value.denom())
		}
	}

	fn parse_decimal(input: &str) -> Result<Self, Error> {
		let caps = DECIMAL
			.captures(input)
			.ok_or_else(|| anyhow!("Invalid decimal format: {}", input))?;

		let whole = caps.get(2).map_or("", |m| m.as_str());
		let decimal = caps.get(3).map_or("", |m| m.as_str());
		if whole.is_empty() && decimal.is_empty() {
			bail!("Invalid decimal format: {}", input);
		}

		let digits = format!("{}{}", whole, decimal);
		let mut numerator: BigInt = digits.parse()?;
		if caps.get(1).is_some_and(|m| m.as_str() == "-") {
			numerator = -numerator;
		}

		let exponent = match caps.get(4) {
			Some(e) => e.as_str().parse::<i64>()?,
			None => 0,
		}
		.saturating_sub(decimal.len() as i64);
		if exponent.unsigned_abs() > MAX_DECIMAL_EXPONENT {
			bail!("Exponent out of range: {}", input);
		}

		let magnitude = ten_pow(exponent.unsigned_abs() as usize);
		let value = if exponent >= 0 {
			BigRational::from_integer(numerator * magnitude)
		} else {
			BigRational::new(numerator, magnitude)
		};

		Ok(Self {
			value,
			render_precision: u32::try_from(-exponent.min(0))?,
		})
	}
}

/// Largest power of ten a decimal literal may scale by.
const MAX_DECIMAL_EXPONENT: u64 = 4096;

fn ten_pow(exp: usize) -> BigInt {
	num_traits::pow(BigInt::from(10), exp)
}

impl Default for Quant {
	fn default() -> Self {
		Quant::zero()
	}
}

impl FromStr for Quant {
	type Err = Error;

	fn from_str(input: &str) -> Result<Self, Self::Err> {
		let input = input.trim();

		if let Some(caps) = FRACTION.captures(input) {
			let numerator: BigInt = caps[1].parse()?;
			let denominator: BigInt = caps[2].parse()?;
			if denominator.is_zero() {
				bail!("Denominator cannot be zero: {}", input);
			}

			return Ok(Self {
				value: BigRational::new(numerator, denominator),
				render_precision: 0,
			});
		}

		Quant::parse_decimal(input)
	}
}

impl fmt::Display for Quant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let numerator = self.value.numer().abs();
		let denominator = self.value.denom();

		let integer_part = &numerator / denominator;
		let mut remainder = &numerator % denominator;

		let ten = BigInt::from(10);
		let mut fraction_str = String::new();
		let precision = f.precision().unwrap_or(self.render_precision as usize);
		for _ in 0..precision {
			if remainder.is_zero() {
				break;
			}
			remainder *= &ten;
			let digit = &remainder / denominator;
			remainder %= denominator;
			fraction_str.push_str(&digit.to_string());
		}

		if fraction_str.len() < self.render_precision as usize {
			let zeros_to_add =
				self.render_precision as usize - fraction_str.len();
			fraction_str.push_str(&"0".repeat(zeros_to_add));
		}

		while fraction_str.ends_with('0')
			&& fraction_str.len() > self.render_precision as usize
		{
			fraction_str.pop();
		}

		let mut int_str = integer_part.to_string();
		let mut i = int_str.len() as isize - 3;
		while i > 0 {
			int_str.insert(i as usize, ',');
			i -= 3;
		}

		let formatted = if fraction_str.is_empty() {
			int_str
		} else {
			format!("{}.{}", int_str, fraction_str)
		};

		if self.value.is_negative() {
			write!(f, "-{}", formatted)
		} else {
			write!(f, "{}", formatted)
		}
	}
}

impl Serialize for Quant {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.to_fraction_string())
	}
}

// -----------------
// -- BOILERPLATE --
// -----------------

/// Implements an operator for every owned/borrowed operand combination,
/// plus its assigning form. Render precision follows the wider operand.
macro_rules! quant_op {
	($op:ident, $method:ident, $op_assign:ident, $method_assign:ident) => {
		impl $op<&Quant> for &Quant {
			type Output = Quant;

			fn $method(self, rhs: &Quant) -> Quant {
				Quant {
					value: (&self.value).$method(&rhs.value),
					render_precision: self
						.render_precision
						.max(rhs.render_precision),
				}
			}
		}

		impl $op<Quant> for &Quant {
			type Output = Quant;

			fn $method(self, rhs: Quant) -> Quant {
				self.$method(&rhs)
			}
		}

		impl $op<&Quant> for Quant {
			type Output = Quant;

			fn $method(self, rhs: &Quant) -> Quant {
				(&self).$method(rhs)
			}
		}

		impl $op for Quant {
			type Output = Quant;

			fn $method(self, rhs: Quant) -> Quant {
				(&self).$method(&rhs)
			}
		}

		impl $op_assign<&Quant> for Quant {
			fn $method_assign(&mut self, rhs: &Quant) {
				*self = (&*self).$method(rhs);
			}
		}

		impl $op_assign for Quant {
			fn $method_assign(&mut self, rhs: Quant) {
				*self = (&*self).$method(&rhs);
			}
		}
	};
}

quant_op!(Add, add, AddAssign, add_assign);
quant_op!(Sub, sub, SubAssign, sub_assign);
quant_op!(Mul, mul, MulAssign, mul_assign);

impl Div<&Quant> for &Quant {
	type Output = Quant;

	fn div(self, rhs: &Quant) -> Quant {
		match self.checked_div(rhs) {
			Some(q) => q,
			None => panic!("Attempt to divide by zero"),
		}
	}
}

impl Div<Quant> for &Quant {
	type Output = Quant;

	fn div(self, rhs: Quant) -> Quant {
		self / &rhs
	}
}

impl Div<&Quant> for Quant {
	type Output = Quant;

	fn div(self, rhs: &Quant) -> Quant {
		&self / rhs
	}
}

impl Div for Quant {
	type Output = Quant;

	fn div(self, rhs: Quant) -> Quant {
		&self / &rhs
	}
}

impl DivAssign<&Quant> for Quant {
	fn div_assign(&mut self, rhs: &Quant) {
		*self = &*self / rhs;
	}
}

impl DivAssign for Quant {
	fn div_assign(&mut self, rhs: Quant) {
		*self = &*self / &rhs;
	}
}

impl Mul<i128> for &Quant {
	type Output = Quant;

	fn mul(self, rhs: i128) -> Quant {
		self * Quant::from_i128(rhs)
	}
}

impl Mul<i128> for Quant {
	type Output = Quant;

	fn mul(self, rhs: i128) -> Quant {
		&self * Quant::from_i128(rhs)
	}
}

impl Div<i128> for Quant {
	type Output = Quant;

	fn div(self, rhs: i128) -> Quant {
		&self / Quant::from_i128(rhs)
	}
}

impl Neg for Quant {
	type Output = Quant;

	fn neg(self) -> Quant {
		Quant {
			value: -self.value,
			render_precision: self.render_precision,
		}
	}
}

impl Neg for &Quant {
	type Output = Quant;

	fn neg(self) -> Quant {
		-self.clone()
	}
}

impl Sum for Quant {
	fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
		iter.fold(Quant::zero(), |acc, quant| acc + quant)
	}
}

impl<'a> Sum<&'a Quant> for Quant {
	fn sum<I: Iterator<Item = &'a Quant>>(iter: I) -> Self {
		iter.fold(Quant::zero(), |acc, quant| acc + quant)
	}
}

impl From<i128> for Quant {
	fn from(amount: i128) -> Self {
		Quant::from_i128(amount)
	}
}

impl PartialEq for Quant {
	fn eq(&self, other: &Self) -> bool {
		self.value == other.value
	}
}

impl Eq for Quant {}

impl PartialEq<i128> for Quant {
	fn eq(&self, other: &i128) -> bool {
		self.value == BigRational::from_integer(BigInt::from(*other))
	}
}

impl PartialOrd for Quant {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl PartialOrd<i128> for Quant {
	fn partial_cmp(&self, other: &i128) -> Option<Ordering> {
		Some(
			self.value
				.cmp(&BigRational::from_integer(BigInt::from(*other))),
		)
	}
}

impl Ord for Quant {
	fn cmp(&self, other: &Self) -> Ordering {
		self.value.cmp(&other.value)
	}
}

impl Hash for Quant {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.value.hash(state);
		// `render_precision` intentionally excluded from the hash
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn q(s: &str) -> Quant {
		s.parse().unwrap()
	}

	mod creation {
		use super::*;

		#[test]
		fn test_new_with_precision() {
			let quant = Quant::new(123, 2);
			assert_eq!(quant, Quant::from_frac(123, 100));
			assert_eq!(quant.render_precision(), 2);
		}

		#[test]
		fn test_new_reduces() {
			let quant = Quant::new(-200, 2);
			assert_eq!(quant, -2);
			assert_eq!(quant.to_fraction_string(), "-2");
		}

		#[test]
		#[should_panic(expected = "Denominator cannot be zero")]
		fn test_zero_denominator() {
			Quant::from_frac(1, 0);
		}

		#[test]
		fn test_negative_denominator() {
			let quant = Quant::from_frac(6, -8);
			assert_eq!(quant.to_fraction_string(), "-3/4");
			assert!(quant.is_negative());
		}

		#[test]
		fn test_beyond_i128() {
			let big = Quant::from_i128(i128::MAX) * Quant::from_i128(i128::MAX);
			let back = big / Quant::from_i128(i128::MAX);
			assert_eq!(back, Quant::from_i128(i128::MAX));
		}
	}

	mod parsing {
		use super::*;

		#[test]
		fn test_decimal() {
			let quant = q("50.12345");
			assert_eq!(quant, Quant::new(5012345, 5));
			assert_eq!(quant.render_precision(), 5);
		}

		#[test]
		fn test_negative_decimal() {
			assert_eq!(q("-1.25"), Quant::from_frac(-5, 4));
		}

		#[test]
		fn test_fraction() {
			let quant = q("2/3");
			assert_eq!(quant, Quant::from_frac(2, 3));
			assert_eq!(quant.render_precision(), 0);
		}

		#[test]
		fn test_negative_fraction() {
			assert_eq!(q("-10000/71234"), Quant::from_frac(-5000, 35617));
		}

		#[test]
		fn test_exponent() {
			assert_eq!(q("1.5e3"), 1500);
			assert_eq!(q("25e-2"), Quant::from_frac(1, 4));
		}

		#[test]
		fn test_leading_point() {
			assert_eq!(q(".5"), Quant::from_frac(1, 2));
		}

		#[test]
		fn test_whitespace_is_trimmed() {
			assert_eq!(q(" 7 "), 7);
		}

		#[test]
		fn test_exponent_out_of_range() {
			assert!("1e4000000000".parse::<Quant>().is_err());
			assert!("1e-5000".parse::<Quant>().is_err());
			assert!("1.5e-9223372036854775808".parse::<Quant>().is_err());
			assert!("1e4096".parse::<Quant>().is_ok());
		}

		#[test]
		fn test_garbage() {
			for input in ["", ".", "abc", "1.2.3", "1/0", "1/-2", "--1", "1,000"] {
				assert!(input.parse::<Quant>().is_err(), "{} parsed", input);
			}
		}

		#[test]
		fn test_fraction_string_round_trip() {
			let quant = q("-123.456");
			assert_eq!(q(&quant.to_fraction_string()), quant);
		}
	}

	mod arithmetic {
		use super::*;

		#[test]
		fn test_add_mixed_signs() {
			assert_eq!(q("1.5") + q("-2.25"), q("-0.75"));
		}

		#[test]
		fn test_sub_by_reference() {
			let a = q("10");
			let b = q("0.1");
			assert_eq!(&a - &b, q("9.9"));
			assert_eq!(a, 10);
		}

		#[test]
		fn test_mul_keeps_widest_precision() {
			let product = q("1.5") * q("2.125");
			assert_eq!(product, q("3.1875"));
			assert_eq!(product.render_precision(), 3);
		}

		#[test]
		fn test_div_inexact_stays_exact() {
			let third = q("1") / q("3");
			assert_eq!(third * 3, 1);
		}

		#[test]
		#[should_panic(expected = "Attempt to divide by zero")]
		fn test_div_zero_divisor() {
			let _ = q("1") / Quant::zero();
		}

		#[test]
		fn test_checked_div() {
			assert_eq!(q("1").checked_div(&Quant::zero()), None);
			assert_eq!(q("1").checked_div(&q("4")), Some(q("0.25")));
		}

		#[test]
		fn test_assign_ops() {
			let mut a = q("2");
			a += q("3");
			a -= &q("1");
			a *= q("1.5");
			a /= q("3");
			assert_eq!(a, 2);
		}

		#[test]
		fn test_sum() {
			let values = vec![q("0.1"), q("0.2"), q("0.3")];
			let by_ref: Quant = values.iter().sum();
			let owned: Quant = values.into_iter().sum();
			assert_eq!(by_ref, q("0.6"));
			assert_eq!(owned, q("0.6"));
		}

		#[test]
		fn test_neg_and_abs() {
			assert_eq!(-q("-4"), 4);
			assert_eq!(-&q("1/3"), q("-1/3"));
			assert_eq!(q("-4").abs(), 4);
		}
	}

	mod comparison {
		use super::*;

		#[test]
		fn test_ordering() {
			assert!(q("-1/3") < q("-1/4"));
			assert!(q("0.3333") < q("1/3"));
			assert!(q("2") > 1);
		}

		#[test]
		fn test_equality_ignores_render_precision() {
			assert_eq!(q("1.500"), q("3/2"));
		}

		#[test]
		fn test_sign_predicates() {
			assert!(Quant::zero().is_zero());
			assert!(!Quant::zero().is_negative());
			assert!(!Quant::zero().is_positive());
			assert!(q("-0.0001").is_negative());
		}
	}

	mod rounding {
		use super::*;

		#[test]
		fn test_bankers_rounding() {
			let mut a = q("2.345");
			a.round(2);
			assert_eq!(a, q("2.34"));

			let mut b = q("2.355");
			b.round(2);
			assert_eq!(b, q("2.36"));
		}

		#[test]
		fn test_rounding_negative() {
			let mut a = q("-2.345");
			a.round(2);
			assert_eq!(a, q("-2.34"));

			let mut b = q("-1.006");
			b.round(2);
			assert_eq!(b, q("-1.01"));
		}

		#[test]
		fn test_rounding_error() {
			let original = q("1/3");
			let mut rounded = original.clone();
			let error = rounded.round(2);
			assert_eq!(rounded.clone() + error, original);
			assert_eq!(rounded.to_string(), "0.33");
		}
	}

	mod extremes {
		use super::*;
		use rand::Rng;

		#[test]
		fn test_arithmetic_stress() {
			let mut rng = rand::thread_rng();

			for _ in 0..2_000 {
				let a = Quant::from_frac(
					rng.gen_range(-10i128.pow(19)..10i128.pow(19)),
					rng.gen_range(1..10i128.pow(19)),
				);
				let b = Quant::from_frac(
					rng.gen_range(-10i128.pow(19)..10i128.pow(19)),
					rng.gen_range(1..10i128.pow(19)),
				);

				assert_eq!(&a + &b - &b, a);
				if !b.is_zero() {
					assert_eq!(&a * &b / &b, a);
				}
			}
		}
	}

	mod other {
		use super::*;

		#[test]
		fn test_display() {
			assert_eq!(q("12345.6789").to_string(), "12,345.6789");
			assert_eq!(q("-1000000.50").to_string(), "-1,000,000.50");
			assert_eq!(q("0.00").to_string(), "0.00");
		}

		#[test]
		fn test_display_truncates_to_precision() {
			assert_eq!(format!("{:.4}", q("2/3")), "0.6666");
			assert_eq!(q("2/3").to_string(), "0");
		}

		#[test]
		fn test_serialize() {
			let json = serde_json::to_string(&q("-2/6")).unwrap();
			assert_eq!(json, "\"-1/3\"");
		}
	}
}
