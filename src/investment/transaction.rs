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
use crate::error::Error;
use crate::util::quant::Quant;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A single immutable record of trading history. Transactions are gathered
/// before they are replayed into lots, because input is not required to be
/// in chronological order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
	pub asset: String,
	pub timestamp: DateTime<Utc>,
	pub kind: TxType,

	/// Always in positive terms; the kind carries the direction
	pub quantity: Quant,

	/// For dividends this is the whole payout, not a per-unit value
	pub unit_price: Quant,

	/// Position in the ledger, assigned on insertion. Breaks timestamp ties.
	pub(crate) sequence: u64,
}

impl Transaction {
	pub fn new(
		asset: &str,
		timestamp: DateTime<Utc>,
		kind: TxType,
		quantity: Quant,
		unit_price: Quant,
	) -> Result<Self, Error> {
		if asset.is_empty() {
			return Err(Error::MissingAssetId);
		}

		if quantity.is_negative() {
			return Err(Error::NegativeQuantity {
				asset: asset.to_string(),
				quantity,
			});
		}

		if unit_price.is_negative() {
			return Err(Error::NegativePrice {
				asset: asset.to_string(),
				price: unit_price,
			});
		}

		Ok(Self {
			asset: asset.to_string(),
			timestamp,
			kind,
			quantity,
			unit_price,
			sequence: 0,
		})
	}

	/// Same as `new`, with the timestamp given in Unix milliseconds.
	pub fn from_millis(
		asset: &str,
		millis: i64,
		kind: TxType,
		quantity: Quant,
		unit_price: Quant,
	) -> Result<Self, Error> {
		let timestamp = DateTime::from_timestamp_millis(millis)
			.ok_or(Error::InvalidTimestamp { millis })?;
		Self::new(asset, timestamp, kind, quantity, unit_price)
	}

	pub fn sequence(&self) -> u64 {
		self.sequence
	}
}

impl PartialOrd for Transaction {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Transaction {
	/// Chronological, then by order of insertion into the ledger.
	fn cmp(&self, other: &Self) -> Ordering {
		self.timestamp
			.cmp(&other.timestamp)
			.then_with(|| self.sequence.cmp(&other.sequence))
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TxType {
	Buy,
	Sell,
	Dividend,
}

impl FromStr for TxType {
	type Err = anyhow::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"BUY" => Ok(TxType::Buy),
			"SELL" => Ok(TxType::Sell),
			"DIVIDEND" => Ok(TxType::Dividend),
			_ => anyhow::bail!("unsupported trade type {:?}", s),
		}
	}
}

impl fmt::Display for TxType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TxType::Buy => write!(f, "BUY"),
			TxType::Sell => write!(f, "SELL"),
			TxType::Dividend => write!(f, "DIVIDEND"),
		}
	}
}
