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
use crate::util::quant::Quant;
use thiserror::Error;

/// Failures of the accounting and planning operations. Every one of them is
/// local to the call that produced it; nothing is retried because every
/// calculation is a pure function of the ledger and the prices.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
	// -- structural input --
	#[error("missing asset ID")]
	MissingAssetId,

	#[error("negative quantity for {asset}: {quantity} < 0")]
	NegativeQuantity { asset: String, quantity: Quant },

	#[error("negative price for {asset}: {price} < 0")]
	NegativePrice { asset: String, price: Quant },

	#[error("timestamp {millis} is out of range")]
	InvalidTimestamp { millis: i64 },

	#[error("overall sum of distributed values {} ≠ 1", .sum.to_fraction_string())]
	InvalidDistribution { sum: Quant },

	#[error("negative ratio for {asset} in distribution")]
	NegativeRatio { asset: String },

	#[error("no unit price found for asset {asset}")]
	MissingPrice { asset: String },

	#[error("asset with key \"{asset}\" not found")]
	UnknownAsset { asset: String },

	// -- state invariants --
	#[error("oversold {asset}: no open lots left for {missing}")]
	Oversold { asset: String, missing: Quant },

	#[error("negative asset quantity {asset}: {quantity} < 0")]
	NegativeHoldings { asset: String, quantity: Quant },

	// -- infeasibility --
	#[error("not enough assets to sell")]
	NotEnoughAssets,

	// -- degenerate input --
	#[error("sum of asset worth is zero")]
	ZeroWorth,

	#[error("{asset} holds worth but has a target ratio of zero")]
	ZeroRatio { asset: String },

	#[error("budget is zero")]
	ZeroBudget,

	#[error("budget is negative: {0}")]
	NegativeBudget(Quant),
}
