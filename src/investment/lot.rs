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
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

/// A discrete batch of an asset that was acquired in a single purchase.
/// Lots are derived from the transaction history on every query; sales
/// shrink them oldest-first, and a lot that reaches zero is dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Lot {
	pub asset: String,
	pub acquired: DateTime<Utc>,

	/// Always in positive terms; can't go negative
	pub quantity: Quant,
	pub unit_price: Quant,
}

impl Lot {
	/// What was paid for what remains of this lot.
	pub fn cost(&self) -> Quant {
		&self.quantity * &self.unit_price
	}

	/// The gain (or, if negative, the loss) of selling the whole lot at the
	/// given unit price.
	pub fn return_for_unit_price(&self, unit_price: &Quant) -> Quant {
		(unit_price - &self.unit_price) * &self.quantity
	}

	/// Reports how long the lot has been held as of a specific moment.
	pub fn time_held(&self, as_of: &DateTime<Utc>) -> TimeDelta {
		as_of.signed_duration_since(self.acquired)
	}
}
