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
use crate::investment::lot::Lot;
use crate::investment::realized::{RealizedEvent, RealizedSource};
use crate::investment::transaction::Transaction;
use crate::util::quant::Quant;
use std::collections::VecDeque;

/// The open lots of one asset, oldest first, together with everything that
/// was realized while assembling them. When it is being assembled, it will
/// reject states where more is sold than is held.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionBook {
	asset: String,
	lots: VecDeque<Lot>,
	realized: Vec<RealizedEvent>,
}

impl PositionBook {
	pub fn new(asset: &str) -> Self {
		Self {
			asset: asset.to_string(),
			lots: VecDeque::new(),
			realized: vec![],
		}
	}

	pub fn asset(&self) -> &str {
		&self.asset
	}

	pub fn buy_lot(&mut self, tx: &Transaction) {
		self.lots.push_back(Lot {
			asset: tx.asset.clone(),
			acquired: tx.timestamp,
			quantity: tx.quantity.clone(),
			unit_price: tx.unit_price.clone(),
		});
	}

	/// Consumes the sold quantity from the head of the queue, emitting one
	/// realized event per lot touched. Fails if the queue runs dry first.
	pub fn sell_lot(&mut self, tx: &Transaction) -> Result<(), Error> {
		let mut remaining = tx.quantity.clone();

		while !remaining.is_zero() {
			let Some(mut oldest) = self.lots.pop_front() else {
				return Err(Error::Oversold {
					asset: self.asset.clone(),
					missing: remaining,
				});
			};

			// A partial sale leaves the reduced lot at the head of the queue
			if oldest.quantity > remaining {
				oldest.quantity -= &remaining;
				self.realized.push(realize(tx, &oldest, remaining));
				self.lots.push_front(oldest);
				break;
			}

			remaining -= &oldest.quantity;
			let consumed = oldest.quantity.clone();
			self.realized.push(realize(tx, &oldest, consumed));
		}

		Ok(())
	}

	/// Dividends leave the lots alone and are realized as-is.
	pub fn dividend(&mut self, tx: &Transaction) {
		self.realized.push(RealizedEvent {
			asset: tx.asset.clone(),
			date: tx.timestamp,
			source: RealizedSource::Dividend,
			amount: tx.unit_price.clone(),
		});
	}

	pub fn lots(&self) -> impl Iterator<Item = &Lot> {
		self.lots.iter()
	}

	pub fn realized(&self) -> &[RealizedEvent] {
		&self.realized
	}

	pub fn open_quantity(&self) -> Quant {
		self.lots.iter().map(|l| &l.quantity).sum()
	}

	pub fn cost_basis(&self) -> Quant {
		self.lots.iter().map(Lot::cost).sum()
	}

	pub fn into_parts(self) -> (Vec<Lot>, Vec<RealizedEvent>) {
		(self.lots.into(), self.realized)
	}
}

fn realize(tx: &Transaction, lot: &Lot, quantity: Quant) -> RealizedEvent {
	RealizedEvent {
		asset: tx.asset.clone(),
		date: tx.timestamp,
		amount: (&tx.unit_price - &lot.unit_price) * &quantity,
		source: RealizedSource::Sale {
			quantity,
			acquired: lot.acquired,
			unit_cost: lot.unit_price.clone(),
			unit_proceeds: tx.unit_price.clone(),
		},
	}
}
