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
use crate::calculation::calculator::Calculator;
use crate::error::Error;
use crate::util::quant::Quant;
use serde::Serialize;
use std::collections::BTreeMap;

/// The best and worst outcome of selling an asset's open lots in FIFO order
/// up to some lot, at current prices. Selling nothing is one of the
/// outcomes, so the profit is never negative and the loss never positive.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Envelope {
	pub max_profit: Quant,
	pub max_loss: Quant,
}

impl Calculator<'_> {
	/// Walks the open lots oldest-first, accumulating the return each lot
	/// would realize if sold now, and keeps the highest and lowest running
	/// totals. An asset without open lots has a zero envelope.
	pub fn max_profit_and_loss(&self, asset: &str) -> Result<Envelope, Error> {
		let lots = self.open_lots(asset)?;
		if lots.is_empty() {
			return Ok(Envelope::default());
		}

		let unit_price = self.price(asset)?;
		let mut envelope = Envelope::default();
		let mut running = Quant::zero();

		for lot in &lots {
			running += lot.return_for_unit_price(unit_price);
			if running > envelope.max_profit {
				envelope.max_profit = running.clone();
			}
			if running < envelope.max_loss {
				envelope.max_loss = running.clone();
			}
		}

		Ok(envelope)
	}

	pub fn max_profit_and_loss_map<S: AsRef<str>>(
		&self,
		assets: &[S],
	) -> Result<BTreeMap<String, Envelope>, Error> {
		assets
			.iter()
			.map(|a| Ok((a.as_ref().to_string(), self.max_profit_and_loss(a.as_ref())?)))
			.collect()
	}
}
