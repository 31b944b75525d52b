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
use std::collections::BTreeMap;

impl Calculator<'_> {
	/// Unrealized return of every held asset: current worth minus what was
	/// paid for its open lots.
	pub fn return_map(&self) -> Result<BTreeMap<String, Quant>, Error> {
		let initial = self.ledger().initial_worth_map()?;

		Ok(self
			.worth_map()?
			.into_iter()
			.filter_map(|(asset, worth)| {
				let cost = initial.get(&asset)?;
				Some((asset, worth - cost))
			})
			.collect())
	}

	/// Yield of every held asset, in absolute terms: the same figure as the
	/// return, reported under its own name for the reports that ask for it.
	pub fn yield_map(&self) -> Result<BTreeMap<String, Quant>, Error> {
		self.return_map()
	}
}
