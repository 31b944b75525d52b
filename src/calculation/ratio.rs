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
	/// Weight of each listed asset within the listed assets' combined worth.
	/// Assets left off the list are ignored, so the weights always sum to 1.
	pub fn ratio_map<S: AsRef<str>>(
		&self,
		assets: &[S],
	) -> Result<BTreeMap<String, Quant>, Error> {
		let worth = self.worth_map_of(assets)?;
		let total: Quant = worth.values().sum();

		if total.is_zero() {
			return Err(Error::ZeroWorth);
		}

		Ok(worth
			.into_iter()
			.map(|(asset, w)| (asset, w / &total))
			.collect())
	}
}
