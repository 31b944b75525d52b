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
	/// Current worth of every held asset: held quantity times current unit
	/// price. Fails if a held asset has no price.
	pub fn worth_map(&self) -> Result<BTreeMap<String, Quant>, Error> {
		self.ledger()
			.quantities()
			.into_iter()
			.map(|(asset, quantity)| {
				let worth = quantity * self.price(&asset)?;
				Ok((asset, worth))
			})
			.collect()
	}

	/// Total current worth of the portfolio.
	pub fn worth(&self) -> Result<Quant, Error> {
		Ok(self.worth_map()?.into_values().sum())
	}

	/// Current worth of the listed assets only. Every listed asset gets an
	/// entry, zero if it isn't held; only held assets need a price.
	pub fn worth_map_of<S: AsRef<str>>(
		&self,
		assets: &[S],
	) -> Result<BTreeMap<String, Quant>, Error> {
		let quantities = self.ledger().quantities();

		assets
			.iter()
			.map(|asset| {
				let asset = asset.as_ref();
				let worth = match quantities.get(asset) {
					Some(quantity) => quantity * self.price(asset)?,
					None => Quant::zero(),
				};
				Ok((asset.to_string(), worth))
			})
			.collect()
	}

	pub fn worth_of<S: AsRef<str>>(&self, assets: &[S]) -> Result<Quant, Error> {
		Ok(self.worth_map_of(assets)?.into_values().sum())
	}
}

#[cfg(test)]
mod tests {
	use crate::calculation::calculator::fixtures::portfolio;
	use crate::calculation::calculator::Calculator;
	use crate::error::Error;
	use crate::investment::prices::Prices;
	use crate::util::quant::Quant;

	#[test]
	fn test_worth_map() {
		let (ledger, prices) = portfolio();
		let worth = Calculator::new(&ledger, &prices).worth_map().unwrap();

		assert_eq!(worth.len(), 3);
		assert_eq!(worth["A"], 70);
		assert_eq!(worth["B"], 60);
		assert_eq!(worth["D"], 21);
	}

	#[test]
	fn test_total_worth() {
		let (ledger, prices) = portfolio();
		let calc = Calculator::new(&ledger, &prices);
		assert_eq!(calc.worth().unwrap(), 151);
	}

	#[test]
	fn test_missing_price() {
		let (ledger, _) = portfolio();
		let prices = Prices::try_from(vec![("A", "10")]).unwrap();
		let err = Calculator::new(&ledger, &prices).worth_map().unwrap_err();
		assert_eq!(
			err,
			Error::MissingPrice {
				asset: "B".to_string()
			}
		);
	}

	#[test]
	fn test_worth_of_listed_assets() {
		let (ledger, _) = portfolio();
		// B is held but not listed, E is listed but unknown: neither needs a price
		let prices = Prices::try_from(vec![("A", "10")]).unwrap();
		let calc = Calculator::new(&ledger, &prices);

		let map = calc.worth_map_of(&["A", "E"]).unwrap();
		assert_eq!(map["A"], 70);
		assert_eq!(map["E"], Quant::zero());
		assert_eq!(calc.worth_of(&["A", "E"]).unwrap(), 70);
	}
}
