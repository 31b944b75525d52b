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
use std::collections::BTreeMap;
use tracing::warn;

/// Current unit prices, keyed by asset ID. Never holds a negative price.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Prices {
	prices: BTreeMap<String, Quant>,
}

impl Prices {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces the unit price of an asset.
	pub fn add_price(&mut self, asset: &str, unit_price: Quant) -> Result<(), Error> {
		if asset.is_empty() {
			return Err(Error::MissingAssetId);
		}

		if unit_price.is_negative() {
			return Err(Error::NegativePrice {
				asset: asset.to_string(),
				price: unit_price,
			});
		}

		if let Some(previous) = self.prices.insert(asset.to_string(), unit_price) {
			warn!(asset, %previous, "price replaced");
		}

		Ok(())
	}

	/// Adds every price in turn, stopping at the first invalid one.
	pub fn add_prices(
		&mut self,
		prices: impl IntoIterator<Item = (String, Quant)>,
	) -> Result<(), Error> {
		for (asset, unit_price) in prices {
			self.add_price(&asset, unit_price)?;
		}
		Ok(())
	}

	pub fn get(&self, asset: &str) -> Option<&Quant> {
		self.prices.get(asset)
	}

	/// Asset IDs in lexicographic order.
	pub fn assets(&self) -> impl Iterator<Item = &String> {
		self.prices.keys()
	}

	pub fn len(&self) -> usize {
		self.prices.len()
	}

	pub fn is_empty(&self) -> bool {
		self.prices.is_empty()
	}
}

impl TryFrom<Vec<(&str, &str)>> for Prices {
	type Error = anyhow::Error;

	fn try_from(pairs: Vec<(&str, &str)>) -> Result<Self, Self::Error> {
		let mut prices = Prices::new();
		for (asset, price) in pairs {
			prices.add_price(asset, price.parse()?)?;
		}
		Ok(prices)
	}
}
