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
use crate::history::ledger::Ledger;
use crate::investment::lot::Lot;
use crate::investment::prices::Prices;
use crate::util::quant::Quant;

/// A read-only view combining the trading history with current prices.
/// Every calculation is derived afresh from these two on each call; the
/// operations themselves are spread over the sibling modules.
#[derive(Clone, Copy, Debug)]
pub struct Calculator<'a> {
	ledger: &'a Ledger,
	prices: &'a Prices,
}

impl<'a> Calculator<'a> {
	pub fn new(ledger: &'a Ledger, prices: &'a Prices) -> Self {
		Self { ledger, prices }
	}

	pub fn ledger(&self) -> &'a Ledger {
		self.ledger
	}

	pub fn prices(&self) -> &'a Prices {
		self.prices
	}

	pub(crate) fn price(&self, asset: &str) -> Result<&'a Quant, Error> {
		self.prices.get(asset).ok_or_else(|| Error::MissingPrice {
			asset: asset.to_string(),
		})
	}

	/// Open lots of an asset, oldest first. An asset the ledger has never
	/// seen simply has none.
	pub(crate) fn open_lots(&self, asset: &str) -> Result<Vec<Lot>, Error> {
		match self.ledger.asset(asset) {
			Some(_) => self.ledger.positions(asset),
			None => Ok(vec![]),
		}
	}
}

/// Shared fixtures for the calculation tests.
#[cfg(test)]
pub(crate) mod fixtures {
	use crate::history::ledger::Ledger;
	use crate::investment::prices::Prices;
	use crate::investment::transaction::{Transaction, TxType};

	pub fn tx(asset: &str, millis: i64, kind: TxType, quantity: &str, price: &str) -> Transaction {
		Transaction::from_millis(
			asset,
			millis,
			kind,
			quantity.parse().unwrap(),
			price.parse().unwrap(),
		)
		.unwrap()
	}

	pub fn ledger(txs: Vec<Transaction>) -> Ledger {
		let mut ledger = Ledger::new();
		ledger.add_transactions(txs).unwrap();
		ledger
	}

	pub fn prices(pairs: Vec<(&str, &str)>) -> Prices {
		Prices::try_from(pairs).unwrap()
	}

	/// A: two lots in profit at 10, one at a loss.
	/// B: one lot at a loss at 4, then one in profit.
	/// C: bought and sold off; D: held at exactly its cost.
	pub fn portfolio() -> (Ledger, Prices) {
		let ledger = ledger(vec![
			tx("A", 1, TxType::Buy, "2", "5"),
			tx("A", 2, TxType::Buy, "1", "8"),
			tx("A", 3, TxType::Buy, "4", "12"),
			tx("B", 4, TxType::Buy, "10", "6"),
			tx("B", 5, TxType::Buy, "5", "2"),
			tx("C", 6, TxType::Buy, "1", "1"),
			tx("C", 7, TxType::Sell, "1", "3"),
			tx("D", 8, TxType::Buy, "3", "7"),
		]);
		let prices =
			prices(vec![("A", "10"), ("B", "4"), ("C", "2"), ("D", "7")]);
		(ledger, prices)
	}
}
