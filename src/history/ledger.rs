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
use crate::history::asset::Asset;
use crate::investment::book::PositionBook;
use crate::investment::lot::Lot;
use crate::investment::realized::RealizedEvent;
use crate::investment::replay;
use crate::investment::transaction::{Transaction, TxType};
use crate::util::quant::Quant;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// The append-only trading history. Transactions live in one sequence, and
/// every asset keeps the indices of its own transactions; nothing points
/// back from a transaction to its asset other than the asset ID.
///
/// Everything the ledger reports (quantities, lots, realized events) is
/// derived from the full history on each call, so a ledger is never in a
/// half-updated state between mutations.
#[derive(Clone, Debug, Default)]
pub struct Ledger {
	transactions: Vec<Transaction>,
	assets: BTreeMap<String, Asset>,
}

impl Ledger {
	pub fn new() -> Self {
		Self::default()
	}

	// -----------
	// -- INPUT --
	// -----------

	/// Adds one transaction, then validates the ledger. An invalid
	/// transaction is rolled back and the ledger is left as it was.
	pub fn add_transaction(&mut self, transaction: Transaction) -> Result<(), Error> {
		self.add_transactions(vec![transaction])
	}

	/// Adds a batch of transactions and validates once at the end. If the
	/// result is invalid, the whole batch is rolled back.
	pub fn add_transactions(
		&mut self,
		transactions: impl IntoIterator<Item = Transaction>,
	) -> Result<(), Error> {
		let checkpoint = self.transactions.len();

		for transaction in transactions {
			if let Err(e) = self.append(transaction) {
				self.rollback(checkpoint);
				return Err(e);
			}
		}

		if let Err(e) = self.validate() {
			warn!(error = %e, "rejecting {} transaction(s)", self.transactions.len() - checkpoint);
			self.rollback(checkpoint);
			return Err(e);
		}

		debug!(
			added = self.transactions.len() - checkpoint,
			assets = self.assets.len(),
			"ledger updated"
		);
		Ok(())
	}

	fn append(&mut self, mut transaction: Transaction) -> Result<(), Error> {
		if transaction.asset.is_empty() {
			return Err(Error::MissingAssetId);
		}

		let index = self.transactions.len();
		transaction.sequence = index as u64;

		self.assets
			.entry(transaction.asset.clone())
			.or_insert_with(|| Asset::new(&transaction.asset))
			.attach(index);
		self.transactions.push(transaction);

		Ok(())
	}

	fn rollback(&mut self, len: usize) {
		self.transactions.truncate(len);
		for asset in self.assets.values_mut() {
			asset.truncate(len);
		}
		self.assets.retain(|_, asset| !asset.is_empty());
	}

	/// Verifies that no asset is held in negative quantity overall, and that
	/// every sale, replayed in order, has open lots to sell from.
	pub fn validate(&self) -> Result<(), Error> {
		for (asset, quantity) in self.net_quantities() {
			if quantity.is_negative() {
				return Err(Error::NegativeHoldings { asset, quantity });
			}
		}

		for asset in self.assets.keys() {
			self.book(asset)?;
		}

		Ok(())
	}

	// ------------
	// -- ACCESS --
	// ------------

	pub fn transactions(&self) -> &[Transaction] {
		&self.transactions
	}

	pub fn assets(&self) -> impl Iterator<Item = &Asset> {
		self.assets.values()
	}

	pub fn asset(&self, id: &str) -> Option<&Asset> {
		self.assets.get(id)
	}

	pub fn is_empty(&self) -> bool {
		self.transactions.is_empty()
	}

	/// The transactions of one asset, in insertion order.
	pub fn asset_transactions(&self, id: &str) -> Result<Vec<&Transaction>, Error> {
		let asset = self.asset(id).ok_or_else(|| Error::UnknownAsset {
			asset: id.to_string(),
		})?;

		Ok(asset
			.transaction_indices()
			.iter()
			.map(|&i| &self.transactions[i])
			.collect())
	}

	// ----------------
	// -- DERIVATION --
	// ----------------

	fn net_quantities(&self) -> BTreeMap<String, Quant> {
		let mut summary: BTreeMap<String, Quant> = BTreeMap::new();

		for tx in &self.transactions {
			let held = summary.entry(tx.asset.clone()).or_default();
			match tx.kind {
				TxType::Buy => *held += &tx.quantity,
				TxType::Sell => *held -= &tx.quantity,
				TxType::Dividend => {},
			}
		}

		summary
	}

	/// Overall held quantity per asset. Assets that appear in the history but
	/// have been sold off entirely are left out.
	pub fn quantities(&self) -> BTreeMap<String, Quant> {
		let mut summary = self.net_quantities();
		summary.retain(|_, quantity| !quantity.is_zero());
		summary
	}

	/// Replays one asset's history into its open lots and realized events.
	pub fn book(&self, id: &str) -> Result<PositionBook, Error> {
		let book = replay::tabulate(id, self.asset_transactions(id)?)?;
		debug!(
			asset = id,
			lots = book.lots().count(),
			realized = book.realized().len(),
			"lots derived"
		);
		Ok(book)
	}

	/// Open lots of one asset, oldest first.
	pub fn positions(&self, id: &str) -> Result<Vec<Lot>, Error> {
		Ok(self.book(id)?.into_parts().0)
	}

	/// Open lots of every asset; assets without open lots are left out.
	pub fn positions_map(&self) -> Result<BTreeMap<String, Vec<Lot>>, Error> {
		let mut map = BTreeMap::new();

		for id in self.assets.keys() {
			let lots = self.positions(id)?;
			if !lots.is_empty() {
				map.insert(id.clone(), lots);
			}
		}

		Ok(map)
	}

	/// Every realized event of every asset, grouped by asset and in
	/// chronological order within each asset.
	pub fn realized_events(&self) -> Result<Vec<RealizedEvent>, Error> {
		let mut events = vec![];
		for id in self.assets.keys() {
			events.extend(self.book(id)?.into_parts().1);
		}
		Ok(events)
	}

	/// Sum of every realized gain, dividends included.
	pub fn realized_profit(&self) -> Result<Quant, Error> {
		Ok(self
			.realized_events()?
			.iter()
			.filter(|e| e.is_gain())
			.map(|e| &e.amount)
			.sum())
	}

	/// Sum of every realized loss, in positive terms.
	pub fn realized_loss(&self) -> Result<Quant, Error> {
		Ok(self
			.realized_events()?
			.iter()
			.filter(|e| e.is_loss())
			.map(|e| e.amount.abs())
			.sum())
	}

	/// Realized gains net of realized losses.
	pub fn realized_return(&self) -> Result<Quant, Error> {
		Ok(self.realized_events()?.iter().map(|e| &e.amount).sum())
	}

	/// What was paid for the open lots of one asset.
	pub fn initial_worth(&self, id: &str) -> Result<Quant, Error> {
		Ok(self.book(id)?.cost_basis())
	}

	pub fn initial_worth_map(&self) -> Result<BTreeMap<String, Quant>, Error> {
		self.assets
			.keys()
			.map(|id| Ok((id.clone(), self.initial_worth(id)?)))
			.collect()
	}
}
