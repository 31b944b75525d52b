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
use crate::investment::book::PositionBook;
use crate::investment::transaction::{Transaction, TxType};
use tracing::trace;

/// Replays the transactions of one asset into its book of open lots, in
/// chronological order. Transactions sharing a timestamp are replayed in
/// the order they were added to the ledger. Fails if a sale has no lot
/// left from which to sell.
pub fn tabulate<'a>(
	asset: &str,
	transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Result<PositionBook, Error> {
	let mut ordered: Vec<&Transaction> = transactions.into_iter().collect();
	ordered.sort();

	let mut book = PositionBook::new(asset);

	for tx in ordered {
		trace!(asset, kind = %tx.kind, quantity = %tx.quantity, "replaying");
		match tx.kind {
			TxType::Buy => book.buy_lot(tx),
			TxType::Sell => book.sell_lot(tx)?,
			TxType::Dividend => book.dividend(tx),
		}
	}

	Ok(book)
}
