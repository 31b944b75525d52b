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

/// An asset as known to the ledger: its identity, plus the positions of
/// its transactions within the ledger's history. Created when the first
/// transaction referencing it is added.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asset {
	id: String,
	transactions: Vec<usize>,
}

impl Asset {
	pub(crate) fn new(id: &str) -> Self {
		Self {
			id: id.to_string(),
			transactions: vec![],
		}
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	/// Indices into the ledger's transaction history, in insertion order.
	pub fn transaction_indices(&self) -> &[usize] {
		&self.transactions
	}

	pub(crate) fn attach(&mut self, index: usize) {
		self.transactions.push(index);
	}

	/// Forgets every transaction at or beyond the given index.
	pub(crate) fn truncate(&mut self, len: usize) {
		self.transactions.retain(|&i| i < len);
	}

	pub(crate) fn is_empty(&self) -> bool {
		self.transactions.is_empty()
	}
}
