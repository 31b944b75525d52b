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
use crate::calculation::envelope::Envelope;
use crate::investment::lot::Lot;
use crate::investment::realized::{RealizedEvent, RealizedSource, RealizedSummary};
use crate::reports::table::Table;
use crate::util::quant::Quant;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Renders holdings, valuations and realized returns as tables. Every value
/// is rounded to the reporter's precision for display only.
pub struct PortfolioReporter {
	precision: u32,
}

impl PortfolioReporter {
	pub fn new(precision: u32) -> Self {
		Self { precision }
	}

	pub fn fmt(&self, value: &Quant) -> String {
		round_to_precision(value, self.precision)
	}

	/// One value per asset, e.g. quantity, worth or return, with an optional
	/// total underneath.
	pub fn value_table(
		&self,
		header: &str,
		values: &BTreeMap<String, Quant>,
		total: Option<&Quant>,
	) -> Table {
		let mut table = Table::new(2);
		table.right_align(vec![1]);
		table.add_header(vec!["Asset", header]);
		table.add_separator();

		for (asset, value) in values {
			table.add_row(vec![asset, &self.fmt(value)]);
		}

		if let Some(total) = total {
			table.add_partial_separator(vec![1]);
			table.add_row(vec!["", &self.fmt(total)]);
		}

		table
	}

	pub fn print_values(
		&self,
		header: &str,
		values: &BTreeMap<String, Quant>,
		total: Option<&Quant>,
	) {
		if values.is_empty() {
			println!("No applicable assets");
			return;
		}
		self.value_table(header, values, total).print()
	}

	/// Open lots, oldest first within each asset.
	pub fn positions_table(
		&self,
		positions: &BTreeMap<String, Vec<Lot>>,
		as_of: &DateTime<Utc>,
	) -> Table {
		let mut table = Table::new(6);
		table.right_align(vec![1, 2, 3, 4, 5]);
		table.add_header(vec![
			"Asset",
			"Acquired",
			"Held",
			"Qty",
			"Unit Cost",
			"Cost",
		]);
		table.add_separator();

		let mut total = Quant::zero();
		for lots in positions.values() {
			for lot in lots {
				let cost = lot.cost();
				table.add_row(vec![
					&lot.asset,
					&lot.acquired.format("%Y-%m-%d").to_string(),
					&format!("{}d", lot.time_held(as_of).num_days()),
					&self.fmt(&lot.quantity),
					&self.fmt(&lot.unit_price),
					&self.fmt(&cost),
				]);
				total += cost;
			}
		}

		table.add_partial_separator(vec![5]);
		table.add_row(vec!["", "", "", "", "", &self.fmt(&total)]);
		table
	}

	pub fn print_positions(
		&self,
		positions: &BTreeMap<String, Vec<Lot>>,
		as_of: &DateTime<Utc>,
	) {
		if positions.is_empty() {
			println!("No applicable lots");
			return;
		}
		self.positions_table(positions, as_of).print()
	}

	/// Every realized event, followed by the profit, loss and net totals.
	pub fn realized_table(&self, events: &[RealizedEvent]) -> Table {
		let mut table = Table::new(7);
		table.right_align(vec![0, 3, 4, 5, 6]);
		table.add_header(vec![
			"Date", "Asset", "Type", "Qty", "Cost", "Proceeds", "G/L",
		]);
		table.add_separator();

		for event in events {
			let date = event.date.format("%Y-%m-%d").to_string();
			let amount = self.fmt(&event.amount);

			match &event.source {
				RealizedSource::Sale {
					quantity,
					unit_cost,
					unit_proceeds,
					..
				} => table.add_row(vec![
					&date,
					&event.asset,
					"sale",
					&self.fmt(quantity),
					&self.fmt(unit_cost),
					&self.fmt(unit_proceeds),
					&amount,
				]),
				RealizedSource::Dividend => table.add_row(vec![
					&date,
					&event.asset,
					"dividend",
					"",
					"",
					"",
					&amount,
				]),
			}
		}

		let summary = RealizedSummary::from_events(events);
		table.add_partial_separator(vec![6]);
		table.add_row(vec!["", "", "", "", "", "Profit", &self.fmt(&summary.profit)]);
		table.add_row(vec!["", "", "", "", "", "Loss", &self.fmt(&summary.loss)]);
		table.add_row(vec!["", "", "", "", "", "Net", &self.fmt(&summary.net)]);
		table
	}

	pub fn print_realized(&self, events: &[RealizedEvent]) {
		if events.is_empty() {
			println!("No realized gains or losses");
			return;
		}
		self.realized_table(events).print()
	}

	pub fn envelope_table(&self, envelopes: &BTreeMap<String, Envelope>) -> Table {
		let mut table = Table::new(3);
		table.right_align(vec![1, 2]);
		table.add_header(vec!["Asset", "Max Profit", "Max Loss"]);
		table.add_separator();

		for (asset, envelope) in envelopes {
			table.add_row(vec![
				asset,
				&self.fmt(&envelope.max_profit),
				&self.fmt(&envelope.max_loss),
			]);
		}

		table
	}

	pub fn print_envelopes(&self, envelopes: &BTreeMap<String, Envelope>) {
		if envelopes.is_empty() {
			println!("No applicable assets");
			return;
		}
		self.envelope_table(envelopes).print()
	}
}

/// Rounds a copy of the value (ties to even) and renders it with no more
/// decimal places than it needs.
pub fn round_to_precision(value: &Quant, precision: u32) -> String {
	let mut rounded = value.clone();
	rounded.round(precision);
	rounded.set_render_precision(0, true);
	format!("{:.*}", precision as usize, rounded)
}
