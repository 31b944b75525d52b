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
use crate::calculation::distribution::{Adjustment, Distribution};
use crate::calculation::sales::SalePlan;
use crate::reports::portfolio_reporter::round_to_precision;
use crate::reports::table::Table;
use crate::util::quant::Quant;
use std::collections::BTreeMap;

/// Renders the output of the sale and rebalancing planners.
pub struct PlanReporter {
	precision: u32,
}

impl PlanReporter {
	pub fn new(precision: u32) -> Self {
		Self { precision }
	}

	fn fmt(&self, value: &Quant) -> String {
		round_to_precision(value, self.precision)
	}

	/// Quantity to sell per asset, with the return the sales realize at
	/// current prices.
	pub fn sales_table(&self, plan: &SalePlan, realized: &Quant) -> Table {
		let mut table = Table::new(2);
		table.right_align(vec![1]);
		table.add_header(vec!["Asset", "Sell Qty"]);
		table.add_separator();

		for (asset, quantity) in plan {
			table.add_row(vec![asset, &self.fmt(quantity)]);
		}

		table.add_partial_separator(vec![1]);
		table.add_row(vec!["Realized", &self.fmt(realized)]);
		table
	}

	pub fn print_sales(&self, plan: &SalePlan, realized: &Quant) {
		if plan.is_empty() {
			println!("Nothing to sell");
			return;
		}
		self.sales_table(plan, realized).print()
	}

	/// Amount to buy or sell per asset next to its target ratio. The scale
	/// factor is shown when purchases were shrunk to fit a budget.
	pub fn adjustment_table(
		&self,
		distribution: &Distribution,
		adjustment: &Adjustment,
		factor: Option<&Quant>,
	) -> Table {
		let mut table = Table::new(4);
		table.right_align(vec![1, 3]);
		table.add_header(vec!["Asset", "Target", "Action", "Amount"]);
		table.add_separator();

		for (asset, ratio) in distribution.ratios() {
			let (action, amount) = match adjustment.get(asset) {
				Some(amount) if amount.is_negative() => ("sell", amount.abs()),
				Some(amount) => ("buy", amount.clone()),
				None => ("hold", Quant::zero()),
			};
			table.add_row(vec![
				asset,
				&format!("{}%", self.fmt(&(ratio * 100))),
				action,
				&self.fmt(&amount),
			]);
		}

		let net: Quant = adjustment.values().sum();
		table.add_partial_separator(vec![3]);
		table.add_row(vec!["", "", "Net", &self.fmt(&net)]);
		if let Some(factor) = factor {
			table.add_row(vec!["", "", "Scaled by", &self.fmt(factor)]);
		}
		table
	}

	pub fn print_adjustment(
		&self,
		distribution: &Distribution,
		adjustment: &Adjustment,
		factor: Option<&Quant>,
	) {
		self.adjustment_table(distribution, adjustment, factor).print()
	}
}

/// Machine-readable form of a rebalancing result.
#[derive(serde::Serialize)]
pub struct AdjustmentReport<'a> {
	pub distribution: &'a BTreeMap<String, Quant>,
	pub adjustment: &'a Adjustment,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub factor: Option<&'a Quant>,
}
