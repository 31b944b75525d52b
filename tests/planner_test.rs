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
//! Planner properties checked over randomly generated portfolios.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use stonkr::calculation::calculator::Calculator;
use stonkr::calculation::distribution::Distribution;
use stonkr::history::ledger::Ledger;
use stonkr::investment::prices::Prices;
use stonkr::investment::transaction::{Transaction, TxType};
use stonkr::util::quant::Quant;
use stonkr::Error;

const ASSETS: [&str; 5] = ["AAA", "BBB", "CCC", "DDD", "EEE"];
const ROUNDS: u64 = 40;

/// Every asset gets a few purchases, and some of them a sale that leaves
/// part of the holding open.
fn random_portfolio(rng: &mut StdRng) -> (Ledger, Prices) {
	let mut transactions = vec![];
	let mut millis = 0;

	for asset in ASSETS {
		let mut held = 0;
		for _ in 0..rng.gen_range(1..=5) {
			let quantity = rng.gen_range(1..=10);
			held += quantity;
			millis += 1000;
			transactions.push(tx(asset, millis, TxType::Buy, quantity, rng.gen_range(1..=20)));
		}

		if rng.gen_bool(0.5) {
			millis += 1000;
			let quantity = rng.gen_range(1..=held / 2 + 1).min(held - 1);
			if quantity > 0 {
				transactions.push(tx(asset, millis, TxType::Sell, quantity, rng.gen_range(1..=20)));
			}
		}
	}

	let mut ledger = Ledger::new();
	ledger.add_transactions(transactions).unwrap();

	let mut prices = Prices::new();
	for asset in ASSETS {
		prices.add_price(asset, Quant::from_i128(rng.gen_range(1..=20))).unwrap();
	}

	(ledger, prices)
}

fn tx(asset: &str, millis: i64, kind: TxType, quantity: i128, price: i128) -> Transaction {
	Transaction::from_millis(
		asset,
		millis,
		kind,
		Quant::from_i128(quantity),
		Quant::from_i128(price),
	)
	.unwrap()
}

mod sales {
	use super::*;

	#[test]
	fn test_profit_targets_are_met_exactly() {
		let mut rng = StdRng::seed_from_u64(7);

		for _ in 0..ROUNDS {
			let (ledger, prices) = random_portfolio(&mut rng);
			let calc = Calculator::new(&ledger, &prices);
			let potential: Quant = calc
				.max_profit_and_loss_map(&ASSETS)
				.unwrap()
				.values()
				.map(|e| e.max_profit.clone())
				.sum();
			if potential.is_zero() {
				continue;
			}

			for parts in [1, 3, 7] {
				let target = &potential * Quant::from_frac(rng.gen_range(1..=parts), parts);
				let plan = calc.sales_for_return_all(&target).unwrap();
				assert_eq!(calc.realized_for_sales(&plan).unwrap(), target);
			}

			assert_eq!(
				calc.sales_for_return_all(&(potential + Quant::from_frac(1, 100))),
				Err(Error::NotEnoughAssets)
			);
		}
	}

	#[test]
	fn test_loss_targets_are_met_exactly() {
		let mut rng = StdRng::seed_from_u64(11);

		for _ in 0..ROUNDS {
			let (ledger, prices) = random_portfolio(&mut rng);
			let calc = Calculator::new(&ledger, &prices);
			let potential: Quant = calc
				.max_profit_and_loss_map(&ASSETS)
				.unwrap()
				.values()
				.map(|e| e.max_loss.clone())
				.sum();
			if potential.is_zero() {
				continue;
			}

			let target = &potential * Quant::from_frac(rng.gen_range(1..=5), 5);
			let plan = calc.sales_for_return(&target, &ASSETS, true).unwrap();
			assert_eq!(calc.realized_for_sales(&plan).unwrap(), target);

			// the caller's order reaches the same total, if not the same plan
			let manual = calc.sales_for_return(&target, &ASSETS, false).unwrap();
			assert_eq!(calc.realized_for_sales(&manual).unwrap(), target);
		}
	}

	#[test]
	fn test_optimized_plan_touches_fewest_assets_first() {
		let mut rng = StdRng::seed_from_u64(3);

		for _ in 0..ROUNDS {
			let (ledger, prices) = random_portfolio(&mut rng);
			let calc = Calculator::new(&ledger, &prices);
			let envelopes = calc.max_profit_and_loss_map(&ASSETS).unwrap();
			let best = envelopes.values().map(|e| e.max_profit.clone()).max().unwrap();
			if best.is_zero() {
				continue;
			}

			// anything the best asset can cover alone takes one asset
			let plan = calc.sales_for_return_all(&best).unwrap();
			assert_eq!(plan.len(), 1);
		}
	}
}

mod distribution {
	use super::*;

	fn random_distribution(rng: &mut StdRng) -> Distribution {
		let weights: Vec<i128> = ASSETS.iter().map(|_| rng.gen_range(1..=9)).collect();
		let total: i128 = weights.iter().sum();

		let ratios: BTreeMap<String, Quant> = ASSETS
			.iter()
			.zip(weights)
			.map(|(asset, w)| (asset.to_string(), Quant::from_frac(w, total)))
			.collect();
		Distribution::new(ratios).unwrap()
	}

	fn worth_after(calc: &Calculator, adjustment: &BTreeMap<String, Quant>) -> BTreeMap<String, Quant> {
		calc.worth_map_of(&ASSETS)
			.unwrap()
			.into_iter()
			.map(|(asset, worth)| {
				let change = adjustment.get(&asset).cloned().unwrap_or_default();
				(asset, worth + change)
			})
			.collect()
	}

	fn assert_on_target(after: &BTreeMap<String, Quant>, distribution: &Distribution) {
		let total: Quant = after.values().sum();
		for (asset, worth) in after {
			assert_eq!(&(worth / &total), distribution.get(asset).unwrap());
		}
	}

	#[test]
	fn test_with_budget_reaches_target() {
		let mut rng = StdRng::seed_from_u64(5);

		for _ in 0..ROUNDS {
			let (ledger, prices) = random_portfolio(&mut rng);
			let calc = Calculator::new(&ledger, &prices);
			let distribution = random_distribution(&mut rng);
			let budget = Quant::from_i128(rng.gen_range(0..=100));

			let adjustment = calc.adjustment_with_budget(&distribution, &budget).unwrap();
			assert_eq!(adjustment.values().sum::<Quant>(), budget);
			assert_on_target(&worth_after(&calc, &adjustment), &distribution);
		}
	}

	#[test]
	fn test_without_selling_only_buys() {
		let mut rng = StdRng::seed_from_u64(13);

		for _ in 0..ROUNDS {
			let (ledger, prices) = random_portfolio(&mut rng);
			let calc = Calculator::new(&ledger, &prices);
			let distribution = random_distribution(&mut rng);

			let adjustment = calc.adjustment_without_selling(&distribution).unwrap();
			assert!(adjustment.values().all(|a| !a.is_negative()));
			assert_on_target(&worth_after(&calc, &adjustment), &distribution);
		}
	}

	#[test]
	fn test_short_budget_is_spent_exactly() {
		let mut rng = StdRng::seed_from_u64(17);

		for _ in 0..ROUNDS {
			let (ledger, prices) = random_portfolio(&mut rng);
			let calc = Calculator::new(&ledger, &prices);
			let distribution = random_distribution(&mut rng);

			let required: Quant = calc
				.adjustment_without_selling(&distribution)
				.unwrap()
				.values()
				.sum();
			if required.is_zero() {
				continue;
			}

			let budget = &required / Quant::from_i128(3);
			let (adjustment, factor) = calc
				.adjustment_without_selling_with_budget(&distribution, &budget)
				.unwrap();

			assert_eq!(factor, 3);
			assert!(adjustment.values().all(|a| !a.is_negative()));
			assert_eq!(adjustment.values().sum::<Quant>(), budget);
		}
	}
}
