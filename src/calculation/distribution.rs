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
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Signed amount of worth to buy (positive) or sell (negative) per asset.
pub type Adjustment = BTreeMap<String, Quant>;

/// Target share of the portfolio's worth per asset. The ratios are never
/// negative and always sum to exactly one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Distribution {
	ratios: BTreeMap<String, Quant>,
}

impl Distribution {
	pub fn new(ratios: BTreeMap<String, Quant>) -> Result<Self, Error> {
		for (asset, ratio) in &ratios {
			if asset.is_empty() {
				return Err(Error::MissingAssetId);
			}
			if ratio.is_negative() {
				return Err(Error::NegativeRatio {
					asset: asset.clone(),
				});
			}
		}

		let sum: Quant = ratios.values().sum();
		if sum != 1 {
			return Err(Error::InvalidDistribution { sum });
		}

		Ok(Self { ratios })
	}

	pub fn ratios(&self) -> &BTreeMap<String, Quant> {
		&self.ratios
	}

	pub fn get(&self, asset: &str) -> Option<&Quant> {
		self.ratios.get(asset)
	}

	pub fn assets(&self) -> Vec<&str> {
		self.ratios.keys().map(String::as_str).collect()
	}
}

impl TryFrom<Vec<(&str, &str)>> for Distribution {
	type Error = anyhow::Error;

	fn try_from(pairs: Vec<(&str, &str)>) -> Result<Self, Self::Error> {
		let mut ratios = BTreeMap::new();
		for (asset, ratio) in pairs {
			ratios.insert(asset.to_string(), ratio.parse()?);
		}
		Ok(Distribution::new(ratios)?)
	}
}

impl Calculator<'_> {
	/// Buys and sells that bring the listed assets to the target
	/// distribution once `budget` of fresh money is added to their current
	/// worth. Assets already on target are left out.
	pub fn adjustment_with_budget(
		&self,
		distribution: &Distribution,
		budget: &Quant,
	) -> Result<Adjustment, Error> {
		let worth = self.worth_map_of(&distribution.assets())?;
		let global = budget + worth.values().sum::<Quant>();
		debug!(%global, "worth after investing budget");

		let mut adjustment = Adjustment::new();
		for (asset, ratio) in distribution.ratios() {
			let current = worth.get(asset).cloned().unwrap_or_default();
			let amount = &global * ratio - current;
			if !amount.is_zero() {
				adjustment.insert(asset.clone(), amount);
			}
		}

		Ok(adjustment)
	}

	/// Purchases alone that bring the listed assets to the target
	/// distribution, spending as little as possible.
	///
	/// The pivot is the asset that is most overweight relative to its target,
	/// measured as `(worth / total - ratio) / ratio`; ties go to the first
	/// asset by ID. The budget is whatever makes the pivot land on its ratio
	/// with nothing bought, so every other asset only needs buying.
	pub fn adjustment_without_selling(
		&self,
		distribution: &Distribution,
	) -> Result<Adjustment, Error> {
		let worth = self.worth_map_of(&distribution.assets())?;
		let global: Quant = worth.values().sum();
		if global.is_zero() {
			return Err(Error::ZeroWorth);
		}

		let mut pivot: Option<(Quant, &Quant, &Quant)> = None;
		for (asset, ratio) in distribution.ratios() {
			let current = &worth[asset.as_str()];
			if ratio.is_zero() {
				if current.is_zero() {
					continue;
				}
				return Err(Error::ZeroRatio {
					asset: asset.clone(),
				});
			}

			let overweight = (current / &global - ratio) / ratio;
			if pivot.as_ref().map_or(true, |(best, _, _)| &overweight > best) {
				debug!(asset = asset.as_str(), %overweight, "new pivot");
				pivot = Some((overweight, current, ratio));
			}
		}

		// ratios sum to one, so at least one is non-zero
		let (_, pivot_worth, pivot_ratio) = pivot.ok_or(Error::ZeroWorth)?;
		let budget = pivot_worth / pivot_ratio - &global;
		info!(%budget, "budget needed to rebalance without selling");

		let adjustment = self.adjustment_with_budget(distribution, &budget)?;
		if adjustment.values().any(Quant::is_negative) {
			warn!("rebalancing without selling produced a sale");
		}

		Ok(adjustment)
	}

	/// Purchases alone towards the target distribution, spending exactly
	/// `budget`. Returns the purchases together with the factor they were
	/// scaled down by.
	///
	/// When the budget covers every purchase the rebalance needs, the surplus
	/// is spread by ratio and the factor is one. Otherwise each purchase is
	/// divided by `required / budget`, which keeps their proportions.
	pub fn adjustment_without_selling_with_budget(
		&self,
		distribution: &Distribution,
		budget: &Quant,
	) -> Result<(Adjustment, Quant), Error> {
		if budget.is_zero() {
			return Err(Error::ZeroBudget);
		}
		if budget.is_negative() {
			return Err(Error::NegativeBudget(budget.clone()));
		}

		let unconstrained = match self.adjustment_without_selling(distribution) {
			Ok(adjustment) => adjustment,
			Err(Error::ZeroWorth) => Adjustment::new(),
			Err(e) => return Err(e),
		};
		let required: Quant = unconstrained.values().sum();

		if &required <= budget {
			debug!(%required, %budget, "budget covers rebalance");
			let adjustment = self.adjustment_with_budget(distribution, budget)?;
			return Ok((adjustment, Quant::from_i128(1)));
		}

		let factor = &required / budget;
		info!(%required, %budget, %factor, "scaling purchases down to budget");

		let scaled = unconstrained
			.into_iter()
			.map(|(asset, amount)| (asset, amount / &factor))
			.collect();

		Ok((scaled, factor))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::calculation::calculator::fixtures::portfolio;

	fn q(s: &str) -> Quant {
		s.parse().unwrap()
	}

	fn distribution(pairs: Vec<(&str, &str)>) -> Distribution {
		Distribution::try_from(pairs).unwrap()
	}

	/// A half, B and D a quarter each. Current worth A 70, B 60, D 21.
	fn target() -> Distribution {
		distribution(vec![("A", "1/2"), ("B", "1/4"), ("D", "1/4")])
	}

	mod validation {
		use super::*;

		#[test]
		fn test_sum_below_one() {
			let err = Distribution::try_from(vec![("A", "1/3"), ("B", "1/3")])
				.unwrap_err();
			assert_eq!(err.to_string(), "overall sum of distributed values 2/3 ≠ 1");
		}

		#[test]
		fn test_sum_above_one() {
			let mut ratios = BTreeMap::new();
			ratios.insert("A".to_string(), q("0.75"));
			ratios.insert("B".to_string(), q("0.5"));

			assert_eq!(
				Distribution::new(ratios),
				Err(Error::InvalidDistribution { sum: q("5/4") })
			);
		}

		#[test]
		fn test_negative_ratio() {
			let mut ratios = BTreeMap::new();
			ratios.insert("A".to_string(), q("3/2"));
			ratios.insert("B".to_string(), q("-1/2"));

			assert_eq!(
				Distribution::new(ratios),
				Err(Error::NegativeRatio {
					asset: "B".to_string()
				})
			);
		}

		#[test]
		fn test_decimal_and_fraction_mix() {
			let d = distribution(vec![("A", "0.5"), ("B", "1/3"), ("C", "1/6")]);
			assert_eq!(d.get("B"), Some(&q("1/3")));
			assert_eq!(d.assets(), vec!["A", "B", "C"]);
		}
	}

	mod with_budget {
		use super::*;

		#[test]
		fn test_buys_and_sells() {
			let (ledger, prices) = portfolio();
			let calc = Calculator::new(&ledger, &prices);
			let adjustment = calc.adjustment_with_budget(&target(), &q("49")).unwrap();

			assert_eq!(adjustment["A"], 30);
			assert_eq!(adjustment["B"], -10);
			assert_eq!(adjustment["D"], 29);
		}

		#[test]
		fn test_resulting_ratios_match_target() {
			let (ledger, prices) = portfolio();
			let calc = Calculator::new(&ledger, &prices);
			let target = target();
			let budget = q("12.34");

			let adjustment = calc.adjustment_with_budget(&target, &budget).unwrap();
			let worth = calc.worth_map_of(&target.assets()).unwrap();
			let after: BTreeMap<&String, Quant> = worth
				.iter()
				.map(|(a, w)| (a, w + adjustment.get(a).cloned().unwrap_or_default()))
				.collect();
			let total: Quant = after.values().sum();

			assert_eq!(total, calc.worth().unwrap() + &budget);
			for (asset, w) in after {
				assert_eq!(&(w / &total), target.get(asset).unwrap());
			}
		}

		#[test]
		fn test_on_target_is_omitted() {
			let (ledger, prices) = portfolio();
			let calc = Calculator::new(&ledger, &prices);
			let d = distribution(vec![("A", "70/151"), ("B", "60/151"), ("D", "21/151")]);

			assert!(calc.adjustment_with_budget(&d, &Quant::zero()).unwrap().is_empty());
		}

		#[test]
		fn test_unheld_asset() {
			let (ledger, prices) = portfolio();
			let calc = Calculator::new(&ledger, &prices);
			let d = distribution(vec![("A", "1/2"), ("NEW", "1/2")]);

			let adjustment = calc.adjustment_with_budget(&d, &q("30")).unwrap();
			assert_eq!(adjustment["A"], -20);
			assert_eq!(adjustment["NEW"], 50);
		}
	}

	mod without_selling {
		use super::*;

		#[test]
		fn test_pivot_needs_no_purchase() {
			let (ledger, prices) = portfolio();
			let calc = Calculator::new(&ledger, &prices);
			let adjustment = calc.adjustment_without_selling(&target()).unwrap();

			// B is the most overweight: 60 is a quarter of 240
			assert_eq!(adjustment.len(), 2);
			assert_eq!(adjustment["A"], 50);
			assert_eq!(adjustment["D"], 39);
			assert!(adjustment.values().all(Quant::is_positive));
		}

		#[test]
		fn test_zero_worth() {
			let (ledger, prices) = portfolio();
			let calc = Calculator::new(&ledger, &prices);
			let d = distribution(vec![("X", "1/2"), ("Y", "1/2")]);

			assert_eq!(calc.adjustment_without_selling(&d), Err(Error::ZeroWorth));
		}

		#[test]
		fn test_zero_ratio_with_worth() {
			let (ledger, prices) = portfolio();
			let calc = Calculator::new(&ledger, &prices);
			let d = distribution(vec![("A", "1"), ("B", "0")]);

			assert_eq!(
				calc.adjustment_without_selling(&d),
				Err(Error::ZeroRatio {
					asset: "B".to_string()
				})
			);
		}

		#[test]
		fn test_zero_ratio_without_worth() {
			let (ledger, prices) = portfolio();
			let calc = Calculator::new(&ledger, &prices);
			let d = distribution(vec![("A", "1"), ("X", "0")]);

			assert!(calc.adjustment_without_selling(&d).unwrap().is_empty());
		}
	}

	mod without_selling_with_budget {
		use super::*;

		#[test]
		fn test_budget_is_zero() {
			let (ledger, prices) = portfolio();
			let calc = Calculator::new(&ledger, &prices);
			let err = calc
				.adjustment_without_selling_with_budget(&target(), &Quant::zero())
				.unwrap_err();

			assert_eq!(err, Error::ZeroBudget);
			assert_eq!(err.to_string(), "budget is zero");
		}

		#[test]
		fn test_budget_is_negative() {
			let (ledger, prices) = portfolio();
			let calc = Calculator::new(&ledger, &prices);

			assert_eq!(
				calc.adjustment_without_selling_with_budget(&target(), &q("-1")),
				Err(Error::NegativeBudget(q("-1")))
			);
		}

		#[test]
		fn test_scaled_down() {
			let (ledger, prices) = portfolio();
			let calc = Calculator::new(&ledger, &prices);
			let budget = q("40");
			let (adjustment, factor) = calc
				.adjustment_without_selling_with_budget(&target(), &budget)
				.unwrap();

			// 89 is needed in full
			assert_eq!(factor, q("89/40"));
			assert!(factor > 1);
			assert_eq!(adjustment["A"], q("2000/89"));
			assert_eq!(adjustment["D"], q("1560/89"));
			assert_eq!(adjustment.values().sum::<Quant>(), budget);
		}

		#[test]
		fn test_surplus_spread_by_ratio() {
			let (ledger, prices) = portfolio();
			let calc = Calculator::new(&ledger, &prices);
			let (adjustment, factor) = calc
				.adjustment_without_selling_with_budget(&target(), &q("178"))
				.unwrap();

			assert_eq!(factor, 1);
			assert_eq!(adjustment["A"], q("189/2"));
			assert_eq!(adjustment["B"], q("89/4"));
			assert_eq!(adjustment["D"], q("245/4"));
			assert_eq!(adjustment.values().sum::<Quant>(), 178);
		}

		#[test]
		fn test_exact_budget() {
			let (ledger, prices) = portfolio();
			let calc = Calculator::new(&ledger, &prices);
			let (adjustment, factor) = calc
				.adjustment_without_selling_with_budget(&target(), &q("89"))
				.unwrap();

			assert_eq!(factor, 1);
			assert_eq!(adjustment, calc.adjustment_without_selling(&target()).unwrap());
		}

		#[test]
		fn test_empty_portfolio() {
			let (ledger, prices) = portfolio();
			let calc = Calculator::new(&ledger, &prices);
			let d = distribution(vec![("X", "1/4"), ("Y", "3/4")]);
			let (adjustment, factor) = calc
				.adjustment_without_selling_with_budget(&d, &q("8"))
				.unwrap();

			assert_eq!(factor, 1);
			assert_eq!(adjustment["X"], 2);
			assert_eq!(adjustment["Y"], 6);
		}
	}
}
