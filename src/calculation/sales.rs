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
use crate::calculation::envelope::Envelope;
use crate::error::Error;
use crate::investment::lot::Lot;
use crate::util::quant::Quant;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Quantity to sell per asset. Only assets that are actually sold appear.
pub type SalePlan = BTreeMap<String, Quant>;

/// Which side of the envelope a sale plan is working towards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
	Profit,
	Loss,
}

impl Direction {
	fn of(target: &Quant) -> Self {
		if target.is_negative() {
			Direction::Loss
		} else {
			Direction::Profit
		}
	}

	/// The most an asset can contribute in this direction.
	fn potential<'e>(&self, envelope: &'e Envelope) -> &'e Quant {
		match self {
			Direction::Profit => &envelope.max_profit,
			Direction::Loss => &envelope.max_loss,
		}
	}

	/// Largest potential first: highest profit, or deepest loss.
	fn rank(&self, a: &Envelope, b: &Envelope) -> Ordering {
		match self {
			Direction::Profit => b.max_profit.cmp(&a.max_profit),
			Direction::Loss => a.max_loss.cmp(&b.max_loss),
		}
	}

	fn reaches(&self, realized: &Quant, target: &Quant) -> bool {
		match self {
			Direction::Profit => realized >= target,
			Direction::Loss => realized <= target,
		}
	}
}

/// How far selling one asset got towards the remaining target.
enum AssetSale {
	/// The target was landed on exactly by selling this quantity.
	Reached(Quant),

	/// The asset's whole potential was sold without reaching the target.
	Exhausted { quantity: Quant, realized: Quant },
}

impl Calculator<'_> {
	/// Which assets to sell, and how much of each, to realize exactly the
	/// given return: a gain if positive, a loss if negative.
	///
	/// With `optimize`, assets are tried from the largest potential in the
	/// target's direction down, which touches as few assets as possible.
	/// Otherwise they are tried in the order given. Assets with no potential
	/// in that direction are passed over. The caller's list is not reordered.
	pub fn sales_for_return<S: AsRef<str>>(
		&self,
		target: &Quant,
		assets: &[S],
		optimize: bool,
	) -> Result<SalePlan, Error> {
		let mut plan = SalePlan::new();
		if target.is_zero() {
			return Ok(plan);
		}

		let direction = Direction::of(target);

		let mut seen = BTreeSet::new();
		let candidates: Vec<&str> = assets
			.iter()
			.map(AsRef::as_ref)
			.filter(|a| seen.insert(*a))
			.collect();
		let envelopes = self.max_profit_and_loss_map(&candidates)?;

		let mut order = candidates;
		if optimize {
			order.sort_by(|a, b| direction.rank(&envelopes[*a], &envelopes[*b]));
		}

		let mut remaining = target.clone();
		for asset in order {
			let potential = direction.potential(&envelopes[asset]);
			if potential.is_zero() {
				debug!(asset, "no potential, skipping");
				continue;
			}

			let lots = self.open_lots(asset)?;
			let unit_price = self.price(asset)?;

			match sell_asset(direction, &lots, unit_price, &remaining, potential) {
				AssetSale::Reached(quantity) => {
					plan.insert(asset.to_string(), quantity);
					info!(%target, assets = plan.len(), "sale plan found");
					return Ok(plan);
				},
				AssetSale::Exhausted { quantity, realized } => {
					debug!(asset, %quantity, %realized, "asset exhausted");
					remaining -= realized;
					plan.insert(asset.to_string(), quantity);
				},
			}
		}

		Err(Error::NotEnoughAssets)
	}

	/// `sales_for_return` over every asset that has a price, optimized.
	pub fn sales_for_return_all(&self, target: &Quant) -> Result<SalePlan, Error> {
		let assets: Vec<&String> = self.prices().assets().collect();
		self.sales_for_return(target, &assets, true)
	}

	/// The return that selling the planned quantities would realize at
	/// current prices, each asset sold oldest lot first.
	pub fn realized_for_sales(&self, plan: &SalePlan) -> Result<Quant, Error> {
		let mut realized = Quant::zero();

		for (asset, quantity) in plan {
			let unit_price = self.price(asset)?;
			let mut remaining = quantity.clone();

			for lot in self.open_lots(asset)? {
				if remaining.is_zero() {
					break;
				}
				let sold = remaining.clone().min(lot.quantity.clone());
				realized += (unit_price - &lot.unit_price) * &sold;
				remaining -= sold;
			}

			if !remaining.is_zero() {
				return Err(Error::Oversold {
					asset: asset.clone(),
					missing: remaining,
				});
			}
		}

		Ok(realized)
	}
}

/// Sells one asset oldest lot first. Stops inside the first lot that would
/// carry the running return past the remaining target, selling just the
/// fraction of it that lands on the target. If the asset's potential is
/// used up first, stops there and reports what it realized.
fn sell_asset(
	direction: Direction,
	lots: &[Lot],
	unit_price: &Quant,
	remaining: &Quant,
	potential: &Quant,
) -> AssetSale {
	let mut accumulated = Quant::zero();
	let mut sold = Quant::zero();

	for lot in lots {
		let delta = lot.return_for_unit_price(unit_price);
		let running = &accumulated + &delta;

		// a lot that neither gains nor loses has no fraction to solve for
		if !delta.is_zero() && direction.reaches(&running, remaining) {
			let fraction = (remaining - &accumulated) / &delta * &lot.quantity;
			return AssetSale::Reached(sold + fraction);
		}

		accumulated = running;
		sold += &lot.quantity;

		if &accumulated == potential {
			break;
		}
	}

	AssetSale::Exhausted {
		quantity: sold,
		realized: accumulated,
	}
}
