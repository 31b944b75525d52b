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
use crate::util::quant::Quant;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A gain or loss crystallized by a sale against one lot, or by a dividend.
/// One sale spanning several lots produces one event per lot touched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RealizedEvent {
	pub asset: String,
	pub date: DateTime<Utc>,
	pub source: RealizedSource,

	/// Positive for a gain, negative for a loss
	pub amount: Quant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RealizedSource {
	Sale {
		quantity: Quant,
		acquired: DateTime<Utc>,
		unit_cost: Quant,
		unit_proceeds: Quant,
	},
	Dividend,
}

impl RealizedEvent {
	pub fn is_gain(&self) -> bool {
		self.amount.is_positive()
	}

	pub fn is_loss(&self) -> bool {
		self.amount.is_negative()
	}
}

/// Realized gains and losses added up over a set of events.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RealizedSummary {
	pub profit: Quant,

	/// In positive terms
	pub loss: Quant,
	pub net: Quant,
}

impl RealizedSummary {
	pub fn from_events<'a>(events: impl IntoIterator<Item = &'a RealizedEvent>) -> Self {
		let mut summary = Self::default();
		for event in events {
			if event.is_gain() {
				summary.profit += &event.amount;
			} else if event.is_loss() {
				summary.loss -= &event.amount;
			}
			summary.net += &event.amount;
		}
		summary
	}
}
