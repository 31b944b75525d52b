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
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
	pub data: Option<Data>,
	pub display: Option<Display>,
}

/// Input files to fall back on when none are passed on the command line.
#[derive(Debug, Default, Deserialize)]
pub struct Data {
	pub transactions: Option<String>,
	pub prices: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Display {
	/// Maximum number of decimal places to render
	pub precision: Option<u32>,

	/// One of error, warn, info, debug, trace
	pub log_level: Option<String>,
}

impl Config {
	pub fn transactions(&self) -> Option<&str> {
		self.data.as_ref()?.transactions.as_deref()
	}

	pub fn prices(&self) -> Option<&str> {
		self.data.as_ref()?.prices.as_deref()
	}

	pub fn precision(&self) -> Option<u32> {
		self.display.as_ref()?.precision
	}

	pub fn log_level(&self) -> Option<&str> {
		self.display.as_ref()?.log_level.as_deref()
	}
}
