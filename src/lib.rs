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
//! Lot accounting for a single portfolio: FIFO positions and realized
//! returns derived from a trading history, valuations at current prices,
//! and two planners on top of them. One finds the sales that realize an
//! exact return; the other finds the purchases (and sales) that move the
//! portfolio to a target distribution.
//!
//! All arithmetic is done on exact rationals; see [`util::quant::Quant`].

pub mod calculation;
pub mod config;
pub mod error;
pub mod history;
pub mod investment;
pub mod parsing;
pub mod reports;
pub mod util;

pub use error::Error;
