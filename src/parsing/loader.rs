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
use crate::history::ledger::Ledger;
use crate::investment::prices::Prices;
use crate::investment::transaction::{Transaction, TxType};
use crate::parsing::filesystem::Filesystem;
use crate::util::quant::Quant;
use anyhow::{anyhow, Context, Error};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::str::FromStr;
use tracing::{info, warn};

// transactions: timestamp millis, asset ID, trade type, quantity, unit price
const TX_TIMESTAMP: usize = 0;
const TX_ASSET: usize = 1;
const TX_TYPE: usize = 2;
const TX_QUANTITY: usize = 3;
const TX_UNIT_PRICE: usize = 4;

// prices: asset ID, unit price
const PRICE_ASSET: usize = 0;
const PRICE_UNIT_PRICE: usize = 1;

/// Reads headerless transaction rows. Nothing is validated beyond what a
/// single transaction can check on its own; that is the ledger's job.
pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<Transaction>, Error> {
	let mut transactions = vec![];

	for record in csv_reader(reader).records() {
		let record = record?;
		let millis: i64 = field(&record, TX_TIMESTAMP, "timestamp")?;
		let asset = asset_id(&record, TX_ASSET)?;
		let kind: TxType = field(&record, TX_TYPE, "trade type")?;
		let quantity: Quant = field(&record, TX_QUANTITY, "quantity")?;
		let unit_price: Quant = field(&record, TX_UNIT_PRICE, "unit price")?;

		let tx = Transaction::from_millis(asset, millis, kind, quantity, unit_price)
			.with_context(|| format!("invalid transaction in row {}", render(&record)))?;
		transactions.push(tx);
	}

	Ok(transactions)
}

/// Reads headerless `asset ID, unit price` rows.
pub fn read_prices<R: Read>(reader: R) -> Result<Vec<(String, Quant)>, Error> {
	let mut prices = vec![];

	for record in csv_reader(reader).records() {
		let record = record?;
		let asset = asset_id(&record, PRICE_ASSET)?;
		let unit_price: Quant = field(&record, PRICE_UNIT_PRICE, "unit price")?;
		prices.push((asset.to_string(), unit_price));
	}

	Ok(prices)
}

/// Loads a transaction file into the ledger as a single batch.
pub fn load_transactions(
	fs: &Filesystem,
	file_path: &str,
	ledger: &mut Ledger,
) -> Result<(), Error> {
	let transactions = read_transactions(fs.open(file_path)?)?;
	if transactions.is_empty() {
		warn!(file = file_path, "no transactions found");
		return Ok(());
	}

	let count = transactions.len();
	ledger.add_transactions(transactions)?;
	info!(file = file_path, count, "loaded transactions");
	Ok(())
}

/// Loads a price file. Later rows for the same asset overwrite earlier ones.
pub fn load_prices(fs: &Filesystem, file_path: &str, prices: &mut Prices) -> Result<(), Error> {
	let rows = read_prices(fs.open(file_path)?)?;
	if rows.is_empty() {
		warn!(file = file_path, "no prices found");
		return Ok(());
	}

	let count = rows.len();
	prices.add_prices(rows)?;
	info!(file = file_path, count, "loaded prices");
	Ok(())
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
	ReaderBuilder::new()
		.has_headers(false)
		.flexible(true)
		.trim(Trim::All)
		.from_reader(reader)
}

fn field<T: FromStr>(record: &StringRecord, index: usize, name: &str) -> Result<T, Error> {
	record
		.get(index)
		.and_then(|s| s.parse().ok())
		.ok_or_else(|| anyhow!("failed to parse {} of row {}", name, render(record)))
}

fn asset_id(record: &StringRecord, index: usize) -> Result<&str, Error> {
	match record.get(index) {
		Some(id) if !id.is_empty() => Ok(id),
		_ => Err(anyhow!("failed to parse asset ID of row {}", render(record))),
	}
}

/// Renders a row as `[a b c]`.
fn render(record: &StringRecord) -> String {
	format!("[{}]", record.iter().collect::<Vec<_>>().join(" "))
}
