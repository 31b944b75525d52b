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
use anyhow::{anyhow, bail, Context, Error};
use chrono::Utc;
use clap::{ArgAction, Parser, ValueEnum};
use serde::Serialize;
use std::collections::BTreeMap;
use stonkr::calculation::calculator::Calculator;
use stonkr::calculation::distribution::Distribution;
use stonkr::config::config_file::Config;
use stonkr::history::ledger::Ledger;
use stonkr::investment::prices::Prices;
use stonkr::investment::realized::{RealizedEvent, RealizedSummary};
use stonkr::parsing::filesystem::Filesystem;
use stonkr::parsing::loader;
use stonkr::reports::plan_reporter::{AdjustmentReport, PlanReporter};
use stonkr::reports::portfolio_reporter::PortfolioReporter;
use stonkr::util::quant::Quant;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
	name = "stonkr",
	version,
	about = "Lot accounting, sale planning and rebalancing"
)]
struct Cli {
	// ----------------
	// -- POSITIONAL --
	// ----------------
	/// The command to execute
	command: Directive,

	/// The target return for the Sales command; negative for a loss
	#[arg(required = false, allow_negative_numbers = true)]
	term: Option<String>,

	// -----------
	// -- FLAGS --
	// -----------
	/// Transactions file (timestamp,asset,type,quantity,unit price)
	#[arg(short, long)]
	file: Option<String>,

	/// Current prices file (asset,unit price)
	#[arg(short, long)]
	prices: Option<String>,

	/// Limit the report to this asset; repeatable. For Sales, the
	/// candidates to sell from
	#[arg(short, long = "asset")]
	assets: Vec<String>,

	/// Sell from the assets in the order given instead of the optimal order
	#[arg(long)]
	manual: bool,

	/// Target distribution entry for Rebalance as ASSET=RATIO; repeatable
	#[arg(short, long = "distribution")]
	distribution: Vec<String>,

	/// Fresh money to invest when rebalancing
	#[arg(short, long, allow_negative_numbers = true)]
	budget: Option<String>,

	/// Only buy when rebalancing
	#[arg(long)]
	no_sell: bool,

	/// Maximum amount of decimal places to show for any amounts
	#[arg(long)]
	precision: Option<u32>,

	/// Custom config file location (default: ~/.config/stonkr/config.toml)
	#[arg(long)]
	config: Option<String>,

	/// Print exact values as JSON instead of a table
	#[arg(long)]
	json: bool,

	/// More logging on stderr; repeatable
	#[arg(short, long, action = ArgAction::Count)]
	verbose: u8,
}

impl Cli {
	/// The point is that this number exceeds what anyone wants; it's just to
	/// stop the program from printing e.g. millions of zeroes by accident
	const MAX_PRECISION: u32 = 50;

	const DEFAULT_PRECISION: u32 = 6;

	/// Extra validations on top of what clap does
	fn validate(&self) -> Result<(), Error> {
		if let Some(prec) = self.precision {
			check_precision(prec)?;
		}

		if self.manual && self.assets.is_empty() {
			bail!("--manual needs the assets to sell from, given with -a");
		}

		Ok(())
	}

	/// Flags win over the config file.
	fn precision(&self, config: &Config) -> Result<u32, Error> {
		let precision = self
			.precision
			.or(config.precision())
			.unwrap_or(Cli::DEFAULT_PRECISION);
		check_precision(precision)?;
		Ok(precision)
	}
}

fn check_precision(precision: u32) -> Result<(), Error> {
	if precision > Cli::MAX_PRECISION {
		bail!("Maximum precision is {}", Cli::MAX_PRECISION);
	}
	Ok(())
}

#[derive(ValueEnum, Clone, Copy, PartialEq)]
enum Directive {
	Qty, // held quantities
	Pos, // open lots

	Rgl, // realized gains/losses report

	Worth,
	Ret,
	Yield,
	Ratio,
	Envelope, // max profit and loss of selling in FIFO order

	Sales,     // what to sell for a target return
	Rebalance, // what to buy/sell for a target distribution
}

fn main() -> Result<(), Error> {
	let args = Cli::parse();
	args.validate()?;

	let fs = Filesystem::new();
	let config = fs.get_config(args.config.as_ref())?;
	init_tracing(args.verbose, config.log_level());

	let precision = args.precision(&config)?;

	let (ledger, prices) = load(&args, &config, &fs)?;
	let calc = Calculator::new(&ledger, &prices);
	let portfolio = PortfolioReporter::new(precision);

	match args.command {
		Directive::Qty => {
			let quantities = filter(ledger.quantities(), &args.assets);
			if args.json {
				return print_json(&quantities);
			}
			portfolio.print_values("Qty", &quantities, None);
		},
		Directive::Pos => {
			let positions = filter(ledger.positions_map()?, &args.assets);
			if args.json {
				return print_json(&positions);
			}
			portfolio.print_positions(&positions, &Utc::now());
		},
		Directive::Rgl => {
			let events: Vec<RealizedEvent> = ledger
				.realized_events()?
				.into_iter()
				.filter(|e| args.assets.is_empty() || args.assets.contains(&e.asset))
				.collect();
			if args.json {
				return print_json(&RealizedReport {
					summary: RealizedSummary::from_events(&events),
					events: &events,
				});
			}
			portfolio.print_realized(&events);
		},
		Directive::Worth => {
			let (worth, total) = if args.assets.is_empty() {
				(calc.worth_map()?, calc.worth()?)
			} else {
				(calc.worth_map_of(&args.assets)?, calc.worth_of(&args.assets)?)
			};
			if args.json {
				return print_json(&ValueReport {
					assets: &worth,
					total: &total,
				});
			}
			portfolio.print_values("Worth", &worth, Some(&total));
		},
		Directive::Ret | Directive::Yield => {
			let (header, values) = if args.command == Directive::Ret {
				("Return", calc.return_map()?)
			} else {
				("Yield", calc.yield_map()?)
			};
			let values = filter(values, &args.assets);
			let total: Quant = values.values().sum();
			if args.json {
				return print_json(&ValueReport {
					assets: &values,
					total: &total,
				});
			}
			portfolio.print_values(header, &values, Some(&total));
		},
		Directive::Ratio => {
			let ratios = calc.ratio_map(&held_or_selected(&args, &ledger))?;
			if args.json {
				return print_json(&ratios);
			}
			portfolio.print_values("Ratio", &ratios, None);
		},
		Directive::Envelope => {
			let envelopes =
				calc.max_profit_and_loss_map(&held_or_selected(&args, &ledger))?;
			if args.json {
				return print_json(&envelopes);
			}
			portfolio.print_envelopes(&envelopes);
		},
		Directive::Sales => {
			let target: Quant = match &args.term {
				Some(term) => term
					.parse()
					.with_context(|| format!("invalid target return {:?}", term))?,
				None => bail!("No target return specified"),
			};

			let plan = if args.assets.is_empty() {
				calc.sales_for_return_all(&target)?
			} else {
				calc.sales_for_return(&target, &args.assets, !args.manual)?
			};
			let realized = calc.realized_for_sales(&plan)?;
			debug!(%target, %realized, "sale plan checked");

			if args.json {
				return print_json(&SalesReport {
					sales: &plan,
					realized: &realized,
				});
			}
			PlanReporter::new(precision).print_sales(&plan, &realized);
		},
		Directive::Rebalance => rebalance(&args, &calc, precision)?,
	}

	Ok(())
}

/// Loads the transactions and prices named by the flags, or else by the
/// config file. Transactions are required; prices are not.
fn load(
	args: &Cli,
	config: &Config,
	fs: &Filesystem,
) -> Result<(Ledger, Prices), Error> {
	let transactions = args
		.file
		.as_deref()
		.or(config.transactions())
		.ok_or_else(|| anyhow!("No transactions file specified"))?;

	let mut ledger = Ledger::new();
	loader::load_transactions(fs, transactions, &mut ledger)?;

	let mut prices = Prices::new();
	if let Some(path) = args.prices.as_deref().or(config.prices()) {
		loader::load_prices(fs, path, &mut prices)?;
	}

	Ok((ledger, prices))
}

fn rebalance(args: &Cli, calc: &Calculator, precision: u32) -> Result<(), Error> {
	if args.distribution.is_empty() {
		bail!("No distribution specified");
	}

	let distribution = parse_distribution(&args.distribution)?;
	let budget: Option<Quant> = match &args.budget {
		Some(b) => Some(
			b.parse()
				.with_context(|| format!("invalid budget {:?}", b))?,
		),
		None => None,
	};

	let (adjustment, factor) = match (args.no_sell, budget) {
		(true, Some(budget)) => {
			let (adjustment, factor) =
				calc.adjustment_without_selling_with_budget(&distribution, &budget)?;
			(adjustment, Some(factor))
		},
		(true, None) => (calc.adjustment_without_selling(&distribution)?, None),
		(false, budget) => (
			calc.adjustment_with_budget(&distribution, &budget.unwrap_or_default())?,
			None,
		),
	};

	if args.json {
		return print_json(&AdjustmentReport {
			distribution: distribution.ratios(),
			adjustment: &adjustment,
			factor: factor.as_ref(),
		});
	}

	PlanReporter::new(precision).print_adjustment(
		&distribution,
		&adjustment,
		factor.as_ref(),
	);
	Ok(())
}

/// Parses `ASSET=RATIO` entries, ratios as decimals or fractions.
fn parse_distribution(entries: &[String]) -> Result<Distribution, Error> {
	let mut ratios = BTreeMap::new();

	for entry in entries {
		let (asset, ratio) = entry
			.split_once('=')
			.ok_or_else(|| anyhow!("expected ASSET=RATIO, got {:?}", entry))?;
		let ratio: Quant = ratio
			.trim()
			.parse()
			.with_context(|| format!("invalid ratio for {}", asset))?;

		if ratios.insert(asset.trim().to_string(), ratio).is_some() {
			bail!("{} appears more than once in the distribution", asset);
		}
	}

	Ok(Distribution::new(ratios)?)
}

/// The assets given with -a, or else every asset currently held.
fn held_or_selected(args: &Cli, ledger: &Ledger) -> Vec<String> {
	if args.assets.is_empty() {
		ledger.quantities().into_keys().collect()
	} else {
		args.assets.clone()
	}
}

/// Keeps the entries of the selected assets; no selection keeps everything.
fn filter<T>(mut map: BTreeMap<String, T>, assets: &[String]) -> BTreeMap<String, T> {
	if !assets.is_empty() {
		map.retain(|asset, _| assets.contains(asset));
	}
	map
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Error> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}

/// `-v` raises the level from warn; RUST_LOG overrides both it and the
/// config file.
fn init_tracing(verbosity: u8, configured: Option<&str>) {
	let level = match verbosity {
		0 => configured.unwrap_or("warn"),
		1 => "info",
		2 => "debug",
		_ => "trace",
	};

	tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
		)
		.init();
}

#[derive(Serialize)]
struct ValueReport<'a> {
	assets: &'a BTreeMap<String, Quant>,
	total: &'a Quant,
}

#[derive(Serialize)]
struct RealizedReport<'a> {
	#[serde(flatten)]
	summary: RealizedSummary,
	events: &'a [RealizedEvent],
}

#[derive(Serialize)]
struct SalesReport<'a> {
	sales: &'a BTreeMap<String, Quant>,
	realized: &'a Quant,
}
