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
use crate::config::config_file::Config;
use anyhow::{anyhow, Context, Error};
use dirs::home_dir;
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_CONFIG_PATH: &str = ".config/stonkr/config.toml";

pub struct Filesystem {
	/// Base for the default config location. None if no home directory
	/// could be determined, in which case only explicit paths work.
	home: Option<PathBuf>,
}

impl Filesystem {
	pub fn new() -> Self {
		Self { home: home_dir() }
	}

	/// Resolves the default config path against the given directory instead
	/// of the user's home.
	pub fn with_home(home: &Path) -> Self {
		Self {
			home: Some(home.to_path_buf()),
		}
	}

	pub fn open(&self, file_path: &str) -> Result<File, Error> {
		let path = Path::new(file_path);
		File::open(path).with_context(|| format!("failed to open file {:?}", file_path))
	}

	/// Fetches the config from the given path, or the default path if none.
	/// A missing default file just means default settings, but a file that
	/// was asked for explicitly has to exist.
	pub fn get_config(&self, custom_config_path: Option<&String>) -> Result<Config, Error> {
		let config_path = match custom_config_path {
			Some(p) => PathBuf::from(p),
			None => match &self.home {
				Some(home) => home.join(DEFAULT_CONFIG_PATH),
				None => {
					debug!("no home directory, using default config");
					return Ok(Config::default());
				},
			},
		};

		if !config_path.exists() && custom_config_path.is_none() {
			debug!(path = %config_path.display(), "no config file, using defaults");
			return Ok(Config::default());
		}

		let content = fs::read_to_string(&config_path).with_context(|| {
			format!("failed to open file {:?}", config_path.display().to_string())
		})?;
		let config: Config = toml::from_str(&content)
			.map_err(|e| anyhow!("failed to parse config: {}", e))?;

		debug!(path = %config_path.display(), "loaded config");
		Ok(config)
	}
}

impl Default for Filesystem {
	fn default() -> Self {
		Self::new()
	}
}
