/* src/config/load.rs */

use std::path::Path;

use validator::Validate;

use super::{ConfigError, LockConfig};

impl LockConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
		config.checked()
	}

	/// Parses and validates a JSON document.
	pub fn from_json_slice(input: &[u8]) -> Result<Self, ConfigError> {
		let config: Self =
			serde_json::from_slice(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
		config.checked()
	}

	/// Reads a config file, selecting the parser by extension (`toml` or `json`).
	pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let ext = path
			.extension()
			.and_then(|ext| ext.to_str())
			.ok_or_else(|| ConfigError::UnsupportedFormat("missing extension".to_string()))?;

		let config = match ext {
			"toml" => {
				let input = tokio::fs::read_to_string(path).await?;
				Self::from_toml_str(&input)?
			}
			"json" => {
				let input = tokio::fs::read(path).await?;
				Self::from_json_slice(&input)?
			}
			other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
		};

		tracing::debug!(path = ?path, strategy = %config.strategy, "lock config loaded");
		Ok(config)
	}

	fn checked(self) -> Result<Self, ConfigError> {
		self.validate()?;
		Ok(self)
	}
}
