use std::str::FromStr;

use alloy_primitives::{Address, Bytes};
use beacon_miner_primitives::constants::MAX_EXTRA_DATA_SIZE;
use eyre::eyre::{bail, eyre};
use tracing::warn;

use crate::config::{MinerConfig, DEFAULT_FEE_CURRENCY_LIMIT};

/// Parameters for the block builder
#[derive(Debug, Clone, PartialEq, clap::Args)]
#[command(next_help_heading = "Miner")]
pub struct MinerArgs {
    /// Validator address blocks are mined for.
    #[arg(long = "miner.validator", default_value_t = Default::default())]
    pub validator: Address,

    /// Address receiving transaction fees. Defaults to the validator.
    #[arg(long = "miner.tx-fee-recipient")]
    pub tx_fee_recipient: Option<Address>,

    /// Block extra data set by the miner
    #[arg(long = "miner.extradata")]
    pub extra_data: Option<Bytes>,

    /// Share of the block gas limit each whitelisted fee currency may use,
    /// between 0 and 1.
    #[arg(long = "miner.feecurrency.default", default_value_t = DEFAULT_FEE_CURRENCY_LIMIT)]
    pub fee_currency_default: f64,

    /// Comma-separated per-currency overrides of the default share, each
    /// formatted as `address=fraction`.
    #[arg(
        long = "miner.feecurrency.limits",
        value_delimiter = ',',
        value_name = "ADDRESS=FRACTION",
        value_parser = parse_currency_limit
    )]
    pub fee_currency_limits: Vec<(Address, f64)>,
}

impl MinerArgs {
    pub fn into_config(self) -> eyre::Result<MinerConfig> {
        // Perform arg validation here for things clap can't do.
        check_fraction(self.fee_currency_default)?;
        for (_, fraction) in &self.fee_currency_limits {
            check_fraction(*fraction)?;
        }

        let extra = self.extra_data.unwrap_or_default();
        if extra.len() > MAX_EXTRA_DATA_SIZE {
            bail!(
                "extra data exceeds {MAX_EXTRA_DATA_SIZE} bytes: {} bytes",
                extra.len()
            );
        }

        if self.validator == Address::ZERO {
            warn!(target: "miner", "missing `--miner.validator`, using the zero address");
        }
        let tx_fee_recipient = self.tx_fee_recipient.unwrap_or_else(|| {
            warn!(
                target: "miner",
                validator = %self.validator,
                "missing `--miner.tx-fee-recipient`, using the validator"
            );
            self.validator
        });

        Ok(MinerConfig {
            validator: self.validator,
            tx_fee_recipient,
            extra,
            fee_currency_default: self.fee_currency_default,
            fee_currency_limits: self.fee_currency_limits.into_iter().collect(),
        })
    }
}

fn check_fraction(fraction: f64) -> eyre::Result<()> {
    if !(0.0..=1.0).contains(&fraction) {
        bail!("fee currency limit must be between 0 and 1, got {fraction}");
    }
    Ok(())
}

pub fn parse_currency_limit(s: &str) -> eyre::Result<(Address, f64)> {
    let (currency, fraction) = s
        .split_once('=')
        .ok_or_else(|| eyre!("expected `address=fraction`, got `{s}`"))?;
    let currency = Address::from_str(currency.trim())?;
    let fraction = fraction.trim().parse::<f64>()?;
    Ok((currency, fraction))
}
