//! Configuration loading from arguments and environment.

use anyhow::Context;
use clap::Args;

use cash_client::CashClient;
use cash_types::{Currency, DecimalConfig, MoneyContext, UserId};

/// Connection, identity and precision settings.
#[derive(Debug, Args)]
pub struct Config {
    /// Base URL of the cash-management API
    #[arg(long, env = "CASH_API_URL", default_value = "http://localhost:9000")]
    pub api_url: String,

    /// Bearer token for authentication
    #[arg(long, env = "CASH_API_TOKEN")]
    pub token: Option<String>,

    /// Facility whose counters are managed
    #[arg(long, env = "CASH_FACILITY_ID")]
    pub facility: String,

    /// The acting user
    #[arg(long = "user", env = "CASH_USER_ID")]
    pub user_id: String,

    /// Decimal places amounts are stored and sent with
    #[arg(long, env = "CASH_INTERNAL_PRECISION", default_value_t = 2)]
    pub internal_precision: u32,

    /// Decimal places amounts are displayed with
    #[arg(long, env = "CASH_ACCOUNTING_PRECISION", default_value_t = 2)]
    pub accounting_precision: u32,

    /// Currency (INR, USD, EUR, GBP)
    #[arg(long, env = "CASH_CURRENCY", default_value = "INR")]
    pub currency: String,
}

impl Config {
    pub fn actor(&self) -> UserId {
        UserId::new(self.user_id.trim())
    }

    /// Builds the money context from the precision and currency settings.
    pub fn money(&self) -> anyhow::Result<MoneyContext> {
        let decimals = DecimalConfig::new(self.internal_precision, self.accounting_precision)
            .context("invalid precision settings")?;
        let currency: Currency = self
            .currency
            .parse()
            .with_context(|| format!("unsupported currency: {}", self.currency))?;
        Ok(MoneyContext::new(decimals, currency))
    }

    pub fn client(&self) -> CashClient {
        let client = CashClient::new(&self.api_url, &self.facility);
        match &self.token {
            Some(token) => client.with_token(token),
            None => client,
        }
    }
}
