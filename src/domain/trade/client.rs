//! Trades sub-client — historical trade queries.

use crate::client::MarketClient;
use crate::domain::trade::Trade;
use crate::error::SdkError;
use crate::shared::TradeSizeBucket;

pub struct Trades<'a> {
    pub(crate) client: &'a MarketClient,
}

impl<'a> Trades<'a> {
    /// Fetch up to `limit` recent trades for a size bucket, newest-first.
    pub async fn recent(
        &self,
        filter: TradeSizeBucket,
        limit: Option<u32>,
        before: Option<i64>,
    ) -> Result<Vec<Trade>, SdkError> {
        let wires = self.client.http.get_trades(filter, limit, before).await?;
        Ok(wires.into_iter().map(Trade::from).collect())
    }
}
