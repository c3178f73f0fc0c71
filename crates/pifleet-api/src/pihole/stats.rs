// Pi-hole API statistics endpoints

use tracing::debug;

use crate::auth::Session;
use crate::error::Error;
use crate::pihole::client::PiholeClient;
use crate::pihole::models::StatsSummary;

impl PiholeClient {
    /// Aggregate query, client and gravity statistics.
    ///
    /// `GET /api/stats/summary`
    pub async fn stats_summary(&self, session: &Session) -> Result<StatsSummary, Error> {
        let url = self.api_url(&["stats", "summary"])?;
        debug!("fetching stats summary");

        let resp = self
            .send(self.http().get(url).header("sid", session.sid.as_str()))
            .await?;
        let resp = Self::require_success(resp).await?;
        Self::decode(resp).await
    }
}
