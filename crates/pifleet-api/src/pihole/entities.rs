// Pi-hole API configuration collections
//
// Groups, lists, domains and clients share one shape: a GET returning
// `{ "<collection>": [...] }` and a PUT per natural key answering with a
// `processed` block.

use tracing::{debug, warn};

use crate::auth::Session;
use crate::error::Error;
use crate::pihole::client::PiholeClient;
use crate::pihole::models::{ConfigEntity, ProcessedResponse};

impl PiholeClient {
    /// Fetch a whole configuration collection.
    ///
    /// `GET /api/{collection}`. Returns `Ok(None)` when the response decodes
    /// but lacks the collection field, which callers treat as "not found".
    pub async fn list_entities<E: ConfigEntity>(
        &self,
        session: &Session,
    ) -> Result<Option<Vec<E>>, Error> {
        let url = self.api_url(&[E::COLLECTION])?;
        debug!(collection = E::COLLECTION, "listing {}", url);

        let resp = self
            .send(self.http().get(url).header("sid", session.sid.as_str()))
            .await?;
        let resp = Self::require_success(resp).await?;
        let mut body: serde_json::Map<String, serde_json::Value> = Self::decode(resp).await?;

        let Some(items) = body.remove(E::COLLECTION) else {
            return Ok(None);
        };
        let items: Vec<E> = serde_json::from_value(items).map_err(|e| Error::Deserialization {
            message: format!("invalid `{}` collection: {e}", E::COLLECTION),
            body: String::new(),
        })?;
        Ok(Some(items))
    }

    /// Create or replace one record, addressed by its natural key.
    ///
    /// `PUT /api/{collection}/{key...}`. Succeeds only on HTTP 200 with an
    /// empty `processed.errors` list; per-field rejections count as failure.
    pub async fn upsert_entity<E: ConfigEntity>(
        &self,
        session: &Session,
        entity: &E,
    ) -> Result<bool, Error> {
        let mut segments = vec![E::COLLECTION];
        segments.extend(entity.key_segments());
        let mut url = self.api_url(&segments)?;
        let query = entity.key_query();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        debug!(collection = E::COLLECTION, key = %entity.display_key(), "upserting");

        let resp = self
            .send(
                self.authed(self.http().put(url), session)
                    .json(&entity.upsert_body()),
            )
            .await?;
        if resp.status() != reqwest::StatusCode::OK {
            debug!(status = %resp.status(), "upsert rejected");
            return Ok(false);
        }

        let body: ProcessedResponse = match Self::decode(resp).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "upsert response did not decode");
                return Ok(false);
            }
        };
        let Some(processed) = body.processed else {
            debug!("upsert response carried no processed block");
            return Ok(false);
        };
        if !processed.errors.is_empty() {
            debug!(errors = ?processed.errors, "upsert reported per-field errors");
        }
        Ok(processed.errors.is_empty())
    }
}
