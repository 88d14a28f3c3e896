use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spdlog::prelude::*;
use thiserror::Error;
use url::Url;

/// A persisted report. The id is assigned by the store on creation and the
/// record is never mutated afterwards.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub user_id: String,
    pub template: String,
    pub input_data: String,
    pub generated_report: String,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied subset of a report. `created_at` is stamped at write time
/// by [`ReportStore::save`], not taken from the request.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReportCreate {
    pub user_id: String,
    pub template: String,
    pub input_data: String,
    pub generated_report: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewReport<'a> {
    #[serde(flatten)]
    report: &'a ReportCreate,
    created_at: DateTime<Utc>,
}

// Structs to map the document store's JSON envelopes
#[derive(Deserialize)]
struct StoreData<T> {
    data: T,
}

#[derive(Deserialize)]
struct CreatedId {
    id: String,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("bad store base url")]
    BadUrl(#[from] url::ParseError),

    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store returned {status}: {message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },
}

/// Client for the hosted document store's reports collection. Write failures
/// always propagate to the caller; nothing is swallowed.
#[derive(Debug)]
pub struct ReportStore {
    base_url: String,
    auth_token: String,
    client: reqwest::Client,
}

impl ReportStore {
    pub fn new(base_url: String, auth_token: String) -> Result<Self, StoreError> {
        Url::parse(&base_url)?;

        Ok(ReportStore {
            base_url,
            auth_token,
            client: reqwest::Client::new(),
        })
    }

    /// Appends a new record, stamping `created_at` with the current time.
    /// Returns the store-assigned identifier.
    pub async fn save(&self, data: &ReportCreate) -> Result<String, StoreError> {
        let url = format!("{}/reports", self.base_url);
        let record = NewReport {
            report: data,
            created_at: Utc::now(),
        };

        info!("Saving report for user {}", data.user_id);
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.auth_token)
            .json(&record)
            .send()
            .await?;

        let created: StoreData<CreatedId> = Self::decode(response).await?;
        Ok(created.data.id)
    }

    /// All reports owned by `user_id`, most recent first. The full result set
    /// is materialized; there is no pagination.
    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<Report>, StoreError> {
        let url = format!("{}/reports", self.base_url);

        debug!("Listing reports for user {}", user_id);
        let response = self
            .client
            .get(url)
            .query(&[("userId", user_id)])
            .bearer_auth(&self.auth_token)
            .send()
            .await?;

        let listed: StoreData<Vec<Report>> = Self::decode(response).await?;
        let mut reports = listed.data;
        sort_newest_first(&mut reports);

        Ok(reports)
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StoreError> {
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Api { status, message });
        }

        Ok(response.json().await?)
    }
}

/// Strictly `created_at` descending. The sort is stable, so records sharing a
/// timestamp keep the store's insertion order.
fn sort_newest_first(reports: &mut [Report]) {
    reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_report(id: &str, user_id: &str, created_at: DateTime<Utc>) -> Report {
        Report {
            id: id.to_string(),
            user_id: user_id.to_string(),
            template: "template".to_string(),
            input_data: "observations".to_string(),
            generated_report: "generated".to_string(),
            created_at,
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_sort_newest_first() {
        let mut reports = vec![
            make_report("a", "u1", at(100)),
            make_report("b", "u1", at(300)),
            make_report("c", "u1", at(200)),
        ];

        sort_newest_first(&mut reports);

        let ids: Vec<&str> = reports.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_ties_keep_insertion_order() {
        let mut reports = vec![
            make_report("first", "u1", at(100)),
            make_report("second", "u1", at(100)),
            make_report("newest", "u1", at(200)),
        ];

        sort_newest_first(&mut reports);

        let ids: Vec<&str> = reports.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["newest", "first", "second"]);
    }

    #[test]
    fn test_new_rejects_bad_base_url() {
        let store = ReportStore::new("not a url".to_string(), "token".to_string());
        assert!(matches!(store, Err(StoreError::BadUrl(_))));
    }

    #[test]
    fn test_new_report_stamps_created_at_on_the_wire() {
        let create = ReportCreate {
            user_id: "u1".to_string(),
            template: "t".to_string(),
            input_data: "i".to_string(),
            generated_report: "g".to_string(),
        };
        let record = NewReport {
            report: &create,
            created_at: at(42),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["createdAt"], "1970-01-01T00:00:42Z");
    }

    #[test]
    fn test_list_envelope_decodes_reports() {
        let raw = r#"{"data":[{"id":"r1","userId":"u1","template":"t",
            "inputData":"i","generatedReport":"g",
            "createdAt":"2025-06-01T12:00:00Z"}]}"#;

        let listed: StoreData<Vec<Report>> = serde_json::from_str(raw).unwrap();
        assert_eq!(listed.data.len(), 1);
        assert_eq!(listed.data[0].id, "r1");
        assert_eq!(listed.data[0].user_id, "u1");
    }
}
