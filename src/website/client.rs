// HTTP client for the events API

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{WebsiteError, WebsiteResult};
use crate::models::{Event, EventList, EventUpdate, LikeRequest, NewComment, NewEvent, UpdateOutcome};

#[derive(Debug, Clone)]
pub struct EventsApiClient {
    base_url: String,
    client: Client,
}

impl EventsApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode a successful JSON body. Non-2xx is an error.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> WebsiteResult<T> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().to_string();
        debug!(%url, status = status.as_u16(), "events api responded");

        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "events api request failed");
            return Err(WebsiteError::Status {
                status: status.as_u16(),
                url,
            });
        }
        Ok(response.json::<T>().await?)
    }

    pub async fn list_events(&self) -> WebsiteResult<Vec<Event>> {
        let list: EventList = self.send(self.client.get(self.url("/events"))).await?;
        Ok(list.events)
    }

    pub async fn get_event(&self, id: i64) -> WebsiteResult<Event> {
        self.send(self.client.get(self.url(&format!("/event/{}", id))))
            .await
    }

    pub async fn create_event(&self, event: &NewEvent) -> WebsiteResult<i64> {
        self.send(self.client.post(self.url("/event")).json(event))
            .await
    }

    pub async fn update_event(&self, update: &EventUpdate) -> WebsiteResult<UpdateOutcome> {
        self.send(self.client.put(self.url("/event")).json(update))
            .await
    }

    pub async fn delete_event(&self, id: i64) -> WebsiteResult<i64> {
        self.send(self.client.delete(self.url(&format!("/event/{}", id))))
            .await
    }

    pub async fn add_comment(&self, comment: &NewComment) -> WebsiteResult<i64> {
        self.send(self.client.post(self.url("/comment")).json(comment))
            .await
    }

    pub async fn delete_comment(&self, event_id: i64, id: i64) -> WebsiteResult<i64> {
        self.send(
            self.client
                .delete(self.url(&format!("/comment/{}/{}", event_id, id))),
        )
        .await
    }

    pub async fn like_event(&self, id: i64) -> WebsiteResult<Event> {
        self.send(self.client.put(self.url("/like/event")).json(&LikeRequest { id }))
            .await
    }

    pub async fn unlike_event(&self, id: i64) -> WebsiteResult<Event> {
        self.send(
            self.client
                .delete(self.url("/like/event"))
                .json(&LikeRequest { id }),
        )
        .await
    }
}
