//! Reqwest-backed implementation of [`RemoteApi`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{BodyWeightEntry, FoodEntry, Meal, Portion, Product, UserGoal};

use super::api::{
    BodyWeightCreate, BodyWeightPatch, FoodEntryCreate, FoodEntryPatch, GoalCreate, GoalPatch,
    MealCreate, MealPatch, PortionCreate, ProductCreate, ProductPatch, RemoteApi,
};
use super::error::ApiError;

/// Timeout for the health probe; a slow server still counts as reachable
/// for normal calls, which carry no timeout of their own.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

/// HTTP client for the CountOnMe API (`/v1` routes, bearer device token).
#[derive(Debug, Clone)]
pub struct HttpApi {
    base_url: String,
    device_token: String,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct RegisterRequest {
    device_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct RegisterResponse {
    device_id: Uuid,
    device_token: String,
}

impl HttpApi {
    pub fn new(server_url: &str, device_token: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(server_url),
            device_token: device_token.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Registers this device and returns `(device_id, device_token)`.
    ///
    /// Registration is the one call made without a bearer token.
    pub async fn register_device(
        server_url: &str,
        device_id: Uuid,
    ) -> Result<(Uuid, String), ApiError> {
        let base = normalize_base_url(server_url);
        let response = reqwest::Client::new()
            .post(format!("{}/v1/devices/register", base))
            .json(&RegisterRequest { device_id })
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let body: RegisterResponse = read_json(response).await?;
        Ok((body.device_id, body.device_token))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self
            .http
            .get(self.url(path))
            .query(query)
            .bearer_auth(&self.device_token)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        read_json(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.device_token)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        read_json(response).await
    }

    async fn patch_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .http
            .patch(self.url(path))
            .bearer_auth(&self.device_token)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        read_json(response).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(self.url(path))
            .bearer_auth(&self.device_token)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        check_status(response).await.map(|_| ())
    }
}

/// Checks whether the server answers its health endpoint.
pub async fn check_server(server_url: &str) -> bool {
    let base = normalize_base_url(server_url);
    let client = match reqwest::Client::builder().timeout(HEALTH_TIMEOUT).build() {
        Ok(c) => c,
        Err(_) => return false,
    };
    match client.get(format!("{}/health", base)).send().await {
        Ok(response) => response.status().is_success(),
        Err(_) => false,
    }
}

fn normalize_base_url(server_url: &str) -> String {
    let with_scheme = if server_url.starts_with("http://") || server_url.starts_with("https://") {
        server_url.to_string()
    } else {
        format!("http://{}", server_url)
    };
    with_scheme.trim_end_matches('/').to_string()
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| status.to_string());
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let response = check_status(response).await?;
    response
        .json()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

fn day_range_query(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(from) = from {
        query.push(("from", from.to_string()));
    }
    if let Some(to) = to {
        query.push(("to", to.to_string()));
    }
    query
}

#[async_trait]
impl RemoteApi for HttpApi {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get_json("/products", &[]).await
    }

    async fn create_product(&self, req: ProductCreate) -> Result<Product, ApiError> {
        self.post_json("/products", &req).await
    }

    async fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<Product, ApiError> {
        self.patch_json(&format!("/products/{}", id), &patch).await
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), ApiError> {
        self.delete(&format!("/products/{}", id)).await
    }

    async fn list_meals(&self) -> Result<Vec<Meal>, ApiError> {
        self.get_json("/meals", &[]).await
    }

    async fn create_meal(&self, req: MealCreate) -> Result<Meal, ApiError> {
        self.post_json("/meals", &req).await
    }

    async fn update_meal(&self, id: Uuid, patch: MealPatch) -> Result<Meal, ApiError> {
        self.patch_json(&format!("/meals/{}", id), &patch).await
    }

    async fn delete_meal(&self, id: Uuid) -> Result<(), ApiError> {
        self.delete(&format!("/meals/{}", id)).await
    }

    async fn list_goals(&self) -> Result<Vec<UserGoal>, ApiError> {
        self.get_json("/goals", &[]).await
    }

    async fn create_goal(&self, req: GoalCreate) -> Result<UserGoal, ApiError> {
        self.post_json("/goals/manual", &req).await
    }

    async fn update_goal(&self, id: Uuid, patch: GoalPatch) -> Result<UserGoal, ApiError> {
        self.patch_json(&format!("/goals/{}", id), &patch).await
    }

    async fn delete_goal(&self, id: Uuid) -> Result<(), ApiError> {
        self.delete(&format!("/goals/{}", id)).await
    }

    async fn list_body_weights(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<BodyWeightEntry>, ApiError> {
        self.get_json("/body-weights", &day_range_query(from, to))
            .await
    }

    async fn create_body_weight(
        &self,
        req: BodyWeightCreate,
    ) -> Result<BodyWeightEntry, ApiError> {
        self.post_json("/body-weights", &req).await
    }

    async fn update_body_weight(
        &self,
        id: Uuid,
        patch: BodyWeightPatch,
    ) -> Result<BodyWeightEntry, ApiError> {
        self.patch_json(&format!("/body-weights/{}", id), &patch)
            .await
    }

    async fn delete_body_weight(&self, id: Uuid) -> Result<(), ApiError> {
        self.delete(&format!("/body-weights/{}", id)).await
    }

    async fn list_food_entries(&self, day: NaiveDate) -> Result<Vec<FoodEntry>, ApiError> {
        self.get_json("/food-entries", &[("day", day.to_string())])
            .await
    }

    async fn create_food_entry(&self, req: FoodEntryCreate) -> Result<FoodEntry, ApiError> {
        self.post_json("/food-entries", &req).await
    }

    async fn update_food_entry(
        &self,
        id: Uuid,
        patch: FoodEntryPatch,
    ) -> Result<FoodEntry, ApiError> {
        self.patch_json(&format!("/food-entries/{}", id), &patch)
            .await
    }

    async fn delete_food_entry(&self, id: Uuid) -> Result<(), ApiError> {
        self.delete(&format!("/food-entries/{}", id)).await
    }

    async fn list_portions(&self, product_id: Uuid) -> Result<Vec<Portion>, ApiError> {
        self.get_json(&format!("/products/{}/portions", product_id), &[])
            .await
    }

    async fn create_portion(
        &self,
        product_id: Uuid,
        req: PortionCreate,
    ) -> Result<Portion, ApiError> {
        self.post_json(&format!("/products/{}/portions", product_id), &req)
            .await
    }
}
