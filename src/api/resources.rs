//! Typed endpoints of the studio backend.
//!
//! Thin wrappers over [`ApiClient`]: they build paths and pick the payload
//! types. Guarding and error classification stay with the client.

use chrono::SecondsFormat;

use super::{ApiClient, Body, RequestOptions, Upload};
use crate::shared::error::ApiError;
use crate::shared::models::{
    Booking, BookingCreate, BookingCancel, BookingFilter, BookingStats, Direction,
    DirectionCreate, DirectionUpdate, ManualSubscriptionGrant, Payment, PaymentCreate, Product,
    ProductCreate, ProductUpdate, SettingMedia, Slot, SlotCreate, SlotFilter, SlotUpdate,
    StudentUser, StudentUserUpdate, StudioAddresses, StudioAddressesUpdate, Subscription,
};

impl ApiClient {
    pub fn directions(&self) -> Directions<'_> {
        Directions { client: self }
    }

    pub fn slots(&self) -> Slots<'_> {
        Slots { client: self }
    }

    pub fn products(&self) -> Products<'_> {
        Products { client: self }
    }

    pub fn bookings(&self) -> Bookings<'_> {
        Bookings { client: self }
    }

    pub fn payments(&self) -> Payments<'_> {
        Payments { client: self }
    }

    pub fn users(&self) -> Users<'_> {
        Users { client: self }
    }

    pub fn settings(&self) -> Settings<'_> {
        Settings { client: self }
    }
}

/// `/directions`
pub struct Directions<'a> {
    client: &'a ApiClient,
}

impl Directions<'_> {
    pub async fn list(&self, include_inactive: bool) -> Result<Vec<Direction>, ApiError> {
        let options = if include_inactive {
            RequestOptions::new().query("include_inactive", true)
        } else {
            RequestOptions::new()
        };
        self.client.get("/directions", options).await
    }

    pub async fn create(&self, payload: &DirectionCreate) -> Result<Direction, ApiError> {
        self.client
            .post("/directions", Some(Body::json(payload)?), RequestOptions::new())
            .await
    }

    pub async fn update(&self, id: i64, payload: &DirectionUpdate) -> Result<Direction, ApiError> {
        self.client
            .patch(
                &format!("/directions/{}", id),
                Some(Body::json(payload)?),
                RequestOptions::new(),
            )
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .delete::<serde_json::Value>(&format!("/directions/{}", id), RequestOptions::new())
            .await
            .map(drop)
    }
}

/// `/slots`, the schedule.
pub struct Slots<'a> {
    client: &'a ApiClient,
}

impl Slots<'_> {
    pub async fn list(&self, filter: &SlotFilter) -> Result<Vec<Slot>, ApiError> {
        let options = RequestOptions::new()
            .query_opt(
                "from_dt",
                filter.from.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)),
            )
            .query_opt(
                "to_dt",
                filter.to.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)),
            )
            .query_opt("direction_id", filter.direction_id);
        self.client.get("/slots", options).await
    }

    pub async fn create(&self, payload: &SlotCreate) -> Result<Slot, ApiError> {
        self.client
            .post("/slots", Some(Body::json(payload)?), RequestOptions::new())
            .await
    }

    pub async fn update(&self, id: i64, payload: &SlotUpdate) -> Result<Slot, ApiError> {
        self.client
            .patch(
                &format!("/slots/{}", id),
                Some(Body::json(payload)?),
                RequestOptions::new(),
            )
            .await
    }

    /// Cancel a class. Bookings on it are cancelled server-side.
    pub async fn cancel(&self, id: i64) -> Result<Slot, ApiError> {
        self.client
            .post(&format!("/slots/{}/cancel", id), None, RequestOptions::new())
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .delete::<serde_json::Value>(&format!("/slots/{}", id), RequestOptions::new())
            .await
            .map(drop)
    }
}

/// `/products`
pub struct Products<'a> {
    client: &'a ApiClient,
}

impl Products<'_> {
    pub async fn list(&self) -> Result<Vec<Product>, ApiError> {
        self.client.get("/products", RequestOptions::new()).await
    }

    pub async fn create(&self, payload: &ProductCreate) -> Result<Product, ApiError> {
        self.client
            .post("/products", Some(Body::json(payload)?), RequestOptions::new())
            .await
    }

    pub async fn update(&self, id: i64, payload: &ProductUpdate) -> Result<Product, ApiError> {
        self.client
            .patch(
                &format!("/products/{}", id),
                Some(Body::json(payload)?),
                RequestOptions::new(),
            )
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .delete::<serde_json::Value>(&format!("/products/{}", id), RequestOptions::new())
            .await
            .map(drop)
    }
}

/// `/bookings`
pub struct Bookings<'a> {
    client: &'a ApiClient,
}

impl Bookings<'_> {
    pub async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>, ApiError> {
        let options = RequestOptions::new()
            .query_opt("slot_id", filter.slot_id)
            .query_opt("user_id", filter.user_id);
        self.client.get("/bookings", options).await
    }

    pub async fn create(&self, payload: &BookingCreate) -> Result<Booking, ApiError> {
        self.client
            .post("/bookings", Some(Body::json(payload)?), RequestOptions::new())
            .await
    }

    pub async fn cancel(&self, id: i64, reason: Option<String>) -> Result<Booking, ApiError> {
        let body = Body::json(&BookingCancel { reason })?;
        self.client
            .post(&format!("/bookings/{}/cancel", id), Some(body), RequestOptions::new())
            .await
    }

    /// Dashboard counters.
    pub async fn stats(&self) -> Result<BookingStats, ApiError> {
        self.client.get("/bookings/stats", RequestOptions::new()).await
    }
}

/// `/payments`
pub struct Payments<'a> {
    client: &'a ApiClient,
}

impl Payments<'_> {
    pub async fn list(&self) -> Result<Vec<Payment>, ApiError> {
        self.client.get("/payments", RequestOptions::new()).await
    }

    pub async fn create(&self, payload: &PaymentCreate) -> Result<Payment, ApiError> {
        self.client
            .post("/payments/create", Some(Body::json(payload)?), RequestOptions::new())
            .await
    }
}

/// `/users`, the studio's clients.
pub struct Users<'a> {
    client: &'a ApiClient,
}

impl Users<'_> {
    pub async fn list(&self) -> Result<Vec<StudentUser>, ApiError> {
        self.client.get("/users", RequestOptions::new()).await
    }

    pub async fn get(&self, id: i64) -> Result<StudentUser, ApiError> {
        self.client
            .get(&format!("/users/{}", id), RequestOptions::new())
            .await
    }

    pub async fn update(
        &self,
        id: i64,
        payload: &StudentUserUpdate,
    ) -> Result<StudentUser, ApiError> {
        self.client
            .patch(
                &format!("/users/{}", id),
                Some(Body::json(payload)?),
                RequestOptions::new(),
            )
            .await
    }

    /// Search by name or phone.
    ///
    /// The backend has no search route yet; the path and the `q` parameter
    /// name are assumed and may change once it does.
    pub async fn search(&self, query: &str) -> Result<Vec<StudentUser>, ApiError> {
        self.client
            .get("/users/search", RequestOptions::new().query("q", query.trim()))
            .await
    }

    pub async fn grant_manual_subscription(
        &self,
        id: i64,
        payload: &ManualSubscriptionGrant,
    ) -> Result<Subscription, ApiError> {
        self.client
            .post(
                &format!("/users/{}/manual-subscription", id),
                Some(Body::json(payload)?),
                RequestOptions::new(),
            )
            .await
    }
}

/// `/settings`
pub struct Settings<'a> {
    client: &'a ApiClient,
}

impl Settings<'_> {
    pub async fn addresses(&self) -> Result<StudioAddresses, ApiError> {
        self.client
            .get("/settings/addresses", RequestOptions::new())
            .await
    }

    /// Replace the addresses text. Attached media not in `keep_media_ids` is
    /// detached by the server; nothing is deleted from here.
    pub async fn update_addresses(
        &self,
        addresses: impl Into<String>,
        keep_media_ids: Vec<i64>,
    ) -> Result<StudioAddresses, ApiError> {
        let payload = StudioAddressesUpdate {
            addresses: addresses.into(),
            media_ids: keep_media_ids,
        };
        self.client
            .put(
                "/settings/addresses",
                Some(Body::json(&payload)?),
                RequestOptions::new(),
            )
            .await
    }

    pub async fn upload_address_media(
        &self,
        files: Vec<Upload>,
    ) -> Result<Vec<SettingMedia>, ApiError> {
        if files.is_empty() {
            return Err(ApiError::invalid_request("no files to upload"));
        }
        self.client
            .post(
                "/settings/addresses/media",
                Some(Body::Multipart(files)),
                RequestOptions::new(),
            )
            .await
    }
}
