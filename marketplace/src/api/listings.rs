//! Listing API endpoints.
//!
//! - POST /create_listing - multipart create (requires auth)
//! - DELETE /delete_listing/:id?username= - delete own listing (requires auth)
//! - GET /get_listing/:id - single listing
//! - GET /get_user_listings?username= - listings owned by a user
//! - GET /list_active_listings?page=&page_size= - unsold listings, newest first

use super::{ListingView, UsernameQuery};
use crate::auth::SessionUser;
use crate::server::state::AppState;
use crate::uploads::ImageUpload;
use axum::{
    Json,
    extract::{
        Multipart, Path, Query, State,
        multipart::{Field, MultipartError, MultipartRejection},
        rejection::{PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use chaingo_core::{ListingId, NewListing, Price};
use chaingo_web::{AppError, WebResult};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response after creating a listing.
#[derive(Debug, Serialize)]
pub struct CreateListingResponse {
    /// Always `"success"`
    pub status: &'static str,
    /// Created listing ID
    pub listing_id: i64,
    /// Stored image file names, in upload order
    pub uploaded_images: Vec<String>,
}

/// Response after deleting a listing.
#[derive(Debug, Serialize)]
pub struct DeleteListingResponse {
    /// Always `"success"`
    pub status: &'static str,
    /// Human-readable confirmation
    pub message: String,
}

/// Response for a user's listings.
#[derive(Debug, Serialize)]
pub struct UserListingsResponse {
    /// Listings, newest first
    pub listings: Vec<ListingView>,
}

/// Query parameters for browsing active listings.
#[derive(Debug, Deserialize)]
pub struct ActiveListingsQuery {
    /// 1-based page (default: 1)
    pub page: Option<u32>,
    /// Page size (default: 50, max: 100 unless configured)
    pub page_size: Option<u32>,
}

/// One page of active listings.
#[derive(Debug, Serialize)]
pub struct ActiveListingsResponse {
    /// Requested page
    pub page: u32,
    /// Requested page size
    pub page_size: u32,
    /// `ceil(total_items / page_size)`
    pub total_pages: u64,
    /// Active listings across all pages
    pub total_items: u64,
    /// Listings on this page
    pub listings: Vec<ListingView>,
}

/// Multipart fields of a create request.
#[derive(Debug, Default)]
struct ListingForm {
    title: Option<String>,
    description: Option<String>,
    price: Option<String>,
    category: Option<String>,
    location: Option<String>,
    condition: Option<String>,
    username: Option<String>,
    images: Vec<ImageUpload>,
}

impl ListingForm {
    async fn read(mut multipart: Multipart) -> WebResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "title" => form.title = Some(text(field).await?),
                "description" => form.description = Some(text(field).await?),
                "price" => form.price = Some(text(field).await?),
                "category" => form.category = Some(text(field).await?),
                "location" => form.location = Some(text(field).await?),
                "condition" | "item_condition" => form.condition = Some(text(field).await?),
                "username" => form.username = Some(text(field).await?),
                "images" | "images[]" => {
                    let file_name = field.file_name().map(ToString::to_string);
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    form.images.push(ImageUpload {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    fn into_request(self) -> WebResult<(NewListing, Vec<ImageUpload>)> {
        let price = match self.price.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(raw.parse::<Price>()?),
            _ => None,
        };

        let listing = NewListing {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            price,
            category: self.category,
            location: self.location,
            item_condition: self.condition,
            owner_username: self.username.unwrap_or_default(),
            image_refs: Vec::new(),
        };

        Ok((listing, self.images))
    }
}

async fn text(field: Field<'_>) -> WebResult<String> {
    field.text().await.map_err(multipart_error)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large(e.body_text())
    } else {
        AppError::bad_request(e.body_text())
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a listing with optional images.
///
/// Requires authentication. `username`, when sent, must be the session user.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/create_listing \
///   -H "Authorization: Bearer <session_token>" \
///   -F title="Road bike" -F description="Barely used" -F price=250.00 \
///   -F category=sports -F images=@bike.jpg
/// ```
pub async fn create_listing(
    State(state): State<AppState>,
    session: SessionUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> WebResult<Json<CreateListingResponse>> {
    let multipart = multipart.map_err(|e| AppError::validation(e.body_text()))?;
    let (listing, images) = ListingForm::read(multipart).await?.into_request()?;

    let created = state.listings.create(&session, listing, images).await?;

    Ok(Json(CreateListingResponse {
        status: "success",
        listing_id: created.id.get(),
        uploaded_images: created.image_refs,
    }))
}

/// Delete a listing owned by the caller.
///
/// # Example
///
/// ```bash
/// curl -X DELETE "http://localhost:8080/delete_listing/42?username=alice" \
///   -H "Authorization: Bearer <session_token>"
/// ```
pub async fn delete_listing(
    State(state): State<AppState>,
    session: SessionUser,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<UsernameQuery>, QueryRejection>,
) -> WebResult<Json<DeleteListingResponse>> {
    let Path(id) = path?;
    let Query(query) = query?;

    state
        .listings
        .delete(&session, ListingId::new(id), &query.username)
        .await?;

    Ok(Json(DeleteListingResponse {
        status: "success",
        message: format!("Listing {id} deleted"),
    }))
}

/// Fetch a single listing.
pub async fn get_listing(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> WebResult<Json<ListingView>> {
    let Path(id) = path?;
    let listing = state.queries.get(ListingId::new(id)).await?;
    Ok(Json(listing.into()))
}

/// Listings owned by `username`, newest first.
pub async fn get_user_listings(
    State(state): State<AppState>,
    query: Result<Query<UsernameQuery>, QueryRejection>,
) -> WebResult<Json<UserListingsResponse>> {
    let Query(query) = query?;
    let listings = state.queries.list_by_owner(&query.username).await?;

    Ok(Json(UserListingsResponse {
        listings: listings.into_iter().map(ListingView::from).collect(),
    }))
}

/// Browse unsold listings.
///
/// # Example
///
/// ```bash
/// curl "http://localhost:8080/list_active_listings?page=2&page_size=10"
/// ```
pub async fn list_active_listings(
    State(state): State<AppState>,
    query: Result<Query<ActiveListingsQuery>, QueryRejection>,
) -> WebResult<Json<ActiveListingsResponse>> {
    let Query(query) = query?;
    let page = state
        .queries
        .list_active(query.page, query.page_size)
        .await?
        .map(ListingView::from);

    Ok(Json(ActiveListingsResponse {
        page: page.page,
        page_size: page.page_size,
        total_pages: page.total_pages,
        total_items: page.total_items,
        listings: page.items,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_form_into_request() {
        let form = ListingForm {
            title: Some("Lamp".into()),
            description: Some("Warm light".into()),
            price: Some(" 12.50 ".into()),
            condition: Some("used".into()),
            images: vec![ImageUpload {
                file_name: Some("lamp.png".into()),
                bytes: vec![1],
            }],
            ..ListingForm::default()
        };

        let (listing, images) = form.into_request().unwrap();
        assert_eq!(listing.price.map(|p| p.cents()), Some(1_250));
        assert_eq!(listing.item_condition.as_deref(), Some("used"));
        assert!(listing.owner_username.is_empty());
        assert_eq!(images.len(), 1);
    }

    #[test]
    fn test_form_rejects_bad_price() {
        let form = ListingForm {
            price: Some("-3".into()),
            ..ListingForm::default()
        };
        let err = form.into_request().unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
