//! Listing services - home page, catalogue, property detail, favorites and the seller dashboard

use super::inbox::send_message;
use super::recommendation::{Recommendation, recommend_for};
use crate::core::{AppError, AppState, FlashLevel, Page, RequestContext};
use crate::dtos::{
    CreatePropertyDTO, DeletePropertyDTO, FavoriteDTO, HomeDTO, ImageUploadDTO, MessageDTO,
    PropertyDTO, PropertyDetailDTO, PropertyFormDTO, PropertyListDTO, PropertyListQuery,
    SendMessageDTO,
};
use crate::entities::{Property, PropertyType, User};
use crate::repositories::{Create, Delete, Update};
use crate::storage::LocalImageStore;
use axum::{
    Extension,
    extract::{Json, Multipart, Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

const FEATURED_PER_TYPE: i64 = 4;
const TOP_PRICED_PER_TYPE: i64 = 2;

fn to_dtos(properties: Vec<Property>) -> Vec<PropertyDTO> {
    properties.into_iter().map(PropertyDTO::from).collect()
}

#[instrument(skip(state, ctx), fields(user_id = ?ctx.user_id()))]
pub async fn home(
    State(state): State<Arc<AppState>>,
    Extension(mut ctx): Extension<RequestContext>,
) -> Result<Json<Page<HomeDTO>>, AppError> {
    debug!("Building home page");
    // 1. Showcase: the most expensive published house
    // 2. Newest published houses and land plots
    // 3. Recommendations for authenticated users only, never including the showcase
    // 4. Tell the user why the recommendation block is empty
    let showcase = state.property.find_showcase().await?;
    let featured_houses = state
        .property
        .find_latest_published(PropertyType::House, FEATURED_PER_TYPE)
        .await?;
    let featured_land = state
        .property
        .find_latest_published(PropertyType::Land, FEATURED_PER_TYPE)
        .await?;

    let recommendation = match ctx.user_id() {
        Some(user_id) => {
            recommend_for(&state, user_id, showcase.as_ref().map(|p| p.property_id)).await?
        }
        None => Recommendation::Matched(Vec::new()),
    };
    match &recommendation {
        Recommendation::NoMatch => {
            info!("No recommendation matched the user's preferences");
            ctx.flash(FlashLevel::Warning, recommendation.notice().unwrap_or_default());
        }
        Recommendation::MissingCriteria => {
            ctx.flash(FlashLevel::Info, recommendation.notice().unwrap_or_default());
        }
        Recommendation::Matched(_) => {}
    }

    Ok(Json(ctx.into_page(HomeDTO {
        showcase_property: showcase.map(PropertyDTO::from),
        featured_houses: to_dtos(featured_houses),
        featured_land: to_dtos(featured_land),
        recommended_properties: to_dtos(recommendation.into_properties()),
    })))
}

#[instrument(skip(state), fields(filter = ?params.property_type))]
pub async fn property_list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PropertyListQuery>, // /properties?type=House
) -> Result<Json<PropertyListDTO>, AppError> {
    debug!("Listing published properties");
    // 1. Parse the type filter, ignoring unknown values
    // 2. Published listings, newest first
    // 3. Featured block: top priced houses and land merged by price
    let active_filter = params.type_filter();
    let properties = state.property.find_published(active_filter).await?;

    let mut featured = state
        .property
        .find_top_priced(PropertyType::House, TOP_PRICED_PER_TYPE)
        .await?;
    featured.extend(
        state
            .property
            .find_top_priced(PropertyType::Land, TOP_PRICED_PER_TYPE)
            .await?,
    );
    featured.sort_by(|a, b| b.price.cmp(&a.price).then(b.property_id.cmp(&a.property_id)));

    info!("Found {} properties", properties.len());
    Ok(Json(PropertyListDTO {
        properties: to_dtos(properties),
        featured_properties: to_dtos(featured),
        active_filter,
    }))
}

#[instrument(skip(state), fields(property_id = %property_id))]
pub async fn property_detail(
    State(state): State<Arc<AppState>>,
    Path(property_id): Path<i64>,
) -> Result<Json<PropertyDetailDTO>, AppError> {
    debug!("Fetching property detail");
    let property = state
        .property
        .find_published_by_id(&property_id)
        .await?
        .ok_or_else(|| {
            warn!("Property not found or unpublished");
            AppError::not_found("Property not found")
        })?;
    let images = state.property.find_images(&property_id).await?;

    Ok(Json(PropertyDetailDTO::new(property, images)))
}

#[instrument(skip(state, ctx, current_user, body), fields(user_id = %current_user.user_id, property_id = %property_id))]
pub async fn send_inquiry(
    State(state): State<Arc<AppState>>,
    Extension(mut ctx): Extension<RequestContext>,
    Extension(current_user): Extension<User>,
    Path(property_id): Path<i64>,
    Json(body): Json<SendMessageDTO>,
) -> Result<(StatusCode, Json<Page<MessageDTO>>), AppError> {
    debug!("Sending inquiry about a property");
    // 1. The property must be published, otherwise NOT_FOUND
    // 2. The seller is the recipient; sellers cannot inquire about their own listing
    let property = state
        .property
        .find_published_by_id(&property_id)
        .await?
        .ok_or_else(|| AppError::not_found("Property not found"))?;

    let message = send_message(
        &state,
        current_user.user_id,
        property.seller_id,
        Some(property.property_id),
        &body.body,
    )
    .await?;

    ctx.flash(FlashLevel::Success, "Your message has been sent to the seller.");
    Ok((
        StatusCode::CREATED,
        Json(ctx.into_page(MessageDTO::from(message))),
    ))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, property_id = %property_id))]
pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(property_id): Path<i64>,
) -> Result<Json<FavoriteDTO>, AppError> {
    if state.property.find_published_by_id(&property_id).await?.is_none() {
        warn!("Cannot favorite a missing property");
        return Err(AppError::not_found("Property not found"));
    }

    let favorited = state
        .profile
        .toggle_wishlist(&current_user.user_id, &property_id)
        .await?;
    info!("Property favorited: {}", favorited);

    Ok(Json(FavoriteDTO {
        property_id,
        favorited,
    }))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn seller_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<PropertyDTO>>, AppError> {
    let properties = state.property.find_by_seller(&current_user.user_id).await?;
    debug!("Seller has {} listings", properties.len());
    Ok(Json(to_dtos(properties)))
}

#[instrument(skip(state, ctx, current_user, form), fields(user_id = %current_user.user_id))]
pub async fn add_property(
    State(state): State<Arc<AppState>>,
    Extension(mut ctx): Extension<RequestContext>,
    Extension(current_user): Extension<User>,
    Json(form): Json<PropertyFormDTO>,
) -> Result<(StatusCode, Json<Page<PropertyDTO>>), AppError> {
    debug!("Adding a listing");
    // 1. Validate the form
    // 2. The seller is always the authenticated user, the listing is published right away
    // 3. Listing and gallery are stored in one transaction
    form.validate()?;

    let new_property = CreatePropertyDTO {
        seller_id: current_user.user_id,
        form,
        is_published: true,
        list_date: Utc::now(),
    };
    let property = state.property.create(&new_property).await?;
    info!("Property {} listed", property.property_id);

    ctx.flash(FlashLevel::Success, "Property added successfully!");
    Ok((
        StatusCode::CREATED,
        Json(ctx.into_page(PropertyDTO::from(property))),
    ))
}

#[instrument(skip(state, ctx, current_user, form), fields(user_id = %current_user.user_id, property_id = %property_id))]
pub async fn edit_property(
    State(state): State<Arc<AppState>>,
    Extension(mut ctx): Extension<RequestContext>,
    Extension(current_user): Extension<User>,
    Path(property_id): Path<i64>,
    Json(form): Json<PropertyFormDTO>,
) -> Result<Json<Page<PropertyDTO>>, AppError> {
    debug!("Editing a listing");
    form.validate()?;

    // listings of other sellers are indistinguishable from missing ones
    if state
        .property
        .find_owned(&property_id, &current_user.user_id)
        .await?
        .is_none()
    {
        warn!("Listing not owned by the seller");
        return Err(AppError::not_found("Property not found"));
    }

    let property = state.property.update(&property_id, &form).await?;
    info!("Property updated");

    ctx.flash(FlashLevel::Success, "Property updated successfully!");
    Ok(Json(ctx.into_page(PropertyDTO::from(property))))
}

#[instrument(skip(state, ctx, current_user), fields(user_id = %current_user.user_id, property_id = %property_id))]
pub async fn delete_property(
    State(state): State<Arc<AppState>>,
    Extension(mut ctx): Extension<RequestContext>,
    Extension(current_user): Extension<User>,
    Path(property_id): Path<i64>,
) -> Json<Page<DeletePropertyDTO>> {
    // the outcome is always reported through a flash message
    let owned = state
        .property
        .find_owned(&property_id, &current_user.user_id)
        .await;

    let deleted = match owned {
        Ok(Some(_)) => match state.property.delete(&property_id).await {
            Ok(()) => {
                info!("Property deleted");
                ctx.flash(FlashLevel::Success, "Property deleted successfully!");
                true
            }
            Err(e) => {
                error!("Failed to delete property: {:?}", e);
                ctx.flash(FlashLevel::Error, "The property could not be deleted.");
                false
            }
        },
        Ok(None) => {
            warn!("Delete refused: listing missing or not owned");
            ctx.flash(
                FlashLevel::Error,
                "Property not found or you do not have permission to delete it.",
            );
            false
        }
        Err(e) => {
            error!("Failed to look up property: {:?}", e);
            ctx.flash(FlashLevel::Error, "The property could not be deleted.");
            false
        }
    };

    Json(ctx.into_page(DeletePropertyDTO {
        property_id,
        deleted,
    }))
}

#[instrument(skip(state, current_user, multipart), fields(user_id = %current_user.user_id))]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ImageUploadDTO>), AppError> {
    debug!("Receiving image upload");
    // 1. Find the `image` field, other fields are skipped
    // 2. Accept image extensions only
    // 3. Store the file and hand back its reference
    // TODO: uploads never referenced by a listing are not garbage collected
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("image") {
            continue;
        }

        let extension = field
            .file_name()
            .and_then(LocalImageStore::image_extension)
            .ok_or_else(|| {
                warn!("Rejected upload with unsupported file name");
                AppError::bad_request("Unsupported image type")
            })?;
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(AppError::bad_request("The uploaded image is empty"));
        }

        let image_ref = state.images.save(&extension, &bytes).await?;
        return Ok((StatusCode::CREATED, Json(ImageUploadDTO { image_ref })));
    }

    warn!("Upload without an image field");
    Err(AppError::bad_request("Missing image field"))
}
