//! User services - account settings and password change

use crate::core::{AppError, AppState, FlashLevel, Page, RequestContext};
use crate::dtos::{
    ProfileDTO, SetPasswordDTO, SettingsDTO, UpdateProfileDTO, UpdateSettingsDTO, UpdateUserDTO,
    UserDTO,
};
use crate::entities::{Profile, User};
use crate::repositories::Update;
use axum::{
    Extension,
    extract::{Json, State},
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// `Some("")` means "clear the field": returns whether it did and leaves `None` behind
fn take_cleared(field: &mut Option<String>) -> bool {
    if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
        *field = None;
        return true;
    }
    false
}

async fn load_settings(state: &AppState, user: User) -> Result<SettingsDTO, AppError> {
    let (profile, wishlist) = futures::try_join!(
        state.profile.get_or_create(&user.user_id),
        state.profile.wishlist_ids(&user.user_id),
    )?;

    Ok(SettingsDTO {
        user: UserDTO::from(user),
        profile: ProfileDTO::from(profile),
        wishlist,
    })
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<SettingsDTO>, AppError> {
    debug!("Loading settings");
    Ok(Json(load_settings(&state, current_user).await?))
}

#[instrument(skip(state, ctx, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Extension(mut ctx): Extension<RequestContext>,
    Extension(current_user): Extension<User>,
    Json(mut body): Json<UpdateSettingsDTO>,
) -> Result<Json<Page<SettingsDTO>>, AppError> {
    debug!("Updating settings");
    // 1. Empty mobile number or location clear the field, so does a null budget;
    //    absent fields are kept
    // 2. Validate what is left
    // 3. A new email must not belong to another account
    // 4. Update the account, then the profile
    let clear_mobile = take_cleared(&mut body.mobile_number);
    let clear_location = take_cleared(&mut body.preferred_location);
    body.validate()?;

    if let Some(email) = body.email.as_deref() {
        let taken = state
            .user
            .find_by_email(email)
            .await?
            .is_some_and(|owner| owner.user_id != current_user.user_id);
        if taken {
            warn!("Email already used by another account");
            return Err(AppError::conflict("Email already registered"));
        }
    }

    let user = state
        .user
        .update(
            &current_user.user_id,
            &UpdateUserDTO {
                first_name: body.first_name.map(|v| v.trim().to_string()),
                last_name: body.last_name.map(|v| v.trim().to_string()),
                email: body.email,
            },
        )
        .await?;

    let current: Profile = state.profile.get_or_create(&user.user_id).await?;
    let update = UpdateProfileDTO {
        mobile_number: if clear_mobile {
            None
        } else {
            body.mobile_number.or(current.mobile_number)
        },
        preferred_location: if clear_location {
            None
        } else {
            body.preferred_location
                .map(|v| v.trim().to_string())
                .or(current.preferred_location)
        },
        budget: body.budget.unwrap_or(current.budget),
    };
    state.profile.update(&user.user_id, &update).await?;
    info!("Settings updated");

    ctx.flash(FlashLevel::Success, "Your settings have been updated.");
    Ok(Json(ctx.into_page(load_settings(&state, user).await?)))
}

#[instrument(skip(state, ctx, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(mut ctx): Extension<RequestContext>,
    Extension(current_user): Extension<User>,
    Json(body): Json<SetPasswordDTO>,
) -> Result<Json<Page<()>>, AppError> {
    body.validate()?;

    let password_hash = User::hash_password(&body.new_password1)?;
    state
        .user
        .update_password(&current_user.user_id, &password_hash)
        .await?;
    info!("Password changed");

    ctx.flash(FlashLevel::Success, "Your password has been changed.");
    Ok(Json(ctx.into_page(())))
}
