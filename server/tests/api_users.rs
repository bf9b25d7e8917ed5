//! Integration tests for the settings endpoints
//!
//! - GET /users/me
//! - PUT /users/me
//! - PUT /users/me/password

mod common;

#[cfg(test)]
mod user_tests {
    use super::common::*;
    use estate_server::entities::{AccountRole, PropertyType};
    use serde_json::{Value, json};

    #[tokio::test]
    async fn test_get_settings_creates_profile_on_demand() {
        let media = tempfile::tempdir().unwrap();
        let state = create_test_state(media.path()).await;
        let server = create_test_server(state.clone());
        let seller = seed_user(&state, "seller@example.com", AccountRole::Seller).await;
        let buyer = seed_user(&state, "buyer@example.com", AccountRole::Buyer).await;
        let property = seed_property(&state, seller.user_id, PropertyType::House, 10, "Pune").await;
        state
            .profile
            .toggle_wishlist(&buyer.user_id, &property.property_id)
            .await
            .unwrap();

        let response = server.get("/users/me").add_header(auth_header(), bearer(&buyer)).await;

        response.assert_status_ok();
        let settings: Value = response.json();
        assert_eq!(settings["user"]["email"], "buyer@example.com");
        assert!(settings["profile"]["budget"].is_null());
        assert_eq!(settings["wishlist"], json!([property.property_id]));

        server.get("/users/me").await.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_update_settings_partial_and_clearing() {
        let media = tempfile::tempdir().unwrap();
        let state = create_test_state(media.path()).await;
        let server = create_test_server(state.clone());
        let buyer = seed_user(&state, "buyer@example.com", AccountRole::Buyer).await;

        let response = server
            .put("/users/me")
            .add_header(auth_header(), bearer(&buyer))
            .json(&json!({
                "first_name": "Lata",
                "preferred_location": "  Kothrud  ",
                "mobile_number": "+919800000001",
                "budget": 1_000_000
            }))
            .await;
        response.assert_status_ok();
        let page: Value = response.json();
        assert_eq!(page["data"]["user"]["first_name"], "Lata");
        assert_eq!(page["data"]["user"]["last_name"], "Tester");
        assert_eq!(page["data"]["profile"]["preferred_location"], "Kothrud");
        assert_eq!(page["data"]["profile"]["budget"], 1_000_000);
        assert_eq!(page["messages"][0]["level"], "success");

        // absent fields are kept, empty strings clear
        let page: Value = server
            .put("/users/me")
            .add_header(auth_header(), bearer(&buyer))
            .json(&json!({ "preferred_location": "" }))
            .await
            .json();
        assert!(page["data"]["profile"]["preferred_location"].is_null());
        assert_eq!(page["data"]["profile"]["mobile_number"], "+919800000001");
        assert_eq!(page["data"]["profile"]["budget"], 1_000_000);

        // a null budget clears it
        let page: Value = server
            .put("/users/me")
            .add_header(auth_header(), bearer(&buyer))
            .json(&json!({ "budget": null }))
            .await
            .json();
        assert!(page["data"]["profile"]["budget"].is_null());
        assert_eq!(page["data"]["profile"]["mobile_number"], "+919800000001");
    }

    #[tokio::test]
    async fn test_update_settings_rejects_bad_values() {
        let media = tempfile::tempdir().unwrap();
        let state = create_test_state(media.path()).await;
        let server = create_test_server(state.clone());
        let buyer = seed_user(&state, "buyer@example.com", AccountRole::Buyer).await;
        seed_user(&state, "other@example.com", AccountRole::Buyer).await;

        server
            .put("/users/me")
            .add_header(auth_header(), bearer(&buyer))
            .json(&json!({ "budget": -1 }))
            .await
            .assert_status_bad_request();

        server
            .put("/users/me")
            .add_header(auth_header(), bearer(&buyer))
            .json(&json!({ "email": "OTHER@example.com" }))
            .await
            .assert_status_conflict();

        // keeping one's own email is fine
        server
            .put("/users/me")
            .add_header(auth_header(), bearer(&buyer))
            .json(&json!({ "email": "buyer@example.com" }))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_change_password() {
        let media = tempfile::tempdir().unwrap();
        let state = create_test_state(media.path()).await;
        let server = create_test_server(state.clone());
        let buyer = seed_user(&state, "buyer@example.com", AccountRole::Buyer).await;

        server
            .put("/users/me/password")
            .add_header(auth_header(), bearer(&buyer))
            .json(&json!({ "new_password1": "Another123", "new_password2": "Another124" }))
            .await
            .assert_status_bad_request();

        server
            .put("/users/me/password")
            .add_header(auth_header(), bearer(&buyer))
            .json(&json!({ "new_password1": "Another123", "new_password2": "Another123" }))
            .await
            .assert_status_ok();

        server
            .post("/auth/login")
            .json(&json!({ "email": "buyer@example.com", "password": "Another123" }))
            .await
            .assert_status_ok();
    }
}
