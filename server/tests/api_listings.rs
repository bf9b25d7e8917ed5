//! Integration tests for the listing endpoints
//!
//! - GET / (home and recommendations)
//! - GET /properties, GET /properties/{id}
//! - POST /properties/{id}/messages, POST /properties/{id}/favorite
//! - /dashboard seller routes

mod common;

#[cfg(test)]
mod listing_tests {
    use super::common::*;
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use estate_server::AppState;
    use estate_server::dtos::UpdateProfileDTO;
    use estate_server::entities::{AccountRole, PropertyType, User};
    use estate_server::repositories::Update;
    use estate_server::services::recommendation::{MISSING_CRITERIA_NOTICE, NO_MATCH_NOTICE};
    use serde_json::{Value, json};

    async fn set_preferences(state: &AppState, user: &User, budget: Option<i64>, location: Option<&str>) {
        state
            .profile
            .update(
                &user.user_id,
                &UpdateProfileDTO {
                    mobile_number: None,
                    preferred_location: location.map(str::to_string),
                    budget,
                },
            )
            .await
            .unwrap();
    }

    fn ids(list: &Value) -> Vec<i64> {
        let mut ids: Vec<i64> = list
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_i64().unwrap())
            .collect();
        ids.sort();
        ids
    }

    // ============================================================
    // Seller dashboard
    // ============================================================

    #[tokio::test]
    async fn test_seller_adds_and_lists_property() {
        let media = tempfile::tempdir().unwrap();
        let state = create_test_state(media.path()).await;
        let server = create_test_server(state.clone());
        let seller = seed_user(&state, "seller@example.com", AccountRole::Seller).await;

        let mut form = json!(property_form(PropertyType::House, 2_500_000, "Baner, Pune"));
        form["images"] = json!(["properties/2025/01/01/kitchen.jpg", "properties/2025/01/01/garden.jpg"]);

        let response = server
            .post("/dashboard/properties")
            .add_header(auth_header(), bearer(&seller))
            .json(&form)
            .await;

        response.assert_status(StatusCode::CREATED);
        let page: Value = response.json();
        assert_eq!(page["data"]["seller_id"], seller.user_id);
        assert_eq!(page["data"]["is_published"], true);
        assert_eq!(page["messages"][0]["level"], "success");
        let id = page["data"]["id"].as_i64().unwrap();

        let dashboard: Value = server
            .get("/dashboard")
            .add_header(auth_header(), bearer(&seller))
            .await
            .json();
        assert_eq!(ids(&dashboard), vec![id]);

        // the detail page is public and carries the gallery
        let response = server.get(&format!("/properties/{id}")).await;
        response.assert_status_ok();
        let detail: Value = response.json();
        assert_eq!(detail["property"]["location"], "Baner, Pune");
        assert_eq!(detail["additional_images"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_dashboard_requires_a_seller() {
        let media = tempfile::tempdir().unwrap();
        let state = create_test_state(media.path()).await;
        let server = create_test_server(state.clone());
        let buyer = seed_user(&state, "buyer@example.com", AccountRole::Buyer).await;
        let form = json!(property_form(PropertyType::Land, 400_000, "Goa"));

        server
            .post("/dashboard/properties")
            .add_header(auth_header(), bearer(&buyer))
            .json(&form)
            .await
            .assert_status_forbidden();
        server
            .get("/dashboard")
            .add_header(auth_header(), bearer(&buyer))
            .await
            .assert_status_forbidden();
        server
            .post("/dashboard/properties")
            .json(&form)
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_add_property_rejects_invalid_form() {
        let media = tempfile::tempdir().unwrap();
        let state = create_test_state(media.path()).await;
        let server = create_test_server(state.clone());
        let seller = seed_user(&state, "seller@example.com", AccountRole::Seller).await;

        let mut form = json!(property_form(PropertyType::House, 100, "Pune"));
        form["price"] = json!(-5);
        server
            .post("/dashboard/properties")
            .add_header(auth_header(), bearer(&seller))
            .json(&form)
            .await
            .assert_status_bad_request();

        let mut form = json!(property_form(PropertyType::House, 100, "Pune"));
        form["title"] = json!("   ");
        server
            .post("/dashboard/properties")
            .add_header(auth_header(), bearer(&seller))
            .json(&form)
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_edit_only_own_property() {
        let media = tempfile::tempdir().unwrap();
        let state = create_test_state(media.path()).await;
        let server = create_test_server(state.clone());
        let owner = seed_user(&state, "owner@example.com", AccountRole::Seller).await;
        let rival = seed_user(&state, "rival@example.com", AccountRole::Seller).await;
        let property = seed_property(&state, owner.user_id, PropertyType::House, 900_000, "Pune").await;
        let path = format!("/dashboard/properties/{}", property.property_id);
        let form = json!(property_form(PropertyType::House, 950_000, "Pune"));

        server
            .put(&path)
            .add_header(auth_header(), bearer(&rival))
            .json(&form)
            .await
            .assert_status_not_found();

        let response = server
            .put(&path)
            .add_header(auth_header(), bearer(&owner))
            .json(&form)
            .await;
        response.assert_status_ok();
        let page: Value = response.json();
        assert_eq!(page["data"]["price"], 950_000);
    }

    #[tokio::test]
    async fn test_delete_reports_outcome_through_flash() {
        let media = tempfile::tempdir().unwrap();
        let state = create_test_state(media.path()).await;
        let server = create_test_server(state.clone());
        let owner = seed_user(&state, "owner@example.com", AccountRole::Seller).await;
        let rival = seed_user(&state, "rival@example.com", AccountRole::Seller).await;
        let property = seed_property(&state, owner.user_id, PropertyType::Land, 300_000, "Goa").await;
        let path = format!("/dashboard/properties/{}", property.property_id);

        let response = server.delete(&path).add_header(auth_header(), bearer(&rival)).await;
        response.assert_status_ok();
        let page: Value = response.json();
        assert_eq!(page["data"]["deleted"], false);
        assert_eq!(page["messages"][0]["level"], "error");

        let response = server.delete(&path).add_header(auth_header(), bearer(&owner)).await;
        response.assert_status_ok();
        let page: Value = response.json();
        assert_eq!(page["data"]["deleted"], true);
        assert_eq!(page["messages"][0]["level"], "success");

        server
            .get(&format!("/properties/{}", property.property_id))
            .await
            .assert_status_not_found();

        // deleting again is reported, not raised
        let response = server.delete(&path).add_header(auth_header(), bearer(&owner)).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["deleted"], false);
    }

    #[tokio::test]
    async fn test_upload_image_stores_file() {
        let media = tempfile::tempdir().unwrap();
        let state = create_test_state(media.path()).await;
        let server = create_test_server(state.clone());
        let seller = seed_user(&state, "seller@example.com", AccountRole::Seller).await;

        let form = MultipartForm::new().add_part(
            "image",
            Part::bytes(vec![0xFF, 0xD8, 0xFF, 0xE0])
                .file_name("front.JPG")
                .mime_type("image/jpeg"),
        );
        let response = server
            .post("/dashboard/images")
            .add_header(auth_header(), bearer(&seller))
            .multipart(form)
            .await;

        response.assert_status(StatusCode::CREATED);
        let image_ref = response.json::<Value>()["image_ref"].as_str().unwrap().to_string();
        assert!(image_ref.starts_with("properties/"));
        assert!(image_ref.ends_with(".jpg"));
        assert!(media.path().join(&image_ref).exists());

        let form = MultipartForm::new().add_part(
            "image",
            Part::bytes(b"#!/bin/sh".to_vec()).file_name("script.sh"),
        );
        server
            .post("/dashboard/images")
            .add_header(auth_header(), bearer(&seller))
            .multipart(form)
            .await
            .assert_status_bad_request();
    }

    // ============================================================
    // Catalogue
    // ============================================================

    #[tokio::test]
    async fn test_property_list_filter_and_featured() {
        let media = tempfile::tempdir().unwrap();
        let state = create_test_state(media.path()).await;
        let server = create_test_server(state.clone());
        let seller = seed_user(&state, "seller@example.com", AccountRole::Seller).await;
        let buyer = seed_user(&state, "buyer@example.com", AccountRole::Buyer).await;

        let h1 = seed_property(&state, seller.user_id, PropertyType::House, 100, "Pune").await;
        let h2 = seed_property(&state, seller.user_id, PropertyType::House, 300, "Pune").await;
        let h3 = seed_property(&state, seller.user_id, PropertyType::House, 200, "Pune").await;
        let l1 = seed_property(&state, seller.user_id, PropertyType::Land, 250, "Goa").await;

        let all: Value = server
            .get("/properties")
            .add_header(auth_header(), bearer(&buyer))
            .await
            .json();
        assert_eq!(
            ids(&all["properties"]),
            vec![h1.property_id, h2.property_id, h3.property_id, l1.property_id]
        );
        assert!(all["active_filter"].is_null());
        // top two houses and the only land plot, most expensive first
        let featured: Vec<i64> = all["featured_properties"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_i64().unwrap())
            .collect();
        assert_eq!(featured, vec![h2.property_id, l1.property_id, h3.property_id]);

        let land: Value = server
            .get("/properties")
            .add_query_param("type", "Land")
            .add_header(auth_header(), bearer(&buyer))
            .await
            .json();
        assert_eq!(ids(&land["properties"]), vec![l1.property_id]);
        assert_eq!(land["active_filter"], "Land");

        let unknown: Value = server
            .get("/properties")
            .add_query_param("type", "Castle")
            .add_header(auth_header(), bearer(&buyer))
            .await
            .json();
        assert_eq!(unknown["properties"].as_array().unwrap().len(), 4);
        assert!(unknown["active_filter"].is_null());

        server.get("/properties").await.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_inquiry_goes_to_the_seller() {
        let media = tempfile::tempdir().unwrap();
        let state = create_test_state(media.path()).await;
        let server = create_test_server(state.clone());
        let seller = seed_user(&state, "seller@example.com", AccountRole::Seller).await;
        let buyer = seed_user(&state, "buyer@example.com", AccountRole::Buyer).await;
        let property = seed_property(&state, seller.user_id, PropertyType::House, 700_000, "Pune").await;
        let path = format!("/properties/{}/messages", property.property_id);

        let response = server
            .post(&path)
            .add_header(auth_header(), bearer(&buyer))
            .json(&json!({ "body": "Is the price negotiable?" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let page: Value = response.json();
        assert_eq!(page["data"]["recipient_id"], seller.user_id);
        assert_eq!(page["data"]["property_id"], property.property_id);
        assert_eq!(page["messages"][0]["text"], "Your message has been sent to the seller.");

        // a seller cannot inquire about their own listing
        let response = server
            .post(&path)
            .add_header(auth_header(), bearer(&seller))
            .json(&json!({ "body": "Hello me" }))
            .await;
        response.assert_status_bad_request();

        server
            .post(&path)
            .add_header(auth_header(), bearer(&buyer))
            .json(&json!({ "body": "" }))
            .await
            .assert_status_bad_request();

        server
            .post(&path)
            .json(&json!({ "body": "anonymous" }))
            .await
            .assert_status_unauthorized();

        assert_eq!(state.msg.find_many_involving(&seller.user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_favorite_toggles() {
        let media = tempfile::tempdir().unwrap();
        let state = create_test_state(media.path()).await;
        let server = create_test_server(state.clone());
        let seller = seed_user(&state, "seller@example.com", AccountRole::Seller).await;
        let buyer = seed_user(&state, "buyer@example.com", AccountRole::Buyer).await;
        let property = seed_property(&state, seller.user_id, PropertyType::Land, 500_000, "Goa").await;
        let path = format!("/properties/{}/favorite", property.property_id);

        let first: Value = server.post(&path).add_header(auth_header(), bearer(&buyer)).await.json();
        assert_eq!(first["favorited"], true);
        let second: Value = server.post(&path).add_header(auth_header(), bearer(&buyer)).await.json();
        assert_eq!(second["favorited"], false);

        server
            .post("/properties/4242/favorite")
            .add_header(auth_header(), bearer(&buyer))
            .await
            .assert_status_not_found();
    }

    // ============================================================
    // Home page and recommendations
    // ============================================================

    async fn seed_catalogue(state: &AppState, seller: &User) -> (i64, Vec<i64>) {
        let showcase = seed_property(state, seller.user_id, PropertyType::House, 5_000_000, "Mumbai").await;
        let in_budget = vec![
            seed_property(state, seller.user_id, PropertyType::House, 1_000_000, "Pune").await.property_id,
            seed_property(state, seller.user_id, PropertyType::House, 800_000, "Nagpur").await.property_id,
            seed_property(state, seller.user_id, PropertyType::Land, 1_200_000, "Pune").await.property_id,
        ];
        seed_property(state, seller.user_id, PropertyType::Land, 2_000_000, "Goa").await;
        seed_property(state, seller.user_id, PropertyType::House, 799_999, "Pune").await;
        (showcase.property_id, in_budget)
    }

    #[tokio::test]
    async fn test_home_for_anonymous_visitor() {
        let media = tempfile::tempdir().unwrap();
        let state = create_test_state(media.path()).await;
        let server = create_test_server(state.clone());
        let seller = seed_user(&state, "seller@example.com", AccountRole::Seller).await;
        let (showcase, _) = seed_catalogue(&state, &seller).await;

        let response = server.get("/").await;

        response.assert_status_ok();
        let page: Value = response.json();
        assert_eq!(page["data"]["showcase_property"]["id"], showcase);
        assert_eq!(page["data"]["featured_houses"].as_array().unwrap().len(), 4);
        assert_eq!(page["data"]["featured_land"].as_array().unwrap().len(), 2);
        assert!(page["data"]["recommended_properties"].as_array().unwrap().is_empty());
        assert!(page["messages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_home_treats_unusable_token_as_anonymous() {
        let media = tempfile::tempdir().unwrap();
        let state = create_test_state(media.path()).await;
        let server = create_test_server(state.clone());
        let seller = seed_user(&state, "seller@example.com", AccountRole::Seller).await;
        let (showcase, _) = seed_catalogue(&state, &seller).await;

        let response = server
            .get("/")
            .add_header(auth_header(), "Bearer not-a-jwt")
            .await;

        response.assert_status_ok();
        let page: Value = response.json();
        assert_eq!(page["data"]["showcase_property"]["id"], showcase);
        assert!(page["data"]["recommended_properties"].as_array().unwrap().is_empty());
        assert!(page["messages"].as_array().unwrap().is_empty());

        // protected routes still reject it
        server
            .get("/inbox")
            .add_header(auth_header(), "Bearer not-a-jwt")
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_home_recommends_within_budget() {
        let media = tempfile::tempdir().unwrap();
        let state = create_test_state(media.path()).await;
        let server = create_test_server(state.clone());
        let seller = seed_user(&state, "seller@example.com", AccountRole::Seller).await;
        let buyer = seed_user(&state, "buyer@example.com", AccountRole::Buyer).await;
        let (_, mut in_budget) = seed_catalogue(&state, &seller).await;
        set_preferences(&state, &buyer, Some(1_000_000), None).await;

        let page: Value = server.get("/").add_header(auth_header(), bearer(&buyer)).await.json();

        in_budget.sort();
        assert_eq!(ids(&page["data"]["recommended_properties"]), in_budget);
        assert!(page["messages"].as_array().unwrap().is_empty());

        // location narrows the budget match
        set_preferences(&state, &buyer, Some(1_000_000), Some("PUNE")).await;
        let page: Value = server.get("/").add_header(auth_header(), bearer(&buyer)).await.json();
        let recommended = page["data"]["recommended_properties"].as_array().unwrap();
        assert_eq!(recommended.len(), 2);
        assert!(recommended.iter().all(|p| p["location"] == "Pune"));
    }

    #[tokio::test]
    async fn test_home_never_recommends_the_showcase() {
        let media = tempfile::tempdir().unwrap();
        let state = create_test_state(media.path()).await;
        let server = create_test_server(state.clone());
        let seller = seed_user(&state, "seller@example.com", AccountRole::Seller).await;
        let buyer = seed_user(&state, "buyer@example.com", AccountRole::Buyer).await;
        seed_catalogue(&state, &seller).await;
        // only the showcase is in Mumbai
        set_preferences(&state, &buyer, None, Some("mumbai")).await;

        let page: Value = server.get("/").add_header(auth_header(), bearer(&buyer)).await.json();

        assert!(page["data"]["recommended_properties"].as_array().unwrap().is_empty());
        assert_eq!(page["messages"][0]["level"], "warning");
        assert_eq!(page["messages"][0]["text"], NO_MATCH_NOTICE);
    }

    #[tokio::test]
    async fn test_home_signals_when_nothing_matches() {
        let media = tempfile::tempdir().unwrap();
        let state = create_test_state(media.path()).await;
        let server = create_test_server(state.clone());
        let seller = seed_user(&state, "seller@example.com", AccountRole::Seller).await;
        let buyer = seed_user(&state, "buyer@example.com", AccountRole::Buyer).await;
        seed_catalogue(&state, &seller).await;
        set_preferences(&state, &buyer, Some(500_000), None).await;

        let page: Value = server.get("/").add_header(auth_header(), bearer(&buyer)).await.json();

        assert!(page["data"]["recommended_properties"].as_array().unwrap().is_empty());
        assert_eq!(page["messages"][0]["text"], NO_MATCH_NOTICE);

        // no criteria at all is not a match-everything
        set_preferences(&state, &buyer, None, None).await;
        let page: Value = server.get("/").add_header(auth_header(), bearer(&buyer)).await.json();
        assert!(page["data"]["recommended_properties"].as_array().unwrap().is_empty());
        assert_eq!(page["messages"][0]["level"], "info");
    }

    #[tokio::test]
    async fn test_home_without_profile_row_signals_missing_criteria() {
        let media = tempfile::tempdir().unwrap();
        let (state, pool) = create_test_state_with_pool(media.path()).await;
        let server = create_test_server(state.clone());
        let seller = seed_user(&state, "seller@example.com", AccountRole::Seller).await;
        let buyer = seed_user(&state, "buyer@example.com", AccountRole::Buyer).await;
        seed_catalogue(&state, &seller).await;

        sqlx::query("DELETE FROM profiles WHERE user_id = ?")
            .bind(buyer.user_id)
            .execute(&pool)
            .await
            .unwrap();

        let response = server.get("/").add_header(auth_header(), bearer(&buyer)).await;

        response.assert_status_ok();
        let page: Value = response.json();
        assert!(page["data"]["recommended_properties"].as_array().unwrap().is_empty());
        assert_eq!(page["messages"][0]["level"], "info");
        assert_eq!(page["messages"][0]["text"], MISSING_CRITERIA_NOTICE);
    }
}
