use axum::{
    extract::DefaultBodyLimit,
    response::Redirect,
    routing::get,
    Router,
};

use crate::features::packages::handlers::{
    create_package, delete_package, edit_package_form, list_packages, new_package_form,
    show_package, update_package, PackageState,
};
use crate::features::packages::services::INDEX_ROUTE;

/// Create routes for the packages feature.
///
/// `max_body_size` caps the create and update form bodies.
pub fn routes(state: PackageState, max_body_size: usize) -> Router {
    let body_limit = DefaultBodyLimit::max(max_body_size);

    Router::new()
        .route("/", get(|| async { Redirect::to(INDEX_ROUTE) }))
        .route(
            "/packages",
            get(list_packages).post(create_package).layer(body_limit.clone()),
        )
        .route("/packages/create", get(new_package_form))
        .route(
            "/packages/{id}",
            get(show_package)
                .put(update_package)
                .patch(update_package)
                .delete(delete_package)
                .layer(body_limit),
        )
        .route("/packages/{id}/edit", get(edit_package_form))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue, StatusCode};
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use std::sync::Arc;

    use axum_extra::extract::cookie::Cookie;

    use crate::core::middleware::with_method_override;
    use crate::shared::flash::FlashMessage;
    use crate::shared::test_helpers::{package_fixture, TestHarness};
    use crate::shared::views::TemplateEngine;

    const BODY_LIMIT: usize = 11 * 1024 * 1024;

    fn server_with_limit(harness: &TestHarness, max_body_size: usize) -> TestServer {
        let views = Arc::new(TemplateEngine::builtin().unwrap());
        let state = PackageState::new(harness.service.clone(), views);
        TestServer::new(with_method_override(routes(state, max_body_size))).unwrap()
    }

    fn server(harness: &TestHarness) -> TestServer {
        server_with_limit(harness, BODY_LIMIT)
    }

    fn set_cookie(response: &axum_test::TestResponse) -> String {
        response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string())
            .unwrap_or_default()
    }

    fn flash_from(response: &axum_test::TestResponse) -> Option<FlashMessage> {
        let cookie = Cookie::parse_encoded(set_cookie(response)).ok()?;
        FlashMessage::from_cookie_value(cookie.value())
    }

    fn location(response: &axum_test::TestResponse) -> String {
        response.headers()[header::LOCATION]
            .to_str()
            .unwrap()
            .to_string()
    }

    fn package_form(name: &str) -> MultipartForm {
        MultipartForm::new()
            .add_text("_token", "ignored")
            .add_text("name", name)
            .add_text("category_id", "1")
            .add_text("parlor_id", "2")
    }

    #[tokio::test]
    async fn test_root_redirects_to_list() {
        let harness = TestHarness::new(vec![]);
        let response = server(&harness).get("/").await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/packages");
    }

    #[tokio::test]
    async fn test_list_renders_packages_and_consumes_flash() {
        let mut package = package_fixture(1);
        package.name = "Hair Spa".to_string();
        package.image = Some("uploads/spa.png".to_string());
        let harness = TestHarness::new(vec![package]);

        let response = server(&harness)
            .get("/packages")
            .add_header(
                header::COOKIE,
                HeaderValue::from_static("flash=success:Package%20saved%20successfully."),
            )
            .await;

        response.assert_status_ok();
        let html = response.text();
        assert!(html.contains("Hair Spa"));
        assert!(html.contains("spa.png"));
        assert!(html.contains("Package saved successfully."));
        assert!(set_cookie(&response).contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_list_accepts_empty_filter_values() {
        let mut spa = package_fixture(1);
        spa.name = "Hair Spa".to_string();
        let mut facial = package_fixture(2);
        facial.name = "Facial".to_string();
        let harness = TestHarness::new(vec![spa, facial]);

        let response = server(&harness)
            .get("/packages?search=spa&is_popular=&category_id=&order_by=name&sorted_by=desc")
            .await;

        response.assert_status_ok();
        let html = response.text();
        assert!(html.contains("Hair Spa"));
        assert!(!html.contains("Facial"));
        assert!(set_cookie(&response).is_empty());

        let response = server(&harness)
            .get("/packages?search=&parlor_id=&order_by=&sorted_by=")
            .await;

        response.assert_status_ok();
        let html = response.text();
        assert!(html.contains("Hair Spa"));
        assert!(html.contains("Facial"));
    }

    #[tokio::test]
    async fn test_create_form_lists_reference_data() {
        let harness = TestHarness::new(vec![]);
        let response = server(&harness).get("/packages/create").await;

        response.assert_status_ok();
        assert!(response.text().contains("name=\"category_id\""));
    }

    #[tokio::test]
    async fn test_create_from_multipart_redirects_with_flash() {
        let harness = TestHarness::new(vec![]);
        let form = package_form("Facial").add_text("is_popular", "1").add_part(
            "image",
            Part::bytes(vec![1, 2, 3])
                .file_name("facial.png")
                .mime_type("image/png"),
        );

        let response = server(&harness).post("/packages").multipart(form).await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/packages");
        assert_eq!(
            flash_from(&response),
            Some(FlashMessage::success("Package saved successfully."))
        );

        let created = harness.packages.get(1).unwrap();
        assert_eq!(created.name, "Facial");
        assert_eq!(created.parlor_id, 2);
        assert!(created.is_popular);
        assert_eq!(created.image, harness.storage.stored_paths().first().cloned());
    }

    #[tokio::test]
    async fn test_create_with_empty_file_part_stores_nothing() {
        let harness = TestHarness::new(vec![]);
        let form = package_form("Facial").add_part(
            "image",
            Part::bytes(Vec::<u8>::new())
                .file_name("")
                .mime_type("application/octet-stream"),
        );

        let response = server(&harness).post("/packages").multipart(form).await;

        response.assert_status(StatusCode::SEE_OTHER);
        let created = harness.packages.get(1).unwrap();
        assert_eq!(created.image, None);
        assert!(!created.is_popular);
        assert!(harness.storage.stored_paths().is_empty());
    }

    #[tokio::test]
    async fn test_create_with_invalid_form_is_rejected() {
        let harness = TestHarness::new(vec![]);
        let form = MultipartForm::new().add_text("category_id", "1");

        let response = server(&harness).post("/packages").multipart(form).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(harness.packages.mutations(), 0);
    }

    #[tokio::test]
    async fn test_body_over_configured_limit_is_rejected() {
        let harness = TestHarness::new(vec![]);
        let form = package_form("Facial").add_part(
            "image",
            Part::bytes(vec![0; 4096])
                .file_name("facial.png")
                .mime_type("image/png"),
        );

        let response = server_with_limit(&harness, 1024)
            .post("/packages")
            .multipart(form)
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(harness.packages.mutations(), 0);
        assert!(harness.storage.stored_paths().is_empty());
    }

    #[tokio::test]
    async fn test_show_and_edit_existing_package() {
        let mut package = package_fixture(7);
        package.name = "Bridal Makeup".to_string();
        let harness = TestHarness::new(vec![package]);
        let server = server(&harness);

        let response = server.get("/packages/7").await;
        response.assert_status_ok();
        assert!(response.text().contains("Bridal Makeup"));

        let response = server.get("/packages/7/edit").await;
        response.assert_status_ok();
        assert!(response.text().contains("/packages/7?_method=PATCH"));
    }

    #[tokio::test]
    async fn test_show_missing_package_redirects_with_error() {
        let harness = TestHarness::new(vec![]);
        let response = server(&harness).get("/packages/999").await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/packages");
        assert_eq!(
            flash_from(&response),
            Some(FlashMessage::error("Package not found"))
        );
    }

    #[tokio::test]
    async fn test_edit_missing_package_redirects_with_error() {
        let harness = TestHarness::new(vec![package_fixture(1)]);
        let response = server(&harness).get("/packages/999/edit").await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/packages");
        assert_eq!(
            flash_from(&response),
            Some(FlashMessage::error("Package not found"))
        );
    }

    #[tokio::test]
    async fn test_update_via_method_override_keeps_image() {
        let mut package = package_fixture(5);
        package.image = Some("old.jpg".to_string());
        let harness = TestHarness::new(vec![package]);

        let response = server(&harness)
            .post("/packages/5?_method=PATCH")
            .multipart(package_form("X"))
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(
            flash_from(&response),
            Some(FlashMessage::success("Package updated successfully."))
        );
        let updated = harness.packages.get(5).unwrap();
        assert_eq!(updated.name, "X");
        assert_eq!(updated.image, Some("old.jpg".to_string()));
    }

    #[tokio::test]
    async fn test_delete_via_method_override() {
        let harness = TestHarness::new(vec![package_fixture(3)]);

        let response = server(&harness).post("/packages/3?_method=DELETE").await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(
            flash_from(&response),
            Some(FlashMessage::success("Package deleted successfully."))
        );
        assert!(harness.packages.get(3).is_none());
    }

    #[tokio::test]
    async fn test_delete_via_percent_encoded_method_override() {
        let harness = TestHarness::new(vec![package_fixture(3)]);

        let response = server(&harness).post("/packages/3?_method=%44ELETE").await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert!(harness.packages.get(3).is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_package_does_nothing() {
        let harness = TestHarness::new(vec![package_fixture(1)]);

        let response = server(&harness).delete("/packages/999").await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/packages");
        assert_eq!(
            flash_from(&response),
            Some(FlashMessage::error("Package not found"))
        );
        assert_eq!(harness.packages.mutations(), 0);
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_bad_request() {
        let harness = TestHarness::new(vec![]);
        let response = server(&harness).get("/packages/abc").await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
