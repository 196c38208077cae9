use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::core::error::AppError;
use crate::core::extractor::{AppPath, AppQuery};
use crate::features::packages::dtos::{ListPackagesQuery, PackageForm, PackageView};
use crate::features::packages::models::PackageFilter;
use crate::features::packages::services::{Outcome, PackageService};
use crate::shared::flash::IncomingFlash;
use crate::shared::views::ViewRenderer;

/// Shared state for the package handlers
#[derive(Clone)]
pub struct PackageState {
    pub service: Arc<PackageService>,
    pub views: Arc<dyn ViewRenderer>,
}

impl PackageState {
    pub fn new(service: Arc<PackageService>, views: Arc<dyn ViewRenderer>) -> Self {
        Self { service, views }
    }

    /// Render a page, consuming the pending flash message
    fn render(&self, view: PackageView, flash: IncomingFlash) -> Result<Response, AppError> {
        let template = view.template();
        let ctx = view.into_context(self.service.storage(), flash.message());
        let html = self.views.render(template, ctx)?;
        Ok(flash.into_page(html))
    }

    fn respond(&self, outcome: Outcome, flash: IncomingFlash) -> Result<Response, AppError> {
        match outcome {
            Outcome::View(view) => self.render(view, flash),
            Outcome::Redirect(redirect) => Ok(redirect.into_response()),
        }
    }
}

/// List packages
///
/// Query params narrow and order the list, see [`ListPackagesQuery`].
pub async fn list_packages(
    State(state): State<PackageState>,
    flash: IncomingFlash,
    AppQuery(query): AppQuery<ListPackagesQuery>,
) -> Result<Response, AppError> {
    let filter = PackageFilter::from(query);
    let view = state.service.list(&filter).await?;
    state.render(view, flash)
}

/// Create form
pub async fn new_package_form(
    State(state): State<PackageState>,
    flash: IncomingFlash,
) -> Result<Response, AppError> {
    let view = state.service.new_form().await?;
    state.render(view, flash)
}

/// Create a package from a multipart form
pub async fn create_package(
    State(state): State<PackageState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let input = PackageForm::from_multipart(multipart).await?.into_input()?;
    let redirect = state.service.create(input).await?;
    Ok(redirect.into_response())
}

pub async fn show_package(
    State(state): State<PackageState>,
    flash: IncomingFlash,
    AppPath(id): AppPath<i64>,
) -> Result<Response, AppError> {
    let outcome = state.service.show(id).await?;
    state.respond(outcome, flash)
}

pub async fn edit_package_form(
    State(state): State<PackageState>,
    flash: IncomingFlash,
    AppPath(id): AppPath<i64>,
) -> Result<Response, AppError> {
    let outcome = state.service.edit_form(id).await?;
    state.respond(outcome, flash)
}

/// Update a package. Leaving the image input empty keeps the current image.
pub async fn update_package(
    State(state): State<PackageState>,
    AppPath(id): AppPath<i64>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let input = PackageForm::from_multipart(multipart).await?.into_input()?;
    let redirect = state.service.update(id, input).await?;
    Ok(redirect.into_response())
}

pub async fn delete_package(
    State(state): State<PackageState>,
    AppPath(id): AppPath<i64>,
) -> Result<Response, AppError> {
    let redirect = state.service.delete(id).await?;
    Ok(redirect.into_response())
}
