use axum::{
    extract::{multipart::Field, Extension, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::{Error, Result},
    middleware::auth::AuthenticatedAccount,
    models::customers::{
        CustomerForm, CustomerPage, CustomerResponse, ExportCustomersQuery, ExportFormat,
        ListCustomersQuery,
    },
    services::{
        customers,
        export::customers_to_csv,
        uploads::{UploadedImage, PROFILE_PICTURE_FIELD},
    },
    state::AppState,
    validation::parse_resource_id,
};

const RESOURCE: &str = "Customer";

/// Customer fields plus the optional profile image of a multipart request
#[derive(Debug, Default)]
struct CustomerSubmission {
    form: CustomerForm,
    image: Option<UploadedImage>,
}

fn malformed_multipart(e: impl std::fmt::Display) -> Error {
    Error::validation("body", format!("Invalid multipart body: {}", e))
}

async fn read_text(field: Field<'_>) -> Result<String> {
    field.text().await.map_err(malformed_multipart)
}

/// Reads the multipart body. Unknown fields are ignored; a second
/// `profilePicture` is rejected.
async fn read_submission(mut multipart: Multipart) -> Result<CustomerSubmission> {
    let mut submission = CustomerSubmission::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        let form = &mut submission.form;

        match name.as_str() {
            "fullName" => form.full_name = Some(read_text(field).await?),
            "email" => form.email = Some(read_text(field).await?),
            "contactNumber" => form.contact_number = Some(read_text(field).await?),
            "dateOfBirth" => form.date_of_birth = Some(read_text(field).await?),
            "state" => form.state = Some(read_text(field).await?),
            "city" => form.city = Some(read_text(field).await?),
            PROFILE_PICTURE_FIELD => {
                if submission.image.is_some() {
                    return Err(Error::validation(
                        PROFILE_PICTURE_FIELD,
                        "Only one profile picture may be uploaded",
                    ));
                }
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(malformed_multipart)?;
                // An empty file part means no file was chosen
                if !bytes.is_empty() {
                    submission.image = Some(UploadedImage {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
            }
            other => tracing::debug!(field = other, "Ignoring unknown multipart field"),
        }
    }

    Ok(submission)
}

/// GET /api/customers
///
/// Paginated listing of active customers, newest first.
///
/// # Query Parameters
/// - `page`: Page number, default 1
/// - `limit`: Page size, default 10, at most 100
/// - `search`: Case-insensitive match on name, email or contact number
/// - `state`, `city`: Case-insensitive substring filters
pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<ListCustomersQuery>,
) -> Result<Json<CustomerPage>> {
    let page = customers::list_customers(state.store.as_ref(), &query).await?;
    Ok(Json(page))
}

/// GET /api/customers/export
///
/// Every matching active customer without pagination. `format=csv` returns a
/// downloadable CSV file instead of JSON.
pub async fn export_customers(
    State(state): State<AppState>,
    Query(query): Query<ExportCustomersQuery>,
) -> Result<Response> {
    let records = customers::export_customers(state.store.as_ref(), &query.filter()).await?;

    Ok(match query.format {
        ExportFormat::Json => Json(records).into_response(),
        ExportFormat::Csv => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"customers.csv\"",
                ),
            ],
            customers_to_csv(&records),
        )
            .into_response(),
    })
}

/// GET /api/customers/{id}
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CustomerResponse>> {
    let id = parse_resource_id(&id, RESOURCE)?;
    let customer = customers::get_customer(state.store.as_ref(), id).await?;
    Ok(Json(customer))
}

/// POST /api/customers
///
/// Multipart form with `fullName`, `email`, `contactNumber`, `dateOfBirth`,
/// `state`, `city` and an optional `profilePicture` (jpeg, png or gif, 5 MB max).
///
/// # HTTP Status Codes
/// - `201 CREATED`: Customer created
/// - `400 BAD_REQUEST`: Validation error, duplicate email or rejected image
/// - `401 UNAUTHORIZED`: Missing or invalid token
pub async fn create_customer(
    State(state): State<AppState>,
    Extension(account): Extension<AuthenticatedAccount>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CustomerResponse>)> {
    let submission = read_submission(multipart).await?;

    let customer = customers::create_customer(
        state.store.as_ref(),
        &state.uploads,
        &state.upload_cleanup,
        account.id,
        submission.form,
        submission.image,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

/// PUT /api/customers/{id}
///
/// Full replacement of the customer's fields. Without `profilePicture` the
/// current image is kept.
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<CustomerResponse>> {
    let id = parse_resource_id(&id, RESOURCE)?;
    let submission = read_submission(multipart).await?;

    let customer = customers::update_customer(
        state.store.as_ref(),
        &state.uploads,
        &state.upload_cleanup,
        id,
        submission.form,
        submission.image,
    )
    .await?;

    Ok(Json(customer))
}

/// DELETE /api/customers/{id}
///
/// Soft delete. The record stays in the store with `isActive = false`.
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id = parse_resource_id(&id, RESOURCE)?;
    customers::delete_customer(state.store.as_ref(), id).await?;

    Ok(Json(json!({
        "message": "Customer deleted successfully"
    })))
}
