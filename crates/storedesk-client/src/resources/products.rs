//! Catalog endpoints, including bulk CSV and image ingestion

use crate::client::{ApiClient, expect_success, file_part, files_form, read_body, read_json};
use crate::error::{ClientError, ClientResult};
use bytes::Bytes;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use storedesk_core::forms::ProductPayload;
use storedesk_core::ingest::{
    CsvUploadOutcome, CsvUploadResponse, ImageUploadOutcome, ImageUploadResponse, StagedFile,
};
use storedesk_core::Product;
use storedesk_core::types::{MAX_PRODUCT_IMAGES, STOCK_AVAILABLE, STOCK_UNAVAILABLE};

#[derive(Deserialize)]
#[serde(untagged)]
enum ProductList {
    Wrapped { products: Vec<Product> },
    Bare(Vec<Product>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProductBody {
    Wrapped { product: Product },
    Bare(Product),
}

impl From<ProductBody> for Product {
    fn from(body: ProductBody) -> Self {
        match body {
            ProductBody::Wrapped { product } | ProductBody::Bare(product) => product,
        }
    }
}

impl ApiClient {
    /// Fetch the whole catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product list.
    pub async fn list_products(&self) -> ClientResult<Vec<Product>> {
        let response = self.send(self.request(Method::GET, "/api/products")).await?;
        Ok(match read_json::<ProductList>(response).await? {
            ProductList::Wrapped { products } | ProductList::Bare(products) => products,
        })
    }

    /// Fetch one product for editing
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the product does not exist.
    pub async fn get_product(&self, id: &str) -> ClientResult<Product> {
        let path = format!("/api/products/{}", urlencoding::encode(id));
        let response = self.send(self.request(Method::GET, &path)).await?;
        Ok(read_json::<ProductBody>(response).await?.into())
    }

    /// Create a product from a validated form and its new images
    ///
    /// # Errors
    ///
    /// Returns an error if an image cannot be read or the backend rejects the product.
    pub async fn create_product(
        &self,
        payload: &ProductPayload,
        images: &[StagedFile],
    ) -> ClientResult<Product> {
        let form = product_form(payload, images).await?;
        let response = self
            .send(self.request(Method::POST, "/api/products").multipart(form))
            .await?;
        let product: Product = read_json::<ProductBody>(response).await?.into();
        tracing::info!(product_id = %product.id, name = %payload.name, "product created");
        Ok(product)
    }

    /// Replace a product's fields, keeping the retained existing images and
    /// adding the new ones
    ///
    /// # Errors
    ///
    /// Returns an error if an image cannot be read or the backend rejects the update.
    pub async fn update_product(
        &self,
        id: &str,
        payload: &ProductPayload,
        images: &[StagedFile],
    ) -> ClientResult<Product> {
        let form = product_form(payload, images).await?;
        let path = format!("/api/products/{}", urlencoding::encode(id));
        let response = self
            .send(self.request(Method::PUT, &path).multipart(form))
            .await?;
        tracing::info!(product_id = %id, "product updated");
        Ok(read_json::<ProductBody>(response).await?.into())
    }

    /// Delete a product
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses.
    pub async fn delete_product(&self, id: &str) -> ClientResult<()> {
        let path = format!("/api/products/{}", urlencoding::encode(id));
        let response = self.send(self.request(Method::DELETE, &path)).await?;
        expect_success(response).await?;
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    /// Mark a product available (stock 10) or unavailable (stock 0)
    ///
    /// Returns the stock value written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses.
    pub async fn set_stock(&self, id: &str, available: bool) -> ClientResult<u32> {
        let stock = if available { STOCK_AVAILABLE } else { STOCK_UNAVAILABLE };
        let path = format!("/api/products/{}", urlencoding::encode(id));
        let response = self
            .send(
                self.request(Method::PUT, &path)
                    .json(&serde_json::json!({ "stock": stock })),
            )
            .await?;
        expect_success(response).await?;
        tracing::info!(product_id = %id, stock, "stock updated");
        Ok(stock)
    }

    /// Download the bulk-upload CSV template
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn download_csv_template(&self) -> ClientResult<Bytes> {
        let response = self
            .send(self.request(Method::GET, "/api/products/csv-template"))
            .await?;
        let (_, body) = read_body(response).await?;
        Ok(body)
    }

    /// Upload a CSV of products
    ///
    /// An HTTP error that still carries an upload report becomes an unsuccessful
    /// outcome so row errors can be shown.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the request never completes or
    /// the body is not an upload report.
    pub async fn bulk_upload_csv(&self, file: &StagedFile) -> ClientResult<CsvUploadOutcome> {
        let form = Form::new().part("csvFile", file_part(file).await?);
        let response = self
            .send(
                self.request(Method::POST, "/api/products/bulk-upload")
                    .multipart(form),
            )
            .await?;
        let ok = response.status().is_success();
        let body = response.bytes().await.map_err(ClientError::Transport)?;
        let report = decode_report::<CsvUploadResponse>(&body)?;

        let outcome = CsvUploadOutcome::from_response(ok, report);
        tracing::info!(
            success = outcome.success,
            created = outcome.created_count,
            row_errors = outcome.errors.len(),
            "CSV upload finished"
        );
        Ok(outcome)
    }

    /// Upload a batch of images to the image host
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or the request never completes.
    pub async fn bulk_upload_images(
        &self,
        files: &[StagedFile],
    ) -> ClientResult<ImageUploadOutcome> {
        let form = files_form("images", files).await?;
        let response = self
            .send(
                self.request(Method::POST, "/api/products/bulk-upload-images")
                    .multipart(form),
            )
            .await?;
        let ok = response.status().is_success();
        let body = response.bytes().await.map_err(ClientError::Transport)?;
        let report = decode_report::<ImageUploadResponse>(&body)?;

        let outcome = ImageUploadOutcome::from_response(ok, report);
        tracing::info!(
            success = outcome.success,
            uploaded = outcome.uploaded.len(),
            failed = outcome.errors.len(),
            "image upload finished"
        );
        Ok(outcome)
    }
}

/// Upload reports come back on both success and failure statuses
fn decode_report<T: serde::de::DeserializeOwned>(body: &[u8]) -> ClientResult<T> {
    serde_json::from_slice(body).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Multipart body for product create/update
async fn product_form(payload: &ProductPayload, images: &[StagedFile]) -> ClientResult<Form> {
    if payload.existing_images.len() + images.len() > MAX_PRODUCT_IMAGES {
        return Err(storedesk_core::Error::file_rejected(format!(
            "You can only have up to {MAX_PRODUCT_IMAGES} images total"
        ))
        .into());
    }

    let mut form = Form::new();
    for (name, value) in payload.text_fields() {
        form = form.text(name, value);
    }
    for image in images {
        form = form.part("images", file_part(image).await?);
    }
    for existing in &payload.existing_images {
        let json = serde_json::to_string(existing)
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;
        form = form.part("existingImages", Part::text(json));
    }
    Ok(form)
}
