//! Product list and product editor

use crate::context::{Context, Outcome};
use storedesk_core::forms::ProductForm;
use storedesk_core::ingest::StagedFile;
use storedesk_core::listing::{self, ProductSortKey};
use storedesk_core::{ListQuery, Page, Product, selectors};

/// Product list with client-side search, category filter, sort and paging
#[derive(Debug)]
pub struct ProductsView {
    ctx: Context,
    products: Vec<Product>,
    /// Current search/filter/sort/page
    pub query: ListQuery<ProductSortKey>,
}

impl ProductsView {
    /// Empty view; call [`Self::load`] to fetch
    #[must_use]
    pub fn new(ctx: Context) -> Self {
        let query = ListQuery::new(ctx.settings.page_size);
        Self {
            ctx,
            products: Vec::new(),
            query,
        }
    }

    /// Fetch every product; a failure keeps the current list
    pub async fn load(&mut self) -> bool {
        match self.ctx.client.list_products().await {
            Ok(products) => {
                tracing::debug!(count = products.len(), "products loaded");
                self.products = products;
                true
            }
            Err(e) => {
                self.ctx.fetch_failed(&e, "Failed to fetch products");
                false
            }
        }
    }

    /// Every loaded product
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// The page the current query selects
    #[must_use]
    pub fn page(&self) -> Page<Product> {
        listing::query(&self.products, &self.query)
    }

    /// Categories for the filter, first-seen order
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        selectors::categories(&self.products)
    }

    /// Delete after confirmation; on success the product is dropped locally
    pub async fn delete(&mut self, id: &str) -> Outcome {
        let name = self
            .products
            .iter()
            .find(|p| p.id == id)
            .map_or(id, |p| p.name.as_str());
        let prompt = format!("Are you sure you want to delete \"{name}\"? This action cannot be undone.");
        if !self.ctx.confirm(&prompt) {
            return Outcome::Declined;
        }

        match self.ctx.client.delete_product(id).await {
            Ok(()) => {
                self.products.retain(|p| p.id != id);
                self.ctx.applied("Product deleted successfully!")
            }
            Err(e) => self.ctx.failed(&e, "Failed to delete product"),
        }
    }

    /// Mark a product available (stock 10) or unavailable (stock 0)
    ///
    /// The local copy takes the new stock without a refetch.
    pub async fn set_availability(&mut self, id: &str, available: bool) -> Outcome {
        match self.ctx.client.set_stock(id, available).await {
            Ok(stock) => {
                if let Some(product) = self.products.iter_mut().find(|p| p.id == id) {
                    product.stock = stock;
                }
                self.ctx.applied("Stock updated successfully!")
            }
            Err(e) => self.ctx.failed(&e, "Failed to update stock"),
        }
    }
}

/// Create or edit one product
#[derive(Debug)]
pub struct ProductEditor {
    ctx: Context,
    product_id: Option<String>,
    /// Field values as typed
    pub form: ProductForm,
    new_images: Vec<StagedFile>,
}

impl ProductEditor {
    /// Blank editor for a new product
    #[must_use]
    pub fn create(ctx: Context) -> Self {
        Self {
            ctx,
            product_id: None,
            form: ProductForm::default(),
            new_images: Vec::new(),
        }
    }

    /// Editor prefilled from the stored product; `None` when it cannot be loaded
    pub async fn edit(ctx: Context, id: &str) -> Option<Self> {
        match ctx.client.get_product(id).await {
            Ok(product) => Some(Self {
                form: ProductForm::from_product(&product),
                product_id: Some(id.to_string()),
                ctx,
                new_images: Vec::new(),
            }),
            Err(e) => {
                ctx.fetch_failed(&e, "Failed to load product data");
                None
            }
        }
    }

    /// Id of the product being edited
    #[must_use]
    pub fn product_id(&self) -> Option<&str> {
        self.product_id.as_deref()
    }

    /// New images attached so far
    #[must_use]
    pub fn new_images(&self) -> &[StagedFile] {
        &self.new_images
    }

    /// Attach images; a selection that would exceed four in total is rejected whole
    pub fn add_images(&mut self, files: Vec<StagedFile>) -> Outcome {
        if let Err(e) = self.form.check_image_capacity(self.new_images.len(), files.len()) {
            return self.ctx.invalid(e.to_string());
        }
        self.new_images.extend(files);
        Outcome::Applied
    }

    /// Drop a newly attached image
    pub fn remove_new_image(&mut self, index: usize) -> Option<StagedFile> {
        (index < self.new_images.len()).then(|| self.new_images.remove(index))
    }

    /// Drop one of the images already stored on the backend
    pub fn remove_existing_image(&mut self, index: usize) -> bool {
        self.form.remove_existing_image(index).is_some()
    }

    /// Validate and send; nothing is sent when validation fails
    ///
    /// A successful create resets the editor for the next product.
    pub async fn save(&mut self) -> Outcome {
        let payload = match self.form.validate(self.new_images.len()) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!(error = %e, "product form rejected");
                return self.ctx.invalid(e.to_string());
            }
        };

        if let Some(id) = self.product_id.clone() {
            match self.ctx.client.update_product(&id, &payload, &self.new_images).await {
                Ok(product) => {
                    // a bare acknowledgement carries no record to refill from
                    if !product.id.is_empty() {
                        self.form = ProductForm::from_product(&product);
                    }
                    self.new_images.clear();
                    self.ctx.applied("Product updated successfully")
                }
                Err(e) => self.ctx.failed(&e, "Failed to update product"),
            }
        } else {
            match self.ctx.client.create_product(&payload, &self.new_images).await {
                Ok(_) => {
                    self.form = ProductForm::default();
                    self.new_images.clear();
                    self.ctx.applied("Product added successfully!")
                }
                Err(e) => self.ctx.failed(&e, "Failed to add product"),
            }
        }
    }
}
