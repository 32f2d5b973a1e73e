use chrono::Utc;
use std::vec;
use tracing::{debug, info};

use crate::catalog::document::{Category, Product};
use crate::catalog::store::DocumentStore;
use crate::error::{ErrorKind, ReactorResult};
use crate::reactor_error;
use crate::stream::IterPublisher;

/// Catalog operations over a product store and a category store.
#[derive(Debug, Clone)]
pub struct ProductService<P, C> {
    products: P,
    categories: C,
}

impl<P, C> ProductService<P, C>
where
    P: DocumentStore<Product>,
    C: DocumentStore<Category>,
{
    /// Creates a new [`ProductService`] over the given stores.
    pub fn new(products: P, categories: C) -> Self {
        Self {
            products,
            categories,
        }
    }

    /// Returns all products in insertion order.
    pub async fn find_all(&self) -> ReactorResult<Vec<Product>> {
        self.products.find_all().await
    }

    /// Returns the product with the given id, if any.
    pub async fn find_by_id(&self, id: &str) -> ReactorResult<Option<Product>> {
        self.products.find_by_id(id).await
    }

    /// Returns the product with the given id or fails with [`ErrorKind::DocumentNotFound`].
    pub async fn get_by_id(&self, id: &str) -> ReactorResult<Product> {
        self.products.find_by_id(id).await?.ok_or_else(|| {
            reactor_error!(
                ErrorKind::DocumentNotFound,
                "Product does not exist",
                format!("id {id}")
            )
        })
    }

    /// Returns the first product whose name matches `name` exactly.
    pub async fn find_by_name(&self, name: &str) -> ReactorResult<Option<Product>> {
        let products = self.products.find_all().await?;

        Ok(products.into_iter().find(|product| product.name == name))
    }

    /// Validates and stores `product`, stamping its creation time if it has none.
    pub async fn save(&self, mut product: Product) -> ReactorResult<Product> {
        product.validate()?;
        if product.create_at.is_none() {
            product.create_at = Some(Utc::now());
        }

        let product = self.products.save(product).await?;
        debug!(id = ?product.id, name = %product.name, "product saved");

        Ok(product)
    }

    /// Removes `product` from the catalog.
    pub async fn delete(&self, product: &Product) -> ReactorResult<()> {
        self.products.delete(product).await
    }

    /// Returns all products with their names in upper case.
    pub async fn find_all_with_name_upper_case(&self) -> ReactorResult<Vec<Product>> {
        let products = self.products.find_all().await?;

        Ok(products
            .into_iter()
            .map(Product::with_upper_case_name)
            .collect())
    }

    /// Returns the upper-cased listing followed by `times` repetitions of it.
    pub async fn find_all_with_name_upper_case_repeat(
        &self,
        times: usize,
    ) -> ReactorResult<Vec<Product>> {
        let products = self.find_all_with_name_upper_case().await?;

        let mut repeated = Vec::with_capacity(products.len() * (times + 1));
        for _ in 0..=times {
            repeated.extend(products.iter().cloned());
        }

        Ok(repeated)
    }

    /// Returns all categories in insertion order.
    pub async fn find_all_categories(&self) -> ReactorResult<Vec<Category>> {
        self.categories.find_all().await
    }

    /// Returns the category with the given id, if any.
    pub async fn find_category_by_id(&self, id: &str) -> ReactorResult<Option<Category>> {
        self.categories.find_by_id(id).await
    }

    /// Returns the first category whose name matches `name` exactly.
    pub async fn find_category_by_name(&self, name: &str) -> ReactorResult<Option<Category>> {
        let categories = self.categories.find_all().await?;

        Ok(categories.into_iter().find(|category| category.name == name))
    }

    /// Stores `category`.
    pub async fn save_category(&self, category: Category) -> ReactorResult<Category> {
        if category.name.trim().is_empty() {
            return Err(reactor_error!(
                ErrorKind::ValidationError,
                "Category is invalid",
                "name: must not be empty"
            ));
        }

        self.categories.save(category).await
    }

    /// Returns a publisher over a snapshot of all products.
    pub async fn stream_all(&self) -> ReactorResult<IterPublisher<vec::IntoIter<Product>>> {
        let products = self.products.find_all().await?;

        Ok(IterPublisher::new(products))
    }

    /// Fills the catalog with a fixed set of categories and products.
    ///
    /// Returns the number of products stored.
    pub async fn seed(&self) -> ReactorResult<usize> {
        let electronic = self.save_category(Category::new("Electronic")).await?;
        let sport = self.save_category(Category::new("Sport")).await?;
        let computing = self.save_category(Category::new("Computing")).await?;
        let furniture = self.save_category(Category::new("Furniture")).await?;

        let products = [
            ("TV Panasonic LCD Screen", 456.89, &electronic),
            ("Sony HD Digital Camera", 177.89, &electronic),
            ("Apple iPod", 46.89, &electronic),
            ("Sony Notebook", 846.89, &computing),
            ("Hewlett Packard Multifunction", 200.89, &computing),
            ("Bianchi Bicycle", 70.89, &sport),
            ("HP Notebook Omen 17", 2500.89, &computing),
            ("Five Drawer Dresser", 150.89, &furniture),
            ("TV Sony Bravia OLED 4K Ultra HD", 2255.89, &electronic),
        ];

        let count = products.len();
        for (name, price, category) in products {
            let product = self
                .save(Product::new(name, price).with_category(category.clone()))
                .await?;
            info!(id = ?product.id, name = %product.name, "product inserted");
        }

        Ok(count)
    }
}
