use reactor::catalog::{Category, DocumentStore, MemoryStore, Product, ProductService};
use reactor::error::ErrorKind;
use reactor::stream::{BoundedPullConsumer, ConsumerState};
use reactor_telemetry::tracing::init_test_tracing;

fn service() -> ProductService<MemoryStore<Product>, MemoryStore<Category>> {
    ProductService::new(MemoryStore::new(), MemoryStore::new())
}

#[tokio::test]
async fn seeded_catalog_streams_in_pairs() {
    init_test_tracing();

    let service = service();
    let seeded = service.seed().await.unwrap();

    let mut names = Vec::new();
    let consumer =
        BoundedPullConsumer::with_handler(2, |product: Product| names.push(product.name)).unwrap();
    let report = consumer.run(service.stream_all().await.unwrap()).await;

    assert_eq!(report.state, ConsumerState::Completed);
    assert_eq!(report.consumed as usize, seeded);
    assert_eq!(report.grants, 5);
    assert!(report.peak_in_flight <= 2);
    assert_eq!(names.first().map(String::as_str), Some("TV Panasonic LCD Screen"));
}

#[tokio::test]
async fn product_lifecycle() {
    init_test_tracing();

    let service = service();
    let category = service.save_category(Category::new("Computing")).await.unwrap();

    let mut product = service
        .save(Product::new("Sony Notebook", 846.89).with_category(category.clone()))
        .await
        .unwrap();
    let id = product.id.clone().unwrap();

    product.assign_photo("1234", "note book.png");
    service.save(product.clone()).await.unwrap();

    let stored = service.get_by_id(&id).await.unwrap();
    assert_eq!(stored.photo.as_deref(), Some("1234-notebook.png"));
    assert_eq!(stored.category, Some(category.clone()));
    assert_eq!(
        service
            .find_category_by_id(category.id.as_deref().unwrap())
            .await
            .unwrap(),
        Some(category)
    );

    service.delete(&stored).await.unwrap();
    assert!(service.find_by_id(&id).await.unwrap().is_none());

    let err = service.delete(&stored).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DocumentNotFound);
}

#[tokio::test]
async fn memory_store_is_shared_between_clones() {
    let store = MemoryStore::new();
    let clone = store.clone();

    let category = store.save(Category::new("Sport")).await.unwrap();

    let found = clone
        .find_by_id(category.id.as_deref().unwrap())
        .await
        .unwrap();
    assert_eq!(found, Some(category));
    assert_eq!(clone.find_all().await.unwrap().len(), 1);
}
