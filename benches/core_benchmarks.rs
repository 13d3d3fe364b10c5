//! Benchmarks for storedesk-core list queries, analytics and ingestion rules

#![allow(
    missing_docs,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap
)]

use chrono::{Duration, TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use storedesk_core::analytics;
use storedesk_core::ingest::{ImageUpload, StagedFile};
use storedesk_core::listing::{self, ListQuery, ProductSortKey};
use storedesk_core::types::{OrderSummary, ShippingAddress};
use storedesk_core::utils::{format_currency, sanitize_filename};
use storedesk_core::{Customer, Order, OrderStatus, Product};

const CATEGORIES: [&str; 4] = ["Sunglasses", "Eyeglasses", "Kids", "Sports"];

fn catalog(size: usize) -> Vec<Product> {
    (0..size)
        .map(|i| Product {
            id: format!("p{i}"),
            name: format!("Frame {i:05}"),
            price: 499.0 + (i % 37) as f64 * 25.0,
            category: CATEGORIES[i % CATEGORIES.len()].to_string(),
            stock: (i % 23) as u32,
            brand: if i % 3 == 0 { "Ray-Ban" } else { "Vogue" }.to_string(),
            ..Product::default()
        })
        .collect()
}

fn customers(size: usize) -> Vec<Customer> {
    (0..size)
        .map(|i| Customer {
            id: format!("c{i}"),
            name: format!("Customer {i}"),
            email: format!("c{i}@shop.test"),
        })
        .collect()
}

fn orders(size: usize, customers: usize) -> Vec<Order> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
    let statuses = [
        OrderStatus::Pending,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];
    (0..size)
        .map(|i| Order {
            id: format!("o{i}"),
            order_id: format!("ORD-{i}"),
            status: statuses[i % statuses.len()].clone(),
            shipping_address: ShippingAddress {
                email: format!("c{}@shop.test", i % customers.max(1)),
                ..ShippingAddress::default()
            },
            order_summary: OrderSummary {
                total: 750.0 + (i % 11) as f64 * 120.0,
                ..OrderSummary::default()
            },
            created_at: Some(start + Duration::hours(i as i64 * 7)),
            ..Order::default()
        })
        .collect()
}

/// Search, filter, sort and page the product list
fn bench_product_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("product_query");

    for &size in &[100usize, 1_000, 10_000] {
        let products = catalog(size);

        let mut query = ListQuery::new(10);
        query.set_search("ray");
        query.set_category(Some("Sunglasses".to_string()));
        query.toggle_sort(ProductSortKey::Price);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("search_sort_page", size), &products, |b, products| {
            b.iter(|| listing::query(black_box(products), black_box(&query)));
        });

        let unfiltered = ListQuery::<ProductSortKey>::new(10);
        group.bench_with_input(BenchmarkId::new("page_only", size), &products, |b, products| {
            b.iter(|| listing::query(black_box(products), black_box(&unfiltered)));
        });
    }

    group.finish();
}

/// Aggregate the dashboard from realistic volumes
fn bench_dashboard_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("dashboard_stats");
    let now = Utc.with_ymd_and_hms(2024, 6, 30, 18, 0, 0).unwrap();

    for &(n_orders, n_customers) in &[(500usize, 100usize), (5_000, 1_000), (20_000, 4_000)] {
        let products = catalog(1_000);
        let customers = customers(n_customers);
        let orders = orders(n_orders, n_customers);

        group.throughput(Throughput::Elements(n_orders as u64));
        group.bench_function(BenchmarkId::new("compute", n_orders), |b| {
            b.iter(|| {
                analytics::compute(
                    black_box(&customers),
                    black_box(&orders),
                    black_box(&products),
                    &now,
                    10,
                )
            });
        });
    }

    group.finish();
}

/// Staging rules for bulk images, including the duplicate scan
fn bench_image_staging(c: &mut Criterion) {
    let mut group = c.benchmark_group("image_staging");

    let batch: Vec<StagedFile> = (0..10)
        .map(|i| StagedFile::from_path(format!("/uploads/frame_{i}.jpg")))
        .collect();

    group.bench_function("stage_full_batch", |b| {
        b.iter(|| {
            let mut upload = ImageUpload::default();
            upload.stage(black_box(batch.clone()))
        });
    });

    let mut duplicated = batch.clone();
    duplicated.truncate(9);
    duplicated.push(StagedFile::from_path("/other/frame_0.jpg"));
    group.bench_function("reject_duplicate_batch", |b| {
        b.iter(|| {
            let mut upload = ImageUpload::default();
            upload.stage(black_box(duplicated.clone()))
        });
    });

    group.finish();
}

/// Display formatting used by every table
fn bench_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatting");

    let amounts = [0.0, 49.5, 1_499.0, 123_456.78, 98_765_432.1];
    group.throughput(Throughput::Elements(amounts.len() as u64));
    group.bench_function("format_currency", |b| {
        b.iter(|| {
            amounts
                .iter()
                .map(|a| format_currency(black_box(*a)))
                .collect::<Vec<_>>()
        });
    });

    let filenames = [
        "INV-1001.pdf",
        "invoice for order #1001.pdf",
        "../../../etc/passwd",
        "very/long\\path@with*many|problematic:characters?.pdf",
    ];
    group.bench_function("sanitize_filename", |b| {
        b.iter(|| {
            filenames
                .iter()
                .map(|f| sanitize_filename(black_box(f)))
                .collect::<Vec<_>>()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_product_query,
    bench_dashboard_stats,
    bench_image_staging,
    bench_formatting
);
criterion_main!(benches);
