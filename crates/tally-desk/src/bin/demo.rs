//! # Desk Walkthrough
//!
//! Runs a full day at the counter against the in-memory stores: admin
//! configuration, catalog setup, two sales, and the end-of-day report.
//!
//! ## Usage
//! ```bash
//! cargo run -p tally-desk --bin tally-demo
//!
//! # With full debug logging
//! RUST_LOG=debug cargo run -p tally-desk --bin tally-demo
//! ```
//!
//! ## What It Shows
//! - Settings written through the admin screens and picked up by pricing
//! - A wholesale order priced per quantity with the default commission
//! - A small order with a customer rate, manual shipping, and a discount
//! - The report reconciling both sales

use std::sync::Arc;

use chrono::Utc;
use tally_core::{Customer, Product, Sale};
use tally_desk::Desk;
use tally_store::{MemoryCatalog, MemoryDirectory, MemorySettingsStore};
use uuid::Uuid;

/// Catalog for the walkthrough: name, unit price in cents, stock on hand.
const SEED_PRODUCTS: &[(&str, i64, i64)] = &[
    ("Canvas Tote", 6_000, 80),
    ("Enamel Mug", 2_500, 120),
    ("Sticker Pack", 7_800, 40),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tally_desk::init_tracing();

    println!("Tally Sales Desk Walkthrough");
    println!("============================");
    println!();

    let desk = Desk::new(
        Arc::new(MemorySettingsStore::new()),
        Arc::new(MemoryCatalog::new()),
        Arc::new(MemoryDirectory::new()),
    );

    // Admin screens: per-quantity shipping at $5.00/unit, 5% default rate.
    let fee = desk
        .update_fee_config(Some("per_quantity"), None, Some("5.00"))
        .await?;
    let commission = desk.update_commission_config(Some("5"), None).await?;
    let policy = fee.config.policy.map_or("unconfigured", |p| p.as_str());
    println!(
        "✓ Shipping policy: {} at {}/unit",
        policy,
        fee.config.per_unit_rate()
    );
    println!(
        "✓ Default commission: {}",
        commission.config.default_percent()
    );

    // Catalog and directory.
    let mut product_ids = Vec::new();
    for (name, price_cents, stock) in SEED_PRODUCTS {
        let product = seed_product(name, *price_cents, *stock);
        desk.save_product(&product).await?;
        product_ids.push(product.id);
    }
    let reseller = seed_customer("Marina Lopes", Some(750));
    desk.save_customer(&reseller).await?;
    println!("✓ Seeded {} products, 1 customer", product_ids.len());

    // -------------------------------------------------------------------------
    // Sale 1: wholesale order, system default commission
    // -------------------------------------------------------------------------
    println!();
    println!("Sale 1: wholesale order");
    println!("-----------------------");

    desk.add_item(&product_ids[0], 40).await?;
    desk.add_item(&product_ids[1], 24).await?;
    desk.add_item(&product_ids[2], 5).await?;

    let preview = desk.preview().await?;
    let t = &preview.pricing.totals;
    println!("  Subtotal:   {}", t.subtotal);
    println!(
        "  Shipping:   {}  ({})",
        t.shipping_amount, preview.pricing.shipping_explanation
    );
    println!(
        "  Commission: {}  ({} via {})",
        t.commission_amount, preview.pricing.commission.rate, preview.pricing.commission.source
    );
    println!("  Payable:    {}", t.customer_payable_total);

    let sale_one = desk.checkout().await?;
    println!("✓ Recorded sale {}", sale_one.id);

    // -------------------------------------------------------------------------
    // Sale 2: customer rate, manual shipping, discount
    // -------------------------------------------------------------------------
    println!();
    println!("Sale 2: reseller pickup");
    println!("-----------------------");

    desk.add_item(&product_ids[0], 2).await?;
    desk.select_customer(Some(&reseller.id)).await?;
    desk.set_manual_shipping(Some("12.00"))?;
    desk.set_discount("10.00")?;

    let preview = desk.preview().await?;
    println!(
        "  Commission: {} via {}",
        preview.pricing.commission.rate, preview.pricing.commission.source
    );
    println!("  {}", preview.pricing.shipping_explanation);

    let sale_two = desk.checkout().await?;
    println!("✓ Recorded sale {}", sale_two.id);
    println!();
    println!("{}", serde_json::to_string_pretty(&sale_two)?);

    // -------------------------------------------------------------------------
    // End of day
    // -------------------------------------------------------------------------
    let sales: Vec<Sale> = vec![sale_one, sale_two];
    let report = desk.report(&sales);

    println!();
    println!("End-of-day report");
    println!("-----------------");
    println!("  Sales:      {}", report.totals.sale_count);
    println!("  Revenue:    {}", report.totals.revenue);
    println!("  Shipping:   {}", report.totals.shipping_total);
    println!("  Commission: {}", report.totals.commission_total);
    println!("  Discounts:  {}", report.totals.discount_total);
    println!("  Net result: {}", report.totals.net_result);

    println!();
    println!("✓ Walkthrough complete");

    Ok(())
}

/// Builds an active product with a fresh id.
fn seed_product(name: &str, unit_price_cents: i64, stock_on_hand: i64) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        description: None,
        category: None,
        unit_price_cents,
        shipping_override_cents: None,
        stock_on_hand,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

/// Builds an active customer with a fresh id.
fn seed_customer(name: &str, commission_override_bps: Option<u32>) -> Customer {
    let now = Utc::now();
    Customer {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        email: None,
        phone: None,
        tax_id: None,
        address: None,
        city: None,
        region: None,
        postal_code: None,
        commission_override_bps,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
