//! # Desk Service
//!
//! The facade the UI shell invokes. Every operation here is a thin
//! choreography: look records up through the store seams, mutate the
//! session draft, and delegate all arithmetic to tally-core.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Sale Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│  Draft   │────►│ Preview  │────►│ Recorded │       │
//! │  │ Session  │     │          │     │ (live)   │     │   Sale   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                              │
//! │                   add_item          checkout()                          │
//! │                   update_item       (freezes figures,                   │
//! │                   select_customer    clears session)                    │
//! │                   set_discount           │                              │
//! │                        │                 │                              │
//! │                        ▼                 ▼                              │
//! │                   clear_session ────────────────────►                  │
//! │                                          (back to empty)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Config Snapshot Rule
//! `preview` and `checkout` re-fetch the settings keys on every call and
//! normalize them exactly once. A sale in progress always prices against
//! what the admin has saved NOW, and the pricing pipeline itself never
//! touches storage.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DeskError, DeskResult, ErrorCode};
use crate::state::SessionState;
use tally_core::config::keys;
use tally_core::report::{build_report, SalesReport};
use tally_core::validation::{
    parse_money_field, parse_percent_field, parse_policy_field, validate_commission_bps,
    validate_customer_name, validate_price_cents, validate_product_name,
    validate_shipping_rate_cents, validate_uuid,
};
use tally_core::{
    price_draft, CommissionConfig, CoreError, Customer, FeeConfig, LineItem, Product, Sale,
    SaleDraft, SalePricing,
};
use tally_store::{settings_map, CustomerDirectory, ProductCatalog, SettingsStore};

// =============================================================================
// Response Types
// =============================================================================

/// Session response including lines and running figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub items: Vec<LineItem>,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub discount_cents: i64,
    pub manual_shipping_cents: Option<i64>,
    pub sale_commission_bps: Option<u32>,
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal_cents: i64,
}

impl From<&SaleDraft> for SessionView {
    fn from(draft: &SaleDraft) -> Self {
        SessionView {
            items: draft.items.clone(),
            customer_id: draft.customer_id.clone(),
            customer_name: draft.customer_name.clone(),
            discount_cents: draft.discount_cents,
            manual_shipping_cents: draft.manual_shipping_cents,
            sale_commission_bps: draft.sale_commission_bps,
            item_count: draft.item_count(),
            total_quantity: draft.total_quantity(),
            subtotal_cents: draft.subtotal().cents(),
        }
    }
}

/// Live pricing response for the sale form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalePreview {
    pub pricing: SalePricing,

    /// Config normalization warnings, stringified for display.
    pub config_warnings: Vec<String>,
}

/// Fee configuration screen response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeConfigResponse {
    pub config: FeeConfig,
    pub warnings: Vec<String>,
}

/// Commission configuration screen response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionConfigResponse {
    pub config: CommissionConfig,
    pub warnings: Vec<String>,
}

// =============================================================================
// Desk Facade
// =============================================================================

/// The service surface for one sale counter.
///
/// ## Usage
/// ```rust,ignore
/// let desk = Desk::new(settings, catalog, directory);
///
/// desk.add_item(&product_id, 2).await?;
/// let preview = desk.preview().await?;
/// let sale = desk.checkout().await?;
/// ```
///
/// Independent counters get independent `Desk` instances; they share
/// nothing but the stores behind the seams.
pub struct Desk {
    settings: Arc<dyn SettingsStore>,
    catalog: Arc<dyn ProductCatalog>,
    directory: Arc<dyn CustomerDirectory>,
    session: SessionState,
}

impl Desk {
    /// Creates a desk over the given stores with an empty session.
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        catalog: Arc<dyn ProductCatalog>,
        directory: Arc<dyn CustomerDirectory>,
    ) -> Self {
        Desk {
            settings,
            catalog,
            directory,
            session: SessionState::new(),
        }
    }

    fn session_view(&self) -> SessionView {
        self.session.with_draft(|d| SessionView::from(d))
    }

    /// Fetches every pipeline key once and normalizes both configs.
    async fn load_configs(&self) -> DeskResult<(FeeConfig, CommissionConfig, Vec<String>)> {
        let records = self.settings.fetch(&keys::ALL).await?;
        let map = settings_map(records);

        let (fee, fee_warnings) = FeeConfig::from_settings(&map);
        let (commission, commission_warnings) = CommissionConfig::from_settings(&map);

        let warnings: Vec<String> = fee_warnings
            .iter()
            .map(ToString::to_string)
            .chain(commission_warnings.iter().map(ToString::to_string))
            .collect();

        for warning in &warnings {
            warn!(warning = %warning, "Config normalization warning");
        }

        Ok((fee, commission, warnings))
    }

    // =========================================================================
    // Session Operations
    // =========================================================================

    /// Gets the current session contents.
    pub fn session(&self) -> SessionView {
        debug!("session");
        self.session_view()
    }

    /// Adds a product to the session.
    ///
    /// ## Behavior
    /// - If product already in the draft: quantity increases
    /// - If product not in the draft: added as new line
    /// - Price and shipping override are frozen at time of adding
    pub async fn add_item(&self, product_id: &str, quantity: i64) -> DeskResult<SessionView> {
        debug!(product_id = %product_id, quantity = %quantity, "add_item");

        let product = self
            .catalog
            .get(product_id)
            .await?
            .ok_or_else(|| DeskError::not_found("Product", product_id))?;

        self.session
            .with_draft_mut(|d| d.add_product(&product, quantity))?;
        Ok(self.session_view())
    }

    /// Updates the quantity of a line.
    ///
    /// ## Behavior
    /// - Quantity 0: removes the line
    /// - Quantity > max: returns error
    pub fn update_item(&self, product_id: &str, quantity: i64) -> DeskResult<SessionView> {
        debug!(product_id = %product_id, quantity = %quantity, "update_item");

        self.session
            .with_draft_mut(|d| d.update_quantity(product_id, quantity))?;
        Ok(self.session_view())
    }

    /// Removes a line from the session.
    pub fn remove_item(&self, product_id: &str) -> DeskResult<SessionView> {
        debug!(product_id = %product_id, "remove_item");

        self.session.with_draft_mut(|d| d.remove_line(product_id))?;
        Ok(self.session_view())
    }

    /// Clears the session back to an empty sale.
    ///
    /// ## When Used
    /// - User cancels the sale
    /// - After checkout (new transaction)
    pub fn clear_session(&self) -> SessionView {
        debug!("clear_session");

        self.session.with_draft_mut(|d| d.clear());
        self.session_view()
    }

    /// Selects the sale's customer, snapshotting their commission override,
    /// or clears the selection with `None`.
    pub async fn select_customer(&self, customer_id: Option<&str>) -> DeskResult<SessionView> {
        debug!(customer_id = ?customer_id, "select_customer");

        match customer_id {
            Some(id) => {
                let customer = self
                    .directory
                    .get(id)
                    .await?
                    .ok_or_else(|| DeskError::not_found("Customer", id))?;

                if !customer.is_active {
                    return Err(DeskError::new(
                        ErrorCode::BusinessLogic,
                        format!("Customer '{}' is inactive", customer.name),
                    ));
                }

                self.session.with_draft_mut(|d| d.set_customer(Some(&customer)));
            }
            None => self.session.with_draft_mut(|d| d.set_customer(None)),
        }

        Ok(self.session_view())
    }

    /// Sets the discount from the form field.
    pub fn set_discount(&self, amount: &str) -> DeskResult<SessionView> {
        debug!(amount = %amount, "set_discount");

        let discount = parse_money_field("discount", amount)?;
        self.session.with_draft_mut(|d| d.set_discount(discount))?;
        Ok(self.session_view())
    }

    /// Sets or clears the operator's manual shipping amount.
    pub fn set_manual_shipping(&self, amount: Option<&str>) -> DeskResult<SessionView> {
        debug!(amount = ?amount, "set_manual_shipping");

        let manual = match amount {
            Some(raw) => Some(parse_money_field("manual shipping", raw)?),
            None => None,
        };
        self.session.with_draft_mut(|d| d.set_manual_shipping(manual))?;
        Ok(self.session_view())
    }

    /// Sets or clears the per-sale commission override.
    pub fn set_sale_commission(&self, rate: Option<&str>) -> DeskResult<SessionView> {
        debug!(rate = ?rate, "set_sale_commission");

        let rate = match rate {
            Some(raw) => Some(parse_percent_field("sale commission", raw)?),
            None => None,
        };
        self.session.with_draft_mut(|d| d.set_sale_commission(rate))?;
        Ok(self.session_view())
    }

    // =========================================================================
    // Pricing
    // =========================================================================

    /// Prices the current draft against the settings as saved right now.
    ///
    /// ## When Used
    /// The sale form calls this after every edit; the figures on screen are
    /// always the output of the same pipeline checkout will run.
    pub async fn preview(&self) -> DeskResult<SalePreview> {
        debug!("preview");

        let (fee, commission, warnings) = self.load_configs().await?;
        let pricing = self
            .session
            .with_draft(|d| price_draft(d, &fee, &commission));

        Ok(SalePreview {
            pricing,
            config_warnings: warnings,
        })
    }

    /// Finalizes the sale: freezes the figures, adjusts stock, clears the
    /// session, and hands the completed record to the caller to persist.
    ///
    /// ## Behavior
    /// - Empty sessions are refused
    /// - A negative payable total is recorded as-is and logged
    pub async fn checkout(&self) -> DeskResult<Sale> {
        debug!("checkout");

        if self.session.with_draft(|d| d.is_empty()) {
            return Err(CoreError::EmptySale.into());
        }

        let (fee, commission, _warnings) = self.load_configs().await?;

        let sale = self.session.with_draft(|d| {
            price_draft(d, &fee, &commission).into_sale(Uuid::new_v4().to_string(), d, Utc::now())
        });

        if sale.is_shortfall() {
            warn!(
                sale_id = %sale.id,
                payable = %sale.payable_total(),
                "Sale recorded with negative payable total"
            );
        }

        for item in &sale.items {
            let sold = item.effective_quantity();
            if sold > 0 {
                self.catalog.adjust_stock(&item.product_id, -sold).await?;
            }
        }

        self.session.with_draft_mut(|d| d.clear());

        info!(
            sale_id = %sale.id,
            payable = %sale.payable_total(),
            items = sale.items.len(),
            "Sale recorded"
        );

        Ok(sale)
    }

    // =========================================================================
    // Config Screens
    // =========================================================================

    /// Reads the shipping fee configuration for the admin screen.
    pub async fn fee_config(&self) -> DeskResult<FeeConfigResponse> {
        debug!("fee_config");

        let records = self
            .settings
            .fetch(&[
                keys::SHIPPING_POLICY,
                keys::SHIPPING_FLAT_RATE,
                keys::SHIPPING_PER_UNIT_RATE,
            ])
            .await?;
        let (config, warnings) = FeeConfig::from_settings(&settings_map(records));

        Ok(FeeConfigResponse {
            config,
            warnings: warnings.iter().map(ToString::to_string).collect(),
        })
    }

    /// Updates the shipping fee settings from the admin form.
    ///
    /// ## Behavior
    /// Partial update: only provided fields are written. Form input is
    /// validated here and rejected on garbage; tolerance for junk exists
    /// only when LOADING stored values.
    pub async fn update_fee_config(
        &self,
        policy: Option<&str>,
        flat_rate: Option<&str>,
        per_unit_rate: Option<&str>,
    ) -> DeskResult<FeeConfigResponse> {
        debug!(policy = ?policy, flat_rate = ?flat_rate, per_unit_rate = ?per_unit_rate, "update_fee_config");

        let mut entries: Vec<(String, String)> = Vec::new();

        if let Some(raw) = policy {
            let parsed = parse_policy_field(raw)?;
            entries.push((
                keys::SHIPPING_POLICY.to_string(),
                parsed.as_str().to_string(),
            ));
        }
        if let Some(raw) = flat_rate {
            parse_money_field("flat rate", raw)?;
            entries.push((keys::SHIPPING_FLAT_RATE.to_string(), raw.trim().to_string()));
        }
        if let Some(raw) = per_unit_rate {
            parse_money_field("per-unit rate", raw)?;
            entries.push((
                keys::SHIPPING_PER_UNIT_RATE.to_string(),
                raw.trim().to_string(),
            ));
        }

        if !entries.is_empty() {
            self.settings.upsert(&entries).await?;
            info!(updated = entries.len(), "Fee settings updated");
        }

        self.fee_config().await
    }

    /// Reads the commission configuration for the admin screen.
    pub async fn commission_config(&self) -> DeskResult<CommissionConfigResponse> {
        debug!("commission_config");

        let records = self
            .settings
            .fetch(&[keys::COMMISSION_DEFAULT_PERCENT, keys::COMMISSION_CUSTOM_PERCENT])
            .await?;
        let (config, warnings) = CommissionConfig::from_settings(&settings_map(records));

        Ok(CommissionConfigResponse {
            config,
            warnings: warnings.iter().map(ToString::to_string).collect(),
        })
    }

    /// Updates the commission settings from the admin form.
    ///
    /// Partial update, like [`Desk::update_fee_config`].
    pub async fn update_commission_config(
        &self,
        default_percent: Option<&str>,
        custom_percent: Option<&str>,
    ) -> DeskResult<CommissionConfigResponse> {
        debug!(default_percent = ?default_percent, custom_percent = ?custom_percent, "update_commission_config");

        let mut entries: Vec<(String, String)> = Vec::new();

        if let Some(raw) = default_percent {
            parse_percent_field("default commission", raw)?;
            entries.push((
                keys::COMMISSION_DEFAULT_PERCENT.to_string(),
                raw.trim().to_string(),
            ));
        }
        if let Some(raw) = custom_percent {
            parse_percent_field("custom commission", raw)?;
            entries.push((
                keys::COMMISSION_CUSTOM_PERCENT.to_string(),
                raw.trim().to_string(),
            ));
        }

        if !entries.is_empty() {
            self.settings.upsert(&entries).await?;
            info!(updated = entries.len(), "Commission settings updated");
        }

        self.commission_config().await
    }

    // =========================================================================
    // Catalog & Directory
    // =========================================================================

    /// Lists active products for the catalog screen.
    pub async fn list_products(&self) -> DeskResult<Vec<Product>> {
        debug!("list_products");
        Ok(self.catalog.list_active().await?)
    }

    /// Validates and saves a product record.
    pub async fn save_product(&self, product: &Product) -> DeskResult<()> {
        debug!(id = %product.id, name = %product.name, "save_product");

        validate_uuid(&product.id)?;
        validate_product_name(&product.name)?;
        validate_price_cents(product.unit_price_cents)?;
        if let Some(rate) = product.shipping_override_cents {
            validate_shipping_rate_cents(rate)?;
        }

        self.catalog.save(product).await?;
        Ok(())
    }

    /// Soft-deactivates a product.
    pub async fn deactivate_product(&self, id: &str) -> DeskResult<()> {
        debug!(id = %id, "deactivate_product");
        Ok(self.catalog.deactivate(id).await?)
    }

    /// Lists active customers for the directory screen.
    pub async fn list_customers(&self) -> DeskResult<Vec<Customer>> {
        debug!("list_customers");
        Ok(self.directory.list_active().await?)
    }

    /// Validates and saves a customer record.
    pub async fn save_customer(&self, customer: &Customer) -> DeskResult<()> {
        debug!(id = %customer.id, name = %customer.name, "save_customer");

        validate_uuid(&customer.id)?;
        validate_customer_name(&customer.name)?;
        if let Some(bps) = customer.commission_override_bps {
            validate_commission_bps(bps)?;
        }

        self.directory.save(customer).await?;
        Ok(())
    }

    /// Soft-deactivates a customer.
    pub async fn deactivate_customer(&self, id: &str) -> DeskResult<()> {
        debug!(id = %id, "deactivate_customer");
        Ok(self.directory.deactivate(id).await?)
    }

    // =========================================================================
    // Reporting
    // =========================================================================

    /// Builds the report over completed sales.
    ///
    /// The desk does not persist sales; the caller hands back whatever set
    /// the reporting screen selected (a date range, a customer filter).
    pub fn report(&self, sales: &[Sale]) -> SalesReport {
        debug!(sale_count = sales.len(), "report");
        build_report(sales)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
