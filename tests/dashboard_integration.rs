//! Integration Tests - End-to-end Dashboard Component Testing
//!
//! Tests the interaction between usecases, ports, and adapters: the
//! CSV-to-merge pipeline, override preservation across shop-variant
//! switches, report export, and the chat context hand-off. Uses
//! mockall for trait mocking.

use mockall::mock;
use mockall::predicate::*;

use profit_dashboard::adapters::csv;
use profit_dashboard::adapters::persistence::MemoryOverrideStore;
use profit_dashboard::config::UserSettings;
use profit_dashboard::domain::fee_table::{builtin_table, FeeCategory, FeeTable, ShopVariant};
use profit_dashboard::domain::fees::FeeCalculator;
use profit_dashboard::usecases::analytics;
use profit_dashboard::usecases::dashboard::Dashboard;
use profit_dashboard::usecases::merger::Merger;

// ---- Mock Definitions ----

mock! {
    pub Overrides {}

    impl profit_dashboard::ports::override_store::OverrideStore for Overrides {
        fn get(&self, sku: &str) -> Option<String>;
        fn set(&mut self, sku: &str, category_id: &str);
        fn entries(&self) -> Vec<(String, String)>;
    }
}

mock! {
    pub Chat {}

    #[async_trait::async_trait]
    impl profit_dashboard::ports::analyst::Analyst for Chat {
        async fn analyze(&self, context: &str, question: &str) -> anyhow::Result<String>;
        async fn is_healthy(&self) -> bool;
    }
}

// ---- Helpers ----

const INFO_CSV: &[u8] = b"sku,name,cost_price\n\
A1,Widget,100000\n\
B2,Gadget,45000\n";

const INVENTORY_CSV: &[u8] = b"sku,stock_main,stock_branch,sales_30d\n\
A1,5,0,2\n\
C3,1,1,0\n";

const PRICING_CSV: &[u8] = b"sku,price_list,price_market\n\
A1,150000,140000\n\
B2,60000,not-a-price\n";

fn seeded_dashboard() -> Dashboard {
    let mut dashboard = Dashboard::new(
        UserSettings::default(),
        Merger::new(FeeCalculator::default()),
        Box::new(MemoryOverrideStore::new()),
    );
    dashboard.load_info(csv::parse_info(INFO_CSV).unwrap());
    dashboard.load_inventory(csv::parse_inventory(INVENTORY_CSV).unwrap());
    dashboard.load_pricing(csv::parse_pricing(PRICING_CSV).unwrap());
    dashboard
}

/// Retunes one category rate on a table, keeping ids intact.
fn with_rate(table: &FeeTable, id: &str, rate: f64) -> FeeTable {
    FeeTable::new(
        table
            .categories()
            .iter()
            .map(|c| FeeCategory {
                id: c.id.clone(),
                name: c.name.clone(),
                rate: if c.id == id { rate } else { c.rate },
            })
            .collect(),
    )
}

// ---- Integration Tests ----

#[test]
fn test_csv_to_merge_pipeline() {
    let dashboard = seeded_dashboard();

    // Full outer join across the three files: A1 everywhere, B2 in
    // info+pricing, C3 only in inventory.
    let skus: Vec<&str> = dashboard.products().iter().map(|p| p.sku.as_str()).collect();
    assert_eq!(skus, vec!["A1", "B2", "C3"]);

    let b2 = &dashboard.products()[1];
    // "not-a-price" degraded to None at parse time, then to 0 here.
    assert_eq!(b2.price_market, 0.0);
    assert_eq!(b2.platform_fee, 0.0);

    let c3 = &dashboard.products()[2];
    assert_eq!(c3.name, "N/A");
    assert_eq!(c3.cost_price, 0.0);
    assert_eq!(c3.stock_main, 1);
}

#[test]
fn test_published_fee_schedule_through_rate_edit() {
    let mut dashboard = seeded_dashboard();

    // Retune the Standard default category to 6% and verify the
    // published example: 140 000 price, service on.
    let edited = with_rate(dashboard.active_table(), "other", 6.0);
    dashboard
        .update_fee_table(ShopVariant::Standard, edited)
        .unwrap();

    let a1 = &dashboard.products()[0];
    assert!((a1.platform_fee - 23_394.0).abs() < 1e-6);
    assert!((a1.profit - 16_606.0).abs() < 1e-6);
}

#[test]
fn test_override_preserved_across_variant_switches() {
    let mut dashboard = seeded_dashboard();

    assert!(dashboard.set_override("A1", "laptop"));
    assert_eq!(dashboard.products()[0].fee_category_id, "laptop");

    // "laptop" exists on every table: it sticks through a full tour.
    dashboard.set_shop_variant(ShopVariant::Mall);
    assert_eq!(dashboard.products()[0].fee_category_id, "laptop");
    assert!((dashboard.products()[0].fee_rate - 3.30).abs() < 1e-9);

    dashboard.set_shop_variant(ShopVariant::TiktokShop);
    assert_eq!(dashboard.products()[0].fee_category_id, "laptop");
    assert!((dashboard.products()[0].fee_rate - 1.82).abs() < 1e-9);

    // A Mall-only category degrades to the default elsewhere and
    // comes back when the Mall table returns.
    dashboard.set_shop_variant(ShopVariant::Mall);
    assert!(dashboard.set_override("A1", "cpu"));
    dashboard.set_shop_variant(ShopVariant::Standard);
    assert_eq!(dashboard.products()[0].fee_category_id, "other");
    dashboard.set_shop_variant(ShopVariant::Mall);
    assert_eq!(dashboard.products()[0].fee_category_id, "cpu");
}

#[test]
fn test_merger_consults_override_port() {
    let mut store = MockOverrides::new();
    store
        .expect_get()
        .with(eq("A1"))
        .times(1)
        .returning(|_| Some("ram".to_string()));

    let sources = profit_dashboard::domain::product::RawSources {
        pricing: vec![profit_dashboard::domain::product::RawPricing {
            sku: "A1".into(),
            price_list: Some(0.0),
            price_market: Some(100_000.0),
        }],
        ..Default::default()
    };

    let merger = Merger::new(FeeCalculator::default());
    let products = merger.merge(&sources, &builtin_table(ShopVariant::Mall), false, &store);
    assert_eq!(products[0].fee_category_id, "ram");
    assert!((products[0].fee_rate - 12.60).abs() < 1e-9);
}

#[test]
fn test_duplicate_csv_rows_last_wins() {
    let csv_bytes: &[u8] = b"sku,name,cost_price\nA1,First,100\nA1,Second,900\n";
    let mut dashboard = Dashboard::new(
        UserSettings::default(),
        Merger::new(FeeCalculator::default()),
        Box::new(MemoryOverrideStore::new()),
    );
    dashboard.load_info(csv::parse_info(csv_bytes).unwrap());

    assert_eq!(dashboard.products().len(), 1);
    assert_eq!(dashboard.products()[0].name, "Second");
    assert_eq!(dashboard.products()[0].cost_price, 900.0);
}

#[test]
fn test_remerge_is_idempotent() {
    let mut dashboard = seeded_dashboard();
    dashboard.set_override("B2", "software");

    let first = dashboard.products().to_vec();
    // A no-op settings write does not change anything observable.
    dashboard.set_low_stock_threshold(10);
    // Re-uploading identical data rebuilds to identical output.
    dashboard.load_pricing(csv::parse_pricing(PRICING_CSV).unwrap());
    assert_eq!(first, dashboard.products());
}

#[test]
fn test_export_report_end_to_end() {
    let dashboard = seeded_dashboard();
    let bytes = csv::export_report(dashboard.products(), dashboard.active_table()).unwrap();

    assert!(bytes.starts_with(b"\xef\xbb\xbf"));
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.lines().count() >= 4); // header + 3 products
    assert!(text.contains("A1,Widget,Other / Default,"));
}

#[tokio::test]
async fn test_chat_context_hand_off() {
    let dashboard = seeded_dashboard();
    let settings = dashboard.settings();
    let context = analytics::chat_context(
        dashboard.products(),
        settings.shop_variant,
        settings.service_fee_enabled,
        settings.low_stock_threshold,
        50,
    )
    .to_json();

    let mut analyst = MockChat::new();
    analyst
        .expect_analyze()
        .withf(|ctx, question| {
            ctx.contains("\"total_items\":3") && question == "Which product earns the most?"
        })
        .times(1)
        .returning(|_, _| Ok("A1 leads on profit.".to_string()));

    use profit_dashboard::ports::analyst::Analyst as _;
    let answer = analyst
        .analyze(&context, "Which product earns the most?")
        .await
        .unwrap();
    assert_eq!(answer, "A1 leads on profit.");
}
