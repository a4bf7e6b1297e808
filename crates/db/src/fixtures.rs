use ella_core::ConnectorRecord;

use crate::repositories::RepositoryError;
use crate::DbPool;

/// Deterministic connector catalog used by `ella seed` and the integration
/// tests. Mirrors the shape of the production catalog the marketing site
/// searches against.
pub fn connector_catalog() -> Vec<ConnectorRecord> {
    fn record(name: &str, description: Option<&str>, category: &str) -> ConnectorRecord {
        ConnectorRecord {
            name: name.to_string(),
            description: description.map(str::to_string),
            category: category.to_string(),
        }
    }

    vec![
        record("SAP ERP", Some("Bidirectional sync for SAP ERP masters and orders"), "ERP"),
        record("SOKRATES.ERP", Some("Native connector for the SOKRATES.ERP suite"), "ERP"),
        record("Microsoft Dynamics 365", Some("Dynamics 365 sales and finance modules"), "ERP"),
        record("DATEV", Some("Export bookings and invoices to DATEV"), "Accounting"),
        record("Salesforce", Some("Cloud CRM accounts, contacts, and opportunities"), "CRM"),
        record("HubSpot", Some("Marketing and CRM pipelines"), "CRM"),
        record("CAS genesisWorld", Some("CAS genesisWorld CRM appointments and contacts"), "CRM"),
        record("SmartWe", Some("SmartWe cloud CRM workspace"), "CRM"),
        record("Shopify", Some("Shop orders, products, and inventory"), "E-Commerce"),
        record("WooCommerce", Some("WooCommerce storefront orders and stock"), "E-Commerce"),
        record("Magento", None, "E-Commerce"),
        record("Mailchimp", Some("Audience sync for email marketing campaigns"), "Marketing"),
        record("Slack", Some("Workflow notifications into Slack channels"), "Communication"),
        record("Exchange Online", Some("Calendar and mailbox automation"), "Communication"),
        record("Zendesk", Some("Support tickets and customer history"), "Support"),
        record("Jira", Some("Issue tracking for delivery workflows"), "Project Management"),
    ]
}

/// Upserts the fixture catalog; returns how many records were written.
pub async fn seed_connectors(pool: &DbPool) -> Result<u64, RepositoryError> {
    let mut written = 0;
    for connector in connector_catalog() {
        sqlx::query(
            "INSERT INTO connector (name, description, category) VALUES (?1, ?2, ?3) \
             ON CONFLICT (name) DO UPDATE SET description = ?2, category = ?3",
        )
        .bind(&connector.name)
        .bind(&connector.description)
        .bind(&connector.category)
        .execute(pool)
        .await?;
        written += 1;
    }

    Ok(written)
}
