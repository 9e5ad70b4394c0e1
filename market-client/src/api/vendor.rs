use shared::ApiEnvelope;
use shared::models::{
    BookingList, DashboardStats, Invoice, InvoiceCreate, InvoiceUpdate, ReviewList, VendorProfile,
};

use super::{MarketApi, resource_path};
use crate::error::ClientResult;
use crate::http::{HttpClient, expect_success, unwrap_envelope};
use crate::storage::{KEY_VENDOR_PROFILE, Storage, StorageExt};

const VENDORS_PATH: &str = "vendors";
const INVOICES_PATH: &str = "invoices";

impl<H: HttpClient> MarketApi<H> {
    pub async fn vendor_bookings(&self, page: u32, limit: u32) -> ClientResult<BookingList> {
        let query = [("page", page.to_string()), ("limit", limit.to_string())];
        let envelope: ApiEnvelope<BookingList> = self
            .http
            .get(&format!("{VENDORS_PATH}/bookings"), &query)
            .await?;
        unwrap_envelope(envelope, "fetch bookings")
    }

    pub async fn vendor_reviews(&self) -> ClientResult<ReviewList> {
        let envelope: ApiEnvelope<ReviewList> = self
            .http
            .get(&format!("{VENDORS_PATH}/reviews"), &[])
            .await?;
        unwrap_envelope(envelope, "fetch reviews")
    }

    pub async fn dashboard_stats(&self) -> ClientResult<DashboardStats> {
        let envelope: ApiEnvelope<DashboardStats> = self
            .http
            .get(&format!("{VENDORS_PATH}/dashboard/stats"), &[])
            .await?;
        unwrap_envelope(envelope, "fetch dashboard stats")
    }

    // ========== Invoices ==========

    pub async fn invoices(&self) -> ClientResult<Vec<Invoice>> {
        let envelope: ApiEnvelope<Vec<Invoice>> = self.http.get(INVOICES_PATH, &[]).await?;
        unwrap_envelope(envelope, "fetch invoices")
    }

    pub async fn create_invoice(&self, invoice: &InvoiceCreate) -> ClientResult<Invoice> {
        let envelope: ApiEnvelope<Invoice> = self.http.post(INVOICES_PATH, invoice).await?;
        let created = unwrap_envelope(envelope, "create invoice")?;
        tracing::info!(invoice_id = %created.id, total = created.total, "Invoice created");
        Ok(created)
    }

    pub async fn update_invoice(&self, id: &str, update: &InvoiceUpdate) -> ClientResult<Invoice> {
        let envelope: ApiEnvelope<Invoice> = self
            .http
            .put(&resource_path(INVOICES_PATH, id), update)
            .await?;
        unwrap_envelope(envelope, "update invoice")
    }

    pub async fn delete_invoice(&self, id: &str) -> ClientResult<()> {
        let envelope: ApiEnvelope<serde_json::Value> = self
            .http
            .delete(&resource_path(INVOICES_PATH, id))
            .await?;
        expect_success(envelope, "delete invoice").map(drop)
    }

    // ========== Vendor profile ==========

    /// Cached vendor profile, if one was fetched before
    pub fn cached_vendor_profile(&self) -> Option<VendorProfile> {
        match self.persistent.load_json(KEY_VENDOR_PROFILE) {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!("Ignoring unreadable vendor profile cache: {}", e);
                None
            }
        }
    }

    /// Fetch the signed-in vendor's profile and refresh the cache
    ///
    /// Falls back to the cache when the request fails and a cached copy
    /// exists.
    pub async fn vendor_profile(&self) -> ClientResult<VendorProfile> {
        let fetched: ClientResult<VendorProfile> = async {
            let envelope: ApiEnvelope<VendorProfile> = self
                .http
                .get(&format!("{VENDORS_PATH}/profile"), &[])
                .await?;
            unwrap_envelope(envelope, "fetch vendor profile")
        }
        .await;

        match fetched {
            Ok(profile) => {
                if let Err(e) = self.persistent.save_json(KEY_VENDOR_PROFILE, &profile) {
                    tracing::warn!("Failed to cache vendor profile: {}", e);
                }
                Ok(profile)
            }
            Err(e) if e.is_auth_failure() => Err(e),
            Err(e) => match self.cached_vendor_profile() {
                Some(cached) => {
                    tracing::warn!(error = %e, "Using cached vendor profile");
                    Ok(cached)
                }
                None => Err(e),
            },
        }
    }

    pub fn clear_vendor_profile_cache(&self) {
        if let Err(e) = self.persistent.remove(KEY_VENDOR_PROFILE) {
            tracing::warn!("Failed to clear vendor profile cache: {}", e);
        }
    }
}
