use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    quantity_updates: AtomicU64,
    points_awarded_centi: AtomicU64,
    transfers: AtomicU64,
    bulk_imports: AtomicU64,
    bulk_rows: AtomicU64,
    gdpr_deletions: AtomicU64,
    request_errors: AtomicU64,
}

impl Metrics {
    pub fn record_quantity_update(&self, points: f64) {
        self.quantity_updates.fetch_add(1, Ordering::Relaxed);
        if points > 0.0 {
            self.points_awarded_centi
                .fetch_add((points * 100.0).round() as u64, Ordering::Relaxed);
        }
    }

    pub fn record_transfer(&self) {
        self.transfers.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bulk_import(&self, rows: usize) {
        self.bulk_imports.fetch_add(1, Ordering::Relaxed);
        self.bulk_rows.fetch_add(rows as u64, Ordering::Relaxed);
    }

    pub fn record_gdpr_deletion(&self) {
        self.gdpr_deletions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_request_error(&self) {
        self.request_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let updates = self.quantity_updates.load(Ordering::Relaxed);
        let points = self.points_awarded_centi.load(Ordering::Relaxed) as f64 / 100.0;
        let transfers = self.transfers.load(Ordering::Relaxed);
        let imports = self.bulk_imports.load(Ordering::Relaxed);
        let rows = self.bulk_rows.load(Ordering::Relaxed);
        let deletions = self.gdpr_deletions.load(Ordering::Relaxed);
        let errors = self.request_errors.load(Ordering::Relaxed);

        format!(
            "# TYPE tracker_quantity_updates_total counter\n\
tracker_quantity_updates_total {}\n\
# TYPE tracker_points_awarded_total counter\n\
tracker_points_awarded_total {}\n\
# TYPE tracker_transfers_total counter\n\
tracker_transfers_total {}\n\
# TYPE tracker_bulk_imports_total counter\n\
tracker_bulk_imports_total {}\n\
# TYPE tracker_bulk_import_rows_total counter\n\
tracker_bulk_import_rows_total {}\n\
# TYPE tracker_gdpr_deletions_total counter\n\
tracker_gdpr_deletions_total {}\n\
# TYPE tracker_request_errors_total counter\n\
tracker_request_errors_total {}\n",
            updates, points, transfers, imports, rows, deletions, errors
        )
    }
}
