//! Reference codes for write-once records.
//!
//! These are human-facing references, not join keys, so no collision check is made.

use chrono::{DateTime, Utc};
use rand::Rng;

/// The kinds of reference code the system issues, each with a fixed template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceKind {
    /// `F` + 0..10000, for ledger entries typed at a desk.
    Financial,
    /// `FIN-<ms>`, for ledger entries raised as a side effect (payroll disbursement).
    SystemFinancial,
    /// `LT` + 3 digits, for lab catalog entries.
    LabCatalog,
    /// `LT-<ms>-<0..100>`, for a test instance added to one patient's order.
    LabOrderInstance,
    /// `INV` + 4 digits.
    Inventory,
    /// `VND` + 3 digits.
    Vendor,
    /// `PAY-<ms>`.
    Payroll,
    /// `SURG-<ms>`.
    Surgery,
    /// `TASK-<ms>`.
    Task,
    /// `APP-<ms>`.
    Appointment,
    /// `AUDIT-<ms>`.
    Audit,
    /// `DOC-<ms>`.
    Document,
}

impl ReferenceKind {
    /// Renders a new reference of this kind.
    pub fn generate<R: Rng + ?Sized>(self, rng: &mut R, now: DateTime<Utc>) -> String {
        let ms = now.timestamp_millis();
        match self {
            ReferenceKind::Financial => format!("F{}", rng.gen_range(0..10_000)),
            ReferenceKind::SystemFinancial => format!("FIN-{}", ms),
            ReferenceKind::LabCatalog => format!("LT{:03}", rng.gen_range(0..1_000)),
            ReferenceKind::LabOrderInstance => format!("LT-{}-{}", ms, rng.gen_range(0..100)),
            ReferenceKind::Inventory => format!("INV{:04}", rng.gen_range(0..10_000)),
            ReferenceKind::Vendor => format!("VND{:03}", rng.gen_range(0..1_000)),
            ReferenceKind::Payroll => format!("PAY-{}", ms),
            ReferenceKind::Surgery => format!("SURG-{}", ms),
            ReferenceKind::Task => format!("TASK-{}", ms),
            ReferenceKind::Appointment => format!("APP-{}", ms),
            ReferenceKind::Audit => format!("AUDIT-{}", ms),
            ReferenceKind::Document => format!("DOC-{}", ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fixed_now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_716_163_200_123)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn test_timestamp_kinds_embed_milliseconds() {
        let mut rng = StdRng::seed_from_u64(0);
        let now = fixed_now();
        assert_eq!(ReferenceKind::Payroll.generate(&mut rng, now), "PAY-1716163200123");
        assert_eq!(ReferenceKind::Surgery.generate(&mut rng, now), "SURG-1716163200123");
        assert_eq!(ReferenceKind::Task.generate(&mut rng, now), "TASK-1716163200123");
        assert_eq!(ReferenceKind::Audit.generate(&mut rng, now), "AUDIT-1716163200123");
        assert_eq!(
            ReferenceKind::SystemFinancial.generate(&mut rng, now),
            "FIN-1716163200123"
        );
    }

    #[test]
    fn test_padded_kinds_have_fixed_width() {
        let mut rng = StdRng::seed_from_u64(5);
        let now = fixed_now();
        for _ in 0..100 {
            let inv = ReferenceKind::Inventory.generate(&mut rng, now);
            assert_eq!(inv.len(), "INV0000".len(), "{}", inv);
            let vnd = ReferenceKind::Vendor.generate(&mut rng, now);
            assert_eq!(vnd.len(), "VND000".len(), "{}", vnd);
            let lt = ReferenceKind::LabCatalog.generate(&mut rng, now);
            assert_eq!(lt.len(), "LT000".len(), "{}", lt);
        }
    }

    #[test]
    fn test_lab_order_instance_differs_from_catalog_template() {
        let mut rng = StdRng::seed_from_u64(11);
        let instance = ReferenceKind::LabOrderInstance.generate(&mut rng, fixed_now());
        assert!(instance.starts_with("LT-1716163200123-"), "{}", instance);
        let suffix: u32 = instance
            .rsplit('-')
            .next()
            .and_then(|s| s.parse().ok())
            .expect("numeric suffix");
        assert!(suffix < 100);
    }
}
