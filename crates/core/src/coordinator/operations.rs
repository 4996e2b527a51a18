//! Back-office desks: appointments, accounting, catalog, staff, inventory, vendors, payroll,
//! theatre, tasks and the audit trail.

use super::forms::{
    AppointmentForm, FinancialForm, InventoryForm, PayrollForm, SurgeryForm, TaskForm, VendorForm,
};
use super::Coordinator;
use crate::constants::{DEFAULT_BASE_SALARY, NAME_LIMIT};
use crate::model::{
    ActivityLog, ActivityType, Appointment, AppointmentStatus, FinancialKind, FinancialRecord,
    InventoryItem, LabTest, PayrollRecord, PayrollStatus, StaffMember, StaffTask, SurgeryStatus,
    SurgicalRecord, UserRole, Vendor, VendorStatus,
};
use crate::search::filter_logs;
use crate::store::{
    Appointments, Financials, Inventory, LabTests, Logs, Payrolls, Staff, Surgeries, Tasks,
    Vendors,
};
use crate::validation::{money, required, required_bounded};
use crate::HospitalResult;
use fih_ids::ReferenceKind;

/// Totals over the whole ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LedgerSummary {
    pub income: f64,
    pub expense: f64,
    pub net: f64,
}

impl Coordinator {
    pub async fn book_appointment(&mut self, form: AppointmentForm) -> HospitalResult<Appointment> {
        let patient_name = self.patient(&form.patient_id)?.name.clone();
        let doctor = required("doctorName", &form.doctor_name)?;
        let time = required("time", &form.time)?;
        let department = required("department", &form.department)?;

        let appointment = Appointment {
            id: self.reference(ReferenceKind::Appointment),
            patient_id: form.patient_id,
            patient_name,
            doctor_name: doctor.into_inner(),
            date: form.date,
            time: time.into_inner(),
            department: department.into_inner(),
            status: AppointmentStatus::Scheduled,
            reason: form.reason.filter(|r| !r.trim().is_empty()),
        };
        self.append::<Appointments>(appointment.clone()).await?;
        Ok(appointment)
    }

    /// Manual ledger entry typed at the accounts desk.
    pub async fn record_financial(&mut self, form: FinancialForm) -> HospitalResult<FinancialRecord> {
        let category = required("category", &form.category)?;
        let amount = money("amount", form.amount)?;
        let record = FinancialRecord {
            id: self.unique_reference::<Financials>(ReferenceKind::Financial),
            kind: form.kind,
            category: category.into_inner(),
            amount,
            date: form.date.unwrap_or_else(|| self.today()),
            description: form.description.trim().to_owned(),
        };
        self.append::<Financials>(record.clone()).await?;
        Ok(record)
    }

    pub fn ledger_summary(&self) -> LedgerSummary {
        let (income, expense) =
            self.view
                .financials
                .iter()
                .fold((0.0, 0.0), |(inc, exp), r| match r.kind {
                    FinancialKind::Income => (inc + r.amount, exp),
                    FinancialKind::Expense => (inc, exp + r.amount),
                });
        LedgerSummary {
            income,
            expense,
            net: income - expense,
        }
    }

    /// Adds a test to the lab catalog.
    pub async fn add_catalog_test(&mut self, name: &str, price: f64) -> HospitalResult<LabTest> {
        let name = required("name", name)?;
        let test = LabTest {
            id: self.unique_reference::<LabTests>(ReferenceKind::LabCatalog),
            name: name.into_inner(),
            price: money("price", price)?,
            result: None,
        };
        self.append::<LabTests>(test.clone()).await?;
        Ok(test)
    }

    pub async fn add_staff(&mut self, member: StaffMember) -> HospitalResult<StaffMember> {
        required("id", &member.id)?;
        required_bounded("name", &member.name, NAME_LIMIT)?;
        if let Some(salary) = member.salary {
            money("salary", salary)?;
        }
        self.append::<Staff>(member.clone()).await?;
        Ok(member)
    }

    pub async fn add_inventory_item(&mut self, form: InventoryForm) -> HospitalResult<InventoryItem> {
        let name = required("name", &form.name)?;
        let unit = required("unit", &form.unit)?;
        let item = InventoryItem {
            id: self.unique_reference::<Inventory>(ReferenceKind::Inventory),
            name: name.into_inner(),
            category: form.category,
            quantity: form.quantity,
            min_threshold: form.min_threshold,
            unit: unit.into_inner(),
            price_per_unit: money("pricePerUnit", form.price_per_unit)?,
            last_updated: self.today(),
        };
        self.upsert::<Inventory>(item.clone()).await?;
        Ok(item)
    }

    /// Moves stock by a signed delta. The quantity never drops below zero.
    pub async fn adjust_stock(&mut self, id: &str, delta: i64) -> HospitalResult<InventoryItem> {
        let today = self.today();
        let item = self.find::<Inventory>("inventory item", id)?.adjusted(delta, today);
        self.upsert::<Inventory>(item.clone()).await?;
        self.audit(
            ActivityType::InventoryAdjust,
            1,
            format!(
                "Stock for {} adjusted by {:+}, now {} {} ({})",
                item.name,
                delta,
                item.quantity,
                item.unit,
                item.stock_level()
            ),
        )
        .await?;
        Ok(item)
    }

    pub async fn add_vendor(&mut self, form: VendorForm) -> HospitalResult<Vendor> {
        let name = required("name", &form.name)?;
        let vendor = Vendor {
            id: self.unique_reference::<Vendors>(ReferenceKind::Vendor),
            name: name.into_inner(),
            category: form.category,
            contact_person: form.contact_person.trim().to_owned(),
            phone: form.phone.trim().to_owned(),
            email: form.email.trim().to_owned(),
            address: form.address.trim().to_owned(),
            status: form.status,
            last_supply_date: form.last_supply_date,
        };
        self.upsert::<Vendors>(vendor.clone()).await?;
        Ok(vendor)
    }

    pub async fn set_vendor_status(&mut self, id: &str, status: VendorStatus) -> HospitalResult<Vendor> {
        let mut vendor = self.find::<Vendors>("vendor", id)?.clone();
        vendor.status = status;
        self.upsert::<Vendors>(vendor.clone()).await?;
        Ok(vendor)
    }

    /// Pays one staff member for a month and books the disbursement as a `Salaries` expense.
    ///
    /// Staff without a contracted salary are paid [`DEFAULT_BASE_SALARY`]. Deductions that
    /// would make the net pay negative are rejected before anything is written.
    pub async fn generate_payroll(&mut self, form: PayrollForm) -> HospitalResult<PayrollRecord> {
        let member = self.find::<Staff>("staff member", &form.staff_id)?.clone();
        let month = required("month", &form.month)?;
        let year = required("year", &form.year)?;
        let allowances = money("allowances", form.allowances)?;
        let deductions = money("deductions", form.deductions)?;

        let base_salary = member.salary.unwrap_or(DEFAULT_BASE_SALARY);
        let net_pay = money("netPay", base_salary + allowances - deductions)?;
        let record = PayrollRecord {
            id: self.reference(ReferenceKind::Payroll),
            staff_id: member.id.clone(),
            staff_name: member.name.clone(),
            month: month.into_inner(),
            year: year.into_inner(),
            base_salary,
            allowances,
            deductions,
            net_pay,
            status: PayrollStatus::Paid,
        };
        self.append::<Payrolls>(record.clone()).await?;

        let expense = FinancialRecord {
            id: self.reference(ReferenceKind::SystemFinancial),
            kind: FinancialKind::Expense,
            category: "Salaries".to_owned(),
            amount: record.net_pay,
            date: self.today(),
            description: format!("Disbursement to {}", member.name),
        };
        self.append::<Financials>(expense).await?;

        self.audit(
            ActivityType::PayrollGen,
            1,
            format!(
                "Payroll for {} {} generated for {}",
                record.month, record.year, record.staff_name
            ),
        )
        .await?;
        Ok(record)
    }

    pub async fn schedule_surgery(&mut self, form: SurgeryForm) -> HospitalResult<SurgicalRecord> {
        let patient_name = self.patient(&form.patient_id)?.name.clone();
        let procedure = required("procedure", &form.procedure)?;
        let surgeon = required("surgeon", &form.surgeon)?;
        let room = required("theaterRoom", &form.theater_room)?;

        let record = SurgicalRecord {
            id: self.unique_reference::<Surgeries>(ReferenceKind::Surgery),
            patient_id: form.patient_id,
            patient_name,
            procedure: procedure.into_inner(),
            surgeon: surgeon.into_inner(),
            theater_room: room.into_inner(),
            date: form.date,
            start_time: form.start_time.trim().to_owned(),
            anesthesia_type: form.anesthesia_type.trim().to_owned(),
            status: SurgeryStatus::Scheduled,
        };
        self.upsert::<Surgeries>(record.clone()).await?;
        self.audit(
            ActivityType::SurgeryLog,
            1,
            format!(
                "{} scheduled for {} in {} on {}",
                record.procedure, record.patient_name, record.theater_room, record.date
            ),
        )
        .await?;
        Ok(record)
    }

    pub async fn set_surgery_status(
        &mut self,
        id: &str,
        status: SurgeryStatus,
    ) -> HospitalResult<SurgicalRecord> {
        let mut record = self.find::<Surgeries>("surgery", id)?.clone();
        record.status = status;
        self.upsert::<Surgeries>(record.clone()).await?;
        Ok(record)
    }

    pub async fn add_task(&mut self, form: TaskForm) -> HospitalResult<StaffTask> {
        let title = required_bounded("title", &form.title, NAME_LIMIT)?;
        let task = StaffTask {
            id: self.unique_reference::<Tasks>(ReferenceKind::Task),
            title: title.into_inner(),
            priority: form.priority,
            category: form.category,
            completed: false,
            due_date: form.due_date,
        };
        self.upsert::<Tasks>(task.clone()).await?;
        Ok(task)
    }

    pub async fn toggle_task(&mut self, id: &str) -> HospitalResult<StaffTask> {
        let mut task = self.find::<Tasks>("task", id)?.clone();
        task.completed = !task.completed;
        self.upsert::<Tasks>(task.clone()).await?;
        Ok(task)
    }

    pub async fn delete_task(&mut self, id: &str) -> HospitalResult<bool> {
        self.delete::<Tasks>(id).await
    }

    /// Audit entries, newest first, optionally narrowed by type and role.
    pub fn activity_logs(
        &self,
        kind: Option<ActivityType>,
        role: Option<UserRole>,
    ) -> Vec<&ActivityLog> {
        filter_logs(&self.view.logs, kind, role)
    }

    pub async fn clear_activity_logs(&mut self) -> HospitalResult<()> {
        self.clear::<Logs>().await
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::coordinator;
    use super::*;
    use crate::model::{InventoryCategory, StockLevel, TaskCategory, TaskPriority, VendorCategory};
    use crate::HospitalError;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[tokio::test]
    async fn test_payroll_uses_contract_salary_and_books_expense() {
        let (mut c, _slot) = coordinator(UserRole::Admin).await;
        let record = c
            .generate_payroll(PayrollForm {
                staff_id: "S001".into(),
                month: "May".into(),
                year: "2024".into(),
                allowances: 250_000.0,
                deductions: 100_000.0,
            })
            .await
            .expect("payroll");

        assert_eq!(record.base_salary, 5_000_000.0);
        assert_eq!(record.net_pay, 5_150_000.0);
        assert_eq!(c.view().payrolls[0], record);

        let expense = &c.view().financials[0];
        assert_eq!(expense.kind, FinancialKind::Expense);
        assert_eq!(expense.category, "Salaries");
        assert_eq!(expense.amount, 5_150_000.0);
        assert_eq!(expense.description, "Disbursement to Dr. Gregory House");
        assert!(expense.id.starts_with("FIN-"));
        assert_eq!(c.view().logs[0].kind, ActivityType::PayrollGen);
    }

    #[tokio::test]
    async fn test_payroll_defaults_base_salary() {
        let (mut c, _slot) = coordinator(UserRole::Admin).await;
        c.add_staff(StaffMember {
            id: "S002".into(),
            name: "Nurse Isatu Sesay".into(),
            role: "Nurse".into(),
            department: "Maternity".into(),
            status: crate::model::StaffStatus::OnDuty,
            experience: "4 years".into(),
            image: String::new(),
            salary: None,
        })
        .await
        .expect("add staff");

        let record = c
            .generate_payroll(PayrollForm {
                staff_id: "S002".into(),
                month: "June".into(),
                year: "2024".into(),
                allowances: 0.0,
                deductions: 0.0,
            })
            .await
            .expect("payroll");
        assert_eq!(record.base_salary, DEFAULT_BASE_SALARY);
        assert_eq!(record.net_pay, DEFAULT_BASE_SALARY);
    }

    #[tokio::test]
    async fn test_payroll_rejects_negative_net_pay() {
        let (mut c, slot) = coordinator(UserRole::Admin).await;
        let writes = slot.writes();
        let ledger = c.view().financials.len();

        let err = c
            .generate_payroll(PayrollForm {
                staff_id: "S001".into(),
                month: "July".into(),
                year: "2024".into(),
                allowances: 0.0,
                deductions: 6_000_000.0,
            })
            .await
            .expect_err("deductions exceed pay");
        assert!(matches!(err, HospitalError::InvalidInput(_)));
        assert!(c.view().payrolls.is_empty());
        assert_eq!(c.view().financials.len(), ledger);
        assert_eq!(slot.writes(), writes);
    }

    #[tokio::test]
    async fn test_ledger_summary_nets_income_and_expense() {
        let (mut c, _slot) = coordinator(UserRole::Cashier).await;
        let before = c.ledger_summary();
        c.record_financial(FinancialForm {
            kind: FinancialKind::Expense,
            category: "Utilities".into(),
            amount: 20_000.0,
            date: Some(date(2024, 5, 21)),
            description: "Generator diesel".into(),
        })
        .await
        .expect("record");

        let after = c.ledger_summary();
        assert_eq!(after.income, before.income);
        assert_eq!(after.expense, before.expense + 20_000.0);
        assert_eq!(after.net, after.income - after.expense);

        assert!(matches!(
            c.record_financial(FinancialForm {
                kind: FinancialKind::Income,
                category: "Pharmacy".into(),
                amount: -1.0,
                date: None,
                description: String::new(),
            })
            .await,
            Err(HospitalError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_stock_adjustment_clamps_and_audits() {
        let (mut c, _slot) = coordinator(UserRole::Matron).await;
        let item = c
            .add_inventory_item(InventoryForm {
                name: "Paracetamol 500mg".into(),
                category: InventoryCategory::Pharmaceutical,
                quantity: 12,
                min_threshold: 10,
                unit: "boxes".into(),
                price_per_unit: 8_000.0,
            })
            .await
            .expect("add item");
        assert!(item.id.starts_with("INV"));
        assert_eq!(item.stock_level(), StockLevel::InStock);

        let item = c.adjust_stock(&item.id, -5).await.expect("adjust");
        assert_eq!(item.quantity, 7);
        assert_eq!(item.stock_level(), StockLevel::Low);

        let item = c.adjust_stock(&item.id, -50).await.expect("adjust");
        assert_eq!(item.quantity, 0);
        assert_eq!(item.stock_level(), StockLevel::OutOfStock);

        let audits = c.activity_logs(Some(ActivityType::InventoryAdjust), Some(UserRole::Matron));
        assert_eq!(audits.len(), 2);
    }

    #[tokio::test]
    async fn test_surgery_denormalises_patient_name() {
        let (mut c, _slot) = coordinator(UserRole::Doctor).await;
        let record = c
            .schedule_surgery(SurgeryForm {
                patient_id: "P001".into(),
                procedure: "Appendectomy".into(),
                surgeon: "Dr. Gregory House".into(),
                theater_room: "Theatre 2".into(),
                date: date(2024, 6, 1),
                start_time: "09:00".into(),
                anesthesia_type: "General".into(),
            })
            .await
            .expect("schedule");
        assert_eq!(record.patient_name, "Sarah Johnson");

        let updated = c
            .set_surgery_status(&record.id, SurgeryStatus::PostOp)
            .await
            .expect("status");
        assert_eq!(c.view().surgeries, vec![updated]);

        assert!(matches!(
            c.schedule_surgery(SurgeryForm {
                patient_id: "P404".into(),
                procedure: "Biopsy".into(),
                surgeon: "Dr. Gregory House".into(),
                theater_room: "Theatre 1".into(),
                date: date(2024, 6, 2),
                start_time: "10:00".into(),
                anesthesia_type: "Local".into(),
            })
            .await,
            Err(HospitalError::NotFound { kind: "patient", .. })
        ));
    }

    #[tokio::test]
    async fn test_back_to_back_tasks_are_all_kept() {
        let (mut c, _slot) = coordinator(UserRole::Matron).await;
        let before = c.view().tasks.len();
        for n in 0..50 {
            c.add_task(TaskForm {
                title: format!("Ward round {}", n),
                priority: TaskPriority::Routine,
                category: TaskCategory::Clinical,
                due_date: date(2024, 5, 22),
            })
            .await
            .expect("add task");
        }
        assert_eq!(c.view().tasks.len(), before + 50);

        c.refresh().await.expect("refresh");
        assert_eq!(c.view().tasks.len(), before + 50);
    }

    #[tokio::test]
    async fn test_back_to_back_surgeries_are_all_kept() {
        let (mut c, _slot) = coordinator(UserRole::Doctor).await;
        for room in ["Theatre 1", "Theatre 2", "Theatre 3"] {
            c.schedule_surgery(SurgeryForm {
                patient_id: "P002".into(),
                procedure: "Cardiac catheterisation".into(),
                surgeon: "Dr. Gregory House".into(),
                theater_room: room.into(),
                date: date(2024, 6, 3),
                start_time: "08:00".into(),
                anesthesia_type: "Local".into(),
            })
            .await
            .expect("schedule");
        }
        let rooms: Vec<&str> = c
            .view()
            .surgeries
            .iter()
            .map(|s| s.theater_room.as_str())
            .collect();
        assert_eq!(rooms, ["Theatre 1", "Theatre 2", "Theatre 3"]);
    }

    #[tokio::test]
    async fn test_tasks_toggle_and_delete() {
        let (mut c, _slot) = coordinator(UserRole::Matron).await;
        let task = c
            .add_task(TaskForm {
                title: "Restock ward 3 linen".into(),
                priority: TaskPriority::Urgent,
                category: TaskCategory::Admin,
                due_date: date(2024, 5, 22),
            })
            .await
            .expect("add task");
        assert_eq!(c.view().tasks[0], task);

        let toggled = c.toggle_task(&task.id).await.expect("toggle");
        assert!(toggled.completed);

        assert!(c.delete_task(&task.id).await.expect("delete"));
        assert!(!c.delete_task(&task.id).await.expect("delete again"));
    }

    #[tokio::test]
    async fn test_vendor_and_appointment_bookkeeping() {
        let (mut c, _slot) = coordinator(UserRole::Admin).await;
        let vendor = c
            .add_vendor(VendorForm {
                name: "Lumley Medical Supplies".into(),
                category: VendorCategory::MedicalSupplies,
                contact_person: "Abu Bakarr".into(),
                phone: "+232 30 444000".into(),
                email: "orders@lumley.sl".into(),
                address: "Lumley Beach Road".into(),
                status: VendorStatus::Active,
                last_supply_date: "2024-05-01".into(),
            })
            .await
            .expect("vendor");
        let vendor = c
            .set_vendor_status(&vendor.id, VendorStatus::UnderReview)
            .await
            .expect("status");
        assert_eq!(vendor.status, VendorStatus::UnderReview);

        let appointment = c
            .book_appointment(AppointmentForm {
                patient_id: "P003".into(),
                doctor_name: "Dr. Gregory House".into(),
                date: date(2024, 5, 25),
                time: "11:30".into(),
                department: "General Medicine".into(),
                reason: Some("  ".into()),
            })
            .await
            .expect("book");
        assert_eq!(appointment.patient_name, "Aminata Conteh");
        assert_eq!(appointment.reason, None);
        assert_eq!(c.view().appointments[0], appointment);
    }

    #[tokio::test]
    async fn test_catalog_test_is_orderable() {
        let (mut c, _slot) = coordinator(UserRole::LabTech).await;
        let test = c
            .add_catalog_test("Widal Test", 35_000.0)
            .await
            .expect("add catalog test");
        assert_eq!(c.view().lab_tests.last(), Some(&test));

        c.set_role(UserRole::Doctor);
        let p = c
            .commit_lab_order("P002", &[test.id.clone()])
            .await
            .expect("order new test");
        assert_eq!(p.total_lab_bill, Some(35_000.0));
    }

    #[tokio::test]
    async fn test_clear_logs_empties_trail() {
        let (mut c, _slot) = coordinator(UserRole::Admin).await;
        c.set_status("P001", crate::model::PatientStatus::Discharged)
            .await
            .expect("override");
        assert_eq!(c.activity_logs(None, None).len(), 1);
        c.clear_activity_logs().await.expect("clear");
        assert!(c.view().logs.is_empty());
    }
}
